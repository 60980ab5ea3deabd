use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_metric(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut truncated = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    truncated.push('…');
    truncated
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("person:1");
        assert_eq!(first, stable_pair("person:1"));
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }

    #[test]
    fn truncate_label_keeps_short_labels() {
        assert_eq!(truncate_label("Ouagadougou", 20), "Ouagadougou");
        assert_eq!(truncate_label("Association des élèves", 8), "Associa…");
    }

    #[test]
    fn format_metric_drops_zero_fraction() {
        assert_eq!(format_metric(12.0), "12");
        assert_eq!(format_metric(2.5), "2.50");
    }
}
