#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self {
            min: 4.0,
            max: 20.0,
        }
    }
}

impl SizeRange {
    pub fn midpoint(self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Log-scaled position of `value` inside `[min, max]`, mapped into the range.
    pub fn node_size(self, value: f64, min: f64, max: f64) -> f32 {
        self.min + normalize_log(value, min, max) * (self.max - self.min)
    }
}

fn normalize_log(value: f64, min: f64, max: f64) -> f32 {
    let low = min.max(0.0).ln_1p();
    let high = max.max(min).max(0.0).ln_1p();
    let denominator = high - low;
    if !denominator.is_finite() || denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    ((value.ln_1p() - low) / denominator).clamp(0.0, 1.0) as f32
}

pub fn edge_width(weight_norm: f64) -> f32 {
    let weight_norm = if weight_norm.is_finite() {
        weight_norm.clamp(0.0, 1.0)
    } else {
        0.0
    };
    0.5 + weight_norm as f32 * 2.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_span_the_range() {
        let range = SizeRange::default();
        assert_eq!(range.node_size(1.0, 1.0, 10.0), 4.0);
        assert_eq!(range.node_size(10.0, 1.0, 10.0), 20.0);
    }

    #[test]
    fn sizes_are_monotone_and_bounded() {
        let range = SizeRange::default();
        let mut previous = 0.0;
        for value in [0.0, 0.5, 1.0, 2.0, 5.0, 40.0, 200.0, 1e6] {
            let size = range.node_size(value, 1.0, 200.0);
            assert!((4.0..=20.0).contains(&size), "{value} -> {size}");
            assert!(size >= previous);
            previous = size;
        }
    }

    #[test]
    fn flat_range_maps_to_midpoint() {
        let range = SizeRange::default();
        assert_eq!(range.node_size(3.0, 3.0, 3.0), range.midpoint());
        assert_eq!(range.node_size(f64::NAN, 0.0, 0.0), 12.0);
    }

    #[test]
    fn edge_width_grows_with_normalised_weight() {
        assert_eq!(edge_width(0.0), 0.5);
        assert_eq!(edge_width(1.0), 3.0);
        assert_eq!(edge_width(7.0), 3.0);
        assert!(edge_width(0.5) > edge_width(0.1));
    }
}
