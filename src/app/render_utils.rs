use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::graph::Camera;
use crate::theme::Theme;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, theme: &Theme, camera: &Camera) {
    painter.rect_filled(rect, 0.0, theme.background);

    let scale = camera.scale();
    if !scale.is_finite() || scale <= 0.0 {
        return;
    }
    let world_step = 10f32.powf((56.0 / scale).log10().ceil());
    let step = world_step * scale;
    let stroke = Stroke::new(1.0, theme.grid);
    let origin = camera.world_to_screen(rect, Vec2::ZERO);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0))
    }

    #[test]
    fn edge_crossing_the_viewport_is_visible() {
        assert!(edge_visible(viewport(), pos2(-50.0, 50.0), pos2(150.0, 50.0), 1.0));
        assert!(!edge_visible(viewport(), pos2(-50.0, -50.0), pos2(150.0, -40.0), 1.0));
    }

    #[test]
    fn circle_touching_the_edge_is_visible() {
        assert!(circle_visible(viewport(), pos2(-5.0, 50.0), 6.0));
        assert!(!circle_visible(viewport(), pos2(-10.0, 50.0), 6.0));
    }

    #[test]
    fn blend_reaches_overlay() {
        let blended = blend_color(Color32::BLACK, Color32::WHITE, 1.0);
        assert_eq!(blended, Color32::WHITE);
    }
}
