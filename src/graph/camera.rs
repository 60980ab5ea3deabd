use std::time::Duration;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
    pub ratio: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            ratio: 1.0,
        }
    }
}

impl CameraState {
    pub fn center(self) -> Vec2 {
        vec2(self.x, self.y)
    }

    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            ratio: self.ratio + (to.ratio - self.ratio) * t,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub zoom_factor: f32,
    pub zoom_duration: Duration,
    pub reset_duration: Duration,
    pub focus_duration: Duration,
    pub focus_ratio: f32,
    pub min_ratio: f32,
    pub max_ratio: f32,
    /// Screen padding kept around the graph at ratio 1.
    pub fit_padding: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.5,
            zoom_duration: Duration::from_millis(200),
            reset_duration: Duration::from_millis(300),
            focus_duration: Duration::from_millis(400),
            focus_ratio: 0.3,
            min_ratio: 0.02,
            max_ratio: 20.0,
            fit_padding: 40.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Animation {
    from: CameraState,
    to: CameraState,
    start: f64,
    duration: f64,
}

fn ease_quad_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    state: CameraState,
    animation: Option<Animation>,
    viewport: Vec2,
    bounds: Option<(Vec2, Vec2)>,
    base_scale: f32,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            state: CameraState::default(),
            animation: None,
            viewport: vec2(800.0, 600.0),
            bounds: None,
            base_scale: 1.0,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 && size != self.viewport {
            self.viewport = size;
            self.update_base_scale();
        }
    }

    /// Records the world bounds that ratio 1 must fit and jumps to the fitted view.
    pub fn fit_bounds(&mut self, bounds: Option<(Vec2, Vec2)>) {
        self.bounds = bounds;
        self.update_base_scale();
        self.animation = None;
        self.state = self.fitted_state();
    }

    fn update_base_scale(&mut self) {
        let Some((min, max)) = self.bounds else {
            self.base_scale = 1.0;
            return;
        };
        let span = (max - min).max(vec2(1.0, 1.0));
        let available = (self.viewport - Vec2::splat(self.config.fit_padding * 2.0))
            .max(vec2(1.0, 1.0));
        self.base_scale = (available.x / span.x).min(available.y / span.y);
    }

    fn fitted_state(&self) -> CameraState {
        let center = self
            .bounds
            .map(|(min, max)| (min + max) * 0.5)
            .unwrap_or(Vec2::ZERO);
        CameraState {
            x: center.x,
            y: center.y,
            ratio: 1.0,
        }
    }

    pub fn scale(&self) -> f32 {
        self.base_scale / self.state.ratio
    }

    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + (world - self.state.center()) * self.scale()
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center()) / self.scale() + self.state.center()
    }

    fn clamp_ratio(&self, ratio: f32) -> f32 {
        ratio.clamp(self.config.min_ratio, self.config.max_ratio)
    }

    fn animate_to(&mut self, to: CameraState, duration: Duration, now: f64) {
        self.animation = Some(Animation {
            from: self.state,
            to,
            start: now,
            duration: duration.as_secs_f64(),
        });
    }

    pub fn reset(&mut self, now: f64) {
        let to = self.fitted_state();
        self.animate_to(to, self.config.reset_duration, now);
    }

    pub fn zoom_in(&mut self, now: f64) {
        let to = CameraState {
            ratio: self.clamp_ratio(self.state.ratio / self.config.zoom_factor),
            ..self.state
        };
        self.animate_to(to, self.config.zoom_duration, now);
    }

    pub fn zoom_out(&mut self, now: f64) {
        let to = CameraState {
            ratio: self.clamp_ratio(self.state.ratio * self.config.zoom_factor),
            ..self.state
        };
        self.animate_to(to, self.config.zoom_duration, now);
    }

    pub fn focus(&mut self, world: Vec2, now: f64) {
        let to = CameraState {
            x: world.x,
            y: world.y,
            ratio: self.clamp_ratio(self.config.focus_ratio),
        };
        self.animate_to(to, self.config.focus_duration, now);
    }

    /// Zooms by `factor` (> 1 zooms in) keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, rect: Rect, screen: Pos2, factor: f32) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        self.animation = None;
        let anchor = self.screen_to_world(rect, screen);
        self.state.ratio = self.clamp_ratio(self.state.ratio / factor);
        let offset = (screen - rect.center()) / self.scale();
        let center = anchor - offset;
        self.state.x = center.x;
        self.state.y = center.y;
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        self.animation = None;
        let world_delta = screen_delta / self.scale();
        self.state.x -= world_delta.x;
        self.state.y -= world_delta.y;
    }

    pub fn tick(&mut self, now: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let t = if animation.duration <= 0.0 {
            1.0
        } else {
            ((now - animation.start) / animation.duration).clamp(0.0, 1.0) as f32
        };
        if t >= 1.0 {
            self.state = animation.to;
            self.animation = None;
            return false;
        }
        self.state = animation.from.lerp(animation.to, ease_quad_in_out(t));
        true
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn fitted() -> Camera {
        let mut camera = Camera::default();
        camera.set_viewport(vec2(880.0, 680.0));
        camera.fit_bounds(Some((vec2(-100.0, -50.0), vec2(100.0, 50.0))));
        camera
    }

    #[test]
    fn fit_centres_the_bounds_at_ratio_one() {
        let camera = fitted();
        assert_eq!(camera.state(), CameraState::default());
        assert_eq!(camera.scale(), 4.0);
    }

    #[test]
    fn zoom_in_animates_to_a_smaller_ratio() {
        let mut camera = fitted();
        camera.zoom_in(10.0);
        assert!(camera.tick(10.1));
        let halfway = camera.state().ratio;
        assert!(halfway < 1.0 && halfway > 1.0 / 1.5);
        assert!(!camera.tick(10.25));
        assert!((camera.state().ratio - 1.0 / 1.5).abs() < 1e-6);
    }

    #[test]
    fn focus_then_reset_returns_to_the_fitted_view() {
        let mut camera = fitted();
        camera.focus(vec2(30.0, -20.0), 0.0);
        camera.tick(1.0);
        assert_eq!(
            camera.state(),
            CameraState {
                x: 30.0,
                y: -20.0,
                ratio: 0.3
            }
        );

        camera.reset(2.0);
        assert!(camera.is_animating());
        camera.tick(2.5);
        assert_eq!(camera.state(), CameraState::default());
    }

    #[test]
    fn new_animation_starts_from_the_interpolated_state() {
        let mut camera = fitted();
        camera.focus(vec2(100.0, 0.0), 0.0);
        camera.tick(0.2);
        let midway = camera.state();
        camera.zoom_out(0.2);
        camera.tick(0.2);
        assert_eq!(camera.state(), midway);
    }

    #[test]
    fn zoom_at_keeps_the_anchor_under_the_pointer() {
        let mut camera = fitted();
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(880.0, 680.0));
        let pointer = pos2(600.0, 200.0);
        let before = camera.screen_to_world(rect, pointer);
        camera.zoom_at(rect, pointer, 2.0);
        let after = camera.screen_to_world(rect, pointer);
        assert!((before - after).length() < 1e-3);
        assert!((camera.state().ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pan_cancels_animation() {
        let mut camera = fitted();
        camera.zoom_in(0.0);
        camera.pan(vec2(40.0, 0.0));
        assert!(!camera.is_animating());
        assert_eq!(camera.state().x, -10.0);
    }

    #[test]
    fn easing_is_symmetric() {
        assert_eq!(ease_quad_in_out(0.0), 0.0);
        assert_eq!(ease_quad_in_out(0.5), 0.5);
        assert_eq!(ease_quad_in_out(1.0), 1.0);
    }
}
