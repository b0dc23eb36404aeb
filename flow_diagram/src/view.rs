use crate::geometry::{Point, Rect, Vec2};

pub const ZOOM_STEP: f32 = 1.15;
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Maps scene coordinates to screen coordinates: `screen = offset + scene * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: Vec2,
}

impl ViewTransform {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::new(0.0, 0.0),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scene_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    pub fn screen_to_scene(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset.x) / self.scale,
            (point.y - self.offset.y) / self.scale,
        )
    }

    /// Zooms by `ZOOM_STEP` per wheel notch (negative zooms out) keeping the
    /// scene point under `pointer` fixed. Returns false when already at a limit.
    pub fn zoom_at(&mut self, pointer: Point, notches: f32) -> bool {
        if notches == 0.0 {
            return false;
        }
        let target = (self.scale * ZOOM_STEP.powf(notches)).clamp(MIN_SCALE, MAX_SCALE);
        if target == self.scale {
            return false;
        }
        let anchor = self.screen_to_scene(pointer);
        self.scale = target;
        self.offset = Vec2::new(
            pointer.x - anchor.x * target,
            pointer.y - anchor.y * target,
        );
        true
    }

    /// Drag by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset = self.offset + delta;
    }

    /// Puts the center of `target` (scene space) at the center of `viewport`
    /// (screen space) without touching the scale.
    pub fn center_on(&mut self, target: &Rect, viewport: &Rect) {
        let scene_point = target.center();
        let center = viewport.center();
        self.offset = Vec2::new(
            center.x - scene_point.x * self.scale,
            center.y - scene_point.y * self.scale,
        );
    }

    /// Limits scrolling to `bounds` (scene space). On an axis where the bounds
    /// are wider than `viewport` the viewport edge may reach the bounds edge
    /// but not pass it; on a narrower axis the bounds are centered.
    pub fn clamp_to(&mut self, bounds: &Rect, viewport: &Rect) {
        if bounds.is_empty() {
            return;
        }
        let x = clamp_axis(
            self.offset.x,
            self.scale,
            (bounds.min.x, bounds.max.x),
            (viewport.min.x, viewport.max.x),
        );
        let y = clamp_axis(
            self.offset.y,
            self.scale,
            (bounds.min.y, bounds.max.y),
            (viewport.min.y, viewport.max.y),
        );
        self.offset = Vec2::new(x, y);
    }
}

fn clamp_axis(
    offset: f32,
    scale: f32,
    (min, max): (f32, f32),
    (view_min, view_max): (f32, f32),
) -> f32 {
    if (max - min) * scale <= view_max - view_min {
        return (view_min + view_max) * 0.5 - (min + max) * 0.5 * scale;
    }
    offset.clamp(view_max - max * scale, view_min - min * scale)
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn zoom_is_clamped_both_ways() {
        let mut view = ViewTransform::new();
        for _ in 0..100 {
            view.zoom_at(Point::ZERO, 1.0);
        }
        assert_eq!(view.scale(), MAX_SCALE);
        assert!(!view.zoom_at(Point::ZERO, 1.0));

        for _ in 0..200 {
            view.zoom_at(Point::ZERO, -1.0);
        }
        assert_eq!(view.scale(), MIN_SCALE);
        assert!(!view.zoom_at(Point::ZERO, -1.0));
    }

    #[test]
    fn one_notch_scales_by_step() {
        let mut view = ViewTransform::new();
        assert!(view.zoom_at(Point::ZERO, 1.0));
        assert!(close(view.scale(), 1.15));
        assert!(view.zoom_at(Point::ZERO, -1.0));
        assert!(close(view.scale(), 1.0));
    }

    #[test]
    fn zoom_keeps_point_under_pointer() {
        let mut view = ViewTransform::new();
        view.pan_by(Vec2::new(30.0, -12.0));
        let pointer = Point::new(250.0, 140.0);
        let before = view.screen_to_scene(pointer);
        view.zoom_at(pointer, 3.0);
        let after = view.screen_to_scene(pointer);
        assert!(close(before.x, after.x));
        assert!(close(before.y, after.y));
    }

    #[test]
    fn center_on_places_point_at_viewport_center() {
        let mut view = ViewTransform::new();
        view.zoom_at(Point::ZERO, 2.0);
        let viewport = Rect::from_min_size(Point::new(100.0, 0.0), Vec2::new(800.0, 600.0));
        let target = Rect::from_min_max(Point::new(400.0, 100.0), Point::new(520.0, 250.0));
        view.center_on(&target, &viewport);
        let screen = view.scene_to_screen(Point::new(460.0, 175.0));
        assert!(close(screen.x, 500.0));
        assert!(close(screen.y, 300.0));
    }

    #[test]
    fn panning_stops_at_bounds_until_they_grow() {
        let mut view = ViewTransform::new();
        let viewport = Rect::from_min_size(Point::ZERO, Vec2::new(400.0, 300.0));
        let bounds = Rect::from_min_max(Point::ZERO, Point::new(1000.0, 1000.0));

        view.pan_by(Vec2::new(-5000.0, -5000.0));
        view.clamp_to(&bounds, &viewport);
        let corner = view.scene_to_screen(bounds.max);
        assert!(close(corner.x, 400.0));
        assert!(close(corner.y, 300.0));

        view.pan_by(Vec2::new(5000.0, 0.0));
        view.clamp_to(&bounds, &viewport);
        assert!(close(view.scene_to_screen(bounds.min).x, 0.0));

        let grown = bounds.expand(50.0);
        view.pan_by(Vec2::new(5000.0, -5000.0));
        view.clamp_to(&grown, &viewport);
        let top_left = view.scene_to_screen(Point::new(-50.0, 0.0));
        assert!(close(top_left.x, 0.0));
        assert!(close(view.scene_to_screen(grown.max).y, 300.0));
    }

    #[test]
    fn narrow_bounds_stay_centered() {
        let mut view = ViewTransform::new();
        let viewport = Rect::from_min_size(Point::ZERO, Vec2::new(400.0, 300.0));
        let bounds = Rect::from_min_max(Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        view.pan_by(Vec2::new(123.0, -45.0));
        view.clamp_to(&bounds, &viewport);
        let center = view.scene_to_screen(bounds.center());
        assert!(close(center.x, 200.0));
        assert!(close(center.y, 150.0));

        view.clamp_to(&Rect::NOTHING, &viewport);
        let unchanged = view.scene_to_screen(bounds.center());
        assert!(close(unchanged.x, 200.0));
    }
}
