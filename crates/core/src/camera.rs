//! Smoothed follow camera with culling bounds and parallax offsets.

use crate::params::Params;
use crate::{rects_intersect, Point, Rect, HZ};

/// Scroll-speed multiplier per background layer.
pub const PARALLAX_LAYERS: [(&str, f32); 6] = [
    ("sky", 0.0),
    ("clouds", 0.02),
    ("distantMountains", 0.03),
    ("mountains", 0.05),
    ("trees", 1.0 / 30.0),
    ("bushes", 1.0 / 30.0),
];

/// Translation a renderer applies before drawing world-space geometry.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CameraTransform {
    pub translate_x: f32,
    pub translate_y: f32,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    target_x: f32,
    target_y: f32,
    smoothness_x: f32,
    smoothness_y: f32,
    offset_x: f32,
    offset_y: f32,
    width: f32,
    height: f32,
    render_buffer: f32,
}

/// Where the followed target sits on screen, as a fraction of the viewport.
/// Landscape keeps it left of and below center to show more track ahead;
/// portrait keeps it near the middle.
fn view_offset(width: f32, height: f32) -> (f32, f32) {
    if width < height {
        (width * 0.5, height * 0.55)
    } else {
        (width * 0.3, height * 0.6)
    }
}

/// Fraction of the remaining distance covered in `dt` seconds when
/// `smoothness` is the fraction covered per 1/60 s step.
pub fn blend_factor(smoothness: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    let s = smoothness.clamp(0.0, 1.0);
    1.0 - (1.0 - s).powf(dt * HZ)
}

impl Camera {
    pub fn new(width: f32, height: f32, params: &Params) -> Self {
        let (offset_x, offset_y) = view_offset(width, height);
        Self {
            x: 0.0,
            y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            smoothness_x: params.camera_smoothness_x,
            smoothness_y: params.camera_smoothness_y,
            offset_x,
            offset_y,
            width,
            height,
            render_buffer: params.camera_render_buffer,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let bx = blend_factor(self.smoothness_x, dt);
        let by = blend_factor(self.smoothness_y, dt);
        self.x += (self.target_x - self.x) * bx;
        self.y += (self.target_y - self.y) * by;
    }

    pub fn follow(&mut self, target: Point) {
        self.target_x = target.x - self.offset_x;
        self.target_y = target.y - self.offset_y;
    }

    /// Jumps straight to the current target.
    pub fn snap(&mut self) {
        self.x = self.target_x;
        self.y = self.target_y;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        (self.offset_x, self.offset_y) = view_offset(width, height);
    }

    pub fn set_smoothness(&mut self, x: f32, y: f32) {
        self.smoothness_x = x.clamp(0.0, 1.0);
        self.smoothness_y = y.clamp(0.0, 1.0);
    }

    /// Viewport grown by the render buffer on every side.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height).expand(self.render_buffer)
    }

    pub fn is_visible(&self, rect: &Rect) -> bool {
        rects_intersect(&self.bounds(), rect)
    }

    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            translate_x: -self.x,
            translate_y: -self.y,
        }
    }

    /// Layer scroll offset; unknown layers do not scroll.
    pub fn parallax_offset(&self, layer: &str) -> Point {
        let speed = PARALLAX_LAYERS
            .iter()
            .find(|(name, _)| *name == layer)
            .map_or(0.0, |(_, speed)| *speed);
        Point::new(self.x * speed, self.y * speed)
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn target(&self) -> Point {
        Point::new(self.target_x, self.target_y)
    }

    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::{blend_factor, Camera};
    use crate::params::Params;
    use crate::{Point, Rect, DT};

    fn camera() -> Camera {
        Camera::new(800.0, 600.0, &Params::default())
    }

    #[test]
    fn one_reference_step_blends_by_smoothness() {
        assert_relative_eq!(blend_factor(0.1, DT), 0.1, epsilon = 1e-5);
        assert_eq!(blend_factor(0.1, 0.0), 0.0);
        assert_eq!(blend_factor(1.0, DT), 1.0);
    }

    #[test]
    fn convergence_is_frame_rate_independent() {
        let mut fast = camera();
        let mut slow = camera();
        fast.follow(Point::new(1000.0, 500.0));
        slow.follow(Point::new(1000.0, 500.0));
        for _ in 0..60 {
            fast.update(1.0 / 60.0);
        }
        for _ in 0..30 {
            slow.update(1.0 / 30.0);
        }
        assert_relative_eq!(fast.x, slow.x, epsilon = 1e-2);
        assert_relative_eq!(fast.y, slow.y, epsilon = 1e-2);
    }

    #[rstest]
    #[case(0.05, 1.0 / 144.0)]
    #[case(0.12, 1.0 / 60.0)]
    #[case(0.5, 0.1)]
    #[case(0.99, 0.25)]
    fn approaches_monotonically_without_overshoot(#[case] smoothness: f32, #[case] dt: f32) {
        let mut cam = camera();
        cam.set_smoothness(smoothness, smoothness);
        cam.follow(Point::new(900.0, 1400.0));
        let target = cam.target();
        let mut previous = (target.x - cam.x).abs();
        for _ in 0..200 {
            cam.update(dt);
            let gap = (target.x - cam.x).abs();
            assert!(gap <= previous);
            assert!(cam.x <= target.x && cam.y <= target.y);
            previous = gap;
        }
    }

    #[test]
    fn landscape_keeps_target_left_of_center() {
        let mut cam = camera();
        cam.follow(Point::new(1000.0, 1000.0));
        cam.snap();
        let on_screen = Point::new(1000.0 - cam.x, 1000.0 - cam.y);
        assert!(on_screen.x < 400.0);
        assert!(on_screen.y > 300.0);
    }

    #[test]
    fn portrait_centers_horizontally() {
        let cam = Camera::new(400.0, 800.0, &Params::default());
        assert_eq!(cam.offset().x, 200.0);
    }

    #[test]
    fn bounds_include_render_buffer() {
        let cam = camera();
        let bounds = cam.bounds();
        assert_eq!(bounds.x, -200.0);
        assert_eq!(bounds.w, 1200.0);
        assert_eq!(bounds.h, 1000.0);
    }

    #[rstest]
    #[case("sky", 0.0)]
    #[case("clouds", 20.0)]
    #[case("mountains", 50.0)]
    #[case("trees", 1000.0 / 30.0)]
    #[case("lava", 0.0)]
    fn parallax_scales_position(#[case] layer: &str, #[case] expected: f32) {
        let mut cam = camera();
        cam.x = 1000.0;
        cam.y = 0.0;
        assert_relative_eq!(cam.parallax_offset(layer).x, expected, epsilon = 1e-4);
    }

    #[test]
    fn culling_uses_buffered_bounds() {
        let cam = camera();
        assert!(cam.is_visible(&Rect::new(-150.0, 0.0, 10.0, 10.0)));
        assert!(!cam.is_visible(&Rect::new(1010.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn transform_negates_position() {
        let mut cam = camera();
        cam.x = 10.0;
        cam.y = -4.0;
        let t = cam.transform();
        assert_eq!((t.translate_x, t.translate_y), (-10.0, 4.0));
    }
}
