//! Drawing a [`Scene`] onto a 2D surface.

use crate::scene::{edge_alpha, quadratic_bezier, Scene, Vec2};
use std::time::Duration;
use tracing::trace;

/// Segments each edge is drawn with, so opacity can vary along it.
pub const EDGE_SEGMENTS: usize = 50;
/// Particle glow radius.
pub const PARTICLE_RADIUS: f32 = 6.0;
/// Boundary node radius.
pub const NODE_RADIUS: f32 = 1.2;
/// Center glow radius.
pub const CENTER_GLOW_RADIUS: f32 = 25.0;
/// Ripple ring stroke width.
pub const RIPPLE_LINE_WIDTH: f32 = 2.0;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f32,
}

impl Rgba {
    /// Soft violet used for edges, nodes, the center glow and the ripple.
    pub const VIOLET: Rgba = Rgba::rgb(177, 158, 239);
    /// Cyan used for particles.
    pub const CYAN: Rgba = Rgba::rgb(0, 242, 255);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with opacity `a`.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// A color stop of a radial gradient: offset from center in `[0, 1]`, color.
pub type GradientStop = (f32, Rgba);

/// Minimal 2D drawing target.
///
/// Implement it over a canvas, a GPU painter or a recorder.
pub trait Surface {
    /// Clear the whole surface.
    fn clear(&mut self, width: f32, height: f32);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    /// Fill a solid circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Fill a circle with a radial gradient.
    fn fill_radial(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]);

    /// Stroke a circle outline.
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32);
}

/// Draw one frame of `scene`.
///
/// Order: edges, particles, nodes, center glow, ripple.
pub fn render(scene: &Scene, surface: &mut dyn Surface) {
    surface.clear(scene.width(), scene.height());

    for index in 0..scene.edges().len() {
        draw_edge(scene, index, surface);
    }

    for index in 0..scene.particles().len() {
        if let Some(position) = scene.particle_position(index) {
            surface.fill_radial(
                position,
                PARTICLE_RADIUS,
                &[
                    (0.0, Rgba::CYAN),
                    (0.5, Rgba::CYAN.with_alpha(0.35)),
                    (1.0, Rgba::CYAN.with_alpha(0.0)),
                ],
            );
        }
    }

    for (index, node) in scene.nodes().iter().enumerate() {
        let alpha = 0.5 * scene.node_brightness(index);
        surface.fill_circle(*node, NODE_RADIUS, Rgba::VIOLET.with_alpha(alpha));
    }

    surface.fill_radial(
        scene.center(),
        CENTER_GLOW_RADIUS,
        &[
            (0.0, Rgba::VIOLET.with_alpha(0.4)),
            (0.5, Rgba::VIOLET.with_alpha(0.15)),
            (1.0, Rgba::VIOLET.with_alpha(0.0)),
        ],
    );

    if let Some(ripple) = scene.ripple() {
        surface.stroke_circle(
            scene.center(),
            ripple.radius(),
            Rgba::VIOLET.with_alpha(ripple.alpha()),
            RIPPLE_LINE_WIDTH,
        );
    }
}

fn draw_edge(scene: &Scene, index: usize, surface: &mut dyn Surface) {
    let Some((p0, p1, p2)) = scene.edge_curve(index) else {
        return;
    };
    let pulse = scene.edge_pulse(index);

    let mut from = p0;
    for segment in 0..EDGE_SEGMENTS {
        let t0 = segment as f32 / EDGE_SEGMENTS as f32;
        let t1 = (segment + 1) as f32 / EDGE_SEGMENTS as f32;
        let to = quadratic_bezier(p0, p1, p2, t1);
        let alpha = edge_alpha((t0 + t1) * 0.5, pulse);
        surface.stroke_line(from, to, Rgba::VIOLET.with_alpha(alpha), 1.0);
        from = to;
    }
}

/// A scene bound to an optional drawing surface.
///
/// Without a surface, frames do nothing at all: the scene does not advance.
#[derive(Debug)]
pub struct PlexusView<S> {
    scene: Scene,
    surface: Option<S>,
}

impl<S: Surface> PlexusView<S> {
    /// A view with no surface yet.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            surface: None,
        }
    }

    /// A view drawing onto `surface`.
    pub fn with_surface(scene: Scene, surface: S) -> Self {
        Self {
            scene,
            surface: Some(surface),
        }
    }

    /// Attach a surface, returning the previous one.
    pub fn attach(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    /// Detach the surface.
    pub fn detach(&mut self) -> Option<S> {
        self.surface.take()
    }

    /// Attached surface.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Advance by `dt` and draw. Returns whether a frame was drawn.
    pub fn frame(&mut self, dt: Duration) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.scene.advance(dt);
        render(&self.scene, surface);
        trace!(elapsed = ?self.scene.elapsed(), "Frame drawn");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Line(Rgba),
        Circle(f32, Rgba),
        /// Radius and innermost stop color.
        Radial(f32, Rgba),
        Ring(f32, Rgba),
    }

    #[derive(Debug, Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self, _width: f32, _height: f32) {
            self.ops.push(Op::Clear);
        }

        fn stroke_line(&mut self, _from: Vec2, _to: Vec2, color: Rgba, _width: f32) {
            self.ops.push(Op::Line(color));
        }

        fn fill_circle(&mut self, _center: Vec2, radius: f32, color: Rgba) {
            self.ops.push(Op::Circle(radius, color));
        }

        fn fill_radial(&mut self, _center: Vec2, radius: f32, stops: &[GradientStop]) {
            self.ops.push(Op::Radial(radius, stops[0].1));
        }

        fn stroke_circle(&mut self, _center: Vec2, radius: f32, color: Rgba, _width: f32) {
            self.ops.push(Op::Ring(radius, color));
        }
    }

    fn scene() -> Scene {
        Scene::with_seed(1280.0, 720.0, 3)
    }

    #[test]
    fn test_render_draw_order() {
        let scene = scene();
        let mut surface = RecordingSurface::default();
        render(&scene, &mut surface);

        let edges = scene.edges().len();
        let particles = scene.particles().len();
        let nodes = scene.nodes().len();
        let ops = &surface.ops;

        assert_eq!(ops[0], Op::Clear);
        let lines = &ops[1..1 + edges * EDGE_SEGMENTS];
        assert!(lines.iter().all(|op| matches!(op, Op::Line(_))));

        let rest = &ops[1 + edges * EDGE_SEGMENTS..];
        assert_eq!(rest.len(), particles + nodes + 1);
        assert!(rest[..particles]
            .iter()
            .all(|op| *op == Op::Radial(PARTICLE_RADIUS, Rgba::CYAN)));
        assert!(rest[particles..particles + nodes]
            .iter()
            .all(|op| matches!(op, Op::Circle(r, _) if *r == NODE_RADIUS)));
        assert_eq!(
            rest.last(),
            Some(&Op::Radial(CENTER_GLOW_RADIUS, Rgba::VIOLET.with_alpha(0.4)))
        );
    }

    #[test]
    fn test_edge_alpha_never_exceeds_one() {
        let mut scene = scene();
        let mut surface = RecordingSurface::default();
        for _ in 0..120 {
            scene.advance(Duration::from_millis(16));
            render(&scene, &mut surface);
        }
        for op in &surface.ops {
            if let Op::Line(color) = op {
                assert!((0.0..=1.0).contains(&color.a));
            }
        }
    }

    #[test]
    fn test_ripple_ring_drawn_while_active() {
        let mut scene = scene();
        scene.trigger_ripple(1);
        scene.advance(Duration::from_millis(300));

        let mut surface = RecordingSurface::default();
        render(&scene, &mut surface);
        match surface.ops.last() {
            Some(Op::Ring(radius, color)) => {
                assert!((radius - 36.0).abs() < 1e-3);
                assert!((color.a - 0.2).abs() < 1e-3);
            }
            other => panic!("expected ripple ring, got {other:?}"),
        }
    }

    #[test]
    fn test_view_without_surface_is_noop() {
        let mut view: PlexusView<RecordingSurface> = PlexusView::new(scene());
        assert!(!view.frame(Duration::from_millis(16)));
        assert_eq!(view.scene().elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_view_frame_advances_and_draws() {
        let mut view = PlexusView::with_surface(scene(), RecordingSurface::default());
        assert!(view.frame(Duration::from_millis(16)));
        assert_eq!(view.scene().elapsed(), Duration::from_millis(16));
        assert_eq!(view.surface().unwrap().ops[0], Op::Clear);

        let surface = view.detach().unwrap();
        assert!(!surface.ops.is_empty());
        assert!(!view.frame(Duration::from_millis(16)));
    }
}
