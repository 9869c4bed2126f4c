//! Scene state and its per-frame update.
//!
//! Boundary nodes sit in two vertical columns near the left and right edges.
//! Each is joined to a shared convergence point by a quadratic curve, and a
//! small pool of particles flows along those curves toward the center.
//! Everything here is plain data plus [`Scene::advance`]; drawing lives in
//! [`render`](crate::render).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::debug;

/// Viewports narrower than this get the reduced node and particle counts.
pub const NARROW_BREAKPOINT: f32 = 640.0;
/// Boundary nodes on a wide viewport.
pub const NODE_COUNT: usize = 20;
/// Boundary nodes on a narrow viewport.
pub const NARROW_NODE_COUNT: usize = 10;
/// Particles on a wide viewport.
pub const PARTICLE_COUNT: usize = 10;
/// Particles on a narrow viewport.
pub const NARROW_PARTICLE_COUNT: usize = 4;

/// Edge opacity at the boundary node.
pub const EDGE_ALPHA_MIN: f32 = 0.12;
/// Edge opacity at the center.
pub const EDGE_ALPHA_MAX: f32 = 0.47;
/// Edge opacity under a passing particle.
pub const LINE_PULSE_ALPHA: f32 = 0.85;
/// How far from a particle an edge is brightened, in pixels.
pub const PULSE_RADIUS: f32 = 35.0;
/// Curvature of the edges, as a fraction of their length.
pub const BEZIER_BOW: f32 = 0.18;

/// Progress per frame at unit speed.
pub const PROGRESS_STEP: f32 = 0.003;
/// Frame rate the progress step is tuned for.
pub const REFERENCE_FPS: f32 = 60.0;
/// Particle speed range.
pub const SPEED_RANGE: std::ops::Range<f32> = 0.25..0.60;

/// How long a ripple is visible.
pub const RIPPLE_DURATION: Duration = Duration::from_millis(600);
/// Ripple growth rate, in pixels per second.
pub const RIPPLE_SPEED: f32 = 120.0;

const FADE_SPAN: f32 = 0.3;
const PULSE_SAMPLES: usize = 50;

/// A point or vector in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing downward.
    pub y: f32,
}

impl Vec2 {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Vec2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Point at `t` on the quadratic curve from `p0` to `p2` pulled toward `p1`.
pub fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    Vec2 {
        x: u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
        y: u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
    }
}

/// Opacity of the edge segment centered at `t`, with `pulse` from
/// [`Scene::edge_pulse`].
///
/// Brightens from node to center, fades out over the first 30% near the node,
/// and is boosted where a particle passes. Clamped to 1.
pub fn edge_alpha(t: f32, pulse: f32) -> f32 {
    let fade = if t < FADE_SPAN { (t / FADE_SPAN) * FADE_SPAN } else { 1.0 };
    let boost = if pulse > 0.0 {
        pulse * (LINE_PULSE_ALPHA - EDGE_ALPHA_MAX)
    } else {
        0.0
    };
    let base = EDGE_ALPHA_MIN + (EDGE_ALPHA_MAX - EDGE_ALPHA_MIN) * t + boost;
    (base * fade).min(1.0)
}

/// Curve from a boundary node to the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Index of the boundary node.
    pub node: usize,
    /// Control point of the curve.
    pub control: Vec2,
}

/// A particle riding an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Index of the edge.
    pub edge: usize,
    /// Position along the edge, in `[0, 1]`.
    pub progress: f32,
    /// Speed multiplier.
    pub speed: f32,
}

/// Expanding ring around the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    /// Time since the ripple started.
    pub elapsed: Duration,
}

impl Ripple {
    /// Fraction of [`RIPPLE_DURATION`] elapsed.
    pub fn progress(&self) -> f32 {
        self.elapsed.as_secs_f32() / RIPPLE_DURATION.as_secs_f32()
    }

    /// Current ring radius.
    pub fn radius(&self) -> f32 {
        self.elapsed.as_secs_f32() * RIPPLE_SPEED
    }

    /// Current ring opacity.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.progress()).max(0.0) * 0.4
    }
}

/// The animated node/edge diagram.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f32,
    height: f32,
    nodes: Vec<Vec2>,
    center: Vec2,
    edges: Vec<Edge>,
    particles: Vec<Particle>,
    ripple: Option<Ripple>,
    last_trigger: u64,
    elapsed: Duration,
    rng: StdRng,
}

impl Scene {
    /// Build a scene for a `width` x `height` surface.
    pub fn new(width: f32, height: f32, rng: StdRng) -> Self {
        let mut scene = Self {
            width,
            height,
            nodes: Vec::new(),
            center: Vec2::default(),
            edges: Vec::new(),
            particles: Vec::new(),
            ripple: None,
            last_trigger: 0,
            elapsed: Duration::ZERO,
            rng,
        };
        scene.init();
        scene
    }

    /// Build a scene with a reproducible layout.
    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::new(width, height, StdRng::seed_from_u64(seed))
    }

    /// Surface width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Surface height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Boundary nodes, left column first.
    pub fn nodes(&self) -> &[Vec2] {
        &self.nodes
    }

    /// Convergence point.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// One edge per node, in node order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Particle pool.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Active ripple.
    pub fn ripple(&self) -> Option<&Ripple> {
        self.ripple.as_ref()
    }

    /// Total time advanced.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the reduced counts apply.
    pub fn is_narrow(&self) -> bool {
        self.width < NARROW_BREAKPOINT
    }

    /// Adopt new surface dimensions.
    ///
    /// Node positions, edge controls and particle assignments are all
    /// regenerated. Returns `false`, changing nothing, when the size is the
    /// same.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        debug!(width, height, "Resizing plexus scene");
        self.width = width;
        self.height = height;
        self.init();
        true
    }

    /// Move the animation forward by `dt`.
    ///
    /// Particle progress is scaled so one [`REFERENCE_FPS`] frame moves it
    /// by `PROGRESS_STEP * speed`. A particle that passes the end of its edge
    /// starts again at 0. An expired ripple is removed.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;

        let frames = dt.as_secs_f32() * REFERENCE_FPS;
        for particle in &mut self.particles {
            particle.progress += PROGRESS_STEP * particle.speed * frames;
            if particle.progress > 1.0 {
                particle.progress = 0.0;
            }
        }

        if let Some(ripple) = &mut self.ripple {
            ripple.elapsed += dt;
            if ripple.elapsed >= RIPPLE_DURATION {
                self.ripple = None;
            }
        }
    }

    /// Start a ripple when `counter` differs from the last one seen.
    ///
    /// A ripple already on screen starts over. Returns whether a ripple was
    /// started.
    pub fn trigger_ripple(&mut self, counter: u64) -> bool {
        if counter == self.last_trigger {
            return false;
        }
        self.last_trigger = counter;
        self.ripple = Some(Ripple {
            elapsed: Duration::ZERO,
        });
        debug!(counter, "Ripple triggered");
        true
    }

    /// Fraction of the ripple's lifetime elapsed, if one is active.
    pub fn ripple_progress(&self) -> Option<f32> {
        self.ripple.as_ref().map(Ripple::progress)
    }

    /// Endpoints and control point of an edge.
    pub fn edge_curve(&self, edge: usize) -> Option<(Vec2, Vec2, Vec2)> {
        let edge = self.edges.get(edge)?;
        let node = *self.nodes.get(edge.node)?;
        Some((node, edge.control, self.center))
    }

    /// Current position of particle `index`.
    pub fn particle_position(&self, index: usize) -> Option<Vec2> {
        let particle = self.particles.get(index)?;
        let (p0, p1, p2) = self.edge_curve(particle.edge)?;
        Some(quadratic_bezier(p0, p1, p2, particle.progress))
    }

    /// Brightness boost on `edge` from the particles riding it, in `[0, 0.7]`.
    pub fn edge_pulse(&self, edge: usize) -> f32 {
        let Some((p0, p1, p2)) = self.edge_curve(edge) else {
            return 0.0;
        };

        let mut pulse: f32 = 0.0;
        for (index, particle) in self.particles.iter().enumerate() {
            if particle.edge != edge {
                continue;
            }
            let Some(position) = self.particle_position(index) else {
                continue;
            };
            for sample in 0..=PULSE_SAMPLES {
                let t = sample as f32 / PULSE_SAMPLES as f32;
                let d = quadratic_bezier(p0, p1, p2, t).distance(position);
                if d < PULSE_RADIUS {
                    pulse = pulse.max((1.0 - d / PULSE_RADIUS) * 0.7);
                }
            }
        }
        pulse
    }

    /// Opacity multiplier of node `index`, in `[0.2, 1.0]`.
    ///
    /// Each node is phase-shifted so neighbours do not pulse together.
    pub fn node_brightness(&self, index: usize) -> f32 {
        let time = self.elapsed.as_secs_f32();
        0.4 * (time * 1.5 + index as f32 * 0.7).sin() + 0.6
    }

    fn init(&mut self) {
        let (node_count, particle_count) = if self.is_narrow() {
            (NARROW_NODE_COUNT, NARROW_PARTICLE_COUNT)
        } else {
            (NODE_COUNT, PARTICLE_COUNT)
        };
        self.init_nodes(node_count);
        self.init_edges();
        self.init_particles(particle_count);
    }

    fn init_nodes(&mut self, count: usize) {
        let (w, h) = (self.width, self.height);
        self.center = Vec2::new(w * 0.5, h * 0.6);

        let per_column = count / 2;
        let spacing = per_column.saturating_sub(1).max(1) as f32;
        self.nodes.clear();
        for column_start in [0.05, 0.82] {
            for i in 0..per_column {
                let x = w * (column_start + self.rng.gen::<f32>() * 0.13);
                let y = h * (0.15 + (i as f32 / spacing) * 0.7);
                self.nodes.push(Vec2::new(x, y));
            }
        }
    }

    fn init_edges(&mut self) {
        let center = self.center;
        self.edges = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mid = Vec2::new((node.x + center.x) * 0.5, (node.y + center.y) * 0.5);
                let (dx, dy) = (center.x - node.x, center.y - node.y);
                let len = match dx.hypot(dy) {
                    l if l > 0.0 => l,
                    _ => 1.0,
                };
                let (perp_x, perp_y) = (-dy / len, dx / len);
                let bow = if i % 2 == 0 { BEZIER_BOW } else { -BEZIER_BOW };
                Edge {
                    node: i,
                    control: Vec2::new(mid.x + perp_x * len * bow, mid.y + perp_y * len * bow),
                }
            })
            .collect();
    }

    fn init_particles(&mut self, count: usize) {
        let edge_count = self.edges.len();
        self.particles.clear();
        if edge_count == 0 {
            return;
        }
        for i in 0..count {
            self.particles.push(Particle {
                edge: i % edge_count,
                progress: self.rng.gen::<f32>(),
                speed: self.rng.gen_range(SPEED_RANGE),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn scene() -> Scene {
        Scene::with_seed(1280.0, 720.0, 7)
    }

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(actual.distance(expected) < 1e-3, "{actual:?} != {expected:?}");
    }

    #[test]
    fn test_wide_layout() {
        let scene = scene();
        assert_eq!(scene.nodes().len(), NODE_COUNT);
        assert_eq!(scene.edges().len(), NODE_COUNT);
        assert_eq!(scene.particles().len(), PARTICLE_COUNT);
        assert_near(scene.center(), Vec2::new(640.0, 432.0));

        let (left, right) = scene.nodes().split_at(NODE_COUNT / 2);
        for node in left {
            assert!((63.9..=230.5).contains(&node.x), "{node:?}");
        }
        for node in right {
            assert!((1049.5..=1216.1).contains(&node.x), "{node:?}");
        }
        for node in scene.nodes() {
            assert!((107.9..=612.1).contains(&node.y), "{node:?}");
        }
    }

    #[test]
    fn test_narrow_layout() {
        let scene = Scene::with_seed(400.0, 800.0, 1);
        assert!(scene.is_narrow());
        assert_eq!(scene.nodes().len(), NARROW_NODE_COUNT);
        assert_eq!(scene.particles().len(), NARROW_PARTICLE_COUNT);
    }

    #[test]
    fn test_edges_bow_alternately() {
        let scene = scene();
        let side = |i: usize| {
            let (p0, p1, p2) = scene.edge_curve(i).unwrap();
            // sign of the cross product of (p2 - p0) and (p1 - p0)
            ((p2.x - p0.x) * (p1.y - p0.y) - (p2.y - p0.y) * (p1.x - p0.x)).signum()
        };
        assert_ne!(side(0), side(1));
        assert_eq!(side(0), side(2));
    }

    #[test]
    fn test_particles_assigned_round_robin() {
        let scene = scene();
        for (i, particle) in scene.particles().iter().enumerate() {
            assert_eq!(particle.edge, i % NODE_COUNT);
            assert!(SPEED_RANGE.contains(&particle.speed));
            assert!((0.0..=1.0).contains(&particle.progress));
        }
    }

    #[test]
    fn test_progress_step_at_reference_rate() {
        let mut scene = scene();
        let before = scene.particles()[0];
        scene.advance(Duration::from_secs_f32(1.0 / REFERENCE_FPS));
        let after = scene.particles()[0];
        if after.progress != 0.0 {
            let expected = before.progress + PROGRESS_STEP * before.speed;
            assert!((after.progress - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_particle_wraps_to_zero() {
        let mut scene = scene();
        scene.particles[0].progress = 0.9995;
        scene.particles[0].speed = 0.5;

        scene.advance(FRAME);
        assert_eq!(scene.particles()[0].progress, 0.0);

        for _ in 0..10_000 {
            scene.advance(FRAME);
            assert!(scene.particles().iter().all(|p| (0.0..=1.0).contains(&p.progress)));
        }
    }

    #[test]
    fn test_ripple_restarts_on_new_trigger() {
        let mut scene = scene();
        assert!(scene.ripple_progress().is_none());

        assert!(scene.trigger_ripple(1));
        scene.advance(Duration::from_millis(300));
        assert!((scene.ripple_progress().unwrap() - 0.5).abs() < 1e-3);

        assert!(scene.trigger_ripple(2));
        assert_eq!(scene.ripple_progress(), Some(0.0));
    }

    #[test]
    fn test_same_trigger_is_ignored() {
        let mut scene = scene();
        assert!(!scene.trigger_ripple(0));
        scene.trigger_ripple(5);
        scene.advance(Duration::from_millis(100));
        assert!(!scene.trigger_ripple(5));
        assert!(scene.ripple_progress().unwrap() > 0.0);
    }

    #[test]
    fn test_ripple_cleared_after_duration() {
        let mut scene = scene();
        scene.trigger_ripple(1);
        scene.advance(Duration::from_millis(599));
        assert!(scene.ripple().is_some());
        scene.advance(Duration::from_millis(1));
        assert!(scene.ripple().is_none());
    }

    #[test]
    fn test_ripple_geometry() {
        let ripple = Ripple {
            elapsed: Duration::from_millis(300),
        };
        assert!((ripple.radius() - 36.0).abs() < 1e-3);
        assert!((ripple.alpha() - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_resize_regenerates_geometry() {
        let mut scene = scene();
        let old_nodes = scene.nodes().to_vec();
        let old_controls: Vec<_> = scene.edges().iter().map(|e| e.control).collect();

        assert!(scene.resize(1920.0, 1080.0));
        assert_near(scene.center(), Vec2::new(960.0, 648.0));
        assert_ne!(scene.nodes(), old_nodes.as_slice());
        let new_controls: Vec<_> = scene.edges().iter().map(|e| e.control).collect();
        assert_ne!(new_controls, old_controls);
        for node in &scene.nodes()[..NODE_COUNT / 2] {
            assert!(node.x <= 345.7);
        }

        assert!(scene.resize(500.0, 1080.0));
        assert_eq!(scene.nodes().len(), NARROW_NODE_COUNT);
        assert_eq!(scene.particles().len(), NARROW_PARTICLE_COUNT);
        assert!(scene.particles().iter().all(|p| p.edge < NARROW_NODE_COUNT));
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut scene = scene();
        let nodes = scene.nodes().to_vec();
        assert!(!scene.resize(1280.0, 720.0));
        assert_eq!(scene.nodes(), nodes.as_slice());
    }

    #[test]
    fn test_edge_alpha_profile() {
        assert_eq!(edge_alpha(0.0, 0.0), 0.0);
        assert!(edge_alpha(0.15, 0.0) < edge_alpha(0.5, 0.0));
        assert!((edge_alpha(1.0, 0.0) - EDGE_ALPHA_MAX).abs() < 1e-6);
        assert!(edge_alpha(0.5, 0.7) > edge_alpha(0.5, 0.0));
        assert!(edge_alpha(1.0, 10.0) <= 1.0);
    }

    #[test]
    fn test_edge_pulse_near_particle() {
        let scene = scene();
        let pulse = scene.edge_pulse(0);
        // a particle on the edge is at distance ~0 from some sample
        assert!(pulse > 0.5 && pulse <= 0.7, "{pulse}");
        // edges beyond the particle pool carry none
        assert_eq!(scene.edge_pulse(NODE_COUNT - 1), 0.0);
        assert_eq!(scene.edge_pulse(999), 0.0);
    }

    #[test]
    fn test_node_brightness_staggered() {
        let mut scene = scene();
        scene.advance(Duration::from_millis(500));
        let a = scene.node_brightness(0);
        let b = scene.node_brightness(1);
        assert_ne!(a, b);
        for i in 0..NODE_COUNT {
            let v = scene.node_brightness(i);
            assert!((0.2..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_quadratic_bezier_endpoints() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(5.0, 10.0);
        let p2 = Vec2::new(10.0, 0.0);
        assert_eq!(quadratic_bezier(p0, p1, p2, 0.0), p0);
        assert_eq!(quadratic_bezier(p0, p1, p2, 1.0), p2);
        assert_eq!(quadratic_bezier(p0, p1, p2, 0.5), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Scene::with_seed(1024.0, 768.0, 42);
        let b = Scene::with_seed(1024.0, 768.0, 42);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.particles(), b.particles());
    }
}
