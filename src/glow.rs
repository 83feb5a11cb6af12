//! Holographic glow: depth coloring and multi-pass draw batches.
//!
//! The renderer does not talk to the GPU. It turns a shape, a particle list
//! and the transition state into a [`Frame`]: batches of line strips and
//! points, already rotated, each vertex carrying its own color and alpha.
//! Everything in a frame is meant to be composited additively
//! (`src * alpha + dst`) with no depth test, so draw order does not matter
//! and overlapping passes simply add up into a glow.
//!
//! Glow comes from drawing the same geometry several times:
//!
//! | Pass exponent `e` | Width | Alpha |
//! |-------------------|-------|-------|
//! | `P - 1` (first) | `base * expansion^(P-1)` | `falloff^(P-1)` |
//! | ... | ... | ... |
//! | `0` (last) | `base` | `1` |

use glam::{Mat3, Vec3};

use crate::config::{rgb, ColorConfig, HoloConfig};
use crate::geometry::Shape;
use crate::particles::Particle;
use crate::random::RandomSource;
use crate::scene::HoloScene;
use crate::transition::TransitionPhase;

/// Trail line width in pixels.
const TRAIL_WIDTH: f32 = 1.5;
/// Peak trail alpha, reached at the newest sample.
const TRAIL_ALPHA: f32 = 0.7;
/// Particle halo: size grows by this per pass outward.
const PARTICLE_GLOW_EXPANSION: f32 = 1.5;
/// Particle halo: alpha shrinks by this per pass outward.
const PARTICLE_GLOW_FALLOFF: f32 = 0.6;
const PARTICLE_GLOW_PASSES: i32 = 2;

/// Dissolve bursts appear once progress passes this.
const DISSOLVE_BURST_START: f32 = 0.2;
const DISSOLVE_BURST_SPREAD: f32 = 50.0;
/// Reform bursts fade out by this progress.
const REFORM_BURST_END: f32 = 0.8;
const REFORM_BURST_SPREAD: f32 = 80.0;

/// Far → mid → near color ramp over model-space z.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGradient {
    near: Vec3,
    mid: Vec3,
    far: Vec3,
    z_near: f32,
    z_far: f32,
}

impl DepthGradient {
    pub fn new(config: &ColorConfig) -> Self {
        Self {
            near: rgb(config.near),
            mid: rgb(config.mid),
            far: rgb(config.far),
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    /// Color for depth `z`, 0-1 per channel.
    pub fn color(&self, z: f32) -> Vec3 {
        let range = self.z_near - self.z_far;
        let z_norm = if range == 0.0 {
            0.5
        } else {
            ((z - self.z_far) / range).clamp(0.0, 1.0)
        };

        if z_norm < 0.5 {
            self.far.lerp(self.mid, z_norm * 2.0)
        } else {
            self.mid.lerp(self.near, (z_norm - 0.5) * 2.0)
        }
    }
}

/// One vertex of a frame, in rotated world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub alpha: f32,
}

/// Line strips sharing one width in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBatch {
    pub width: f32,
    pub strips: Vec<Vec<GlowVertex>>,
}

impl LineBatch {
    pub fn segment_count(&self) -> usize {
        self.strips.iter().map(|s| s.len().saturating_sub(1)).sum()
    }
}

/// Points sharing one size in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    pub size: f32,
    pub points: Vec<GlowVertex>,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub lines: Vec<LineBatch>,
    pub points: Vec<PointBatch>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(LineBatch::segment_count).sum()
    }

    pub fn point_count(&self) -> usize {
        self.points.iter().map(|b| b.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0 && self.point_count() == 0
    }
}

/// Builds glow [`Frame`]s from shapes and particles.
#[derive(Debug, Clone)]
pub struct GlowRenderer {
    gradient: DepthGradient,
    line_width: f32,
    glow_passes: u32,
    glow_falloff: f32,
    glow_expansion: f32,
    particle_size: f32,
    rng: RandomSource,
}

impl GlowRenderer {
    pub fn new(config: &HoloConfig) -> Self {
        Self::with_rng(config, RandomSource::new())
    }

    /// A renderer whose burst effects are reproducible.
    pub fn with_seed(config: &HoloConfig, seed: u64) -> Self {
        Self::with_rng(config, RandomSource::with_seed(seed))
    }

    fn with_rng(config: &HoloConfig, rng: RandomSource) -> Self {
        Self {
            gradient: DepthGradient::new(&config.colors),
            line_width: config.wireframe.line_width,
            glow_passes: config.wireframe.glow_passes,
            glow_falloff: config.wireframe.glow_falloff,
            glow_expansion: config.wireframe.glow_expansion,
            particle_size: config.particles.size,
            rng,
        }
    }

    pub fn gradient(&self) -> &DepthGradient {
        &self.gradient
    }

    /// Colored vertex at model-space `point`. Color is taken before rotation.
    fn vertex(&self, rotation: &Mat3, point: Vec3, alpha: f32) -> GlowVertex {
        GlowVertex {
            position: *rotation * point,
            color: self.gradient.color(point.z),
            alpha,
        }
    }

    /// The shape's polylines in glow passes, widest and dimmest first,
    /// then its vertex subset as bright points.
    pub fn render_wireframe(&self, frame: &mut Frame, shape: &Shape, rotation: f32, alpha: f32) {
        let rot = Mat3::from_rotation_y(rotation);

        for pass in (0..self.glow_passes as i32).rev() {
            let width = self.line_width * self.glow_expansion.powi(pass);
            let pass_alpha = self.glow_falloff.powi(pass) * alpha;

            let strips = shape
                .polylines
                .iter()
                .map(|line| line.iter().map(|&p| self.vertex(&rot, p, pass_alpha)).collect())
                .collect();
            frame.lines.push(LineBatch { width, strips });
        }

        if !shape.vertices.is_empty() {
            frame.points.push(PointBatch {
                size: self.line_width * 2.0,
                points: shape
                    .vertices
                    .iter()
                    .map(|&v| self.vertex(&rot, v, alpha))
                    .collect(),
            });
        }
    }

    /// Each particle as a two-pass halo plus a fading trail.
    pub fn render_particles(
        &self,
        frame: &mut Frame,
        particles: &[Particle],
        rotation: f32,
        alpha: f32,
    ) {
        let rot = Mat3::from_rotation_y(rotation);

        for pass in (0..PARTICLE_GLOW_PASSES).rev() {
            let pass_alpha = PARTICLE_GLOW_FALLOFF.powi(pass) * alpha;
            frame.points.push(PointBatch {
                size: self.particle_size * PARTICLE_GLOW_EXPANSION.powi(pass),
                points: particles
                    .iter()
                    .map(|p| self.vertex(&rot, p.position, pass_alpha))
                    .collect(),
            });
        }

        let strips: Vec<Vec<GlowVertex>> = particles
            .iter()
            .filter(|p| p.trail.len() > 1)
            .map(|p| {
                let len = p.trail.len() as f32;
                p.trail
                    .iter()
                    .enumerate()
                    .map(|(i, q)| self.vertex(&rot, q, trail_alpha(i, len) * alpha))
                    .collect()
            })
            .collect();
        if !strips.is_empty() {
            frame.lines.push(LineBatch {
                width: TRAIL_WIDTH,
                strips,
            });
        }
    }

    /// Wireframe fading out while sparks fly off its vertices.
    pub fn render_dissolve(&mut self, frame: &mut Frame, shape: &Shape, rotation: f32, progress: f32) {
        self.render_wireframe(frame, shape, rotation, 1.0 - progress);

        if progress > DISSOLVE_BURST_START {
            let burst_alpha = (progress - DISSOLVE_BURST_START) / (1.0 - DISSOLVE_BURST_START);
            self.render_burst(frame, shape, rotation, progress * DISSOLVE_BURST_SPREAD, burst_alpha);
        }
    }

    /// Wireframe fading in while sparks converge onto its vertices.
    pub fn render_reform(&mut self, frame: &mut Frame, shape: &Shape, rotation: f32, progress: f32) {
        self.render_wireframe(frame, shape, rotation, progress);

        if progress < REFORM_BURST_END {
            let burst_alpha = 1.0 - progress / REFORM_BURST_END;
            self.render_burst(
                frame,
                shape,
                rotation,
                (1.0 - progress) * REFORM_BURST_SPREAD,
                burst_alpha,
            );
        }
    }

    /// One spark per vertex, jittered by up to `spread`, with a flicker.
    fn render_burst(&mut self, frame: &mut Frame, shape: &Shape, rotation: f32, spread: f32, alpha: f32) {
        if shape.vertices.is_empty() {
            return;
        }
        let rot = Mat3::from_rotation_y(rotation);

        let mut points = Vec::with_capacity(shape.vertices.len());
        for &v in &shape.vertices {
            let pos = v + self.rng.random_in_sphere(spread);
            let flicker = self.rng.random_range(0.3, 1.0);
            points.push(self.vertex(&rot, pos, alpha * flicker));
        }
        frame.points.push(PointBatch {
            size: self.particle_size,
            points,
        });
    }

    /// The full frame for the scene's current state.
    pub fn render(&mut self, scene: &HoloScene) -> Frame {
        let mut frame = Frame::new();
        let shape = scene.current_shape();
        let rotation = scene.rotation();

        match scene.state() {
            TransitionPhase::Holding => self.render_wireframe(&mut frame, shape, rotation, 1.0),
            TransitionPhase::Dissolving => {
                self.render_dissolve(&mut frame, shape, rotation, scene.progress())
            }
            TransitionPhase::Reforming => {
                self.render_reform(&mut frame, shape, rotation, scene.progress())
            }
        }

        self.render_particles(
            &mut frame,
            scene.particles_for_render(),
            rotation,
            scene.render_alpha(),
        );
        frame
    }
}

/// Alpha of trail sample `i` (0 = oldest) out of `len`.
fn trail_alpha(i: usize, len: f32) -> f32 {
    TRAIL_ALPHA * (i as f32 / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{wireframe_cube, CubeParams};
    use crate::particles::Trail;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn renderer() -> GlowRenderer {
        GlowRenderer::with_seed(&HoloConfig::default(), 1)
    }

    fn particle_at(position: Vec3, trail_len: usize) -> Particle {
        Particle {
            position,
            base: position,
            path_index: 0,
            t: 0.0,
            speed: 30.0,
            orbit_phase: 0.0,
            orbit_speed: 2.0,
            orbit_radius: 15.0,
            trail: Trail::filled(position, trail_len),
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        let gradient = DepthGradient::new(&ColorConfig::default());
        assert!(approx(gradient.color(30.0), Vec3::new(0.0, 1.0, 1.0)));
        assert!(approx(gradient.color(500.0), Vec3::new(0.0, 1.0, 1.0)));
        assert!(approx(gradient.color(0.0), Vec3::ONE));
        assert!(approx(gradient.color(-30.0), Vec3::new(1.0, 0.0, 0.4)));
        assert!(approx(gradient.color(-500.0), Vec3::new(1.0, 0.0, 0.4)));

        // Halfway from mid to near
        assert!(approx(gradient.color(15.0), Vec3::new(0.5, 1.0, 1.0)));
    }

    #[test]
    fn test_gradient_with_equal_thresholds_is_mid() {
        let config = ColorConfig {
            z_near: 5.0,
            z_far: 5.0,
            ..ColorConfig::default()
        };
        let gradient = DepthGradient::new(&config);
        assert!(approx(gradient.color(-100.0), Vec3::ONE));
        assert!(approx(gradient.color(100.0), Vec3::ONE));
    }

    #[test]
    fn test_wireframe_passes_widest_first() {
        let shape = wireframe_cube(&CubeParams::default());
        let mut frame = Frame::new();
        renderer().render_wireframe(&mut frame, &shape, 0.0, 1.0);

        let widths: Vec<f32> = frame.lines.iter().map(|b| b.width).collect();
        assert_eq!(widths, vec![2.5 * 1.5 * 1.5, 2.5 * 1.5, 2.5]);

        let alphas: Vec<f32> = frame.lines.iter().map(|b| b.strips[0][0].alpha).collect();
        assert_eq!(alphas, vec![0.25, 0.5, 1.0]);

        assert_eq!(frame.segment_count(), 36);
        assert_eq!(frame.points.len(), 1);
        assert_eq!(frame.points[0].size, 5.0);
        assert_eq!(frame.points[0].points.len(), 8);
    }

    #[test]
    fn test_wireframe_alpha_multiplier() {
        let shape = wireframe_cube(&CubeParams::default());
        let mut frame = Frame::new();
        renderer().render_wireframe(&mut frame, &shape, 0.0, 0.5);

        assert_eq!(frame.lines[2].strips[0][0].alpha, 0.5);
        assert_eq!(frame.points[0].points[0].alpha, 0.5);
    }

    #[test]
    fn test_rotation_keeps_model_space_color() {
        let shape = Shape {
            name: "probe".into(),
            polylines: vec![vec![Vec3::new(0.0, 0.0, 30.0), Vec3::new(0.0, 10.0, 30.0)]],
            vertices: vec![Vec3::new(0.0, 0.0, 30.0)],
            particle_paths: Vec::new(),
        };
        let mut frame = Frame::new();
        renderer().render_wireframe(&mut frame, &shape, FRAC_PI_2, 1.0);

        let v = frame.points[0].points[0];
        // +Z rotated a quarter turn about +Y lands on +X
        assert!(approx(v.position, Vec3::new(30.0, 0.0, 0.0)));
        assert!(approx(v.color, Vec3::new(0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_particle_halo_and_trail_ramp() {
        let mut frame = Frame::new();
        let particles = vec![particle_at(Vec3::ZERO, 5)];
        renderer().render_particles(&mut frame, &particles, 0.0, 1.0);

        assert_eq!(frame.points.len(), 2);
        assert_eq!(frame.points[0].size, 4.5);
        assert!((frame.points[0].points[0].alpha - 0.6).abs() < 1e-6);
        assert_eq!(frame.points[1].size, 3.0);
        assert_eq!(frame.points[1].points[0].alpha, 1.0);

        let trail = &frame.lines[0];
        assert_eq!(trail.width, 1.5);
        let alphas: Vec<f32> = trail.strips[0].iter().map(|v| v.alpha).collect();
        let expected = [0.0, 0.14, 0.28, 0.42, 0.56];
        for (a, e) in alphas.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5);
        }
    }

    #[test]
    fn test_short_trails_are_skipped() {
        let mut frame = Frame::new();
        let particles = vec![particle_at(Vec3::ZERO, 1), particle_at(Vec3::ONE, 0)];
        renderer().render_particles(&mut frame, &particles, 0.0, 1.0);
        assert!(frame.lines.is_empty());
        assert_eq!(frame.point_count(), 4);
    }

    #[test]
    fn test_dissolve_burst_threshold() {
        let shape = wireframe_cube(&CubeParams::default());
        let mut r = renderer();

        let mut early = Frame::new();
        r.render_dissolve(&mut early, &shape, 0.0, 0.1);
        assert_eq!(early.points.len(), 1);
        assert!((early.lines[2].strips[0][0].alpha - 0.9).abs() < 1e-6);

        let mut late = Frame::new();
        r.render_dissolve(&mut late, &shape, 0.0, 0.6);
        assert_eq!(late.points.len(), 2);
        let burst = &late.points[1];
        assert_eq!(burst.points.len(), 8);
        for (spark, corner) in burst.points.iter().zip(&shape.vertices) {
            assert!(spark.position.distance(*corner) <= 30.0 + 1e-3);
            assert!(spark.alpha >= 0.5 * 0.3 - 1e-6 && spark.alpha <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_reform_burst_threshold() {
        let shape = wireframe_cube(&CubeParams::default());
        let mut r = renderer();

        let mut early = Frame::new();
        r.render_reform(&mut early, &shape, 0.0, 0.4);
        assert_eq!(early.points.len(), 2);
        for spark in &early.points[1].points {
            assert!(spark.alpha <= 0.5 + 1e-6);
        }

        let mut late = Frame::new();
        r.render_reform(&mut late, &shape, 0.0, 0.9);
        assert_eq!(late.points.len(), 1);
        assert!((late.lines[2].strips[0][0].alpha - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_render_scene() {
        let mut config = HoloConfig::default();
        config.particles.count = 24;
        let scene = HoloScene::with_seed(&config, 3, 5);

        let frame = GlowRenderer::with_seed(&config, 5).render(&scene);
        // 3 wireframe passes plus one trail batch
        assert_eq!(frame.lines.len(), 4);
        // Vertex points plus the two halo passes
        assert_eq!(frame.points.len(), 3);
        assert_eq!(frame.point_count(), 8 + 24 * 2);
        assert!(!frame.is_empty());
    }
}
