//! The particle aura.
//!
//! Each particle is bound to one flow path. Every update it slides along the
//! path at its own speed, orbits the path on a small circle perpendicular to
//! the local tangent, and optionally gets pushed or pulled by a hand force.
//!
//! The particle count is fixed by [`ParticleFlowSystem::initialize`]; after
//! that [`ParticleFlowSystem::update`] never allocates.

use glam::Vec3;

use crate::config::ParticleConfig;
use crate::geometry::Polyline;
use crate::random::RandomSource;

/// Tangents shorter than this fall back to +Y.
const MIN_TANGENT_LENGTH: f32 = 0.001;

/// Hand forces do nothing this close to a particle.
const MIN_FORCE_DISTANCE: f32 = 1.0;

/// Force magnitudes are tuned per 60 Hz frame.
const FORCE_FRAME_SCALE: f32 = 60.0;

/// Attraction is gentler than scattering.
const ATTRACT_SCALE: f32 = 0.5;

/// Fixed-capacity ring of recent positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: Vec<Vec3>,
    /// Index of the oldest point.
    head: usize,
}

impl Trail {
    /// A trail of `len` copies of `position`.
    pub fn filled(position: Vec3, len: usize) -> Self {
        Self {
            points: vec![position; len],
            head: 0,
        }
    }

    /// Drop the oldest point and append `position` as the newest.
    pub fn push(&mut self, position: Vec3) {
        if self.points.is_empty() {
            return;
        }
        self.points[self.head] = position;
        self.head = (self.head + 1) % self.points.len();
    }

    /// Overwrite every point with `position`.
    pub fn fill(&mut self, position: Vec3) {
        self.points.fill(position);
        self.head = 0;
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        let (newer, older) = self.points.split_at(self.head);
        older.iter().chain(newer).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One particle of the aura.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Rendered position: base plus orbit plus any force displacement.
    pub position: Vec3,
    /// Point on the path at parameter `t`, before the orbit is applied.
    pub base: Vec3,
    /// Index of the owning path.
    pub path_index: usize,
    /// Continuous path parameter in `[0, path_len - 1)`.
    pub t: f32,
    /// Path samples advanced per second.
    pub speed: f32,
    /// Current orbit angle in radians.
    pub orbit_phase: f32,
    /// Orbit angular speed in radians per second.
    pub orbit_speed: f32,
    pub orbit_radius: f32,
    pub trail: Trail,
}

/// Which way a hand force pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceKind {
    /// Push particles away (open palm).
    Scatter,
    /// Pull particles in (fist).
    Attract,
}

/// A force field applied for exactly one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandForce {
    pub position: Vec3,
    pub kind: ForceKind,
    pub strength: f32,
    /// Particles at or beyond this distance are unaffected.
    pub radius: f32,
}

impl HandForce {
    /// Displacement this force applies to a particle at `position` over `dt`.
    pub fn displacement(&self, position: Vec3, dt: f32) -> Vec3 {
        let offset = position - self.position;
        let distance = offset.length();
        if distance <= MIN_FORCE_DISTANCE || distance >= self.radius {
            return Vec3::ZERO;
        }

        let falloff = 1.0 - distance / self.radius;
        let direction = offset / distance;
        let magnitude = self.strength * falloff * dt * FORCE_FRAME_SCALE;
        match self.kind {
            ForceKind::Scatter => direction * magnitude,
            ForceKind::Attract => -direction * magnitude * ATTRACT_SCALE,
        }
    }
}

/// Position on `path` at continuous parameter `t`, clamped to the path.
pub fn point_on_path(path: &[Vec3], t: f32) -> Vec3 {
    match path.len() {
        0 => Vec3::ZERO,
        1 => path[0],
        len => {
            let idx = (t.max(0.0).floor() as usize).min(len - 2);
            let frac = (t - idx as f32).clamp(0.0, 1.0);
            path[idx].lerp(path[idx + 1], frac)
        }
    }
}

/// Two unit vectors perpendicular to `tangent` and to each other.
fn orbit_basis(tangent: Vec3) -> (Vec3, Vec3) {
    let reference = if tangent.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let perp1 = tangent.cross(reference).normalize();
    let perp2 = tangent.cross(perp1);
    (perp1, perp2)
}

/// Particles flowing along a set of paths.
#[derive(Debug, Clone)]
pub struct ParticleFlowSystem {
    particles: Vec<Particle>,
    paths: Vec<Polyline>,
    speed: f32,
    orbit_radius: f32,
    trail_length: usize,
    rng: RandomSource,
}

impl ParticleFlowSystem {
    /// An empty system. Call [`initialize`](Self::initialize) to populate it.
    pub fn new(config: &ParticleConfig) -> Self {
        Self::with_rng(config, RandomSource::new())
    }

    /// An empty system with a reproducible random stream.
    pub fn with_seed(config: &ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, RandomSource::with_seed(seed))
    }

    fn with_rng(config: &ParticleConfig, rng: RandomSource) -> Self {
        Self {
            particles: Vec::new(),
            paths: Vec::new(),
            speed: config.speed,
            orbit_radius: config.orbit_radius,
            trail_length: config.trail_length,
            rng,
        }
    }

    /// Replace all particles with `count` new ones spread over `paths`.
    ///
    /// Each path gets `max(1, count / paths)` particles and the earliest
    /// paths take the remainder. Paths with fewer than two points get none.
    pub fn initialize(&mut self, paths: Vec<Polyline>, count: usize) {
        self.particles.clear();
        self.paths = paths;
        if self.paths.is_empty() {
            return;
        }

        let per_path = (count / self.paths.len()).max(1);
        let extra = count.saturating_sub(per_path * self.paths.len());
        self.particles.reserve(count);

        for path_index in 0..self.paths.len() {
            if self.paths[path_index].len() < 2 {
                continue;
            }
            let quota = per_path + usize::from(path_index < extra);
            for _ in 0..quota {
                if self.particles.len() >= count {
                    return;
                }
                let particle = self.spawn(path_index);
                self.particles.push(particle);
            }
        }
    }

    fn spawn(&mut self, path_index: usize) -> Particle {
        let path = &self.paths[path_index];
        let t = self.rng.random_range(0.0, (path.len() - 1) as f32);
        let base = point_on_path(path, t);
        let position = base + self.rng.random_in_sphere(self.orbit_radius);

        Particle {
            position,
            base,
            path_index,
            t,
            speed: self.speed * self.rng.random_range(0.8, 1.2),
            orbit_phase: self.rng.random_range(0.0, std::f32::consts::TAU),
            orbit_speed: self.rng.random_range(1.5, 2.5),
            orbit_radius: self.orbit_radius * self.rng.random_range(0.5, 1.5),
            trail: Trail::filled(position, self.trail_length),
        }
    }

    /// Advance every particle by `dt` seconds.
    pub fn update(&mut self, dt: f32, force: Option<&HandForce>) {
        for p in &mut self.particles {
            let Some(path) = self.paths.get(p.path_index) else {
                continue;
            };
            let len = path.len();
            if len < 2 {
                continue;
            }

            p.trail.push(p.position);

            let span = (len - 1) as f32;
            p.t += p.speed * dt;
            if !(0.0..span).contains(&p.t) {
                p.t = p.t.rem_euclid(span);
            }

            let idx = (p.t.floor() as usize).min(len - 2);
            let frac = (p.t - idx as f32).clamp(0.0, 1.0);
            p.base = path[idx].lerp(path[idx + 1], frac);

            p.orbit_phase += dt * p.orbit_speed;

            let delta = path[idx + 1] - path[idx];
            let tangent = if delta.length() > MIN_TANGENT_LENGTH {
                delta.normalize()
            } else {
                Vec3::Y
            };
            let (perp1, perp2) = orbit_basis(tangent);
            let orbit = perp1 * p.orbit_phase.cos() + perp2 * p.orbit_phase.sin();
            p.position = p.base + orbit * p.orbit_radius;

            if let Some(force) = force {
                p.position += force.displacement(p.position, dt);
            }
        }
    }

    /// Move particles onto new paths, round-robin, at random parameters.
    ///
    /// Orbit and trail state are left alone; follow up with
    /// [`reset_to_paths`](Self::reset_to_paths) to snap them over.
    pub fn set_paths(&mut self, paths: Vec<Polyline>) {
        self.paths = paths;
        if self.paths.is_empty() {
            return;
        }

        let count = self.paths.len();
        for (i, p) in self.particles.iter_mut().enumerate() {
            p.path_index = i % count;
            let len = self.paths[p.path_index].len();
            p.t = if len >= 2 {
                self.rng.random_range(0.0, (len - 1) as f32)
            } else {
                0.0
            };
        }
    }

    /// Snap every particle to its path at its current parameter, with a
    /// fresh orbit offset and a trail collapsed onto the new position.
    pub fn reset_to_paths(&mut self) {
        for p in &mut self.particles {
            let Some(path) = self.paths.get(p.path_index) else {
                continue;
            };
            if path.len() < 2 {
                continue;
            }
            p.base = point_on_path(path, p.t);
            p.position = p.base + self.rng.random_direction() * p.orbit_radius;
            p.trail.fill(p.position);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn paths(&self) -> &[Polyline] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
