//! The animated scene: shape cycle, particle aura and rotation.
//!
//! [`HoloScene`] is everything that changes from frame to frame. It has no
//! window, no GPU and no clock of its own: the shell feeds it a delta, an
//! optional [`HandForce`] and [`Command`]s, and reads back what to draw.
//!
//! ```ignore
//! let mut scene = HoloScene::new(&config, 0);
//! scene.apply(Command::TriggerNextShape);
//! let status = scene.tick(1.0 / 60.0, None);
//! println!("{status}");
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;

use crate::config::HoloConfig;
use crate::geometry::Shape;
use crate::library::ShapeLibrary;
use crate::particles::{HandForce, Particle, ParticleFlowSystem};
use crate::transition::{TransitionManager, TransitionPhase, TransitionStatus};

/// Discrete requests from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Dissolve into the next shape in the catalogue.
    TriggerNextShape,
    /// Stop or resume rotation and the automatic shape cycle.
    ToggleFreeze,
    /// Dissolve into the shape at this index.
    SkipToShape(usize),
    /// Turn the periodic status line on or off. Handled by the shell.
    ToggleStatus,
    /// Leave the display. Handled by the shell.
    Quit,
}

/// Shape cycle, particles and rotation, advanced one frame at a time.
#[derive(Debug)]
pub struct HoloScene {
    transition: TransitionManager,
    particles: ParticleFlowSystem,
    /// Rotation about +Y in radians, kept in `[0, 2π)`.
    rotation: f32,
    rotate_speed: f32,
    frozen: bool,
}

impl HoloScene {
    /// A scene holding shape `start_index` with a full particle aura.
    pub fn new(config: &HoloConfig, start_index: usize) -> Self {
        Self::with_particles(config, start_index, ParticleFlowSystem::new(&config.particles))
    }

    /// Same as [`new`](Self::new) but with a reproducible random stream.
    pub fn with_seed(config: &HoloConfig, start_index: usize, seed: u64) -> Self {
        Self::with_particles(
            config,
            start_index,
            ParticleFlowSystem::with_seed(&config.particles, seed),
        )
    }

    fn with_particles(
        config: &HoloConfig,
        start_index: usize,
        mut particles: ParticleFlowSystem,
    ) -> Self {
        let transition = TransitionManager::new(ShapeLibrary::new(), &config.cycle, start_index);
        particles.initialize(
            transition.current_shape().particle_paths.clone(),
            config.particles.count as usize,
        );
        log::info!(
            "Scene ready: {} with {} particles",
            transition.current_shape_name(),
            particles.len()
        );

        Self {
            transition,
            particles,
            rotation: 0.0,
            rotate_speed: config.cycle.rotate_speed,
            frozen: false,
        }
    }

    /// Advance the scene by `dt` seconds.
    pub fn tick(&mut self, dt: f32, force: Option<&HandForce>) -> TransitionStatus {
        let dt = dt.max(0.0);

        if !self.frozen {
            self.rotation = (self.rotation + self.rotate_speed * dt).rem_euclid(TAU);
        }

        let status = self.transition.update(dt, self.frozen, &mut self.particles);
        self.particles.update(dt, force);
        status
    }

    /// Apply a command. Returns whether it changed anything.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::TriggerNextShape => self.transition.trigger_next_shape(),
            Command::SkipToShape(index) => self.transition.skip_to_shape(index),
            Command::ToggleFreeze => {
                self.frozen = !self.frozen;
                log::info!("{}", if self.frozen { "Frozen" } else { "Unfrozen" });
                true
            }
            Command::ToggleStatus | Command::Quit => false,
        }
    }

    pub fn current_shape(&self) -> &Arc<Shape> {
        self.transition.current_shape()
    }

    pub fn current_shape_name(&self) -> &'static str {
        self.transition.current_shape_name()
    }

    pub fn current_index(&self) -> usize {
        self.transition.current_index()
    }

    pub fn state(&self) -> TransitionPhase {
        self.transition.phase()
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn render_alpha(&self) -> f32 {
        self.transition.render_alpha()
    }

    pub fn status(&self) -> TransitionStatus {
        self.transition.status()
    }

    pub fn particles_for_render(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn transition(&self) -> &TransitionManager {
        &self.transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> HoloConfig {
        let mut config = HoloConfig::default();
        config.particles.count = 40;
        config.cycle.hold_time = 0.5;
        config.cycle.dissolve_time = 0.2;
        config.cycle.reform_time = 0.2;
        config
    }

    #[test]
    fn test_new_scene() {
        let scene = HoloScene::with_seed(&quick_config(), 3, 1);
        assert_eq!(scene.current_shape_name(), "Wireframe Cube");
        assert_eq!(scene.particles_for_render().len(), 40);
        assert_eq!(scene.state(), TransitionPhase::Holding);
        assert_eq!(scene.render_alpha(), 1.0);
        assert!(!scene.is_frozen());
    }

    #[test]
    fn test_rotation_advances_and_wraps() {
        let mut config = quick_config();
        config.cycle.rotate_speed = 1.0;
        let mut scene = HoloScene::with_seed(&config, 0, 1);

        scene.tick(0.1, None);
        assert!((scene.rotation() - 0.1).abs() < 1e-6);

        for _ in 0..100 {
            scene.tick(0.1, None);
            assert!((0.0..TAU).contains(&scene.rotation()));
        }
    }

    #[test]
    fn test_freeze_stops_rotation_and_cycle() {
        let mut scene = HoloScene::with_seed(&quick_config(), 0, 1);
        assert!(scene.apply(Command::ToggleFreeze));
        assert!(scene.is_frozen());

        for _ in 0..50 {
            scene.tick(0.1, None);
        }
        assert_eq!(scene.rotation(), 0.0);
        assert_eq!(scene.state(), TransitionPhase::Holding);
        assert_eq!(scene.current_index(), 0);

        scene.apply(Command::ToggleFreeze);
        scene.tick(0.1, None);
        assert!(scene.rotation() > 0.0);
    }

    #[test]
    fn test_commands_drive_transitions() {
        let mut scene = HoloScene::with_seed(&quick_config(), 0, 1);
        assert!(scene.apply(Command::SkipToShape(5)));
        assert!(!scene.apply(Command::TriggerNextShape));

        for _ in 0..10 {
            scene.tick(0.05, None);
        }
        assert_eq!(scene.current_shape_name(), "Möbius Strip");
    }

    #[test]
    fn test_dissolve_does_not_move_particles_on_its_own() {
        let mut scene = HoloScene::with_seed(&quick_config(), 0, 1);
        scene.tick(0.05, None);
        let before: Vec<_> = scene.particles_for_render().iter().map(|p| p.position).collect();

        assert!(scene.apply(Command::TriggerNextShape));
        scene.tick(0.0, None);
        scene.tick(0.0, None);
        assert_eq!(scene.state(), TransitionPhase::Dissolving);

        for (p, old) in scene.particles_for_render().iter().zip(&before) {
            assert!(p.position.distance(*old) < 1e-4);
            let newest = p.trail.iter().last().unwrap();
            assert!(newest.distance(p.position) < 1e-4);
        }
    }

    #[test]
    fn test_shell_commands_are_ignored() {
        let mut scene = HoloScene::with_seed(&quick_config(), 0, 1);
        assert!(!scene.apply(Command::ToggleStatus));
        assert!(!scene.apply(Command::Quit));
        assert_eq!(scene.state(), TransitionPhase::Holding);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut scene = HoloScene::with_seed(&quick_config(), 0, 1);
        scene.tick(-5.0, None);
        assert_eq!(scene.rotation(), 0.0);
        assert_eq!(scene.state(), TransitionPhase::Holding);
    }
}
