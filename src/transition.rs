//! Shape cycling: hold, dissolve, reform.
//!
//! ```text
//!            hold timeout / trigger / skip
//!   Holding ───────────────────────────────▶ Dissolving
//!      ▲                                         │ progress reaches 1:
//!      │ progress reaches 1                      │ next shape becomes current,
//!      │                                         ▼ particles move to its paths
//!      └──────────────────────────────────── Reforming
//! ```
//!
//! The manager keeps its own clock, advanced by the `dt` handed to
//! [`TransitionManager::update`], so a paused or stalled shell never skips
//! a phase and tests can drive it deterministically.

use std::fmt;
use std::sync::Arc;

use crate::config::CycleConfig;
use crate::geometry::Shape;
use crate::library::ShapeLibrary;
use crate::particles::ParticleFlowSystem;

/// Where the cycle is, with the data each phase needs.
#[derive(Debug, Clone)]
pub enum TransitionState {
    Holding,
    Dissolving {
        progress: f32,
        next_index: usize,
        next: Arc<Shape>,
    },
    Reforming {
        progress: f32,
    },
}

/// [`TransitionState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Holding,
    Dissolving,
    Reforming,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionPhase::Holding => "holding",
            TransitionPhase::Dissolving => "dissolving",
            TransitionPhase::Reforming => "reforming",
        })
    }
}

impl TransitionState {
    pub fn phase(&self) -> TransitionPhase {
        match self {
            TransitionState::Holding => TransitionPhase::Holding,
            TransitionState::Dissolving { .. } => TransitionPhase::Dissolving,
            TransitionState::Reforming { .. } => TransitionPhase::Reforming,
        }
    }

    /// Progress through the current phase. Always 0 while holding.
    pub fn progress(&self) -> f32 {
        match self {
            TransitionState::Holding => 0.0,
            TransitionState::Dissolving { progress, .. } | TransitionState::Reforming { progress } => {
                *progress
            }
        }
    }
}

/// Snapshot returned by every [`TransitionManager::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStatus {
    pub phase: TransitionPhase,
    pub progress: f32,
    pub shape_index: usize,
    pub shape_name: &'static str,
}

impl fmt::Display for TransitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {:.0}%",
            self.shape_name,
            self.phase,
            self.progress * 100.0
        )
    }
}

fn phase_progress(elapsed: f64, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / f64::from(duration)).min(1.0) as f32
}

/// Drives the hold/dissolve/reform cycle over a [`ShapeLibrary`].
#[derive(Debug)]
pub struct TransitionManager {
    library: ShapeLibrary,
    current_index: usize,
    current: Arc<Shape>,
    state: TransitionState,
    /// Seconds of accumulated `dt`.
    clock: f64,
    transition_start: f64,
    last_hold: f64,
    hold_time: f32,
    dissolve_time: f32,
    reform_time: f32,
}

impl TransitionManager {
    /// Start holding shape `start_index` (wrapped into the catalogue).
    pub fn new(mut library: ShapeLibrary, config: &CycleConfig, start_index: usize) -> Self {
        let current_index = start_index % library.len();
        let current = library.shape(current_index);
        Self {
            library,
            current_index,
            current,
            state: TransitionState::Holding,
            clock: 0.0,
            transition_start: 0.0,
            last_hold: 0.0,
            hold_time: config.hold_time,
            dissolve_time: config.dissolve_time,
            reform_time: config.reform_time,
        }
    }

    /// Advance the cycle by `dt` seconds.
    ///
    /// `frozen` suppresses only the automatic hold timeout. At the end of a
    /// dissolve the particles are moved onto the new shape's paths.
    pub fn update(
        &mut self,
        dt: f32,
        frozen: bool,
        particles: &mut ParticleFlowSystem,
    ) -> TransitionStatus {
        self.clock += f64::from(dt.max(0.0));
        let elapsed = self.clock - self.transition_start;

        match &mut self.state {
            TransitionState::Holding => {}
            TransitionState::Dissolving { progress, .. } => {
                *progress = phase_progress(elapsed, self.dissolve_time);
            }
            TransitionState::Reforming { progress } => {
                *progress = phase_progress(elapsed, self.reform_time);
            }
        }

        match self.state {
            TransitionState::Holding
                if !frozen && self.clock - self.last_hold >= f64::from(self.hold_time) =>
            {
                self.begin_dissolve((self.current_index + 1) % self.library.len());
            }
            TransitionState::Dissolving { progress, .. } if progress >= 1.0 => {
                self.finish_dissolve(particles);
            }
            TransitionState::Reforming { progress } if progress >= 1.0 => {
                self.state = TransitionState::Holding;
                self.last_hold = self.clock;
                log::debug!("Holding {}", self.current_shape_name());
            }
            _ => {}
        }

        self.status()
    }

    fn begin_dissolve(&mut self, next_index: usize) {
        let next = self.library.shape(next_index);
        log::debug!(
            "Dissolving {} into {}",
            self.current_shape_name(),
            self.library.shape_name(next_index)
        );
        self.state = TransitionState::Dissolving {
            progress: 0.0,
            next_index,
            next,
        };
        self.transition_start = self.clock;
    }

    fn finish_dissolve(&mut self, particles: &mut ParticleFlowSystem) {
        let previous = std::mem::replace(&mut self.state, TransitionState::Reforming { progress: 0.0 });
        if let TransitionState::Dissolving { next_index, next, .. } = previous {
            self.current_index = next_index;
            self.current = next;
        }
        self.transition_start = self.clock;

        particles.set_paths(self.current.particle_paths.clone());
        particles.reset_to_paths();

        log::info!("Now showing: {}", self.current_shape_name());
    }

    /// Start dissolving into the next shape. Ignored unless holding.
    pub fn trigger_next_shape(&mut self) -> bool {
        if !matches!(self.state, TransitionState::Holding) {
            return false;
        }
        self.begin_dissolve((self.current_index + 1) % self.library.len());
        true
    }

    /// Start dissolving into shape `index` (wrapped). Ignored unless holding
    /// or when `index` is already the current shape.
    pub fn skip_to_shape(&mut self, index: usize) -> bool {
        let index = index % self.library.len();
        if !matches!(self.state, TransitionState::Holding) || index == self.current_index {
            return false;
        }
        self.begin_dissolve(index);
        true
    }

    pub fn status(&self) -> TransitionStatus {
        TransitionStatus {
            phase: self.state.phase(),
            progress: self.state.progress(),
            shape_index: self.current_index,
            shape_name: self.current_shape_name(),
        }
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn phase(&self) -> TransitionPhase {
        self.state.phase()
    }

    pub fn progress(&self) -> f32 {
        self.state.progress()
    }

    /// Wireframe opacity: 1 while holding, fading out then back in.
    pub fn render_alpha(&self) -> f32 {
        match self.state {
            TransitionState::Holding => 1.0,
            TransitionState::Dissolving { progress, .. } => 1.0 - progress,
            TransitionState::Reforming { progress } => progress,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        !matches!(self.state, TransitionState::Holding)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_shape(&self) -> &Arc<Shape> {
        &self.current
    }

    pub fn current_shape_name(&self) -> &'static str {
        self.library.shape_name(self.current_index)
    }

    /// The shape being transitioned into. `None` while holding; while
    /// reforming it is already the current shape.
    pub fn next_shape(&self) -> Option<&Arc<Shape>> {
        match &self.state {
            TransitionState::Holding => None,
            TransitionState::Dissolving { next, .. } => Some(next),
            TransitionState::Reforming { .. } => Some(&self.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;

    fn cycle() -> CycleConfig {
        CycleConfig {
            hold_time: 1.0,
            dissolve_time: 0.5,
            reform_time: 0.5,
            ..CycleConfig::default()
        }
    }

    fn setup(start: usize) -> (TransitionManager, ParticleFlowSystem) {
        let manager = TransitionManager::new(ShapeLibrary::new(), &cycle(), start);
        let mut particles = ParticleFlowSystem::with_seed(&ParticleConfig::default(), 42);
        particles.initialize(manager.current_shape().particle_paths.clone(), 60);
        (manager, particles)
    }

    /// Tick until the manager is holding again, collecting every status.
    fn run_episode(
        manager: &mut TransitionManager,
        particles: &mut ParticleFlowSystem,
    ) -> Vec<TransitionStatus> {
        let mut statuses = Vec::new();
        for _ in 0..1000 {
            let status = manager.update(0.05, false, particles);
            statuses.push(status);
            if status.phase == TransitionPhase::Holding
                && statuses.iter().any(|s| s.phase == TransitionPhase::Reforming)
            {
                break;
            }
        }
        statuses
    }

    #[test]
    fn test_starts_holding() {
        let (manager, _) = setup(0);
        assert_eq!(manager.phase(), TransitionPhase::Holding);
        assert_eq!(manager.render_alpha(), 1.0);
        assert_eq!(manager.progress(), 0.0);
        assert!(manager.next_shape().is_none());
        assert!(!manager.is_transitioning());
    }

    #[test]
    fn test_full_cycle_advances_index() {
        let (mut manager, mut particles) = setup(6);
        run_episode(&mut manager, &mut particles);

        assert_eq!(manager.phase(), TransitionPhase::Holding);
        assert_eq!(manager.current_index(), 0);
        assert_eq!(manager.current_shape_name(), "DNA Double Helix");
    }

    #[test]
    fn test_progress_is_monotonic_and_alpha_moves_the_right_way() {
        let (mut manager, mut particles) = setup(0);
        assert!(manager.trigger_next_shape());

        let mut last: Option<(TransitionPhase, f32, f32)> = None;
        for _ in 0..100 {
            manager.update(0.05, false, &mut particles);
            let now = (manager.phase(), manager.progress(), manager.render_alpha());
            if let Some((phase, progress, alpha)) = last {
                if phase == now.0 {
                    match phase {
                        TransitionPhase::Dissolving => {
                            assert!(now.1 > progress);
                            assert!(now.2 < alpha);
                        }
                        TransitionPhase::Reforming => {
                            assert!(now.1 > progress);
                            assert!(now.2 > alpha);
                        }
                        TransitionPhase::Holding => assert_eq!(now.2, 1.0),
                    }
                } else {
                    // Every state change starts from zero
                    assert_eq!(now.1, 0.0);
                }
            }
            last = Some(now);
        }
    }

    #[test]
    fn test_trigger_ignored_mid_transition() {
        let (mut manager, mut particles) = setup(0);
        assert!(manager.trigger_next_shape());
        manager.update(0.1, false, &mut particles);
        assert!(!manager.trigger_next_shape());
        assert!(!manager.skip_to_shape(5));

        run_episode(&mut manager, &mut particles);
        assert_eq!(manager.current_index(), 1);
    }

    #[test]
    fn test_skip_to_shape() {
        let (mut manager, mut particles) = setup(0);
        assert!(manager.skip_to_shape(4));
        assert_eq!(manager.next_shape().map(|s| s.name.as_str()), Some("Icosphere"));

        run_episode(&mut manager, &mut particles);
        assert_eq!(manager.current_index(), 4);
    }

    #[test]
    fn test_skip_wraps_and_ignores_current() {
        let (mut manager, mut particles) = setup(2);
        assert!(!manager.skip_to_shape(2));
        assert!(!manager.skip_to_shape(9));
        assert_eq!(manager.phase(), TransitionPhase::Holding);

        assert!(manager.skip_to_shape(10));
        run_episode(&mut manager, &mut particles);
        assert_eq!(manager.current_index(), 3);
    }

    #[test]
    fn test_freeze_blocks_auto_advance_only() {
        let (mut manager, mut particles) = setup(0);
        for _ in 0..100 {
            manager.update(0.1, true, &mut particles);
        }
        assert_eq!(manager.phase(), TransitionPhase::Holding);

        // Explicit commands still work while frozen
        assert!(manager.trigger_next_shape());
        manager.update(0.1, true, &mut particles);
        assert_eq!(manager.phase(), TransitionPhase::Dissolving);
    }

    #[test]
    fn test_hold_timeout_starts_dissolve() {
        let (mut manager, mut particles) = setup(0);
        manager.update(0.9, false, &mut particles);
        assert_eq!(manager.phase(), TransitionPhase::Holding);
        manager.update(0.2, false, &mut particles);
        assert_eq!(manager.phase(), TransitionPhase::Dissolving);
        assert_eq!(manager.current_index(), 0);
    }

    #[test]
    fn test_particles_follow_new_shape() {
        let (mut manager, mut particles) = setup(0);
        manager.skip_to_shape(3);
        run_episode(&mut manager, &mut particles);

        let cube = manager.current_shape();
        assert_eq!(particles.paths(), cube.particle_paths.as_slice());
        assert_eq!(particles.len(), 60);
        assert!(particles.particles().iter().all(|p| p.path_index < 12));
    }

    #[test]
    fn test_next_shape_while_reforming_is_current() {
        let (mut manager, mut particles) = setup(0);
        manager.trigger_next_shape();
        while manager.phase() != TransitionPhase::Reforming {
            manager.update(0.05, false, &mut particles);
        }
        let next = manager.next_shape().map(Arc::clone);
        assert!(next.is_some_and(|s| Arc::ptr_eq(&s, manager.current_shape())));
    }

    #[test]
    fn test_zero_durations_do_not_stall() {
        let config = CycleConfig {
            hold_time: 0.0,
            dissolve_time: 0.0,
            reform_time: 0.0,
            ..CycleConfig::default()
        };
        let mut manager = TransitionManager::new(ShapeLibrary::new(), &config, 0);
        let mut particles = ParticleFlowSystem::with_seed(&ParticleConfig::default(), 1);

        for _ in 0..6 {
            manager.update(0.0, false, &mut particles);
        }
        assert_eq!(manager.current_index(), 2);
    }
}
