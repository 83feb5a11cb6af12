//! Tunable parameters for the display.
//!
//! Every knob lives in [`HoloConfig`]. The defaults are the values the
//! display was tuned with; a JSON file only needs to list the fields it
//! overrides.
//!
//! ```ignore
//! let config = HoloConfig::load("holo.json")?;
//! config.save("holo-copy.json")?;
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Window and frame pacing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Target frames per second for the frame limiter.
    pub frame_rate: u32,
    /// Clear color, 0-255 per channel. Pure black for a beam splitter.
    pub background: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 720,
            frame_rate: 60,
            background: [0, 0, 0],
        }
    }
}

/// Multi-pass glow for wireframe lines.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireframeConfig {
    /// Width of the innermost (brightest) pass, in pixels.
    pub line_width: f32,
    /// Number of glow passes (1-5).
    pub glow_passes: u32,
    /// Alpha multiplier applied per pass outward.
    pub glow_falloff: f32,
    /// Line width multiplier applied per pass outward.
    pub glow_expansion: f32,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            line_width: 2.5,
            glow_passes: 3,
            glow_falloff: 0.5,
            glow_expansion: 1.5,
        }
    }
}

/// The particle aura.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: u32,
    /// Point size in pixels.
    pub size: f32,
    /// Base speed along paths, in path samples per second.
    pub speed: f32,
    /// Base distance of the orbit around the path.
    pub orbit_radius: f32,
    /// Number of previous positions kept per particle.
    pub trail_length: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 300,
            size: 3.0,
            speed: 30.0,
            orbit_radius: 15.0,
            trail_length: 5,
        }
    }
}

/// Depth-based color gradient (far → mid → near).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub near: [u8; 3],
    pub mid: [u8; 3],
    pub far: [u8; 3],
    /// Z at or above which points get the near color.
    pub z_near: f32,
    /// Z at or below which points get the far color.
    pub z_far: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            near: [0, 255, 255],
            mid: [255, 255, 255],
            far: [255, 0, 102],
            z_near: 30.0,
            z_far: -30.0,
        }
    }
}

/// Shape cycling and rotation timing, in seconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CycleConfig {
    /// Time a shape is held before it dissolves automatically.
    pub hold_time: f32,
    pub dissolve_time: f32,
    pub reform_time: f32,
    /// Auto-rotation about +Y, radians per second.
    pub rotate_speed: f32,
    /// Upper bound on the frame delta fed to the simulation.
    pub max_frame_delta: f32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            hold_time: 8.0,
            dissolve_time: 1.5,
            reform_time: 2.0,
            rotate_speed: 0.3,
            max_frame_delta: 0.1,
        }
    }
}

/// Strength and reach of hand-force events.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HandForceConfig {
    pub strength: f32,
    pub radius: f32,
}

impl Default for HandForceConfig {
    fn default() -> Self {
        Self {
            strength: 5.0,
            radius: 100.0,
        }
    }
}

/// Fixed viewing camera.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the origin along +Z.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 400.0,
            fov: 45.0,
            near: 10.0,
            far: 1000.0,
        }
    }
}

/// All tunable parameters in one place.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoloConfig {
    pub display: DisplayConfig,
    pub wireframe: WireframeConfig,
    pub particles: ParticleConfig,
    pub colors: ColorConfig,
    pub cycle: CycleConfig,
    pub hand_force: HandForceConfig,
    pub camera: CameraConfig,
}

impl HoloConfig {
    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config from JSON. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Background clear color as linear 0-1 RGB.
    pub fn background(&self) -> Vec3 {
        rgb(self.display.background)
    }
}

/// Convert a 0-255 color triple to 0-1 floats.
pub fn rgb(c: [u8; 3]) -> Vec3 {
    Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32) / 255.0
}
