//! JSON configuration for the interactive front-end

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::physics::{Integrator, PhysicsWorld, DEFAULT_MIN_SEPARATION};
use crate::scenario::Preset;
use crate::EntityId;
use common::constants::G;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AstralConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub playback: PlaybackConfig,
    pub camera: CameraConfig,
    pub scenario: Preset,
}

impl AstralConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|err| {
            log::warn!("{err:#}; using defaults");
            Self::default()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Astral Engine v1.0.0".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravitational_constant: f64,
    /// Pairs closer than this many metres exert no force
    pub min_separation: f64,
    pub integrator: Integrator,
    pub substeps: u32,
}

impl PhysicsConfig {
    pub fn build_world(&self) -> PhysicsWorld {
        PhysicsWorld::new(self.gravitational_constant)
            .with_min_separation(self.min_separation)
            .with_integrator(self.integrator)
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: G,
            min_separation: DEFAULT_MIN_SEPARATION,
            integrator: Integrator::VelocityVerlet,
            substeps: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub start_paused: bool,
    /// Simulated seconds per wall-clock second
    pub speed: f32,
    pub max_speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_paused: true,
            speed: 1.0,
            max_speed: 1.0e4,
        }
    }
}

/// Camera limits are given in metres and converted to render units at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Radians per pixel of mouse drag
    pub orbit_speed: f32,
    /// Render units per scroll line
    pub zoom_speed: f32,
    pub follow: Option<EntityId>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0e7,
            min_distance: 1.0e6,
            max_distance: 1.0e22,
            orbit_speed: 0.01,
            zoom_speed: 10.0,
            follow: Some(EntityId(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_in_defaults() {
        let json = r#"{
            "physics": { "integrator": "explicit_euler", "substeps": 4 },
            "camera": { "follow": 2 },
            "scenario": { "asteroid_belt": { "count": 30, "seed": 9 } }
        }"#;
        let config: AstralConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.physics.integrator, Integrator::ExplicitEuler);
        assert_eq!(config.physics.substeps, 4);
        assert_eq!(config.physics.gravitational_constant, G);
        assert_eq!(config.camera.follow, Some(EntityId(2)));
        assert_eq!(config.camera.zoom_speed, 10.0);
        assert_eq!(config.scenario, Preset::AsteroidBelt { count: 30, seed: 9 });
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let config = AstralConfig::default();
        let json = config.to_json().unwrap();
        let parsed: AstralConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AstralConfig::load_or_default("/nonexistent/astral.json");
        assert_eq!(config, AstralConfig::default());
        assert!(AstralConfig::load("/nonexistent/astral.json").is_err());
    }

    #[test]
    fn physics_config_builds_world() {
        let config = PhysicsConfig {
            gravitational_constant: 2.0,
            min_separation: 0.5,
            integrator: Integrator::ExplicitEuler,
            substeps: 1,
        };
        let world = config.build_world();
        assert_eq!(world.gravitational_constant(), 2.0);
        assert_eq!(world.min_separation(), 0.5);
        assert_eq!(world.integrator(), Integrator::ExplicitEuler);
    }
}
