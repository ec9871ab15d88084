//! Tunable simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_SEED: u64 = 0x5eed_da54;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Player body
    pub player_width: f32,
    pub player_height: f32,

    // Movement
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_speed: f32,
    pub rotation_speed: f32,
    pub ledge_bounce: f32,

    // Hit feedback, in flash units (decays at 60 units/s)
    pub flash_duration: f32,

    // Explosion
    pub explosion_spread: f32,
    pub explosion_jitter: f32,
    pub explosion_lift: f32,
    pub particle_gravity: f32,
    pub particle_spin: f32,

    // Respawn
    pub respawn_inset: f32,
    pub respawn_lift: f32,
    pub escalation_threshold: u32,
    pub death_delay: f32,
    pub revive_delay: f32,
    pub portal_delay: f32,

    // Frame pacing
    pub max_dt: f32,

    // Camera
    pub camera_smoothness_x: f32,
    pub camera_smoothness_y: f32,
    pub camera_render_buffer: f32,

    pub seed: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            player_width: 30.0,
            player_height: 30.0,

            gravity: 1800.0,
            jump_velocity: 640.0,
            max_speed: 320.0,
            rotation_speed: 7.5,
            ledge_bounce: 180.0,

            flash_duration: 10.0,

            explosion_spread: 160.0,
            explosion_jitter: 90.0,
            explosion_lift: 220.0,
            particle_gravity: 900.0,
            particle_spin: 12.0,

            respawn_inset: 20.0,
            respawn_lift: 4.0,
            escalation_threshold: 6,
            death_delay: 1.0,
            revive_delay: 0.25,
            portal_delay: 0.6,

            max_dt: 0.05,

            camera_smoothness_x: 0.12,
            camera_smoothness_y: 0.08,
            camera_render_buffer: 200.0,

            seed: DEFAULT_SEED,
        }
    }
}

impl Params {
    /// Parses a (possibly partial) JSON object over the defaults and
    /// validates the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("jump_velocity", self.jump_velocity),
            ("flash_duration", self.flash_duration),
            ("max_dt", self.max_dt),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a finite value > 0, got {value}"),
                ));
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("max_speed", self.max_speed),
            ("rotation_speed", self.rotation_speed),
            ("ledge_bounce", self.ledge_bounce),
            ("explosion_spread", self.explosion_spread),
            ("explosion_jitter", self.explosion_jitter),
            ("explosion_lift", self.explosion_lift),
            ("particle_gravity", self.particle_gravity),
            ("particle_spin", self.particle_spin),
            ("respawn_inset", self.respawn_inset),
            ("respawn_lift", self.respawn_lift),
            ("death_delay", self.death_delay),
            ("revive_delay", self.revive_delay),
            ("portal_delay", self.portal_delay),
            ("camera_render_buffer", self.camera_render_buffer),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a finite value >= 0, got {value}"),
                ));
            }
        }

        for (field, value) in [
            ("camera_smoothness_x", self.camera_smoothness_x),
            ("camera_smoothness_y", self.camera_smoothness_y),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a value in [0, 1], got {value}"),
                ));
            }
        }

        Ok(())
    }
}
