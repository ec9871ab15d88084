//! Runtime simulation core for a side-scrolling platformer.
//!
//! The crate owns the player's kinematics and platform collision rules, the
//! death/respawn lifecycle, collectible pickup and effect tracking, a
//! smoothed follow camera and the high-level game state machine. Level
//! generation, rendering, audio and input decoding are external; they talk
//! to [`Game`] through plain data and [`Intents`]/[`Events`] bitflags.

pub mod camera;
pub mod collectible;
pub mod collection;
pub mod effects;
pub mod error;
pub mod game;
pub mod logging;
pub mod params;
pub mod player;
pub mod state;

use serde::{Deserialize, Serialize};

pub const HZ: f32 = 60.0;
pub const DT: f32 = 1.0 / HZ;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2.0 * margin,
            h: self.h + 2.0 * margin,
        }
    }
}

#[inline]
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub use camera::{Camera, CameraTransform};
pub use collectible::{Collectible, CollectibleKind, CollectibleRenderData, Effect, EffectKind};
pub use collection::{CollectibleManager, CollectionEffect, CollectionProgress, Pickup};
pub use effects::ActiveEffects;
pub use error::{ConfigError, Result};
pub use game::{CollectiblePlacement, Events, Game, Intents, LevelLayout, RespawnSchedule};
pub use logging::init as init_logging;
pub use params::Params;
pub use player::{
    Particle, Platform, PlatformRef, Player, PlayerRenderData, PlayerSnapshot, RespawnOutcome,
    Teleport,
};
pub use state::{GamePhase, GameState, Stats, TimeScale};

#[cfg(test)]
mod tests {
    use super::{rects_intersect, Rect};

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!rects_intersect(&a, &b));
        assert!(rects_intersect(&a.expand(0.5), &b));
    }
}
