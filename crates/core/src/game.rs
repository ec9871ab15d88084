//! Per-frame orchestration of player, collectibles, camera and game state.
//!
//! The host calls [`Game::tick`] once per rendered frame with the raw frame
//! delta and the intents decoded since the previous frame. Everything in a
//! tick runs to completion; death→respawn and portal sequencing are explicit
//! countdowns polled here rather than timers owned by the host.

use log::{debug, info};
use serde::Deserialize;

use crate::camera::Camera;
use crate::collectible::{CollectibleKind, Effect, EffectKind};
use crate::collection::CollectibleManager;
use crate::effects::ActiveEffects;
use crate::error::{ConfigError, Result};
use crate::params::Params;
use crate::player::{Platform, Player, RespawnOutcome, Teleport};
use crate::state::{GamePhase, GameState};
use crate::{rects_intersect, Point};

/// Slack around the player's box when picking platforms to resolve.
const BROAD_PHASE_MARGIN: f32 = 2.0;
const DEFAULT_KILL_Y: f32 = 2000.0;

bitflags::bitflags! {
    /// Discrete player intents decoded by the input collaborator.
    #[repr(transparent)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Intents: u8 {
        const JUMP       = 1 << 0;
        const PAUSE      = 1 << 1;
        const FULLSCREEN = 1 << 2;
    }
}

bitflags::bitflags! {
    /// What happened during a tick, for audio and presentation.
    #[repr(transparent)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Events: u16 {
        const JUMPED             = 1 << 0;
        const LANDED             = 1 << 1;
        const COLLECTED          = 1 << 2;
        const DIED               = 1 << 3;
        const RESPAWNED          = 1 << 4;
        const ESCALATED          = 1 << 5;
        const PORTAL_ENTERED     = 1 << 6;
        const LEVEL_COMPLETE     = 1 << 7;
        const PAUSED             = 1 << 8;
        const RESUMED            = 1 << 9;
        const FULLSCREEN_TOGGLED = 1 << 10;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct CollectiblePlacement {
    pub kind: CollectibleKind,
    pub x: f32,
    pub y: f32,
}

/// Level data produced by the level generator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub level: u32,
    pub platforms: Vec<Platform>,
    pub teleports: Vec<Teleport>,
    pub collectibles: Vec<CollectiblePlacement>,
    pub spawn: Point,
    /// The player dies once their top edge passes below this line.
    pub kill_y: f32,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            level: 1,
            platforms: Vec::new(),
            teleports: Vec::new(),
            collectibles: Vec::new(),
            spawn: Point::default(),
            kill_y: DEFAULT_KILL_Y,
        }
    }
}

impl LevelLayout {
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        for p in &self.platforms {
            let r = &p.rect;
            if ![r.x, r.y, r.w, r.h].iter().all(|v| v.is_finite()) || r.w <= 0.0 || r.h <= 0.0 {
                return Err(ConfigError::invalid(
                    "platforms",
                    format!("platform {} has a degenerate rect {r:?}", p.id),
                ));
            }
        }
        if !self.spawn.x.is_finite() || !self.spawn.y.is_finite() {
            return Err(ConfigError::invalid("spawn", "spawn must be finite"));
        }
        if self.kill_y.is_nan() {
            return Err(ConfigError::invalid("kill_y", "kill plane must be a number"));
        }
        Ok(())
    }
}

/// Pending death→respawn sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum RespawnSchedule {
    #[default]
    Idle,
    /// Player is dead; explosion particles are flying.
    Exploding { remaining: f32 },
    /// Player is respawning.
    Reviving { remaining: f32 },
}

impl RespawnSchedule {
    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Clone, Debug)]
pub struct Game {
    params: Params,
    player: Player,
    collectibles: CollectibleManager,
    camera: Camera,
    state: GameState,
    effects: ActiveEffects,
    layout: LevelLayout,
    respawn: RespawnSchedule,
    portal_timer: Option<f32>,
    clock: f64,
}

impl Game {
    pub fn new(params: Params, width: f32, height: f32) -> Self {
        let layout = LevelLayout::default();
        Self {
            player: Player::new(&params, layout.spawn),
            collectibles: CollectibleManager::new(params.seed.wrapping_add(1)),
            camera: Camera::new(width, height, &params),
            state: GameState::new(),
            effects: ActiveEffects::new(),
            layout,
            respawn: RespawnSchedule::Idle,
            portal_timer: None,
            clock: 0.0,
            params,
        }
    }

    /// Swaps the tuning and restarts the current attempt from the spawn
    /// anchor. The game phase and statistics are kept.
    pub fn set_params(&mut self, params: Params) {
        let (width, height) = self.camera.viewport();
        self.player = Player::new(&params, self.layout.spawn);
        self.camera = Camera::new(width, height, &params);
        self.params = params;
        self.collectibles.reset();
        self.reset_run();
        if self.state.is_dead() {
            self.state.set_phase(GamePhase::Playing, self.clock);
        }
    }

    /// Installs a level and moves to LevelReady. Cancels any pending
    /// respawn or portal sequence.
    pub fn load_level(&mut self, layout: LevelLayout) {
        info!(
            "loading level {} ({} platforms, {} collectibles)",
            layout.level,
            layout.platforms.len(),
            layout.collectibles.len()
        );
        self.collectibles.clear();
        for c in &layout.collectibles {
            self.collectibles.spawn(c.kind, c.x, c.y);
        }
        self.player.set_spawn(layout.spawn);
        self.layout = layout;
        self.reset_run();
        self.state
            .begin_level(self.layout.level, self.collectibles.total());
        self.state.set_phase(GamePhase::LevelReady, self.clock);
    }

    /// MainMenu or LevelReady → Playing.
    pub fn start(&mut self) -> bool {
        if matches!(
            self.state.phase(),
            GamePhase::MainMenu | GamePhase::LevelReady
        ) {
            self.state.set_phase(GamePhase::Playing, self.clock)
        } else {
            false
        }
    }

    /// Retries the current level from its spawn anchor.
    pub fn restart_level(&mut self) {
        if self.state.phase() == &GamePhase::Exiting {
            return;
        }
        self.collectibles.reset();
        self.reset_run();
        self.state
            .begin_level(self.layout.level, self.collectibles.total());
        self.state.set_phase(GamePhase::Playing, self.clock);
    }

    fn reset_run(&mut self) {
        if self.respawn.is_pending() {
            debug!("cancelling pending respawn");
        }
        self.respawn = RespawnSchedule::Idle;
        self.portal_timer = None;
        self.effects.clear();
        self.player.reset();
        self.camera.follow(Point::new(self.player.x, self.player.y));
        self.camera.snap();
    }

    pub fn exit(&mut self) {
        self.state.set_phase(GamePhase::Exiting, self.clock);
    }

    /// Respawns immediately, skipping whatever is left of the death delay.
    pub fn respawn_now(&mut self) -> Events {
        let mut events = Events::empty();
        if self.state.is_dead() {
            self.finish_respawn(&mut events);
        }
        events
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Advances one frame. `dt` is the raw frame delta in seconds and is
    /// clamped to `max_dt` before use.
    pub fn tick(&mut self, dt: f32, intents: Intents) -> Events {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.params.max_dt)
        } else {
            0.0
        };
        self.clock += f64::from(dt);
        let mut events = Events::empty();

        if intents.contains(Intents::FULLSCREEN) {
            events |= Events::FULLSCREEN_TOGGLED;
        }
        if intents.contains(Intents::PAUSE) && self.state.toggle_pause(self.clock) {
            events |= if self.state.is_paused() {
                Events::PAUSED
            } else {
                Events::RESUMED
            };
        }
        if intents.contains(Intents::JUMP) && self.state.is_active() && self.player.jump() {
            events |= Events::JUMPED;
        }

        self.state.update(dt);
        let scaled = self.state.scaled_dt(dt);

        let phase = self.state.phase().clone();
        match phase {
            GamePhase::Playing => self.step_playing(scaled, &mut events),
            GamePhase::Dead => self.step_dead(dt, scaled, &mut events),
            GamePhase::EnteringPortal => self.step_portal(dt, &mut events),
            _ => {}
        }

        self.camera.follow(Point::new(self.player.x, self.player.y));
        self.camera.update(dt);
        events
    }

    fn step_playing(&mut self, dt: f32, events: &mut Events) {
        self.player.update(dt);

        let reach = self.player.bounds().expand(BROAD_PHASE_MARGIN);
        for platform in &self.layout.platforms {
            if !rects_intersect(&reach, &platform.rect) {
                continue;
            }
            self.player.handle_platform_collision(platform);
            if self.player.is_dead() {
                break;
            }
        }

        if !self.player.is_dead() && self.player.y > self.layout.kill_y {
            debug!("fell below kill plane at y={:.1}", self.player.y);
            self.player.die();
        }
        if self.player.is_dead() {
            self.on_death(events);
            return;
        }

        if self.player.is_grounded() && !self.player.was_grounded() {
            *events |= Events::LANDED;
        }

        for pickup in self.collectibles.update(dt, &mut self.player, self.clock) {
            self.state.record_pickup(pickup.value);
            *events |= Events::COLLECTED;
            for effect in pickup.effects {
                self.grant_effect(effect);
            }
        }
        for kind in self.effects.tick(dt) {
            self.expire_effect(kind);
        }

        let at_portal = self
            .layout
            .teleports
            .iter()
            .any(|t| self.player.handle_teleport_collision(t));
        if at_portal && self.state.set_phase(GamePhase::EnteringPortal, self.clock) {
            self.portal_timer = Some(self.params.portal_delay);
            *events |= Events::PORTAL_ENTERED;
        }
    }

    fn on_death(&mut self, events: &mut Events) {
        self.state.set_phase(GamePhase::Dead, self.clock);
        self.respawn = RespawnSchedule::Exploding {
            remaining: self.params.death_delay,
        };
        *events |= Events::DIED;
    }

    fn step_dead(&mut self, dt: f32, scaled: f32, events: &mut Events) {
        self.player.update(scaled);
        let schedule = self.respawn;
        self.respawn = match schedule {
            RespawnSchedule::Exploding { remaining } if remaining > dt => {
                RespawnSchedule::Exploding {
                    remaining: remaining - dt,
                }
            }
            RespawnSchedule::Exploding { .. } => {
                self.player.begin_respawn();
                RespawnSchedule::Reviving {
                    remaining: self.params.revive_delay,
                }
            }
            RespawnSchedule::Reviving { remaining } if remaining > dt => {
                RespawnSchedule::Reviving {
                    remaining: remaining - dt,
                }
            }
            RespawnSchedule::Reviving { .. } => {
                self.finish_respawn(events);
                RespawnSchedule::Idle
            }
            RespawnSchedule::Idle => RespawnSchedule::Idle,
        };
    }

    fn finish_respawn(&mut self, events: &mut Events) {
        self.respawn = RespawnSchedule::Idle;
        if self.player.respawn() == RespawnOutcome::Escalated {
            *events |= Events::ESCALATED;
        }
        *events |= Events::RESPAWNED;
        self.state.set_phase(GamePhase::Playing, self.clock);
    }

    fn step_portal(&mut self, dt: f32, events: &mut Events) {
        let Some(remaining) = self.portal_timer else {
            return;
        };
        if remaining > dt {
            self.portal_timer = Some(remaining - dt);
            return;
        }
        self.portal_timer = None;
        if self.state.set_phase(GamePhase::LevelComplete, self.clock) {
            *events |= Events::LEVEL_COMPLETE;
        }
    }

    fn grant_effect(&mut self, effect: &Effect) {
        if !self.effects.grant(effect) {
            debug!("instant effect {:?} x{}", effect.kind, effect.magnitude);
            return;
        }
        match effect.kind {
            EffectKind::SpeedBoost => self
                .player
                .set_speed(self.params.max_speed * effect.magnitude),
            EffectKind::JumpBoost => self.player.set_jump_scale(effect.magnitude),
            _ => {}
        }
    }

    fn expire_effect(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::SpeedBoost => self.player.set_speed(self.params.max_speed),
            EffectKind::JumpBoost => self.player.set_jump_scale(1.0),
            _ => {}
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn collectibles(&self) -> &CollectibleManager {
        &self.collectibles
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn respawn_schedule(&self) -> RespawnSchedule {
        self.respawn
    }

    /// Monotonic simulation clock in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelLayout, RespawnSchedule};
    use crate::collectible::CollectibleKind;
    use crate::error::ConfigError;

    #[test]
    fn layout_parses_with_defaults() {
        let layout = LevelLayout::from_json(
            r#"{
                "platforms": [{ "id": 3, "x": 0, "y": 100, "w": 200, "h": 20 }],
                "collectibles": [{ "kind": "GEM", "x": 5, "y": 6 }, { "kind": "??", "x": 1, "y": 2 }],
                "spawn": { "x": 10, "y": 70 }
            }"#,
        )
        .unwrap();
        assert_eq!(layout.level, 1);
        assert_eq!(layout.platforms[0].id, 3);
        assert_eq!(layout.platforms[0].rect.w, 200.0);
        assert_eq!(layout.collectibles[0].kind, CollectibleKind::Gem);
        assert_eq!(layout.collectibles[1].kind, CollectibleKind::Pixel);
        assert!(layout.teleports.is_empty());
        assert_eq!(layout.kill_y, 2000.0);
    }

    #[test]
    fn layout_rejects_degenerate_platform() {
        let err = LevelLayout::from_json(
            r#"{ "platforms": [{ "id": 1, "x": 0, "y": 0, "w": 0, "h": 10 }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "platforms", .. }));
    }

    #[test]
    fn idle_schedule_is_not_pending() {
        assert!(!RespawnSchedule::Idle.is_pending());
        assert!(RespawnSchedule::Reviving { remaining: 0.1 }.is_pending());
    }
}
