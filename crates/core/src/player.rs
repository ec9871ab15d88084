//! Player kinematics, platform collision rules and the death/respawn cycle.
//!
//! Screen coordinates: `y` grows downward, `(x, y)` is the top-left corner of
//! the player's box. A step is `update` followed by one
//! `handle_platform_collision` call per candidate platform; `update` clears
//! the grounded flag and only a landing (or ledge grab) in the same step can
//! set it again.

use std::f32::consts::{FRAC_PI_2, TAU};

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::collectible::Collectible;
use crate::params::Params;
use crate::{rects_intersect, Point, Rect};

/// Flash units removed per second.
const FLASH_DECAY_RATE: f32 = 60.0;
const EXPLOSION_GRID: usize = 3;
const PARTICLE_LIFE: f32 = 1.0;
/// Tolerance when deciding which side of a platform edge the player came from.
const CONTACT_SLOP: f32 = 0.01;

/// Level geometry the player can stand on. `id` is stable for the lifetime
/// of a level and identifies checkpoints.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Platform {
    pub id: u32,
    #[serde(flatten)]
    pub rect: Rect,
}

impl Platform {
    pub const fn new(id: u32, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, w, h),
        }
    }
}

/// Level exit trigger.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Teleport {
    #[serde(flatten)]
    pub rect: Rect,
}

/// Non-owning record of the last platform the player stood on: its id and
/// where its top-left corner was when touched.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlatformRef {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl From<&Platform> for PlatformRef {
    fn from(platform: &Platform) -> Self {
        Self {
            id: platform.id,
            x: platform.rect.x,
            y: platform.rect.y,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub angle: f32,
    pub spin: f32,
    pub life: f32,
}

/// Result of [`Player::respawn`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RespawnOutcome {
    Respawned,
    /// Too many deaths from the same checkpoint. The counter has been
    /// cleared; relocating the player is up to the level owner.
    Escalated,
}

#[derive(Clone, Debug)]
pub struct PlayerRenderData<'a> {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
    /// Hit flash intensity in [0, 1].
    pub flash: f32,
    pub particles: &'a [Particle],
}

/// Flat copy of the player's state for hosts across the C/wasm boundary.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub dx: f32,
    pub dy: f32,
    pub angle: f32,
    pub flash: f32,
    pub grounded: u8,
    pub dead: u8,
    pub respawning: u8,
    pub particle_count: u32,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub angle: f32,
    width: f32,
    height: f32,

    grounded: bool,
    was_grounded: bool,
    /// Vertical displacement applied by the last `update`.
    step_dy: f32,
    flash_time: f32,
    dead: bool,
    respawning: bool,
    particles: Vec<Particle>,

    last_safe: Option<PlatformRef>,
    spawn: Point,
    consecutive_deaths: u32,
    last_death_platform: Option<u32>,
    has_died: bool,

    max_speed: f32,
    jump_scale: f32,
    params: Params,
    rng: SmallRng,
}

impl Player {
    pub fn new(params: &Params, spawn: Point) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            dx: params.max_speed,
            dy: 0.0,
            angle: 0.0,
            width: params.player_width,
            height: params.player_height,

            grounded: false,
            was_grounded: false,
            step_dy: 0.0,
            flash_time: 0.0,
            dead: false,
            respawning: false,
            particles: Vec::new(),

            last_safe: None,
            spawn,
            consecutive_deaths: 0,
            last_death_platform: None,
            has_died: false,

            max_speed: params.max_speed,
            jump_scale: 1.0,
            params: *params,
            rng: SmallRng::seed_from_u64(params.seed),
        }
    }

    /// Advances one physics step. `dt` must already be clamped by the caller.
    ///
    /// While dead or respawning only the explosion particles move.
    pub fn update(&mut self, dt: f32) {
        if self.dead || self.respawning {
            self.update_particles(dt);
            return;
        }

        self.dy += self.params.gravity * dt;
        self.step_dy = self.dy * dt;
        self.x += self.dx * dt;
        self.y += self.step_dy;

        if self.grounded {
            self.angle = (self.angle / FRAC_PI_2).round() * FRAC_PI_2;
        } else {
            self.angle = (self.angle + self.params.rotation_speed * dt).rem_euclid(TAU);
        }

        self.flash_time = (self.flash_time - FLASH_DECAY_RATE * dt).max(0.0);

        self.was_grounded = self.grounded;
        self.grounded = false;

        self.update_particles(dt);
    }

    fn update_particles(&mut self, dt: f32) {
        let gravity = self.params.particle_gravity;
        for p in &mut self.particles {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy += gravity * dt;
            p.angle += p.spin * dt;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn jump(&mut self) -> bool {
        if !self.grounded || self.dead || self.respawning {
            return false;
        }
        self.dy = -self.params.jump_velocity * self.jump_scale;
        self.grounded = false;
        true
    }

    /// Resolves contact with one platform. At most one rule fires per call:
    /// landing, ceiling bump, then side contact (ledge grab or lethal).
    ///
    /// When the player is moving into the platform's left face, landing and
    /// ceiling bumps also require that the last step crossed the matching
    /// edge, so running into a wall is never mistaken for arriving on top
    /// of it.
    ///
    /// Returns `true` when the player was placed against the platform and
    /// `false` for no contact or a lethal side hit.
    pub fn handle_platform_collision(&mut self, platform: &Platform) -> bool {
        if self.dead || self.respawning {
            return false;
        }

        let p = &platform.rect;
        let left = self.x;
        let right = self.x + self.width;
        let top = self.y;
        let bottom = self.y + self.height;

        let overlap_x = right.min(p.right()) - left.max(p.x);
        if overlap_x <= 0.0 {
            return false;
        }

        let entering_face = self.dx > 0.0 && left < p.x;
        let was_above = bottom - self.step_dy <= p.y + CONTACT_SLOP;
        let was_below = top - self.step_dy >= p.bottom() - CONTACT_SLOP;

        if self.dy >= 0.0
            && bottom >= p.y
            && bottom <= p.bottom()
            && (!entering_face || was_above)
        {
            self.y = p.y - self.height;
            self.dy = 0.0;
            self.grounded = true;
            self.last_safe = Some(PlatformRef::from(platform));
            return true;
        }

        if self.dy < 0.0
            && top > p.y
            && top < p.bottom()
            && (!entering_face || was_below)
        {
            self.y = p.bottom();
            self.dy = 0.0;
            return true;
        }

        let vertical_overlap = bottom > p.y && top < p.bottom();
        if entering_face && vertical_overlap {
            let ledge = bottom - p.y;
            if ledge > 0.0 && ledge < self.height * 0.5 && self.dy >= 0.0 {
                debug!("ledge grab on platform {} (depth {ledge:.1})", platform.id);
                self.y = p.y - self.height;
                self.dy = -self.params.ledge_bounce;
                self.grounded = true;
                self.last_safe = Some(PlatformRef::from(platform));
                return true;
            }
            debug!("side crash into platform {} (depth {ledge:.1})", platform.id);
            self.die();
            return false;
        }

        false
    }

    /// Collects `item` when it is active and the player's center lies within
    /// half the player's width plus the item's size. Crediting the pickup is
    /// left to the caller.
    pub fn handle_collectible_collision(&mut self, item: &mut Collectible, now: f64) -> bool {
        if !item.is_active() {
            return false;
        }
        let center = self.center();
        let distance = (center.x - item.x).hypot(center.y - item.y);
        if distance < self.width * 0.5 + item.size() && item.collect(now) {
            self.flash_time = self.params.flash_duration;
            return true;
        }
        false
    }

    pub fn handle_teleport_collision(&self, teleport: &Teleport) -> bool {
        rects_intersect(&self.bounds(), &teleport.rect)
    }

    pub fn die(&mut self) {
        if self.dead || self.respawning {
            return;
        }
        self.dead = true;
        self.spawn_explosion();

        let platform_id = self.last_safe.map(|p| p.id);
        if self.has_died && platform_id == self.last_death_platform {
            self.consecutive_deaths += 1;
        } else {
            self.consecutive_deaths = 1;
            self.last_death_platform = platform_id;
            self.has_died = true;
        }
        debug!(
            "player died at ({:.1}, {:.1}); {} consecutive from platform {:?}",
            self.x, self.y, self.consecutive_deaths, platform_id
        );
    }

    fn spawn_explosion(&mut self) {
        let piece = self.width / EXPLOSION_GRID as f32;
        let spread = self.params.explosion_spread;
        let jitter = self.params.explosion_jitter;
        let spin = self.params.particle_spin;

        self.particles.clear();
        for row in 0..EXPLOSION_GRID {
            for col in 0..EXPLOSION_GRID {
                let gx = col as f32 - 1.0;
                let gy = row as f32 - 1.0;
                let vx = gx * spread + self.rng.gen_range(-jitter..=jitter);
                let vy = gy * spread + self.rng.gen_range(-jitter..=jitter)
                    - self.params.explosion_lift;
                self.particles.push(Particle {
                    x: self.x + (col as f32 + 0.5) * piece,
                    y: self.y + (row as f32 + 0.5) * self.height / EXPLOSION_GRID as f32,
                    vx,
                    vy,
                    size: piece,
                    angle: self.angle,
                    spin: self.rng.gen_range(-spin..=spin),
                    life: PARTICLE_LIFE,
                });
            }
        }
    }

    /// Moves a dead player into the respawning phase.
    pub fn begin_respawn(&mut self) -> bool {
        if !self.dead {
            return false;
        }
        self.dead = false;
        self.respawning = true;
        true
    }

    pub fn respawn(&mut self) -> RespawnOutcome {
        self.dead = false;
        self.respawning = false;
        self.particles.clear();

        let anchor = match self.last_safe {
            Some(p) => Point::new(
                p.x + self.params.respawn_inset,
                p.y - self.height - self.params.respawn_lift,
            ),
            None => self.spawn,
        };
        self.x = anchor.x;
        self.y = anchor.y;
        self.dx = self.max_speed;
        self.dy = 0.0;
        self.angle = 0.0;
        self.grounded = false;
        self.was_grounded = false;
        self.step_dy = 0.0;
        self.flash_time = 0.0;

        if self.consecutive_deaths > self.params.escalation_threshold {
            warn!(
                "{} consecutive deaths from platform {:?}; escalating",
                self.consecutive_deaths, self.last_death_platform
            );
            self.consecutive_deaths = 0;
            return RespawnOutcome::Escalated;
        }
        debug!("respawned at ({:.1}, {:.1})", self.x, self.y);
        RespawnOutcome::Respawned
    }

    /// Returns to the spawn anchor and forgets all death history.
    pub fn reset(&mut self) {
        self.max_speed = self.params.max_speed;
        self.jump_scale = 1.0;
        self.x = self.spawn.x;
        self.y = self.spawn.y;
        self.dx = self.max_speed;
        self.dy = 0.0;
        self.angle = 0.0;
        self.grounded = false;
        self.was_grounded = false;
        self.step_dy = 0.0;
        self.flash_time = 0.0;
        self.dead = false;
        self.respawning = false;
        self.particles.clear();
        self.last_safe = None;
        self.consecutive_deaths = 0;
        self.last_death_platform = None;
        self.has_died = false;
    }

    pub fn set_spawn(&mut self, spawn: Point) {
        self.spawn = spawn;
    }

    pub fn increase_speed(&mut self, amount: f32) {
        self.set_speed(self.max_speed + amount);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.max_speed = speed;
        self.dx = speed;
    }

    pub fn set_jump_scale(&mut self, scale: f32) {
        self.jump_scale = scale;
    }

    pub fn flash(&mut self) {
        self.flash_time = self.params.flash_duration;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn was_grounded(&self) -> bool {
        self.was_grounded
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_respawning(&self) -> bool {
        self.respawning
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && !self.respawning
    }

    pub fn flash_time(&self) -> f32 {
        self.flash_time
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn last_safe_platform(&self) -> Option<PlatformRef> {
        self.last_safe
    }

    pub fn consecutive_deaths(&self) -> u32 {
        self.consecutive_deaths
    }

    pub fn spawn(&self) -> Point {
        self.spawn
    }

    fn flash_intensity(&self) -> f32 {
        (self.flash_time / self.params.flash_duration).clamp(0.0, 1.0)
    }

    pub fn render_data(&self) -> PlayerRenderData<'_> {
        PlayerRenderData {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            angle: self.angle,
            flash: self.flash_intensity(),
            particles: &self.particles,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            dx: self.dx,
            dy: self.dy,
            angle: self.angle,
            flash: self.flash_intensity(),
            grounded: u8::from(self.grounded),
            dead: u8::from(self.dead),
            respawning: u8::from(self.respawning),
            particle_count: self.particles.len() as u32,
        }
    }
}
