//! Collectible entities and their immutable type catalog.

use serde::Deserialize;

use crate::{Point, Rect};

/// Radians of animation phase advanced per second.
const PHASE_RATE: f32 = 3.0;
const BOB_AMPLITUDE: f32 = 4.0;
/// Decay per second of the pickup pulse.
const PULSE_DECAY: f32 = 3.0;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum CollectibleKind {
    #[default]
    Pixel = 0,
    Gem = 1,
    Star = 2,
    PowerUp = 3,
    FormChange = 4,
    Health = 5,
    SpeedBoost = 6,
    JumpBoost = 7,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    FormChange,
    SpeedBoost,
    JumpBoost,
    Invincibility,
    Magnet,
    HealthBoost,
}

/// One effect granted on pickup. A `duration` of zero applies instantly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub duration: f32,
}

/// Catalog entry for a [`CollectibleKind`].
#[derive(Debug)]
pub struct KindConfig {
    pub name: &'static str,
    pub size: f32,
    pub value: u32,
    pub color: [u8; 3],
    pub rotation_speed: f32,
    pub effects: &'static [Effect],
}

const fn effect(kind: EffectKind, magnitude: f32, duration: f32) -> Effect {
    Effect {
        kind,
        magnitude,
        duration,
    }
}

static PIXEL: KindConfig = KindConfig {
    name: "pixel",
    size: 8.0,
    value: 1,
    color: [255, 255, 255],
    rotation_speed: 2.0,
    effects: &[],
};

static GEM: KindConfig = KindConfig {
    name: "gem",
    size: 12.0,
    value: 5,
    color: [80, 200, 255],
    rotation_speed: 1.5,
    effects: &[],
};

static STAR: KindConfig = KindConfig {
    name: "star",
    size: 14.0,
    value: 10,
    color: [255, 220, 60],
    rotation_speed: 3.0,
    effects: &[effect(EffectKind::Invincibility, 1.0, 5.0)],
};

static POWER_UP: KindConfig = KindConfig {
    name: "powerUp",
    size: 16.0,
    value: 15,
    color: [255, 90, 200],
    rotation_speed: 1.0,
    effects: &[effect(EffectKind::Magnet, 150.0, 8.0)],
};

static FORM_CHANGE: KindConfig = KindConfig {
    name: "formChange",
    size: 14.0,
    value: 10,
    color: [170, 110, 255],
    rotation_speed: 2.5,
    effects: &[effect(EffectKind::FormChange, 1.0, 10.0)],
};

static HEALTH: KindConfig = KindConfig {
    name: "health",
    size: 12.0,
    value: 5,
    color: [255, 70, 70],
    rotation_speed: 0.5,
    effects: &[effect(EffectKind::HealthBoost, 1.0, 0.0)],
};

static SPEED_BOOST: KindConfig = KindConfig {
    name: "speedBoost",
    size: 12.0,
    value: 5,
    color: [90, 255, 120],
    rotation_speed: 4.0,
    effects: &[effect(EffectKind::SpeedBoost, 1.5, 5.0)],
};

static JUMP_BOOST: KindConfig = KindConfig {
    name: "jumpBoost",
    size: 12.0,
    value: 5,
    color: [255, 160, 40],
    rotation_speed: 4.0,
    effects: &[effect(EffectKind::JumpBoost, 1.3, 5.0)],
};

impl CollectibleKind {
    pub const ALL: [Self; 8] = [
        Self::Pixel,
        Self::Gem,
        Self::Star,
        Self::PowerUp,
        Self::FormChange,
        Self::Health,
        Self::SpeedBoost,
        Self::JumpBoost,
    ];

    pub fn config(self) -> &'static KindConfig {
        match self {
            Self::Pixel => &PIXEL,
            Self::Gem => &GEM,
            Self::Star => &STAR,
            Self::PowerUp => &POWER_UP,
            Self::FormChange => &FORM_CHANGE,
            Self::Health => &HEALTH,
            Self::SpeedBoost => &SPEED_BOOST,
            Self::JumpBoost => &JUMP_BOOST,
        }
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }

    /// Resolves a type tag case-insensitively; unknown tags fall back to
    /// [`CollectibleKind::Pixel`].
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(tag))
            .unwrap_or_default()
    }

    pub fn from_u8(raw: u8) -> Self {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .unwrap_or_default()
    }
}

impl From<String> for CollectibleKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollectibleRenderData {
    pub kind: CollectibleKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub rotation: f32,
    pub glow: f32,
    pub pulse: f32,
    pub color: [u8; 3],
}

#[derive(Clone, Debug)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    kind: CollectibleKind,
    active: bool,
    collected: bool,
    collected_at: Option<f64>,
    size: f32,
    value: u32,
    rotation_speed: f32,
    phase: f32,
    bob: f32,
    rotation: f32,
    glow: f32,
    pulse: f32,
    effects: &'static [Effect],
}

impl Collectible {
    pub fn new(kind: CollectibleKind, x: f32, y: f32) -> Self {
        let config = kind.config();
        Self {
            x,
            y,
            kind,
            active: true,
            collected: false,
            collected_at: None,
            size: config.size,
            value: config.value,
            rotation_speed: config.rotation_speed,
            phase: 0.0,
            bob: 0.0,
            rotation: 0.0,
            glow: 0.5,
            pulse: 0.0,
            effects: config.effects,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.phase += PHASE_RATE * dt;
        self.bob = self.phase.sin() * BOB_AMPLITUDE;
        self.rotation += self.rotation_speed * dt;
        self.glow = 0.5 + 0.5 * (self.phase * 2.0).sin();
        if self.pulse > 0.0 {
            self.pulse = (self.pulse - PULSE_DECAY * dt).max(0.0);
        }
    }

    /// Marks the item collected at `now`. Succeeds at most once per reset
    /// cycle.
    pub fn collect(&mut self, now: f64) -> bool {
        if !self.active || self.collected {
            return false;
        }
        self.active = false;
        self.collected = true;
        self.collected_at = Some(now);
        self.pulse = 1.0;
        true
    }

    /// Starts a new collection cycle at the original placement.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind, self.x, self.y);
    }

    pub fn kind(&self) -> CollectibleKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn collected_at(&self) -> Option<f64> {
        self.collected_at
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn effects(&self) -> &'static [Effect] {
        self.effects
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Square around the item, used for culling.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x - self.size,
            self.y - self.size,
            self.size * 2.0,
            self.size * 2.0,
        )
    }

    pub fn render_data(&self) -> CollectibleRenderData {
        CollectibleRenderData {
            kind: self.kind,
            x: self.x,
            y: self.y + self.bob,
            size: self.size,
            rotation: self.rotation,
            glow: self.glow,
            pulse: self.pulse,
            color: self.kind.config().color,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::{Collectible, CollectibleKind, EffectKind};

    #[test]
    fn collect_succeeds_exactly_once() {
        let mut item = Collectible::new(CollectibleKind::Gem, 10.0, 20.0);
        assert!(item.collect(1.5));
        assert!(!item.is_active());
        assert!(item.is_collected());
        assert_eq!(item.collected_at(), Some(1.5));
        for _ in 0..3 {
            assert!(!item.collect(2.0));
        }
        assert_eq!(item.collected_at(), Some(1.5));
    }

    #[test]
    fn reset_starts_a_new_cycle() {
        let mut item = Collectible::new(CollectibleKind::Star, 0.0, 0.0);
        assert!(item.collect(0.0));
        item.reset();
        assert!(item.is_active());
        assert!(item.collect(1.0));
    }

    #[rstest]
    #[case("pixel", CollectibleKind::Pixel)]
    #[case("GEM", CollectibleKind::Gem)]
    #[case("powerup", CollectibleKind::PowerUp)]
    #[case("speedBoost", CollectibleKind::SpeedBoost)]
    #[case("banana", CollectibleKind::Pixel)]
    #[case("", CollectibleKind::Pixel)]
    fn tags_resolve_case_insensitively(#[case] tag: &str, #[case] expected: CollectibleKind) {
        assert_eq!(CollectibleKind::from_tag(tag), expected);
    }

    #[test]
    fn out_of_range_raw_kind_falls_back_to_pixel() {
        assert_eq!(CollectibleKind::from_u8(3), CollectibleKind::PowerUp);
        assert_eq!(CollectibleKind::from_u8(200), CollectibleKind::Pixel);
    }

    #[test]
    fn catalog_supplies_effects() {
        let item = Collectible::new(CollectibleKind::JumpBoost, 0.0, 0.0);
        assert_eq!(item.effects().len(), 1);
        assert_eq!(item.effects()[0].kind, EffectKind::JumpBoost);
        assert!(Collectible::new(CollectibleKind::Pixel, 0.0, 0.0)
            .effects()
            .is_empty());
    }

    #[test]
    fn animation_bobs_and_pulse_decays() {
        let mut item = Collectible::new(CollectibleKind::Pixel, 0.0, 100.0);
        assert!(item.collect(0.0));
        item.update(0.1);
        let data = item.render_data();
        assert_relative_eq!(data.y, 100.0 + (0.3f32).sin() * 4.0, epsilon = 1e-5);
        assert_relative_eq!(data.pulse, 0.7, epsilon = 1e-5);
        assert!((0.0..=1.0).contains(&data.glow));
        item.update(1.0);
        assert_eq!(item.render_data().pulse, 0.0);
    }
}
