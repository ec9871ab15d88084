//! Collectible bookkeeping: pickup resolution, progress and pickup visuals.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::collectible::{Collectible, CollectibleKind, Effect};
use crate::player::Player;
use crate::{rects_intersect, Rect};

/// Spawn weights per kind. Sums to 1.
pub const SPAWN_TABLE: [(CollectibleKind, f32); 8] = [
    (CollectibleKind::Pixel, 0.40),
    (CollectibleKind::Gem, 0.20),
    (CollectibleKind::Star, 0.10),
    (CollectibleKind::PowerUp, 0.10),
    (CollectibleKind::FormChange, 0.05),
    (CollectibleKind::Health, 0.05),
    (CollectibleKind::SpeedBoost, 0.05),
    (CollectibleKind::JumpBoost, 0.05),
];

/// Life units lost per second by a pickup visual.
const EFFECT_DECAY: f32 = 1.0;
/// Upward drift of a pickup visual, in px/s.
const EFFECT_RISE: f32 = 40.0;

/// Maps a uniform draw in `[0, 1)` onto [`SPAWN_TABLE`] by cumulative weight.
pub fn kind_for_draw(draw: f32) -> CollectibleKind {
    let mut cumulative = 0.0;
    for (kind, weight) in SPAWN_TABLE {
        cumulative += weight;
        if draw < cumulative {
            return kind;
        }
    }
    CollectibleKind::Pixel
}

/// Floating "+value" marker left behind by a pickup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollectionEffect {
    pub x: f32,
    pub y: f32,
    pub value: u32,
    pub life: f32,
}

/// A pickup credited during [`CollectibleManager::update`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pickup {
    pub kind: CollectibleKind,
    pub value: u32,
    pub x: f32,
    pub y: f32,
    pub effects: &'static [Effect],
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CollectionProgress {
    pub collected: u32,
    pub total: u32,
    /// `collected / total`, or 0 for an empty level.
    pub ratio: f32,
}

#[derive(Clone, Debug)]
pub struct CollectibleManager {
    collectibles: Vec<Collectible>,
    collected: u32,
    effects: Vec<CollectionEffect>,
    rng: SmallRng,
}

impl CollectibleManager {
    pub fn new(seed: u64) -> Self {
        Self {
            collectibles: Vec::new(),
            collected: 0,
            effects: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn add(&mut self, collectible: Collectible) {
        self.collectibles.push(collectible);
    }

    pub fn spawn(&mut self, kind: CollectibleKind, x: f32, y: f32) {
        self.add(Collectible::new(kind, x, y));
    }

    /// Drops every collectible and all progress.
    pub fn clear(&mut self) {
        self.collectibles.clear();
        self.collected = 0;
        self.effects.clear();
    }

    /// Re-arms every collectible for a new attempt at the same level.
    pub fn reset(&mut self) {
        for c in &mut self.collectibles {
            c.reset();
        }
        self.collected = 0;
        self.effects.clear();
    }

    /// Animates every collectible, resolves pickups against `player` and ages
    /// the pickup visuals. Returns the pickups credited this frame.
    pub fn update(&mut self, dt: f32, player: &mut Player, now: f64) -> Vec<Pickup> {
        let mut pickups = Vec::new();
        let can_collect = player.is_alive();

        for c in &mut self.collectibles {
            c.update(dt);
            if !can_collect || !c.is_active() {
                continue;
            }
            if player.handle_collectible_collision(c, now) {
                self.collected += 1;
                self.effects.push(CollectionEffect {
                    x: c.x,
                    y: c.y,
                    value: c.value(),
                    life: 1.0,
                });
                debug!("collected {} worth {}", c.kind().name(), c.value());
                pickups.push(Pickup {
                    kind: c.kind(),
                    value: c.value(),
                    x: c.x,
                    y: c.y,
                    effects: c.effects(),
                });
            }
        }

        for e in &mut self.effects {
            e.life -= EFFECT_DECAY * dt;
            e.y -= EFFECT_RISE * dt;
        }
        self.effects.retain(|e| e.life > 0.0);

        pickups
    }

    /// Collectibles worth drawing: active or still pulsing, inside `bounds`.
    pub fn visible<'a>(&'a self, bounds: &'a Rect) -> impl Iterator<Item = &'a Collectible> + 'a {
        self.collectibles
            .iter()
            .filter(|c| c.is_active() || c.render_data().pulse > 0.0)
            .filter(move |c| rects_intersect(&c.bounds(), bounds))
    }

    /// Draws a kind from [`SPAWN_TABLE`].
    pub fn random_kind(&mut self) -> CollectibleKind {
        kind_for_draw(self.rng.gen::<f32>())
    }

    pub fn collection_progress(&self) -> CollectionProgress {
        let total = self.total();
        let ratio = if total == 0 {
            0.0
        } else {
            self.collected as f32 / total as f32
        };
        CollectionProgress {
            collected: self.collected,
            total,
            ratio,
        }
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn total(&self) -> u32 {
        self.collectibles.len() as u32
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn collection_effects(&self) -> &[CollectionEffect] {
        &self.effects
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::{kind_for_draw, CollectibleManager, SPAWN_TABLE};
    use crate::collectible::CollectibleKind;
    use crate::params::Params;
    use crate::player::Player;
    use crate::{Point, Rect};

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(&Params::default(), Point::new(x, y))
    }

    #[test]
    fn pickup_is_credited_once() {
        let mut manager = CollectibleManager::new(1);
        manager.spawn(CollectibleKind::Gem, 15.0, 15.0);
        manager.spawn(CollectibleKind::Pixel, 500.0, 500.0);
        let mut player = player_at(0.0, 0.0);

        let pickups = manager.update(0.0, &mut player, 3.0);
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].kind, CollectibleKind::Gem);
        assert_eq!(pickups[0].value, 5);
        assert_eq!(manager.collected(), 1);
        assert_eq!(manager.collectibles()[0].collected_at(), Some(3.0));
        assert_eq!(manager.collection_effects().len(), 1);

        assert!(manager.update(0.0, &mut player, 4.0).is_empty());
        assert_eq!(manager.collected(), 1);

        let progress = manager.collection_progress();
        assert_eq!((progress.collected, progress.total), (1, 2));
        assert_relative_eq!(progress.ratio, 0.5);
    }

    #[test]
    fn dead_player_collects_nothing() {
        let mut manager = CollectibleManager::new(1);
        manager.spawn(CollectibleKind::Pixel, 15.0, 15.0);
        let mut player = player_at(0.0, 0.0);
        player.die();
        assert!(manager.update(0.016, &mut player, 0.0).is_empty());
        assert!(manager.collectibles()[0].is_active());
    }

    #[test]
    fn pickup_visuals_fade_out() {
        let mut manager = CollectibleManager::new(1);
        manager.spawn(CollectibleKind::Pixel, 15.0, 15.0);
        let mut player = player_at(0.0, 0.0);
        manager.update(0.0, &mut player, 0.0);
        manager.update(0.5, &mut player, 0.5);
        let effect = manager.collection_effects()[0];
        assert_relative_eq!(effect.life, 0.5);
        assert!(effect.y < 15.0);
        manager.update(0.5, &mut player, 1.0);
        assert!(manager.collection_effects().is_empty());
    }

    #[test]
    fn reset_rearms_items() {
        let mut manager = CollectibleManager::new(1);
        manager.spawn(CollectibleKind::Star, 15.0, 15.0);
        let mut player = player_at(0.0, 0.0);
        manager.update(0.0, &mut player, 0.0);
        manager.reset();
        assert_eq!(manager.collected(), 0);
        assert!(manager.collectibles()[0].is_active());
        assert_eq!(manager.update(0.0, &mut player, 1.0).len(), 1);
    }

    #[test]
    fn empty_level_has_zero_progress() {
        let progress = CollectibleManager::new(0).collection_progress();
        assert_eq!(progress.total, 0);
        assert_eq!(progress.ratio, 0.0);
    }

    #[test]
    fn visibility_culls_against_bounds() {
        let mut manager = CollectibleManager::new(1);
        manager.spawn(CollectibleKind::Pixel, 100.0, 100.0);
        manager.spawn(CollectibleKind::Pixel, 2000.0, 100.0);
        let view = Rect::new(0.0, 0.0, 800.0, 600.0);
        let visible: Vec<_> = manager.visible(&view).collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].x, 100.0);
    }

    #[rstest]
    #[case(0.0, CollectibleKind::Pixel)]
    #[case(0.39, CollectibleKind::Pixel)]
    #[case(0.41, CollectibleKind::Gem)]
    #[case(0.65, CollectibleKind::Star)]
    #[case(0.75, CollectibleKind::PowerUp)]
    #[case(0.82, CollectibleKind::FormChange)]
    #[case(0.87, CollectibleKind::Health)]
    #[case(0.92, CollectibleKind::SpeedBoost)]
    #[case(0.97, CollectibleKind::JumpBoost)]
    fn draws_map_to_cumulative_weights(#[case] draw: f32, #[case] expected: CollectibleKind) {
        assert_eq!(kind_for_draw(draw), expected);
    }

    #[test]
    fn weighted_generator_matches_table() {
        const DRAWS: usize = 100_000;
        let mut manager = CollectibleManager::new(42);
        let mut counts = [0usize; 8];
        for _ in 0..DRAWS {
            counts[manager.random_kind() as usize] += 1;
        }
        for (kind, weight) in SPAWN_TABLE {
            let observed = counts[kind as usize] as f32 / DRAWS as f32;
            assert!(
                (observed - weight).abs() < 0.01,
                "{kind:?}: expected ~{weight}, observed {observed}"
            );
        }
    }
}
