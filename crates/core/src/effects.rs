//! Timed effects granted by collectibles.

use log::debug;

use crate::collectible::{Effect, EffectKind};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub remaining: f32,
}

/// At most one entry per [`EffectKind`]; granting a kind that is already
/// running replaces its magnitude and restarts its timer.
#[derive(Clone, Debug, Default)]
pub struct ActiveEffects {
    active: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `effect`. Returns `false` for instant (zero-duration) effects,
    /// which are not stored.
    pub fn grant(&mut self, effect: &Effect) -> bool {
        if effect.duration <= 0.0 {
            return false;
        }
        let entry = ActiveEffect {
            kind: effect.kind,
            magnitude: effect.magnitude,
            remaining: effect.duration,
        };
        match self.active.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => *existing = entry,
            None => self.active.push(entry),
        }
        true
    }

    /// Counts down every effect and returns the kinds that ran out.
    pub fn tick(&mut self, dt: f32) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.active.retain_mut(|e| {
            e.remaining -= dt;
            if e.remaining <= 0.0 {
                debug!("effect {:?} expired", e.kind);
                expired.push(e.kind);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    pub fn magnitude(&self, kind: EffectKind) -> Option<f32> {
        self.active
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.magnitude)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.active.iter()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
