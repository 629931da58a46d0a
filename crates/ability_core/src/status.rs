//! Status effect registry and per-entity applied statuses.
//!
//! Effects are defined once at content load and never change afterwards.
//! What changes is their application to an entity: a [`StatusSet`] holds
//! (effect, remaining duration) pairs and is advanced once per tick.
//!
//! Two pairwise rules connect effects:
//!
//! - **Opposites** are mutually exclusive. Applying an effect strips every
//!   applied effect in its opposite set. The relation is always symmetric.
//! - **Affinities** fire a [`Reaction`] while both effects are applied. The
//!   reaction runs once per tick for the pair, then the partner that
//!   triggered it is consumed.
//!
//! Nothing here renders anything. Visual and audio follow-ups are reported as
//! [`StatusEvent`]s for the caller to forward.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::components::Ticks;
use crate::error::{AbilityError, Result};
use crate::math::{fixed_serde, Fixed};

/// Dense index of a status effect inside its [`StatusRegistry`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct StatusId(u16);

impl StatusId {
    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an affinity does to the effect that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionResult {
    /// The owning effect is left as it is.
    Keep,
    /// The owning effect is removed and `with` is applied instead.
    Replace {
        /// Effect applied in place of the owner.
        with: StatusId,
        /// Duration of the substituted effect.
        duration: Ticks,
    },
    /// The partner's remaining duration is added to the owner, never
    /// exceeding `cap`.
    Extend {
        /// Ceiling for the owner's resulting duration.
        cap: Ticks,
    },
}

/// Reaction fired when an effect and its affinity partner are both applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Armor-ignoring damage dealt to the entity.
    pub pierce_damage: u32,
    /// Effect on the owning status.
    pub result: ReactionResult,
}

impl Reaction {
    /// A reaction that only deals pierce damage.
    #[must_use]
    pub const fn damage(pierce_damage: u32) -> Self {
        Self {
            pierce_damage,
            result: ReactionResult::Keep,
        }
    }

    /// A reaction that extends the owner up to `cap` ticks.
    #[must_use]
    pub const fn extend(pierce_damage: u32, cap: Ticks) -> Self {
        Self {
            pierce_damage,
            result: ReactionResult::Extend { cap },
        }
    }

    /// A reaction that swaps the owner for another effect.
    #[must_use]
    pub const fn replace(pierce_damage: u32, with: StatusId, duration: Ticks) -> Self {
        Self {
            pierce_damage,
            result: ReactionResult::Replace { with, duration },
        }
    }
}

/// An immutable status effect definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Registry index, assigned by [`StatusRegistry::register`].
    pub id: StatusId,
    /// Unique content name.
    pub name: String,
    /// Movement speed multiplier.
    #[serde(with = "fixed_serde")]
    pub speed_multiplier: Fixed,
    /// Maximum health multiplier.
    #[serde(with = "fixed_serde")]
    pub health_multiplier: Fixed,
    /// Outgoing damage multiplier.
    #[serde(with = "fixed_serde")]
    pub damage_multiplier: Fixed,
    /// Weapon reload speed multiplier.
    #[serde(with = "fixed_serde")]
    pub reload_multiplier: Fixed,
    /// Construction speed multiplier.
    #[serde(with = "fixed_serde")]
    pub build_speed_multiplier: Fixed,
    /// Damage dealt every `damage_interval` ticks.
    pub damage: u32,
    /// Ticks between periodic damage hits; zero disables periodic damage.
    pub damage_interval: Ticks,
    /// Never expires by time; only an explicit unapply removes it.
    pub permanent: bool,
    /// Suppresses weapons while applied.
    pub disarm: bool,
    /// Only produced by reactions, never applied directly by content.
    pub reactive: bool,
    /// Mutually exclusive effects.
    pub opposites: BTreeSet<StatusId>,
    /// Partner effect → reaction, keyed by partner.
    pub affinities: BTreeMap<StatusId, Reaction>,
}

impl StatusEffect {
    /// A neutral effect with every multiplier at 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StatusId::default(),
            name: name.into(),
            speed_multiplier: Fixed::ONE,
            health_multiplier: Fixed::ONE,
            damage_multiplier: Fixed::ONE,
            reload_multiplier: Fixed::ONE,
            build_speed_multiplier: Fixed::ONE,
            damage: 0,
            damage_interval: 0,
            permanent: false,
            disarm: false,
            reactive: false,
            opposites: BTreeSet::new(),
            affinities: BTreeMap::new(),
        }
    }

    /// Set the speed multiplier as a percentage.
    #[must_use]
    pub fn speed(mut self, percent: u32) -> Self {
        self.speed_multiplier = percent_to_fixed(percent);
        self
    }

    /// Set the health multiplier as a percentage.
    #[must_use]
    pub fn health(mut self, percent: u32) -> Self {
        self.health_multiplier = percent_to_fixed(percent);
        self
    }

    /// Set the damage multiplier as a percentage.
    #[must_use]
    pub fn damage_mult(mut self, percent: u32) -> Self {
        self.damage_multiplier = percent_to_fixed(percent);
        self
    }

    /// Set the reload multiplier as a percentage.
    #[must_use]
    pub fn reload(mut self, percent: u32) -> Self {
        self.reload_multiplier = percent_to_fixed(percent);
        self
    }

    /// Set the build speed multiplier as a percentage.
    #[must_use]
    pub fn build_speed(mut self, percent: u32) -> Self {
        self.build_speed_multiplier = percent_to_fixed(percent);
        self
    }

    /// Deal `damage` every `interval` ticks while applied.
    #[must_use]
    pub fn periodic(mut self, damage: u32, interval: Ticks) -> Self {
        self.damage = damage;
        self.damage_interval = interval;
        self
    }

    /// Mark as timeless.
    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    /// Mark as weapon-suppressing.
    #[must_use]
    pub fn disarm(mut self) -> Self {
        self.disarm = true;
        self
    }

    /// Mark as reaction-only.
    #[must_use]
    pub fn reactive(mut self) -> Self {
        self.reactive = true;
        self
    }
}

fn percent_to_fixed(percent: u32) -> Fixed {
    Fixed::saturating_from_num(percent) / Fixed::from_num(100)
}

/// All status effects known to a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRegistry {
    effects: Vec<StatusEffect>,
    by_name: BTreeMap<String, StatusId>,
}

impl StatusRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::DuplicateStatus`] if the name is taken, or
    /// [`AbilityError::InvalidContent`] once the registry is full.
    pub fn register(&mut self, mut effect: StatusEffect) -> Result<StatusId> {
        if self.by_name.contains_key(&effect.name) {
            return Err(AbilityError::DuplicateStatus(effect.name));
        }
        let index = u16::try_from(self.effects.len()).map_err(|_| AbilityError::InvalidContent {
            owner: effect.name.clone(),
            message: "too many status effects".to_string(),
        })?;
        let id = StatusId(index);
        effect.id = id;
        effect.opposites.clear();
        effect.affinities.clear();
        self.by_name.insert(effect.name.clone(), id);
        self.effects.push(effect);
        Ok(id)
    }

    /// Declare two effects mutually exclusive, in both directions.
    pub fn set_opposite(&mut self, a: StatusId, b: StatusId) {
        if a == b {
            return;
        }
        if let Some(effect) = self.effects.get_mut(a.index()) {
            effect.opposites.insert(b);
        }
        if let Some(effect) = self.effects.get_mut(b.index()) {
            effect.opposites.insert(a);
        }
    }

    /// Register `reaction` on `owner`, fired while `partner` is also applied.
    pub fn set_affinity(&mut self, owner: StatusId, partner: StatusId, reaction: Reaction) {
        if let Some(effect) = self.effects.get_mut(owner.index()) {
            effect.affinities.insert(partner, reaction);
        }
    }

    /// Look up an effect by id.
    #[must_use]
    pub fn get(&self, id: StatusId) -> Option<&StatusEffect> {
        self.effects.get(id.index())
    }

    /// Look up an effect id by content name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<StatusId> {
        self.by_name.get(name).copied()
    }

    /// Content name of an effect, or `"?"` for unknown ids.
    #[must_use]
    pub fn name(&self, id: StatusId) -> &str {
        self.get(id).map_or("?", |e| e.name.as_str())
    }

    /// Number of registered effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effects are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterate effects in id order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    fn is_permanent(&self, id: StatusId) -> bool {
        self.get(id).is_some_and(|e| e.permanent)
    }
}

/// One applied effect on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The applied effect.
    pub effect: StatusId,
    /// Ticks left. Always zero for permanent effects.
    pub remaining: Ticks,
    /// Ticks since first application, used for periodic damage.
    pub age: Ticks,
}

/// Notification produced by status bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// An effect was newly applied.
    Applied {
        /// The effect.
        effect: StatusId,
    },
    /// An effect ran out of time.
    Expired {
        /// The effect.
        effect: StatusId,
    },
    /// An effect was stripped by an opposite being applied.
    Cleared {
        /// The stripped effect.
        effect: StatusId,
        /// The opposite that stripped it.
        by: StatusId,
    },
    /// Periodic damage from an applied effect.
    PeriodicDamage {
        /// The damaging effect.
        effect: StatusId,
        /// Damage dealt.
        amount: u32,
    },
    /// An affinity reaction fired.
    Reaction {
        /// Effect owning the affinity.
        effect: StatusId,
        /// Partner that triggered it.
        partner: StatusId,
        /// Armor-ignoring damage dealt.
        pierce_damage: u32,
    },
}

/// Combined multipliers of every applied effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatModifiers {
    /// Product of speed multipliers.
    pub speed: Fixed,
    /// Product of health multipliers.
    pub health: Fixed,
    /// Product of damage multipliers.
    pub damage: Fixed,
    /// Product of reload multipliers.
    pub reload: Fixed,
    /// Product of build speed multipliers.
    pub build_speed: Fixed,
    /// Whether any applied effect disarms.
    pub disarmed: bool,
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self {
            speed: Fixed::ONE,
            health: Fixed::ONE,
            damage: Fixed::ONE,
            reload: Fixed::ONE,
            build_speed: Fixed::ONE,
            disarmed: false,
        }
    }
}

/// Effects currently applied to one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSet {
    entries: BTreeMap<StatusId, StatusEntry>,
}

impl StatusSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply or refresh `effect` for `duration` ticks.
    ///
    /// Applied opposites are stripped first. Refreshing keeps the larger of
    /// the remaining and the new duration. Permanent effects store a cleared
    /// (zero) duration. Unknown ids are ignored.
    pub fn apply(
        &mut self,
        registry: &StatusRegistry,
        effect: StatusId,
        duration: Ticks,
    ) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        let Some(def) = registry.get(effect) else {
            return events;
        };

        for &opposite in &def.opposites {
            if self.entries.remove(&opposite).is_some() {
                events.push(StatusEvent::Cleared {
                    effect: opposite,
                    by: effect,
                });
            }
        }

        let duration = if def.permanent { 0 } else { duration };
        match self.entries.get_mut(&effect) {
            Some(entry) => entry.remaining = entry.remaining.max(duration),
            None => {
                self.entries.insert(
                    effect,
                    StatusEntry {
                        effect,
                        remaining: duration,
                        age: 0,
                    },
                );
                events.push(StatusEvent::Applied { effect });
            }
        }
        events
    }

    /// Remove `effect` immediately. Returns whether it was applied.
    pub fn unapply(&mut self, effect: StatusId) -> bool {
        self.entries.remove(&effect).is_some()
    }

    /// Whether `effect` is applied.
    #[must_use]
    pub fn has(&self, effect: StatusId) -> bool {
        self.entries.contains_key(&effect)
    }

    /// Remaining duration of `effect`, if applied.
    #[must_use]
    pub fn remaining(&self, effect: StatusId) -> Option<Ticks> {
        self.entries.get(&effect).map(|e| e.remaining)
    }

    /// Number of applied effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate applied effects in id order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.values()
    }

    /// Combined multipliers of every applied effect.
    #[must_use]
    pub fn modifiers(&self, registry: &StatusRegistry) -> StatModifiers {
        let mut mods = StatModifiers::default();
        for def in self.entries.keys().filter_map(|&id| registry.get(id)) {
            mods.speed = mods.speed.saturating_mul(def.speed_multiplier);
            mods.health = mods.health.saturating_mul(def.health_multiplier);
            mods.damage = mods.damage.saturating_mul(def.damage_multiplier);
            mods.reload = mods.reload.saturating_mul(def.reload_multiplier);
            mods.build_speed = mods.build_speed.saturating_mul(def.build_speed_multiplier);
            mods.disarmed |= def.disarm;
        }
        mods
    }

    /// Advance every applied effect by `delta` ticks.
    ///
    /// Order within the tick: affinity reactions (once per applied pair),
    /// periodic damage, then expiry of timed effects.
    pub fn update(&mut self, registry: &StatusRegistry, delta: Ticks) -> Vec<StatusEvent> {
        let mut events = self.run_reactions(registry);

        for entry in self.entries.values_mut() {
            let Some(def) = registry.get(entry.effect) else {
                continue;
            };
            if def.damage > 0 && def.damage_interval > 0 {
                let before = entry.age / def.damage_interval;
                let after = entry.age.saturating_add(delta) / def.damage_interval;
                let hits = after - before;
                if hits > 0 {
                    events.push(StatusEvent::PeriodicDamage {
                        effect: entry.effect,
                        amount: def.damage.saturating_mul(hits),
                    });
                }
            }
            entry.age = entry.age.saturating_add(delta);
        }

        let mut expired = Vec::new();
        for entry in self.entries.values_mut() {
            if registry.is_permanent(entry.effect) {
                continue;
            }
            if entry.remaining <= delta {
                expired.push(entry.effect);
            } else {
                entry.remaining -= delta;
            }
        }
        for effect in expired {
            self.entries.remove(&effect);
            events.push(StatusEvent::Expired { effect });
        }

        events
    }

    fn run_reactions(&mut self, registry: &StatusRegistry) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        let pairs: Vec<(StatusId, StatusId, Reaction)> = self
            .entries
            .keys()
            .filter_map(|&id| registry.get(id))
            .flat_map(|def| {
                def.affinities
                    .iter()
                    .map(move |(&partner, &reaction)| (def.id, partner, reaction))
            })
            .filter(|(owner, partner, _)| owner != partner)
            .collect();

        for (owner, partner, reaction) in pairs {
            // An earlier reaction this tick may have consumed either side.
            let Some(partner_remaining) = self.remaining(partner) else {
                continue;
            };
            if !self.has(owner) {
                continue;
            }

            events.push(StatusEvent::Reaction {
                effect: owner,
                partner,
                pierce_damage: reaction.pierce_damage,
            });

            match reaction.result {
                ReactionResult::Keep => {}
                ReactionResult::Replace { with, duration } => {
                    self.entries.remove(&owner);
                    events.extend(self.apply(registry, with, duration));
                }
                ReactionResult::Extend { cap } => {
                    if !registry.is_permanent(owner) {
                        if let Some(entry) = self.entries.get_mut(&owner) {
                            entry.remaining = entry
                                .remaining
                                .saturating_add(partner_remaining)
                                .min(cap);
                        }
                    }
                }
            }

            if !registry.is_permanent(partner) {
                self.entries.remove(&partner);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fx {
        registry: StatusRegistry,
        wet: StatusId,
        burning: StatusId,
        tarred: StatusId,
        shocked: StatusId,
        sieged: StatusId,
        melting: StatusId,
    }

    fn fixture() -> Fx {
        let mut registry = StatusRegistry::new();
        let wet = registry.register(StatusEffect::new("wet").speed(94)).unwrap();
        let burning = registry
            .register(StatusEffect::new("burning").periodic(1, 8))
            .unwrap();
        let tarred = registry.register(StatusEffect::new("tarred").speed(60)).unwrap();
        let shocked = registry.register(StatusEffect::new("shocked").reactive()).unwrap();
        let sieged = registry
            .register(StatusEffect::new("sieged").speed(0).permanent())
            .unwrap();
        let melting = registry
            .register(StatusEffect::new("melting").periodic(2, 10))
            .unwrap();
        registry.set_opposite(wet, burning);
        registry.set_affinity(burning, tarred, Reaction::extend(8, 300));
        registry.set_affinity(melting, tarred, Reaction::extend(8, 200));
        registry.set_affinity(wet, shocked, Reaction::damage(14));
        Fx {
            registry,
            wet,
            burning,
            tarred,
            shocked,
            sieged,
            melting,
        }
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = StatusRegistry::new();
        registry.register(StatusEffect::new("wet")).unwrap();
        assert!(matches!(
            registry.register(StatusEffect::new("wet")),
            Err(AbilityError::DuplicateStatus(_))
        ));
    }

    #[test]
    fn test_opposites_are_symmetric() {
        let fx = fixture();
        assert!(fx.registry.get(fx.wet).unwrap().opposites.contains(&fx.burning));
        assert!(fx.registry.get(fx.burning).unwrap().opposites.contains(&fx.wet));
    }

    #[test]
    fn test_apply_strips_opposite() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.burning, 120);

        let events = set.apply(&fx.registry, fx.wet, 60);

        assert!(set.has(fx.wet));
        assert!(!set.has(fx.burning));
        assert!(events.contains(&StatusEvent::Cleared {
            effect: fx.burning,
            by: fx.wet
        }));
    }

    #[test]
    fn test_refresh_keeps_longer_duration() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.wet, 100);
        set.apply(&fx.registry, fx.wet, 40);
        assert_eq!(set.remaining(fx.wet), Some(100));
        set.apply(&fx.registry, fx.wet, 150);
        assert_eq!(set.remaining(fx.wet), Some(150));
    }

    #[test]
    fn test_timed_effect_expires() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.wet, 3);

        set.update(&fx.registry, 1);
        set.update(&fx.registry, 1);
        assert_eq!(set.remaining(fx.wet), Some(1));

        let events = set.update(&fx.registry, 1);
        assert!(!set.has(fx.wet));
        assert!(events.contains(&StatusEvent::Expired { effect: fx.wet }));
    }

    #[test]
    fn test_permanent_effect_survives_time() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.sieged, 50);
        assert_eq!(set.remaining(fx.sieged), Some(0));

        for _ in 0..1000 {
            set.update(&fx.registry, 1);
        }
        assert!(set.has(fx.sieged));
        assert!(set.unapply(fx.sieged));
        assert!(!set.has(fx.sieged));
    }

    #[test]
    fn test_periodic_damage_interval() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.burning, 100);

        let total: u32 = (0..16)
            .flat_map(|_| set.update(&fx.registry, 1))
            .filter_map(|e| match e {
                StatusEvent::PeriodicDamage { amount, .. } => Some(amount),
                _ => None,
            })
            .sum();
        // Hits at age 8 and 16.
        assert_eq!(total, 2);
    }

    #[test]
    fn test_affinity_extends_up_to_cap() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.burning, 250);
        set.apply(&fx.registry, fx.tarred, 240);

        let events = set.update(&fx.registry, 1);

        // 250 + 240 capped at 300, then one tick elapses.
        assert_eq!(set.remaining(fx.burning), Some(299));
        assert!(!set.has(fx.tarred), "partner is consumed");
        assert!(events.contains(&StatusEvent::Reaction {
            effect: fx.burning,
            partner: fx.tarred,
            pierce_damage: 8,
        }));
    }

    #[test]
    fn test_affinity_caps_differ_per_pair() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.melting, 190);
        set.apply(&fx.registry, fx.tarred, 500);
        set.update(&fx.registry, 1);
        assert_eq!(set.remaining(fx.melting), Some(199));
    }

    #[test]
    fn test_damage_only_reaction_runs_once_per_tick() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.wet, 100);
        set.apply(&fx.registry, fx.shocked, 100);

        let reactions = set
            .update(&fx.registry, 1)
            .into_iter()
            .filter(|e| matches!(e, StatusEvent::Reaction { .. }))
            .count();
        assert_eq!(reactions, 1);

        let again = set
            .update(&fx.registry, 1)
            .into_iter()
            .filter(|e| matches!(e, StatusEvent::Reaction { .. }))
            .count();
        assert_eq!(again, 0, "shocked was consumed by the first reaction");
    }

    #[test]
    fn test_replace_reaction_substitutes_effect() {
        let mut fx = fixture();
        let frozen = fx
            .registry
            .register(StatusEffect::new("frozen").speed(0).reactive())
            .unwrap();
        fx.registry
            .set_affinity(fx.wet, fx.melting, Reaction::replace(0, frozen, 90));
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.wet, 100);
        set.apply(&fx.registry, fx.melting, 100);

        set.update(&fx.registry, 1);

        assert!(!set.has(fx.wet));
        assert!(!set.has(fx.melting));
        assert_eq!(set.remaining(frozen), Some(89));
    }

    #[test]
    fn test_modifiers_multiply() {
        let fx = fixture();
        let mut set = StatusSet::new();
        set.apply(&fx.registry, fx.wet, 100);
        set.apply(&fx.registry, fx.tarred, 100);

        let mods = set.modifiers(&fx.registry);
        let expected = Fixed::from_num(94) / Fixed::from_num(100)
            * (Fixed::from_num(60) / Fixed::from_num(100));
        assert_eq!(mods.speed, expected);
        assert!(!mods.disarmed);
    }

    #[test]
    fn test_huge_multipliers_saturate() {
        let mut registry = StatusRegistry::new();
        let frenzy = registry
            .register(StatusEffect::new("frenzy").damage_mult(u32::MAX))
            .unwrap();
        let rage = registry
            .register(StatusEffect::new("rage").damage_mult(u32::MAX))
            .unwrap();
        let mut set = StatusSet::new();
        set.apply(&registry, frenzy, 100);
        set.apply(&registry, rage, 100);

        assert_eq!(set.modifiers(&registry).damage, Fixed::MAX);
    }
}
