//! Reference host simulation.
//!
//! The simulation advances in whole ticks and drives status effects and
//! abilities for a flat set of units deterministically. It is the reference
//! implementation of [`AbilityHost`] and what the integration tests, tools
//! and benchmarks run against.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - Consistent iteration order (sorted entity IDs, `BTreeMap` storage)
//! - Same inputs always produce same outputs
//!
//! # Example
//!
//! ```
//! use ability_core::abilities::AbilityCommand;
//! use ability_core::components::TeamId;
//! use ability_core::content;
//! use ability_core::facade::AbilityFacade;
//! use ability_core::math::Vec2Fixed;
//! use ability_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(content::builtin().unwrap());
//! let bastion = sim.spawn_unit("bastion", TeamId(1), Vec2Fixed::ZERO).unwrap();
//!
//! assert!(sim.command(bastion, AbilityCommand::Siege));
//! sim.tick();
//! assert_eq!(sim.get_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::abilities::{Abilities, AbilityEvent, AbilityEventKind};
use crate::catalog::{AbilityLoadout, Content, UnitTypeId};
use crate::components::{EntityId, Role, TeamId, Ticks};
use crate::error::{AbilityError, Result};
use crate::host::AbilityHost;
use crate::math::{Fixed, Vec2Fixed};
use crate::status::{StatModifiers, StatusEvent, StatusId, StatusSet};

/// A unit in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Unit type.
    pub kind: UnitTypeId,
    /// Allegiance.
    pub team: TeamId,
    /// World position.
    pub position: Vec2Fixed,
    /// Requested heading. Scaled by unit speed and status modifiers each tick.
    pub velocity: Vec2Fixed,
    /// Current health.
    pub health: u32,
    /// Applied status effects.
    pub statuses: StatusSet,
    /// Entity that deployed this one, for turrets.
    pub owner: Option<EntityId>,
}

/// Storage for all entities in the simulation.
///
/// A `BTreeMap` keeps both lookup and iteration order deterministic, so
/// snapshots of identical worlds are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStorage {
    /// Map of entity ID to entity data.
    entities: BTreeMap<EntityId, Entity>,
    /// Next entity ID to assign.
    next_id: i64,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its ID.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterate over all entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

/// Per-team economy and research.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamState {
    /// Spendable resources.
    pub resources: i32,
    /// Researched techs.
    pub techs: BTreeSet<String>,
}

/// Damage dealt during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    /// Entity that dealt it, if any.
    pub source: Option<EntityId>,
    /// Entity that took it.
    pub target: EntityId,
    /// Amount after modifiers.
    pub amount: u32,
}

/// Events generated during a simulation tick.
///
/// These events can be used by the presentation layer to trigger effects,
/// sounds, animations, etc.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Status bookkeeping, per entity. Includes effects changed by commands
    /// and removals since the previous tick.
    pub status_events: Vec<(EntityId, StatusEvent)>,
    /// Ability notifications.
    pub ability_events: Vec<AbilityEvent>,
    /// Damage dealt.
    pub damage_events: Vec<DamageEvent>,
    /// Entities removed this tick, dead or despawned.
    pub removed: Vec<EntityId>,
}

/// Entities, teams and content: everything abilities see through
/// [`AbilityHost`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    entities: EntityStorage,
    teams: BTreeMap<TeamId, TeamState>,
    removal_queue: Vec<EntityId>,
    #[serde(skip)]
    content: Arc<Content>,
    #[serde(skip)]
    status_log: Vec<(EntityId, StatusEvent)>,
}

impl World {
    /// Create an empty world running on `content`.
    #[must_use]
    pub fn new(content: Arc<Content>) -> Self {
        Self {
            entities: EntityStorage::new(),
            content,
            ..Self::default()
        }
    }

    /// Content the world runs on.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Entity storage.
    #[must_use]
    pub fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// State of a team.
    #[must_use]
    pub fn team_state(&self, team: TeamId) -> Option<&TeamState> {
        self.teams.get(&team)
    }

    /// Combined status multipliers of an entity.
    #[must_use]
    pub fn modifiers(&self, id: EntityId) -> StatModifiers {
        self.entities
            .get(id)
            .map(|e| e.statuses.modifiers(&self.content.statuses))
            .unwrap_or_default()
    }

    /// Distance `id` moves this tick.
    #[must_use]
    pub fn step(&self, id: EntityId) -> Vec2Fixed {
        let Some(entity) = self.entities.get(id) else {
            return Vec2Fixed::ZERO;
        };
        let base = self
            .content
            .units
            .get(entity.kind)
            .map_or(Fixed::ZERO, |u| u.speed);
        entity.velocity.scale(base.saturating_mul(self.modifiers(id).speed))
    }

    fn spawn(
        &mut self,
        kind: UnitTypeId,
        team: TeamId,
        position: Vec2Fixed,
        owner: Option<EntityId>,
    ) -> Result<EntityId> {
        let unit = self
            .content
            .units
            .get(kind)
            .ok_or_else(|| AbilityError::InvalidState(format!("unit type {kind:?} missing")))?;
        let health = unit.health;
        Ok(self.entities.insert(Entity {
            id: EntityId::NONE,
            kind,
            team,
            position,
            velocity: Vec2Fixed::ZERO,
            health,
            statuses: StatusSet::new(),
            owner,
        }))
    }

    fn queue_removal(&mut self, id: EntityId) {
        if self.entities.contains(id) && !self.removal_queue.contains(&id) {
            self.removal_queue.push(id);
        }
    }

    fn take_damage(&mut self, id: EntityId, amount: u32) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.health = entity.health.saturating_sub(amount);
            if entity.health == 0 {
                self.queue_removal(id);
            }
        }
    }
}

impl AbilityHost for World {
    fn sorted_ids(&self) -> Vec<EntityId> {
        self.entities.sorted_ids()
    }

    fn is_valid(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| e.health > 0)
    }

    fn position(&self, id: EntityId) -> Option<Vec2Fixed> {
        self.entities.get(id).map(|e| e.position)
    }

    fn team(&self, id: EntityId) -> Option<TeamId> {
        self.entities.get(id).map(|e| e.team)
    }

    fn hit_radius(&self, id: EntityId) -> Fixed {
        self.entities
            .get(id)
            .and_then(|e| self.content.units.get(e.kind))
            .map_or(Fixed::ZERO, |u| u.hit_radius)
    }

    fn is_stationary(&self, id: EntityId) -> bool {
        self.entities.contains(id) && self.step(id).is_zero()
    }

    fn apply_status(&mut self, id: EntityId, status: StatusId, duration: Ticks) {
        if let Some(entity) = self.entities.get_mut(id) {
            let events = entity.statuses.apply(&self.content.statuses, status, duration);
            self.status_log.extend(events.into_iter().map(|e| (id, e)));
        }
    }

    fn unapply_status(&mut self, id: EntityId, status: StatusId) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.statuses.unapply(status);
        }
    }

    fn has_status(&self, id: EntityId, status: StatusId) -> bool {
        self.entities.get(id).is_some_and(|e| e.statuses.has(status))
    }

    fn status_remaining(&self, id: EntityId, status: StatusId) -> Option<Ticks> {
        self.entities.get(id).and_then(|e| e.statuses.remaining(status))
    }

    fn closest_target(
        &self,
        team: TeamId,
        center: Vec2Fixed,
        radius: Fixed,
        filter: &dyn Fn(EntityId) -> bool,
    ) -> Option<EntityId> {
        let mut best: Option<(Fixed, EntityId)> = None;
        for entity in self.entities.iter() {
            if entity.health == 0 || !team.is_enemy_of(entity.team) {
                continue;
            }
            if !center.within(entity.position, radius + self.hit_radius(entity.id)) {
                continue;
            }
            if !filter(entity.id) {
                continue;
            }
            let distance = center.distance_squared(entity.position);
            // Ascending iteration: strict comparison keeps the lower id on ties.
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, entity.id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn resources(&self, team: TeamId) -> i32 {
        self.teams.get(&team).map_or(0, |t| t.resources)
    }

    fn spend_resources(&mut self, team: TeamId, amount: i32) -> bool {
        if amount <= 0 {
            return true;
        }
        match self.teams.get_mut(&team) {
            Some(state) if state.resources >= amount => {
                state.resources -= amount;
                true
            }
            _ => false,
        }
    }

    fn tech_unlocked(&self, team: TeamId, tech: &str) -> bool {
        self.teams.get(&team).is_some_and(|t| t.techs.contains(tech))
    }

    fn spawn_deployable(&mut self, owner: EntityId, kind: &str, at: Vec2Fixed) -> Option<EntityId> {
        let team = self.entities.get(owner)?.team;
        let kind = self.content.units.id(kind)?;
        self.spawn(kind, team, at, Some(owner)).ok()
    }

    fn remove_deployable(&mut self, id: EntityId) {
        self.queue_removal(id);
    }

    fn loadout(&self, id: EntityId) -> Option<&AbilityLoadout> {
        let kind = self.entities.get(id)?.kind;
        self.content.units.get(kind).map(|u| &u.loadout)
    }
}

/// The ability simulation.
///
/// Owns the world and the ability system and advances both in a fixed
/// order each tick:
///
/// 1. **Statuses** - reactions, periodic damage, expiry
/// 2. **Abilities** - every entity's state machines, ascending id
/// 3. **Movement** - velocity scaled by unit speed and the speed modifier
/// 4. **Removal** - dead and despawned entities, with ability teardown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Current simulation tick.
    tick: u64,
    /// Authority of this replica.
    role: Role,
    /// Entities and teams.
    world: World,
    /// Ability state.
    abilities: Abilities,
}

impl Simulation {
    /// Create an authoritative simulation.
    #[must_use]
    pub fn new(content: Content) -> Self {
        Self::with_role(Arc::new(content), Role::Authoritative)
    }

    /// Create a simulation sharing `content`, with the given authority.
    #[must_use]
    pub fn with_role(content: Arc<Content>, role: Role) -> Self {
        Self {
            tick: 0,
            role,
            world: World::new(content),
            abilities: Abilities::new(),
        }
    }

    /// Get the current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Authority of this replica.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Shared handle to the content, for building sibling replicas.
    #[must_use]
    pub fn shared_content(&self) -> Arc<Content> {
        Arc::clone(&self.world.content)
    }

    /// The ability system.
    #[must_use]
    pub fn abilities(&self) -> &Abilities {
        &self.abilities
    }

    /// Split borrow used by the command façade.
    pub(crate) fn parts_mut(&mut self) -> (&mut World, &mut Abilities, Role) {
        (&mut self.world, &mut self.abilities, self.role)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.entity(id)
    }

    /// Spawn a unit of the named type.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::UnknownUnitType`] for unknown names.
    pub fn spawn_unit(&mut self, kind: &str, team: TeamId, position: Vec2Fixed) -> Result<EntityId> {
        let kind = self
            .world
            .content
            .units
            .id(kind)
            .ok_or_else(|| AbilityError::UnknownUnitType(kind.to_string()))?;
        self.world.spawn(kind, team, position, None)
    }

    /// Remove an entity immediately, tearing down its ability state.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::EntityNotFound`] if the entity doesn't exist.
    pub fn despawn(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        if !self.world.entities.contains(id) {
            return Err(AbilityError::EntityNotFound(id));
        }
        self.world.queue_removal(id);
        Ok(self.process_removals())
    }

    /// Set the requested movement of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::EntityNotFound`] if the entity doesn't exist.
    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2Fixed) -> Result<()> {
        let entity = self
            .world
            .entities
            .get_mut(id)
            .ok_or(AbilityError::EntityNotFound(id))?;
        entity.velocity = velocity;
        Ok(())
    }

    /// Add resources to a team.
    pub fn grant_resources(&mut self, team: TeamId, amount: i32) {
        let state = self.world.teams.entry(team).or_default();
        state.resources = state.resources.saturating_add(amount);
    }

    /// Mark a tech researched for a team.
    pub fn unlock_tech(&mut self, team: TeamId, tech: &str) {
        self.world
            .teams
            .entry(team)
            .or_default()
            .techs
            .insert(tech.to_string());
    }

    /// Apply a status effect by name, as a weapon or spell would.
    ///
    /// # Errors
    ///
    /// Fails for unknown entities or status names, and for reactive
    /// statuses, which only reactions may produce.
    pub fn apply_status(&mut self, id: EntityId, status: &str, duration: Ticks) -> Result<()> {
        if !self.world.entities.contains(id) {
            return Err(AbilityError::EntityNotFound(id));
        }
        let effect = self.world.content.status(status)?;
        if self
            .world
            .content
            .statuses
            .get(effect)
            .is_some_and(|e| e.reactive)
        {
            return Err(AbilityError::InvalidState(format!(
                "status '{status}' is reactive"
            )));
        }
        self.world.apply_status(id, effect, duration);
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// Returns events generated during this tick for the presentation layer.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        let ids = self.world.entities.sorted_ids();

        // 1. Statuses
        for &id in &ids {
            let Some(entity) = self.world.entities.get_mut(id) else {
                continue;
            };
            let status_events = entity.statuses.update(&self.world.content.statuses, 1);
            for event in status_events {
                let amount = match event {
                    StatusEvent::PeriodicDamage { amount, .. } => amount,
                    StatusEvent::Reaction { pierce_damage, .. } => pierce_damage,
                    _ => 0,
                };
                if amount > 0 {
                    self.world.take_damage(id, amount);
                    events.damage_events.push(DamageEvent {
                        source: None,
                        target: id,
                        amount,
                    });
                }
                events.status_events.push((id, event));
            }
        }

        // 2. Abilities
        let ability_events = self.abilities.update(&mut self.world, self.role, 1);
        for event in &ability_events {
            if let AbilityEventKind::Fired { target, damage } = event.event {
                let multiplier = self.world.modifiers(event.entity).damage;
                let amount = Fixed::saturating_from_num(damage)
                    .saturating_mul(multiplier)
                    .to_num::<u32>();
                self.world.take_damage(target, amount);
                events.damage_events.push(DamageEvent {
                    source: Some(event.entity),
                    target,
                    amount,
                });
            }
        }
        events.ability_events = ability_events;

        // 3. Movement
        for &id in &ids {
            let step = self.world.step(id);
            if let Some(entity) = self.world.entities.get_mut(id) {
                entity.position = entity.position + step;
            }
        }

        // 4. Removal
        events.removed = self.process_removals();
        events
            .status_events
            .extend(std::mem::take(&mut self.world.status_log));

        self.tick += 1;
        events
    }

    fn process_removals(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();
        while !self.world.removal_queue.is_empty() {
            let mut batch = std::mem::take(&mut self.world.removal_queue);
            batch.sort_unstable();
            batch.dedup();
            for id in batch {
                if self.world.entities.remove(id).is_none() {
                    continue;
                }
                self.abilities
                    .on_entity_removed(&mut self.world, self.role, id);
                removed.push(id);
            }
        }
        removed
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Used for desync detection. Two simulations with identical state will
    /// produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);

        let ids = self.world.entities.sorted_ids();
        ids.len().hash(&mut hasher);
        for entity in self.world.entities.iter() {
            entity.id.hash(&mut hasher);
            entity.kind.hash(&mut hasher);
            entity.team.hash(&mut hasher);
            entity.position.x.to_bits().hash(&mut hasher);
            entity.position.y.to_bits().hash(&mut hasher);
            entity.velocity.x.to_bits().hash(&mut hasher);
            entity.velocity.y.to_bits().hash(&mut hasher);
            entity.health.hash(&mut hasher);
            entity.owner.hash(&mut hasher);
            for status in entity.statuses.iter() {
                status.effect.hash(&mut hasher);
                status.remaining.hash(&mut hasher);
                status.age.hash(&mut hasher);
            }
        }

        for (team, state) in &self.world.teams {
            team.hash(&mut hasher);
            state.resources.hash(&mut hasher);
            state.techs.hash(&mut hasher);
        }

        // Ability stores are BTreeMaps, so their encoding is canonical.
        if let Ok(bytes) = bincode::serialize(&self.abilities) {
            bytes.hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the simulation state for replay or network sync.
    ///
    /// Content is not part of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| AbilityError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes, re-attaching `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8], content: Arc<Content>) -> Result<Self> {
        let mut sim: Self = bincode::deserialize(data).map_err(|e| {
            AbilityError::InvalidState(format!("Failed to deserialize simulation: {e}"))
        })?;
        sim.world.content = content;
        Ok(sim)
    }
}
