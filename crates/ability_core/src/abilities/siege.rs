//! Siege mode.
//!
//! Sieging takes a fixed number of ticks, after which the unit stays sieged
//! until told to unsiege. The idle status (`mobile`) is what movement and
//! targeting look at, so it is applied whenever the unit is back in `Idle`.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityKind, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Siege;

/// Tuning of a siege ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiegeSpec {
    /// Ticks to enter siege mode.
    pub siege_time: Ticks,
    /// Ticks to leave it.
    pub unsiege_time: Ticks,
    /// Ticks after unsieging before sieging again.
    pub cooldown: Ticks,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl SiegeSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.siege_time,
                active: None,
                transition_out: self.unsiege_time,
                cooldown: self.cooldown,
                ..PhaseTimings::default()
            },
            statuses: self.statuses,
        }
    }
}

/// Siege side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiegeState {
    pub(crate) machine: Machine,
}

impl SiegeState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }
}

impl SideState for SiegeState {}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<SiegeState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &SiegeSpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);
    state.machine.advance(ctx, id, KIND, &phases, delta);
    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn siege_machine(&self, id: EntityId) -> Machine {
        self.siege.peek(id).map(|s| s.machine).unwrap_or_default()
    }

    /// Whether `id` may enter siege mode.
    #[must_use]
    pub fn can_siege<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        spec_of(host, id, |l| l.siege.as_ref()).is_some() && self.siege_machine(id).is_ready()
    }

    /// Start sieging.
    pub fn command_siege<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_siege(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.siege.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        self.siege
            .get(id)
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::TransitioningIn);
        true
    }

    /// Whether `id` may leave siege mode.
    #[must_use]
    pub fn can_unsiege<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        host.is_valid(id) && self.siege_machine(id).phase() == Phase::Active
    }

    /// Start unsieging.
    pub fn command_unsiege<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_unsiege(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.siege.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        self.siege
            .get(id)
            .machine
            .exit(&mut ctx, id, KIND, &spec.phases());
        true
    }

    /// Whether `id` is fully sieged.
    #[must_use]
    pub fn is_siege_active(&self, id: EntityId) -> bool {
        self.siege_machine(id).phase() == Phase::Active
    }

    /// Siege transition progress.
    #[must_use]
    pub fn siege_progress(&self, id: EntityId) -> Fixed {
        self.siege_machine(id).progress()
    }
}
