//! Resource-draining cloak.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityEventKind, AbilityKind, AbortReason, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Cloak;

/// Tuning of a cloak ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloakSpec {
    /// Ticks to fade in.
    pub fade_in: Ticks,
    /// Ticks to fade out.
    pub fade_out: Ticks,
    /// Ticks after fading out before cloaking again.
    pub cooldown: Ticks,
    /// Team resources required to start cloaking.
    pub min_resources: i32,
    /// Resources drained every `drain_interval` ticks while cloaked.
    pub drain: i32,
    /// Ticks between drains.
    pub drain_interval: Ticks,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl CloakSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.fade_in,
                active: None,
                transition_out: self.fade_out,
                // Counted from the end of the fade.
                cooldown: self.cooldown.saturating_add(self.fade_out),
                ..PhaseTimings::default()
            },
            statuses: self.statuses,
        }
    }
}

/// Cloak side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloakState {
    pub(crate) machine: Machine,
    pub(crate) drain_timer: Ticks,
}

impl CloakState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }
}

impl SideState for CloakState {}

/// Pay every drain that fell due. Returns false once one could not be paid.
fn drain<H: AbilityHost + ?Sized>(
    state: &mut CloakState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &CloakSpec,
    delta: Ticks,
) -> bool {
    if spec.drain_interval == 0 || spec.drain == 0 {
        return true;
    }
    let Some(team) = ctx.host.team(id) else {
        return false;
    };
    state.drain_timer = state.drain_timer.saturating_add(delta);
    while state.drain_timer >= spec.drain_interval {
        state.drain_timer -= spec.drain_interval;
        if !ctx.host.spend_resources(team, spec.drain) {
            return false;
        }
    }
    true
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<CloakState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &CloakSpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);

    if state.machine.phase() == Phase::Active && !drain(state, ctx, id, spec, delta) {
        tracing::debug!(%id, "cloak forced out, drain unaffordable");
        state.machine.exit(ctx, id, KIND, &phases);
        ctx.emit(
            id,
            KIND,
            AbilityEventKind::Aborted {
                reason: AbortReason::ResourcesDepleted,
            },
        );
    } else {
        state.machine.advance(ctx, id, KIND, &phases, delta);
    }
    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn cloak_machine(&self, id: EntityId) -> Machine {
        self.cloak.peek(id).map(|s| s.machine).unwrap_or_default()
    }

    /// Whether `id` may cloak: ready and the team holds `min_resources`.
    #[must_use]
    pub fn can_cloak<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        let Some(spec) = spec_of(host, id, |l| l.cloak.as_ref()) else {
            return false;
        };
        self.cloak_machine(id).is_ready()
            && host
                .team(id)
                .is_some_and(|team| host.resources(team) >= spec.min_resources)
    }

    /// Start fading in.
    pub fn command_cloak<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_cloak(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.cloak.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.cloak.get(id);
        state.drain_timer = 0;
        state
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::TransitioningIn);
        true
    }

    /// Whether `id` may drop its cloak.
    #[must_use]
    pub fn can_decloak<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        host.is_valid(id) && self.cloak_machine(id).phase() == Phase::Active
    }

    /// Start fading out.
    pub fn command_decloak<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_decloak(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.cloak.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        self.cloak
            .get(id)
            .machine
            .exit(&mut ctx, id, KIND, &spec.phases());
        true
    }

    /// Whether `id` is fully cloaked.
    #[must_use]
    pub fn is_cloak_active(&self, id: EntityId) -> bool {
        self.cloak_machine(id).phase() == Phase::Active
    }

    /// Fade progress.
    #[must_use]
    pub fn cloak_progress(&self, id: EntityId) -> Fixed {
        self.cloak_machine(id).progress()
    }
}
