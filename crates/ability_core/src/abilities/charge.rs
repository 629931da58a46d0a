//! Charge and execute.
//!
//! `Pending` is the approach: the target is re-checked every tick against
//! the leash, and the charge starts once it is within `range`. While
//! charging the unit is immobile and disarmed (via the phase status). The
//! hit lands once, at the end of the charge, and that is when the cost is
//! paid.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityEventKind, AbilityKind, AbortReason, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Charge;

/// Tuning of a charge ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSpec {
    /// Distance at which the charge begins.
    pub range: Fixed,
    /// Distance beyond which the approach is abandoned.
    pub leash: Fixed,
    /// Ticks the charge takes.
    pub charge_time: Ticks,
    /// Ticks after the hit before the next charge.
    pub cooldown: Ticks,
    /// Team resources paid when the hit lands.
    pub cost: i32,
    /// Damage of the hit.
    pub damage: u32,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl ChargeSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.charge_time,
                active: Some(0),
                transition_out: 0,
                cooldown: self.cooldown,
                ..PhaseTimings::default()
            },
            statuses: self.statuses,
        }
    }
}

/// Charge side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeState {
    pub(crate) machine: Machine,
    pub(crate) target: Option<EntityId>,
}

impl ChargeState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Charge target.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }
}

impl SideState for ChargeState {}

fn can_pay<H: AbilityHost + ?Sized>(host: &H, id: EntityId, cost: i32) -> bool {
    host.team(id).is_some_and(|team| host.resources(team) >= cost)
}

fn check<H: AbilityHost + ?Sized>(
    ctx: &Ctx<'_, H>,
    id: EntityId,
    spec: &ChargeSpec,
    target: Option<EntityId>,
) -> Option<AbortReason> {
    let Some(target) = target else {
        return Some(AbortReason::TargetLost);
    };
    if !ctx.host.is_enemy(id, target) {
        Some(AbortReason::TargetLost)
    } else if !ctx.host.within_range(id, target, spec.leash) {
        Some(AbortReason::OutOfRange)
    } else if !can_pay(&*ctx.host, id, spec.cost) {
        Some(AbortReason::Unaffordable)
    } else {
        None
    }
}

fn abort<H: AbilityHost + ?Sized>(
    state: &mut ChargeState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &ChargeSpec,
    reason: AbortReason,
) {
    state.target = None;
    state.machine.abort(ctx, id, KIND, &spec.phases(), Phase::Idle);
    ctx.emit(id, KIND, AbilityEventKind::Aborted { reason });
}

fn finish<H: AbilityHost + ?Sized>(
    state: &mut ChargeState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &ChargeSpec,
    completed: &[Phase],
) {
    if !completed.contains(&Phase::TransitioningIn) {
        return;
    }
    let Some(target) = state.target.take() else {
        return;
    };
    let paid = ctx
        .host
        .team(id)
        .is_some_and(|team| ctx.host.spend_resources(team, spec.cost));
    if paid {
        ctx.emit(
            id,
            KIND,
            AbilityEventKind::Fired {
                target,
                damage: spec.damage,
            },
        );
    } else {
        tracing::debug!(%id, %target, "charge landed without funds");
        ctx.emit(
            id,
            KIND,
            AbilityEventKind::Aborted {
                reason: AbortReason::Unaffordable,
            },
        );
    }
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<ChargeState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &ChargeSpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);

    match state.machine.phase() {
        Phase::Pending => {
            if let Some(reason) = check(ctx, id, spec, state.target) {
                abort(state, ctx, id, spec, reason);
            } else if state
                .target
                .is_some_and(|target| ctx.host.within_range(id, target, spec.range))
            {
                let completed = state
                    .machine
                    .start(ctx, id, KIND, &phases, Phase::TransitioningIn);
                finish(state, ctx, id, spec, &completed);
            }
        }
        Phase::TransitioningIn => {
            if let Some(reason) = check(ctx, id, spec, state.target) {
                abort(state, ctx, id, spec, reason);
            } else {
                let completed = state.machine.advance(ctx, id, KIND, &phases, delta);
                finish(state, ctx, id, spec, &completed);
            }
        }
        _ => {
            state.machine.advance(ctx, id, KIND, &phases, delta);
        }
    }
    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn charge_state(&self, id: EntityId) -> ChargeState {
        self.charge.peek(id).copied().unwrap_or_default()
    }

    /// Whether `id` may charge `target`: ready, affordable, and the target a
    /// hostile within leash.
    #[must_use]
    pub fn can_charge<H: AbilityHost + ?Sized>(
        &self,
        host: &H,
        id: EntityId,
        target: EntityId,
    ) -> bool {
        let Some(spec) = spec_of(host, id, |l| l.charge.as_ref()) else {
            return false;
        };
        self.charge_state(id).machine.is_ready()
            && host.is_enemy(id, target)
            && host.within_range(id, target, spec.leash)
            && can_pay(host, id, spec.cost)
    }

    /// Start approaching `target`.
    pub fn command_charge<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
        target: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_charge(host, id, target) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.charge.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.charge.get(id);
        state.target = Some(target);
        state
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::Pending);
        true
    }

    /// Whether `id` is approaching or charging.
    #[must_use]
    pub fn is_charge_active(&self, id: EntityId) -> bool {
        matches!(
            self.charge_state(id).machine.phase(),
            Phase::Pending | Phase::TransitioningIn
        )
    }

    /// Charge progress.
    #[must_use]
    pub fn charge_progress(&self, id: EntityId) -> Fixed {
        self.charge_state(id).machine.progress()
    }
}
