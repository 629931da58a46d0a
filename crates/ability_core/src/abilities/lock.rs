//! Burrow and lock.
//!
//! A burrowed unit sits in `Pending`, scanning for a target nobody else has
//! reserved. Locking reserves the target and holds it for `lock_time` ticks;
//! at expiry the shot goes off, the reservation is dropped and the unit
//! settles back into the burrow under cooldown.

use serde::{Deserialize, Serialize};

use super::{spec_of, AbilityEventKind, AbilityKind, AbortReason, Abilities, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Lock;

/// Tuning of a burrow/lock ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSpec {
    /// Ticks to burrow.
    pub burrow_time: Ticks,
    /// Ticks to unburrow.
    pub unburrow_time: Ticks,
    /// Ticks a lock is held before it fires.
    pub lock_time: Ticks,
    /// Ticks after firing before the next lock.
    pub cooldown: Ticks,
    /// Lock range.
    pub range: Fixed,
    /// Damage dealt when the lock fires.
    pub damage: u32,
    /// Pick targets automatically while burrowed.
    pub auto_acquire: bool,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl LockSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.burrow_time,
                active: Some(self.lock_time),
                transition_out: self.unburrow_time,
                cooldown: self.cooldown,
                settle_pending: true,
                rearm: true,
            },
            statuses: self.statuses,
        }
    }
}

/// Burrow/lock side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub(crate) machine: Machine,
    pub(crate) target: Option<EntityId>,
}

impl LockState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Reserved target while locked.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }
}

impl SideState for LockState {
    fn reserved_target(&self) -> Option<EntityId> {
        self.target
    }
}

fn begin_lock<H: AbilityHost + ?Sized>(
    state: &mut LockState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &LockSpec,
    target: EntityId,
) {
    ctx.reservations.reserve(ctx.role, id, target);
    state.target = Some(target);
    let completed = state.machine.start(ctx, id, KIND, &spec.phases(), Phase::Active);
    finish(state, ctx, id, spec, &completed);
}

fn drop_target<H: AbilityHost + ?Sized>(state: &mut LockState, ctx: &mut Ctx<'_, H>, id: EntityId) {
    if let Some(target) = state.target.take() {
        ctx.reservations.release(ctx.role, id, target);
    }
}

fn finish<H: AbilityHost + ?Sized>(
    state: &mut LockState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &LockSpec,
    completed: &[Phase],
) {
    if !completed.contains(&Phase::Active) {
        return;
    }
    if let Some(target) = state.target {
        ctx.emit(
            id,
            KIND,
            AbilityEventKind::Fired {
                target,
                damage: spec.damage,
            },
        );
    }
    drop_target(state, ctx, id);
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<LockState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &LockSpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);

    if state.machine.phase() == Phase::Active {
        let reason = match state.target {
            Some(target) if !ctx.host.is_enemy(id, target) => Some(AbortReason::TargetLost),
            Some(target) if !ctx.host.within_range(id, target, spec.range) => {
                Some(AbortReason::OutOfRange)
            }
            Some(_) => None,
            None => Some(AbortReason::TargetLost),
        };
        if let Some(reason) = reason {
            drop_target(state, ctx, id);
            state.machine.abort(ctx, id, KIND, &phases, Phase::Pending);
            ctx.emit(id, KIND, AbilityEventKind::Aborted { reason });
        }
    }

    let completed = state.machine.advance(ctx, id, KIND, &phases, delta);
    finish(state, ctx, id, spec, &completed);

    if spec.auto_acquire
        && state.machine.phase() == Phase::Pending
        && state.machine.cooldown() == 0
    {
        if let (Some(team), Some(center)) = (ctx.host.team(id), ctx.host.position(id)) {
            let reservations = &*ctx.reservations;
            let found = ctx.host.closest_target(team, center, spec.range, &|target| {
                reservations.can_reserve(id, target)
            });
            if let Some(target) = found {
                tracing::trace!(%id, %target, "lock acquired");
                begin_lock(state, ctx, id, spec, target);
            }
        }
    }

    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn lock_state(&self, id: EntityId) -> LockState {
        self.lock.peek(id).copied().unwrap_or_default()
    }

    /// Whether `id` may start burrowing.
    #[must_use]
    pub fn can_burrow<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        spec_of(host, id, |l| l.lock.as_ref()).is_some() && self.lock_state(id).machine.is_ready()
    }

    /// Start burrowing.
    pub fn command_burrow<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_burrow(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.lock.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.lock.get(id);
        let completed = state
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::TransitioningIn);
        finish(state, &mut ctx, id, &spec, &completed);
        true
    }

    /// Whether `id` may leave its burrow.
    #[must_use]
    pub fn can_unburrow<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        host.is_valid(id)
            && matches!(
                self.lock_state(id).machine.phase(),
                Phase::Pending | Phase::Active
            )
    }

    /// Leave the burrow. An unfired lock is dropped.
    pub fn command_unburrow<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_unburrow(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.lock.as_ref()) else {
            return false;
        };
        let phases = spec.phases();
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.lock.get(id);
        drop_target(state, &mut ctx, id);
        if state.machine.phase() == Phase::Active {
            state.machine.exit(&mut ctx, id, KIND, &phases);
        } else {
            state
                .machine
                .start(&mut ctx, id, KIND, &phases, Phase::TransitioningOut);
        }
        true
    }

    /// Whether `id` may lock onto `target` now: burrowed, not cooling down,
    /// and the target is a hostile in range nobody else has reserved.
    #[must_use]
    pub fn can_lock<H: AbilityHost + ?Sized>(
        &self,
        host: &H,
        id: EntityId,
        target: EntityId,
    ) -> bool {
        let Some(spec) = spec_of(host, id, |l| l.lock.as_ref()) else {
            return false;
        };
        let machine = self.lock_state(id).machine;
        machine.phase() == Phase::Pending
            && machine.cooldown() == 0
            && host.is_enemy(id, target)
            && host.within_range(id, target, spec.range)
            && self.reservations.can_reserve(id, target)
    }

    /// Lock onto `target`.
    pub fn command_lock<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
        target: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_lock(host, id, target) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.lock.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.lock.get(id);
        begin_lock(state, &mut ctx, id, &spec, target);
        true
    }

    /// Whether `id` holds a lock.
    #[must_use]
    pub fn is_lock_active(&self, id: EntityId) -> bool {
        self.lock_state(id).machine.phase() == Phase::Active
    }

    /// Burrow or lock progress.
    #[must_use]
    pub fn lock_progress(&self, id: EntityId) -> Fixed {
        self.lock_state(id).machine.progress()
    }
}
