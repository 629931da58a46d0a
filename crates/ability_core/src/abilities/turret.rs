//! Turret deployment.
//!
//! Assembly ends by asking the host to spawn a separate turret entity. The
//! turret is re-validated every tick while active; losing it forces the
//! owner to pack up. Packing removes the turret when it completes.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityEventKind, AbilityKind, AbortReason, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Turret;

/// Tuning of a turret-deploy ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurretSpec {
    /// Unit type name of the spawned turret.
    pub turret: String,
    /// Ticks to assemble.
    pub assemble_time: Ticks,
    /// Ticks to pack up.
    pub pack_time: Ticks,
    /// Ticks after packing before assembling again.
    pub cooldown: Ticks,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl TurretSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.assemble_time,
                active: None,
                transition_out: self.pack_time,
                cooldown: self.cooldown,
                ..PhaseTimings::default()
            },
            statuses: self.statuses,
        }
    }
}

/// Turret side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretState {
    pub(crate) machine: Machine,
    pub(crate) turret: Option<EntityId>,
}

impl TurretState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// The spawned turret, if any.
    #[must_use]
    pub const fn turret(&self) -> Option<EntityId> {
        self.turret
    }
}

impl SideState for TurretState {}

fn finish<H: AbilityHost + ?Sized>(
    state: &mut TurretState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &TurretSpec,
    completed: &[Phase],
) {
    if completed.contains(&Phase::TransitioningIn) {
        let spawned = ctx
            .host
            .position(id)
            .and_then(|at| ctx.host.spawn_deployable(id, &spec.turret, at));
        match spawned {
            Some(deployable) => {
                state.turret = Some(deployable);
                ctx.emit(id, KIND, AbilityEventKind::Spawned { deployable });
            }
            None => {
                state
                    .machine
                    .abort(ctx, id, KIND, &spec.phases(), Phase::Idle);
                ctx.emit(
                    id,
                    KIND,
                    AbilityEventKind::Aborted {
                        reason: AbortReason::SpawnFailed,
                    },
                );
            }
        }
    }
    if completed.contains(&Phase::TransitioningOut) {
        if let Some(deployable) = state.turret.take() {
            if ctx.host.is_valid(deployable) {
                ctx.host.remove_deployable(deployable);
            }
            ctx.emit(id, KIND, AbilityEventKind::Despawned { deployable });
        }
    }
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<TurretState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &TurretSpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);

    if state.machine.phase() == Phase::Active
        && !state.turret.is_some_and(|t| ctx.host.is_valid(t))
    {
        tracing::debug!(%id, turret = ?state.turret, "turret lost, packing up");
        state.turret = None;
        let completed = state.machine.exit(ctx, id, KIND, &phases);
        finish(state, ctx, id, spec, &completed);
        ctx.emit(
            id,
            KIND,
            AbilityEventKind::Aborted {
                reason: AbortReason::DeployableLost,
            },
        );
    } else {
        let completed = state.machine.advance(ctx, id, KIND, &phases, delta);
        finish(state, ctx, id, spec, &completed);
    }
    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn turret_state(&self, id: EntityId) -> TurretState {
        self.turret.peek(id).copied().unwrap_or_default()
    }

    /// Whether `id` may start assembling a turret.
    #[must_use]
    pub fn can_deploy_turret<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        spec_of(host, id, |l| l.turret.as_ref()).is_some()
            && self.turret_state(id).machine.is_ready()
    }

    /// Start assembling.
    pub fn command_deploy_turret<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_deploy_turret(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.turret.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.turret.get(id);
        let completed = state
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::TransitioningIn);
        finish(state, &mut ctx, id, &spec, &completed);
        true
    }

    /// Whether `id` has an assembled turret to pack.
    #[must_use]
    pub fn can_pack_turret<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        host.is_valid(id) && self.turret_state(id).machine.phase() == Phase::Active
    }

    /// Start packing up.
    pub fn command_pack_turret<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_pack_turret(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.turret.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.turret.get(id);
        let completed = state.machine.exit(&mut ctx, id, KIND, &spec.phases());
        finish(state, &mut ctx, id, &spec, &completed);
        true
    }

    /// Whether `id` has a turret up.
    #[must_use]
    pub fn is_turret_active(&self, id: EntityId) -> bool {
        self.turret_state(id).machine.phase() == Phase::Active
    }

    /// Assembly or packing progress.
    #[must_use]
    pub fn turret_progress(&self, id: EntityId) -> Fixed {
        self.turret_state(id).machine.progress()
    }
}
