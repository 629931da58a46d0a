//! Deploy into a fortified defensive posture.
//!
//! A deploy request waits in `Pending` until the unit stops moving. The cost
//! is paid when deployment actually begins, not when it is requested.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityEventKind, AbilityKind, AbortReason, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings};
use crate::math::Fixed;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Deploy;

/// Tuning of a deploy ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySpec {
    /// Ticks to deploy.
    pub deploy_time: Ticks,
    /// Ticks to undeploy.
    pub undeploy_time: Ticks,
    /// Team resources paid when deployment begins.
    pub cost: i32,
    /// Tech the team must have researched.
    pub requires_tech: Option<String>,
    /// Ticks after undeploying before deploying again.
    pub cooldown: Ticks,
    /// Phase statuses.
    pub statuses: PhaseStatuses,
}

impl DeploySpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.deploy_time,
                active: None,
                transition_out: self.undeploy_time,
                cooldown: self.cooldown,
                ..PhaseTimings::default()
            },
            statuses: self.statuses,
        }
    }
}

/// Deploy side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployState {
    pub(crate) machine: Machine,
}

impl DeployState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }
}

impl SideState for DeployState {}

fn affordable<H: AbilityHost + ?Sized>(host: &H, id: EntityId, spec: &DeploySpec) -> bool {
    let Some(team) = host.team(id) else {
        return false;
    };
    let tech = spec
        .requires_tech
        .as_deref()
        .map_or(true, |tech| host.tech_unlocked(team, tech));
    tech && host.resources(team) >= spec.cost
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<DeployState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &DeploySpec,
    delta: Ticks,
) {
    let phases = spec.phases();
    let state = store.get(id);

    if state.machine.phase() == Phase::Pending && ctx.host.is_stationary(id) {
        let paid = ctx
            .host
            .team(id)
            .is_some_and(|team| ctx.host.spend_resources(team, spec.cost));
        if paid {
            state
                .machine
                .start(ctx, id, KIND, &phases, Phase::TransitioningIn);
        } else {
            state.machine.abort(ctx, id, KIND, &phases, Phase::Idle);
            ctx.emit(
                id,
                KIND,
                AbilityEventKind::Aborted {
                    reason: AbortReason::Unaffordable,
                },
            );
        }
        // The transition starts counting next tick.
        state.machine.ensure_status(ctx, id, &phases);
        return;
    }

    state.machine.advance(ctx, id, KIND, &phases, delta);
    state.machine.ensure_status(ctx, id, &phases);
}

impl Abilities {
    fn deploy_machine(&self, id: EntityId) -> Machine {
        self.deploy.peek(id).map(|s| s.machine).unwrap_or_default()
    }

    /// Whether `id` may request deployment: ready, tech researched and the
    /// cost affordable right now.
    #[must_use]
    pub fn can_deploy<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        let Some(spec) = spec_of(host, id, |l| l.deploy.as_ref()) else {
            return false;
        };
        self.deploy_machine(id).is_ready() && affordable(host, id, &spec)
    }

    /// Request deployment. It begins once the unit is stationary.
    pub fn command_deploy<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_deploy(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.deploy.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        self.deploy
            .get(id)
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::Pending);
        true
    }

    /// Whether `id` has a pending or completed deployment to undo.
    #[must_use]
    pub fn can_undeploy<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        host.is_valid(id)
            && matches!(
                self.deploy_machine(id).phase(),
                Phase::Pending | Phase::Active
            )
    }

    /// Cancel a pending deployment, or pack up a completed one.
    pub fn command_undeploy<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_undeploy(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.deploy.as_ref()) else {
            return false;
        };
        let phases = spec.phases();
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let machine = &mut self.deploy.get(id).machine;
        if machine.phase() == Phase::Pending {
            machine.start(&mut ctx, id, KIND, &phases, Phase::Idle);
        } else {
            machine.exit(&mut ctx, id, KIND, &phases);
        }
        true
    }

    /// Whether `id` is fortified.
    #[must_use]
    pub fn is_deploy_active(&self, id: EntityId) -> bool {
        self.deploy_machine(id).phase() == Phase::Active
    }

    /// Deploy transition progress.
    #[must_use]
    pub fn deploy_progress(&self, id: EntityId) -> Fixed {
        self.deploy_machine(id).progress()
    }
}
