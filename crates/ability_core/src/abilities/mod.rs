//! Ability state machines and their command/query surface.
//!
//! [`Abilities`] owns one [`SideStateStore`] per family plus the
//! [`TargetReservations`] table. The host simulation calls
//! [`Abilities::update`] once per tick and [`Abilities::on_entity_removed`]
//! when an entity dies; input and AI callers go through the `can_*`,
//! `command_*`, `is_*_active` and `*_progress` functions each family module
//! adds.
//!
//! Every mutating entry point takes a [`Role`]. Observers get `false` or an
//! empty event list and nothing changes.

mod charge;
mod cloak;
mod deploy;
mod lock;
mod mode;
mod siege;
mod turret;

pub use charge::{ChargeSpec, ChargeState};
pub use cloak::{CloakSpec, CloakState};
pub use deploy::{DeploySpec, DeployState};
pub use lock::{LockSpec, LockState};
pub use mode::{Mode, ModeSpec, ModeState};
pub use siege::{SiegeSpec, SiegeState};
pub use turret::{TurretSpec, TurretState};

use serde::{Deserialize, Serialize};

use crate::catalog::AbilityLoadout;
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::Phase;
use crate::math::Fixed;
use crate::reservation::TargetReservations;
use crate::store::SideStateStore;

/// Ability family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Burrow, then lock onto and fire at a reserved target.
    Lock,
    /// Siege mode: immobile with a stronger weapon.
    Siege,
    /// Fortify in place once stationary.
    Deploy,
    /// Toggle between two weapon or movement modes.
    Mode,
    /// Close in on a target and execute it.
    Charge,
    /// Resource-draining invisibility.
    Cloak,
    /// Assemble a separate turret entity.
    Turret,
}

impl AbilityKind {
    /// Every family, in update order.
    pub const ALL: [Self; 7] = [
        Self::Lock,
        Self::Siege,
        Self::Deploy,
        Self::Mode,
        Self::Charge,
        Self::Cloak,
        Self::Turret,
    ];
}

/// A request from input or AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityCommand {
    /// Start burrowing.
    Burrow,
    /// Leave the burrow, dropping any lock.
    Unburrow,
    /// Lock onto a target while burrowed.
    Lock(EntityId),
    /// Enter siege mode.
    Siege,
    /// Leave siege mode.
    Unsiege,
    /// Deploy once stationary.
    Deploy,
    /// Cancel a pending deploy or pack up.
    Undeploy,
    /// Switch to the other mode.
    SwitchMode,
    /// Charge at a target.
    Charge(EntityId),
    /// Start cloaking.
    Cloak,
    /// Drop the cloak.
    Decloak,
    /// Assemble a turret.
    DeployTurret,
    /// Pack the turret up.
    PackTurret,
}

impl AbilityCommand {
    /// Family the command belongs to.
    #[must_use]
    pub const fn kind(self) -> AbilityKind {
        match self {
            Self::Burrow | Self::Unburrow | Self::Lock(_) => AbilityKind::Lock,
            Self::Siege | Self::Unsiege => AbilityKind::Siege,
            Self::Deploy | Self::Undeploy => AbilityKind::Deploy,
            Self::SwitchMode => AbilityKind::Mode,
            Self::Charge(_) => AbilityKind::Charge,
            Self::Cloak | Self::Decloak => AbilityKind::Cloak,
            Self::DeployTurret | Self::PackTurret => AbilityKind::Turret,
        }
    }
}

/// Why an ability was forced out of its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The target died or stopped being hostile.
    TargetLost,
    /// The target left range or leash.
    OutOfRange,
    /// The team could not pay.
    Unaffordable,
    /// A running drain could not be paid.
    ResourcesDepleted,
    /// The host refused to spawn a deployable.
    SpawnFailed,
    /// A spawned deployable was destroyed.
    DeployableLost,
}

/// What happened to an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEventKind {
    /// The phase changed.
    PhaseChanged {
        /// Previous phase.
        from: Phase,
        /// New phase.
        to: Phase,
    },
    /// A lock or charge went off.
    Fired {
        /// Entity hit.
        target: EntityId,
        /// Damage to deal.
        damage: u32,
    },
    /// The ability was forced back.
    Aborted {
        /// Cause.
        reason: AbortReason,
    },
    /// A deployable entity was spawned.
    Spawned {
        /// The new entity.
        deployable: EntityId,
    },
    /// A deployable entity was removed.
    Despawned {
        /// The removed entity.
        deployable: EntityId,
    },
    /// A mode switch finished.
    ModeSwitched {
        /// Mode now in force.
        to: Mode,
    },
}

/// Notification emitted by an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityEvent {
    /// Entity the ability belongs to.
    pub entity: EntityId,
    /// Family.
    pub kind: AbilityKind,
    /// What happened.
    pub event: AbilityEventKind,
}

/// Read-only presentation hint for one ability of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCue {
    /// Family.
    pub kind: AbilityKind,
    /// Current phase.
    pub phase: Phase,
    /// Progress through the phase.
    pub progress: Fixed,
    /// Target or deployable the ability points at.
    pub target: Option<EntityId>,
}

/// Mutable context threaded through one ability operation.
pub struct Ctx<'a, H: ?Sized> {
    /// The entity host.
    pub host: &'a mut H,
    /// Shared reservation table.
    pub reservations: &'a mut TargetReservations,
    /// Event sink.
    pub events: &'a mut Vec<AbilityEvent>,
    /// Caller authority.
    pub role: Role,
}

impl<'a, H: AbilityHost + ?Sized> Ctx<'a, H> {
    /// Bundle the pieces of one operation.
    pub fn new(
        host: &'a mut H,
        reservations: &'a mut TargetReservations,
        events: &'a mut Vec<AbilityEvent>,
        role: Role,
    ) -> Self {
        Self {
            host,
            reservations,
            events,
            role,
        }
    }

    /// Record an event.
    pub fn emit(&mut self, entity: EntityId, kind: AbilityKind, event: AbilityEventKind) {
        self.events.push(AbilityEvent {
            entity,
            kind,
            event,
        });
    }
}

/// Family spec of a live entity, cloned out of its loadout.
fn spec_of<H, T>(host: &H, id: EntityId, pick: impl Fn(&AbilityLoadout) -> Option<&T>) -> Option<T>
where
    H: AbilityHost + ?Sized,
    T: Clone,
{
    if !host.is_valid(id) {
        return None;
    }
    host.loadout(id).and_then(pick).cloned()
}

/// Ability state of every entity in one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Abilities {
    pub(crate) lock: SideStateStore<LockState>,
    pub(crate) siege: SideStateStore<SiegeState>,
    pub(crate) deploy: SideStateStore<DeployState>,
    pub(crate) mode: SideStateStore<ModeState>,
    pub(crate) charge: SideStateStore<ChargeState>,
    pub(crate) cloak: SideStateStore<CloakState>,
    pub(crate) turret: SideStateStore<TurretState>,
    pub(crate) reservations: TargetReservations,
    pending: Vec<AbilityEvent>,
}

impl Abilities {
    /// Create an empty ability system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The reservation table.
    #[must_use]
    pub fn reservations(&self) -> &TargetReservations {
        &self.reservations
    }

    /// Advance every entity's abilities by `delta` ticks.
    ///
    /// Entities are visited in ascending id order and families in a fixed
    /// order, so reservation races resolve the same way everywhere. Events
    /// raised by commands since the last update come first.
    pub fn update<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        delta: Ticks,
    ) -> Vec<AbilityEvent> {
        if !role.can_mutate() {
            return Vec::new();
        }
        let mut events = std::mem::take(&mut self.pending);
        let Self {
            lock,
            siege,
            deploy,
            mode,
            charge,
            cloak,
            turret,
            reservations,
            ..
        } = self;
        let mut ctx = Ctx::new(host, reservations, &mut events, role);

        for id in ctx.host.sorted_ids() {
            if !ctx.host.is_valid(id) {
                continue;
            }
            let Some(loadout) = ctx.host.loadout(id).cloned() else {
                continue;
            };
            if let Some(spec) = &loadout.lock {
                lock::update(lock, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.siege {
                siege::update(siege, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.deploy {
                deploy::update(deploy, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.mode {
                mode::update(mode, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.charge {
                charge::update(charge, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.cloak {
                cloak::update(cloak, &mut ctx, id, spec, delta);
            }
            if let Some(spec) = &loadout.turret {
                turret::update(turret, &mut ctx, id, spec, delta);
            }
        }
        events
    }

    /// Tear down everything held for `id`. Call once when it is removed.
    ///
    /// Side state is destroyed, reservations on or by `id` are released and
    /// an assembled turret is despawned.
    pub fn on_entity_removed<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) {
        if !role.can_mutate() {
            return;
        }
        if let Some(state) = self.turret.peek(id) {
            if let Some(deployable) = state.turret {
                if host.is_valid(deployable) {
                    host.remove_deployable(deployable);
                }
            }
        }

        let reservations = &mut self.reservations;
        let mut cleared = 0;
        cleared += usize::from(self.lock.clear(role, id, reservations));
        cleared += usize::from(self.siege.clear(role, id, reservations));
        cleared += usize::from(self.deploy.clear(role, id, reservations));
        cleared += usize::from(self.mode.clear(role, id, reservations));
        cleared += usize::from(self.charge.clear(role, id, reservations));
        cleared += usize::from(self.cloak.clear(role, id, reservations));
        cleared += usize::from(self.turret.clear(role, id, reservations));
        let released = reservations.release_all_for(role, id);
        tracing::debug!(%id, cleared, released, "ability state torn down");
    }

    /// Whether `command` would be accepted right now.
    #[must_use]
    pub fn can<H: AbilityHost + ?Sized>(
        &self,
        host: &H,
        id: EntityId,
        command: AbilityCommand,
    ) -> bool {
        match command {
            AbilityCommand::Burrow => self.can_burrow(host, id),
            AbilityCommand::Unburrow => self.can_unburrow(host, id),
            AbilityCommand::Lock(target) => self.can_lock(host, id, target),
            AbilityCommand::Siege => self.can_siege(host, id),
            AbilityCommand::Unsiege => self.can_unsiege(host, id),
            AbilityCommand::Deploy => self.can_deploy(host, id),
            AbilityCommand::Undeploy => self.can_undeploy(host, id),
            AbilityCommand::SwitchMode => self.can_switch_mode(host, id),
            AbilityCommand::Charge(target) => self.can_charge(host, id, target),
            AbilityCommand::Cloak => self.can_cloak(host, id),
            AbilityCommand::Decloak => self.can_decloak(host, id),
            AbilityCommand::DeployTurret => self.can_deploy_turret(host, id),
            AbilityCommand::PackTurret => self.can_pack_turret(host, id),
        }
    }

    /// Issue `command`. Returns whether it was accepted.
    pub fn command<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
        command: AbilityCommand,
    ) -> bool {
        let accepted = match command {
            AbilityCommand::Burrow => self.command_burrow(host, role, id),
            AbilityCommand::Unburrow => self.command_unburrow(host, role, id),
            AbilityCommand::Lock(target) => self.command_lock(host, role, id, target),
            AbilityCommand::Siege => self.command_siege(host, role, id),
            AbilityCommand::Unsiege => self.command_unsiege(host, role, id),
            AbilityCommand::Deploy => self.command_deploy(host, role, id),
            AbilityCommand::Undeploy => self.command_undeploy(host, role, id),
            AbilityCommand::SwitchMode => self.command_switch_mode(host, role, id),
            AbilityCommand::Charge(target) => self.command_charge(host, role, id, target),
            AbilityCommand::Cloak => self.command_cloak(host, role, id),
            AbilityCommand::Decloak => self.command_decloak(host, role, id),
            AbilityCommand::DeployTurret => self.command_deploy_turret(host, role, id),
            AbilityCommand::PackTurret => self.command_pack_turret(host, role, id),
        };
        if !accepted {
            tracing::trace!(%id, ?command, ?role, "command refused");
        }
        accepted
    }

    /// Whether the family's effect is in force.
    #[must_use]
    pub fn is_active(&self, id: EntityId, kind: AbilityKind) -> bool {
        match kind {
            AbilityKind::Lock => self.is_lock_active(id),
            AbilityKind::Siege => self.is_siege_active(id),
            AbilityKind::Deploy => self.is_deploy_active(id),
            AbilityKind::Mode => self.is_mode_active(id),
            AbilityKind::Charge => self.is_charge_active(id),
            AbilityKind::Cloak => self.is_cloak_active(id),
            AbilityKind::Turret => self.is_turret_active(id),
        }
    }

    /// Progress through the family's current phase, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, id: EntityId, kind: AbilityKind) -> Fixed {
        match kind {
            AbilityKind::Lock => self.lock_progress(id),
            AbilityKind::Siege => self.siege_progress(id),
            AbilityKind::Deploy => self.deploy_progress(id),
            AbilityKind::Mode => self.mode_progress(id),
            AbilityKind::Charge => self.charge_progress(id),
            AbilityKind::Cloak => self.cloak_progress(id),
            AbilityKind::Turret => self.turret_progress(id),
        }
    }

    /// Current phase, or `None` if the entity never had this family's state.
    #[must_use]
    pub fn phase(&self, id: EntityId, kind: AbilityKind) -> Option<Phase> {
        match kind {
            AbilityKind::Lock => self.lock.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Siege => self.siege.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Deploy => self.deploy.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Mode => self.mode.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Charge => self.charge.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Cloak => self.cloak.peek(id).map(|s| s.machine.phase()),
            AbilityKind::Turret => self.turret.peek(id).map(|s| s.machine.phase()),
        }
    }

    /// Presentation hints for every family `id` has state in.
    ///
    /// Never creates or changes state.
    #[must_use]
    pub fn draw_cues(&self, id: EntityId) -> Vec<DrawCue> {
        let mut cues = Vec::new();
        let mut push = |kind, machine: &crate::machine::Machine, target| {
            cues.push(DrawCue {
                kind,
                phase: machine.phase(),
                progress: machine.progress(),
                target,
            });
        };
        if let Some(s) = self.lock.peek(id) {
            push(AbilityKind::Lock, &s.machine, s.target);
        }
        if let Some(s) = self.siege.peek(id) {
            push(AbilityKind::Siege, &s.machine, None);
        }
        if let Some(s) = self.deploy.peek(id) {
            push(AbilityKind::Deploy, &s.machine, None);
        }
        if let Some(s) = self.mode.peek(id) {
            push(AbilityKind::Mode, &s.machine, None);
        }
        if let Some(s) = self.charge.peek(id) {
            push(AbilityKind::Charge, &s.machine, s.target);
        }
        if let Some(s) = self.cloak.peek(id) {
            push(AbilityKind::Cloak, &s.machine, None);
        }
        if let Some(s) = self.turret.peek(id) {
            push(AbilityKind::Turret, &s.machine, s.turret);
        }
        cues
    }
}
