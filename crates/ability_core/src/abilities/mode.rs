//! Two-mode toggle.
//!
//! The only timed phase is the switch itself. When it finishes the unit is
//! back in `Idle`, in the other mode, under cooldown. Each mode is shown by
//! a permanent status so weapon and movement code can read it.

use serde::{Deserialize, Serialize};

use super::{spec_of, Abilities, AbilityEventKind, AbilityKind, Ctx};
use crate::components::{EntityId, Role, Ticks};
use crate::host::AbilityHost;
use crate::machine::{Machine, Phase, PhaseSpec, PhaseStatuses, PhaseTimings, UNBOUNDED};
use crate::math::Fixed;
use crate::status::StatusId;
use crate::store::{SideState, SideStateStore};

const KIND: AbilityKind = AbilityKind::Mode;

/// Which of the two modes is in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// The mode units spawn in.
    #[default]
    Primary,
    /// The alternate mode.
    Secondary,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Tuning of a mode switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    /// Status shown in the primary mode.
    pub primary: StatusId,
    /// Status shown in the secondary mode.
    pub secondary: StatusId,
    /// Ticks a switch takes.
    pub switch_time: Ticks,
    /// Ticks after a switch before the next.
    pub cooldown: Ticks,
    /// Status shown while switching.
    pub switching: Option<StatusId>,
}

impl ModeSpec {
    pub(crate) fn phases(&self) -> PhaseSpec {
        PhaseSpec {
            timings: PhaseTimings {
                transition_in: self.switch_time,
                active: Some(0),
                transition_out: 0,
                cooldown: self.cooldown,
                ..PhaseTimings::default()
            },
            statuses: PhaseStatuses {
                transitioning_in: self.switching,
                ..PhaseStatuses::default()
            },
        }
    }

    const fn status(&self, mode: Mode) -> StatusId {
        match mode {
            Mode::Primary => self.primary,
            Mode::Secondary => self.secondary,
        }
    }
}

/// Mode switch side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub(crate) machine: Machine,
    pub(crate) mode: Mode,
}

impl ModeState {
    /// Phase machine.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Mode in force.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }
}

impl SideState for ModeState {}

fn show_mode<H: AbilityHost + ?Sized>(ctx: &mut Ctx<'_, H>, id: EntityId, spec: &ModeSpec, mode: Mode) {
    ctx.host.unapply_status(id, spec.status(mode.toggled()));
    if !ctx.host.has_status(id, spec.status(mode)) {
        ctx.host.apply_status(id, spec.status(mode), UNBOUNDED);
    }
}

fn finish<H: AbilityHost + ?Sized>(
    state: &mut ModeState,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &ModeSpec,
    completed: &[Phase],
) {
    if completed.contains(&Phase::TransitioningIn) {
        state.mode = state.mode.toggled();
        show_mode(ctx, id, spec, state.mode);
        ctx.emit(id, KIND, AbilityEventKind::ModeSwitched { to: state.mode });
    }
}

pub(super) fn update<H: AbilityHost + ?Sized>(
    store: &mut SideStateStore<ModeState>,
    ctx: &mut Ctx<'_, H>,
    id: EntityId,
    spec: &ModeSpec,
    delta: Ticks,
) {
    let state = store.get(id);
    let completed = state.machine.advance(ctx, id, KIND, &spec.phases(), delta);
    finish(state, ctx, id, spec, &completed);
    show_mode(ctx, id, spec, state.mode);
}

impl Abilities {
    fn mode_state(&self, id: EntityId) -> ModeState {
        self.mode.peek(id).copied().unwrap_or_default()
    }

    /// Whether `id` may switch modes.
    #[must_use]
    pub fn can_switch_mode<H: AbilityHost + ?Sized>(&self, host: &H, id: EntityId) -> bool {
        spec_of(host, id, |l| l.mode.as_ref()).is_some() && self.mode_state(id).machine.is_ready()
    }

    /// Start switching to the other mode.
    pub fn command_switch_mode<H: AbilityHost + ?Sized>(
        &mut self,
        host: &mut H,
        role: Role,
        id: EntityId,
    ) -> bool {
        if !role.can_mutate() || !self.can_switch_mode(host, id) {
            return false;
        }
        let Some(spec) = spec_of(host, id, |l| l.mode.as_ref()) else {
            return false;
        };
        let mut ctx = Ctx::new(host, &mut self.reservations, &mut self.pending, role);
        let state = self.mode.get(id);
        let completed = state
            .machine
            .start(&mut ctx, id, KIND, &spec.phases(), Phase::TransitioningIn);
        finish(state, &mut ctx, id, &spec, &completed);
        true
    }

    /// Whether a switch is in progress.
    #[must_use]
    pub fn is_mode_active(&self, id: EntityId) -> bool {
        self.mode_state(id).machine.phase() == Phase::TransitioningIn
    }

    /// Mode in force for `id`.
    #[must_use]
    pub fn current_mode(&self, id: EntityId) -> Mode {
        self.mode_state(id).mode
    }

    /// Switch progress.
    #[must_use]
    pub fn mode_progress(&self, id: EntityId) -> Fixed {
        self.mode_state(id).machine.progress()
    }
}
