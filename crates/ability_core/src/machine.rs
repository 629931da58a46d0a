//! Generic phase engine shared by every ability family.
//!
//! Each family is the same small state machine with different numbers:
//!
//! ```text
//! Idle → Pending → TransitioningIn → Active → TransitioningOut → Idle
//! ```
//!
//! [`PhaseTimings`] says how long each timed phase lasts and where
//! TransitioningIn and Active lead; [`PhaseStatuses`] names the status effect
//! that makes each phase observable to other systems. Entering a phase strips
//! the family's other phase statuses, so leftovers from an earlier cycle can
//! never survive into the next one.
//!
//! Zero-length timed phases complete in the same call that enters them. The
//! caller gets back every phase that completed, in order, and attaches its
//! family-specific effects (firing, spawning, mode swaps) to those.

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityEventKind, AbilityKind, Ctx};
use crate::components::{EntityId, Ticks};
use crate::host::AbilityHost;
use crate::math::{ratio, Fixed};
use crate::status::StatusId;

/// Status duration used for phases without a timer.
pub const UNBOUNDED: Ticks = Ticks::MAX;

/// Longest chain of zero-length phases one call may walk through.
const MAX_CHAIN: usize = 6;

/// Phase of one ability on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No activity.
    #[default]
    Idle,
    /// Request accepted, preconditions (range, standing still) not yet met.
    Pending,
    /// Timed, uninterruptible commitment.
    TransitioningIn,
    /// Steady-state effect in force.
    Active,
    /// Timed reversal of the commitment.
    TransitioningOut,
}

/// Status effect shown for each phase. `None` shows nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseStatuses {
    /// Shown while idle, e.g. `mobile`.
    pub idle: Option<StatusId>,
    /// Shown while pending.
    pub pending: Option<StatusId>,
    /// Shown while transitioning in.
    pub transitioning_in: Option<StatusId>,
    /// Shown while active.
    pub active: Option<StatusId>,
    /// Shown while transitioning out.
    pub transitioning_out: Option<StatusId>,
}

impl PhaseStatuses {
    /// Status shown for `phase`.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> Option<StatusId> {
        match phase {
            Phase::Idle => self.idle,
            Phase::Pending => self.pending,
            Phase::TransitioningIn => self.transitioning_in,
            Phase::Active => self.active,
            Phase::TransitioningOut => self.transitioning_out,
        }
    }

    /// Every configured phase status.
    pub fn iter(&self) -> impl Iterator<Item = StatusId> {
        [
            self.idle,
            self.pending,
            self.transitioning_in,
            self.active,
            self.transitioning_out,
        ]
        .into_iter()
        .flatten()
    }
}

/// Durations and routing of a family's phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Length of TransitioningIn.
    pub transition_in: Ticks,
    /// Length of Active, or `None` to stay active until told otherwise.
    pub active: Option<Ticks>,
    /// Length of TransitioningOut.
    pub transition_out: Ticks,
    /// Cooldown started whenever Active is left normally.
    pub cooldown: Ticks,
    /// TransitioningIn settles into Pending instead of Active.
    pub settle_pending: bool,
    /// A timed Active returns to Pending instead of TransitioningOut.
    pub rearm: bool,
}

/// Everything the engine needs to drive one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseSpec {
    /// Phase durations and routing.
    pub timings: PhaseTimings,
    /// Phase status effects.
    pub statuses: PhaseStatuses,
}

impl PhaseSpec {
    fn length(&self, phase: Phase) -> Option<Ticks> {
        match phase {
            Phase::Idle | Phase::Pending => None,
            Phase::TransitioningIn => Some(self.timings.transition_in),
            Phase::Active => self.timings.active,
            Phase::TransitioningOut => Some(self.timings.transition_out),
        }
    }

    fn next_after(&self, phase: Phase) -> Phase {
        match phase {
            Phase::Idle | Phase::Pending => phase,
            Phase::TransitioningIn if self.timings.settle_pending => Phase::Pending,
            Phase::TransitioningIn => Phase::Active,
            Phase::Active if self.timings.rearm => Phase::Pending,
            Phase::Active => Phase::TransitioningOut,
            Phase::TransitioningOut => Phase::Idle,
        }
    }
}

/// Phase, timer and cooldown of one ability on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Machine {
    phase: Phase,
    timer: Option<Ticks>,
    length: Ticks,
    cooldown: Ticks,
}

impl Machine {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticks left in the current timed phase.
    #[must_use]
    pub const fn remaining(&self) -> Option<Ticks> {
        self.timer
    }

    /// Ticks left before the ability may be requested again.
    #[must_use]
    pub const fn cooldown(&self) -> Ticks {
        self.cooldown
    }

    /// Whether the phase is `Idle` and no cooldown is running.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Idle && self.cooldown == 0
    }

    /// Presentation progress through the current phase, in `[0, 1]`.
    ///
    /// Zero while idle or pending, one while in an untimed active phase.
    #[must_use]
    pub fn progress(&self) -> Fixed {
        match (self.phase, self.timer) {
            (Phase::Idle | Phase::Pending, _) => Fixed::ZERO,
            (_, Some(left)) => ratio(self.length.saturating_sub(left), self.length),
            (_, None) => Fixed::ONE,
        }
    }

    /// Enter `phase`, walking through any zero-length phases that follow.
    ///
    /// Returns the phases that completed during the call.
    pub fn start<H: AbilityHost + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        kind: AbilityKind,
        spec: &PhaseSpec,
        phase: Phase,
    ) -> Vec<Phase> {
        let mut completed = Vec::new();
        let mut next = phase;
        for _ in 0..MAX_CHAIN {
            let from = self.phase;
            self.enter(ctx, id, spec, next);
            tracing::trace!(%id, ?kind, ?from, to = ?next, "phase change");
            ctx.emit(id, kind, AbilityEventKind::PhaseChanged { from, to: next });

            if self.timer != Some(0) {
                break;
            }
            completed.push(next);
            if next == Phase::Active {
                self.cooldown = spec.timings.cooldown;
            }
            next = spec.next_after(next);
        }
        completed
    }

    /// Count down timers by `delta` ticks and advance on expiry.
    ///
    /// Returns the phases that completed this tick.
    pub fn advance<H: AbilityHost + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        kind: AbilityKind,
        spec: &PhaseSpec,
        delta: Ticks,
    ) -> Vec<Phase> {
        self.cooldown = self.cooldown.saturating_sub(delta);
        let Some(left) = self.timer else {
            return Vec::new();
        };
        if left > delta {
            self.timer = Some(left - delta);
            return Vec::new();
        }

        let done = self.phase;
        if done == Phase::Active {
            self.cooldown = spec.timings.cooldown;
        }
        let mut completed = vec![done];
        completed.extend(self.start(ctx, id, kind, spec, spec.next_after(done)));
        completed
    }

    /// Leave Active on request, starting the cooldown.
    pub fn exit<H: AbilityHost + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        kind: AbilityKind,
        spec: &PhaseSpec,
    ) -> Vec<Phase> {
        self.cooldown = spec.timings.cooldown;
        self.start(ctx, id, kind, spec, Phase::TransitioningOut)
    }

    /// Force the machine back to `phase` after an invalidation.
    ///
    /// No cooldown is started: nothing completed.
    pub fn abort<H: AbilityHost + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        kind: AbilityKind,
        spec: &PhaseSpec,
        phase: Phase,
    ) {
        tracing::debug!(%id, ?kind, from = ?self.phase, to = ?phase, "ability aborted");
        self.start(ctx, id, kind, spec, phase);
    }

    /// Re-apply the current phase's status if the host lost it, e.g. an
    /// idle `mobile` status on a freshly spawned entity.
    pub fn ensure_status<H: AbilityHost + ?Sized>(
        &self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        spec: &PhaseSpec,
    ) {
        if self.timer.is_some() {
            return;
        }
        if let Some(status) = spec.statuses.get(self.phase) {
            if !ctx.host.has_status(id, status) {
                ctx.host.apply_status(id, status, UNBOUNDED);
            }
        }
    }

    fn enter<H: AbilityHost + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, H>,
        id: EntityId,
        spec: &PhaseSpec,
        phase: Phase,
    ) {
        let length = spec.length(phase);
        self.phase = phase;
        self.timer = length;
        self.length = length.unwrap_or(0);

        let shown = if length == Some(0) {
            None
        } else {
            spec.statuses.get(phase)
        };
        for status in spec.statuses.iter() {
            if Some(status) != shown {
                ctx.host.unapply_status(id, status);
            }
        }
        if let Some(status) = shown {
            ctx.host.apply_status(id, status, length.unwrap_or(UNBOUNDED));
        }
    }
}
