//! # Ability Core
//!
//! Deterministic unit ability engine for an RTS simulation.
//!
//! Units of one primary type gain extra multi-phase behaviours (burrow and
//! lock, siege, deploy, mode switch, charge, cloak, turret deployment)
//! without the host's entity model knowing about them. Behaviour is built
//! from a few pieces:
//!
//! - status effects with opposites and affinity reactions
//! - sparse per-entity side-state keyed by [`components::EntityId`]
//! - an exclusive target reservation table
//! - one generic phase machine shared by every ability family
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`status`] - Status effect registry and applied statuses
//! - [`store`] - Sparse side-state storage
//! - [`reservation`] - Exclusive target reservations
//! - [`machine`] - Generic ability phase machine
//! - [`abilities`] - Ability families and their command/query functions
//! - [`host`] - What abilities need from the host simulation
//! - [`facade`] - Command/query interface for input, AI and rendering
//! - [`simulation`] - Reference host simulation
//! - [`data`] / [`content`] - Content definitions and built-in content
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod abilities;
pub mod catalog;
pub mod components;
pub mod content;
pub mod data;
pub mod error;
pub mod facade;
pub mod host;
pub mod machine;
pub mod math;
pub mod reservation;
pub mod simulation;
pub mod status;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::abilities::{
        Abilities, AbilityCommand, AbilityEvent, AbilityEventKind, AbilityKind, AbortReason,
        DrawCue, Mode,
    };
    pub use crate::catalog::{AbilityCatalog, AbilityLoadout, Content, UnitType, UnitTypeId};
    pub use crate::components::*;
    pub use crate::error::{AbilityError, Result};
    pub use crate::facade::AbilityFacade;
    pub use crate::host::AbilityHost;
    pub use crate::machine::Phase;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::reservation::TargetReservations;
    pub use crate::simulation::{Simulation, TickEvents};
    pub use crate::status::{StatusEvent, StatusId, StatusRegistry, StatusSet};
    pub use crate::store::{SideState, SideStateStore};
}
