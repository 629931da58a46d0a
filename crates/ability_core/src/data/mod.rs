//! Data structures for ability content.
//!
//! This module contains pure data structures that define status effects and
//! unit ability loadouts. All structs are designed to be deserialized from
//! RON files and resolved into a [`crate::catalog::Content`].
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `ability_tools`.

mod content_data;
mod status_data;
mod unit_data;

pub use content_data::ContentData;
pub use status_data::{AffinityData, ReactionData, StatusData};
pub use unit_data::{
    AbilityLoadoutData, ChargeData, CloakData, DeployData, LockData, ModeData, PhaseStatusData,
    SiegeData, TurretData, UnitTypeData,
};
