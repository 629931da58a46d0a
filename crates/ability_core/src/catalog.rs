//! Resolved unit types and their ability loadouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::abilities::{
    AbilityKind, ChargeSpec, CloakSpec, DeploySpec, LockSpec, ModeSpec, SiegeSpec, TurretSpec,
};
use crate::error::{AbilityError, Result};
use crate::math::Fixed;
use crate::status::StatusRegistry;

/// Index of a unit type inside its [`AbilityCatalog`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct UnitTypeId(u16);

impl UnitTypeId {
    /// Create a unit type id.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Abilities carried by a unit type. `None` means the family is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityLoadout {
    /// Burrow/lock.
    pub lock: Option<LockSpec>,
    /// Siege.
    pub siege: Option<SiegeSpec>,
    /// Deploy.
    pub deploy: Option<DeploySpec>,
    /// Mode switch.
    pub mode: Option<ModeSpec>,
    /// Charge.
    pub charge: Option<ChargeSpec>,
    /// Cloak.
    pub cloak: Option<CloakSpec>,
    /// Turret deployment.
    pub turret: Option<TurretSpec>,
}

impl AbilityLoadout {
    /// Families present, in update order.
    #[must_use]
    pub fn kinds(&self) -> Vec<AbilityKind> {
        AbilityKind::ALL
            .into_iter()
            .filter(|&kind| self.has(kind))
            .collect()
    }

    /// Whether the family is present.
    #[must_use]
    pub const fn has(&self, kind: AbilityKind) -> bool {
        match kind {
            AbilityKind::Lock => self.lock.is_some(),
            AbilityKind::Siege => self.siege.is_some(),
            AbilityKind::Deploy => self.deploy.is_some(),
            AbilityKind::Mode => self.mode.is_some(),
            AbilityKind::Charge => self.charge.is_some(),
            AbilityKind::Cloak => self.cloak.is_some(),
            AbilityKind::Turret => self.turret.is_some(),
        }
    }

    /// Whether no family is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// A resolved unit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitType {
    /// Catalog index.
    pub id: UnitTypeId,
    /// Unique name.
    pub name: String,
    /// Maximum health.
    pub health: u32,
    /// Movement speed per tick.
    pub speed: Fixed,
    /// Collision radius.
    pub hit_radius: Fixed,
    /// Abilities.
    pub loadout: AbilityLoadout,
}

/// Every unit type known to a simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityCatalog {
    units: Vec<UnitType>,
    by_name: BTreeMap<String, UnitTypeId>,
}

impl AbilityCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type built from its future id.
    ///
    /// # Errors
    ///
    /// Propagates `build` failures and rejects duplicate names.
    pub fn register_with(
        &mut self,
        build: impl FnOnce(UnitTypeId) -> Result<UnitType>,
    ) -> Result<UnitTypeId> {
        let index = u16::try_from(self.units.len())
            .map_err(|_| AbilityError::InvalidState("too many unit types".to_string()))?;
        let id = UnitTypeId(index);
        let unit = build(id)?;
        if self.by_name.contains_key(&unit.name) {
            return Err(AbilityError::DuplicateUnitType(unit.name));
        }
        self.by_name.insert(unit.name.clone(), id);
        self.units.push(unit);
        Ok(id)
    }

    /// Look up a unit type by id.
    #[must_use]
    pub fn get(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.units.get(id.index())
    }

    /// Look up a unit type id by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<UnitTypeId> {
        self.by_name.get(name).copied()
    }

    /// Look up a unit type by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&UnitType> {
        self.id(name).and_then(|id| self.get(id))
    }

    /// Number of unit types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate unit types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.units.iter()
    }
}

/// Immutable content a simulation runs on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    /// Status effects.
    pub statuses: StatusRegistry,
    /// Unit types.
    pub units: AbilityCatalog,
}

impl Content {
    /// Look up a status id by name.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::UnknownStatus`] if no such status exists.
    pub fn status(&self, name: &str) -> Result<crate::status::StatusId> {
        self.statuses
            .id(name)
            .ok_or_else(|| AbilityError::UnknownStatus {
                name: name.to_string(),
                referenced_by: "lookup".to_string(),
            })
    }

    /// Look up a unit type by name.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::UnknownUnitType`] if no such type exists.
    pub fn unit(&self, name: &str) -> Result<&UnitType> {
        self.units
            .by_name(name)
            .ok_or_else(|| AbilityError::UnknownUnitType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt(id: UnitTypeId) -> Result<UnitType> {
        Ok(UnitType {
            id,
            name: "grunt".to_string(),
            health: 60,
            speed: Fixed::ONE,
            hit_radius: Fixed::ONE,
            loadout: AbilityLoadout::default(),
        })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = AbilityCatalog::new();
        let id = catalog.register_with(grunt).unwrap();
        assert_eq!(catalog.id("grunt"), Some(id));
        assert_eq!(catalog.get(id).unwrap().health, 60);
        assert!(catalog.get(id).unwrap().loadout.is_empty());
    }

    #[test]
    fn test_duplicate_unit_type() {
        let mut catalog = AbilityCatalog::new();
        catalog.register_with(grunt).unwrap();
        assert!(matches!(
            catalog.register_with(grunt),
            Err(AbilityError::DuplicateUnitType(_))
        ));
        assert_eq!(catalog.len(), 1);
    }
}
