//! Complete content set: every status effect and unit type.

use serde::{Deserialize, Serialize};

use super::status_data::{ReactionData, StatusData};
use super::unit_data::UnitTypeData;
use crate::catalog::{AbilityCatalog, Content};
use crate::error::{AbilityError, Result};
use crate::status::{Reaction, StatusEffect, StatusRegistry};

/// Status effects and unit types, as loaded from a RON file.
///
/// # Example RON
///
/// ```ron
/// ContentData(
///     statuses: [...],
///     units: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentData {
    /// Status effect definitions.
    #[serde(default)]
    pub statuses: Vec<StatusData>,
    /// Unit type definitions.
    #[serde(default)]
    pub units: Vec<UnitTypeData>,
}

impl ContentData {
    /// Parse content from RON text. `path` is only used in the error.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::DataParseError`] if the text is not valid
    /// content RON.
    pub fn from_ron(source: &str, path: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| AbilityError::DataParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Render as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::InvalidState`] if serialization fails.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| AbilityError::InvalidState(e.to_string()))
    }

    /// Find a status effect by name.
    #[must_use]
    pub fn get_status(&self, name: &str) -> Option<&StatusData> {
        self.statuses.iter().find(|s| s.name == name)
    }

    /// Find a unit type by name.
    #[must_use]
    pub fn get_unit(&self, name: &str) -> Option<&UnitTypeData> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Validate cross references without building anything.
    ///
    /// Checks for:
    /// - Duplicate status and unit names
    /// - Opposites, affinity partners and substitutions naming real effects
    /// - Turret deployments naming real unit types
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (i, status) in self.statuses.iter().enumerate() {
            if self.statuses[..i].iter().any(|s| s.name == status.name) {
                errors.push(format!("Duplicate status '{}'", status.name));
            }
            for opposite in &status.opposites {
                if self.get_status(opposite).is_none() {
                    errors.push(format!(
                        "Status '{}' is opposite to unknown status '{}'",
                        status.name, opposite
                    ));
                }
            }
            for affinity in &status.affinities {
                if self.get_status(&affinity.partner).is_none() {
                    errors.push(format!(
                        "Status '{}' has affinity with unknown status '{}'",
                        status.name, affinity.partner
                    ));
                }
                if let ReactionData::Replace { with, .. } = &affinity.result {
                    if self.get_status(with).is_none() {
                        errors.push(format!(
                            "Status '{}' reacts into unknown status '{}'",
                            status.name, with
                        ));
                    }
                }
            }
            if status.periodic_damage > 0 && status.damage_interval == 0 {
                errors.push(format!(
                    "Status '{}' deals periodic damage without an interval",
                    status.name
                ));
            }
        }

        for (i, unit) in self.units.iter().enumerate() {
            if self.units[..i].iter().any(|u| u.name == unit.name) {
                errors.push(format!("Duplicate unit type '{}'", unit.name));
            }
            if let Some(turret) = &unit.abilities.turret {
                if self.get_unit(&turret.turret).is_none() {
                    errors.push(format!(
                        "Unit '{}' deploys unknown turret '{}'",
                        unit.name, turret.turret
                    ));
                }
            }
        }

        errors
    }

    /// Build the status registry.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names and unresolved references.
    pub fn build_registry(&self) -> Result<StatusRegistry> {
        let mut registry = StatusRegistry::new();
        for data in &self.statuses {
            let mut effect = StatusEffect::new(data.name.clone())
                .speed(data.speed)
                .health(data.health)
                .damage_mult(data.damage)
                .reload(data.reload)
                .build_speed(data.build_speed)
                .periodic(data.periodic_damage, data.damage_interval);
            if data.permanent {
                effect = effect.permanent();
            }
            if data.disarm {
                effect = effect.disarm();
            }
            if data.reactive {
                effect = effect.reactive();
            }
            registry.register(effect)?;
        }

        let lookup = |registry: &StatusRegistry, name: &str, owner: &str| {
            registry.id(name).ok_or_else(|| AbilityError::UnknownStatus {
                name: name.to_string(),
                referenced_by: owner.to_string(),
            })
        };

        for data in &self.statuses {
            let owner = lookup(&registry, &data.name, &data.name)?;
            for opposite in &data.opposites {
                let other = lookup(&registry, opposite, &data.name)?;
                registry.set_opposite(owner, other);
            }
            for affinity in &data.affinities {
                let partner = lookup(&registry, &affinity.partner, &data.name)?;
                let reaction = match &affinity.result {
                    ReactionData::Keep => Reaction::damage(affinity.pierce_damage),
                    ReactionData::Replace { with, duration } => Reaction::replace(
                        affinity.pierce_damage,
                        lookup(&registry, with, &data.name)?,
                        *duration,
                    ),
                    ReactionData::Extend { cap } => Reaction::extend(affinity.pierce_damage, *cap),
                };
                registry.set_affinity(owner, partner, reaction);
            }
        }
        Ok(registry)
    }

    /// Resolve into runtime content.
    ///
    /// # Errors
    ///
    /// Fails on the first inconsistency found; use
    /// [`validate`](Self::validate) for a full report.
    pub fn resolve(&self) -> Result<Content> {
        let statuses = self.build_registry()?;
        let mut units = AbilityCatalog::new();
        for data in &self.units {
            units.register_with(|id| data.resolve(id, &statuses))?;
        }
        for unit in units.iter() {
            if let Some(turret) = &unit.loadout.turret {
                if units.id(&turret.turret).is_none() {
                    return Err(AbilityError::UnknownUnitType(turret.turret.clone()));
                }
            }
        }
        tracing::info!(
            statuses = statuses.len(),
            units = units.len(),
            "content resolved"
        );
        Ok(Content { statuses, units })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AffinityData;

    fn sample() -> ContentData {
        let mut burning = StatusData::named("burning");
        burning.periodic_damage = 1;
        burning.damage_interval = 8;
        burning.opposites = vec!["wet".to_string()];
        burning.affinities = vec![AffinityData {
            partner: "tarred".to_string(),
            pierce_damage: 8,
            result: ReactionData::Extend { cap: 300 },
        }];
        ContentData {
            statuses: vec![
                StatusData::named("wet"),
                burning,
                StatusData::named("tarred"),
            ],
            units: vec![],
        }
    }

    #[test]
    fn test_opposites_become_symmetric() {
        let registry = sample().build_registry().unwrap();
        let wet = registry.id("wet").unwrap();
        let burning = registry.id("burning").unwrap();
        assert!(registry.get(wet).unwrap().opposites.contains(&burning));
        assert!(registry.get(burning).unwrap().opposites.contains(&wet));
    }

    #[test]
    fn test_validate_reports_unknown_references() {
        let mut data = sample();
        data.statuses[1].opposites.push("frozen".to_string());
        data.statuses.push(StatusData::named("wet"));

        let errors = data.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("frozen")));
        assert!(errors.iter().any(|e| e.contains("Duplicate status 'wet'")));
    }

    #[test]
    fn test_resolve_unknown_affinity_partner() {
        let mut data = sample();
        data.statuses[1].affinities[0].partner = "oil".to_string();
        assert!(matches!(
            data.resolve(),
            Err(AbilityError::UnknownStatus { name, .. }) if name == "oil"
        ));
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = ContentData::from_ron("ContentData(statuses: [", "broken.ron").unwrap_err();
        assert!(matches!(err, AbilityError::DataParseError { path, .. } if path == "broken.ron"));
    }
}
