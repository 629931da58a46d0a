//! Human and JSON summaries of a content set.

use std::fmt;

use ability_core::data::{AbilityLoadoutData, ContentData};
use serde::Serialize;

use crate::validate::{Result, ToolError};

/// One unit type in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    /// Unit type name.
    pub name: String,
    /// Base health.
    pub health: u32,
    /// Ability families the unit carries.
    pub abilities: Vec<&'static str>,
}

/// Overview of a content set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    /// Number of status effects.
    pub statuses: usize,
    /// Status effects that only reactions may produce.
    pub reactive: Vec<String>,
    /// Unit types in declaration order.
    pub units: Vec<UnitSummary>,
}

fn families(loadout: &AbilityLoadoutData) -> Vec<&'static str> {
    let present = [
        ("lock", loadout.lock.is_some()),
        ("siege", loadout.siege.is_some()),
        ("deploy", loadout.deploy.is_some()),
        ("mode", loadout.mode.is_some()),
        ("charge", loadout.charge.is_some()),
        ("cloak", loadout.cloak.is_some()),
        ("turret", loadout.turret.is_some()),
    ];
    present
        .into_iter()
        .filter_map(|(name, has)| has.then_some(name))
        .collect()
}

impl ContentSummary {
    /// Summarize `data`.
    #[must_use]
    pub fn of(data: &ContentData) -> Self {
        Self {
            statuses: data.statuses.len(),
            reactive: data
                .statuses
                .iter()
                .filter(|s| s.reactive)
                .map(|s| s.name.clone())
                .collect(),
            units: data
                .units
                .iter()
                .map(|u| UnitSummary {
                    name: u.name.clone(),
                    health: u.health,
                    abilities: families(&u.abilities),
                })
                .collect(),
        }
    }

    /// Pretty JSON form.
    ///
    /// # Errors
    ///
    /// Fails only if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ToolError::Encode(e.to_string()))
    }
}

impl fmt::Display for ContentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} status effects ({} reactive)",
            self.statuses,
            self.reactive.len()
        )?;
        writeln!(f, "{} unit types:", self.units.len())?;
        for unit in &self.units {
            let abilities = if unit.abilities.is_empty() {
                "-".to_string()
            } else {
                unit.abilities.join(", ")
            };
            writeln!(f, "  {:<12} {:>4} hp  {abilities}", unit.name, unit.health)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::content;

    #[test]
    fn test_builtin_summary() {
        let summary = ContentSummary::of(&content::builtin_data());

        assert_eq!(summary.units.len(), 9);
        assert_eq!(summary.reactive, ["frozen", "blasted"]);
        let borer = summary.units.iter().find(|u| u.name == "borer").unwrap();
        assert_eq!(borer.abilities, ["lock"]);
        let grunt = summary.units.iter().find(|u| u.name == "grunt").unwrap();
        assert!(grunt.abilities.is_empty());
    }

    #[test]
    fn test_json_lists_units() {
        let summary = ContentSummary::of(&content::builtin_data());
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(json["units"][0]["name"], "grunt");
        assert_eq!(json["units"][1]["abilities"][0], "lock");
    }

    #[test]
    fn test_display_marks_plain_units() {
        let data = content::builtin_data();
        let text = ContentSummary::of(&data).to_string();
        let header = format!("{} status effects (2 reactive)", data.statuses.len());
        assert!(text.starts_with(&header));
        assert!(text.lines().any(|l| l.contains("grunt") && l.ends_with('-')));
    }
}
