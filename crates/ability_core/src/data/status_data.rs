//! Status effect data structures.

use serde::{Deserialize, Serialize};

/// What an affinity does to the effect that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionData {
    /// Leave the owner alone.
    #[default]
    Keep,
    /// Swap the owner for another effect.
    Replace {
        /// Name of the substituted effect.
        with: String,
        /// Duration of the substituted effect in ticks.
        duration: u32,
    },
    /// Add the partner's remaining duration to the owner, up to `cap`.
    Extend {
        /// Ceiling in ticks.
        cap: u32,
    },
}

/// Affinity between the owning effect and a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityData {
    /// Name of the partner effect.
    pub partner: String,
    /// Armor-ignoring damage dealt when the reaction fires.
    #[serde(default)]
    pub pierce_damage: u32,
    /// Effect on the owner.
    #[serde(default)]
    pub result: ReactionData,
}

/// Data-driven status effect definition.
///
/// Multipliers are whole percentages, so `speed: 50` halves movement speed.
///
/// # Example RON
///
/// ```ron
/// StatusData(
///     name: "burning",
///     periodic_damage: 1,
///     damage_interval: 8,
///     opposites: ["wet", "freezing"],
///     affinities: [
///         AffinityData(partner: "tarred", pierce_damage: 8, result: Extend(cap: 300)),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusData {
    /// Unique name.
    pub name: String,

    /// Movement speed percentage.
    #[serde(default = "default_percent")]
    pub speed: u32,

    /// Maximum health percentage.
    #[serde(default = "default_percent")]
    pub health: u32,

    /// Outgoing damage percentage.
    #[serde(default = "default_percent")]
    pub damage: u32,

    /// Reload speed percentage.
    #[serde(default = "default_percent")]
    pub reload: u32,

    /// Construction speed percentage.
    #[serde(default = "default_percent")]
    pub build_speed: u32,

    /// Damage dealt every `damage_interval` ticks.
    #[serde(default)]
    pub periodic_damage: u32,

    /// Ticks between periodic damage hits.
    #[serde(default)]
    pub damage_interval: u32,

    /// Only removed explicitly, never by time.
    #[serde(default)]
    pub permanent: bool,

    /// Suppresses weapons.
    #[serde(default)]
    pub disarm: bool,

    /// Produced only by reactions.
    #[serde(default)]
    pub reactive: bool,

    /// Names of mutually exclusive effects. Made symmetric on load.
    #[serde(default)]
    pub opposites: Vec<String>,

    /// Reactions with partner effects.
    #[serde(default)]
    pub affinities: Vec<AffinityData>,
}

/// Unmodified stat percentage.
const fn default_percent() -> u32 {
    100
}

impl StatusData {
    /// A neutral effect named `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            speed: default_percent(),
            health: default_percent(),
            damage: default_percent(),
            reload: default_percent(),
            build_speed: default_percent(),
            periodic_damage: 0,
            damage_interval: 0,
            permanent: false,
            disarm: false,
            reactive: false,
            opposites: Vec::new(),
            affinities: Vec::new(),
        }
    }

    /// Whether any multiplier differs from 100%.
    #[must_use]
    pub fn modifies_stats(&self) -> bool {
        [
            self.speed,
            self.health,
            self.damage,
            self.reload,
            self.build_speed,
        ]
        .iter()
        .any(|&p| p != default_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_ron() {
        let data: StatusData = ron::from_str(r#"StatusData(name: "wet", speed: 94)"#).unwrap();
        assert_eq!(data.speed, 94);
        assert_eq!(data.health, 100);
        assert!(data.opposites.is_empty());
        assert!(data.modifies_stats());
    }

    #[test]
    fn test_affinity_defaults_to_keep() {
        let data: AffinityData = ron::from_str(r#"AffinityData(partner: "shocked")"#).unwrap();
        assert_eq!(data.result, ReactionData::Keep);
        assert_eq!(data.pierce_damage, 0);
    }

    #[test]
    fn test_named_is_neutral() {
        assert!(!StatusData::named("mobile").modifies_stats());
    }
}
