//! Unit type and ability loadout data structures.
//!
//! Ability data refers to status effects by name; [`UnitTypeData::resolve`]
//! turns names into registry ids and the data into runtime specs.

use serde::{Deserialize, Serialize};

use crate::abilities::{
    ChargeSpec, CloakSpec, DeploySpec, LockSpec, ModeSpec, SiegeSpec, TurretSpec,
};
use crate::catalog::{AbilityLoadout, UnitType, UnitTypeId};
use crate::error::{AbilityError, Result};
use crate::machine::PhaseStatuses;
use crate::math::{fixed_serde, Fixed};
use crate::status::{StatusId, StatusRegistry};

/// Status names shown in each phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatusData {
    /// Shown while idle.
    #[serde(default)]
    pub idle: Option<String>,
    /// Shown while pending.
    #[serde(default)]
    pub pending: Option<String>,
    /// Shown while transitioning in.
    #[serde(default)]
    pub transitioning_in: Option<String>,
    /// Shown while active.
    #[serde(default)]
    pub active: Option<String>,
    /// Shown while transitioning out.
    #[serde(default)]
    pub transitioning_out: Option<String>,
}

/// Burrow/lock tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockData {
    /// Ticks to burrow.
    pub burrow_time: u32,
    /// Ticks to unburrow.
    pub unburrow_time: u32,
    /// Ticks a lock is held before firing.
    pub lock_time: u32,
    /// Ticks between firing and the next lock.
    pub cooldown: u32,
    /// Lock range (fixed-point bits).
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Damage when the lock fires.
    pub damage: u32,
    /// Acquire targets without a command.
    #[serde(default)]
    pub auto_acquire: bool,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Siege tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiegeData {
    /// Ticks to siege.
    pub siege_time: u32,
    /// Ticks to unsiege.
    pub unsiege_time: u32,
    /// Ticks after unsieging before sieging again.
    #[serde(default)]
    pub cooldown: u32,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Deploy tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployData {
    /// Ticks to deploy.
    pub deploy_time: u32,
    /// Ticks to undeploy.
    pub undeploy_time: u32,
    /// Resources paid when deployment begins.
    #[serde(default)]
    pub cost: i32,
    /// Tech that must be researched first.
    #[serde(default)]
    pub requires_tech: Option<String>,
    /// Ticks after undeploying before deploying again.
    #[serde(default)]
    pub cooldown: u32,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Mode switch tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeData {
    /// Status of the primary mode.
    pub primary: String,
    /// Status of the secondary mode.
    pub secondary: String,
    /// Ticks a switch takes.
    pub switch_time: u32,
    /// Ticks between switches.
    #[serde(default)]
    pub cooldown: u32,
    /// Status shown while switching.
    #[serde(default)]
    pub switching: Option<String>,
}

/// Charge tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeData {
    /// Distance at which the charge begins (fixed-point bits).
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Distance beyond which the approach is abandoned (fixed-point bits).
    #[serde(with = "fixed_serde")]
    pub leash: Fixed,
    /// Ticks the charge takes.
    pub charge_time: u32,
    /// Ticks after the hit before the next charge.
    #[serde(default)]
    pub cooldown: u32,
    /// Resources paid when the hit lands.
    #[serde(default)]
    pub cost: i32,
    /// Damage of the hit.
    pub damage: u32,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Cloak tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloakData {
    /// Ticks to fade in.
    pub fade_in: u32,
    /// Ticks to fade out.
    pub fade_out: u32,
    /// Ticks after fading out before cloaking again.
    #[serde(default)]
    pub cooldown: u32,
    /// Resources required to start.
    #[serde(default)]
    pub min_resources: i32,
    /// Resources drained per interval.
    #[serde(default)]
    pub drain: i32,
    /// Ticks between drains.
    #[serde(default)]
    pub drain_interval: u32,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Turret deployment tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretData {
    /// Unit type spawned as the turret.
    pub turret: String,
    /// Ticks to assemble.
    pub assemble_time: u32,
    /// Ticks to pack up.
    pub pack_time: u32,
    /// Ticks after packing before assembling again.
    #[serde(default)]
    pub cooldown: u32,
    /// Phase statuses.
    #[serde(default)]
    pub statuses: PhaseStatusData,
}

/// Abilities a unit type carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLoadoutData {
    /// Burrow/lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockData>,
    /// Siege.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siege: Option<SiegeData>,
    /// Deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployData>,
    /// Mode switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeData>,
    /// Charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<ChargeData>,
    /// Cloak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloak: Option<CloakData>,
    /// Turret deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turret: Option<TurretData>,
}

/// Data-driven unit type definition.
///
/// # Example RON
///
/// ```ron
/// UnitTypeData(
///     name: "bastion",
///     health: 180,
///     speed: 4294967296,       // Fixed-point for 1.0
///     hit_radius: 4294967296,  // Fixed-point for 1.0
///     abilities: AbilityLoadoutData(
///         siege: Some(SiegeData(
///             siege_time: 180,
///             unsiege_time: 120,
///             statuses: PhaseStatusData(
///                 idle: Some("mobile"),
///                 transitioning_in: Some("sieging"),
///                 active: Some("sieged"),
///                 transitioning_out: Some("unsieging"),
///             ),
///         )),
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeData {
    /// Unique name.
    pub name: String,

    /// Maximum health.
    pub health: u32,

    /// Movement speed per tick (fixed-point bits).
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,

    /// Collision radius (fixed-point bits).
    #[serde(with = "fixed_serde")]
    pub hit_radius: Fixed,

    /// Abilities.
    #[serde(default)]
    pub abilities: AbilityLoadoutData,
}

/// Name → id lookups on behalf of one unit type.
struct Resolver<'a> {
    registry: &'a StatusRegistry,
    owner: &'a str,
}

impl Resolver<'_> {
    fn status(&self, name: &str) -> Result<StatusId> {
        let id = self
            .registry
            .id(name)
            .ok_or_else(|| AbilityError::UnknownStatus {
                name: name.to_string(),
                referenced_by: self.owner.to_string(),
            })?;
        if self.registry.get(id).is_some_and(|e| e.reactive) {
            return Err(self.invalid(format!(
                "reactive status '{name}' cannot be applied by an ability"
            )));
        }
        Ok(id)
    }

    fn optional(&self, name: Option<&String>) -> Result<Option<StatusId>> {
        name.map(|n| self.status(n)).transpose()
    }

    fn phases(&self, data: &PhaseStatusData) -> Result<PhaseStatuses> {
        Ok(PhaseStatuses {
            idle: self.optional(data.idle.as_ref())?,
            pending: self.optional(data.pending.as_ref())?,
            transitioning_in: self.optional(data.transitioning_in.as_ref())?,
            active: self.optional(data.active.as_ref())?,
            transitioning_out: self.optional(data.transitioning_out.as_ref())?,
        })
    }

    fn invalid(&self, message: String) -> AbilityError {
        AbilityError::InvalidContent {
            owner: self.owner.to_string(),
            message,
        }
    }
}

impl UnitTypeData {
    /// Resolve into a runtime unit type.
    ///
    /// # Errors
    ///
    /// Fails on unknown or reactive status names, and on inconsistent
    /// tuning such as a charge leash shorter than its range.
    pub fn resolve(&self, id: UnitTypeId, registry: &StatusRegistry) -> Result<UnitType> {
        let r = Resolver {
            registry,
            owner: &self.name,
        };
        if self.hit_radius < Fixed::ZERO || self.speed < Fixed::ZERO {
            return Err(r.invalid("speed and hit radius must not be negative".to_string()));
        }
        let a = &self.abilities;

        let lock = match &a.lock {
            Some(d) => Some(LockSpec {
                burrow_time: d.burrow_time,
                unburrow_time: d.unburrow_time,
                lock_time: d.lock_time,
                cooldown: d.cooldown,
                range: d.range,
                damage: d.damage,
                auto_acquire: d.auto_acquire,
                statuses: r.phases(&d.statuses)?,
            }),
            None => None,
        };
        let siege = match &a.siege {
            Some(d) => Some(SiegeSpec {
                siege_time: d.siege_time,
                unsiege_time: d.unsiege_time,
                cooldown: d.cooldown,
                statuses: r.phases(&d.statuses)?,
            }),
            None => None,
        };
        let deploy = match &a.deploy {
            Some(d) => Some(DeploySpec {
                deploy_time: d.deploy_time,
                undeploy_time: d.undeploy_time,
                cost: d.cost,
                requires_tech: d.requires_tech.clone(),
                cooldown: d.cooldown,
                statuses: r.phases(&d.statuses)?,
            }),
            None => None,
        };
        let mode = match &a.mode {
            Some(d) => {
                if d.primary == d.secondary {
                    return Err(r.invalid("mode statuses must differ".to_string()));
                }
                Some(ModeSpec {
                    primary: r.status(&d.primary)?,
                    secondary: r.status(&d.secondary)?,
                    switch_time: d.switch_time,
                    cooldown: d.cooldown,
                    switching: r.optional(d.switching.as_ref())?,
                })
            }
            None => None,
        };
        let charge = match &a.charge {
            Some(d) => {
                if d.leash < d.range {
                    return Err(r.invalid("charge leash is shorter than its range".to_string()));
                }
                Some(ChargeSpec {
                    range: d.range,
                    leash: d.leash,
                    charge_time: d.charge_time,
                    cooldown: d.cooldown,
                    cost: d.cost,
                    damage: d.damage,
                    statuses: r.phases(&d.statuses)?,
                })
            }
            None => None,
        };
        let cloak = match &a.cloak {
            Some(d) => {
                if d.drain > 0 && d.drain_interval == 0 {
                    return Err(r.invalid("cloak drain needs a drain interval".to_string()));
                }
                Some(CloakSpec {
                    fade_in: d.fade_in,
                    fade_out: d.fade_out,
                    cooldown: d.cooldown,
                    min_resources: d.min_resources,
                    drain: d.drain,
                    drain_interval: d.drain_interval,
                    statuses: r.phases(&d.statuses)?,
                })
            }
            None => None,
        };
        let turret = match &a.turret {
            Some(d) => Some(TurretSpec {
                turret: d.turret.clone(),
                assemble_time: d.assemble_time,
                pack_time: d.pack_time,
                cooldown: d.cooldown,
                statuses: r.phases(&d.statuses)?,
            }),
            None => None,
        };

        Ok(UnitType {
            id,
            name: self.name.clone(),
            health: self.health,
            speed: self.speed,
            hit_radius: self.hit_radius,
            loadout: AbilityLoadout {
                lock,
                siege,
                deploy,
                mode,
                charge,
                cloak,
                turret,
            },
        })
    }
}
