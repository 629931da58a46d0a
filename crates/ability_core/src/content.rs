//! Built-in content: the default status effects and unit roster.
//!
//! `assets/data/content.ron` carries the same set in data form.

use crate::catalog::Content;
use crate::data::{
    AbilityLoadoutData, AffinityData, ChargeData, CloakData, ContentData, DeployData, LockData,
    ModeData, PhaseStatusData, ReactionData, SiegeData, StatusData, TurretData, UnitTypeData,
};
use crate::error::Result;
use crate::math::Fixed;

/// Ticks a lock is held before it fires.
pub const LOCK_TIME: u32 = 840;
/// Ticks between a lock firing and the next.
pub const LOCK_COOLDOWN: u32 = 240;
/// Ticks to enter siege mode.
pub const SIEGE_TIME: u32 = 180;
/// Ceiling of burning extended by tar.
pub const BURNING_TAR_CAP: u32 = 300;
/// Ceiling of melting extended by tar.
pub const MELTING_TAR_CAP: u32 = 200;
/// Tech that unlocks fortification.
pub const FORTIFICATION_TECH: &str = "fortification";

fn status(name: &str) -> StatusData {
    StatusData::named(name)
}

fn immobile(name: &str) -> StatusData {
    StatusData {
        speed: 0,
        ..status(name)
    }
}

fn permanent(mut data: StatusData) -> StatusData {
    data.permanent = true;
    data
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn phases(
    idle: Option<&str>,
    pending: Option<&str>,
    transitioning_in: Option<&str>,
    active: Option<&str>,
    transitioning_out: Option<&str>,
) -> PhaseStatusData {
    PhaseStatusData {
        idle: idle.map(str::to_string),
        pending: pending.map(str::to_string),
        transitioning_in: transitioning_in.map(str::to_string),
        active: active.map(str::to_string),
        transitioning_out: transitioning_out.map(str::to_string),
    }
}

fn affinity(partner: &str, pierce_damage: u32, result: ReactionData) -> AffinityData {
    AffinityData {
        partner: partner.to_string(),
        pierce_damage,
        result,
    }
}

fn elemental_statuses() -> Vec<StatusData> {
    vec![
        StatusData {
            speed: 94,
            opposites: names(&["burning"]),
            affinities: vec![affinity(
                "freezing",
                0,
                ReactionData::Replace {
                    with: "frozen".to_string(),
                    duration: 90,
                },
            )],
            ..status("wet")
        },
        StatusData {
            periodic_damage: 1,
            damage_interval: 8,
            opposites: names(&["wet", "freezing"]),
            affinities: vec![affinity(
                "tarred",
                8,
                ReactionData::Extend {
                    cap: BURNING_TAR_CAP,
                },
            )],
            ..status("burning")
        },
        StatusData {
            speed: 60,
            ..status("tarred")
        },
        StatusData {
            speed: 50,
            reload: 75,
            ..status("freezing")
        },
        StatusData {
            disarm: true,
            reactive: true,
            ..immobile("frozen")
        },
        StatusData {
            reload: 50,
            affinities: vec![affinity(
                "wet",
                14,
                ReactionData::Replace {
                    with: "blasted".to_string(),
                    duration: 30,
                },
            )],
            ..status("shocked")
        },
        StatusData {
            disarm: true,
            reactive: true,
            ..status("blasted")
        },
        StatusData {
            periodic_damage: 2,
            damage_interval: 10,
            health: 80,
            affinities: vec![affinity(
                "tarred",
                8,
                ReactionData::Extend {
                    cap: MELTING_TAR_CAP,
                },
            )],
            ..status("melting")
        },
    ]
}

fn phase_statuses() -> Vec<StatusData> {
    vec![
        permanent(status("mobile")),
        // Siege
        immobile("sieging"),
        permanent(StatusData {
            damage: 150,
            ..immobile("sieged")
        }),
        immobile("unsieging"),
        // Lock
        immobile("burrowing"),
        permanent(immobile("burrowed")),
        immobile("locked"),
        immobile("unburrowing"),
        // Deploy
        immobile("deploying"),
        permanent(StatusData {
            health: 150,
            ..immobile("fortified")
        }),
        immobile("undeploying"),
        // Mode
        permanent(status("assault")),
        permanent(StatusData {
            speed: 50,
            damage: 140,
            ..status("artillery")
        }),
        StatusData {
            disarm: true,
            ..immobile("switching")
        },
        // Charge
        StatusData {
            disarm: true,
            ..immobile("charging")
        },
        // Cloak
        status("fading_in"),
        permanent(StatusData {
            speed: 90,
            ..status("cloaked")
        }),
        status("fading_out"),
        // Turret
        immobile("assembling"),
        permanent(immobile("turret_deployed")),
        immobile("packing"),
    ]
}

fn unit(name: &str, health: u32, speed: Fixed, abilities: AbilityLoadoutData) -> UnitTypeData {
    UnitTypeData {
        name: name.to_string(),
        health,
        speed,
        hit_radius: Fixed::ONE / Fixed::from_num(2),
        abilities,
    }
}

fn units() -> Vec<UnitTypeData> {
    let none = AbilityLoadoutData::default;
    vec![
        unit("grunt", 60, Fixed::ONE, none()),
        unit(
            "borer",
            90,
            Fixed::ONE,
            AbilityLoadoutData {
                lock: Some(LockData {
                    burrow_time: 60,
                    unburrow_time: 45,
                    lock_time: LOCK_TIME,
                    cooldown: LOCK_COOLDOWN,
                    range: Fixed::from_num(6),
                    damage: 40,
                    auto_acquire: true,
                    statuses: phases(
                        None,
                        Some("burrowed"),
                        Some("burrowing"),
                        Some("locked"),
                        Some("unburrowing"),
                    ),
                }),
                ..none()
            },
        ),
        unit(
            "bastion",
            180,
            Fixed::ONE,
            AbilityLoadoutData {
                siege: Some(SiegeData {
                    siege_time: SIEGE_TIME,
                    unsiege_time: 120,
                    cooldown: 0,
                    statuses: phases(
                        Some("mobile"),
                        None,
                        Some("sieging"),
                        Some("sieged"),
                        Some("unsieging"),
                    ),
                }),
                ..none()
            },
        ),
        unit(
            "warden",
            150,
            Fixed::ONE,
            AbilityLoadoutData {
                deploy: Some(DeployData {
                    deploy_time: 90,
                    undeploy_time: 60,
                    cost: 50,
                    requires_tech: Some(FORTIFICATION_TECH.to_string()),
                    cooldown: 60,
                    statuses: phases(
                        None,
                        None,
                        Some("deploying"),
                        Some("fortified"),
                        Some("undeploying"),
                    ),
                }),
                ..none()
            },
        ),
        unit(
            "shifter",
            100,
            Fixed::ONE,
            AbilityLoadoutData {
                mode: Some(ModeData {
                    primary: "assault".to_string(),
                    secondary: "artillery".to_string(),
                    switch_time: 45,
                    cooldown: 30,
                    switching: Some("switching".to_string()),
                }),
                ..none()
            },
        ),
        unit(
            "lancer",
            110,
            Fixed::from_num(2),
            AbilityLoadoutData {
                charge: Some(ChargeData {
                    range: Fixed::from_num(2),
                    leash: Fixed::from_num(12),
                    charge_time: 30,
                    cooldown: 300,
                    cost: 25,
                    damage: 80,
                    statuses: phases(None, None, Some("charging"), None, None),
                }),
                ..none()
            },
        ),
        unit(
            "phantom",
            70,
            Fixed::ONE,
            AbilityLoadoutData {
                cloak: Some(CloakData {
                    fade_in: 30,
                    fade_out: 30,
                    cooldown: 120,
                    min_resources: 20,
                    drain: 1,
                    drain_interval: 10,
                    statuses: phases(
                        None,
                        None,
                        Some("fading_in"),
                        Some("cloaked"),
                        Some("fading_out"),
                    ),
                }),
                ..none()
            },
        ),
        unit(
            "engineer",
            80,
            Fixed::ONE,
            AbilityLoadoutData {
                turret: Some(TurretData {
                    turret: "sentry".to_string(),
                    assemble_time: 120,
                    pack_time: 60,
                    cooldown: 90,
                    statuses: phases(
                        None,
                        None,
                        Some("assembling"),
                        Some("turret_deployed"),
                        Some("packing"),
                    ),
                }),
                ..none()
            },
        ),
        UnitTypeData {
            hit_radius: Fixed::ONE,
            ..unit("sentry", 120, Fixed::ZERO, none())
        },
    ]
}

/// The built-in content in data form.
#[must_use]
pub fn builtin_data() -> ContentData {
    let mut statuses = elemental_statuses();
    statuses.extend(phase_statuses());
    ContentData {
        statuses,
        units: units(),
    }
}

/// The built-in content, resolved.
///
/// # Errors
///
/// Only fails if the built-in tables are inconsistent.
pub fn builtin() -> Result<Content> {
    builtin_data().resolve()
}
