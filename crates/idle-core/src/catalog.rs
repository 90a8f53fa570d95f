//! Built-in catalog shipped with the game.

use crate::{
    AchievementCondition, AchievementDef, AchievementId, Catalog, MinionSkin, ProducerDef,
    ProducerId, UpgradeDef, UpgradeId,
};

/// Id of the capstone producer in the built-in catalog.
pub const MOON_HEIST: &str = "moon_heist";

fn producer(
    id: &str,
    name: &str,
    description: &str,
    base_cost: f64,
    base_rate: f64,
    unlock_prestige_level: u32,
) -> ProducerDef {
    ProducerDef {
        id: ProducerId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        base_cost,
        base_rate,
        unlock_prestige_level,
        capstone: false,
    }
}

fn upgrade(
    id: &str,
    name: &str,
    cost: f64,
    multiplier: f64,
    unlock_total_threshold: f64,
    unlock_prestige_level: u32,
) -> UpgradeDef {
    UpgradeDef {
        id: UpgradeId::new(id),
        name: name.to_string(),
        description: format!("Click power x{multiplier}"),
        cost,
        multiplier,
        unlock_total_threshold,
        unlock_prestige_level,
        skin: None,
    }
}

fn achievement(id: &str, name: &str, description: &str, condition: AchievementCondition) -> AchievementDef {
    AchievementDef {
        id: AchievementId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        condition,
    }
}

fn total(threshold: f64) -> AchievementCondition {
    AchievementCondition::TotalBananas { threshold }
}

fn owned(producer: &str, count: u32) -> AchievementCondition {
    AchievementCondition::ProducerOwned {
        producer: ProducerId::new(producer),
        count,
    }
}

fn prestige(level: u32) -> AchievementCondition {
    AchievementCondition::PrestigeLevel { level }
}

/// The default catalog: seven producers, the moon heist capstone, eight
/// click upgrades and twelve achievements.
pub fn default_catalog() -> Catalog {
    let producers = vec![
        producer("minion_intern", "Minion Intern", "Peels bananas, slowly.", 15.0, 0.1, 0),
        producer("banana_tree", "Banana Tree", "Grows in the lair garden.", 100.0, 1.0, 0),
        producer("banana_farm", "Banana Farm", "Rows upon rows of yellow.", 1_100.0, 8.0, 0),
        producer("minion_lab", "Minion Lab", "Synthetic bananas, mostly safe.", 12_000.0, 47.0, 0),
        producer("rocket_factory", "Rocket Factory", "Ships bananas by air.", 130_000.0, 260.0, 0),
        producer("time_machine", "Time Machine", "Harvests tomorrow's bananas today.", 1_400_000.0, 1_400.0, 1),
        producer("shrink_ray", "Shrink Ray", "Fits a plantation in a pocket.", 20_000_000.0, 7_800.0, 2),
        ProducerDef {
            capstone: true,
            ..producer(
                MOON_HEIST,
                "Moon Heist",
                "Steal the moon. Then start over.",
                1_000_000_000.0,
                0.0,
                0,
            )
        },
    ];

    let upgrades = vec![
        upgrade("banana_peeler", "Banana Peeler", 100.0, 2.0, 50.0, 0),
        upgrade("golden_gloves", "Golden Gloves", 500.0, 2.0, 300.0, 0),
        UpgradeDef {
            description: "Click power x2. Minions turn purple.".to_string(),
            skin: Some(MinionSkin::Purple),
            ..upgrade("px41_serum", "PX-41 Serum", 5_000.0, 2.0, 2_500.0, 0)
        },
        upgrade("fart_gun", "Fart Gun", 50_000.0, 3.0, 20_000.0, 0),
        upgrade("freeze_ray", "Freeze Ray", 1_000_000.0, 3.0, 500_000.0, 0),
        upgrade("lipstick_taser", "Lipstick Taser", 25_000_000.0, 4.0, 10_000_000.0, 0),
        upgrade("moon_boots", "Moon Boots", 5_000_000.0, 5.0, 1_000_000.0, 1),
        upgrade("villain_con_pass", "Villain-Con Pass", 500_000_000.0, 10.0, 100_000_000.0, 3),
    ];

    let achievements = vec![
        achievement("first_bunch", "First Bunch", "Earn 100 bananas.", total(100.0)),
        achievement("banana_hoarder", "Banana Hoarder", "Earn 10,000 bananas.", total(10_000.0)),
        achievement("banana_baron", "Banana Baron", "Earn 1,000,000 bananas.", total(1_000_000.0)),
        achievement("banana_empire", "Banana Empire", "Earn 1,000,000,000 bananas.", total(1e9)),
        achievement("intern_army", "Intern Army", "Own 10 Minion Interns.", owned("minion_intern", 10)),
        achievement("orchard", "Orchard", "Own 25 Banana Trees.", owned("banana_tree", 25)),
        achievement("agribusiness", "Agribusiness", "Own 25 Banana Farms.", owned("banana_farm", 25)),
        achievement("mad_science", "Mad Science", "Own 10 Minion Labs.", owned("minion_lab", 10)),
        achievement("liftoff", "Liftoff", "Own 5 Rocket Factories.", owned("rocket_factory", 5)),
        achievement("reborn", "Reborn", "Complete a rebirth.", prestige(1)),
        achievement("serial_villain", "Serial Villain", "Reach prestige level 5.", prestige(5)),
        achievement("to_infinity", "To Infinity", "Reach prestige level 10.", prestige(10)),
    ];

    Catalog {
        producers,
        upgrades,
        achievements,
    }
}
