//! Progression and crafting rules
//!
//! These run between level attempts, outside the simulation. `Progress` is
//! the run-wide wallet and unlock state; it also mirrors the simulation's
//! resource callbacks so a host can hand it to the controller directly.

use serde::{Deserialize, Serialize};

use crate::consts::{BOSS_LEVEL, LAST_CHAPTER};
use crate::controller::ProgressionHooks;
use crate::sim::state::{ConsumableType, UTILITY_SLOTS, UtilitySlot};
use crate::weapon::{AmmoType, BarrelType, CoreType, Loadout, WEAPON_SLOTS, Weapon, WeaponParts};

/// Upgrade cost per current weapon level
pub const XP_PER_LEVEL: u32 = 100;
/// Premium cost of crafting any weapon
pub const CRAFT_CORE_COST: u32 = 3;
/// Share of invested XP returned when a slot is re-crafted
pub const REFUND_RATE: f64 = 0.9;

pub const fn barrel_price(barrel: BarrelType) -> u32 {
    match barrel {
        BarrelType::Short => 200,
        BarrelType::Medium => 250,
        BarrelType::Long => 320,
    }
}

pub const fn core_price(core: CoreType) -> u32 {
    match core {
        CoreType::Blaster => 210,
        CoreType::Scatter => 150,
        CoreType::Beam => 300,
    }
}

pub const fn ammo_price(ammo: AmmoType) -> u32 {
    match ammo {
        AmmoType::Standard => 150,
        AmmoType::Explosive => 270,
        AmmoType::Incendiary => 320,
    }
}

/// Scrap price of one consumable (`None` for the empty marker)
pub const fn consumable_price(kind: ConsumableType) -> Option<u32> {
    match kind {
        ConsumableType::Medkit => Some(100),
        ConsumableType::Grenade => Some(75),
        ConsumableType::Empty => None,
    }
}

/// Scrap cost of crafting a weapon from `parts`
pub fn craft_scrap_cost(parts: WeaponParts) -> u32 {
    barrel_price(parts.barrel) + core_price(parts.core) + ammo_price(parts.ammo)
}

/// XP cost to take a weapon from `level` to `level + 1`
pub fn upgrade_cost(level: u32) -> u32 {
    level * XP_PER_LEVEL
}

/// XP returned when a weapon with `xp_invested` is replaced
pub fn recraft_refund(xp_invested: u32) -> u32 {
    (f64::from(xp_invested) * REFUND_RATE).floor() as u32
}

/// XP earned for finishing a level
pub fn level_xp_reward(chapter: u32, level: u32) -> u32 {
    level * 10 * chapter
}

/// Weapon slot `slot` opens once the player reaches chapter `slot + 1`
pub fn slot_unlocked(slot: usize, chapter: u32) -> bool {
    slot < WEAPON_SLOTS && (slot as u32) < chapter
}

/// Where the player goes after finishing `(chapter, level)`
///
/// A boss win opens the next chapter at level 1; the last chapter's boss and
/// the last regular level stay put.
pub fn next_level(chapter: u32, level: u32, boss: bool) -> (u32, u32) {
    if boss {
        if chapter < LAST_CHAPTER {
            (chapter + 1, 1)
        } else {
            (chapter, level)
        }
    } else if level < BOSS_LEVEL {
        (chapter, level + 1)
    } else {
        (chapter, level)
    }
}

/// Run-wide progression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub chapter: u32,
    pub level: u32,
    pub max_chapter: u32,
    pub max_level: u32,
    pub scrap: u32,
    pub cores: u32,
    pub xp: u32,
    pub hp: i32,
    pub loadout: Loadout,
    pub utilities: [UtilitySlot; UTILITY_SLOTS],
    /// One per chapter boss
    pub trophies: [bool; LAST_CHAPTER as usize],
    /// Crafting and shopping are free
    pub dev_mode: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            chapter: 1,
            level: 1,
            max_chapter: 1,
            max_level: 1,
            scrap: 250,
            cores: 5,
            xp: 0,
            hp: 100,
            loadout: [Some(Weapon::starter()), None, None],
            utilities: [UtilitySlot::default(); UTILITY_SLOTS],
            trophies: [false; LAST_CHAPTER as usize],
            dev_mode: false,
        }
    }
}

impl Progress {
    /// Award XP and move to the next level. Returns the XP gained.
    pub fn complete_level(&mut self, boss: bool) -> u32 {
        let reward = level_xp_reward(self.chapter, self.level);
        self.xp += reward;

        if boss {
            if let Some(trophy) = self.trophies.get_mut(self.chapter.saturating_sub(1) as usize) {
                *trophy = true;
            }
            if self.chapter == LAST_CHAPTER {
                log::info!("Final boss defeated");
            }
        }

        let (chapter, level) = next_level(self.chapter, self.level, boss);
        if chapter != self.chapter {
            self.max_chapter = self.max_chapter.max(chapter);
        } else {
            self.max_level = self.max_level.max(level);
        }
        self.chapter = chapter;
        self.level = level;
        log::info!("Progress: now at {}-{} (+{} XP)", chapter, level, reward);
        reward
    }

    /// Hard reset after a game over: back to level 1 of the current chapter
    pub fn reset_chapter(&mut self) {
        self.level = 1;
        self.hp = 100;
    }

    fn can_pay(&self, scrap: u32, cores: u32) -> bool {
        self.dev_mode || (self.scrap >= scrap && self.cores >= cores)
    }

    /// Craft `parts` into `slot`, replacing and refunding whatever was there.
    /// Returns the XP refunded, or `None` if locked or unaffordable.
    pub fn craft(&mut self, slot: usize, parts: WeaponParts, id: impl Into<String>) -> Option<u32> {
        if !self.dev_mode && !slot_unlocked(slot, self.chapter) {
            return None;
        }
        if slot >= WEAPON_SLOTS {
            return None;
        }
        let cost = craft_scrap_cost(parts);
        if !self.can_pay(cost, CRAFT_CORE_COST) {
            return None;
        }

        let refund = self.loadout[slot]
            .as_ref()
            .map(|w| recraft_refund(w.xp_invested))
            .unwrap_or(0);
        if !self.dev_mode {
            self.scrap -= cost;
            self.cores -= CRAFT_CORE_COST;
        }
        self.xp += refund;
        self.loadout[slot] = Some(Weapon::new(id, parts));
        log::debug!("Crafted {:?} into slot {} (refund {} XP)", parts, slot, refund);
        Some(refund)
    }

    /// Spend XP to raise a weapon's level
    pub fn upgrade(&mut self, slot: usize) -> bool {
        let dev_mode = self.dev_mode;
        let Some(weapon) = self.loadout.get_mut(slot).and_then(Option::as_mut) else {
            return false;
        };
        let cost = if dev_mode { 0 } else { upgrade_cost(weapon.level) };
        if self.xp < cost {
            return false;
        }
        self.xp -= cost;
        weapon.level += 1;
        weapon.xp_invested += cost;
        true
    }

    /// Buy one consumable into a utility slot
    pub fn buy_consumable(&mut self, slot: usize, kind: ConsumableType) -> bool {
        let Some(price) = consumable_price(kind) else {
            return false;
        };
        if !self.can_pay(price, 0) {
            return false;
        }
        let Some(utility) = self.utilities.get_mut(slot) else {
            return false;
        };
        if !utility.stock(kind) {
            return false;
        }
        if !self.dev_mode {
            self.scrap -= price;
        }
        true
    }
}

impl ProgressionHooks for Progress {
    fn hp_changed(&mut self, hp: i32) {
        self.hp = hp;
    }

    fn scrap_changed(&mut self, scrap: u32) {
        self.scrap = scrap;
    }

    fn cores_changed(&mut self, cores: u32) {
        self.cores = cores;
    }

    fn utility_consumed(&mut self, slot: usize) {
        if let Some(utility) = self.utilities.get_mut(slot) {
            utility.consume();
        }
    }

    fn level_complete(&mut self, boss: bool) {
        self.complete_level(boss);
    }
}
