//! Game settings and level-start configuration
//!
//! Both are plain serde structs; the save collaborator owns where they are
//! stored, this module only owns their shape and JSON form.

use serde::{Deserialize, Serialize};

use crate::consts::BOSS_LEVEL;
use crate::sim::state::{UTILITY_SLOTS, UtilitySlot};
use crate::weapon::{Loadout, Weapon};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub music_enabled: bool,
    pub sfx_enabled: bool,
    /// Free crafting in the external economy. Never changes simulation rules.
    pub dev_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sfx_enabled: true,
            dev_mode: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything the caller provides when a level attempt starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub chapter: u32,
    pub level: u32,
    pub starting_scrap: u32,
    pub starting_cores: u32,
    pub loadout: Loadout,
    pub selected_weapon: usize,
    pub utilities: [UtilitySlot; UTILITY_SLOTS],
    pub settings: Settings,
    /// Player sprite color (0xRRGGBB)
    pub accent_color: u32,
    /// Seed for all gameplay randomness in this attempt
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            chapter: 1,
            level: 1,
            starting_scrap: 250,
            starting_cores: 5,
            loadout: [Some(Weapon::starter()), None, None],
            selected_weapon: 0,
            utilities: [UtilitySlot::default(); UTILITY_SLOTS],
            settings: Settings::default(),
            accent_color: 0x3b82f6,
            seed: 0x5eed,
        }
    }
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp progression to valid ranges and point the selected slot at a weapon
    pub fn sanitized(mut self) -> Self {
        self.chapter = self.chapter.max(1);
        self.level = self.level.clamp(1, BOSS_LEVEL);

        let selected_ok = self
            .loadout
            .get(self.selected_weapon)
            .is_some_and(Option::is_some);
        if !selected_ok {
            self.selected_weapon = self.loadout.iter().position(Option::is_some).unwrap_or(0);
        }
        self
    }
}
