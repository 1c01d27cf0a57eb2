//! Scrap Runner - A top-down scrolling road shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, entities, combat, boss AI)
//! - `weapon`: Weapon parts and stat computation
//! - `controller`: Per-attempt driver bridging input/output collaborators
//! - `render`: Thin draw-list output stage
//! - `economy`: Progression and crafting rules used outside the simulation

pub mod audio;
pub mod controller;
pub mod economy;
pub mod render;
pub mod settings;
pub mod sim;
pub mod weapon;

pub use audio::{AudioManager, CueSink, SoundCue};
pub use controller::{GameController, Key, ProgressionHooks};
pub use settings::{LevelConfig, Settings};
pub use weapon::{AmmoType, BarrelType, CoreType, Weapon, WeaponParts, WeaponStats, compute_stats};

/// Game configuration constants
pub mod consts {
    /// Logical playfield
    pub const GAME_WIDTH: f32 = 400.0;
    pub const GAME_HEIGHT: f32 = 700.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 36.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_MAX_HP: i32 = 100;
    pub const PLAYER_START_Y: f32 = GAME_HEIGHT - 140.0;

    /// Street layout: buildings, then sidewalk, then the road
    pub const HOUSE_DEPTH: f32 = 85.0;
    pub const SIDEWALK_WIDTH: f32 = 35.0;
    pub const HOUSE_UNIT_HEIGHT: f32 = 140.0;
    pub const INTERSECTION_FREQUENCY: i64 = 6;

    /// Traversable band (the road)
    pub const PLAY_AREA_MIN_X: f32 = HOUSE_DEPTH + SIDEWALK_WIDTH;
    pub const PLAY_AREA_MAX_X: f32 = GAME_WIDTH - HOUSE_DEPTH - SIDEWALK_WIDTH;

    /// Scrolling
    pub const BASE_SCROLL_SPEED: f32 = 2.0;
    pub const TURBO_SCROLL_MULT: f32 = 2.0;

    /// Roaming enemy spawn interval in frames (halved in turbo)
    pub const SPAWN_INTERVAL_FRAMES: u64 = 80;

    /// Melee contact
    pub const CONTACT_DAMAGE: i32 = 10;
    pub const CONTACT_IFRAMES: u32 = 60;

    /// Collectible pickup margin around the player
    pub const PICKUP_PADDING: f32 = 10.0;

    /// Consumables
    pub const MAX_CONSUMABLE_STACK: u32 = 5;
    pub const MEDKIT_HEAL: i32 = 50;

    /// Level structure
    pub const BOSS_LEVEL: u32 = 10;
    pub const LAST_CHAPTER: u32 = 5;

    /// Real-time delay before level-complete is reported (ms)
    pub const BOSS_COMPLETE_DELAY_MS: f64 = 2000.0;
    pub const QUOTA_COMPLETE_DELAY_MS: f64 = 1500.0;
}

/// Scrap required to finish a non-boss level
#[inline]
pub fn level_quota(chapter: u32, level: u32) -> u32 {
    chapter * 100 + level * 20
}

/// Whether a level ends with a boss fight instead of a scrap quota
#[inline]
pub fn is_boss_level(level: u32) -> bool {
    level == consts::BOSS_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota() {
        assert_eq!(level_quota(1, 1), 120);
        assert_eq!(level_quota(3, 10), 500);
    }

    #[test]
    fn test_play_band() {
        assert_eq!(consts::PLAY_AREA_MIN_X, 120.0);
        assert_eq!(consts::PLAY_AREA_MAX_X, 280.0);
        assert!(is_boss_level(10));
        assert!(!is_boss_level(9));
    }
}
