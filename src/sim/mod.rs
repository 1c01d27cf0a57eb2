//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call to `tick` is one frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or wall-clock dependencies

pub mod boss;
pub mod collision;
pub mod combat;
pub mod state;
pub mod tick;
pub mod world;

pub use boss::{spawn_boss, update_boss};
pub use combat::{resolve_combat, use_utility};
pub use state::{
    Body, BossBrain, BossState, Collectible, CollectibleKind, ConsumableType, Enemy, EnemyKind,
    GameEvent, GamePhase, GameState, Obstacle, Particle, Player, Projectile, ProjectileVisual,
    SpeedMode, UtilitySlot, UTILITY_SLOTS,
};
pub use tick::{TickInput, tick};
pub use world::{BlockLayout, WorldScroll, block_layout};
