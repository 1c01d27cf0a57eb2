//! Combat resolution
//!
//! Runs after movement each frame, in a fixed order:
//! 1. enemy contact vs player (iframe gated)
//! 2. enemy projectiles vs player (not iframe gated)
//! 3. player projectiles vs enemies (first overlapping enemy takes the hit)
//! 4. dead enemy cleanup and loot
//! 5. collectible pickup
//!
//! Consumables are resolved here too, synchronously when the player asks.

use rand::Rng;

use super::collision::{overlaps, overlaps_padded};
use super::state::{
    Body, Burst, Collectible, CollectibleKind, ConsumableType, Enemy, EnemyKind, GameEvent,
    GamePhase, GameState, SpeedMode, FLASH_FRAMES,
};
use crate::audio::SoundCue;
use crate::consts::*;

pub const COLLECTIBLE_SIZE: f32 = 16.0;
pub const SCRAP_VALUE: u32 = 10;
pub const TANK_SCRAP_VALUE: u32 = 30;
pub const CORE_CHANCE: f32 = 0.05;
pub const TANK_CORE_CHANCE: f32 = 0.4;

const HIT_COLOR: u32 = 0xef4444;
const MEDKIT_COLOR: u32 = 0x22c55e;
const GRENADE_COLOR: u32 = 0xf97316;
/// Grenades take this fraction of a boss's max hp
const GRENADE_BOSS_FRACTION: i32 = 5;

/// Run the full combat pass for one frame
pub fn resolve_combat(state: &mut GameState) {
    resolve_contacts(state);
    resolve_enemy_projectiles(state);
    resolve_player_projectiles(state);
    cleanup_dead_enemies(state);
    collect_pickups(state);
}

/// Enemy bodies touching the player deal fixed damage, then grant iframes
pub fn resolve_contacts(state: &mut GameState) {
    if state.player.iframes > 0 {
        return;
    }
    let player = state.player.body;
    if !state.enemies.iter().any(|e| overlaps(&e.body, &player)) {
        return;
    }

    state.player.iframes = CONTACT_IFRAMES;
    state.spawn_particles(player.pos, HIT_COLOR, 15, Burst::Explosion);
    state.play(SoundCue::Hit);
    state.damage_player(CONTACT_DAMAGE);
}

/// Hostile projectiles hit regardless of iframes and are consumed
pub fn resolve_enemy_projectiles(state: &mut GameState) {
    let player = state.player.body;
    let mut hits = Vec::new();
    state.projectiles.retain(|p| {
        if !p.from_player && overlaps(&p.body, &player) {
            hits.push(p.damage);
            false
        } else {
            true
        }
    });

    for damage in hits {
        state.spawn_particles(player.pos, HIT_COLOR, 10, Burst::Hit);
        state.play(SoundCue::Hit);
        state.damage_player(damage);
    }
}

/// Each player projectile damages the first overlapping enemy and is consumed
pub fn resolve_player_projectiles(state: &mut GameState) {
    let enemies = &mut state.enemies;
    let mut impacts = Vec::new();
    state.projectiles.retain(|p| {
        if !p.from_player {
            return true;
        }
        match enemies.iter_mut().find(|e| overlaps(&p.body, &e.body)) {
            Some(enemy) => {
                enemy.hp -= p.damage;
                impacts.push((enemy.body.center(), enemy.color));
                false
            }
            None => true,
        }
    });

    for (pos, color) in impacts {
        state.spawn_particles(pos, color, 3, Burst::Hit);
    }
}

/// Remove every enemy at hp <= 0, dropping exactly one collectible each
pub fn cleanup_dead_enemies(state: &mut GameState) {
    if !state.enemies.iter().any(Enemy::is_dead) {
        return;
    }
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
        std::mem::take(&mut state.enemies).into_iter().partition(|e| e.is_dead());
    state.enemies = alive;

    for enemy in dead {
        let center = enemy.body.center();
        state.spawn_particles(center, enemy.color, 20, Burst::Explosion);
        state.play(SoundCue::Explosion);

        let (kind, value) = roll_loot(state, &enemy.kind);
        let id = state.next_entity_id();
        state.collectibles.push(Collectible {
            id,
            kind,
            body: Body::new(
                center.x - COLLECTIBLE_SIZE / 2.0,
                center.y - COLLECTIBLE_SIZE / 2.0,
                COLLECTIBLE_SIZE,
                COLLECTIBLE_SIZE,
            ),
            value,
        });
        log::debug!("Enemy {} destroyed, dropped {:?} x{}", enemy.id, kind, value);

        if enemy.is_boss() {
            state.play(SoundCue::Explosion);
            complete_level(state, true);
        }
    }
}

fn roll_loot(state: &mut GameState, kind: &EnemyKind) -> (CollectibleKind, u32) {
    // Turbo only doubles the standard drop; tank scrap is fixed
    let (scrap, core_chance) = match kind {
        EnemyKind::Tank => (TANK_SCRAP_VALUE, TANK_CORE_CHANCE),
        _ if state.speed_mode == SpeedMode::Turbo => (SCRAP_VALUE * 2, CORE_CHANCE),
        _ => (SCRAP_VALUE, CORE_CHANCE),
    };
    if state.rng.random::<f32>() < core_chance {
        (CollectibleKind::Core, 1)
    } else {
        (CollectibleKind::Scrap, scrap)
    }
}

/// Pick up collectibles near the player
pub fn collect_pickups(state: &mut GameState) {
    let player = state.player.body;
    let mut picked = Vec::new();
    state.collectibles.retain(|c| {
        if overlaps_padded(&c.body, &player, PICKUP_PADDING) {
            picked.push((c.kind, c.value));
            false
        } else {
            true
        }
    });

    for (kind, value) in picked {
        match kind {
            CollectibleKind::Scrap => {
                state.player.scrap += value;
                state.level_scrap += value;
                state.emit(GameEvent::ScrapChanged(state.player.scrap));
                state.play(SoundCue::Click);
                if !state.is_boss_level() && state.level_scrap >= state.quota {
                    complete_level(state, false);
                }
            }
            CollectibleKind::Core => {
                state.player.cores += value;
                state.emit(GameEvent::CoresChanged(state.player.cores));
                state.play(SoundCue::Pickup);
            }
        }
    }
}

/// Use one charge from a utility slot. Returns false when nothing happened.
pub fn use_utility(state: &mut GameState, slot: usize) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    let Some(utility) = state.utilities.get(slot).copied() else {
        return false;
    };
    if !utility.is_usable() {
        return false;
    }

    let used = match utility.kind {
        ConsumableType::Medkit => apply_medkit(state),
        ConsumableType::Grenade => {
            detonate_grenade(state);
            true
        }
        ConsumableType::Empty => false,
    };
    if used {
        state.utilities[slot].consume();
        state.emit(GameEvent::UtilityConsumed { slot });
        log::debug!("Used {:?} from slot {}", utility.kind, slot);
    }
    used
}

/// Heal, capped at max hp. A medkit at full health is not spent.
fn apply_medkit(state: &mut GameState) -> bool {
    let player = &mut state.player;
    if player.hp >= player.max_hp {
        return false;
    }
    player.hp = (player.hp + MEDKIT_HEAL).min(player.max_hp);
    let hp = player.hp;
    let center = player.body.center();
    state.emit(GameEvent::HpChanged(hp));
    state.spawn_particles(center, MEDKIT_COLOR, 20, Burst::Hit);
    state.play(SoundCue::Pickup);
    true
}

/// Wipe roaming enemies and chip the boss, then flash the screen
fn detonate_grenade(state: &mut GameState) {
    state.play(SoundCue::Explosion);
    let centers: Vec<_> = state.enemies.iter().map(|e| e.body.center()).collect();
    for enemy in &mut state.enemies {
        if enemy.is_boss() {
            enemy.hp -= enemy.max_hp / GRENADE_BOSS_FRACTION;
        } else {
            enemy.hp = 0;
        }
    }
    for center in centers {
        state.spawn_particles(center, GRENADE_COLOR, 10, Burst::Explosion);
    }
    state.flash_frames = FLASH_FRAMES;
    state.emit(GameEvent::ScreenFlash);
    cleanup_dead_enemies(state);
}

fn complete_level(state: &mut GameState, boss: bool) {
    if state.phase != GamePhase::Playing {
        return;
    }
    log::info!(
        "Level {}-{} complete (boss: {}, scrap {}/{})",
        state.chapter,
        state.level,
        boss,
        state.level_scrap,
        state.quota
    );
    state.phase = GamePhase::LevelComplete;
    state.emit(GameEvent::LevelComplete { boss });
}
