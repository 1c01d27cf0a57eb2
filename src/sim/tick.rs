//! Fixed-step simulation tick
//!
//! One call advances the attempt by exactly one frame, in a fixed order:
//! input -> player move -> fire -> roaming spawn -> boss spawn -> world scroll
//! and entity movement -> combat -> iframe countdown.

use rand::Rng;

use super::boss::{spawn_boss, update_boss};
use super::collision::{blocked_at, bounce_in_band, clamp_to_band};
use super::combat::resolve_combat;
use super::state::{
    Body, Enemy, EnemyKind, GamePhase, GameState, Obstacle, ObstacleKind, Projectile,
    ProjectileVisual, ENEMY_COLOR,
};
use super::world::{OBSTACLE_HP, OBSTACLE_SIZE, OBSTACLE_SPAWN_Y, obstacle_for_block, obstacle_x};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::weapon::CoreType;

/// Roaming enemies spawn just above the top edge
pub const ENEMY_SPAWN_Y: f32 = -60.0;
/// Fraction of the scroll speed added to roaming enemy descent
pub const ENEMY_SCROLL_FACTOR: f32 = 0.5;
/// Beam cores fire faster than the barrel speed
pub const BEAM_SPEED_MULT: f32 = 1.5;
/// Projectile width for player shots
pub const SHOT_WIDTH: f32 = 4.0;

/// Input sampled for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Active touch x in playfield coordinates
    pub touch_x: Option<f32>,
    /// Pause gate: when set the tick does nothing
    pub paused: bool,
}

impl TickInput {
    /// Horizontal direction in {-1, 0, 1}. Touch left of center steers left.
    pub fn direction(&self) -> f32 {
        let half = GAME_WIDTH / 2.0;
        if self.left || self.touch_x.is_some_and(|x| x < half) {
            -1.0
        } else if self.right || self.touch_x.is_some_and(|x| x >= half) {
            1.0
        } else {
            0.0
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.paused || state.phase != GamePhase::Playing {
        return;
    }

    state.frame_count += 1;

    move_player(state, input);
    fire_weapon(state);
    spawn_roaming_enemy(state);
    spawn_boss_when_due(state);

    let scroll = state.effective_scroll();
    advance_world(state, scroll);
    advance_enemies(state, scroll);
    advance_projectiles(state);
    advance_particles(state);
    advance_collectibles(state, scroll);

    resolve_combat(state);

    state.player.iframes = state.player.iframes.saturating_sub(1);
    state.flash_frames = state.flash_frames.saturating_sub(1);
}

/// Steer, clamp into the road, and refuse moves into obstacles
fn move_player(state: &mut GameState, input: &TickInput) {
    let dir = input.direction();
    state.player.body.vel.x = dir;

    let body = state.player.body;
    let next_x = clamp_to_band(body.pos.x + dir * PLAYER_SPEED, body.size.x);
    if !blocked_at(&body, next_x, state.obstacles.iter().map(|o| &o.body)) {
        state.player.body.pos.x = next_x;
    }
}

/// Projectile offsets (x, vx) for each core's fire pattern
fn shot_pattern(core: CoreType) -> &'static [(f32, f32)] {
    match core {
        CoreType::Blaster | CoreType::Beam => &[(0.0, 0.0)],
        CoreType::Scatter => &[(-6.0, -2.0), (0.0, 0.0), (6.0, 2.0)],
    }
}

/// Fire the selected weapon if its cooldown allows
pub fn fire_weapon(state: &mut GameState) {
    let Some(weapon) = state.current_weapon() else {
        return;
    };
    let parts = weapon.parts;
    let stats = weapon.stats();

    if !state.weapon_gate.try_fire(state.frame_count, stats.cooldown) {
        return;
    }

    // Muzzle sits at the tip of the gun drawn on the vehicle's right side
    let player = state.player.body;
    let gun_w = stats.gun_width * 1.5;
    let gun_h = stats.gun_length * 1.3;
    let gun_x = player.pos.x + player.vel.x * 2.0 + player.size.x - 6.0;
    let gun_y = player.pos.y + (state.frame_count as f32 / 15.0).sin() * 3.0 + 8.0;
    let tip_x = gun_x + gun_w / 2.0;
    let tip_y = gun_y - gun_h;

    let (speed, visual) = match parts.core {
        CoreType::Beam => (stats.speed * BEAM_SPEED_MULT, ProjectileVisual::Beam),
        _ => (stats.speed, ProjectileVisual::Ammo(parts.ammo)),
    };

    state.play(SoundCue::Shoot);
    for &(offset_x, vx) in shot_pattern(parts.core) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            body: Body::new(
                tip_x - SHOT_WIDTH / 2.0 + offset_x,
                tip_y,
                SHOT_WIDTH,
                stats.gun_length,
            )
            .with_vel(vx, -speed),
            damage: stats.damage,
            color: stats.color,
            from_player: true,
            explosive: stats.explosive,
            life: stats.range_life,
            visual,
        });
    }
}

/// Periodic weighted-random roaming spawn
fn spawn_roaming_enemy(state: &mut GameState) {
    if state.boss_spawned {
        return;
    }
    // On boss levels the roamers stop once the boss is due
    if state.is_boss_level() && state.level_scrap >= state.quota {
        return;
    }
    if state.frame_count % state.spawn_interval() != 0 {
        return;
    }

    let chapter = state.chapter as i32;
    let roll: f32 = state.rng.random();
    let (kind, hp, size, vy) = if roll > 0.95 {
        (EnemyKind::Tank, 80 * chapter, 48.0, 0.5)
    } else if roll > 0.7 {
        (EnemyKind::Fast, 10 * chapter, 24.0, 2.5)
    } else {
        (EnemyKind::Basic, 20 * chapter, 32.0, 1.0)
    };

    let road = PLAY_AREA_MAX_X - PLAY_AREA_MIN_X;
    let x = PLAY_AREA_MIN_X + state.rng.random::<f32>() * (road - size);
    let vx = (state.rng.random::<f32>() - 0.5) * 1.5;
    let flip_x = state.rng.random_bool(0.5);

    let id = state.next_entity_id();
    log::debug!("Spawned {:?} #{} at x={:.1}", kind, id, x);
    state.enemies.push(Enemy {
        id,
        kind,
        body: Body::new(x, ENEMY_SPAWN_Y, size, size).with_vel(vx, vy),
        hp,
        max_hp: hp,
        color: ENEMY_COLOR,
        anim_frame: 0,
        anim_timer: 0,
        flip_x,
    });
}

/// Boss levels summon exactly one boss once the scrap quota is met
fn spawn_boss_when_due(state: &mut GameState) {
    if state.is_boss_level() && !state.boss_spawned && state.level_scrap >= state.quota {
        spawn_boss(state);
    }
}

/// Scroll the street, roll obstacles for new blocks, move obstacles
fn advance_world(state: &mut GameState, scroll: f32) {
    let new_block = state.world.advance(scroll);
    let side = match new_block {
        Some(block_id) if !state.boss_spawned => obstacle_for_block(block_id, state.seed),
        _ => None,
    };
    if let Some(side) = side {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::TrashCan,
            body: Body::new(obstacle_x(side), OBSTACLE_SPAWN_Y, OBSTACLE_SIZE, OBSTACLE_SIZE),
            hp: OBSTACLE_HP,
        });
    }

    for obstacle in &mut state.obstacles {
        obstacle.body.pos.y += scroll;
    }
    state.obstacles.retain(|o| {
        o.body.pos.y < GAME_HEIGHT && o.body.pos.x > -200.0 && o.body.pos.x < GAME_WIDTH + 200.0
    });
}

fn advance_enemies(state: &mut GameState, scroll: f32) {
    for i in 0..state.enemies.len() {
        if state.enemies[i].is_boss() {
            update_boss(state, i);
        } else {
            let body = &mut state.enemies[i].body;
            body.pos.y += body.vel.y + scroll * ENEMY_SCROLL_FACTOR;
            body.pos.x += body.vel.x;
            bounce_in_band(body);
        }
        state.enemies[i].animate();
    }

    state.enemies.retain(|e| {
        e.body.pos.y < GAME_HEIGHT + 100.0
            && e.body.pos.x > -100.0
            && e.body.pos.x < GAME_WIDTH + 100.0
    });
}

fn advance_projectiles(state: &mut GameState) {
    for p in &mut state.projectiles {
        p.body.advance();
        p.life = p.life.saturating_sub(1);
    }
    state
        .projectiles
        .retain(|p| p.body.pos.y > -100.0 && p.body.pos.y < GAME_HEIGHT && p.life > 0);
}

fn advance_particles(state: &mut GameState) {
    for p in &mut state.particles {
        p.pos += p.vel;
        p.life -= 1.0;
    }
    state.particles.retain(|p| p.life > 0.0);
}

/// Loot falls with its own speed plus the scroll
fn advance_collectibles(state: &mut GameState, scroll: f32) {
    for c in &mut state.collectibles {
        c.body.pos.y += c.body.vel.y + scroll;
    }
    state.collectibles.retain(|c| c.body.pos.y < GAME_HEIGHT);
}
