//! Boss spawning and attack state machine
//!
//! ```text
//! (entry: descend) -> Idle -> ChargeLaser -> FireLaser -> Idle ...
//!                      \-> fireball volley -> Idle
//! ```
//!
//! The laser deals damage once, at the instant ChargeLaser turns into
//! FireLaser, and only if the player overlaps the beam locked at charge start.

use glam::Vec2;
use rand::Rng;

use super::collision::bounce_in_band;
use super::state::{
    Body, BossBrain, BossState, Burst, Enemy, EnemyKind, GameEvent, GameState, Projectile,
    ProjectileVisual,
};
use crate::audio::SoundCue;
use crate::consts::*;

pub const BOSS_SIZE: f32 = 100.0;
pub const BOSS_HP_PER_CHAPTER: i32 = 1500;
pub const BOSS_SPAWN_Y: f32 = -150.0;
/// The boss descends until its top reaches this y
pub const BOSS_ARENA_Y: f32 = 50.0;
pub const BOSS_ENTRY_SPEED: f32 = 1.0;
pub const BOSS_COLOR: u32 = 0xef4444;

pub const IDLE_DWELL_FRAMES: u32 = 100;
pub const CHARGE_FRAMES: u32 = 120;
pub const FIRE_FRAMES: u32 = 30;
/// Chance that an idle boss charges the laser instead of firing a volley
pub const LASER_CHANCE: f32 = 0.6;
pub const LASER_WIDTH: f32 = 60.0;
/// Fraction of the player's max hp taken by a laser hit
pub const LASER_DAMAGE_FRACTION: f32 = 0.5;

pub const DRIFT_PERIOD: f32 = 50.0;
pub const DRIFT_AMPLITUDE: f32 = 1.5;

pub const FIREBALL_SIZE: f32 = 16.0;
pub const FIREBALL_DAMAGE: i32 = 20;
pub const FIREBALL_LIFE: u32 = 200;
pub const FIREBALL_COLOR: u32 = 0xf97316;
pub const FIREBALL_SPREAD: f32 = 0.2;

/// Replace every roaming enemy with the chapter boss
pub fn spawn_boss(state: &mut GameState) {
    let hp = BOSS_HP_PER_CHAPTER * state.chapter as i32;
    let id = state.next_entity_id();
    state.enemies.clear();
    state.enemies.push(Enemy {
        id,
        kind: EnemyKind::Boss(BossBrain::default()),
        body: Body::new(GAME_WIDTH / 2.0 - BOSS_SIZE / 2.0, BOSS_SPAWN_Y, BOSS_SIZE, BOSS_SIZE)
            .with_vel(0.0, BOSS_ENTRY_SPEED),
        hp,
        max_hp: hp,
        color: BOSS_COLOR,
        anim_frame: 0,
        anim_timer: 0,
        flip_x: false,
    });
    state.boss_spawned = true;
    state.play(SoundCue::BossRoar);
    state.emit(GameEvent::BossSpawned);
    log::info!("Boss spawned for chapter {} with {} hp", state.chapter, hp);
}

/// Things the boss wants done this frame that touch the rest of the state
enum BossAction {
    None,
    Volley { origin: Vec2, muzzle: Vec2 },
    Laser { beam_x: f32 },
}

/// Advance the boss at `index` by one frame
pub fn update_boss(state: &mut GameState, index: usize) {
    let frame = state.frame_count;
    let player_center_x = state.player.body.pos.x + PLAYER_SIZE / 2.0;
    let roll: f32 = state.rng.random();

    let Some(boss) = state.enemies.get_mut(index) else {
        return;
    };
    let EnemyKind::Boss(brain) = &mut boss.kind else {
        return;
    };
    let body = &mut boss.body;

    // Entry: no attacks until the boss is in the arena
    if body.pos.y < BOSS_ARENA_Y {
        body.pos.y += BOSS_ENTRY_SPEED;
        return;
    }

    brain.timer += 1;

    let action = match brain.state {
        BossState::Idle => {
            body.pos.x += (frame as f32 / DRIFT_PERIOD).sin() * DRIFT_AMPLITUDE;
            if brain.timer > IDLE_DWELL_FRAMES {
                brain.timer = 0;
                if roll < LASER_CHANCE {
                    brain.state = BossState::ChargeLaser;
                    brain.laser_x = Some(player_center_x);
                    BossAction::None
                } else {
                    BossAction::Volley {
                        origin: body.pos + Vec2::splat(BOSS_SIZE / 2.0),
                        muzzle: Vec2::new(
                            body.pos.x + BOSS_SIZE / 2.0,
                            body.pos.y + BOSS_SIZE * 0.8,
                        ),
                    }
                }
            } else {
                BossAction::None
            }
        }
        BossState::ChargeLaser => {
            if brain.timer > CHARGE_FRAMES {
                brain.state = BossState::FireLaser;
                brain.timer = 0;
                BossAction::Laser {
                    beam_x: brain.laser_x.unwrap_or(player_center_x),
                }
            } else {
                BossAction::None
            }
        }
        BossState::FireLaser => {
            if brain.timer > FIRE_FRAMES {
                brain.state = BossState::Idle;
                brain.timer = 0;
            }
            BossAction::None
        }
    };
    bounce_in_band(body);

    match action {
        BossAction::None => {}
        BossAction::Volley { origin, muzzle } => fire_volley(state, origin, muzzle),
        BossAction::Laser { beam_x } => discharge_laser(state, beam_x),
    }
}

/// Aimed spread of fireballs, `3 + chapter` wide
fn fire_volley(state: &mut GameState, origin: Vec2, muzzle: Vec2) {
    state.play(SoundCue::Shoot);
    let target = state.player.body.pos;
    let aim = (target.y - origin.y).atan2(target.x - origin.x);
    let count = 3 + state.chapter;
    let speed = 3.0 + state.chapter as f32;

    for i in 0..count {
        let angle = aim + (i as f32 * FIREBALL_SPREAD - 0.3);
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            body: Body::new(muzzle.x, muzzle.y, FIREBALL_SIZE, FIREBALL_SIZE)
                .with_vel(angle.cos() * speed, angle.sin() * speed),
            damage: FIREBALL_DAMAGE,
            color: FIREBALL_COLOR,
            from_player: false,
            explosive: false,
            life: FIREBALL_LIFE,
            visual: ProjectileVisual::Fireball,
        });
    }
    log::debug!("Boss volley: {count} fireballs");
}

/// Single instantaneous beam check against the locked x band
fn discharge_laser(state: &mut GameState, beam_x: f32) {
    state.play(SoundCue::Laser);
    if !in_beam(&state.player.body, beam_x) {
        log::debug!("Boss laser missed at x={beam_x}");
        return;
    }
    let damage = (state.player.max_hp as f32 * LASER_DAMAGE_FRACTION) as i32;
    let pos = state.player.body.pos;
    state.spawn_particles(pos, BOSS_COLOR, 30, Burst::Explosion);
    state.damage_player(damage);
}

/// Does `body` overlap the beam band centred on `beam_x`?
pub fn in_beam(body: &Body, beam_x: f32) -> bool {
    body.pos.x < beam_x + LASER_WIDTH / 2.0 && body.right() > beam_x - LASER_WIDTH / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;
    use crate::sim::state::GamePhase;

    fn boss_level() -> GameState {
        let config = LevelConfig {
            chapter: 2,
            level: BOSS_LEVEL,
            ..LevelConfig::default()
        };
        let mut state = GameState::new(&config);
        spawn_boss(&mut state);
        state.drain_events();
        state
    }

    fn brain(state: &GameState) -> BossBrain {
        match &state.enemies[0].kind {
            EnemyKind::Boss(brain) => brain.clone(),
            other => panic!("expected boss, got {other:?}"),
        }
    }

    fn set_brain(state: &mut GameState, new: BossBrain) {
        if let EnemyKind::Boss(brain) = &mut state.enemies[0].kind {
            *brain = new;
        }
    }

    fn park_in_arena(state: &mut GameState) {
        state.enemies[0].body.pos.y = BOSS_ARENA_Y;
    }

    #[test]
    fn test_spawn_clears_roamers_and_scales_hp() {
        let state = boss_level();
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].is_boss());
        assert_eq!(state.enemies[0].hp, 3000);
        assert!(state.boss_spawned);
        assert_eq!(state.effective_scroll(), 0.0);
    }

    #[test]
    fn test_entry_descends_without_attacking() {
        let mut state = boss_level();
        let start_y = state.enemies[0].body.pos.y;
        update_boss(&mut state, 0);
        assert_eq!(state.enemies[0].body.pos.y, start_y + BOSS_ENTRY_SPEED);
        assert_eq!(brain(&state).timer, 0);
    }

    #[test]
    fn test_idle_branches_after_dwell() {
        let mut state = boss_level();
        park_in_arena(&mut state);
        for _ in 0..=IDLE_DWELL_FRAMES {
            update_boss(&mut state, 0);
        }
        let b = brain(&state);
        assert_eq!(b.timer, 0);
        match b.state {
            BossState::ChargeLaser => assert!(b.laser_x.is_some()),
            BossState::Idle => assert_eq!(state.projectiles.len(), 3 + 2),
            BossState::FireLaser => panic!("idle never jumps straight to firing"),
        }
    }

    #[test]
    fn test_laser_miss_leaves_hp_unchanged() {
        let mut state = boss_level();
        park_in_arena(&mut state);
        state.player.body.pos.x = PLAY_AREA_MIN_X;
        set_brain(
            &mut state,
            BossBrain {
                state: BossState::ChargeLaser,
                timer: CHARGE_FRAMES,
                laser_x: Some(PLAY_AREA_MAX_X - 10.0),
            },
        );

        update_boss(&mut state, 0);
        assert_eq!(brain(&state).state, BossState::FireLaser);
        assert_eq!(state.player.hp, 100);
    }

    #[test]
    fn test_laser_hit_takes_half_max_hp() {
        let mut state = boss_level();
        park_in_arena(&mut state);
        let beam_x = state.player.body.center().x;
        set_brain(
            &mut state,
            BossBrain {
                state: BossState::ChargeLaser,
                timer: CHARGE_FRAMES,
                laser_x: Some(beam_x),
            },
        );

        update_boss(&mut state, 0);
        assert_eq!(state.player.hp, 50);
        assert!(state.drain_events().contains(&GameEvent::Sound(SoundCue::Laser)));

        // Firing state does no further damage
        for _ in 0..FIRE_FRAMES {
            update_boss(&mut state, 0);
        }
        assert_eq!(state.player.hp, 50);
        update_boss(&mut state, 0);
        assert_eq!(brain(&state).state, BossState::Idle);
    }

    #[test]
    fn test_second_laser_hit_is_fatal() {
        let mut state = boss_level();
        park_in_arena(&mut state);
        state.player.hp = 50;
        let beam_x = state.player.body.center().x;
        set_brain(
            &mut state,
            BossBrain {
                state: BossState::ChargeLaser,
                timer: CHARGE_FRAMES,
                laser_x: Some(beam_x),
            },
        );
        update_boss(&mut state, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_boss_stays_in_band() {
        let mut state = boss_level();
        park_in_arena(&mut state);
        for _ in 0..2000 {
            update_boss(&mut state, 0);
            let body = &state.enemies[0].body;
            assert!(body.pos.x >= PLAY_AREA_MIN_X);
            assert!(body.right() <= PLAY_AREA_MAX_X);
        }
    }

    #[test]
    fn test_in_beam() {
        let body = Body::new(150.0, 0.0, 36.0, 36.0);
        assert!(in_beam(&body, 168.0));
        assert!(in_beam(&body, 215.0));
        assert!(!in_beam(&body, 216.0));
        assert!(!in_beam(&body, 120.0));
    }
}
