//! Draw-list output stage
//!
//! Turns a `GameState` into a flat list of primitives in playfield
//! coordinates, back to front. The host rasterizes them however it likes.
//! Nothing here feeds back into the simulation.

use glam::Vec2;

use crate::consts::*;
use crate::sim::boss::LASER_WIDTH;
use crate::sim::state::{
    BossState, CollectibleKind, EnemyKind, GameState, ProjectileVisual, SpeedMode,
};
use crate::sim::world::{BlockLayout, Building, block_layout, traffic_light_color};

const ROAD_COLOR: u32 = 0x262626;
const SIDEWALK_COLOR: u32 = 0x737373;
const LANE_COLOR: u32 = 0xfacc15;
const CROSSWALK_COLOR: u32 = 0xe5e5e5;
const VENT_COLOR: u32 = 0x27272a;
const HP_BAR_BG: u32 = 0x450a0a;
const HP_BAR_FG: u32 = 0xef4444;
const LASER_COLOR: u32 = 0xf43f5e;
const TEXT_COLOR: u32 = 0xffffff;

/// Sprite sheets the host is expected to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    Basic,
    Fast,
    Tank,
    Boss,
    TrashCan,
    Scrap,
    Core,
    Fireball,
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        pos: Vec2,
        size: Vec2,
        color: [f32; 4],
    },
    Sprite {
        kind: SpriteKind,
        pos: Vec2,
        size: Vec2,
        frame: u8,
        flip_x: bool,
        tint: [f32; 4],
    },
    /// Vertical beam from `top` to the bottom of the screen
    Beam {
        center_x: f32,
        top: f32,
        width: f32,
        color: [f32; 4],
    },
    Text {
        pos: Vec2,
        text: String,
        color: [f32; 4],
    },
}

/// Convert 0xRRGGBB to linear-ish RGBA floats
pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

fn rect(list: &mut Vec<DrawCmd>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    list.push(DrawCmd::Rect {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
        color,
    });
}

/// Build the draw list for one frame. `now_ms` only drives cosmetic blinking.
pub fn draw_frame(state: &GameState, now_ms: f64) -> Vec<DrawCmd> {
    let mut list = Vec::with_capacity(
        64 + state.enemies.len() + state.projectiles.len() + state.particles.len(),
    );

    rect(&mut list, 0.0, 0.0, GAME_WIDTH, GAME_HEIGHT, rgba(ROAD_COLOR, 1.0));
    draw_scenery(&mut list, state, now_ms);
    draw_entities(&mut list, state);
    draw_hud(&mut list, state);

    if state.flash_frames > 0 {
        rect(&mut list, 0.0, 0.0, GAME_WIDTH, GAME_HEIGHT, rgba(0xffffff, 0.8));
    }
    list
}

fn draw_scenery(list: &mut Vec<DrawCmd>, state: &GameState, now_ms: f64) {
    for row in state.world.visible_rows() {
        let y = row.draw_y;
        match block_layout(row.block_id) {
            BlockLayout::Intersection => {
                // Zebra stripes across the road at both edges of the block
                let stripe_w = 12.0;
                let mut x = PLAY_AREA_MIN_X;
                while x < PLAY_AREA_MAX_X {
                    rect(list, x, y + 4.0, stripe_w / 2.0, 18.0, rgba(CROSSWALK_COLOR, 1.0));
                    rect(
                        list,
                        x,
                        y + HOUSE_UNIT_HEIGHT - 22.0,
                        stripe_w / 2.0,
                        18.0,
                        rgba(CROSSWALK_COLOR, 1.0),
                    );
                    x += stripe_w;
                }
                let light = rgba(traffic_light_color(now_ms), 1.0);
                rect(list, PLAY_AREA_MIN_X - 14.0, y + 24.0, 8.0, 8.0, light);
                rect(list, PLAY_AREA_MAX_X + 6.0, y + HOUSE_UNIT_HEIGHT - 32.0, 8.0, 8.0, light);
            }
            BlockLayout::Street { left, right } => {
                rect(
                    list,
                    HOUSE_DEPTH,
                    y,
                    SIDEWALK_WIDTH,
                    HOUSE_UNIT_HEIGHT,
                    rgba(SIDEWALK_COLOR, 1.0),
                );
                rect(
                    list,
                    PLAY_AREA_MAX_X,
                    y,
                    SIDEWALK_WIDTH,
                    HOUSE_UNIT_HEIGHT,
                    rgba(SIDEWALK_COLOR, 1.0),
                );
                draw_building(list, &left, 0.0, y, false);
                draw_building(list, &right, GAME_WIDTH - HOUSE_DEPTH, y, true);
                // Center lane dashes
                rect(list, GAME_WIDTH / 2.0 - 2.0, y + 30.0, 4.0, 40.0, rgba(LANE_COLOR, 0.8));
                rect(list, GAME_WIDTH / 2.0 - 2.0, y + 100.0, 4.0, 40.0, rgba(LANE_COLOR, 0.8));
            }
        }
    }
}

/// Wall fills the lot; the roof is inset toward the road by the trims
fn draw_building(list: &mut Vec<DrawCmd>, building: &Building, x: f32, y: f32, road_on_left: bool) {
    rect(list, x, y, HOUSE_DEPTH, HOUSE_UNIT_HEIGHT, rgba(building.wall_color, 1.0));

    let roof_w = HOUSE_DEPTH - building.width_trim - 4.0;
    let roof_h = HOUSE_UNIT_HEIGHT - building.height_trim - 8.0;
    let roof_x = if road_on_left {
        x + building.width_trim + 4.0
    } else {
        x
    };
    let roof_y = y + building.height_trim / 2.0 + 4.0;
    rect(list, roof_x, roof_y, roof_w, roof_h, rgba(building.roof_color, 1.0));

    if building.vent {
        rect(
            list,
            roof_x + roof_w / 2.0 - 8.0,
            roof_y + roof_h / 2.0 - 8.0,
            16.0,
            16.0,
            rgba(VENT_COLOR, 1.0),
        );
    }
}

fn draw_entities(list: &mut Vec<DrawCmd>, state: &GameState) {
    for obstacle in &state.obstacles {
        list.push(DrawCmd::Sprite {
            kind: SpriteKind::TrashCan,
            pos: obstacle.body.pos,
            size: obstacle.body.size,
            frame: 0,
            flip_x: false,
            tint: rgba(0xffffff, 1.0),
        });
    }

    for c in &state.collectibles {
        let (kind, color) = match c.kind {
            CollectibleKind::Scrap => (SpriteKind::Scrap, 0xa3a3a3),
            CollectibleKind::Core => (SpriteKind::Core, 0x22d3ee),
        };
        list.push(DrawCmd::Sprite {
            kind,
            pos: c.body.pos,
            size: c.body.size,
            frame: 0,
            flip_x: false,
            tint: rgba(color, 1.0),
        });
    }

    for enemy in &state.enemies {
        let kind = match &enemy.kind {
            EnemyKind::Basic => SpriteKind::Basic,
            EnemyKind::Fast => SpriteKind::Fast,
            EnemyKind::Tank => SpriteKind::Tank,
            EnemyKind::Boss(brain) => {
                if let Some(beam_x) = brain.laser_x {
                    match brain.state {
                        BossState::ChargeLaser => list.push(DrawCmd::Beam {
                            center_x: beam_x,
                            top: enemy.body.bottom(),
                            width: 2.0,
                            color: rgba(LASER_COLOR, 0.5),
                        }),
                        BossState::FireLaser => list.push(DrawCmd::Beam {
                            center_x: beam_x,
                            top: enemy.body.bottom(),
                            width: LASER_WIDTH,
                            color: rgba(LASER_COLOR, 0.9),
                        }),
                        BossState::Idle => {}
                    }
                }
                SpriteKind::Boss
            }
        };
        list.push(DrawCmd::Sprite {
            kind,
            pos: enemy.body.pos,
            size: enemy.body.size,
            frame: enemy.anim_frame,
            flip_x: enemy.flip_x,
            tint: rgba(enemy.color, 1.0),
        });

        if enemy.is_boss() {
            let fraction = (enemy.hp.max(0) as f32 / enemy.max_hp.max(1) as f32).min(1.0);
            let bar_w = GAME_WIDTH - 40.0;
            rect(list, 20.0, 12.0, bar_w, 8.0, rgba(HP_BAR_BG, 1.0));
            rect(list, 20.0, 12.0, bar_w * fraction, 8.0, rgba(HP_BAR_FG, 1.0));
        }
    }

    draw_player(list, state);

    for p in &state.projectiles {
        match p.visual {
            ProjectileVisual::Fireball => list.push(DrawCmd::Sprite {
                kind: SpriteKind::Fireball,
                pos: p.body.pos,
                size: p.body.size,
                frame: 0,
                flip_x: false,
                tint: rgba(p.color, 1.0),
            }),
            ProjectileVisual::Beam => list.push(DrawCmd::Rect {
                pos: p.body.pos - Vec2::new(1.0, 0.0),
                size: p.body.size + Vec2::new(2.0, 0.0),
                color: rgba(p.color, 0.7),
            }),
            ProjectileVisual::Ammo(_) => list.push(DrawCmd::Rect {
                pos: p.body.pos,
                size: p.body.size,
                color: rgba(p.color, 1.0),
            }),
        }
    }

    for particle in &state.particles {
        let alpha = (particle.life / 40.0).clamp(0.0, 1.0);
        list.push(DrawCmd::Rect {
            pos: particle.pos,
            size: Vec2::splat(particle.size),
            color: rgba(particle.color, alpha),
        });
    }
}

fn draw_player(list: &mut Vec<DrawCmd>, state: &GameState) {
    let player = &state.player;
    // Blink while invulnerable
    let alpha = if player.iframes > 0 && (player.iframes / 4) % 2 == 0 {
        0.4
    } else {
        1.0
    };
    list.push(DrawCmd::Sprite {
        kind: SpriteKind::Player,
        pos: player.body.pos,
        size: player.body.size,
        frame: 0,
        flip_x: player.body.vel.x < 0.0,
        tint: rgba(state.accent_color, alpha),
    });

    // Same gun geometry the muzzle position is derived from
    if let Some(weapon) = state.current_weapon() {
        let stats = weapon.stats();
        let gun_w = stats.gun_width * 1.5;
        let gun_h = stats.gun_length * 1.3;
        let gun_x = player.body.pos.x + player.body.vel.x * 2.0 + player.body.size.x - 6.0;
        let gun_y = player.body.pos.y + (state.frame_count as f32 / 15.0).sin() * 3.0 + 8.0;
        rect(list, gun_x, gun_y - gun_h, gun_w, gun_h, rgba(stats.gun_color, alpha));
    }
}

fn draw_hud(list: &mut Vec<DrawCmd>, state: &GameState) {
    let progress = if state.is_boss_level() && state.boss_spawned {
        "BOSS".to_string()
    } else {
        format!("SCRAP {}/{}", state.level_scrap, state.quota)
    };
    list.push(DrawCmd::Text {
        pos: Vec2::new(10.0, GAME_HEIGHT - 24.0),
        text: progress,
        color: rgba(TEXT_COLOR, 1.0),
    });
    list.push(DrawCmd::Text {
        pos: Vec2::new(10.0, GAME_HEIGHT - 44.0),
        text: format!("{}-{}", state.chapter, state.level),
        color: rgba(TEXT_COLOR, 0.7),
    });
    if state.speed_mode == SpeedMode::Turbo {
        list.push(DrawCmd::Text {
            pos: Vec2::new(GAME_WIDTH - 70.0, GAME_HEIGHT - 24.0),
            text: "TURBO".to_string(),
            color: rgba(LANE_COLOR, 1.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;
    use crate::sim::boss::spawn_boss;
    use crate::sim::state::BossBrain;

    fn state() -> GameState {
        GameState::new(&LevelConfig::default())
    }

    fn beams(list: &[DrawCmd]) -> Vec<f32> {
        list.iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Beam { width, .. } => Some(*width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rgba() {
        assert_eq!(rgba(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba(0x0000ff, 0.5), [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_same_state_same_frame() {
        let state = state();
        assert_eq!(draw_frame(&state, 100.0), draw_frame(&state, 100.0));
    }

    #[test]
    fn test_flash_is_last_and_full_screen() {
        let mut state = state();
        state.flash_frames = 2;
        let list = draw_frame(&state, 0.0);
        match list.last() {
            Some(DrawCmd::Rect { pos, size, .. }) => {
                assert_eq!(*pos, Vec2::ZERO);
                assert_eq!(*size, Vec2::new(GAME_WIDTH, GAME_HEIGHT));
            }
            other => panic!("expected flash rect, got {other:?}"),
        }
    }

    #[test]
    fn test_boss_beam_states() {
        let mut state = state();
        spawn_boss(&mut state);
        assert!(beams(&draw_frame(&state, 0.0)).is_empty());

        if let EnemyKind::Boss(brain) = &mut state.enemies[0].kind {
            *brain = BossBrain {
                state: BossState::FireLaser,
                timer: 0,
                laser_x: Some(200.0),
            };
        }
        assert_eq!(beams(&draw_frame(&state, 0.0)), vec![LASER_WIDTH]);
    }

    #[test]
    fn test_turbo_hud() {
        let mut state = state();
        state.speed_mode = SpeedMode::Turbo;
        let list = draw_frame(&state, 0.0);
        assert!(
            list.iter()
                .any(|cmd| matches!(cmd, DrawCmd::Text { text, .. } if text == "TURBO"))
        );
    }
}
