//! Scrap Runner headless runner
//!
//! Plays one level attempt with a simple autopilot and logs what the
//! progression hooks receive.
//!
//! Usage: `scrap-runner [config.json] [frames]`

use anyhow::{Context, Result};

use scrap_runner::audio::LogSink;
use scrap_runner::consts::{GAME_WIDTH, PLAYER_SIZE};
use scrap_runner::economy::Progress;
use scrap_runner::sim::boss::{LASER_WIDTH, in_beam};
use scrap_runner::sim::{BossState, ConsumableType, EnemyKind, GamePhase, GameState};
use scrap_runner::{GameController, LevelConfig};

/// Frame length at 60 Hz
const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_FRAMES: u64 = 60 * 60;
const MAX_REVIVES: u32 = 2;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => LevelConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("invalid frame count: {n}"))?,
        None => DEFAULT_FRAMES,
    };

    log::info!(
        "Scrap Runner (headless) starting level {}-{} for {} frames",
        config.chapter,
        config.level,
        frames
    );

    let progress = Progress {
        chapter: config.chapter,
        level: config.level,
        scrap: config.starting_scrap,
        cores: config.starting_cores,
        loadout: config.loadout.clone(),
        utilities: config.utilities,
        dev_mode: config.settings.dev_mode,
        ..Progress::default()
    };
    let mut controller = GameController::new(config, progress, Box::new(LogSink));

    let mut now_ms = 0.0;
    let mut revives = 0;
    for _ in 0..frames {
        steer(&mut controller);
        let keep_going = controller.frame(now_ms);
        now_ms += FRAME_MS;

        if keep_going {
            continue;
        }
        if controller.state().phase == GamePhase::GameOver && revives < MAX_REVIVES {
            revives += 1;
            log::info!("Autopilot chose revive ({revives}/{MAX_REVIVES})");
            controller.revive();
            continue;
        }
        if controller.state().phase == GamePhase::GameOver {
            log::info!("Autopilot out of revives, resetting chapter progress");
            controller.hooks_mut().reset_chapter();
        }
        break;
    }

    let draw_calls = controller.render(now_ms).len();
    controller.teardown();

    let state = controller.state();
    let progress = controller.hooks();
    println!("frames simulated : {}", state.frame_count);
    println!("phase            : {:?}", state.phase);
    println!("level scrap      : {}/{}", state.level_scrap, state.quota);
    println!("hp               : {}", progress.hp);
    println!("scrap / cores    : {} / {}", progress.scrap, progress.cores);
    println!("next level       : {}-{} ({} XP)", progress.chapter, progress.level, progress.xp);
    println!("last frame draws : {draw_calls}");
    Ok(())
}

fn load_config(path: &str) -> Result<LevelConfig> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    LevelConfig::from_json(&json).with_context(|| format!("parsing {path}"))
}

/// Dodge a charging laser, otherwise line up under the lowest enemy or
/// the nearest loot. Pops utilities when they are worth it.
fn steer(controller: &mut GameController<Progress>) {
    let state = controller.state();
    let target = autopilot_target(state);
    let player_x = state.player.body.center().x;

    let hurt = state.player.hp < state.player.max_hp / 2;
    let crowded = state.enemies.iter().filter(|e| !e.is_boss()).count() >= 4;
    let medkit = utility_slot(state, ConsumableType::Medkit);
    let grenade = utility_slot(state, ConsumableType::Grenade);

    controller.key_up("ArrowLeft");
    controller.key_up("ArrowRight");
    match target {
        Some(x) if x < player_x - 3.0 => controller.key_down("ArrowLeft"),
        Some(x) if x > player_x + 3.0 => controller.key_down("ArrowRight"),
        _ => {}
    }

    if let (true, Some(slot)) = (hurt, medkit) {
        controller.use_utility(slot);
    }
    if let (true, Some(slot)) = (crowded, grenade) {
        controller.use_utility(slot);
    }
}

fn utility_slot(state: &GameState, kind: ConsumableType) -> Option<usize> {
    state
        .utilities
        .iter()
        .position(|u| u.kind == kind && u.is_usable())
}

fn autopilot_target(state: &GameState) -> Option<f32> {
    if let Some(boss) = state.boss() {
        let charging_at = match &boss.kind {
            EnemyKind::Boss(brain) if brain.state == BossState::ChargeLaser => brain.laser_x,
            _ => None,
        };
        if let Some(beam_x) = charging_at.filter(|&x| in_beam(&state.player.body, x)) {
            // Run to whichever side of the beam has more room
            let escape = LASER_WIDTH / 2.0 + PLAYER_SIZE;
            return Some(if beam_x > GAME_WIDTH / 2.0 {
                beam_x - escape
            } else {
                beam_x + escape
            });
        }
        return Some(boss.body.center().x);
    }

    let lowest_enemy = state
        .enemies
        .iter()
        .max_by(|a, b| a.body.pos.y.total_cmp(&b.body.pos.y))
        .map(|e| e.body.center().x);
    let player = state.player.body.center();
    let nearest_loot = state
        .collectibles
        .iter()
        .filter(|c| c.body.pos.y < player.y)
        .max_by(|a, b| a.body.pos.y.total_cmp(&b.body.pos.y))
        .map(|c| c.body.center().x);

    nearest_loot.or(lowest_enemy)
}
