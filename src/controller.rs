//! Per-attempt controller
//!
//! Owns the simulation for one level attempt and sits between it and the host:
//! key and touch input go in, progression callbacks and sound cues come out.
//! The host calls [`GameController::frame`] once per animation frame and keeps
//! scheduling while it returns true.

use crate::audio::{AudioManager, CueSink};
use crate::consts::{BOSS_COMPLETE_DELAY_MS, QUOTA_COMPLETE_DELAY_MS};
use crate::render::{self, DrawCmd};
use crate::settings::LevelConfig;
use crate::sim::combat;
use crate::sim::state::{ConsumableType, GameEvent, GamePhase, GameState};
use crate::sim::tick::{TickInput, tick};
use crate::weapon::Loadout;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Turbo,
    /// Utility slot index
    Utility(usize),
    /// Weapon slot index
    Weapon(usize),
}

impl Key {
    /// Map a DOM-style key code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "s" | "S" => Some(Key::Turbo),
            "4" => Some(Key::Utility(0)),
            "5" => Some(Key::Utility(1)),
            "1" => Some(Key::Weapon(0)),
            "2" => Some(Key::Weapon(1)),
            "3" => Some(Key::Weapon(2)),
            _ => None,
        }
    }
}

/// Callbacks into the surrounding progression state
///
/// Every method has an empty default so hosts only implement what they mirror.
pub trait ProgressionHooks {
    fn hp_changed(&mut self, _hp: i32) {}
    fn scrap_changed(&mut self, _scrap: u32) {}
    fn cores_changed(&mut self, _cores: u32) {}
    fn utility_consumed(&mut self, _slot: usize) {}
    /// Delivered after the transition delay, at most once per attempt
    fn level_complete(&mut self, _boss: bool) {}
    /// Ask the player to revive or reset; answered via `revive`/`restart_level`
    fn game_over_choice(&mut self) {}
}

/// Level-complete notification waiting for its deadline
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingCompletion {
    boss: bool,
    deliver_at_ms: f64,
}

/// Drives one level attempt
pub struct GameController<H: ProgressionHooks> {
    config: LevelConfig,
    state: GameState,
    audio: AudioManager,
    hooks: H,
    left_held: bool,
    right_held: bool,
    touch_x: Option<f32>,
    paused: bool,
    pending: Option<PendingCompletion>,
    completion_delivered: bool,
    torn_down: bool,
    last_frame_ms: f64,
}

impl<H: ProgressionHooks> GameController<H> {
    pub fn new(config: LevelConfig, hooks: H, sink: Box<dyn CueSink>) -> Self {
        let config = config.sanitized();
        let mut audio = AudioManager::new(sink);
        audio.set_sfx_enabled(config.settings.sfx_enabled);

        let mut controller = Self {
            state: GameState::new(&config),
            config,
            audio,
            hooks,
            left_held: false,
            right_held: false,
            touch_x: None,
            paused: false,
            pending: None,
            completion_delivered: false,
            torn_down: false,
            last_frame_ms: 0.0,
        };
        controller.dispatch_events();
        controller
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for hosts and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("{}", if paused { "Paused" } else { "Resumed" });
        }
        self.paused = paused;
    }

    pub fn key_down(&mut self, code: &str) {
        let Some(key) = Key::from_code(code) else {
            return;
        };
        match key {
            Key::Left => self.left_held = true,
            Key::Right => self.right_held = true,
            Key::Turbo => self.toggle_turbo(),
            Key::Utility(slot) => {
                self.use_utility(slot);
            }
            Key::Weapon(index) => {
                self.select_weapon(index);
            }
        }
    }

    pub fn key_up(&mut self, code: &str) {
        match Key::from_code(code) {
            Some(Key::Left) => self.left_held = false,
            Some(Key::Right) => self.right_held = false,
            _ => {}
        }
    }

    /// Active touch x in playfield coordinates, or `None` when released
    pub fn set_touch(&mut self, touch_x: Option<f32>) {
        self.touch_x = touch_x;
    }

    fn accepts_actions(&self) -> bool {
        !self.torn_down && !self.paused && self.state.phase == GamePhase::Playing
    }

    pub fn toggle_turbo(&mut self) {
        if !self.accepts_actions() {
            return;
        }
        self.state.speed_mode = self.state.speed_mode.toggled();
        log::info!("Speed mode: {:?}", self.state.speed_mode);
    }

    pub fn select_weapon(&mut self, index: usize) -> bool {
        self.state.select_weapon(index)
    }

    /// Replace the loadout after crafting
    pub fn set_loadout(&mut self, loadout: Loadout) {
        self.state.set_loadout(loadout);
    }

    /// Use one charge from a utility slot
    pub fn use_utility(&mut self, slot: usize) -> bool {
        if !self.accepts_actions() {
            return false;
        }
        let used = combat::use_utility(&mut self.state, slot);
        self.dispatch_events();
        used
    }

    /// Add a purchased consumable to a slot
    pub fn stock_utility(&mut self, slot: usize, kind: ConsumableType) -> bool {
        self.state.utilities.get_mut(slot).is_some_and(|u| u.stock(kind))
    }

    /// Run one animation frame. Returns whether the host should schedule another.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.torn_down {
            return false;
        }
        self.last_frame_ms = now_ms;

        let input = TickInput {
            left: self.left_held,
            right: self.right_held,
            touch_x: self.touch_x,
            paused: self.paused,
        };
        tick(&mut self.state, &input);
        self.dispatch_events();

        let due = self.pending.filter(|p| now_ms >= p.deliver_at_ms);
        if let Some(pending) = due {
            self.pending = None;
            self.completion_delivered = true;
            log::info!("Reporting level complete (boss: {})", pending.boss);
            self.hooks.level_complete(pending.boss);
        }

        self.should_schedule()
    }

    fn should_schedule(&self) -> bool {
        match self.state.phase {
            GamePhase::Playing => true,
            GamePhase::LevelComplete => !self.completion_delivered,
            GamePhase::GameOver => false,
        }
    }

    /// Build the draw list for the current (possibly frozen) frame
    pub fn render(&self, now_ms: f64) -> Vec<DrawCmd> {
        render::draw_frame(&self.state, now_ms)
    }

    /// Continue the attempt at full health after a game over
    pub fn revive(&mut self) -> bool {
        if self.torn_down || self.state.phase != GamePhase::GameOver {
            return false;
        }
        self.state.revive();
        self.dispatch_events();
        true
    }

    /// Start a fresh attempt at the same level, keeping the current wallet and gear
    pub fn restart_level(&mut self) {
        if self.torn_down {
            return;
        }
        self.config.starting_scrap = self.state.player.scrap;
        self.config.starting_cores = self.state.player.cores;
        self.config.loadout = self.state.loadout.clone();
        self.config.selected_weapon = self.state.selected_weapon;
        self.config.utilities = self.state.utilities;

        self.state = GameState::new(&self.config);
        self.pending = None;
        self.completion_delivered = false;
        self.left_held = false;
        self.right_held = false;
        self.touch_x = None;
        self.paused = false;
        log::info!("Restarted level {}-{}", self.config.chapter, self.config.level);
        self.dispatch_events();
    }

    /// Stop the attempt. Any pending level-complete notification is dropped.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if self.pending.take().is_some() {
            log::debug!("Dropping pending level-complete notification");
        }
        self.torn_down = true;
    }

    /// Forward simulation events to the hooks and the audio side channel
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue),
                GameEvent::HpChanged(hp) => self.hooks.hp_changed(hp),
                GameEvent::ScrapChanged(scrap) => self.hooks.scrap_changed(scrap),
                GameEvent::CoresChanged(cores) => self.hooks.cores_changed(cores),
                GameEvent::UtilityConsumed { slot } => self.hooks.utility_consumed(slot),
                GameEvent::LevelComplete { boss } => {
                    if self.pending.is_none() && !self.completion_delivered {
                        let delay = if boss {
                            BOSS_COMPLETE_DELAY_MS
                        } else {
                            QUOTA_COMPLETE_DELAY_MS
                        };
                        self.pending = Some(PendingCompletion {
                            boss,
                            deliver_at_ms: self.last_frame_ms + delay,
                        });
                    }
                }
                GameEvent::GameOver => self.hooks.game_over_choice(),
                GameEvent::ScreenFlash | GameEvent::BossSpawned => {}
            }
        }
    }
}
