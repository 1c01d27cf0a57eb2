//! Game state and core simulation types
//!
//! Everything one level attempt needs lives in `GameState`: the player, every
//! entity collection, the scroll watermark and the seeded RNG. Entity vectors
//! are append-only within a frame, so iteration order is spawn order.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::world::WorldScroll;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::settings::LevelConfig;
use crate::weapon::{AmmoType, Loadout, Weapon};
use crate::{is_boss_level, level_quota};

/// Number of consumable slots
pub const UTILITY_SLOTS: usize = 2;

/// Maximum live particles (oldest are dropped first)
pub const MAX_PARTICLES: usize = 512;

/// Frames the grenade flash stays on screen
pub const FLASH_FRAMES: u32 = 4;

/// Frames per enemy walk-cycle step
pub const ANIM_STEP_FRAMES: u32 = 15;

/// Default enemy tint
pub const ENEMY_COLOR: u32 = 0xef4444;

/// Current phase of a level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advancing
    Playing,
    /// Boss defeated or quota met; waiting for the transition delay
    LevelComplete,
    /// Player destroyed; waiting for the revive/reset choice
    GameOver,
}

/// Scroll speed mode, toggled by the player for the rest of the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedMode {
    #[default]
    Normal,
    /// Double scroll, half spawn interval, double scrap
    Turbo,
}

impl SpeedMode {
    pub fn toggled(self) -> Self {
        match self {
            SpeedMode::Normal => SpeedMode::Turbo,
            SpeedMode::Turbo => SpeedMode::Normal,
        }
    }
}

/// Axis-aligned box with velocity, shared by every spatial entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            vel: Vec2::ZERO,
        }
    }

    pub fn with_vel(mut self, vx: f32, vy: f32) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Integrate one frame of velocity
    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }
}

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub hp: i32,
    pub max_hp: i32,
    pub scrap: u32,
    /// Premium currency
    pub cores: u32,
    /// Melee invulnerability countdown
    pub iframes: u32,
}

impl Player {
    pub fn new(scrap: u32, cores: u32) -> Self {
        Self {
            body: Body::new(
                GAME_WIDTH / 2.0 - PLAYER_SIZE / 2.0,
                PLAYER_START_Y,
                PLAYER_SIZE,
                PLAYER_SIZE,
            ),
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            scrap,
            cores,
            iframes: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// Consumable item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumableType {
    Grenade,
    Medkit,
    #[default]
    Empty,
}

/// One consumable holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UtilitySlot {
    pub kind: ConsumableType,
    pub count: u32,
}

impl UtilitySlot {
    pub fn new(kind: ConsumableType, count: u32) -> Self {
        Self { kind, count }
    }

    pub fn is_usable(&self) -> bool {
        self.kind != ConsumableType::Empty && self.count > 0
    }

    /// Remove one charge; the slot empties when the last charge is used
    pub fn consume(&mut self) {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            self.kind = ConsumableType::Empty;
        }
    }

    /// Add one charge of `kind` (shop purchase). Fails on a different kind or a full stack.
    pub fn stock(&mut self, kind: ConsumableType) -> bool {
        if kind == ConsumableType::Empty {
            return false;
        }
        if self.kind != ConsumableType::Empty && self.kind != kind {
            return false;
        }
        if self.count >= MAX_CONSUMABLE_STACK {
            return false;
        }
        self.kind = kind;
        self.count += 1;
        true
    }
}

/// Boss attack states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossState {
    #[default]
    Idle,
    ChargeLaser,
    FireLaser,
}

/// Boss-only data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BossBrain {
    pub state: BossState,
    /// Frames spent in the current state
    pub timer: u32,
    /// Beam center locked when charging starts
    pub laser_x: Option<f32>,
}

/// Enemy variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Boss(BossBrain),
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub hp: i32,
    pub max_hp: i32,
    pub color: u32,
    pub anim_frame: u8,
    pub anim_timer: u32,
    pub flip_x: bool,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Advance the cosmetic walk cycle
    pub fn animate(&mut self) {
        self.anim_timer += 1;
        if self.anim_timer >= ANIM_STEP_FRAMES {
            self.anim_timer = 0;
            self.anim_frame ^= 1;
        }
    }
}

/// How a projectile is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileVisual {
    Ammo(AmmoType),
    Beam,
    Fireball,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub body: Body,
    pub damage: i32,
    pub color: u32,
    pub from_player: bool,
    pub explosive: bool,
    /// Remaining lifetime in frames
    pub life: u32,
    pub visual: ProjectileVisual,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    TrashCan,
}

/// A movement-blocking obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub body: Body,
    /// Carried but never reduced: obstacles only block
    pub hp: i32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Remaining frames
    pub life: f32,
    pub size: f32,
}

/// Particle burst styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Hit,
    Explosion,
}

impl Burst {
    fn spread(self) -> f32 {
        match self {
            Burst::Hit => 4.0,
            Burst::Explosion => 8.0,
        }
    }
}

/// Loot types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Scrap,
    Core,
}

/// Loot dropped by a destroyed enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub body: Body,
    pub value: u32,
}

/// Weapon cooldown gate keyed by the frame counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponGate {
    last_shot_frame: Option<u64>,
}

impl WeaponGate {
    /// Returns true (and records the shot) when `cooldown` frames have passed
    pub fn try_fire(&mut self, frame: u64, cooldown: u64) -> bool {
        if let Some(last) = self.last_shot_frame {
            // Counter went backwards (level restart): forget the stale shot
            if frame < last {
                log::debug!(
                    "frame counter behind last shot ({frame} < {last}), resetting cooldown"
                );
                self.last_shot_frame = None;
            } else if frame - last < cooldown {
                return false;
            }
        }
        self.last_shot_frame = Some(frame);
        true
    }

    pub fn last_shot_frame(&self) -> Option<u64> {
        self.last_shot_frame
    }
}

/// Things that happened during a step, drained by the controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    HpChanged(i32),
    ScrapChanged(u32),
    CoresChanged(u32),
    UtilityConsumed { slot: usize },
    ScreenFlash,
    BossSpawned,
    LevelComplete { boss: bool },
    GameOver,
}

/// Complete state of one level attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub chapter: u32,
    pub level: u32,
    /// Scrap needed to finish the level (boss levels: to summon the boss)
    pub quota: u32,
    pub phase: GamePhase,
    pub speed_mode: SpeedMode,
    /// Simulation frame counter; the only clock the simulation reads
    pub frame_count: u64,
    pub player: Player,
    pub loadout: Loadout,
    pub selected_weapon: usize,
    pub utilities: [UtilitySlot; UTILITY_SLOTS],
    pub weapon_gate: WeaponGate,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    pub obstacles: Vec<Obstacle>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub world: WorldScroll,
    /// Scrap collected during this attempt
    pub level_scrap: u32,
    pub boss_spawned: bool,
    pub flash_frames: u32,
    pub accent_color: u32,
    /// Events emitted since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create the state for a fresh attempt at the configured level
    pub fn new(config: &LevelConfig) -> Self {
        let config = config.clone().sanitized();
        let mut state = Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            chapter: config.chapter,
            level: config.level,
            quota: level_quota(config.chapter, config.level),
            phase: GamePhase::Playing,
            speed_mode: SpeedMode::Normal,
            frame_count: 0,
            player: Player::new(config.starting_scrap, config.starting_cores),
            loadout: config.loadout,
            selected_weapon: config.selected_weapon,
            utilities: config.utilities,
            weapon_gate: WeaponGate::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            collectibles: Vec::new(),
            obstacles: Vec::new(),
            particles: Vec::new(),
            world: WorldScroll::default(),
            level_scrap: 0,
            boss_spawned: false,
            flash_frames: 0,
            accent_color: config.accent_color,
            events: Vec::new(),
            next_id: 1,
        };

        state.emit(GameEvent::HpChanged(state.player.hp));
        state.emit(GameEvent::ScrapChanged(state.player.scrap));
        state.emit(GameEvent::CoresChanged(state.player.cores));
        log::info!(
            "Level {}-{} started (quota {}, boss level: {})",
            state.chapter,
            state.level,
            state.quota,
            state.is_boss_level()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.emit(GameEvent::Sound(cue));
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_boss_level(&self) -> bool {
        is_boss_level(self.level)
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    /// Scroll speed before the boss freeze
    pub fn scroll_speed(&self) -> f32 {
        match self.speed_mode {
            SpeedMode::Normal => BASE_SCROLL_SPEED,
            SpeedMode::Turbo => BASE_SCROLL_SPEED * TURBO_SCROLL_MULT,
        }
    }

    /// Per-frame scroll delta; zero while a boss holds the arena
    pub fn effective_scroll(&self) -> f32 {
        if self.boss_spawned { 0.0 } else { self.scroll_speed() }
    }

    pub fn spawn_interval(&self) -> u64 {
        match self.speed_mode {
            SpeedMode::Normal => SPAWN_INTERVAL_FRAMES,
            SpeedMode::Turbo => SPAWN_INTERVAL_FRAMES / 2,
        }
    }

    pub fn current_weapon(&self) -> Option<&Weapon> {
        self.loadout.get(self.selected_weapon).and_then(Option::as_ref)
    }

    /// Switch to a weapon slot; empty or out-of-range slots are rejected
    pub fn select_weapon(&mut self, index: usize) -> bool {
        if self.loadout.get(index).is_some_and(Option::is_some) {
            self.selected_weapon = index;
            true
        } else {
            log::warn!("Ignoring selection of empty weapon slot {index}");
            false
        }
    }

    /// Replace the loadout (crafting between frames) keeping the selection valid
    pub fn set_loadout(&mut self, loadout: Loadout) {
        self.loadout = loadout;
        if self.current_weapon().is_none() {
            self.selected_weapon = self.loadout.iter().position(Option::is_some).unwrap_or(0);
        }
    }

    /// Spawn a burst of cosmetic particles
    pub fn spawn_particles(&mut self, pos: Vec2, color: u32, count: usize, burst: Burst) {
        let spread = burst.spread();
        for _ in 0..count {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * spread,
                (self.rng.random::<f32>() - 0.5) * spread,
            );
            let life = 20.0 + self.rng.random::<f32>() * 20.0;
            let size = self.rng.random::<f32>() * 4.0 + 2.0;
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life,
                size,
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Apply damage to the player and enter game over on death
    pub fn damage_player(&mut self, amount: i32) {
        self.player.hp -= amount;
        self.emit(GameEvent::HpChanged(self.player.hp));
        if self.player.is_dead() && self.phase == GamePhase::Playing {
            log::info!("Player destroyed at frame {}", self.frame_count);
            self.phase = GamePhase::GameOver;
            self.play(SoundCue::GameOver);
            self.emit(GameEvent::GameOver);
        }
    }

    /// Bring the player back at full health, continuing this attempt
    pub fn revive(&mut self) {
        self.player.hp = self.player.max_hp;
        self.player.iframes = CONTACT_IFRAMES;
        self.phase = GamePhase::Playing;
        self.emit(GameEvent::HpChanged(self.player.hp));
        log::info!("Player revived at frame {}", self.frame_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_emits_initial_values() {
        let config = LevelConfig {
            starting_scrap: 40,
            starting_cores: 3,
            ..LevelConfig::default()
        };
        let mut state = GameState::new(&config);
        assert_eq!(state.quota, 120);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::HpChanged(100),
                GameEvent::ScrapChanged(40),
                GameEvent::CoresChanged(3)
            ]
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_weapon_gate_cooldown() {
        let mut gate = WeaponGate::default();
        assert!(gate.try_fire(0, 20));
        assert!(!gate.try_fire(19, 20));
        assert!(gate.try_fire(20, 20));
        assert_eq!(gate.last_shot_frame(), Some(20));
    }

    #[test]
    fn test_weapon_gate_recovers_from_counter_reset() {
        let mut gate = WeaponGate::default();
        assert!(gate.try_fire(500, 20));
        // Frame counter restarted below the recorded shot
        assert!(gate.try_fire(3, 20));
        assert!(!gate.try_fire(10, 20));
    }

    #[test]
    fn test_utility_slot_stock_and_consume() {
        let mut slot = UtilitySlot::default();
        assert!(!slot.is_usable());
        assert!(slot.stock(ConsumableType::Medkit));
        assert!(!slot.stock(ConsumableType::Grenade));
        for _ in 0..10 {
            slot.stock(ConsumableType::Medkit);
        }
        assert_eq!(slot.count, MAX_CONSUMABLE_STACK);

        for _ in 0..MAX_CONSUMABLE_STACK {
            slot.consume();
        }
        assert_eq!(slot, UtilitySlot::default());
    }

    #[test]
    fn test_select_weapon_rejects_empty_slot() {
        let mut state = GameState::new(&LevelConfig::default());
        assert!(!state.select_weapon(1));
        assert!(!state.select_weapon(7));
        assert_eq!(state.selected_weapon, 0);

        state.set_loadout([None, Some(Weapon::starter()), None]);
        assert_eq!(state.selected_weapon, 1);
        assert!(state.current_weapon().is_some());
    }

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(&LevelConfig::default());
        state.spawn_particles(Vec2::ZERO, 0xffffff, MAX_PARTICLES + 40, Burst::Explosion);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_damage_player_enters_game_over_once() {
        let mut state = GameState::new(&LevelConfig::default());
        state.drain_events();
        state.damage_player(60);
        state.damage_player(60);
        assert_eq!(state.phase, GamePhase::GameOver);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::GameOver)
            .count();
        assert_eq!(overs, 1);

        state.revive();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
    }
}
