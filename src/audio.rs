//! Sound cue side channel
//!
//! The simulation only names the cue it wants played. How a cue is realized
//! (synthesized, sampled, logged, ignored) belongs to whatever `CueSink` the
//! host plugs in.

use serde::{Deserialize, Serialize};

/// Sound effect cues requested by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player weapon fired (also the boss fireball volley)
    Shoot,
    /// Player took damage
    Hit,
    /// Enemy destroyed, grenade detonated
    Explosion,
    /// Core collected, medkit used
    Pickup,
    /// Boss laser discharged
    Laser,
    /// Boss arrived
    BossRoar,
    /// Player destroyed
    GameOver,
    /// Scrap collected, UI feedback
    Click,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Hit => "hit",
            SoundCue::Explosion => "explosion",
            SoundCue::Pickup => "pickup",
            SoundCue::Laser => "laser",
            SoundCue::BossRoar => "boss-roar",
            SoundCue::GameOver => "game-over",
            SoundCue::Click => "click",
        }
    }
}

/// Something that can realize sound cues
pub trait CueSink {
    fn play(&mut self, cue: SoundCue);
}

/// Sink that writes cues to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogSink;

impl CueSink for LogSink {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("sfx: {}", cue.as_str());
    }
}

/// Sink that drops every cue
#[derive(Debug, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn CueSink>,
    sfx_enabled: bool,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn CueSink>) -> Self {
        Self {
            sink,
            sfx_enabled: true,
            muted: false,
        }
    }

    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        self.sfx_enabled = enabled;
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn audible(&self) -> bool {
        self.sfx_enabled && !self.muted
    }

    /// Play a sound cue
    pub fn play(&mut self, cue: SoundCue) {
        if !self.audible() {
            return;
        }
        self.sink.play(cue);
    }
}
