//! Sound cues
//!
//! The core emits events; the audio collaborator maps them to cues and
//! decides how loud to play them. No audio backend lives in this crate.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Ball hits a wall, the ground or a screen edge
    BallHit,
    /// Star collected
    StarCollect,
    /// Level complete
    Victory,
    /// Ball launched
    Launch,
    /// Game over
    Defeat,
}

impl SoundCue {
    /// Relative loudness of the cue
    pub fn base_gain(&self) -> f32 {
        match self {
            SoundCue::BallHit => 0.5,
            SoundCue::StarCollect => 0.8,
            SoundCue::Launch => 0.6,
            SoundCue::Victory | SoundCue::Defeat => 1.0,
        }
    }
}

impl GameEvent {
    /// Cue to play for this event, if any
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::ShotFired { .. } => Some(SoundCue::Launch),
            GameEvent::StarCollected { .. } => Some(SoundCue::StarCollect),
            GameEvent::Impact => Some(SoundCue::BallHit),
            GameEvent::LevelComplete { .. } => Some(SoundCue::Victory),
            GameEvent::GameOver => Some(SoundCue::Defeat),
            GameEvent::BallReset => None,
        }
    }
}

/// Volume settings applied to cues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CueMixer {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for CueMixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl CueMixer {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Gain to play a cue at, None when silent
    pub fn gain(&self, cue: SoundCue) -> Option<f32> {
        if self.muted {
            return None;
        }
        let gain = self.master_volume * self.sfx_volume * cue.base_gain();
        (gain > 0.0).then_some(gain)
    }
}
