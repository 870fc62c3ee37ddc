//! Audio event boundary
//!
//! The simulation never mixes sound. It records what should be heard and
//! where, and the host drains the queue once per tick into its mixer.

use serde::{Deserialize, Serialize};

/// Sound effect identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player volley
    BoltFire,
    /// Bolt hits a wall
    BoltImpact,
    /// Enemy fires
    EnemyShot,
    /// Map cannon fires
    CannonFire,
    /// Core fires a ring
    CoreFire,
    /// Mother launches a child
    Launch,
    /// Mine layer drops a bomb
    BombDrop,
    /// Shootable enemy takes damage
    EnemyHit,
    /// Armoured target takes damage
    MetalHit,
    SmallExplosion,
    LargeExplosion,
    BombBlast,
    /// Pipe section gives way
    PipeBurst,
    BaseDestroyed,
    ShipHit,
    ShipExplode,
    /// Looping fortress engine
    FortressHum,
}

/// Handle to a continuous voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceHandle(u32);

/// Parameter a voice can be steered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioChannel {
    /// 256 = base pitch
    Pitch,
}

/// One request to the audio backend. Positions are world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEvent {
    Play { effect: SoundEffect, x: i32, y: i32 },
    Start { voice: VoiceHandle, effect: SoundEffect, x: i32, y: i32 },
    Move { voice: VoiceHandle, x: i32, y: i32 },
    Control { voice: VoiceHandle, channel: AudioChannel, value: i32 },
    Stop { voice: VoiceHandle },
}

/// Pending audio requests for the current tick
#[derive(Debug, Clone, Default)]
pub struct AudioQueue {
    events: Vec<AudioEvent>,
    next_voice: u32,
    muted: bool,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute/unmute. Voices still get handles while muted so start/stop pairs
    /// stay balanced.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Fire-and-forget effect at a position
    pub fn play(&mut self, effect: SoundEffect, x: i32, y: i32) {
        self.push(AudioEvent::Play { effect, x, y });
    }

    /// Start a continuous voice
    pub fn start(&mut self, effect: SoundEffect, x: i32, y: i32) -> VoiceHandle {
        let voice = VoiceHandle(self.next_voice);
        self.next_voice = self.next_voice.wrapping_add(1);
        self.push(AudioEvent::Start { voice, effect, x, y });
        voice
    }

    pub fn move_to(&mut self, voice: VoiceHandle, x: i32, y: i32) {
        self.push(AudioEvent::Move { voice, x, y });
    }

    pub fn control(&mut self, voice: VoiceHandle, channel: AudioChannel, value: i32) {
        self.push(AudioEvent::Control { voice, channel, value });
    }

    pub fn stop(&mut self, voice: VoiceHandle) {
        self.push(AudioEvent::Stop { voice });
    }

    /// Hand everything queued so far to the caller
    pub fn drain(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending(&self) -> &[AudioEvent] {
        &self.events
    }

    fn push(&mut self, event: AudioEvent) {
        if !self.muted {
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_lifecycle() {
        let mut q = AudioQueue::new();
        let v = q.start(SoundEffect::FortressHum, 1, 2);
        q.move_to(v, 3, 4);
        q.control(v, AudioChannel::Pitch, 300);
        q.stop(v);
        let events = q.drain();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3], AudioEvent::Stop { voice: v });
        assert!(q.pending().is_empty());
    }

    #[test]
    fn test_muted_queue_still_hands_out_voices() {
        let mut q = AudioQueue::new();
        q.set_muted(true);
        let a = q.start(SoundEffect::FortressHum, 0, 0);
        let b = q.start(SoundEffect::FortressHum, 0, 0);
        q.play(SoundEffect::BombBlast, 0, 0);
        assert_ne!(a, b);
        assert!(q.drain().is_empty());
    }
}
