//! # Tone Synthesis Module
//!
//! A small polyphonic sine generator for auditioning keys. Voices are keyed by
//! an id (normally the note name) and their gain glides exponentially towards
//! its target, so starting and stopping a tone never clicks.
//!
//! The bank is driven by [`ToneCommand`]s and knows nothing about audio
//! devices; see [`crate::audio`] for the output stream.

use std::f64::consts::TAU;

/// Time constant of the attack ramp, in seconds.
const ATTACK_TIME: f32 = 0.01;
/// Time constant of the release ramp, in seconds.
const RELEASE_TIME: f32 = 0.08;
/// Gain below which a released voice is dropped.
const SILENCE_THRESHOLD: f32 = 1e-4;

/// Instructions sent to a [`ToneBank`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToneCommand {
    /// Start (or retune) the voice `id` at `frequency` Hz.
    Start { id: String, frequency: f64 },
    /// Release the voice `id`.
    Stop { id: String },
    /// Release every voice.
    StopAll,
    /// Master volume, 0.0 to 1.0.
    SetVolume(f32),
}

#[derive(Debug, Clone)]
struct Voice {
    id: String,
    phase: f64,
    phase_increment: f64,
    gain: f32,
    target_gain: f32,
    ramp_coefficient: f32,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.target_gain == 0.0 && self.gain < SILENCE_THRESHOLD
    }

    fn next_sample(&mut self) -> f32 {
        self.gain += (self.target_gain - self.gain) * self.ramp_coefficient;
        let sample = (self.phase * TAU).sin() as f32 * self.gain;
        self.phase = (self.phase + self.phase_increment).fract();
        sample
    }
}

/// Polyphonic set of sine voices rendered into interleaved buffers.
#[derive(Debug, Clone)]
pub struct ToneBank {
    sample_rate: f32,
    voices: Vec<Voice>,
    volume: f32,
    attack_coefficient: f32,
    release_coefficient: f32,
}

impl ToneBank {
    pub fn new(sample_rate: u32, volume: f32) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            sample_rate,
            voices: Vec::new(),
            volume: volume.clamp(0.0, 1.0),
            attack_coefficient: ramp_coefficient(ATTACK_TIME, sample_rate),
            release_coefficient: ramp_coefficient(RELEASE_TIME, sample_rate),
        }
    }

    pub fn apply(&mut self, command: ToneCommand) {
        match command {
            ToneCommand::Start { id, frequency } => {
                let phase_increment = frequency / self.sample_rate as f64;
                let attack = self.attack_coefficient;
                match self.voices.iter_mut().find(|voice| voice.id == id) {
                    // Keep phase and gain so a retrigger glides instead of clicking.
                    Some(voice) => {
                        voice.phase_increment = phase_increment;
                        voice.target_gain = 1.0;
                        voice.ramp_coefficient = attack;
                    }
                    None => self.voices.push(Voice {
                        id,
                        phase: 0.0,
                        phase_increment,
                        gain: 0.0,
                        target_gain: 1.0,
                        ramp_coefficient: attack,
                    }),
                }
            }
            ToneCommand::Stop { id } => {
                let release = self.release_coefficient;
                if let Some(voice) = self.voices.iter_mut().find(|voice| voice.id == id) {
                    voice.target_gain = 0.0;
                    voice.ramp_coefficient = release;
                }
            }
            ToneCommand::StopAll => {
                for voice in &mut self.voices {
                    voice.target_gain = 0.0;
                    voice.ramp_coefficient = self.release_coefficient;
                }
            }
            ToneCommand::SetVolume(volume) => self.volume = volume.clamp(0.0, 1.0),
        }
    }

    /// Number of voices still producing sound, including releasing ones.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Whether a voice with this id is held (started and not yet stopped).
    pub fn is_held(&self, id: &str) -> bool {
        self.voices
            .iter()
            .any(|voice| voice.id == id && voice.target_gain > 0.0)
    }

    /// Mixes all voices into `out`, writing the same sample to every channel
    /// of each frame. Silent voices are dropped afterwards.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let mixed: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
            let sample = (mixed * self.volume).clamp(-1.0, 1.0);
            frame.fill(sample);
        }
        self.voices.retain(|voice| !voice.is_finished());
    }
}

/// Per-sample coefficient of a one-pole ramp with the given time constant.
fn ramp_coefficient(time_constant: f32, sample_rate: f32) -> f32 {
    1.0 - (-1.0 / (time_constant * sample_rate)).exp()
}
