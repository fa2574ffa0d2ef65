//! Audio cues using the Web Audio API
//!
//! Procedurally generated sound effects - no external files needed! Each cue
//! is synthesized once into an `AudioBuffer` at startup; playback just wires a
//! buffer source through a gain node. Any Web Audio failure silently disables
//! sound without touching gameplay.

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Card flip (up or back down)
    Flip,
    /// Pair locked in
    Match,
    /// All pairs found
    Win,
}

/// Tone recipe for one cue
#[derive(Debug, Clone, Copy)]
pub struct Tone {
    /// Sine frequency in Hz
    pub freq: f32,
    /// Duration in seconds
    pub secs: f32,
    /// Playback gain, 0..1
    pub gain: f32,
}

impl SoundCue {
    pub const ALL: [SoundCue; 3] = [SoundCue::Flip, SoundCue::Match, SoundCue::Win];

    /// Stable index into the buffer bank
    pub fn index(self) -> usize {
        match self {
            SoundCue::Flip => 0,
            SoundCue::Match => 1,
            SoundCue::Win => 2,
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            SoundCue::Flip => Tone {
                freq: 400.0,
                secs: 0.1,
                gain: 0.3,
            },
            SoundCue::Match => Tone {
                freq: 600.0,
                secs: 0.2,
                gain: 0.4,
            },
            SoundCue::Win => Tone {
                freq: 800.0,
                secs: 0.3,
                gain: 0.5,
            },
        }
    }
}

/// Synthesize a tone: sine wave with exponential decay
pub fn synth_samples(tone: Tone, sample_rate: f32) -> Vec<f32> {
    let count = (sample_rate * tone.secs) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (std::f32::consts::TAU * tone.freq * t).sin() * (-3.0 * t).exp()
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use bank::AudioBank;

#[cfg(target_arch = "wasm32")]
mod bank {
    use web_sys::{AudioBuffer, AudioContext};

    use super::{SoundCue, Tone, synth_samples};

    /// Cue-to-buffer registry backed by one `AudioContext`
    pub struct AudioBank {
        ctx: Option<AudioContext>,
        buffers: [Option<AudioBuffer>; SoundCue::ALL.len()],
        master_volume: f32,
        muted: bool,
    }

    impl Default for AudioBank {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioBank {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }

            let mut buffers = [const { None }; SoundCue::ALL.len()];
            if let Some(ctx) = &ctx {
                for cue in SoundCue::ALL {
                    buffers[cue.index()] = synth_buffer(ctx, cue.tone());
                }
            }

            Self {
                ctx,
                buffers,
                master_volume: 0.8,
                muted: false,
            }
        }

        /// Resume the audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        /// Play a cue from the pre-generated bank
        pub fn play(&self, cue: SoundCue) {
            let vol = self.effective_volume() * cue.tone().gain;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some(buffer) = &self.buffers[cue.index()] else {
                return;
            };
            let Ok(source) = ctx.create_buffer_source() else {
                return;
            };
            source.set_buffer(Some(buffer));

            let Ok(gain) = ctx.create_gain() else { return };
            gain.gain().set_value(vol);

            if source.connect_with_audio_node(&gain).is_err() {
                return;
            }
            if gain.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }
            let _ = source.start();
        }
    }

    fn synth_buffer(ctx: &AudioContext, tone: Tone) -> Option<AudioBuffer> {
        let sample_rate = ctx.sample_rate();
        let mut samples = synth_samples(tone, sample_rate);
        let buffer = ctx.create_buffer(1, samples.len() as u32, sample_rate).ok()?;
        buffer.copy_to_channel(&mut samples, 0).ok()?;
        Some(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_count_matches_duration() {
        for cue in SoundCue::ALL {
            let tone = cue.tone();
            let samples = synth_samples(tone, 48_000.0);
            assert_eq!(samples.len(), (48_000.0 * tone.secs) as usize);
        }
    }

    #[test]
    fn test_samples_bounded_and_decaying() {
        let samples = synth_samples(SoundCue::Win.tone(), 44_100.0);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));

        // The envelope decays: the loudest late sample is quieter than the
        // loudest early one
        let half = samples.len() / 2;
        let early = samples[..half].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let late = samples[half..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(late < early);
    }

    #[test]
    fn test_cue_indices_are_distinct() {
        let mut seen = [false; SoundCue::ALL.len()];
        for cue in SoundCue::ALL {
            assert!(!seen[cue.index()]);
            seen[cue.index()] = true;
        }
    }
}
