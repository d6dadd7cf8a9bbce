//! Audio playback for the session-complete alert.

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

/// One sine tone of the alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration: Duration,
    /// Offset from the start of the alert.
    pub delay: Duration,
    pub gain: f32,
}

/// The two-tone bell: 830 Hz, then 1046 Hz starting 200 ms later.
pub fn alert_tones(volume: u8) -> [Tone; 2] {
    let volume = f32::from(volume.min(100)) / 100.0;
    [
        Tone {
            frequency: 830.0,
            duration: Duration::from_millis(1000),
            delay: Duration::ZERO,
            gain: volume * 0.5,
        },
        Tone {
            frequency: 1046.0,
            duration: Duration::from_millis(800),
            delay: Duration::from_millis(200),
            gain: volume * 0.4,
        },
    ]
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Creates a new audio player.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays the completion alert at the given volume (0 to 100).
    pub fn play_alert(&self, volume: u8) {
        if let Err(e) = self.play_tones(&alert_tones(volume)) {
            log::warn!("Failed to play alert: {}", e);
        }
    }

    fn play_tones(&self, tones: &[Tone]) -> Result<(), AudioError> {
        // Tones overlap, so each is mixed in separately.
        for tone in tones {
            let source = SineWave::new(tone.frequency)
                .take_duration(tone.duration)
                .fade_in(Duration::from_millis(5))
                .amplify(tone.gain)
                .delay(tone.delay);
            self.handle.play_raw(source)?;
        }
        Ok(())
    }
}
