use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("no audio output is available")]
    Unavailable,
    #[error("playback was refused: {0}")]
    Rejected(String),
}

/// The single audio output the playback controller drives.
pub trait MediaResource {
    /// Point the output at a new source. Playback does not start.
    fn load(&mut self, src: &str);
    fn unload(&mut self);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
}

/// Notifications coming back from the media output.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata for the current source is known; `duration` is `None` for
    /// streams that do not report one.
    Loaded { duration: Option<f64> },
    TimeUpdate(f64),
    /// The output paused or resumed on its own, e.g. from a system media key.
    Paused,
    Resumed,
    Ended,
    Failed(String),
}

/// A call made on [`HeadlessMedia`], kept for assertions in tests.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Load(String),
    Unload,
    Play,
    Pause,
    Seek(f64),
    Volume(f64),
}

/// A media output with no sound, used for builds without a browser audio
/// element. It keeps the same state a real element would; test builds also
/// record every call.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMedia {
    src: Option<String>,
    playing: bool,
    position: f64,
    volume: f64,
    refusal: Option<String>,
    #[cfg(test)]
    calls: Vec<MediaCall>,
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    /// Make every following `play` call fail with `reason`.
    pub fn refuse_play(&mut self, reason: impl Into<String>) {
        self.refusal = Some(reason.into());
    }

    pub fn allow_play(&mut self) {
        self.refusal = None;
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[cfg(test)]
    pub fn calls(&self) -> &[MediaCall] {
        &self.calls
    }

    #[cfg(test)]
    pub fn take_calls(&mut self) -> Vec<MediaCall> {
        std::mem::take(&mut self.calls)
    }
}

impl MediaResource for HeadlessMedia {
    fn load(&mut self, src: &str) {
        #[cfg(test)]
        self.calls.push(MediaCall::Load(src.to_string()));
        self.src = Some(src.to_string());
        self.playing = false;
        self.position = 0.0;
    }

    fn unload(&mut self) {
        #[cfg(test)]
        self.calls.push(MediaCall::Unload);
        self.src = None;
        self.playing = false;
        self.position = 0.0;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        #[cfg(test)]
        self.calls.push(MediaCall::Play);
        if self.src.is_none() {
            return Err(MediaError::Unavailable);
        }
        if let Some(reason) = &self.refusal {
            return Err(MediaError::Rejected(reason.clone()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        #[cfg(test)]
        self.calls.push(MediaCall::Pause);
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        #[cfg(test)]
        self.calls.push(MediaCall::Seek(seconds));
        self.position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        #[cfg(test)]
        self.calls.push(MediaCall::Volume(volume));
        self.volume = volume;
    }
}
