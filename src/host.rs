//! Host bindings.
//!
//! The host registers its callbacks one at a time before the first frame.
//! [`HostBindingsBuilder`] collects them and only yields a [`HostBindings`]
//! once the poll, sample and video callbacks are all present, so nothing can
//! sample through a callback that was never registered.

use crate::device::DeviceKind;
use crate::surface::{FrameBuffer, PixelFormat};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Per-frame input side of the host.
pub trait InputHost {
    /// Latches device state for this frame. Called before any sampling.
    fn poll(&mut self);

    /// Current value at `(port, device, index, id)`.
    fn sample(&mut self, port: u32, device: DeviceKind, index: u32, id: u32) -> u16;
}

/// Frame delivery side of the host.
pub trait VideoSink {
    fn present(&mut self, frame: &FrameBuffer);
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Host callback not registered: {0}")]
    MissingCallback(&'static str),
}

type PollFn = Box<dyn FnMut() + Send>;
type SampleFn = Box<dyn FnMut(u32, u32, u32, u32) -> u16 + Send>;
type VideoFn = Box<dyn FnMut(&FrameBuffer) + Send>;
type AudioSampleFn = Box<dyn FnMut(i16, i16) + Send>;
type AudioBatchFn = Box<dyn FnMut(&[i16]) -> usize + Send>;

/// Registration-phase collector for host callbacks.
#[derive(Default)]
pub struct HostBindingsBuilder {
    poll: Option<PollFn>,
    sample: Option<SampleFn>,
    video: Option<VideoFn>,
    audio_sample: Option<AudioSampleFn>,
    audio_batch: Option<AudioBatchFn>,
}

impl HostBindingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.set_poll(f);
        self
    }

    /// `f(port, device_wire, index, id)`
    pub fn sample(mut self, f: impl FnMut(u32, u32, u32, u32) -> u16 + Send + 'static) -> Self {
        self.set_sample(f);
        self
    }

    pub fn video(mut self, f: impl FnMut(&FrameBuffer) + Send + 'static) -> Self {
        self.set_video(f);
        self
    }

    // The `set_*` forms serve hosts that register callbacks through separate
    // entry points on a long-lived builder.

    pub fn set_poll(&mut self, f: impl FnMut() + Send + 'static) {
        debug!("Registered input poll callback");
        self.poll = Some(Box::new(f));
    }

    pub fn set_sample(&mut self, f: impl FnMut(u32, u32, u32, u32) -> u16 + Send + 'static) {
        debug!("Registered input state callback");
        self.sample = Some(Box::new(f));
    }

    pub fn set_video(&mut self, f: impl FnMut(&FrameBuffer) + Send + 'static) {
        debug!("Registered video refresh callback");
        self.video = Some(Box::new(f));
    }

    pub fn set_audio_sample(&mut self, f: impl FnMut(i16, i16) + Send + 'static) {
        debug!("Registered audio sample callback");
        self.audio_sample = Some(Box::new(f));
    }

    pub fn set_audio_batch(&mut self, f: impl FnMut(&[i16]) -> usize + Send + 'static) {
        debug!("Registered audio batch callback");
        self.audio_batch = Some(Box::new(f));
    }

    pub fn is_complete(&self) -> bool {
        self.poll.is_some() && self.sample.is_some() && self.video.is_some()
    }

    /// Consumes the registrations. Fails naming the first missing callback.
    pub fn build(self) -> Result<HostBindings, HostError> {
        let poll = required(self.poll, "input_poll")?;
        let sample = required(self.sample, "input_state")?;
        let video = required(self.video, "video_refresh")?;

        Ok(HostBindings {
            poll,
            sample,
            video,
            _audio_sample: self.audio_sample,
            _audio_batch: self.audio_batch,
        })
    }
}

impl fmt::Debug for HostBindingsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBindingsBuilder")
            .field("poll", &self.poll.is_some())
            .field("sample", &self.sample.is_some())
            .field("video", &self.video.is_some())
            .field("audio_sample", &self.audio_sample.is_some())
            .field("audio_batch", &self.audio_batch.is_some())
            .finish()
    }
}

fn required<T>(slot: Option<T>, name: &'static str) -> Result<T, HostError> {
    slot.ok_or_else(|| {
        error!("Host callback missing at bind time: {}", name);
        HostError::MissingCallback(name)
    })
}

/// Complete set of host callbacks. Audio is accepted but never driven.
pub struct HostBindings {
    poll: PollFn,
    sample: SampleFn,
    video: VideoFn,
    _audio_sample: Option<AudioSampleFn>,
    _audio_batch: Option<AudioBatchFn>,
}

impl HostBindings {
    pub fn builder() -> HostBindingsBuilder {
        HostBindingsBuilder::new()
    }
}

impl fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBindings").finish_non_exhaustive()
    }
}

impl InputHost for HostBindings {
    fn poll(&mut self) {
        (self.poll)();
    }

    fn sample(&mut self, port: u32, device: DeviceKind, index: u32, id: u32) -> u16 {
        (self.sample)(port, device.wire(), index, id)
    }
}

impl VideoSink for HostBindings {
    fn present(&mut self, frame: &FrameBuffer) {
        (self.video)(frame);
    }
}

/// Host environment requests. Each returns whether the host accepted.
pub trait Environment {
    /// Declares that the core exposes no runtime variables.
    fn declare_no_variables(&mut self) -> bool;
    fn set_support_no_game(&mut self, supported: bool) -> bool;
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool;
    fn request_log_interface(&mut self) -> bool;
    fn register_keyboard_callback(&mut self) -> bool;
}

/// What the host agreed to during negotiation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub no_game: bool,
    pub pixel_format: bool,
    pub host_log: bool,
}

impl Capabilities {
    /// One-shot negotiation, run when the host hands over its environment.
    pub fn negotiate(env: &mut dyn Environment) -> Self {
        env.declare_no_variables();

        let caps = Self {
            no_game: env.set_support_no_game(true),
            pixel_format: env.set_pixel_format(FrameBuffer::FORMAT),
            host_log: env.request_log_interface(),
        };

        if !caps.pixel_format {
            warn!("Host rejected pixel format {:?}", FrameBuffer::FORMAT);
        }
        if !caps.no_game {
            warn!("Host does not support running without content");
        }
        info!(
            "Negotiated host capabilities: no_game={}, pixel_format={}, host_log={}",
            caps.no_game, caps.pixel_format, caps.host_log
        );
        caps
    }
}
