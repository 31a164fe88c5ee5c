//! Core aggregate: everything one loaded plugin instance owns.
//!
//! ```text
//! host.poll ─► poll_and_diff ─► gestures ─► PointerSurface ─► Widget ─► host.present
//!                                  ▲
//!                 KeyQueue ────────┘ (drained after the diff)
//! ```

use crate::config::{ConfigError, CoreConfig};
use crate::device::DeviceKind;
use crate::engine::{EngineSettings, Frame, InputEngine, Running};
use crate::gesture::{keyboard, Bounds, KeyQueue};
use crate::host::{Capabilities, Environment, InputHost, VideoSink};
use crate::surface::{EventLog, FrameBuffer, PointerSurface, Widget, WidgetEvent};
use std::ffi::CStr;
use tracing::{debug, info, warn};

pub const API_VERSION: u32 = 1;

pub const LIBRARY_NAME: &CStr = c"RetroInput";
pub const LIBRARY_VERSION: &CStr =
    match CStr::from_bytes_with_nul(concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes()) {
        Ok(version) => version,
        Err(_) => panic!("package version contains a NUL byte"),
    };

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Core already deinitialized")]
    Released,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemInfo {
    pub library_name: &'static CStr,
    pub library_version: &'static CStr,
    pub valid_extensions: &'static CStr,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvInfo {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
    pub fps: f64,
    pub sample_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
}

impl Region {
    pub const fn wire(self) -> u32 {
        match self {
            Region::Ntsc => 0,
            Region::Pal => 1,
        }
    }
}

/// Result of one [`Core::run`].
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub frame: Frame,
    pub widget_events: Vec<WidgetEvent>,
}

pub struct Core {
    config: CoreConfig,
    engine: Option<InputEngine<Running>>,
    surface: PointerSurface,
    widget: Box<dyn Widget>,
    frame: FrameBuffer,
    capabilities: Option<Capabilities>,
    content_loaded: bool,
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("surface", &self.surface)
            .field("capabilities", &self.capabilities)
            .field("content_loaded", &self.content_loaded)
            .finish_non_exhaustive()
    }
}

impl Core {
    pub fn new(config: CoreConfig) -> Result<Self, CoreError> {
        Self::with_widget(config, Box::new(EventLog::new()))
    }

    pub fn with_widget(config: CoreConfig, widget: Box<dyn Widget>) -> Result<Self, CoreError> {
        config.validate()?;

        let settings = EngineSettings::from(&config);
        let engine = InputEngine::create(settings).initialize();
        let bounds = Bounds::new(config.surface.width, config.surface.height);

        info!(
            "Core initialized: {}x{} @ {} fps",
            config.surface.width, config.surface.height, config.surface.fps
        );

        Ok(Self {
            surface: PointerSurface::new(bounds, config.pointer.joypad_speed),
            frame: FrameBuffer::new(config.surface.width, config.surface.height),
            engine: Some(engine),
            widget,
            capabilities: None,
            content_loaded: false,
            config,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn engine(&self) -> Option<&InputEngine<Running>> {
        self.engine.as_ref()
    }

    pub fn surface(&self) -> &PointerSurface {
        &self.surface
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    pub fn is_content_loaded(&self) -> bool {
        self.content_loaded
    }

    /// Negotiates once; later calls keep the first answer.
    pub fn negotiate(&mut self, env: &mut dyn Environment) -> Capabilities {
        if let Some(caps) = self.capabilities {
            warn!("Host capabilities already negotiated, ignoring new environment");
            return caps;
        }
        let caps = Capabilities::negotiate(env);
        self.capabilities = Some(caps);
        caps
    }

    pub fn adopt_capabilities(&mut self, caps: Capabilities) {
        self.capabilities.get_or_insert(caps);
    }

    pub fn api_version(&self) -> u32 {
        API_VERSION
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            library_name: LIBRARY_NAME,
            library_version: LIBRARY_VERSION,
            valid_extensions: c"",
            need_fullpath: false,
            block_extract: false,
        }
    }

    pub fn av_info(&self) -> AvInfo {
        let surface = &self.config.surface;
        AvInfo {
            base_width: surface.width,
            base_height: surface.height,
            max_width: surface.width,
            max_height: surface.height,
            aspect_ratio: self.config.aspect_ratio(),
            fps: surface.fps,
            sample_rate: surface.sample_rate,
        }
    }

    pub fn region(&self) -> Region {
        Region::Ntsc
    }

    /// Content is optional; loading only wires up keyboard delivery.
    pub fn load_game(&mut self, env: &mut dyn Environment) -> bool {
        if !env.register_keyboard_callback() {
            warn!("Host refused keyboard callback, keys will not be delivered");
        }
        self.content_loaded = true;
        info!("Content loaded");
        true
    }

    pub fn load_game_special(&mut self, kind: u32, count: usize) -> bool {
        debug!("Rejecting special content type {} ({} items)", kind, count);
        false
    }

    pub fn unload_game(&mut self) {
        self.content_loaded = false;
        debug!("Content unloaded");
    }

    pub fn set_controller_port_device(&mut self, port: u32, device: u32) {
        match DeviceKind::from_wire(device) {
            Some(kind) => debug!("Port {} set to {:?}, ignored", port, kind),
            None => debug!("Port {} set to unknown device {}, ignored", port, device),
        }
    }

    pub fn reset(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.reset_cursor();
        }
        info!("Core reset");
    }

    pub fn serialize_size(&self) -> usize {
        0
    }

    pub fn serialize(&self, _out: &mut [u8]) -> bool {
        false
    }

    pub fn unserialize(&mut self, _data: &[u8]) -> bool {
        false
    }

    pub fn memory_data(&mut self, _id: u32) -> Option<&mut [u8]> {
        None
    }

    pub fn memory_size(&self, _id: u32) -> usize {
        0
    }

    pub fn cheat_reset(&mut self) {}

    pub fn cheat_set(&mut self, index: u32, enabled: bool, code: &str) {
        debug!("Ignoring cheat {} ({}): {}", index, enabled, code);
    }

    /// Runs one frame: poll and diff, derive gestures, drain queued keys,
    /// hand everything to the widget and present the rendered frame.
    pub fn run<H>(&mut self, host: &mut H, keys: &KeyQueue) -> Result<FrameReport, CoreError>
    where
        H: InputHost + VideoSink + ?Sized,
    {
        let engine = self.engine.as_mut().ok_or(CoreError::Released)?;
        let frame = engine.run_frame(host);

        for change in &frame.changes {
            debug!(
                "{:?} ({}, {}, {}) changed {} -> {}",
                change.device, change.port, change.index, change.id, change.old, change.new
            );
        }

        self.surface.on_mouse(frame.mouse);
        for button in &frame.held {
            self.surface.on_pad_button(*button);
        }
        self.surface.end_frame();

        for raw in keys.drain() {
            if let Some(translation) = keyboard::on_raw_key(raw) {
                self.surface.on_key(translation);
            }
        }

        let widget_events = self.surface.take_events();
        self.widget.handle(&widget_events);
        self.widget.render(&mut self.frame);
        host.present(&self.frame);

        Ok(FrameReport {
            frame,
            widget_events,
        })
    }

    /// Releases the engine. Returns `false` if it was already released.
    pub fn deinit(&mut self) -> bool {
        match self.engine.take() {
            Some(engine) => {
                let released = engine.teardown();
                debug!("Engine released: {}", released.is_released());
                true
            }
            None => {
                debug!("Deinit on released core ignored");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MouseId;
    use crate::gesture::RawKeyEvent;

    #[derive(Default)]
    struct StillHost {
        presented: usize,
        dx: i16,
    }

    impl InputHost for StillHost {
        fn poll(&mut self) {}

        fn sample(&mut self, _port: u32, device: DeviceKind, _index: u32, id: u32) -> u16 {
            if device == DeviceKind::Mouse && id == MouseId::X.id() {
                self.dx as u16
            } else {
                0
            }
        }
    }

    impl VideoSink for StillHost {
        fn present(&mut self, frame: &FrameBuffer) {
            assert_eq!(frame.pitch(), frame.width() as usize * 4);
            self.presented += 1;
        }
    }

    #[test]
    fn info_reports_fixed_surface() {
        let core = Core::new(CoreConfig::default()).unwrap();
        let av = core.av_info();
        assert_eq!((av.base_width, av.base_height), (1920, 1080));
        assert_eq!(av.fps, 60.0);
        assert_eq!(av.sample_rate, 30000.0);
        assert!((av.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);

        let info = core.system_info();
        assert_eq!(info.library_name.to_str().unwrap(), "RetroInput");
        assert_eq!(info.library_version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
        assert!(!info.need_fullpath);
        assert_eq!(core.region(), Region::Ntsc);
        assert_eq!(core.api_version(), 1);
    }

    #[test]
    fn persistence_is_unsupported() {
        let mut core = Core::new(CoreConfig::default()).unwrap();
        assert_eq!(core.serialize_size(), 0);
        assert!(!core.serialize(&mut [0u8; 4]));
        assert!(!core.unserialize(&[1, 2, 3]));
        assert!(core.memory_data(0).is_none());
        assert_eq!(core.memory_size(0), 0);
        assert!(!core.load_game_special(1, 2));
    }

    #[test]
    fn run_presents_and_reset_zeroes_cursor() {
        let mut core = Core::new(CoreConfig::default()).unwrap();
        let mut host = StillHost {
            dx: 30,
            ..Default::default()
        };
        let keys = KeyQueue::new();

        core.run(&mut host, &keys).unwrap();
        core.run(&mut host, &keys).unwrap();
        assert_eq!(host.presented, 2);
        assert_eq!(core.engine().unwrap().cursor().x, 60);

        core.reset();
        assert_eq!(core.engine().unwrap().cursor().x, 0);
    }

    #[test]
    fn queued_key_down_becomes_press_release_pair() {
        let mut core = Core::new(CoreConfig::default()).unwrap();
        let mut host = StillHost::default();
        let keys = KeyQueue::new();
        keys.push(RawKeyEvent {
            down: true,
            code: crate::device::keys::SPACE,
            character: ' ' as u32,
            modifiers: 0,
        });
        keys.push(RawKeyEvent {
            down: false,
            code: crate::device::keys::SPACE,
            character: ' ' as u32,
            modifiers: 0,
        });

        let report = core.run(&mut host, &keys).unwrap();
        assert_eq!(report.widget_events.len(), 2);
        assert!(keys.is_empty());
    }

    #[test]
    fn deinit_is_idempotent_and_stops_frames() {
        let mut core = Core::new(CoreConfig::default()).unwrap();
        assert!(core.deinit());
        assert!(!core.deinit());

        let result = core.run(&mut StillHost::default(), &KeyQueue::new());
        assert!(matches!(result, Err(CoreError::Released)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = CoreConfig::default();
        config.surface.width = 0;
        assert!(matches!(Core::new(config), Err(CoreError::Config(_))));
    }
}
