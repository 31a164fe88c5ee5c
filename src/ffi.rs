//! `retro_*` entry points for loading the crate as a libretro core.
//!
//! The host drives everything through free functions, so the plugin lives in
//! a process-wide static instance. Keyboard events and host logging use their own
//! statics because the host may call back into us while [`INSTANCE`] is
//! locked (keys from inside its poll, log lines from any tracing event).

use crate::config::CoreConfig;
use crate::gesture::{KeyQueue, RawKeyEvent};
use crate::host::{Capabilities, Environment, HostBindings, HostBindingsBuilder};
use crate::plugin::Core;
use crate::surface::PixelFormat;
use libc::{c_char, c_uint, c_void, size_t};
use libretro_sys::{
    AudioSampleBatchFn, AudioSampleFn, EnvironmentFn, GameInfo, InputPollFn, InputStateFn,
    KeyboardCallback, LogCallback, LogLevel, LogPrintfFn, SystemAvInfo, SystemInfo,
    VideoRefreshFn,
};
use std::ffi::{CStr, CString};
use std::fmt::Write as _;
use std::mem::MaybeUninit;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{FmtSubscriber, Layer};

#[derive(Default)]
struct Instance {
    core: Option<Core>,
    registry: HostBindingsBuilder,
    bindings: Option<HostBindings>,
    environment: Option<EnvironmentFn>,
    capabilities: Option<Capabilities>,
}

static INSTANCE: Mutex<Option<Instance>> = Mutex::new(None);
static KEYS: KeyQueue = KeyQueue::new();
static HOST_LOG: OnceLock<LogPrintfFn> = OnceLock::new();

fn with_instance<R>(f: impl FnOnce(&mut Instance) -> R) -> R {
    let mut guard = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
    f(guard.get_or_insert_with(Instance::default))
}

impl Instance {
    fn core(&mut self) -> Option<&mut Core> {
        if self.core.is_none() {
            let config = CoreConfig::load().unwrap_or_else(|e| {
                warn!("Falling back to default config: {}", e);
                CoreConfig::default()
            });
            match Core::new(config).or_else(|e| {
                warn!("Config rejected ({}), using defaults", e);
                Core::new(CoreConfig::default())
            }) {
                Ok(mut core) => {
                    if let Some(caps) = self.capabilities {
                        core.adopt_capabilities(caps);
                    }
                    self.core = Some(core);
                }
                Err(e) => error!("Failed to create core: {}", e),
            }
        }
        self.core.as_mut()
    }

    /// Seals the registry into bindings on first use.
    fn bindings(&mut self) -> Option<&mut HostBindings> {
        if self.bindings.is_none() {
            if !self.registry.is_complete() {
                error!("Frame requested before host callbacks were registered, dropping it");
                return None;
            }
            match std::mem::take(&mut self.registry).build() {
                Ok(bindings) => self.bindings = Some(bindings),
                Err(e) => {
                    error!("Failed to bind host callbacks: {}", e);
                    return None;
                }
            }
        }
        self.bindings.as_mut()
    }
}

/// Adapter issuing environment commands through the host's callback.
struct RetroEnvironment(EnvironmentFn);

impl RetroEnvironment {
    fn call<T>(&mut self, cmd: c_uint, data: *mut T) -> bool {
        // SAFETY: `data` points at a live value of the type the command expects.
        unsafe { (self.0)(cmd, data.cast::<c_void>()) }
    }
}

impl Environment for RetroEnvironment {
    fn declare_no_variables(&mut self) -> bool {
        let mut terminator = libretro_sys::Variable {
            key: std::ptr::null(),
            value: std::ptr::null(),
        };
        self.call(libretro_sys::ENVIRONMENT_SET_VARIABLES, &mut terminator)
    }

    fn set_support_no_game(&mut self, supported: bool) -> bool {
        let mut flag = supported;
        self.call(libretro_sys::ENVIRONMENT_SET_SUPPORT_NO_GAME, &mut flag)
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        let mut wire = match format {
            PixelFormat::Xrgb8888 => libretro_sys::PixelFormat::ARGB8888,
        };
        self.call(libretro_sys::ENVIRONMENT_SET_PIXEL_FORMAT, &mut wire)
    }

    fn request_log_interface(&mut self) -> bool {
        let mut callback = MaybeUninit::<LogCallback>::uninit();
        if !self.call(libretro_sys::ENVIRONMENT_GET_LOG_INTERFACE, callback.as_mut_ptr()) {
            return false;
        }
        // SAFETY: the host filled the struct when it returned true.
        let callback = unsafe { callback.assume_init() };
        let _ = HOST_LOG.set(callback.log);
        true
    }

    fn register_keyboard_callback(&mut self) -> bool {
        let mut callback = KeyboardCallback {
            callback: keyboard_event,
        };
        self.call(libretro_sys::ENVIRONMENT_SET_KEYBOARD_CALLBACK, &mut callback)
    }
}

extern "C" fn keyboard_event(down: bool, keycode: c_uint, character: u32, key_modifiers: u16) {
    KEYS.push(RawKeyEvent {
        down,
        code: keycode,
        character,
        modifiers: key_modifiers,
    });
}

/// Forwards tracing events to the host's log callback.
struct HostLogLayer;

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{:?}", value);
        } else {
            let _ = write!(self.0, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let Some(log) = HOST_LOG.get() else {
            return;
        };
        let mut message = MessageVisitor::default();
        event.record(&mut message);

        let level = match *event.metadata().level() {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        };
        let Some(line) = host_line(&message.0) else {
            return;
        };
        // SAFETY: `line` is NUL-terminated and carries no format directives.
        unsafe { log(level, line.as_ptr()) }
    }
}

/// The host treats the line as a printf format, so `%` is doubled.
fn host_line(message: &str) -> Option<CString> {
    CString::new(format!("[retroinput] {}\n", message.replace('%', "%%"))).ok()
}

fn install_logging(host_log: bool) {
    let result = if host_log {
        tracing_subscriber::registry()
            .with(HostLogLayer.with_filter(LevelFilter::INFO))
            .try_init()
            .map_err(|e| e.to_string())
    } else {
        FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())
    };
    if let Err(e) = result {
        debug!("Logging already installed: {}", e);
    }
}

#[no_mangle]
pub extern "C" fn retro_api_version() -> c_uint {
    crate::plugin::API_VERSION
}

#[no_mangle]
pub extern "C" fn retro_set_environment(callback: EnvironmentFn) {
    let host_log = with_instance(|p| {
        p.environment = Some(callback);
        if p.capabilities.is_some() {
            return None;
        }
        let caps = Capabilities::negotiate(&mut RetroEnvironment(callback));
        p.capabilities = Some(caps);
        Some(caps.host_log)
    });
    if let Some(host_log) = host_log {
        install_logging(host_log);
    }
}

#[no_mangle]
pub extern "C" fn retro_set_video_refresh(callback: VideoRefreshFn) {
    with_instance(|p| {
        p.registry.set_video(move |frame| {
            // SAFETY: the frame outlives the call; pitch matches the layout.
            unsafe {
                callback(
                    frame.as_ptr().cast::<c_void>(),
                    frame.width(),
                    frame.height(),
                    frame.pitch(),
                )
            }
        })
    });
}

#[no_mangle]
pub extern "C" fn retro_set_audio_sample(callback: AudioSampleFn) {
    // SAFETY: plain host function pointer.
    with_instance(|p| p.registry.set_audio_sample(move |l, r| unsafe { callback(l, r) }));
}

#[no_mangle]
pub extern "C" fn retro_set_audio_sample_batch(callback: AudioSampleBatchFn) {
    with_instance(|p| {
        p.registry
            // SAFETY: interleaved stereo, so frames is half the sample count.
            .set_audio_batch(move |data| unsafe { callback(data.as_ptr(), data.len() / 2) })
    });
}

#[no_mangle]
pub extern "C" fn retro_set_input_poll(callback: InputPollFn) {
    // SAFETY: plain host function pointer.
    with_instance(|p| p.registry.set_poll(move || unsafe { callback() }));
}

#[no_mangle]
pub extern "C" fn retro_set_input_state(callback: InputStateFn) {
    with_instance(|p| {
        p.registry.set_sample(move |port, device, index, id| {
            // SAFETY: plain host function pointer.
            unsafe { callback(port, device, index, id) as u16 }
        })
    });
}

#[no_mangle]
pub extern "C" fn retro_init() {
    with_instance(|p| {
        if p.core().is_some() {
            info!("Core instance initialized");
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_deinit() {
    with_instance(|p| {
        if let Some(mut core) = p.core.take() {
            core.deinit();
        }
    });
    KEYS.drain();
}

#[no_mangle]
pub unsafe extern "C" fn retro_get_system_info(info: *mut SystemInfo) {
    if info.is_null() {
        return;
    }
    let system = with_instance(|p| p.core().map(|core| core.system_info()));
    let Some(system) = system else {
        return;
    };
    info.write(SystemInfo {
        library_name: system.library_name.as_ptr(),
        library_version: system.library_version.as_ptr(),
        valid_extensions: system.valid_extensions.as_ptr(),
        need_fullpath: system.need_fullpath,
        block_extract: system.block_extract,
    });
}

#[no_mangle]
pub unsafe extern "C" fn retro_get_system_av_info(info: *mut SystemAvInfo) {
    if info.is_null() {
        return;
    }
    let Some(av) = with_instance(|p| p.core().map(|core| core.av_info())) else {
        return;
    };
    info.write(SystemAvInfo {
        geometry: libretro_sys::GameGeometry {
            base_width: av.base_width,
            base_height: av.base_height,
            max_width: av.max_width,
            max_height: av.max_height,
            aspect_ratio: av.aspect_ratio,
        },
        timing: libretro_sys::SystemTiming {
            fps: av.fps,
            sample_rate: av.sample_rate,
        },
    });
}

#[no_mangle]
pub extern "C" fn retro_set_controller_port_device(port: c_uint, device: c_uint) {
    with_instance(|p| {
        if let Some(core) = p.core() {
            core.set_controller_port_device(port, device);
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_reset() {
    with_instance(|p| {
        if let Some(core) = p.core() {
            core.reset();
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_run() {
    with_instance(|p| {
        if p.bindings().is_none() {
            return;
        }
        let Instance { core, bindings, .. } = p;
        let (Some(core), Some(bindings)) = (core.as_mut(), bindings.as_mut()) else {
            error!("Frame requested without an initialized core");
            return;
        };
        if let Err(e) = core.run(bindings, &KEYS) {
            error!("Frame failed: {}", e);
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_serialize_size() -> size_t {
    with_instance(|p| p.core().map_or(0, |core| core.serialize_size()))
}

#[no_mangle]
pub extern "C" fn retro_serialize(_data: *mut c_void, _size: size_t) -> bool {
    false
}

#[no_mangle]
pub extern "C" fn retro_unserialize(_data: *const c_void, _size: size_t) -> bool {
    false
}

#[no_mangle]
pub extern "C" fn retro_cheat_reset() {
    with_instance(|p| {
        if let Some(core) = p.core() {
            core.cheat_reset();
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn retro_cheat_set(index: c_uint, enabled: bool, code: *const c_char) {
    let code = if code.is_null() {
        String::new()
    } else {
        CStr::from_ptr(code).to_string_lossy().into_owned()
    };
    with_instance(|p| {
        if let Some(core) = p.core() {
            core.cheat_set(index, enabled, &code);
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_load_game(_game: *const GameInfo) -> bool {
    with_instance(|p| {
        let Some(env) = p.environment else {
            warn!("Content loaded without a host environment");
            return p.core().is_some();
        };
        match p.core() {
            Some(core) => core.load_game(&mut RetroEnvironment(env)),
            None => false,
        }
    })
}

#[no_mangle]
pub extern "C" fn retro_load_game_special(
    game_type: c_uint,
    _info: *const GameInfo,
    num_info: size_t,
) -> bool {
    with_instance(|p| {
        p.core()
            .is_some_and(|core| core.load_game_special(game_type, num_info))
    })
}

#[no_mangle]
pub extern "C" fn retro_unload_game() {
    with_instance(|p| {
        if let Some(core) = p.core() {
            core.unload_game();
        }
    });
}

#[no_mangle]
pub extern "C" fn retro_get_region() -> c_uint {
    with_instance(|p| p.core().map_or(0, |core| core.region().wire()))
}

#[no_mangle]
pub extern "C" fn retro_get_memory_data(_id: c_uint) -> *mut c_void {
    std::ptr::null_mut()
}

#[no_mangle]
pub extern "C" fn retro_get_memory_size(id: c_uint) -> size_t {
    with_instance(|p| p.core().map_or(0, |core| core.memory_size(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static POLLS: AtomicUsize = AtomicUsize::new(0);
    static FRAMES: Mutex<Vec<(c_uint, c_uint, size_t)>> = Mutex::new(Vec::new());

    unsafe extern "C" fn host_poll() {
        POLLS.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn host_state(_port: c_uint, _device: c_uint, _index: c_uint, _id: c_uint) -> i16 {
        0
    }

    unsafe extern "C" fn host_video(_data: *const c_void, width: c_uint, height: c_uint, pitch: size_t) {
        FRAMES.lock().unwrap().push((width, height, pitch));
    }

    #[test]
    fn lifecycle_through_the_c_entry_points() {
        retro_init();
        retro_run();
        assert_eq!(POLLS.load(Ordering::SeqCst), 0);
        assert!(FRAMES.lock().unwrap().is_empty());

        retro_set_input_poll(host_poll);
        retro_set_input_state(host_state);
        retro_set_video_refresh(host_video);

        keyboard_event(true, u32::from(b'h'), u32::from('h'), 0);
        assert_eq!(KEYS.len(), 1);
        retro_run();
        assert!(KEYS.is_empty());
        assert_eq!(POLLS.load(Ordering::SeqCst), 1);

        let mut av = MaybeUninit::<SystemAvInfo>::uninit();
        let av = unsafe {
            retro_get_system_av_info(av.as_mut_ptr());
            av.assume_init()
        };
        let (width, height) = (av.geometry.base_width, av.geometry.base_height);
        assert_eq!(
            *FRAMES.lock().unwrap(),
            vec![(width, height, width as size_t * 4)]
        );

        assert!(!retro_load_game_special(1, std::ptr::null(), 2));
        assert_eq!(retro_serialize_size(), 0);
        assert_eq!(retro_get_memory_size(libretro_sys::MEMORY_SAVE_RAM), 0);

        retro_deinit();
        retro_deinit();
        retro_run();
        assert_eq!(FRAMES.lock().unwrap().len(), 1);
    }

    #[test]
    fn persistence_and_memory_are_unsupported() {
        let mut buffer = [0u8; 16];
        assert!(!retro_serialize(buffer.as_mut_ptr().cast(), buffer.len()));
        assert!(!retro_unserialize(buffer.as_ptr().cast(), buffer.len()));
        assert!(retro_get_memory_data(libretro_sys::MEMORY_SAVE_RAM).is_null());
    }

    #[test]
    fn host_log_lines_escape_format_directives() {
        let line = host_line("loaded /tmp/100%done.toml").unwrap();
        assert_eq!(line.to_str().unwrap(), "[retroinput] loaded /tmp/100%%done.toml\n");
        assert!(host_line("nul\0inside").is_none());
    }
}
