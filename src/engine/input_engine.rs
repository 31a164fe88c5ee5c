//! Input engine with a statum lifecycle.
//!
//! ```text
//! Initializing ──initialize──► Running ──teardown──► Released
//!                                │ ▲
//!                                └─┘ run_frame
//! ```
//!
//! Frames can only be run on a `Running` engine, so sampling before the store
//! exists or after it was freed does not type-check.

use super::poller::{poll_and_diff, ChangeEvent};
use crate::config::CoreConfig;
use crate::device::{JoypadButton, StateStore};
use crate::gesture::{
    derive_mouse, held_buttons, AccumulatorPolicy, Bounds, CursorAccumulator, MouseGesture, Point,
};
use crate::host::InputHost;
use statum::{machine, state};
use tracing::{debug, info};

#[state]
#[derive(Debug, Clone)]
pub enum EngineState {
    Initializing, // Store not yet allocated
    Running,      // Store allocated, frames may run
    Released,     // Store freed
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub bounds: Bounds,
    pub accumulator: AccumulatorPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&CoreConfig::default())
    }
}

impl From<&CoreConfig> for EngineSettings {
    fn from(config: &CoreConfig) -> Self {
        Self {
            bounds: Bounds::new(config.surface.width, config.surface.height),
            accumulator: config.pointer.accumulator,
        }
    }
}

/// Output of one frame: the edge-triggered change list plus the
/// level-triggered gestures derived after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub number: u64,
    pub changes: Vec<ChangeEvent>,
    pub mouse: MouseGesture,
    pub held: Vec<JoypadButton>,
}

#[machine]
#[derive(Debug)]
pub struct InputEngine<S: EngineState> {
    settings: EngineSettings,
    store: StateStore,
    cursor: CursorAccumulator,
    frames: u64,
}

impl<S: EngineState> InputEngine<S> {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cursor(&self) -> Point {
        self.cursor.position()
    }
}

impl InputEngine<Initializing> {
    pub fn create(settings: EngineSettings) -> Self {
        debug!(
            "Creating input engine for {}x{} surface",
            settings.bounds.width, settings.bounds.height
        );

        Self::new(
            settings,
            StateStore::default(),
            CursorAccumulator::new(settings.accumulator, settings.bounds),
            0,
        )
    }

    /// Allocates one zeroed slot per descriptor.
    pub fn initialize(mut self) -> InputEngine<Running> {
        self.store = StateStore::allocate();
        info!(
            "Input engine running with {} descriptors",
            self.store.slots().len()
        );
        self.transition()
    }
}

impl InputEngine<Running> {
    /// Poll, diff, then derive gestures from the updated store.
    pub fn run_frame<H: InputHost + ?Sized>(&mut self, host: &mut H) -> Frame {
        let mut changes = Vec::new();
        poll_and_diff(&mut self.store, host, &mut changes);

        let mouse = derive_mouse(&self.store, &mut self.cursor);
        let held = held_buttons(&self.store);

        self.frames += 1;
        Frame {
            number: self.frames,
            changes,
            mouse,
            held,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Zeroes the cursor. Stored device levels are kept.
    pub fn reset_cursor(&mut self) {
        debug!("Cursor reset");
        self.cursor.reset();
    }

    pub fn teardown(mut self) -> InputEngine<Released> {
        self.store.release();
        info!("Input engine released after {} frames", self.frames);
        self.transition()
    }
}

impl InputEngine<Released> {
    pub fn is_released(&self) -> bool {
        !self.store.is_allocated()
    }
}
