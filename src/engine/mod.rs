//! Poll & diff engine.

pub mod input_engine;
pub mod poller;

pub use input_engine::{
    EngineSettings, EngineState, Frame, InputEngine, Initializing, Released, Running,
};
pub use poller::{poll_and_diff, ChangeEvent};
