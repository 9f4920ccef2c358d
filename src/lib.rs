pub mod backend;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod fader;
pub mod gain;
pub mod mute;
pub mod raw;
pub mod serialized;
pub mod simulated;
pub mod store;

pub use crate::backend::{AudioBackend, VolumeReading};
pub use crate::controller::{FaderController, Pacer, StepOutcome, ThreadPacer};
pub use crate::error::Error;
pub use crate::fader::FadeConfig;
pub use crate::gain::Gain;
pub use crate::mute::MuteStateStore;
pub use crate::serialized::SerializedFader;
pub use crate::store::{KeyValueStore, MemoryStore, Value};
