use crate::backend::{self, AudioBackend, VolumeReading};
use crate::gain::Gain;
use crate::mute::MuteStateStore;
use std::collections::HashMap;
use std::sync::Mutex;

// the production tool accepts boosts up to this much
pub const MAX_BOOST_DB: f64 = 26.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Set(String, i32),
    Mute {
        scene: String,
        input: String,
        muted: bool,
    },
}

#[derive(Default)]
struct State {
    volumes: HashMap<String, f64>,
    muted: HashMap<(String, String), bool>,
    journal: Vec<Call>,
}

/// In-memory stand-in for the production tool. Clamps to its own range, so
/// readings are not guaranteed to equal what was set.
#[derive(Default)]
pub struct SimulatedBackend {
    state: Mutex<State>,
}

impl SimulatedBackend {
    pub fn new() -> SimulatedBackend {
        SimulatedBackend::default()
    }

    pub fn with_input(self, input: &str, gain_db: f64) -> SimulatedBackend {
        self.add_input(input, gain_db);
        self
    }

    pub fn add_input(&self, input: &str, gain_db: f64) {
        let mut state = self.lock();
        state
            .volumes
            .insert(String::from(input), gain_db.clamp(-100.0, MAX_BOOST_DB));
    }

    pub fn volume(&self, input: &str) -> Option<f64> {
        self.lock().volumes.get(input).copied()
    }

    pub fn is_muted(&self, scene: &str, input: &str) -> Option<bool> {
        self.lock()
            .muted
            .get(&(String::from(scene), String::from(input)))
            .copied()
    }

    pub fn journal(&self) -> Vec<Call> {
        self.lock().journal.clone()
    }

    // the gains of all Set calls, in order
    pub fn sets(&self) -> Vec<i32> {
        self.lock()
            .journal
            .iter()
            .filter_map(|call| match call {
                Call::Set(_, db) => Some(*db),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioBackend for SimulatedBackend {
    fn get_volume(&self, input: &str) -> Result<VolumeReading, backend::Error> {
        let mut state = self.lock();
        state.journal.push(Call::Get(String::from(input)));
        match state.volumes.get(input) {
            Some(gain_db) => Ok(VolumeReading::from_db(*gain_db)),
            None => Err(backend::Error::UnknownInput(String::from(input))),
        }
    }

    fn set_volume(&self, input: &str, gain: Gain) -> Result<(), backend::Error> {
        let mut state = self.lock();
        state.journal.push(Call::Set(String::from(input), gain.db()));
        match state.volumes.get_mut(input) {
            Some(volume) => {
                *volume = (gain.db() as f64).clamp(-100.0, MAX_BOOST_DB);
                Ok(())
            }
            None => Err(backend::Error::UnknownInput(String::from(input))),
        }
    }
}

impl MuteStateStore for SimulatedBackend {
    fn set_muted(&self, scene: &str, input: &str, muted: bool) -> Result<(), backend::Error> {
        let mut state = self.lock();
        state.journal.push(Call::Mute {
            scene: String::from(scene),
            input: String::from(input),
            muted,
        });
        if !state.volumes.contains_key(input) {
            return Err(backend::Error::UnknownInput(String::from(input)));
        }
        state
            .muted
            .insert((String::from(scene), String::from(input)), muted);
        Ok(())
    }
}
