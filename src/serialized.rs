use crate::backend::{self, AudioBackend, VolumeReading};
use crate::controller::{FaderController, Pacer, StepOutcome, ThreadPacer};
use crate::fader::FadeConfig;
use crate::gain::Gain;
use crate::mute::MuteStateStore;
use crate::store::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Runs controller operations one at a time per input.
///
/// Each input gets its own lock on first use, held for the whole operation,
/// so a fade cannot interleave with another call on the same input. Inputs
/// don't wait for each other. A lock is dropped from the map once no call
/// holds or waits for it, so the map only grows with concurrently used inputs.
///
/// Calls that queue on the same lock run in whatever order the lock is
/// granted, not the order they were made.
pub struct SerializedFader<B, S, M, P = ThreadPacer> {
    controller: FaderController<B, S, M, P>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<B, S, M, P> SerializedFader<B, S, M, P>
where
    B: AudioBackend,
    S: KeyValueStore,
    M: MuteStateStore,
    P: Pacer,
{
    pub fn new(controller: FaderController<B, S, M, P>) -> Self {
        SerializedFader {
            controller,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn controller(&self) -> &FaderController<B, S, M, P> {
        &self.controller
    }

    fn lock_for(&self, input: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(String::from(input))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn exclusive<T, F>(&self, input: &str, f: F) -> T
    where
        F: FnOnce(&FaderController<B, S, M, P>) -> T,
    {
        let lock = self.lock_for(input);
        let result = {
            // poisoning is ignored, nothing is kept under the lock
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f(&self.controller)
        };
        drop(lock);
        self.release(input);
        result
    }

    // clones are only handed out under the map lock, so a count of one means unused
    fn release(&self, input: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let unused = match locks.get(input) {
            Some(lock) => Arc::strong_count(lock) == 1,
            None => false,
        };
        if unused {
            locks.remove(input);
        }
    }

    pub fn get_volume(&self, input: &str) -> Result<VolumeReading, backend::Error> {
        self.exclusive(input, |c| c.backend().get_volume(input))
    }

    pub fn step_up(
        &self,
        input: &str,
        max: Gain,
        step_db: i32,
    ) -> Result<StepOutcome, backend::Error> {
        self.exclusive(input, |c| c.step_up(input, max, step_db))
    }

    pub fn step_down(
        &self,
        input: &str,
        min: Gain,
        step_db: i32,
    ) -> Result<StepOutcome, backend::Error> {
        self.exclusive(input, |c| c.step_down(input, min, step_db))
    }

    pub fn fade_to_silence(
        &self,
        scene: &str,
        input: &str,
        config: &FadeConfig,
    ) -> Result<VolumeReading, backend::Error> {
        self.exclusive(input, |c| c.fade_to_silence(scene, input, config))
    }

    pub fn fade_from_silence(
        &self,
        scene: &str,
        input: &str,
        config: &FadeConfig,
    ) -> Result<VolumeReading, backend::Error> {
        self.exclusive(input, |c| c.fade_from_silence(scene, input, config))
    }
}
