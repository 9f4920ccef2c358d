use crate::backend::{self, AudioBackend, VolumeReading};
use crate::fader::{FadeConfig, Fader, DEFAULT_STEP_DB};
use crate::gain::{Gain, CEILING, FLOOR};
use crate::mute::MuteStateStore;
use crate::store::{self, KeyValueStore, Value};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

// Suspends the calling flow between two fade steps
pub trait Pacer {
    fn pause(&self, delay: Duration);
}

impl<'a, P: Pacer + ?Sized> Pacer for &'a P {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay)
    }
}

pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        thread::sleep(delay);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    // already at the limit; carries the reading that was observed
    Unchanged(VolumeReading),
    // carries the reading after the change, as the backend applied it
    Changed(VolumeReading),
}

impl StepOutcome {
    pub fn reading(&self) -> VolumeReading {
        match *self {
            StepOutcome::Unchanged(reading) | StepOutcome::Changed(reading) => reading,
        }
    }
}

/// Nudges and fades the gain of audio inputs.
///
/// Every call reads the current gain fresh from the backend, so nothing is
/// cached between calls except the volume recorded before a fade to silence.
/// Fades block the calling thread for their whole duration. Calls for the same
/// input from several threads are not coordinated here; see
/// [`crate::serialized::SerializedFader`] for that.
pub struct FaderController<B, S, M, P = ThreadPacer> {
    backend: B,
    store: S,
    mute: M,
    pacer: P,
}

impl<B, S, M> FaderController<B, S, M, ThreadPacer>
where
    B: AudioBackend,
    S: KeyValueStore,
    M: MuteStateStore,
{
    pub fn new(backend: B, store: S, mute: M) -> Self {
        FaderController::with_pacer(backend, store, mute, ThreadPacer)
    }
}

impl<B, S, M, P> FaderController<B, S, M, P>
where
    B: AudioBackend,
    S: KeyValueStore,
    M: MuteStateStore,
    P: Pacer,
{
    pub fn with_pacer(backend: B, store: S, mute: M, pacer: P) -> Self {
        FaderController {
            backend,
            store,
            mute,
            pacer,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn step_up(
        &self,
        input: &str,
        max: Gain,
        step_db: i32,
    ) -> Result<StepOutcome, backend::Error> {
        let step_db = positive_step(step_db);
        let reading = self.backend.get_volume(input)?;
        let volume = Gain::round_db(reading.gain_db);
        if volume >= max.db() {
            debug!("{} already at {} dB, max {}", input, volume, max);
            return Ok(StepOutcome::Unchanged(reading));
        }
        let volume = Gain::min(Gain::new(volume.saturating_add(step_db)), max);
        self.backend.set_volume(input, volume)?;
        Ok(StepOutcome::Changed(self.publish(input)?))
    }

    pub fn step_down(
        &self,
        input: &str,
        min: Gain,
        step_db: i32,
    ) -> Result<StepOutcome, backend::Error> {
        let step_db = positive_step(step_db);
        let reading = self.backend.get_volume(input)?;
        let volume = Gain::round_db(reading.gain_db);
        if volume <= min.db() {
            debug!("{} already at {} dB, min {}", input, volume, min);
            return Ok(StepOutcome::Unchanged(reading));
        }
        let volume = Gain::max(Gain::new(volume.saturating_sub(step_db)), min);
        self.backend.set_volume(input, volume)?;
        Ok(StepOutcome::Changed(self.publish(input)?))
    }

    pub fn fade_to_silence(
        &self,
        scene: &str,
        input: &str,
        config: &FadeConfig,
    ) -> Result<VolumeReading, backend::Error> {
        let delay = config.step_delay();
        let start = self.backend.get_volume(input)?.gain();
        self.store.set(
            &store::previous_volume_key(input),
            Value::Int(start.db() as i64),
        );

        let mut fader = Fader::fade_out(start);
        self.ramp(input, &mut fader, delay)?;
        if !fader.reached_target() {
            warn!(
                "{} fade out stopped at {}, forcing {}",
                input,
                fader.value(),
                FLOOR
            );
            self.backend.set_volume(input, FLOOR)?;
        }

        self.mute.set_muted(scene, input, true)?;
        info!("{} faded out from {}", input, start);
        self.publish(input)
    }

    pub fn fade_from_silence(
        &self,
        scene: &str,
        input: &str,
        config: &FadeConfig,
    ) -> Result<VolumeReading, backend::Error> {
        let delay = config.step_delay();
        let target = self.previous_volume(input);
        let start = self.backend.get_volume(input)?.gain();

        // unmute precedes the first ramp step
        self.mute.set_muted(scene, input, false)?;

        let mut fader = Fader::fade_in(start, target);
        self.ramp(input, &mut fader, delay)?;
        if !fader.reached_target() {
            warn!(
                "{} fade in stopped at {}, forcing {}",
                input,
                fader.value(),
                target
            );
            self.backend.set_volume(input, target)?;
        }

        info!("{} faded in to {}", input, target);
        self.publish(input)
    }

    // an absent record means the ceiling; stale values are clamped
    fn previous_volume(&self, input: &str) -> Gain {
        let value = self.store.get_or(
            &store::previous_volume_key(input),
            Value::Int(CEILING.db() as i64),
        );
        Gain::from_db(value.as_f64())
    }

    fn ramp(&self, input: &str, fader: &mut Fader, delay: Duration) -> Result<(), backend::Error> {
        for volume in fader {
            debug!("{} volume {}", input, volume);
            self.backend.set_volume(input, volume)?;
            self.pacer.pause(delay);
        }
        Ok(())
    }

    // publishes what the backend reports, not what was requested
    fn publish(&self, input: &str) -> Result<VolumeReading, backend::Error> {
        let reading = self.backend.get_volume(input)?;
        self.store
            .set(&store::volume_db_key(input), Value::Float(reading.gain_db));
        self.store.set(
            &store::volume_mul_key(input),
            Value::Float(reading.gain_linear),
        );
        Ok(reading)
    }
}

fn positive_step(step_db: i32) -> i32 {
    if step_db <= 0 {
        debug!("step {} dB is not positive, using {} dB", step_db, DEFAULT_STEP_DB);
        DEFAULT_STEP_DB
    } else {
        step_db
    }
}
