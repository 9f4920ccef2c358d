use crate::gain::Gain;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("audio backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("unknown input {0:?}")]
    UnknownInput(String),

    #[error("malformed response to {request}: {message}")]
    MalformedResponse { request: String, message: String },
}

// What the backend reports for an input; it is authoritative over what was requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeReading {
    pub gain_db: f64,
    pub gain_linear: f64,
}

impl VolumeReading {
    pub fn from_db(gain_db: f64) -> VolumeReading {
        VolumeReading {
            gain_db,
            gain_linear: if gain_db.is_finite() {
                10f64.powf(gain_db / 20.0)
            } else {
                0.0
            },
        }
    }

    pub fn gain(&self) -> Gain {
        Gain::from_db(self.gain_db)
    }
}

pub trait AudioBackend {
    fn get_volume(&self, input: &str) -> Result<VolumeReading, Error>;
    fn set_volume(&self, input: &str, gain: Gain) -> Result<(), Error>;
}

impl<'a, B: AudioBackend + ?Sized> AudioBackend for &'a B {
    fn get_volume(&self, input: &str) -> Result<VolumeReading, Error> {
        (**self).get_volume(input)
    }

    fn set_volume(&self, input: &str, gain: Gain) -> Result<(), Error> {
        (**self).set_volume(input, gain)
    }
}

impl<B: AudioBackend + ?Sized> AudioBackend for std::sync::Arc<B> {
    fn get_volume(&self, input: &str) -> Result<VolumeReading, Error> {
        (**self).get_volume(input)
    }

    fn set_volume(&self, input: &str, gain: Gain) -> Result<(), Error> {
        (**self).set_volume(input, gain)
    }
}
