use crate::backend::{self, AudioBackend, VolumeReading};
use crate::gain::Gain;
use serde_derive::{Deserialize, Serialize};

pub static GET_INPUT_VOLUME: &str = "GetInputVolume";
pub static SET_INPUT_VOLUME: &str = "SetInputVolume";

// Sends one raw request of the production tool's control protocol and returns the response body
pub trait RawTransport {
    fn send_raw(&self, request_type: &str, data: &str) -> Result<String, backend::Error>;
}

impl<F> RawTransport for F
where
    F: Fn(&str, &str) -> Result<String, backend::Error>,
{
    fn send_raw(&self, request_type: &str, data: &str) -> Result<String, backend::Error> {
        self(request_type, data)
    }
}

#[derive(Serialize, Debug)]
struct GetInputVolumeRequest<'a> {
    #[serde(rename = "inputName")]
    input_name: &'a str,
}

#[derive(Serialize, Debug)]
struct SetInputVolumeRequest<'a> {
    #[serde(rename = "inputName")]
    input_name: &'a str,
    #[serde(rename = "inputVolumeDb")]
    input_volume_db: i32,
}

#[derive(Deserialize, Debug)]
struct InputVolumeResponse {
    #[serde(rename = "inputVolumeDb")]
    input_volume_db: f64,
    #[serde(rename = "inputVolumeMul")]
    input_volume_mul: Option<f64>,
}

pub struct RawBackend<T> {
    transport: T,
}

impl<T: RawTransport> RawBackend<T> {
    pub fn new(transport: T) -> RawBackend<T> {
        RawBackend { transport }
    }

    fn encode<S: serde::Serialize>(request: &str, body: &S) -> Result<String, backend::Error> {
        serde_json::to_string(body).map_err(|error| backend::Error::MalformedResponse {
            request: String::from(request),
            message: format!("{}", error),
        })
    }
}

impl<T: RawTransport> AudioBackend for RawBackend<T> {
    fn get_volume(&self, input: &str) -> Result<VolumeReading, backend::Error> {
        let data = Self::encode(GET_INPUT_VOLUME, &GetInputVolumeRequest { input_name: input })?;
        let response = self.transport.send_raw(GET_INPUT_VOLUME, &data)?;
        let response: InputVolumeResponse = match serde_json::from_str(&response) {
            Ok(response) => response,
            Err(error) => {
                return Err(backend::Error::MalformedResponse {
                    request: String::from(GET_INPUT_VOLUME),
                    message: format!("{}", error),
                })
            }
        };
        Ok(match response.input_volume_mul {
            Some(gain_linear) => VolumeReading {
                gain_db: response.input_volume_db,
                gain_linear,
            },
            None => VolumeReading::from_db(response.input_volume_db),
        })
    }

    fn set_volume(&self, input: &str, gain: Gain) -> Result<(), backend::Error> {
        let data = Self::encode(
            SET_INPUT_VOLUME,
            &SetInputVolumeRequest {
                input_name: input,
                input_volume_db: gain.db(),
            },
        )?;
        self.transport.send_raw(SET_INPUT_VOLUME, &data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn reply(body: &'static str) -> impl Fn(&str, &str) -> Result<String, backend::Error> {
        move |_: &str, _: &str| Ok(String::from(body))
    }

    #[test]
    fn get_volume_request_and_response() {
        let sent = RefCell::new(vec![]);
        let backend = RawBackend::new(|request: &str, data: &str| -> Result<String, backend::Error> {
            sent.borrow_mut()
                .push((String::from(request), String::from(data)));
            Ok(String::from(
                r#"{"inputVolumeDb": -6.5, "inputVolumeMul": 0.47, "extra": true}"#,
            ))
        });
        let reading = backend.get_volume("Desktop Audio").unwrap();
        assert_eq!(reading.gain_db, -6.5);
        assert_eq!(reading.gain_linear, 0.47);
        assert_eq!(
            *sent.borrow(),
            vec![(
                String::from("GetInputVolume"),
                String::from(r#"{"inputName":"Desktop Audio"}"#)
            )]
        );
    }

    #[test]
    fn set_volume_request() {
        let sent = RefCell::new(vec![]);
        let backend = RawBackend::new(|request: &str, data: &str| -> Result<String, backend::Error> {
            sent.borrow_mut()
                .push((String::from(request), String::from(data)));
            Ok(String::from("{}"))
        });
        backend.set_volume("Mic", Gain::new(-42)).unwrap();
        assert_eq!(
            *sent.borrow(),
            vec![(
                String::from("SetInputVolume"),
                String::from(r#"{"inputName":"Mic","inputVolumeDb":-42}"#)
            )]
        );
    }

    #[test]
    fn missing_multiplier_is_derived() {
        let backend = RawBackend::new(reply(r#"{"inputVolumeDb": -20}"#));
        let reading = backend.get_volume("Mic").unwrap();
        assert!((reading.gain_linear - 0.1).abs() < 1e-12);
    }

    #[test]
    fn malformed_response() {
        let backend = RawBackend::new(reply(r#"{"inputMuted": true}"#));
        assert!(matches!(
            backend.get_volume("Mic"),
            Err(backend::Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn transport_failure_propagates() {
        let backend = RawBackend::new(|_: &str, _: &str| -> Result<String, backend::Error> {
            Err(backend::Error::BackendUnavailable(String::from(
                "connection refused",
            )))
        });
        assert!(matches!(
            backend.get_volume("Mic"),
            Err(backend::Error::BackendUnavailable(_))
        ));
        assert!(backend.set_volume("Mic", Gain::new(0)).is_err());
    }
}
