use serde::Serialize;
use wasm_bindgen::prelude::*;

use qrseq::{Sequencer, SequencerConfig, SequencerError};

#[derive(Serialize)]
struct BindingError {
    kind: &'static str,
    message: String,
}

fn error_kind(e: &SequencerError) -> &'static str {
    match e {
        SequencerError::InvalidDimensions { .. } => "invalidDimensions",
        SequencerError::InvalidStepAddress { .. } => "invalidStepAddress",
        SequencerError::Decode { .. } => "decode",
        SequencerError::InvalidLayout(_) => "invalidLayout",
        SequencerError::Config(_) => "config",
        SequencerError::Qr(_) => "qr",
        SequencerError::MissingContainer(_) => "missingContainer",
    }
}

fn to_js_error(e: SequencerError) -> JsValue {
    let error = BindingError {
        kind: error_kind(&e),
        message: e.to_string(),
    };
    JsValue::from_str(&serde_json::to_string(&error).unwrap_or_else(|_| e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The sequencer as seen from the page. The page owns the DOM and the audio clock; this
/// owns the pattern, the URL fragment and the QR code.
#[wasm_bindgen]
pub struct QrSequencer {
    inner: Sequencer,
}

#[wasm_bindgen]
impl QrSequencer {
    /// Build from optional YAML configuration and the page URL (`window.location.href`).
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>, url: Option<String>) -> Result<QrSequencer, JsValue> {
        let config = match config_yaml {
            Some(yaml) => SequencerConfig::from_yaml(&yaml).map_err(to_js_error)?,
            None => SequencerConfig::default(),
        };
        let inner = match url {
            Some(url) => Sequencer::load(config, &url),
            None => Sequencer::new(config),
        }
        .map_err(to_js_error)?;
        Ok(QrSequencer { inner })
    }

    /// First render. The page passes the id of the container it found, or nothing when the
    /// lookup failed; a missing container is fatal.
    pub fn mount(&self, container_id: Option<String>) -> Result<String, JsValue> {
        match container_id {
            Some(id) if !id.is_empty() => self.frame_json(),
            _ => Err(to_js_error(SequencerError::MissingContainer(
                "no element to render the sequencer into".to_string(),
            ))),
        }
    }

    /// The whole grid as JSON: `{ size, cells: [{ row, col, kind, ... }] }`
    pub fn frame_json(&self) -> Result<String, JsValue> {
        let frame = self.inner.frame().map_err(to_js_error)?;
        to_json(&frame)
    }

    pub fn size(&self) -> usize {
        self.inner.layout().size()
    }

    /// Toggle a step; returns its new value. The page should then write `hash()` to
    /// `location.hash` and re-render.
    pub fn toggle(&mut self, track: usize, step: usize) -> Result<bool, JsValue> {
        self.inner.toggle(track, step).map_err(to_js_error)
    }

    /// Toggle the step button at a grid cell. Returns `undefined` for other cells.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<Option<bool>, JsValue> {
        self.inner.toggle_cell(row, col).map_err(to_js_error)
    }

    /// Restore from `location.hash`, e.g. on `hashchange`.
    pub fn load_hash(&mut self, hash: &str) -> Result<(), JsValue> {
        self.inner.load_hash(hash).map_err(to_js_error)
    }

    pub fn hash(&self) -> String {
        self.inner.hash().to_string()
    }

    pub fn share_url(&self) -> String {
        self.inner.share_url()
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    /// Stop playback. Returns the column whose highlight the page must clear, if any.
    pub fn stop(&mut self) -> Option<usize> {
        self.inner.stop()
    }

    /// Advance one step. Returns the tick as JSON, or `undefined` when stopped.
    pub fn tick(&mut self) -> Result<Option<String>, JsValue> {
        match self.inner.tick().map_err(to_js_error)? {
            Some(tick) => to_json(&tick).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.inner.set_bpm(bpm);
    }

    pub fn bpm(&self) -> f32 {
        self.inner.transport().bpm()
    }

    pub fn step_duration_ms(&self) -> u64 {
        self.inner.transport().step_duration_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            error_kind(&SequencerError::Decode {
                position: 0,
                character: 'z'
            }),
            "decode"
        );
        assert_eq!(
            error_kind(&SequencerError::MissingContainer(String::new())),
            "missingContainer"
        );
    }

    #[test]
    fn test_frame_json_shape() {
        let sequencer = Sequencer::new(SequencerConfig::default()).unwrap();
        let frame = sequencer.frame().unwrap();
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.starts_with("{\"size\":33,"));
        assert!(json.contains("\"kind\":\"border\""));
        assert!(json.contains("\"kind\":\"step\",\"track\":0,\"step\":0,\"active\":false,\"playing\":false"));
    }
}
