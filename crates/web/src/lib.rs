//! WASM bindings for BitokPoW
//!
//! Byte arguments are accepted as a `Uint8Array` or as a hex string. Any other
//! value, including a missing argument, throws.

use bitokpow_core::{
    Error, HEADER_SIZE, HashEngine, N, PERSONALIZATION, R, SCRATCHPAD_SIZE, TOTAL_MEMORY,
};
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Decode a hex string argument, tolerating an optional `0x` prefix
fn decode_hex_argument(name: &str, text: &str) -> Result<Vec<u8>, Error> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).map_err(|e| Error::argument(format!("{name} is not valid hex: {e}")))
}

/// Read a byte argument from JS
fn bytes_argument(name: &str, value: &JsValue) -> Result<Vec<u8>, Error> {
    if let Some(array) = value.dyn_ref::<Uint8Array>() {
        return Ok(array.to_vec());
    }
    match value.as_string() {
        Some(text) => decode_hex_argument(name, &text),
        None => Err(Error::argument(format!(
            "{name} must be a Uint8Array or a hex string"
        ))),
    }
}

/// Compute the BitokPoW digest of `data`
#[wasm_bindgen]
pub fn hash(data: JsValue) -> Result<Vec<u8>, JsError> {
    let input = bytes_argument("data", &data)?;
    Ok(bitokpow_core::hash(&input)?.to_vec())
}

/// Check whether an 80-byte header meets a 32-byte little-endian target
#[wasm_bindgen(js_name = verifyBlock)]
pub fn verify_block(header: JsValue, target: JsValue) -> Result<bool, JsError> {
    let header = bytes_argument("header", &header)?;
    let target = bytes_argument("target", &target)?;
    Ok(bitokpow_core::verify_block(&header, &target)?)
}

/// Milliseconds from the page clock, or the wall clock outside a window
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[wasm_bindgen]
pub struct Benchmark {
    engine: HashEngine,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Benchmark {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: HashEngine::new(),
        }
    }

    /// Hash `num_hashes` headers with varying nonces
    /// Returns hashrate in H/s
    #[wasm_bindgen]
    pub fn run(&mut self, num_hashes: u32) -> Result<f64, JsError> {
        let mut header = [0u8; HEADER_SIZE];
        let start = now_ms();

        for nonce in 0..num_hashes {
            header[HEADER_SIZE - 4..].copy_from_slice(&nonce.to_le_bytes());
            self.engine.digest(&header)?;
        }

        let elapsed_s = (now_ms() - start) / 1000.0;
        if elapsed_s <= 0.0 {
            return Ok(0.0);
        }
        Ok(num_hashes as f64 / elapsed_s)
    }

    /// Get algorithm parameters as JSON string
    #[wasm_bindgen]
    pub fn get_params(&self) -> String {
        params_json()
    }
}

fn params_json() -> String {
    format!(
        r#"{{"algorithm": "yespower", "n": {}, "r": {}, "personalization": "{}", "scratchpad_kb": {}, "total_kb": {}}}"#,
        N,
        R,
        String::from_utf8_lossy(PERSONALIZATION),
        SCRATCHPAD_SIZE / 1024,
        TOTAL_MEMORY / 1024
    )
}
