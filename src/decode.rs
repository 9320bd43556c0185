//! Decode entry points: payload in, live value out.

use telepath_value::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::reconstruct::Reconstructor;
use crate::registry::{global, Registry};
use crate::wire::{self, Limits};

/// Decode a JSON payload with the process-wide registry.
///
/// Fails with [`DecodeError::NoRegistry`] until [`crate::install`] has run.
pub fn decode(payload: &str) -> Result<Value, DecodeError> {
    global().ok_or(DecodeError::NoRegistry)?.decode_str(payload)
}

impl Registry {
    pub fn decode_str(&self, payload: &str) -> Result<Value, DecodeError> {
        self.decode_str_with_limits(payload, &Limits::default())
    }

    pub fn decode_str_with_limits(&self, payload: &str, limits: &Limits) -> Result<Value, DecodeError> {
        let json: serde_json::Value = serde_json::from_str(payload)?;
        self.decode_value_with_limits(&json, limits)
    }

    pub fn decode_slice(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        self.decode_slice_with_limits(payload, &Limits::default())
    }

    pub fn decode_slice_with_limits(&self, payload: &[u8], limits: &Limits) -> Result<Value, DecodeError> {
        let json: serde_json::Value = serde_json::from_slice(payload)?;
        self.decode_value_with_limits(&json, limits)
    }

    /// Decode an already parsed JSON document.
    pub fn decode_value(&self, json: &serde_json::Value) -> Result<Value, DecodeError> {
        self.decode_value_with_limits(json, &Limits::default())
    }

    pub fn decode_value_with_limits(
        &self,
        json: &serde_json::Value,
        limits: &Limits,
    ) -> Result<Value, DecodeError> {
        let node = wire::parse_with_limits(json, limits)?;
        let result = Reconstructor::new(self).reconstruct(&node);
        match &result {
            Ok(value) => debug!(kind = value.kind(), "decoded payload"),
            Err(err) => debug!(error = %err, "payload rejected"),
        }
        result
    }
}
