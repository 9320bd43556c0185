//! Telepath: rebuild typed objects from tagged JSON payloads
//!
//! A server describes arbitrary typed values in a JSON wire format; this
//! crate is the client half that turns such payloads back into live values.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          payload (JSON text)            │
//! │                  │                      │
//! │  wire        - parse into WireNode tree │
//! │                  │                      │
//! │  reconstruct - post-order rebuild,      │
//! │                back references          │
//! │                  │                      │
//! │  registry    - tag → adapter rule       │
//! ├─────────────────────────────────────────┤
//! │   telepath-value: Value, Object,        │
//! │   FromArgs, #[derive(Adapter)]          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use telepath::{ObjectId, RegistryBuilder};
//!
//! let registry = RegistryBuilder::with_builtins()?.freeze();
//! let value = registry.decode_str(r#"{"_type": "ObjectId", "_args": ["abc123"]}"#)?;
//! assert_eq!(value.downcast_ref::<ObjectId>().unwrap().as_str(), "abc123");
//! ```

pub mod adapters;
mod decode;
pub mod error;
pub mod reconstruct;
pub mod registry;
pub mod wire;

pub use adapters::ObjectId;
pub use decode::decode;
pub use error::{DecodeError, RegistryError};
pub use reconstruct::Reconstructor;
pub use registry::{global, install, Registry, RegistryBuilder, Rule};
pub use telepath_value::{Adapter, ConversionError, FromArgs, FromValue, Map, Object, Value};
pub use wire::{parse, parse_with_limits, Limits, NodeId, NodeKind, WireNode};
