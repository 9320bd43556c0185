//! Adapters shipped with the crate.
//!
//! Each adapter is a [`FromArgs`](telepath_value::FromArgs) type registered
//! under its tag by [`register_builtins`].

mod object_id;

pub use object_id::ObjectId;

use crate::error::RegistryError;
use crate::registry::RegistryBuilder;

pub fn register_builtins(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder.register_type::<ObjectId>()?;
    Ok(())
}
