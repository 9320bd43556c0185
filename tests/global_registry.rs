//! The process-wide registry can only be installed once per process, so the
//! whole lifecycle lives in a single test.

use telepath::{decode, global, install, DecodeError, ObjectId, RegistryBuilder, RegistryError, Value};

#[test]
fn install_once_then_decode() {
    assert!(global().is_none());
    assert!(matches!(
        decode(r#"{"_type": "ObjectId", "_args": ["abc123"]}"#),
        Err(DecodeError::NoRegistry)
    ));

    install(RegistryBuilder::with_builtins().unwrap().freeze()).unwrap();
    assert!(global().unwrap().contains("ObjectId"));

    let value = decode(r#"{"_type": "ObjectId", "_args": ["abc123"]}"#).unwrap();
    assert_eq!(value.downcast_ref::<ObjectId>(), Some(&ObjectId::new("abc123")));

    let replacement = RegistryBuilder::new()
        .register("ObjectId", |_| Ok(Value::Null))
        .unwrap()
        .freeze();
    assert_eq!(install(replacement), Err(RegistryError::AlreadyInstalled));

    // The first registry stays in place.
    let value = decode(r#"{"_type": "ObjectId", "_args": ["def456"]}"#).unwrap();
    assert_eq!(value.to_string(), "ObjectId(def456)");
}
