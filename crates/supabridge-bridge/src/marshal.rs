// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion between the shell's generic objects and typed values.

use serde::Serialize;
use serde_json::Value;

use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::types::JsonObject;

use crate::traits::BridgeObject;

/// Typed reader over a call's option object.
///
/// Absent keys and explicit `null` are treated alike. Empty strings count as
/// absent for required fields, so `{"email": ""}` fails the same way as `{}`.
#[derive(Debug, Default)]
pub struct Args {
    options: BridgeObject,
}

impl Args {
    pub fn new(options: BridgeObject) -> Self {
        Self { options }
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.options.get(key).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, key: &str) -> Result<&str> {
        self.optional_str(key)?
            .ok_or_else(|| SupabridgeError::missing(key))
    }

    /// A string option; empty or whitespace-only strings read as absent.
    pub fn optional_str(&self, key: &str) -> Result<Option<&str>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(SupabridgeError::invalid(key, "expected a string")),
        }
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(SupabridgeError::invalid(key, "expected a boolean")),
        }
    }

    /// A non-negative integer. Integral floats (`10.0`) are accepted since
    /// script numbers often arrive that way.
    pub fn optional_u64(&self, key: &str) -> Result<Option<u64>> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        let not_count = || SupabridgeError::invalid(key, "expected a non-negative integer");
        if let Some(n) = value.as_u64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
            _ => Err(not_count()),
        }
    }

    pub fn optional_object(&self, key: &str) -> Result<Option<&JsonObject>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj)),
            Some(_) => Err(SupabridgeError::invalid(key, "expected an object")),
        }
    }

    pub fn required_object(&self, key: &str) -> Result<&JsonObject> {
        self.optional_object(key)?
            .ok_or_else(|| SupabridgeError::missing(key))
    }
}

/// Serialise a typed value into a bridge object.
pub fn to_object<T: Serialize>(value: &T) -> Result<BridgeObject> {
    match serde_json::to_value(value)? {
        Value::Object(obj) => Ok(obj),
        other => {
            let mut obj = BridgeObject::new();
            obj.insert("value".into(), other);
            Ok(obj)
        }
    }
}

/// A one-key object, e.g. `{session: ...}`.
pub fn single_field<T: Serialize>(key: &str, value: &T) -> Result<BridgeObject> {
    let mut obj = BridgeObject::new();
    obj.insert(key.to_owned(), serde_json::to_value(value)?);
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        match value {
            Value::Object(obj) => Args::new(obj),
            _ => panic!("test options must be an object"),
        }
    }

    #[test]
    fn empty_and_null_strings_are_missing() {
        let a = args(json!({ "email": "", "phone": null, "token": "  " }));
        for key in ["email", "phone", "token", "absent"] {
            assert!(matches!(
                a.required_str(key),
                Err(SupabridgeError::MissingField(ref k)) if k == key
            ));
        }
    }

    #[test]
    fn wrong_types_are_invalid_not_missing() {
        let a = args(json!({ "email": 5, "single": "yes", "filter": [1] }));
        assert!(matches!(
            a.required_str("email"),
            Err(SupabridgeError::InvalidField { .. })
        ));
        assert!(a.optional_bool("single").is_err());
        assert!(a.optional_object("filter").is_err());
    }

    #[test]
    fn counts_accept_integral_floats_only() {
        let a = args(json!({ "a": 10, "b": 10.0, "c": 2.5, "d": -1 }));
        assert_eq!(a.optional_u64("a").unwrap(), Some(10));
        assert_eq!(a.optional_u64("b").unwrap(), Some(10));
        assert!(a.optional_u64("c").is_err());
        assert!(a.optional_u64("d").is_err());
        assert_eq!(a.optional_u64("e").unwrap(), None);
    }

    #[test]
    fn single_field_keeps_null() {
        let obj = single_field("session", &Option::<u8>::None).unwrap();
        assert_eq!(Value::Object(obj), json!({ "session": null }));
    }
}
