//! FFI layer for SDKs in other runtimes.
//!
//! This module provides C-compatible functions so browser (via WASM glue),
//! mobile and server SDKs can share one evaluation engine. All structured data
//! crosses the boundary as JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `switchyard_*` functions are allocated by Rust
//! - Caller must free them with `switchyard_string_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>", "kind": "<kind>"}` on failure, where `kind` is one
//!   of `config_error`, `missing_identifier`, `type_mismatch` or `invalid_input`

use crate::{EvaluationContext, FlagConfig};
use std::ffi::{c_char, CStr, CString};

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String, kind: &'static str },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn invalid(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
            kind: "invalid_input",
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error":"serialization failed: {}","kind":"invalid_input"}}"#, e)
        })
    }
}

impl<T: serde::Serialize> From<crate::error::Result<T>> for FfiResult<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => FfiResult::ok(value),
            Err(e) => FfiResult::Err {
                error: e.to_string(),
                kind: e.kind(),
            },
        }
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `switchyard_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => CString::from(cr#"{"error":"string contained null bytes","kind":"invalid_input"}"#)
            .into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Read and parse a JSON argument, or produce the error response to return.
unsafe fn parse_arg<T: serde::de::DeserializeOwned>(
    ptr: *const c_char,
    what: &str,
) -> Result<T, String> {
    let raw = from_c_string(ptr)
        .ok_or_else(|| FfiResult::<()>::invalid(format!("invalid {what} JSON")).to_json())?;
    serde_json::from_str(&raw)
        .map_err(|e| FfiResult::<()>::invalid(format!("{what} parse error: {e}")).to_json())
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a flag for a context.
///
/// # Arguments
/// - `config_json`: JSON string of FlagConfig
/// - `context_json`: JSON string of EvaluationContext
///
/// # Returns
/// JSON string: `{"ok": EvaluationResult}` or `{"error": "message", "kind": "..."}`
///
/// # Safety
/// - `config_json` and `context_json` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `switchyard_string_free`
#[no_mangle]
pub unsafe extern "C" fn switchyard_evaluate(
    config_json: *const c_char,
    context_json: *const c_char,
) -> *mut c_char {
    let config: FlagConfig = match parse_arg(config_json, "config") {
        Ok(c) => c,
        Err(response) => return to_c_string(response),
    };
    let context: EvaluationContext = match parse_arg(context_json, "context") {
        Ok(c) => c,
        Err(response) => return to_c_string(response),
    };

    to_c_string(FfiResult::from(crate::evaluate_flag(&config, &context)).to_json())
}

/// Validate a flag configuration.
///
/// # Returns
/// JSON string: `{"ok": null}` or `{"error": "message", "kind": "..."}`
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `switchyard_string_free`
#[no_mangle]
pub unsafe extern "C" fn switchyard_validate(config_json: *const c_char) -> *mut c_char {
    let config: FlagConfig = match parse_arg(config_json, "config") {
        Ok(c) => c,
        Err(response) => return to_c_string(response),
    };

    to_c_string(FfiResult::from(config.validate()).to_json())
}

/// Resolve the bucketing identifier for a context.
///
/// # Returns
/// JSON string: `{"ok": "identifier"}` or `{"error": "message", "kind": "..."}`
///
/// # Safety
/// - `context_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `switchyard_string_free`
#[no_mangle]
pub unsafe extern "C" fn switchyard_resolve_identifier(context_json: *const c_char) -> *mut c_char {
    let context: EvaluationContext = match parse_arg(context_json, "context") {
        Ok(c) => c,
        Err(response) => return to_c_string(response),
    };

    to_c_string(FfiResult::from(crate::resolve_identifier(&context)).to_json())
}

/// Compute the rollout bucket for an identifier, salt and rule ID.
///
/// Exposed so SDKs can check their own bucketing against the shared vectors.
///
/// # Returns
/// Bucket in `[0, 100)`, or -1 if any argument is null or invalid UTF-8.
///
/// # Safety
/// - All arguments must be valid null-terminated C strings or null
#[no_mangle]
pub unsafe extern "C" fn switchyard_bucket(
    identifier: *const c_char,
    salt: *const c_char,
    rule_id: *const c_char,
) -> i32 {
    match (
        from_c_string(identifier),
        from_c_string(salt),
        from_c_string(rule_id),
    ) {
        (Some(identifier), Some(salt), Some(rule_id)) => {
            crate::bucket_for(&identifier, &salt, &rule_id) as i32
        }
        _ => -1,
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `switchyard_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn switchyard_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn switchyard_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Get the bucketing hash contract version.
#[no_mangle]
pub extern "C" fn switchyard_hash_version() -> u32 {
    crate::HASH_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn flag_json() -> CString {
        CString::new(
            r#"{
                "key": "new-ui",
                "enabled": true,
                "variations": [
                    {"id": "on", "name": "On", "type": "boolean", "value": true},
                    {"id": "off", "name": "Off", "type": "boolean", "value": false}
                ],
                "rules": [
                    {
                        "id": "beta-users",
                        "conditions": [{"attribute": "plan", "operator": "equals", "value": "beta"}],
                        "variationId": "on"
                    },
                    {"id": "split", "rollout": {"on": 50, "off": 50}}
                ],
                "defaultVariationId": "off"
            }"#,
        )
        .unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> serde_json::Value {
        let json = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        switchyard_string_free(ptr);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn ffi_evaluate() {
        unsafe {
            let flag = flag_json();
            let ctx = CString::new(r#"{"identifierKey":"u1","attributes":{"plan":"beta"}}"#).unwrap();

            let result = take(switchyard_evaluate(flag.as_ptr(), ctx.as_ptr()));
            assert_eq!(result["ok"]["variationId"], "on");
            assert_eq!(result["ok"]["value"], true);
            assert_eq!(result["ok"]["reason"], "RULE_MATCH");
        }
    }

    #[test]
    fn ffi_evaluate_missing_identifier() {
        unsafe {
            let flag = flag_json();
            let ctx = CString::new(r#"{"attributes":{"plan":"free"}}"#).unwrap();

            let result = take(switchyard_evaluate(flag.as_ptr(), ctx.as_ptr()));
            assert_eq!(result["kind"], "missing_identifier");
            assert!(result.get("ok").is_none());
        }
    }

    #[test]
    fn ffi_validate() {
        unsafe {
            let flag = flag_json();
            let result = take(switchyard_validate(flag.as_ptr()));
            assert!(result.get("ok").is_some());

            let bad = CString::new(
                r#"{"key":"k","enabled":true,"variations":[{"id":"a","name":"A","type":"string","value":"x"}],"defaultVariationId":"b"}"#,
            )
            .unwrap();
            let result = take(switchyard_validate(bad.as_ptr()));
            assert_eq!(result["kind"], "config_error");
        }
    }

    #[test]
    fn ffi_resolve_identifier() {
        unsafe {
            let ctx = CString::new(r#"{"identifierKey":"  u1 "}"#).unwrap();
            let result = take(switchyard_resolve_identifier(ctx.as_ptr()));
            assert_eq!(result["ok"], "u1");
        }
    }

    #[test]
    fn ffi_bucket() {
        unsafe {
            let id = CString::new("u1").unwrap();
            let salt = CString::new("new-ui").unwrap();
            let rule = CString::new("split").unwrap();
            assert_eq!(switchyard_bucket(id.as_ptr(), salt.as_ptr(), rule.as_ptr()), 70);
            assert_eq!(switchyard_bucket(ptr::null(), salt.as_ptr(), rule.as_ptr()), -1);
        }
    }

    #[test]
    fn ffi_version() {
        unsafe {
            let version = switchyard_version();
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
        assert_eq!(switchyard_hash_version(), crate::HASH_VERSION);
    }

    #[test]
    fn ffi_error_handling() {
        unsafe {
            let ctx = CString::new(r#"{"identifierKey":"u1"}"#).unwrap();
            let result = take(switchyard_evaluate(ptr::null(), ctx.as_ptr()));
            assert_eq!(result["kind"], "invalid_input");

            let invalid = CString::new("not valid json").unwrap();
            let result = take(switchyard_evaluate(invalid.as_ptr(), ctx.as_ptr()));
            assert_eq!(result["kind"], "invalid_input");
            assert!(result["error"].as_str().unwrap().contains("config parse error"));
        }
    }
}
