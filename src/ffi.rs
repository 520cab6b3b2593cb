//! FFI bindings for the health tracker
//!
//! This module provides C-compatible functions for calling the tracker from other
//! languages. Payloads are JSON in the camelCase record format. All functions use
//! C strings (null-terminated) and return allocated memory that must be freed by
//! the caller using `ht_free_string`.

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::analytics::{
    compare_periods, supplement_adherence, DEFAULT_ADHERENCE_WINDOW, DEFAULT_TREND_WINDOW,
};
use crate::config::AnalysisWindows;
use crate::dates::normalize_records;
use crate::error::TrackerError;
use crate::report::{build_report, HealthTracker};
use crate::risk::evaluate_risk;
use crate::scoring::score_breakdown;
use crate::store::FileBackend;
use crate::types::{DailyRecord, FamilyHistory};
use crate::validation::validate_records;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Serialize a result to an allocated C string, recording the error on failure
fn respond<T: Serialize>(result: Result<T, TrackerError>) -> *mut c_char {
    match result.and_then(|value| serde_json::to_string(&value).map_err(TrackerError::from)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn window_or(window_days: i32, fallback: usize) -> usize {
    if window_days <= 0 {
        fallback
    } else {
        window_days as usize
    }
}

fn parse_records(json: &str) -> Result<Vec<DailyRecord>, TrackerError> {
    let records: Vec<DailyRecord> = serde_json::from_str(json)?;
    Ok(normalize_records(&records))
}

/// Family history is optional: NULL, empty or `null` all mean "none"
fn parse_family(json: Option<String>) -> Result<Option<FamilyHistory>, TrackerError> {
    match json.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(serde_json::from_str(raw)?),
    }
}

/// RFC 3339 reference instant; NULL means now in the local time zone
fn parse_reference(reference: Option<String>) -> Result<DateTime<FixedOffset>, TrackerError> {
    match reference {
        None => Ok(DateTime::<FixedOffset>::from(Local::now())),
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|e| TrackerError::InvalidReference(format!("{raw}: {e}"))),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build the full dashboard report for a history.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string (JSON array of records).
/// - `family_json` and `reference` may be NULL; a NULL reference means now.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_report(
    records_json: *const c_char,
    family_json: *const c_char,
    reference: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return ptr::null_mut();
        }
    };

    respond((|| -> Result<_, TrackerError> {
        let records = parse_records(&records_str)?;
        let family = parse_family(cstr_to_string(family_json))?;
        let reference = parse_reference(cstr_to_string(reference))?;
        Ok(build_report(
            &records,
            family.as_ref(),
            &reference,
            &AnalysisWindows::default(),
        ))
    })())
}

/// Score a single record. A JSON `null` record scores zero.
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_score(record_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let record_str = match cstr_to_string(record_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid record string pointer");
            return ptr::null_mut();
        }
    };

    respond(
        serde_json::from_str::<Option<DailyRecord>>(&record_str)
            .map_err(TrackerError::from)
            .map(|record| score_breakdown(record.as_ref())),
    )
}

/// Evaluate the risk rules for a single record; returns a JSON array of flags.
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string.
/// - `family_json` may be NULL.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_evaluate_risk(
    record_json: *const c_char,
    family_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let record_str = match cstr_to_string(record_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid record string pointer");
            return ptr::null_mut();
        }
    };

    respond((|| -> Result<_, TrackerError> {
        let record: DailyRecord = serde_json::from_str(&record_str)?;
        let family = parse_family(cstr_to_string(family_json))?;
        Ok(evaluate_risk(&record, family.as_ref()))
    })())
}

/// Compare the newest window with the one before it.
///
/// Returns the JSON `null` when there is not enough history. A non-positive
/// `window_days` uses the default of 7.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_compare_periods(
    records_json: *const c_char,
    window_days: i32,
) -> *mut c_char {
    clear_last_error();

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return ptr::null_mut();
        }
    };

    let window = window_or(window_days, DEFAULT_TREND_WINDOW);
    respond(parse_records(&records_str).map(|records| compare_periods(&records, window)))
}

/// Per-supplement adherence. A non-positive `window_days` uses the default of 14.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_supplement_adherence(
    records_json: *const c_char,
    window_days: i32,
) -> *mut c_char {
    clear_last_error();

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return ptr::null_mut();
        }
    };

    let window = window_or(window_days, DEFAULT_ADHERENCE_WINDOW);
    respond(parse_records(&records_str).map(|records| supplement_adherence(&records, window)))
}

/// Validate a history; returns a JSON array of issues (empty when valid).
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_validate_records(records_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return ptr::null_mut();
        }
    };

    respond(
        serde_json::from_str::<Vec<DailyRecord>>(&records_str)
            .map_err(TrackerError::from)
            .map(|records| validate_records(&records)),
    )
}

// ============================================================================
// Stateful Tracker API
// ============================================================================

/// Opaque handle to a file-backed HealthTracker
pub struct HealthTrackerHandle {
    tracker: HealthTracker<FileBackend>,
}

/// Open a tracker persisting into `data_dir`.
///
/// # Safety
/// - `data_dir` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `ht_tracker_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn ht_tracker_open(data_dir: *const c_char) -> *mut HealthTrackerHandle {
    clear_last_error();

    let dir = match cstr_to_string(data_dir) {
        Some(s) => s,
        None => {
            set_last_error("Invalid data_dir string pointer");
            return ptr::null_mut();
        }
    };

    let tracker = HealthTracker::new(FileBackend::new(dir), AnalysisWindows::default());
    Box::into_raw(Box::new(HealthTrackerHandle { tracker }))
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `ht_tracker_open`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ht_tracker_free(tracker: *mut HealthTrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Validate and store a day's record.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `ht_tracker_open`.
/// - `record_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_tracker_check_in(
    tracker: *mut HealthTrackerHandle,
    record_json: *const c_char,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    let handle = &mut *tracker;

    let record_str = match cstr_to_string(record_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid record string pointer");
            return -1;
        }
    };

    let result = serde_json::from_str::<DailyRecord>(&record_str)
        .map_err(TrackerError::from)
        .and_then(|record| handle.tracker.check_in(record));

    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Report over the tracker's stored history.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `ht_tracker_open`.
/// - `reference` may be NULL (now).
/// - Returns a newly allocated string that must be freed with `ht_free_string`.
/// - Returns NULL on error; call `ht_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ht_tracker_report(
    tracker: *const HealthTrackerHandle,
    reference: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &*tracker;
    respond(
        parse_reference(cstr_to_string(reference))
            .map(|reference| handle.tracker.report(&reference)),
    )
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by tracker functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a tracker function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ht_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next tracker function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn ht_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ht_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_records_json() -> CString {
        CString::new(
            r#"[
                {"date": "2026-02-21", "sleepHours": 4.5, "smokingCount": 6, "steps": 4000,
                 "supplements": [{"name": "NAC", "doseMg": 1500, "taken": true}]},
                {"date": "2026-02-20", "sleepHours": 7.5, "steps": 9000},
                {"date": "2026-02-19", "sleepHours": 8, "steps": 11000,
                 "supplements": [{"name": "NAC", "doseMg": 1500, "taken": false}]}
            ]"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        ht_free_string(ptr);
        s
    }

    unsafe fn last_error() -> String {
        let error = ht_last_error();
        assert!(!error.is_null());
        CStr::from_ptr(error).to_str().unwrap().to_string()
    }

    #[test]
    fn test_ffi_report() {
        let records = sample_records_json();
        let reference = CString::new("2026-02-21T18:00:00+00:00").unwrap();

        unsafe {
            let result = ht_report(records.as_ptr(), ptr::null(), reference.as_ptr());
            let json: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();

            assert_eq!(json["dateKey"], "2026-02-21");
            assert_eq!(json["streak"], 3);
            assert_eq!(json["weekly"].as_array().unwrap().len(), 7);
            assert!(json["riskFlags"]
                .as_array()
                .unwrap()
                .iter()
                .any(|flag| flag == "Low sleep + high smoking"));
        }
    }

    #[test]
    fn test_ffi_null_reference_uses_local_today() {
        let records = CString::new("[]").unwrap();

        let reference = parse_reference(None).unwrap();
        assert_eq!(reference.offset(), Local::now().offset());

        unsafe {
            let result = ht_report(records.as_ptr(), ptr::null(), ptr::null());
            let json: serde_json::Value = serde_json::from_str(&take_string(result)).unwrap();
            assert_eq!(json["dateKey"], crate::dates::to_date_key(&Local::now()));
        }
    }

    #[test]
    fn test_ffi_score_and_null_record() {
        let record = CString::new(r#"{"date": "2026-02-21", "sleepHours": 8}"#).unwrap();
        let null_record = CString::new("null").unwrap();

        unsafe {
            let json: serde_json::Value =
                serde_json::from_str(&take_string(ht_score(record.as_ptr()))).unwrap();
            assert_eq!(json["total"], 100);
            assert_eq!(json["parts"]["sleepHours"], 15);
            assert_eq!(json["parts"]["steps"], serde_json::Value::Null);

            let json: serde_json::Value =
                serde_json::from_str(&take_string(ht_score(null_record.as_ptr()))).unwrap();
            assert_eq!(json["total"], 0);
            assert_eq!(json["confidence"], 0);
        }
    }

    #[test]
    fn test_ffi_evaluate_risk_with_family() {
        let record = CString::new(r#"{"date": "2026-02-21", "bloodGlucose": 105}"#).unwrap();
        let family = CString::new(
            r#"{"conditions": [{"condition": "Diabetes", "relation": "Father"}], "bloodType": ""}"#,
        )
        .unwrap();

        unsafe {
            let flags = take_string(ht_evaluate_risk(record.as_ptr(), family.as_ptr()));
            let flags: Vec<String> = serde_json::from_str(&flags).unwrap();
            assert_eq!(flags, vec!["Glucose above normal with family history of diabetes"]);

            let flags = take_string(ht_evaluate_risk(record.as_ptr(), ptr::null()));
            assert_eq!(flags, "[]");
        }
    }

    #[test]
    fn test_ffi_compare_and_adherence() {
        let records = sample_records_json();

        unsafe {
            let comparison = take_string(ht_compare_periods(records.as_ptr(), 1));
            let comparison: serde_json::Value = serde_json::from_str(&comparison).unwrap();
            assert_eq!(comparison["sleepHours"]["recent"], 4.5);
            assert_eq!(comparison["sleepHours"]["prior"], 7.5);
            assert_eq!(comparison["sleepHours"]["delta"], -3.0);

            // Three records cannot fill two default windows
            let comparison = take_string(ht_compare_periods(records.as_ptr(), 0));
            assert_eq!(comparison, "null");

            let adherence = take_string(ht_supplement_adherence(records.as_ptr(), 0));
            let adherence: serde_json::Value = serde_json::from_str(&adherence).unwrap();
            assert_eq!(adherence[0]["name"], "NAC");
            assert_eq!(adherence[0]["taken"], 1);
            assert_eq!(adherence[0]["total"], 3);
            assert_eq!(adherence[0]["rate"], 33);
        }
    }

    #[test]
    fn test_ffi_validate_records() {
        let records = CString::new(r#"[{"date": "2026-02-21"}, {"date": "bad"}]"#).unwrap();

        unsafe {
            let issues: serde_json::Value =
                serde_json::from_str(&take_string(ht_validate_records(records.as_ptr()))).unwrap();
            assert_eq!(issues.as_array().unwrap().len(), 1);
            assert_eq!(issues[0]["index"], 1);
        }
    }

    #[test]
    fn test_ffi_tracker_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = CString::new(dir.path().to_str().unwrap()).unwrap();
        let record = CString::new(r#"{"date": "2026-02-21", "sleepHours": 7.5}"#).unwrap();
        let invalid = CString::new(r#"{"date": "2026-02-21", "sleepHours": 30}"#).unwrap();
        let reference = CString::new("2026-02-21T08:00:00Z").unwrap();

        unsafe {
            let tracker = ht_tracker_open(data_dir.as_ptr());
            assert!(!tracker.is_null());

            assert_eq!(ht_tracker_check_in(tracker, record.as_ptr()), 0);
            assert_eq!(ht_tracker_check_in(tracker, invalid.as_ptr()), -1);
            assert!(last_error().contains("sleepHours"));
            ht_tracker_free(tracker);

            let reopened = ht_tracker_open(data_dir.as_ptr());
            let report = take_string(ht_tracker_report(reopened, reference.as_ptr()));
            let report: serde_json::Value = serde_json::from_str(&report).unwrap();
            assert_eq!(report["today"]["sleepHours"], 7.5);
            assert_eq!(report["streak"], 1);
            ht_tracker_free(reopened);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid_json = CString::new("not json").unwrap();
        let records = sample_records_json();
        let bad_reference = CString::new("yesterday").unwrap();

        unsafe {
            assert!(ht_report(invalid_json.as_ptr(), ptr::null(), ptr::null()).is_null());
            assert!(!last_error().is_empty());

            assert!(ht_report(records.as_ptr(), ptr::null(), bad_reference.as_ptr()).is_null());
            assert!(last_error().starts_with("Invalid reference time"));

            assert!(ht_score(ptr::null()).is_null());
            assert!(ht_tracker_report(ptr::null(), ptr::null()).is_null());
            assert_eq!(last_error(), "Null tracker pointer");
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = ht_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
