//! C-ABI wrapper around `readeck-core`.
//!
//! # Overview
//! Exposes the Readeck client through `extern "C"` functions so a mobile
//! host (Swift, Kotlin via JNI, ...) can build and parse HTTP requests and
//! responses with its own networking stack, without linking to an async
//! runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - `readeck_parse_login` takes a mutable handle: a successful login
//!   replaces the handle's credential, exactly like the core client.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The host owns all returned pointers and must call the matching
//!   `readeck_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use readeck_core::http::HttpResponse;
use readeck_core::types::{CreateBookmark, LoginRequest};

use types::*;

/// Borrow a C string argument as `&str`. Invalid UTF-8 reads as empty.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or(""))
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// `credential` may be null. A `timeout_ms` of 0 selects the default
/// (5000 ms). Returns null if `base_url` is null or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `readeck_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_client_new(
    base_url: *const c_char,
    credential: *const c_char,
    timeout_ms: u64,
) -> *mut FfiReadeckClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { opt_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let mut client = readeck_core::ReadeckClient::new(url);
        if let Some(credential) = unsafe { opt_str(credential) } {
            client = client.with_credential(credential);
        }
        if timeout_ms > 0 {
            client = client.with_timeout(Duration::from_millis(timeout_ms));
        }
        Box::into_raw(Box::new(FfiReadeckClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `readeck_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_client_free(client: *mut FfiReadeckClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Copy of the client's current credential, or null if it has none.
///
/// Hosts call this after a successful login to persist the new token.
/// Free the returned string with `readeck_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_client_credential(client: *const FfiReadeckClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.credential() {
            Some(credential) => c_string(credential),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a login request. `application` may be null for the default label.
///
/// Returns null if `client`, `username` or `password` is null.
/// The caller must free the returned pointer with `readeck_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_build_login(
    client: *const FfiReadeckClient,
    username: *const c_char,
    password: *const c_char,
    application: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let username = unsafe { opt_str(username) };
        let password = unsafe { opt_str(password) };
        let (Some(username), Some(password)) = (username, password) else {
            return std::ptr::null_mut();
        };
        let mut input = LoginRequest::new(username, password);
        if let Some(application) = unsafe { opt_str(application) } {
            input.application = application.to_string();
        }
        match client.inner.build_login(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for the authenticated user's profile.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_build_profile(client: *const FfiReadeckClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_profile())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a bookmark creation request.
///
/// `title` may be null. `labels` may be null or point to `labels_len` C
/// strings; null entries are skipped. Returns null if `client` or `url` is
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_build_create_bookmark(
    client: *const FfiReadeckClient,
    url: *const c_char,
    title: *const c_char,
    labels: *const *const c_char,
    labels_len: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(url) = (unsafe { opt_str(url) }) else {
            return std::ptr::null_mut();
        };
        let labels: Vec<String> = if labels.is_null() {
            Vec::new()
        } else {
            let raw = unsafe { std::slice::from_raw_parts(labels, labels_len as usize) };
            raw.iter()
                .filter_map(|&p| unsafe { opt_str(p) })
                .map(str::to_string)
                .collect()
        };
        let input = CreateBookmark {
            url: url.to_string(),
            title: unsafe { opt_str(title) }.map(str::to_string),
            labels: (!labels.is_empty()).then_some(labels),
        };
        match client.inner.build_create_bookmark(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for a bookmark's scrape status.
///
/// Returns null if `client` or `bookmark_id` is null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_build_bookmark_status(
    client: *const FfiReadeckClient,
    bookmark_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = (unsafe { opt_str(bookmark_id) }) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_bookmark_status(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. Null bodies and
/// null header entries read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { opt_str(resp.body) }.unwrap_or("").to_string();
    let headers = if resp.headers.is_null() || resp.headers_len == 0 {
        Vec::new()
    } else {
        let raw = unsafe { std::slice::from_raw_parts(resp.headers, resp.headers_len as usize) };
        raw.iter()
            .filter_map(|h| {
                let key = unsafe { opt_str(h.key) }?;
                let value = unsafe { opt_str(h.value) }.unwrap_or("");
                Some((key.to_string(), value.to_string()))
            })
            .collect()
    };
    HttpResponse {
        status: resp.status,
        headers,
        body,
    }
}

/// Parse a login response. On success the handle's credential is replaced
/// with the issued token.
///
/// Returns a result with `data_tag = Login` on success.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_parse_login(
    client: *mut FfiReadeckClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &mut *client };
        let resp = unsafe { &*response };
        match client.inner.parse_login(ffi_response_to_core(resp)) {
            Ok(login) => FfiResult::ok_login(login),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in readeck_parse_login"))
}

/// Parse a profile response.
///
/// Returns a result with `data_tag = Profile` on success.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_parse_profile(
    client: *const FfiReadeckClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_profile(ffi_response_to_core(resp)) {
            Ok(profile) => FfiResult::ok_profile(profile),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in readeck_parse_profile"))
}

/// Parse a bookmark creation response. The id is taken from the
/// `Bookmark-Id` response header.
///
/// Returns a result with `data_tag = CreatedBookmark` on success.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_parse_create_bookmark(
    client: *const FfiReadeckClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_create_bookmark(ffi_response_to_core(resp)) {
            Ok(created) => FfiResult::ok_created_bookmark(created),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in readeck_parse_create_bookmark"))
}

/// Parse a bookmark status response. Only status 200 succeeds.
///
/// Returns a result with `data_tag = BookmarkStatus` on success.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_parse_bookmark_status(
    client: *const FfiReadeckClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_bookmark_status(ffi_response_to_core(resp)) {
            Ok(status) => FfiResult::ok_bookmark_status(status),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in readeck_parse_bookmark_status"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `readeck_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by any `readeck_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Login => {
                let login = unsafe { Box::from_raw(result.data as *mut FfiLoginResult) };
                free_c_string(login.id);
                free_c_string(login.token);
            }
            FfiDataTag::Profile => {
                let profile = unsafe { Box::from_raw(result.data as *mut FfiProfile) };
                free_c_string(profile.email);
                free_c_string(profile.username);
            }
            FfiDataTag::CreatedBookmark => {
                let created = unsafe { Box::from_raw(result.data as *mut FfiCreatedBookmark) };
                free_c_string(created.bookmark_id);
            }
            FfiDataTag::BookmarkStatus => {
                drop(unsafe { Box::from_raw(result.data as *mut FfiBookmarkStatus) });
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn readeck_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
