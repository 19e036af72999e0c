//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use readeck_core::error::ApiError;
use readeck_core::http::HttpMethod;
use readeck_core::types::{BookmarkStatus, CreatedBookmark, LoginResult, Profile};

/// Opaque handle to a `ReadeckClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiReadeckClient {
    pub(crate) inner: readeck_core::ReadeckClient,
}

/// Move a Rust string onto the heap as a C string. Interior NULs cannot be
/// represented, so such strings become empty.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header owned by this library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `readeck_build_*` functions. The host executes the request,
/// aborting it after `timeout_ms`, and passes the response back through
/// `readeck_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: readeck_core::HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_ms: req.timeout.as_millis() as u64,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A response header borrowed from the host.
#[repr(C)]
pub struct FfiResponseHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this after executing a request and passes a pointer
/// to a `readeck_parse_*` function. Headers must be included: bookmark
/// creation reads its result from `Bookmark-Id`. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiResponseHeader,
    pub headers_len: u32,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    Timeout = 2,
    Server = 3,
    Authentication = 4,
    UnexpectedStatus = 5,
    ProtocolViolation = 6,
    Deserialization = 7,
    Serialization = 8,
    Panic = 9,
    NullArg = 10,
}

/// Tag that tells `readeck_free_result` what `FfiResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    Login = 1,
    Profile = 2,
    CreatedBookmark = 3,
    BookmarkStatus = 4,
}

#[repr(C)]
pub struct FfiLoginResult {
    pub id: *mut c_char,
    pub token: *mut c_char,
}

#[repr(C)]
pub struct FfiProfile {
    pub email: *mut c_char,
    pub username: *mut c_char,
}

#[repr(C)]
pub struct FfiCreatedBookmark {
    pub bookmark_id: *mut c_char,
}

#[repr(C)]
pub struct FfiBookmarkStatus {
    pub loaded: bool,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is the response status when one
/// applies (0 otherwise), and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_login(login: LoginResult) -> *mut Self {
        let data = Box::new(FfiLoginResult {
            id: c_string(login.id),
            token: c_string(login.token),
        });
        Self::ok(FfiDataTag::Login, Box::into_raw(data) as *mut c_void)
    }

    pub(crate) fn ok_profile(profile: Profile) -> *mut Self {
        let data = Box::new(FfiProfile {
            email: c_string(profile.email),
            username: c_string(profile.username),
        });
        Self::ok(FfiDataTag::Profile, Box::into_raw(data) as *mut c_void)
    }

    pub(crate) fn ok_created_bookmark(created: CreatedBookmark) -> *mut Self {
        let data = Box::new(FfiCreatedBookmark {
            bookmark_id: c_string(created.bookmark_id),
        });
        Self::ok(FfiDataTag::CreatedBookmark, Box::into_raw(data) as *mut c_void)
    }

    pub(crate) fn ok_bookmark_status(status: BookmarkStatus) -> *mut Self {
        let data = Box::new(FfiBookmarkStatus {
            loaded: status.loaded,
        });
        Self::ok(FfiDataTag::BookmarkStatus, Box::into_raw(data) as *mut c_void)
    }

    /// Build an error result from an `ApiError`, logging it first.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        log::error!("Readeck request failed: {err}");
        let error_code = match &err {
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Timeout(_) => FfiErrorCode::Timeout,
            ApiError::Server { .. } => FfiErrorCode::Server,
            ApiError::Authentication { .. } => FfiErrorCode::Authentication,
            ApiError::UnexpectedStatus { .. } => FfiErrorCode::UnexpectedStatus,
            ApiError::ProtocolViolation(_) => FfiErrorCode::ProtocolViolation,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
        };
        Self::err(error_code, err.status().unwrap_or(0), err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
