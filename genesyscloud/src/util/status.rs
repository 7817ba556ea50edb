//! Status-code predicates over API responses
//!
//! Each predicate also accepts extra codes the caller wants treated the same
//! way. A missing response (transport failure) never matches.

use crate::api::{ApiError, ApiResponse};

const VERSION_MISMATCH_MESSAGE: &str = "does not match the current version";

/// Coarse classification; delete and read paths swallow `NotFound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    VersionMismatch,
    BadRequest,
    PreconditionFailed,
    Other,
}

pub fn classify(response: &ApiResponse) -> ErrorKind {
    if is_status_404(response, &[]) {
        ErrorKind::NotFound
    } else if is_version_mismatch(response, &[]) {
        ErrorKind::VersionMismatch
    } else if is_status_400(response, &[]) {
        ErrorKind::BadRequest
    } else if is_status_412(response, &[]) {
        ErrorKind::PreconditionFailed
    } else {
        ErrorKind::Other
    }
}

/// Transport failures carry no response and classify as `Other`
pub fn error_kind(err: &ApiError) -> ErrorKind {
    err.response().map(classify).unwrap_or(ErrorKind::Other)
}

fn has_status(response: &ApiResponse, code: u16, additional_codes: &[u16]) -> bool {
    response.status_code == code || additional_codes.contains(&response.status_code)
}

/// 404, 408 and 410 all mean the object is gone
pub fn is_status_404(response: &ApiResponse, additional_codes: &[u16]) -> bool {
    matches!(response.status_code, 404 | 408 | 410)
        || additional_codes.contains(&response.status_code)
}

pub fn is_status_409(response: &ApiResponse, additional_codes: &[u16]) -> bool {
    has_status(response, 409, additional_codes)
}

pub fn is_status_400(response: &ApiResponse, additional_codes: &[u16]) -> bool {
    has_status(response, 400, additional_codes)
}

pub fn is_status_412(response: &ApiResponse, additional_codes: &[u16]) -> bool {
    has_status(response, 412, additional_codes)
}

/// 409, or a 400 complaining about the entity version
pub fn is_version_mismatch(response: &ApiResponse, additional_codes: &[u16]) -> bool {
    if has_status(response, 409, additional_codes) {
        return true;
    }
    response.status_code == 400 && response.error_message.contains(VERSION_MISMATCH_MESSAGE)
}
