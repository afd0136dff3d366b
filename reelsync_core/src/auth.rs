//! Status-to-message mapping for authentication flows
//!
//! The same backend status maps to different user-facing messages
//! depending on the flow, so each flow keeps its own table. The resolved
//! value is a catalog key; localization happens in the message catalog.

use crate::error::BackendError;

/// Authentication flow a backend error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Login,
    OtpVerify,
    PasswordReset,
}

/// Catalog key for the generic auth failure message
pub const AUTH_GENERIC_KEY: &str = "auth.generic_error";

/// Resolve the catalog key for a backend status in a given flow
pub fn message_key(flow: AuthFlow, status: u16) -> &'static str {
    match (flow, status) {
        (AuthFlow::Login, 400) | (AuthFlow::Login, 401) => "auth.login.invalid_credentials",
        (AuthFlow::Login, 429) => "auth.login.too_many_attempts",
        (AuthFlow::Login, 422) => "auth.login.email_not_confirmed",

        (AuthFlow::OtpVerify, 401) | (AuthFlow::OtpVerify, 403) => "auth.otp.invalid_code",
        (AuthFlow::OtpVerify, 410) => "auth.otp.expired",
        (AuthFlow::OtpVerify, 429) => "auth.otp.too_many_attempts",

        (AuthFlow::PasswordReset, 404) => "auth.reset.unknown_email",
        (AuthFlow::PasswordReset, 422) => "auth.reset.weak_password",
        (AuthFlow::PasswordReset, 429) => "auth.reset.too_many_requests",

        _ => AUTH_GENERIC_KEY,
    }
}

/// Convenience wrapper taking the structured error directly
pub fn message_key_for(flow: AuthFlow, error: &BackendError) -> &'static str {
    message_key(flow, error.status)
}
