//! Account registration and the access/refresh session endpoints.
//!
//! Login and refresh set two `HttpOnly` cookies, `accessToken` and
//! `refreshToken`, and also return both tokens in the body for non-browser
//! clients. Protected handlers accept the access token from the cookie or an
//! `Authorization: Bearer` header.

pub(crate) mod login;
pub(crate) mod principal;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod types;

pub use state::{AuthConfig, AuthState};
