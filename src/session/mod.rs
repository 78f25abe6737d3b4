//! Accounts, credentials and the access/refresh token session flow.

pub mod credentials;
pub mod models;
pub mod service;
pub mod tokens;
pub(crate) mod utils;

pub use models::{Account, AccountView, TokenPair};
pub use service::{ChangePasswordInput, DetailsInput, LoginInput, RegisterInput, SessionService};
pub use tokens::{TokenConfig, TokenIssuer, TokenKind};
