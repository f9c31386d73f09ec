//! Access control: credential check at login, signed bearer tokens after.

pub mod credentials;
pub mod extractor;
pub mod jwt;

pub use credentials::{CredentialVerifier, DemoCredentials};
pub use extractor::AuthUser;
pub use jwt::{TokenError, TokenService};
