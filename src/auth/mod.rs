//! Authentication core: secret hashing, credential checks, and the session lifecycle.

pub mod authenticator;
pub mod hasher;
pub mod middleware;
pub mod session;

pub use authenticator::{authenticate, AuthFailure, AuthResult};
pub use hasher::{hash_secret, verify_secret};
pub use middleware::{AppState, Identity, OptionalIdentity};
pub use session::{create_session, destroy_session, generate_session_token, resolve_session};
