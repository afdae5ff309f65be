//! # Session & Route Guard
//!
//! Keeps the signed-in user's opaque token and profile, mirrored to the host's
//! durable settings store, and decides which screens are reachable.
//!
//! ## Overview
//!
//! - [`SessionStore`]: token and profile under the storage keys `token` and
//!   `userInfo`, with synchronous reads and memory-first writes
//! - [`RouteGuard`]: `/login` is public, everything else needs a token
//! - [`UserProfile`] / [`Role`]: the profile shape the server returns on login
//!
//! The token is never inspected; it is attached to requests verbatim.

pub mod error;
pub mod guard;
pub mod session;
pub mod types;

pub use error::{AuthError, Result};
pub use guard::{RouteDecision, RouteGuard};
pub use session::{SessionState, SessionStore, TOKEN_KEY, USER_INFO_KEY};
pub use types::{Role, UserProfile};
