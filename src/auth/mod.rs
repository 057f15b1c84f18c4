//! Authentication: provider sign-in and session state

pub mod client;
pub mod session;

pub use client::{AuthClient, AuthEvent, Session, User};
pub use session::{AuthState, SessionHolder};
