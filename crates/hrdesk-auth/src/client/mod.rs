//! Client-side auth provider: keeps the signed-in session and restores it
//! on start.

pub mod persistence;
pub mod session;

pub use persistence::{FileSessionStore, MemorySessionStore, PersistedSession, SessionPersistence};
pub use session::{AuthSession, SessionState};
