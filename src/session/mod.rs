//! Session management - boot/login/logout state and local persistence

pub mod manager;
pub mod store;

pub use manager::{home_view, AuthGateway, RouteDecision, SessionManager, View};
pub use store::{FsSessionStore, MemorySessionStore, SessionStore};
