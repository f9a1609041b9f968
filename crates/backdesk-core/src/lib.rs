// backdesk-core: session layer between backdesk-api and the CLI.

pub mod auth_gate;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth_gate::AuthGate;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{AuthError, CoreError};
pub use session::Session;

pub use model::{Order, OrderStatus, Page, Resource, Service, Stats, User};
