mod bootstrap;
mod session;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler, refresh_handler};

/// Session key holding the signed-in account id.
pub const SESSION_USER_KEY: &str = "user_id";
/// Session key holding the sign-in timestamp.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
