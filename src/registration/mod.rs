//! The registration conversation — state machine, sessions, validation.

pub mod flow;
pub mod prompts;
pub mod session;
pub mod state;
pub mod validate;

pub use flow::Registrar;
pub use session::{RegistrationSession, SessionStore, spawn_prune_task};
pub use state::RegistrationState;
