mod gate;
mod session;

pub use gate::{gate, require_session};
pub use session::{CurrentSession, SessionVerifier};
