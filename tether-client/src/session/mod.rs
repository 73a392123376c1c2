mod negotiation_session;
mod session_state;

pub use negotiation_session::*;
pub use session_state::*;
