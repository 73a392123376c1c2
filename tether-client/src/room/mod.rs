mod room_phase;
mod room_state;

pub use room_phase::*;
pub use room_state::*;
