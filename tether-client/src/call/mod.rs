mod call_controller;
mod call_setup;
mod call_state;
mod signal_loop;

pub use call_controller::*;
pub use call_state::*;
