mod connection_state;
mod peer_transport;
mod rtc_transport;
#[cfg(test)]
mod stub_transport;
mod transport_config;
mod transport_event;

pub use connection_state::*;
pub use peer_transport::*;
pub use rtc_transport::*;
#[cfg(test)]
pub(crate) use stub_transport::*;
pub use transport_config::*;
pub use transport_event::*;
