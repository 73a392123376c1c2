pub mod fake_transport;

pub use call_helpers::*;
pub use fake_media::*;
pub use fake_transport::*;
