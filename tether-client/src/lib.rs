mod call;
mod candidate;
mod config;
mod error;
mod media;
mod room;
mod session;
mod store;
mod transport;

pub use call::*;
pub use candidate::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use room::*;
pub use session::*;
pub use store::*;
pub use transport::*;
