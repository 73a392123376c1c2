mod memory_store;
mod signaling_store;
mod subscription;

pub use memory_store::*;
pub use signaling_store::*;
pub use subscription::*;
