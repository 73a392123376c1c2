mod local_stream;
mod media_devices;
mod sample_devices;

pub use local_stream::*;
pub use media_devices::*;
pub use sample_devices::*;
