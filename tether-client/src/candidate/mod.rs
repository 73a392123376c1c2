mod candidate_exchange;
mod remote_candidate_queue;

pub use candidate_exchange::*;
pub use remote_candidate_queue::*;
