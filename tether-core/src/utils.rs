pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Collection holding one document per call attempt.
pub const ROOMS_COLLECTION: &str = "rooms";

/// Sub-collection written by the initiator.
pub const CALLER_CANDIDATES: &str = "callerCandidates";

/// Sub-collection written by the responder.
pub const CALLEE_CANDIDATES: &str = "calleeCandidates";
