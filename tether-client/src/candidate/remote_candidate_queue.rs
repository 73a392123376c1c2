use std::collections::{HashSet, VecDeque};
use tether_core::CandidateRecord;

/// What to do with a remote candidate that just arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The remote description is set; apply now.
    Apply(CandidateRecord),
    /// Held until the remote description is set.
    Queued,
    /// This record id was already seen.
    Duplicate,
}

/// Bookkeeping for remote candidates: each record id is admitted once, and
/// candidates that arrive before the remote description wait in arrival
/// order.
#[derive(Debug, Default)]
pub struct RemoteCandidateQueue {
    seen: HashSet<String>,
    pending: VecDeque<(String, CandidateRecord)>,
    ready: bool,
}

impl RemoteCandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, record_id: &str, candidate: CandidateRecord) -> Admission {
        if !self.seen.insert(record_id.to_owned()) {
            return Admission::Duplicate;
        }

        if self.ready {
            Admission::Apply(candidate)
        } else {
            self.pending.push_back((record_id.to_owned(), candidate));
            Admission::Queued
        }
    }

    /// Marks the remote description as set and hands back everything that
    /// was waiting for it, oldest first.
    pub fn mark_ready(&mut self) -> Vec<(String, CandidateRecord)> {
        self.ready = true;
        self.pending.drain(..).collect()
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
