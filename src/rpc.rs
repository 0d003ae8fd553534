use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{LogIndex, ServerId, TermIndex};

/// Invoked by candidates to gather votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    /// Candidate's term.
    pub term: TermIndex,
    /// Candidate requesting the vote.
    pub candidate_id: ServerId,
    /// Index of the candidate's last log entry.
    pub last_log_index: LogIndex,
    /// Term of the candidate's last log entry.
    pub last_log_term: TermIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    /// Current term of the responder, for the candidate to update itself.
    pub term: TermIndex,
    pub vote_granted: bool,
}

/// Carries RequestVote to a peer. Implementations live outside this crate;
/// an unreachable peer surfaces as an `Err` and counts as a denied outcome
/// in the quorum tally.
#[async_trait]
pub trait RaftTransport: Send + Sync {
    async fn request_vote(&self, peer: ServerId, req: VoteRequest) -> Result<VoteResponse>;
}
