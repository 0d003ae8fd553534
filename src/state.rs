use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RaftError, Result};
use crate::rpc::{VoteRequest, VoteResponse};
use crate::types::{LogIndex, ServerId, TermIndex};

/// Role a cluster member currently holds. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerKind {
    Follower,
    Candidate,
    Leader,
}

impl std::fmt::Display for ServerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerKind::Follower => write!(f, "follower"),
            ServerKind::Candidate => write!(f, "candidate"),
            ServerKind::Leader => write!(f, "leader"),
        }
    }
}

/// A single entry in the replicated log.
///
/// Entries are carried for future replication; nothing in the election core
/// appends or truncates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub term: TermIndex,
    pub command: Vec<u8>,
}

/// Per-node Raft state machine over `{Follower, Candidate, Leader}`.
///
/// # Election Safety
/// At most one leader can be elected in a given term:
/// - each node votes for at most one candidate per term (`voted_for`);
/// - a candidate needs grants from a strict majority of the cluster.
///
/// # Leader Completeness
/// A vote is only granted to a candidate whose log is at least as up-to-date
/// as ours (`is_log_up_to_date`).
///
/// Transitions are guarded by their required source kind and fail with
/// [`RaftError::IllegalTransition`] without mutating anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerState {
    pub kind: ServerKind,
    pub id: ServerId,
    pub peers: Vec<ServerId>,

    // Persistent state
    pub term: TermIndex,
    pub voted_for: Option<ServerId>,
    pub log: Vec<LogEntry>,

    // Volatile state
    pub last_index_committed: LogIndex,
    pub last_index_projected: LogIndex,

    // Volatile state on leaders; present iff kind == Leader
    pub replication_targets: Option<HashMap<ServerId, LogIndex>>,
    pub replication_acked: Option<HashMap<ServerId, LogIndex>>,
}

impl ServerState {
    /// A brand new follower with a fresh history.
    pub fn from_scratch(id: ServerId, peers: Vec<ServerId>) -> Self {
        Self {
            kind: ServerKind::Follower,
            id,
            peers,
            term: TermIndex::ZERO,
            voted_for: None,
            log: Vec::new(),
            last_index_committed: LogIndex::ZERO,
            last_index_projected: LogIndex::ZERO,
            replication_targets: None,
            replication_acked: None,
        }
    }

    fn guard(&self, transition: &'static str, expected: ServerKind) -> Result<()> {
        if self.kind != expected {
            return Err(RaftError::IllegalTransition {
                transition,
                kind: self.kind,
            });
        }
        Ok(())
    }

    /// Follower → Candidate: bump the term and vote for ourselves.
    pub fn start_election(&mut self) -> Result<()> {
        self.guard("start_election", ServerKind::Follower)?;
        self.term.increment()?;
        self.voted_for = Some(self.id);
        self.kind = ServerKind::Candidate;
        Ok(())
    }

    /// Candidate → Candidate: a new election round after an unresolved one.
    /// The term bumps again and the self-vote is renewed.
    pub fn restart_election(&mut self) -> Result<()> {
        self.guard("restart_election", ServerKind::Candidate)?;
        self.term.increment()?;
        self.voted_for = Some(self.id);
        Ok(())
    }

    /// Candidate → Leader: initialize the per-peer replication bookkeeping.
    pub fn win_election(&mut self) -> Result<()> {
        self.guard("win_election", ServerKind::Candidate)?;
        let next_index = self.last_index_committed.next();
        self.replication_targets = Some(self.peers_map(next_index));
        self.replication_acked = Some(self.peers_map(LogIndex::ZERO));
        self.voted_for = None;
        self.kind = ServerKind::Leader;
        Ok(())
    }

    /// Candidate → Follower: the election is abandoned.
    pub fn cancel_election(&mut self) -> Result<()> {
        self.guard("cancel_election", ServerKind::Candidate)?;
        self.voted_for = None;
        self.kind = ServerKind::Follower;
        Ok(())
    }

    /// Leader → Follower: a higher term exists somewhere in the cluster.
    pub fn loose_leadership(&mut self) -> Result<()> {
        self.guard("loose_leadership", ServerKind::Leader)?;
        self.voted_for = None;
        self.replication_targets = None;
        self.replication_acked = None;
        self.kind = ServerKind::Follower;
        Ok(())
    }

    /// Revert to follower from whatever kind we hold. No-op for followers.
    pub fn become_follower(&mut self) {
        match self.kind {
            ServerKind::Follower => {}
            ServerKind::Candidate => {
                self.voted_for = None;
                self.kind = ServerKind::Follower;
            }
            ServerKind::Leader => {
                self.voted_for = None;
                self.replication_targets = None;
                self.replication_acked = None;
                self.kind = ServerKind::Follower;
            }
        }
    }

    /// The RequestVote decision. Always returns; mutates only when adopting
    /// a newer term or granting a vote.
    pub fn request_vote(&mut self, req: &VoteRequest) -> VoteResponse {
        // A newer term unconditionally demotes us; the candidate has to ask
        // again now that both sides agree on the term.
        if req.term > self.term {
            self.term = req.term;
            self.voted_for = None;
            self.become_follower();
            return VoteResponse {
                term: self.term,
                vote_granted: false,
            };
        }

        // Stale candidates are rejected without any bookkeeping.
        if req.term < self.term {
            return VoteResponse {
                term: self.term,
                vote_granted: false,
            };
        }

        // Only cluster members can collect votes; membership is fixed.
        if !self.is_member(req.candidate_id) {
            return VoteResponse {
                term: self.term,
                vote_granted: false,
            };
        }

        // One vote per term, first come first served; re-granting to the
        // same candidate is idempotent.
        let can_vote = self.voted_for.is_none() || self.voted_for == Some(req.candidate_id);
        if can_vote && self.is_log_up_to_date(req.last_log_index, req.last_log_term) {
            self.voted_for = Some(req.candidate_id);
            return VoteResponse {
                term: self.term,
                vote_granted: true,
            };
        }

        VoteResponse {
            term: self.term,
            vote_granted: false,
        }
    }

    /// Check that a candidate's log is at least as up-to-date as ours:
    /// a higher last term wins outright; an equal last term requires the
    /// candidate's index to be at least our committed watermark.
    pub fn is_log_up_to_date(&self, last_log_index: LogIndex, last_log_term: TermIndex) -> bool {
        let our_last_term = self.last_log_term();
        last_log_term > our_last_term
            || (last_log_term == our_last_term && last_log_index >= self.last_index_committed)
    }

    pub fn last_log_term(&self) -> TermIndex {
        self.log.last().map(|e| e.term).unwrap_or(TermIndex::ZERO)
    }

    pub fn is_follower(&self) -> bool {
        self.kind == ServerKind::Follower
    }

    pub fn is_candidate(&self) -> bool {
        self.kind == ServerKind::Candidate
    }

    pub fn is_leader(&self) -> bool {
        self.kind == ServerKind::Leader
    }

    fn is_member(&self, id: ServerId) -> bool {
        id == self.id || self.peers.contains(&id)
    }

    fn peers_map(&self, initial: LogIndex) -> HashMap<ServerId, LogIndex> {
        self.peers.iter().map(|&peer| (peer, initial)).collect()
    }
}
