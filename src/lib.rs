//! Raft leader election for a single cluster member.
//!
//! The crate tracks consensus terms, decides when a node should seek
//! leadership, grants or denies votes under Raft's safety rules, and races a
//! randomized election timeout against concurrent vote collection.
//!
//! Log replication, snapshots, membership changes, and the network transport
//! are external collaborators; only their boundary shapes live here
//! ([`rpc::RaftTransport`], [`storage::KeyValueStore`], the log placeholders
//! on [`state::ServerState`]).

pub mod config;
pub mod election;
pub mod error;
pub mod quorum;
pub mod rpc;
pub mod state;
pub mod storage;
pub mod timer;
pub mod types;

pub use config::NodeConfig;
pub use election::ElectionCoordinator;
pub use error::{RaftError, Result};
pub use quorum::MajorityVote;
pub use rpc::{RaftTransport, VoteRequest, VoteResponse};
pub use state::{LogEntry, ServerKind, ServerState};
pub use storage::{KeyValueStore, MemoryStore, NodeStore};
pub use timer::{ElectionTimer, Signal};
pub use types::{LogIndex, ServerId, TermIndex};
