use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::state::{LogEntry, ServerKind, ServerState};
use crate::types::{LogIndex, ServerId, TermIndex};

pub const DURABLE_KEY: &str = "raft/durable";
pub const VOLATILE_KEY: &str = "raft/volatile";

/// The only persistence surface the election core depends on. Real durable
/// backends live outside this crate.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
}

/// In-memory store, the default stand-in for both halves of the node state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Fields that must survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurableRecord {
    pub id: ServerId,
    pub peers: Vec<ServerId>,
    pub kind: ServerKind,
    pub term: TermIndex,
    pub voted_for: Option<ServerId>,
    pub log: Vec<LogEntry>,
}

/// Fields that may be rebuilt from zero after a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatileRecord {
    pub last_index_committed: LogIndex,
    pub last_index_projected: LogIndex,
    pub replication_targets: Option<HashMap<ServerId, LogIndex>>,
    pub replication_acked: Option<HashMap<ServerId, LogIndex>>,
}

/// Load/store of the node split across a durable and a volatile store.
///
/// An absent durable record means this node has never run before; the caller
/// falls back to its configuration for a fresh identity. An absent volatile
/// record merges in all-zero defaults.
#[derive(Clone)]
pub struct NodeStore {
    durable: Arc<dyn KeyValueStore>,
    volatile: Arc<dyn KeyValueStore>,
}

impl NodeStore {
    pub fn new(durable: Arc<dyn KeyValueStore>, volatile: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, volatile }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub async fn load(&self) -> Result<Option<ServerState>> {
        let Some(bytes) = self.durable.get(DURABLE_KEY).await? else {
            return Ok(None);
        };
        let durable: DurableRecord = serde_json::from_slice(&bytes)?;
        let volatile: VolatileRecord = match self.volatile.get(VOLATILE_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => VolatileRecord::default(),
        };

        let mut state = ServerState {
            kind: durable.kind,
            id: durable.id,
            peers: durable.peers,
            term: durable.term,
            voted_for: durable.voted_for,
            log: durable.log,
            last_index_committed: volatile.last_index_committed,
            last_index_projected: volatile.last_index_projected,
            replication_targets: volatile.replication_targets,
            replication_acked: volatile.replication_acked,
        };
        // Leaders exist only together with their replication bookkeeping.
        // A leader whose volatile half was rebuilt from zero steps down and
        // re-earns leadership through a fresh election.
        if state.is_leader()
            && (state.replication_targets.is_none() || state.replication_acked.is_none())
        {
            state.become_follower();
        }
        Ok(Some(state))
    }

    pub async fn store(&self, state: &ServerState) -> Result<()> {
        let durable = DurableRecord {
            id: state.id,
            peers: state.peers.clone(),
            kind: state.kind,
            term: state.term,
            voted_for: state.voted_for,
            log: state.log.clone(),
        };
        let volatile = VolatileRecord {
            last_index_committed: state.last_index_committed,
            last_index_projected: state.last_index_projected,
            replication_targets: state.replication_targets.clone(),
            replication_acked: state.replication_acked.clone(),
        };

        self.durable
            .put(DURABLE_KEY, serde_json::to_vec(&durable)?)
            .await?;
        self.volatile
            .put(VOLATILE_KEY, serde_json::to_vec(&volatile)?)
            .await?;
        Ok(())
    }
}
