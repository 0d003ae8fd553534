use crate::types::ServerId;

/// Static configuration for a single cluster member.
///
/// Membership is fixed for the lifetime of the process; `peers` lists every
/// other voter in the cluster. A fresh identity from this config is only used
/// when the store holds no previously persisted node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: ServerId,
    pub peers: Vec<ServerId>,
    pub election_timeout_min_ms: u64,
    pub election_timeout_max_ms: u64,
    pub heartbeat_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: ServerId::random(),
            peers: Vec::new(),
            election_timeout_min_ms: 150,
            election_timeout_max_ms: 300,
            heartbeat_timeout_ms: 300,
        }
    }
}

impl NodeConfig {
    pub fn new(node_id: ServerId) -> Self {
        Self {
            node_id,
            ..Default::default()
        }
    }

    pub fn with_peer(mut self, peer: ServerId) -> Self {
        self.peers.push(peer);
        self
    }

    /// Total number of voters in the cluster, this node included.
    pub fn cluster_size(&self) -> usize {
        self.peers.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_config_default() {
        let cfg = NodeConfig::default();
        assert!(cfg.peers.is_empty());
        assert_eq!(cfg.election_timeout_min_ms, 150);
        assert_eq!(cfg.election_timeout_max_ms, 300);
        assert_eq!(cfg.heartbeat_timeout_ms, 300);
    }

    #[test]
    fn node_config_new() {
        let id = ServerId::random();
        let cfg = NodeConfig::new(id);
        assert_eq!(cfg.node_id, id);
        assert!(cfg.peers.is_empty());
    }

    #[test]
    fn node_config_with_peer() {
        let a = ServerId::random();
        let b = ServerId::random();
        let cfg = NodeConfig::default().with_peer(a).with_peer(b);
        assert_eq!(cfg.peers, vec![a, b]);
        assert_eq!(cfg.cluster_size(), 3);
    }
}
