use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::NodeConfig;
use crate::error::Result;
use crate::quorum::MajorityVote;
use crate::rpc::{RaftTransport, VoteRequest};
use crate::state::{ServerKind, ServerState};
use crate::storage::NodeStore;
use crate::timer::{random_election_timeout, ElectionTimer, Signal};

/// How a campaign ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CampaignOutcome {
    /// A strict majority of the cluster granted its vote.
    Won,
    /// A concurrent higher-term RPC demoted the node to follower.
    Demoted,
}

/// Drives elections for one node: consumes heartbeat signals, owns the
/// follower timer, and runs the vote-collection race.
///
/// The coordinator is the single owner of the load→mutate→store sequence
/// while `run` is driving it; election triggers are serialized by the signal
/// channel rather than interleaved.
pub struct ElectionCoordinator {
    config: NodeConfig,
    store: NodeStore,
    transport: Arc<dyn RaftTransport>,
    timer: ElectionTimer,
    signal_rx: mpsc::Receiver<Signal>,
}

impl ElectionCoordinator {
    /// Returns the coordinator and the sender the surrounding system uses
    /// to signal heartbeats.
    pub fn new(
        config: NodeConfig,
        store: NodeStore,
        transport: Arc<dyn RaftTransport>,
    ) -> (Self, mpsc::Sender<Signal>) {
        let (signal_tx, signal_rx) = mpsc::channel(64);
        let timer = ElectionTimer::new(signal_tx.clone());
        (
            Self {
                config,
                store,
                transport,
                timer,
                signal_rx,
            },
            signal_tx,
        )
    }

    /// Consume signals until every sender is gone.
    pub async fn run(mut self) -> Result<()> {
        self.timer.start_follower_timeout(self.follower_timeout());

        while let Some(signal) = self.signal_rx.recv().await {
            match signal {
                Signal::HeartbeatReceived => {
                    self.timer.restart_follower_timeout(self.follower_timeout());
                }
                Signal::HeartbeatTimeout => {
                    tracing::info!(node_id = %self.config.node_id, "follower heartbeat timed out");
                    match self.campaign().await? {
                        CampaignOutcome::Won => {
                            // Leaders do not fear a stale follower timeout.
                        }
                        CampaignOutcome::Demoted => {
                            self.timer.restart_follower_timeout(self.follower_timeout());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// One full campaign: election rounds back to back until the node wins
    /// or is demoted by a higher term.
    async fn campaign(&mut self) -> Result<CampaignOutcome> {
        self.timer.clear_follower_timeout();

        loop {
            let mut node = self.load_or_init().await?;
            match node.kind {
                ServerKind::Follower => node.start_election()?,
                ServerKind::Candidate => node.restart_election()?,
                ServerKind::Leader => {
                    tracing::debug!(node_id = %node.id, "already leader, ignoring election trigger");
                    return Ok(CampaignOutcome::Won);
                }
            }
            self.store.store(&node).await?;

            let term = node.term;
            tracing::info!(
                node_id = %node.id,
                term = term.get(),
                peers = node.peers.len(),
                "starting election round"
            );

            let outcome_rx = self.solicit_votes(&node);
            // Our own vote is already on record from the transition above.
            let tally = MajorityVote::with_initial(node.peers.len() + 1, 1);
            let round_timeout = self.round_timeout();

            let won = tokio::select! {
                won = tally.resolve(outcome_rx) => won,
                _ = self.timer.wait_election_timeout(round_timeout) => {
                    tracing::debug!(term = term.get(), "election round timed out");
                    false
                }
            };

            if won {
                // Reload before applying: a concurrent RequestVote may have
                // moved the persisted node past this round.
                let mut node = self.load_or_init().await?;
                if node.is_candidate() && node.term == term {
                    node.win_election()?;
                    self.store.store(&node).await?;
                    tracing::info!(node_id = %node.id, term = term.get(), "won election");
                    return Ok(CampaignOutcome::Won);
                }
                tracing::debug!(
                    term = term.get(),
                    kind = %node.kind,
                    "discarding stale election win"
                );
            } else {
                tracing::debug!(term = term.get(), "election round failed, will restart");
            }

            if self.demoted().await? {
                tracing::info!(node_id = %self.config.node_id, "demoted during election");
                return Ok(CampaignOutcome::Demoted);
            }

            // Fresh randomized backoff before the next round keeps
            // candidates from colliding forever.
            tokio::time::sleep(self.round_timeout()).await;

            if self.demoted().await? {
                tracing::info!(node_id = %self.config.node_id, "demoted during election");
                return Ok(CampaignOutcome::Demoted);
            }
        }
    }

    /// Fire a RequestVote at every peer; each outcome lands on the returned
    /// channel in completion order. An RPC error is a denied outcome. Losing
    /// rounds simply drop the receiver; late responders hit a closed channel
    /// and cannot affect a later round.
    fn solicit_votes(&self, node: &ServerState) -> mpsc::Receiver<bool> {
        let request = VoteRequest {
            term: node.term,
            candidate_id: node.id,
            last_log_index: node.last_index_committed,
            last_log_term: node.last_log_term(),
        };

        let (outcome_tx, outcome_rx) = mpsc::channel(node.peers.len().max(1));
        for &peer in &node.peers {
            let transport = Arc::clone(&self.transport);
            let outcome_tx = outcome_tx.clone();
            tokio::spawn(async move {
                let granted = match transport.request_vote(peer, request).await {
                    Ok(resp) if resp.term == request.term && !resp.vote_granted => {
                        // A peer that first learns our term in this exchange
                        // denies while adopting it. Ask once more now that
                        // both sides agree on the term; a regrant to the same
                        // candidate is idempotent.
                        match transport.request_vote(peer, request).await {
                            Ok(resp) => resp.vote_granted && resp.term == request.term,
                            Err(err) => {
                                tracing::warn!(peer = %peer, error = %err, "vote request failed");
                                false
                            }
                        }
                    }
                    Ok(resp) => {
                        tracing::debug!(
                            peer = %peer,
                            term = resp.term.get(),
                            granted = resp.vote_granted,
                            "vote response"
                        );
                        resp.vote_granted && resp.term == request.term
                    }
                    Err(err) => {
                        tracing::warn!(peer = %peer, error = %err, "vote request failed");
                        false
                    }
                };
                let _ = outcome_tx.send(granted).await;
            });
        }
        outcome_rx
    }

    async fn load_or_init(&self) -> Result<ServerState> {
        if let Some(node) = self.store.load().await? {
            return Ok(node);
        }
        tracing::info!(
            node_id = %self.config.node_id,
            peers = self.config.peers.len(),
            "no persisted node, starting fresh from configuration"
        );
        Ok(ServerState::from_scratch(
            self.config.node_id,
            self.config.peers.clone(),
        ))
    }

    async fn demoted(&self) -> Result<bool> {
        Ok(self
            .store
            .load()
            .await?
            .map(|node| node.is_follower())
            .unwrap_or(false))
    }

    fn follower_timeout(&self) -> Duration {
        Duration::from_millis(self.config.heartbeat_timeout_ms)
    }

    fn round_timeout(&self) -> Duration {
        random_election_timeout(
            self.config.election_timeout_min_ms,
            self.config.election_timeout_max_ms,
        )
    }
}
