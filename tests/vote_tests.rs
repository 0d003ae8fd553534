use raft_lite::rpc::VoteRequest;
use raft_lite::state::{LogEntry, ServerState};
use raft_lite::types::{LogIndex, ServerId, TermIndex};

fn vote_request(term: u64, candidate: ServerId) -> VoteRequest {
    VoteRequest {
        term: TermIndex::new(term),
        candidate_id: candidate,
        last_log_index: LogIndex::ZERO,
        last_log_term: TermIndex::ZERO,
    }
}

#[test]
fn test_request_vote_grants_at_current_term() {
    let candidate = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![candidate]);
    state.term = TermIndex::new(1);

    let resp = state.request_vote(&vote_request(1, candidate));

    assert!(resp.vote_granted);
    assert_eq!(resp.term, TermIndex::new(1));
    assert_eq!(state.voted_for, Some(candidate));
}

#[test]
fn test_request_vote_rejects_stale_term() {
    let candidate = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![candidate]);
    state.term = TermIndex::new(5);

    let resp = state.request_vote(&vote_request(3, candidate));

    assert!(!resp.vote_granted);
    assert_eq!(resp.term, TermIndex::new(5));
    assert_eq!(state.term, TermIndex::new(5));
    assert_eq!(state.voted_for, None);
}

#[test]
fn test_request_vote_rejects_second_candidate_same_term() {
    let first = ServerId::random();
    let second = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![first, second]);
    state.term = TermIndex::new(2);

    assert!(state.request_vote(&vote_request(2, first)).vote_granted);
    assert!(!state.request_vote(&vote_request(2, second)).vote_granted);
    assert_eq!(state.voted_for, Some(first));
}

#[test]
fn test_request_vote_repeat_from_voted_candidate_is_idempotent() {
    let candidate = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![candidate]);
    state.term = TermIndex::new(2);

    assert!(state.request_vote(&vote_request(2, candidate)).vote_granted);
    assert!(state.request_vote(&vote_request(2, candidate)).vote_granted);
    assert_eq!(state.voted_for, Some(candidate));
}

#[test]
fn test_request_vote_higher_term_demotes_candidate() {
    let rival = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![rival]);
    state.start_election().unwrap();
    assert!(state.is_candidate());

    let resp = state.request_vote(&vote_request(9, rival));

    assert!(!resp.vote_granted);
    assert_eq!(resp.term, TermIndex::new(9));
    assert!(state.is_follower());
    assert_eq!(state.term, TermIndex::new(9));
    assert_eq!(state.voted_for, None);
}

#[test]
fn test_request_vote_higher_term_demotes_leader() {
    let rival = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![rival]);
    state.start_election().unwrap();
    state.win_election().unwrap();

    let resp = state.request_vote(&vote_request(9, rival));

    assert!(!resp.vote_granted);
    assert!(state.is_follower());
    assert!(state.replication_targets.is_none());
    assert!(state.replication_acked.is_none());
}

#[test]
fn test_request_vote_rejects_candidate_with_outdated_log() {
    let candidate = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![candidate]);
    state.term = TermIndex::new(3);
    state.log.push(LogEntry {
        term: TermIndex::new(3),
        command: Vec::new(),
    });
    state.last_index_committed = LogIndex::new(1);

    let resp = state.request_vote(&VoteRequest {
        term: TermIndex::new(3),
        candidate_id: candidate,
        last_log_index: LogIndex::new(4),
        last_log_term: TermIndex::new(2),
    });

    assert!(!resp.vote_granted);
    assert_eq!(state.voted_for, None);
}

#[test]
fn test_request_vote_grants_candidate_with_newer_log_term() {
    let candidate = ServerId::random();
    let mut state = ServerState::from_scratch(ServerId::random(), vec![candidate]);
    state.term = TermIndex::new(3);
    state.log.push(LogEntry {
        term: TermIndex::new(2),
        command: Vec::new(),
    });
    state.last_index_committed = LogIndex::new(1);

    let resp = state.request_vote(&VoteRequest {
        term: TermIndex::new(3),
        candidate_id: candidate,
        last_log_index: LogIndex::ZERO,
        last_log_term: TermIndex::new(3),
    });

    assert!(resp.vote_granted);
    assert_eq!(state.voted_for, Some(candidate));
}
