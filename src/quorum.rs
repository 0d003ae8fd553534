use tokio::sync::mpsc;

/// Strict-majority tally over a fixed number of voters.
///
/// Resolves `true` as soon as granted outcomes strictly exceed half the
/// voters, `false` as soon as denied outcomes do. If every outcome has
/// reported and neither side holds a strict majority (possible when the
/// voter count is even), the tally resolves `false` rather than hang.
#[derive(Debug, Clone, Copy)]
pub struct MajorityVote {
    total: usize,
    granted: usize,
    denied: usize,
}

impl MajorityVote {
    pub fn new(total: usize) -> Self {
        Self::with_initial(total, 0)
    }

    /// A tally seeded with votes already on record, e.g. the candidate's
    /// vote for itself.
    pub fn with_initial(total: usize, granted: usize) -> Self {
        debug_assert!(granted <= total);
        Self {
            total,
            granted,
            denied: 0,
        }
    }

    pub fn record(&mut self, granted: bool) -> Option<bool> {
        if granted {
            self.granted += 1;
        } else {
            self.denied += 1;
        }
        self.decision()
    }

    fn decision(&self) -> Option<bool> {
        if self.granted * 2 > self.total {
            return Some(true);
        }
        if self.denied * 2 > self.total {
            return Some(false);
        }
        if self.granted + self.denied >= self.total {
            return Some(false);
        }
        None
    }

    /// Consume outcomes in completion order until a decision is reached.
    /// Outcomes that never arrive cannot block a decision the others can
    /// already carry; a channel closed before any decision resolves `false`.
    pub async fn resolve(mut self, mut outcomes: mpsc::Receiver<bool>) -> bool {
        if let Some(decision) = self.decision() {
            return decision;
        }
        while let Some(granted) = outcomes.recv().await {
            if let Some(decision) = self.record(granted) {
                return decision;
            }
        }
        false
    }
}
