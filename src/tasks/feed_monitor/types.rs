/// What happened to one feed during a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// No stored title yet; the current one was recorded without notifying.
    FirstSeen,
    Unchanged,
    /// Stored title replaced and a broadcast attempted.
    Changed { delivered: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub skipped: usize,
    pub first_seen: usize,
    pub changed: usize,
}

impl CheckSummary {
    pub fn record(&mut self, outcome: FeedOutcome) {
        self.checked += 1;
        match outcome {
            FeedOutcome::FirstSeen => self.first_seen += 1,
            FeedOutcome::Unchanged => {}
            FeedOutcome::Changed { .. } => self.changed += 1,
        }
    }
}
