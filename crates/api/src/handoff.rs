use dashmap::DashMap;
use quiz::{AnswerHandoff, Answers, HandoffKey};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory hand-off whose entries lapse after a fixed retention time.
pub struct MemoryHandoff {
    entries: DashMap<HandoffKey, (Answers, Instant)>,
    retention: Duration,
}

impl MemoryHandoff {
    pub fn new(retention: Duration) -> Self {
        Self { entries: DashMap::new(), retention }
    }

    /// Drops every lapsed entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, (_, stored)| now.saturating_duration_since(*stored) <= self.retention);
        before.saturating_sub(self.entries.len())
    }
}

impl AnswerHandoff for MemoryHandoff {
    fn store(&self, key: HandoffKey, answers: Answers) {
        log::debug!("handing off {} answers under {key}", answers.len());
        self.entries.insert(key, (answers, Instant::now()));
    }

    fn load(&self, key: &HandoffKey) -> Option<Answers> {
        let entry = self.entries.get(key)?;
        let (answers, stored) = entry.value();
        if stored.elapsed() > self.retention {
            return None;
        }
        Some(answers.clone())
    }
}
