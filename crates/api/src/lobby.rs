use dashmap::{mapref::entry::Entry::Vacant, DashMap};
use model::{play::PlayId, QuizContent};
use quiz::QuizSession;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

struct Seat {
    session: QuizSession,
    last_seen: Instant,
}

impl Seat {
    /// Charges the time since the last interaction to the session clock.
    fn touch(&mut self) {
        let now = Instant::now();
        self.session.tick(now.saturating_duration_since(self.last_seen));
        self.last_seen = now;
    }
}

/// Registry of every quiz being played right now.
#[derive(Default)]
pub struct Lobby {
    seats: DashMap<PlayId, Seat>,
}

impl Lobby {
    /// Seats a new session on the given bank and returns its handle.
    pub fn open(&self, slug: &str, quiz: Arc<QuizContent>) -> PlayId {
        let mut session = QuizSession::new(slug);
        session.load(Some(quiz));
        let seat = Seat { session, last_seen: Instant::now() };
        loop {
            let id = PlayId(rand::random());
            if let Vacant(entry) = self.seats.entry(id) {
                entry.insert(seat);
                return id;
            }
        }
    }

    /// Runs `f` on the session after advancing its clock. `None` if no such session is seated.
    pub fn with<T>(&self, id: PlayId, f: impl FnOnce(&mut QuizSession) -> T) -> Option<T> {
        let mut seat = self.seats.get_mut(&id)?;
        seat.touch();
        Some(f(&mut seat.session))
    }

    /// Unseats the session so that it can be driven outside the registry.
    pub fn take(&self, id: PlayId) -> Option<QuizSession> {
        let (_, mut seat) = self.seats.remove(&id)?;
        seat.touch();
        Some(seat.session)
    }

    /// Puts back a session previously obtained through [`Lobby::take`].
    pub fn restore(&self, id: PlayId, session: QuizSession) {
        self.seats.insert(id, Seat { session, last_seen: Instant::now() });
    }

    /// Discards the session. Returns `false` if it was not seated.
    pub fn abandon(&self, id: PlayId) -> bool {
        self.seats.remove(&id).is_some()
    }

    /// Drops every session untouched for longer than `idle`. Returns how many were dropped.
    pub fn purge_idle(&self, idle: Duration) -> usize {
        let before = self.seats.len();
        let now = Instant::now();
        self.seats.retain(|_, seat| now.saturating_duration_since(seat.last_seen) <= idle);
        before.saturating_sub(self.seats.len())
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}
