use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use stubblecore::session::{Notice, SessionState};

/// One interactive dashboard session.
pub struct SessionEntry {
    pub state: SessionState,
    /// Notices produced by the most recent action.
    pub notices: Vec<Notice>,
    pub rng: StdRng,
}

/// Live sessions keyed by id. Each gets its own RNG, seeded from
/// `seed + id` when a seed is configured.
pub struct SessionStore {
    seed: Option<u64>,
    next_id: u64,
    sessions: HashMap<u64, SessionEntry>,
}

impl SessionStore {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            next_id: 1,
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self, state: SessionState) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id)),
            None => StdRng::from_entropy(),
        };
        self.sessions.insert(
            id,
            SessionEntry {
                state,
                notices: Vec::new(),
                rng,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<&SessionEntry> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut SessionEntry> {
        self.sessions.get_mut(&id)
    }

    /// Ends a session, dropping its state and RNG.
    pub fn remove(&mut self, id: u64) -> Option<SessionEntry> {
        self.sessions.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
