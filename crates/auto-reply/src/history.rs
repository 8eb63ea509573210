//! Per-channel bounded conversation windows.
//!
//! Windows never hold the system turn; it is added at request-build time so
//! eviction can never push the persona out of the context.

use std::{
    collections::{HashMap, VecDeque},
    sync::RwLock,
};

use chatrelay_common::Turn;

/// Chronological turns of one channel, at most `capacity` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationWindow {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn, evicting from the front until the bound holds again.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}

/// Channel id → [`ConversationWindow`].
///
/// The map lock is a `std::sync::RwLock` and is never held across `.await`;
/// exchange-level ordering within a channel is the dispatcher's job.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    windows: RwLock<HashMap<String, ConversationWindow>>,
}

impl HistoryStore {
    /// A store keeping the last `max_exchanges` user/assistant pairs per channel.
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            capacity: max_exchanges.saturating_mul(2),
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Window capacity in turns.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The channel's window, or an empty one. Never creates an entry.
    #[must_use]
    pub fn get(&self, channel_id: &str) -> ConversationWindow {
        let windows = self.windows.read().unwrap_or_else(|e| e.into_inner());
        windows
            .get(channel_id)
            .cloned()
            .unwrap_or_else(|| ConversationWindow::new(self.capacity))
    }

    /// Owned copy of the channel's turns, oldest first.
    #[must_use]
    pub fn snapshot(&self, channel_id: &str) -> Vec<Turn> {
        let windows = self.windows.read().unwrap_or_else(|e| e.into_inner());
        windows
            .get(channel_id)
            .map(ConversationWindow::to_vec)
            .unwrap_or_default()
    }

    /// Append a single turn, creating the channel's window if needed.
    pub fn append(&self, channel_id: &str, turn: Turn) {
        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        Self::get_or_create(&mut windows, channel_id, self.capacity).push(turn);
    }

    /// Append a completed exchange (user then assistant) under one write lock,
    /// so readers never observe the user turn without its answer.
    pub fn commit_exchange(&self, channel_id: &str, user: Turn, assistant: Turn) {
        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        let window = Self::get_or_create(&mut windows, channel_id, self.capacity);
        window.push(user);
        window.push(assistant);
    }

    /// Drop the channel's window. Returns how many turns were discarded.
    pub fn clear(&self, channel_id: &str) -> usize {
        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        windows.remove(channel_id).map_or(0, |w| w.len())
    }

    /// Number of channels with a window.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.windows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn get_or_create<'a>(
        windows: &'a mut HashMap<String, ConversationWindow>,
        channel_id: &str,
        capacity: usize,
    ) -> &'a mut ConversationWindow {
        windows
            .entry(channel_id.to_string())
            .or_insert_with(|| ConversationWindow::new(capacity))
    }
}
