//! FIFO waiting list for unmatched players. Strictly arrival-ordered, no
//! skill-based pairing.

use std::collections::VecDeque;

pub struct MatchQueue<T> {
    entries: VecDeque<(String, T)>,
}

impl<T> MatchQueue<T> {
    pub fn new() -> Self {
        MatchQueue {
            entries: VecDeque::new(),
        }
    }

    /// Appends unless the id is already waiting; returns the 1-based
    /// position either way.
    pub fn join(&mut self, id: &str, entry: T) -> usize {
        if let Some(position) = self.position(id) {
            return position;
        }
        self.entries.push_back((id.to_string(), entry));
        self.entries.len()
    }

    /// Removes the id if present; a no-op otherwise.
    pub fn leave(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|(entry_id, _)| entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(entry_id, _)| entry_id == id)
            .map(|index| index + 1)
    }

    /// Removes and returns the two longest-waiting entries, oldest first.
    pub fn pop_pair(&mut self) -> Option<((String, T), (String, T))> {
        if self.entries.len() < 2 {
            return None;
        }
        let first = self.entries.pop_front()?;
        let second = self.entries.pop_front()?;
        Some((first, second))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for MatchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
