//! Bounded queue of display lines; the oldest line is dropped when full.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct DisplayQueue {
    lines: VecDeque<String>,
    capacity: usize,
    dropped: u64,
}

impl DisplayQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append a line, evicting the oldest one if the queue is full
    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.dropped += 1;
        }
        self.lines.push_back(line);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Take every queued line, oldest first
    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines evicted since creation
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
