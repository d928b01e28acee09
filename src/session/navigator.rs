use tracing::{debug, warn};

use crate::error::NavigationError;

/// Tracks the active question and the progressive unlock frontier
///
/// `max_unlocked_index = min(highest_answered + 1, N - 1)`, or 0 when
/// nothing is answered. `current_index` never exceeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNavigator {
    question_count: usize,
    current_index: usize,
    max_unlocked_index: usize,
}

impl SessionNavigator {
    /// Navigator for `question_count` questions (at least one)
    pub fn new(question_count: usize) -> Self {
        Self {
            question_count: question_count.max(1),
            current_index: 0,
            max_unlocked_index: 0,
        }
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_unlocked_index(&self) -> usize {
        self.max_unlocked_index
    }

    pub fn last_index(&self) -> usize {
        self.question_count - 1
    }

    pub fn is_last(&self) -> bool {
        self.current_index == self.last_index()
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        index <= self.max_unlocked_index
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if index > self.max_unlocked_index {
            warn!(
                "Navigation to question {} rejected (unlocked up to {})",
                index, self.max_unlocked_index
            );
            return Err(NavigationError::Locked {
                requested: index,
                max_unlocked: self.max_unlocked_index,
            });
        }

        self.current_index = index;
        Ok(())
    }

    /// Advance one question if the next one is unlocked
    pub fn next(&mut self) -> bool {
        if self.current_index < self.max_unlocked_index {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Step back one question, stopping at 0
    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Recompute the frontier after the response set changed
    ///
    /// If the frontier drops below the current question (the furthest answer
    /// was cleared), the current question moves back to the frontier.
    pub fn recompute_unlock(&mut self, highest_answered: Option<usize>) {
        self.max_unlocked_index = match highest_answered {
            Some(h) => (h + 1).min(self.last_index()),
            None => 0,
        };

        if self.current_index > self.max_unlocked_index {
            debug!(
                "Current question {} beyond frontier {}, moving back",
                self.current_index, self.max_unlocked_index
            );
            self.current_index = self.max_unlocked_index;
        }
    }
}
