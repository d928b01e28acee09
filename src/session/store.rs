use std::collections::BTreeMap;
use tracing::{debug, info};

use super::artifact::ResponseArtifact;

/// Per-question map of response artifacts
///
/// Owns preview lifetime: any artifact that is replaced or removed has its
/// preview revoked. Replacement swaps the whole entry in one step and the
/// old preview is revoked only after the new artifact is in place.
#[derive(Debug, Default)]
pub struct ResponseStore {
    responses: BTreeMap<usize, ResponseArtifact>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `artifact` for `index`, revoking whatever was there
    pub fn set(&mut self, index: usize, artifact: ResponseArtifact) {
        let url = artifact.preview_url().to_string();
        if let Some(previous) = self.responses.insert(index, artifact) {
            previous.release();
            info!(
                "Replaced response for question {} ({} -> {})",
                index,
                previous.preview_url(),
                url
            );
        } else {
            info!("Stored response for question {} ({})", index, url);
        }
    }

    pub fn get(&self, index: usize) -> Option<&ResponseArtifact> {
        self.responses.get(&index)
    }

    /// Remove the artifact at `index`. Clearing an empty slot is a no-op.
    pub fn clear(&mut self, index: usize) -> bool {
        match self.responses.remove(&index) {
            Some(artifact) => {
                artifact.release();
                info!("Cleared response for question {}", index);
                true
            }
            None => {
                debug!("No response to clear for question {}", index);
                false
            }
        }
    }

    /// Revoke and drop every artifact
    pub fn clear_all(&mut self) -> usize {
        let count = self.responses.len();
        for artifact in self.responses.values() {
            artifact.release();
        }
        self.responses.clear();
        info!("Cleared all responses ({} revoked)", count);
        count
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.responses.contains_key(&index)
    }

    /// Highest answered index, `None` when nothing is answered
    pub fn highest_answered_index(&self) -> Option<usize> {
        self.responses.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ResponseArtifact)> {
        self.responses.iter().map(|(i, a)| (*i, a))
    }
}
