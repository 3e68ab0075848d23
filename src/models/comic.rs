use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A four-panel comic record with its voting metadata.
///
/// `likes`/`dislikes` always mirror the sizes of `liked_by`/`disliked_by`;
/// the counters are recomputed from the sets after every mutation rather
/// than adjusted independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub creator_address: String,
    pub image_url: String,
    /// Presentation settings blob; stored and returned verbatim.
    pub settings: serde_json::Value,
    pub is_public: bool,
    pub likes: u64,
    pub dislikes: u64,
    pub liked_by: BTreeSet<String>,
    pub disliked_by: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Comic {
    pub fn has_liked(&self, voter: &str) -> bool {
        self.liked_by.contains(voter)
    }

    pub fn has_disliked(&self, voter: &str) -> bool {
        self.disliked_by.contains(voter)
    }

    /// Re-derive the counters from the membership sets.
    pub fn recount(&mut self) {
        self.likes = self.liked_by.len() as u64;
        self.dislikes = self.disliked_by.len() as u64;
    }

    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Fields supplied by the client when creating a comic. Every field is
/// defaulted at the serde layer so that a missing field reaches store
/// validation (and a 400) instead of dying as a body-parse failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComic {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

/// One page of the public feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub comics: Vec<Comic>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_more: bool,
}
