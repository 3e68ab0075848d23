use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;

use chrono::Utc;
use uuid::Uuid;

use crate::models::comic::{Comic, NewComic};
use crate::models::error::GalleryError;
use crate::services::vote::{apply_vote, VoteAction, VoteOutcome};

/// A stored record plus its insertion sequence number. The sequence is the
/// deterministic tie-break for feed sorting.
#[derive(Debug, Clone)]
pub struct ComicRecord {
    pub seq: u64,
    pub comic: Comic,
}

/// Durable home of all comic records.
///
/// Vote transitions run entirely under the write lock (read current record,
/// compute transition, write back), so concurrent votes on the same comic
/// cannot lose updates. Every lock acquisition is bounded by `op_timeout`;
/// on expiry the operation fails with `StoreUnavailable` and the caller may
/// retry.
#[derive(Clone)]
pub struct ComicStore {
    comics: Arc<RwLock<HashMap<String, ComicRecord>>>,
    next_seq: Arc<AtomicU64>,
    op_timeout: Duration,
}

impl ComicStore {
    pub fn new(op_timeout: Duration) -> Self {
        ComicStore {
            comics: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            op_timeout,
        }
    }

    async fn read_guard(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<String, ComicRecord>>, GalleryError> {
        timeout(self.op_timeout, self.comics.read())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)
    }

    async fn write_guard(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, ComicRecord>>, GalleryError> {
        timeout(self.op_timeout, self.comics.write())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)
    }

    /// Create and persist a new comic owned by `creator_id`/`creator_address`.
    pub async fn create(
        &self,
        new: NewComic,
        creator_id: &str,
        creator_address: &str,
    ) -> Result<Comic, GalleryError> {
        if new.title.trim().is_empty() {
            return Err(GalleryError::Validation("title is required".to_string()));
        }
        if new.image_url.trim().is_empty() {
            return Err(GalleryError::Validation("imageUrl is required".to_string()));
        }
        if new.settings.is_null() {
            return Err(GalleryError::Validation("settings is required".to_string()));
        }
        if creator_id.is_empty() || creator_address.is_empty() {
            return Err(GalleryError::Validation("creator is required".to_string()));
        }

        let comic = Comic {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            creator_id: creator_id.to_string(),
            creator_address: creator_address.to_lowercase(),
            image_url: new.image_url,
            settings: new.settings,
            is_public: new.is_public,
            likes: 0,
            dislikes: 0,
            liked_by: Default::default(),
            disliked_by: Default::default(),
            created_at: Utc::now(),
        };

        let mut comics = self.write_guard().await?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        comics.insert(comic.id.clone(), ComicRecord { seq, comic: comic.clone() });
        Ok(comic)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Comic, GalleryError> {
        let comics = self.read_guard().await?;
        comics
            .get(id)
            .map(|record| record.comic.clone())
            .ok_or(GalleryError::NotFound)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), GalleryError> {
        let mut comics = self.write_guard().await?;
        comics.remove(id).map(|_| ()).ok_or(GalleryError::NotFound)
    }

    /// Overwrite a previously fetched record.
    ///
    /// Caller-supplied counters are not trusted: the counts are recomputed
    /// from the membership sets before the write. A record whose sets
    /// intersect cannot be repaired that way and is rejected.
    pub async fn save(&self, mut comic: Comic) -> Result<Comic, GalleryError> {
        if comic.liked_by.intersection(&comic.disliked_by).next().is_some() {
            return Err(GalleryError::Conflict(
                "an account appears in both likedBy and dislikedBy".to_string(),
            ));
        }
        comic.recount();

        let mut comics = self.write_guard().await?;
        let record = comics.get_mut(&comic.id).ok_or(GalleryError::NotFound)?;
        record.comic = comic.clone();
        Ok(comic)
    }

    /// Apply a vote transition atomically: the record is read, transitioned
    /// and written back under a single write lock.
    pub async fn apply_vote(
        &self,
        id: &str,
        voter: &str,
        action: VoteAction,
    ) -> Result<VoteOutcome, GalleryError> {
        let mut comics = self.write_guard().await?;
        let record = comics.get_mut(id).ok_or(GalleryError::NotFound)?;
        Ok(apply_vote(&mut record.comic, voter, action))
    }

    /// Snapshot of all public records, for the feed engine.
    pub async fn public_records(&self) -> Result<Vec<ComicRecord>, GalleryError> {
        let comics = self.read_guard().await?;
        Ok(comics
            .values()
            .filter(|record| record.comic.is_public)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ComicStore {
        ComicStore::new(Duration::from_millis(500))
    }

    fn new_comic(title: &str) -> NewComic {
        NewComic {
            title: title.to_string(),
            image_url: format!("/images/{}.png", title),
            settings: serde_json::json!({ "panelLayout": "2x2" }),
            is_public: true,
        }
    }

    #[rocket::async_test]
    async fn create_assigns_id_and_zeroed_votes() {
        let store = store();
        let comic = store.create(new_comic("First"), "u1", "0xABC").await.unwrap();
        assert!(!comic.id.is_empty());
        assert_eq!(comic.creator_address, "0xabc");
        assert_eq!(comic.likes, 0);
        assert_eq!(comic.dislikes, 0);
        assert!(comic.liked_by.is_empty());

        let fetched = store.get_by_id(&comic.id).await.unwrap();
        assert_eq!(fetched.title, "First");
    }

    #[rocket::async_test]
    async fn create_rejects_empty_title_and_persists_nothing() {
        let store = store();
        let err = store.create(new_comic("   "), "u1", "0xabc").await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(_)));
        assert!(store.public_records().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn create_rejects_null_settings() {
        let store = store();
        let mut bad = new_comic("Settings");
        bad.settings = serde_json::Value::Null;
        let err = store.create(bad, "u1", "0xabc").await.unwrap_err();
        assert!(matches!(err, GalleryError::Validation(_)));
    }

    #[rocket::async_test]
    async fn delete_missing_is_not_found() {
        let store = store();
        let err = store.delete_by_id("nope").await.unwrap_err();
        assert_eq!(err, GalleryError::NotFound);
    }

    #[rocket::async_test]
    async fn delete_removes_record() {
        let store = store();
        let comic = store.create(new_comic("Gone"), "u1", "0xabc").await.unwrap();
        store.delete_by_id(&comic.id).await.unwrap();
        assert_eq!(store.get_by_id(&comic.id).await.unwrap_err(), GalleryError::NotFound);
    }

    #[rocket::async_test]
    async fn save_recomputes_counters_from_sets() {
        let store = store();
        let mut comic = store.create(new_comic("Drift"), "u1", "0xabc").await.unwrap();
        comic.liked_by.insert("0xa".to_string());
        comic.liked_by.insert("0xb".to_string());
        comic.likes = 99;

        let saved = store.save(comic).await.unwrap();
        assert_eq!(saved.likes, 2);
        assert_eq!(saved.dislikes, 0);
    }

    #[rocket::async_test]
    async fn save_rejects_intersecting_vote_sets() {
        let store = store();
        let mut comic = store.create(new_comic("Bad"), "u1", "0xabc").await.unwrap();
        comic.liked_by.insert("0xa".to_string());
        comic.disliked_by.insert("0xa".to_string());

        let err = store.save(comic).await.unwrap_err();
        assert!(matches!(err, GalleryError::Conflict(_)));
    }

    #[rocket::async_test]
    async fn vote_through_store_returns_outcome() {
        let store = store();
        let comic = store.create(new_comic("Voted"), "u1", "0xabc").await.unwrap();

        let out = store.apply_vote(&comic.id, "0xa", VoteAction::Like).await.unwrap();
        assert_eq!(out.likes, 1);
        assert!(out.has_liked);

        let fetched = store.get_by_id(&comic.id).await.unwrap();
        assert_eq!(fetched.likes, 1);
        assert!(fetched.has_liked("0xa"));
    }

    #[rocket::async_test]
    async fn concurrent_votes_on_same_comic_all_land() {
        let store = store();
        let comic = store.create(new_comic("Busy"), "u1", "0xabc").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = comic.id.clone();
            handles.push(rocket::tokio::spawn(async move {
                store.apply_vote(&id, &format!("0x{:02}", i), VoteAction::Like).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fetched = store.get_by_id(&comic.id).await.unwrap();
        assert_eq!(fetched.likes, 16);
        assert_eq!(fetched.liked_by.len(), 16);
    }
}
