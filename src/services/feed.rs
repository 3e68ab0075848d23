use std::cmp::Ordering;

use crate::models::comic::{Comic, FeedPage};
use crate::models::error::GalleryError;
use crate::store::comic_store::{ComicRecord, ComicStore};

const DEFAULT_LIMIT: usize = 9;
const MAX_LIMIT: usize = 100;
const DEFAULT_TOP: usize = 5;
const MAX_TOP: usize = 50;

/// Allow-listed feed sort fields. Anything outside this enumeration is a
/// validation error, never a pass-through to the sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Likes,
    Dislikes,
}

impl SortField {
    fn parse(raw: &str) -> Result<Self, GalleryError> {
        match raw {
            "createdAt" => Ok(SortField::CreatedAt),
            "likes" => Ok(SortField::Likes),
            "dislikes" => Ok(SortField::Dislikes),
            other => Err(GalleryError::Validation(format!("unknown sort field '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Result<Self, GalleryError> {
        match raw {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(GalleryError::Validation(format!("unknown sort order '{}'", other))),
        }
    }
}

/// Raw feed query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default)]
pub struct FeedParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

struct FeedQuery {
    search: String,
    sort_by: SortField,
    sort_order: SortOrder,
    page: usize,
    limit: usize,
}

impl FeedQuery {
    fn validate(params: FeedParams) -> Result<Self, GalleryError> {
        let sort_by = match params.sort_by.as_deref() {
            Some(raw) => SortField::parse(raw)?,
            None => SortField::CreatedAt,
        };
        let sort_order = match params.sort_order.as_deref() {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::Desc,
        };
        let page = params.page.unwrap_or(1);
        if page < 1 {
            return Err(GalleryError::Validation("page must be >= 1".to_string()));
        }
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit < 1 || limit > MAX_LIMIT {
            return Err(GalleryError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(FeedQuery {
            search: params.search.unwrap_or_default(),
            sort_by,
            sort_order,
            page,
            limit,
        })
    }
}

/// Builds filtered, sorted, paginated views of the public comic collection.
#[derive(Clone)]
pub struct FeedEngine {
    store: ComicStore,
}

impl FeedEngine {
    pub fn new(store: ComicStore) -> Self {
        FeedEngine { store }
    }

    /// One page of the public feed. `total` counts every match regardless of
    /// the requested window.
    pub async fn query(&self, params: FeedParams) -> Result<FeedPage, GalleryError> {
        let query = FeedQuery::validate(params)?;

        let mut records = self.store.public_records().await?;
        records.retain(|record| record.comic.matches_search(&query.search));
        sort_records(&mut records, query.sort_by, query.sort_order);

        let total = records.len();
        let total_pages = total.div_ceil(query.limit);
        // Saturating arithmetic: `page` has no upper bound, so a huge page
        // must land on an empty window instead of overflowing.
        let has_more = query
            .page
            .checked_mul(query.limit)
            .map_or(false, |window_end| window_end < total);
        let comics = records
            .into_iter()
            .skip(query.page.saturating_sub(1).saturating_mul(query.limit))
            .take(query.limit)
            .map(|record| record.comic)
            .collect();

        Ok(FeedPage {
            comics,
            total,
            page: query.page,
            limit: query.limit,
            total_pages,
            has_more,
        })
    }

    /// Leaderboard mode: the first `n` public comics by likes descending.
    pub async fn top(&self, n: Option<usize>) -> Result<Vec<Comic>, GalleryError> {
        let n = n.unwrap_or(DEFAULT_TOP);
        if n < 1 || n > MAX_TOP {
            return Err(GalleryError::Validation(format!(
                "n must be between 1 and {}",
                MAX_TOP
            )));
        }

        let mut records = self.store.public_records().await?;
        sort_records(&mut records, SortField::Likes, SortOrder::Desc);
        Ok(records.into_iter().take(n).map(|record| record.comic).collect())
    }
}

/// Sort by the requested field and order; ties fall back to insertion
/// sequence ascending so pagination windows are reproducible.
fn sort_records(records: &mut [ComicRecord], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let key = match field {
            SortField::CreatedAt => a.comic.created_at.cmp(&b.comic.created_at),
            SortField::Likes => a.comic.likes.cmp(&b.comic.likes),
            SortField::Dislikes => a.comic.dislikes.cmp(&b.comic.dislikes),
        };
        let key = match order {
            SortOrder::Asc => key,
            SortOrder::Desc => key.reverse(),
        };
        match key {
            Ordering::Equal => a.seq.cmp(&b.seq),
            other => other,
        }
    });
}
