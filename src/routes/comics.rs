use log::{info, warn};
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::models::comic::{Comic, FeedPage, NewComic};
use crate::models::error::GalleryError;
use crate::services::auth::AuthGuard;
use crate::services::feed::{FeedEngine, FeedParams};
use crate::services::vote::{VoteAction, VoteOutcome};
use crate::store::comic_store::ComicStore;

#[derive(FromForm)]
pub struct FeedRequest {
    pub search: Option<String>,
    #[field(name = "sortBy")]
    pub sort_by: Option<String>,
    #[field(name = "sortOrder")]
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    action: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicWithViewerVote {
    comic: Comic,
    user_vote: Option<&'static str>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    success: bool,
}

#[get("/comics?<query..>")]
pub async fn list_comics(
    feed: &State<FeedEngine>,
    query: FeedRequest,
) -> Result<Json<FeedPage>, Status> {
    let page = feed
        .query(FeedParams {
            search: query.search,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            page: query.page,
            limit: query.limit,
        })
        .await
        .map_err(|e| {
            warn!("Feed query rejected: {}", e);
            e.status()
        })?;
    Ok(Json(page))
}

#[get("/comics/top?<n>")]
pub async fn top_comics(
    feed: &State<FeedEngine>,
    n: Option<usize>,
) -> Result<Json<Vec<Comic>>, Status> {
    feed.top(n).await.map(Json).map_err(|e| {
        warn!("Top query rejected: {}", e);
        e.status()
    })
}

#[get("/comics/<id>")]
pub async fn get_comic(
    comics: &State<ComicStore>,
    viewer: Option<AuthGuard>,
    id: String,
) -> Result<Json<ComicWithViewerVote>, Status> {
    let comic = comics.get_by_id(&id).await.map_err(|e| e.status())?;

    let user_vote = viewer.and_then(|auth| {
        let address = &auth.account.address;
        if comic.has_liked(address) {
            Some("like")
        } else if comic.has_disliked(address) {
            Some("dislike")
        } else {
            None
        }
    });

    Ok(Json(ComicWithViewerVote { comic, user_vote }))
}

#[post("/comics", data = "<payload>")]
pub async fn create_comic(
    comics: &State<ComicStore>,
    auth: AuthGuard,
    payload: Json<NewComic>,
) -> Result<Created<Json<Comic>>, Status> {
    let comic = comics
        .create(payload.into_inner(), &auth.account.id, &auth.account.address)
        .await
        .map_err(|e| {
            warn!("Comic creation rejected: {}", e);
            e.status()
        })?;

    info!("Comic {} created by {}", comic.id, comic.creator_address);
    let location = format!("/comics/{}", comic.id);
    Ok(Created::new(location).body(Json(comic)))
}

/// Only the creator may delete a comic.
#[delete("/comics/<id>")]
pub async fn delete_comic(
    comics: &State<ComicStore>,
    auth: AuthGuard,
    id: String,
) -> Result<Json<DeleteResponse>, Status> {
    let comic = comics.get_by_id(&id).await.map_err(|e| e.status())?;
    if comic.creator_address != auth.account.address {
        return Err(GalleryError::Forbidden.status());
    }

    comics.delete_by_id(&id).await.map_err(|e| e.status())?;
    info!("Comic {} deleted by {}", id, auth.account.address);
    Ok(Json(DeleteResponse { success: true }))
}

#[post("/comics/<id>/vote", data = "<payload>")]
pub async fn vote_comic(
    comics: &State<ComicStore>,
    auth: AuthGuard,
    id: String,
    payload: Json<VoteRequest>,
) -> Result<Json<VoteOutcome>, Status> {
    let action = VoteAction::parse(&payload.action).map_err(|e| {
        warn!("Vote rejected: {}", e);
        e.status()
    })?;

    let outcome = comics
        .apply_vote(&id, &auth.account.address, action)
        .await
        .map_err(|e| e.status())?;
    Ok(Json(outcome))
}

#[options("/comics")]
pub fn comics_options() -> Status {
    Status::NoContent
}

#[options("/comics/top")]
pub fn top_options() -> Status {
    Status::NoContent
}

#[options("/comics/<_id>")]
pub fn comic_options(_id: String) -> Status {
    Status::NoContent
}

#[options("/comics/<_id>/vote")]
pub fn vote_options(_id: String) -> Status {
    Status::NoContent
}
