//! Unified gallery: the reconciled, merged, sorted view of all media.

use atelier_core::models::{GallerySort, MediaKind, UnifiedMediaItem};
use atelier_store::{filter_kind, merge, reconcile, sort_items};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::StoreState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GalleryQuery {
    #[serde(default)]
    pub filter: Option<MediaKind>,
    #[serde(default)]
    pub sort: Option<GallerySort>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryResponse {
    pub success: bool,
    pub items: Vec<UnifiedMediaItem>,
}

#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "gallery",
    params(
        ("filter" = Option<String>, Query, description = "Restrict to `image` or `video`"),
        ("sort" = Option<String>, Query, description = "`newest` (default), `oldest`, or `favorites`")
    ),
    responses((status = 200, description = "Unified media view", body = GalleryResponse))
)]
#[tracing::instrument(skip(store))]
pub async fn gallery(
    State(store): State<StoreState>,
    Query(query): Query<GalleryQuery>,
) -> Json<GalleryResponse> {
    let now = Utc::now();

    let images = reconcile(
        MediaKind::Image,
        &store.library.list(MediaKind::Image).await,
        &store.image_journal.list().await,
        now,
    );
    let videos = reconcile(
        MediaKind::Video,
        &store.library.list(MediaKind::Video).await,
        &store.video_journal.list().await,
        now,
    );

    let items = sort_items(
        filter_kind(merge(images, videos), query.filter),
        query.sort.unwrap_or_default(),
    );

    Json(GalleryResponse {
        success: true,
        items,
    })
}
