// region:    --- Imports
use crate::ads::commands as ad_commands;
use crate::ads::model::{AdBrowseParams, AdChanges, NewAd};
use crate::auth::gate::AuthorizationGate;
use crate::auth::IdentityToken;
use crate::bidding::commands::{
    handle_delete_bid, handle_place_bid, handle_select_winner, handle_update_bid,
    PlaceBidCommand, UpdateBidCommand,
};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::query;
use crate::query::handlers::ListBidsParams;
use crate::store::DataStore;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 핸들러 공유 상태: 저장소와 권한 게이트
pub type AppState = (Arc<dyn DataStore>, Arc<AuthorizationGate>);

// region:    --- Router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/bids", get(handle_list_bids).post(handle_bid))
        .route(
            "/bids/:id",
            get(handle_get_bid)
                .put(handle_update_bid_price)
                .delete(handle_remove_bid),
        )
        .route("/bids/user/:user_id", get(handle_get_user_bids))
        .route("/bids/ad/:ad_id", get(handle_get_ad_bids))
        .route("/bids/select-winner/:bid_id", put(handle_select_winner_bid))
        .route("/bids/winner/:ad_id", get(handle_get_winner))
        .route("/ads", get(handle_get_my_ads).post(handle_create_ad))
        .route("/ads/all", get(handle_browse_ads))
        .route("/ads/user/:user_id", get(handle_get_user_ads))
        .route(
            "/ads/:id",
            get(handle_get_ad)
                .put(handle_update_ad)
                .delete(handle_remove_ad),
        )
        .with_state(state)
}

// endregion: --- Router

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State((store, _)): State<AppState>,
    JsonBody(cmd): JsonBody<PlaceBidCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 요청: {:?}", "Handler", cmd);
    match handle_place_bid(cmd, store.as_ref()).await {
        Ok(bid) => (StatusCode::CREATED, Json(bid)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 낙찰 선택 요청 처리 (광고 소유 판매자 전용)
pub async fn handle_select_winner_bid(
    State((store, gate)): State<AppState>,
    headers: HeaderMap,
    PathParam(bid_id): PathParam<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 낙찰 선택 요청 bid_id: {}", "Handler", bid_id);
    let token = IdentityToken::from_headers(&headers);
    match handle_select_winner(bid_id, token.as_ref(), &gate, store).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 입찰 가격 수정
pub async fn handle_update_bid_price(
    State((store, _)): State<AppState>,
    PathParam(bid_id): PathParam<i64>,
    JsonBody(cmd): JsonBody<UpdateBidCommand>,
) -> impl IntoResponse {
    match handle_update_bid(bid_id, cmd, store.as_ref()).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 입찰 삭제
pub async fn handle_remove_bid(
    State((store, _)): State<AppState>,
    PathParam(bid_id): PathParam<i64>,
) -> impl IntoResponse {
    match handle_delete_bid(bid_id, store.as_ref()).await {
        Ok(_) => Json(serde_json::json!({ "message": "Bid deleted successfully" })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 광고 등록
pub async fn handle_create_ad(
    State((store, gate)): State<AppState>,
    headers: HeaderMap,
    JsonBody(ad): JsonBody<NewAd>,
) -> impl IntoResponse {
    let token = IdentityToken::from_headers(&headers);
    match ad_commands::handle_create_ad(ad, token.as_ref(), &gate, store.as_ref()).await {
        Ok(ad) => (StatusCode::CREATED, Json(ad)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 광고 수정
pub async fn handle_update_ad(
    State((store, gate)): State<AppState>,
    headers: HeaderMap,
    PathParam(ad_id): PathParam<i64>,
    JsonBody(changes): JsonBody<AdChanges>,
) -> impl IntoResponse {
    let token = IdentityToken::from_headers(&headers);
    match ad_commands::handle_update_ad(ad_id, changes, token.as_ref(), &gate, store.as_ref())
        .await
    {
        Ok(ad) => Json(ad).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 광고 삭제
pub async fn handle_remove_ad(
    State((store, gate)): State<AppState>,
    headers: HeaderMap,
    PathParam(ad_id): PathParam<i64>,
) -> impl IntoResponse {
    let token = IdentityToken::from_headers(&headers);
    match ad_commands::handle_delete_ad(ad_id, token.as_ref(), &gate, store.as_ref()).await {
        Ok(_) => Json(serde_json::json!({ "message": "Ad deleted successfully" })).into_response(),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// 입찰 목록 조회
pub async fn handle_list_bids(
    State((store, _)): State<AppState>,
    QueryParams(params): QueryParams<ListBidsParams>,
) -> impl IntoResponse {
    match query::handlers::list_bids(store.as_ref(), &params).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 입찰 조회
pub async fn handle_get_bid(
    State((store, _)): State<AppState>,
    PathParam(bid_id): PathParam<i64>,
) -> impl IntoResponse {
    match query::handlers::get_bid(store.as_ref(), bid_id).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 사용자 입찰 목록 조회
pub async fn handle_get_user_bids(
    State((store, _)): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> impl IntoResponse {
    match query::handlers::list_bids_for_user(store.as_ref(), user_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 광고 입찰 목록 조회
pub async fn handle_get_ad_bids(
    State((store, _)): State<AppState>,
    PathParam(ad_id): PathParam<i64>,
) -> impl IntoResponse {
    match query::handlers::list_bids_for_ad(store.as_ref(), ad_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 낙찰 입찰 조회
pub async fn handle_get_winner(
    State((store, _)): State<AppState>,
    PathParam(ad_id): PathParam<i64>,
) -> impl IntoResponse {
    match query::handlers::get_winner(store.as_ref(), ad_id).await {
        Ok(bid) => Json(bid).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 내 광고 목록 조회
pub async fn handle_get_my_ads(
    State((store, gate)): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = IdentityToken::from_headers(&headers);
    match ad_commands::handle_list_my_ads(token.as_ref(), &gate, store.as_ref()).await {
        Ok(ads) => Json(ads).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 광고 상세 조회
pub async fn handle_get_ad(
    State((store, _)): State<AppState>,
    PathParam(ad_id): PathParam<i64>,
) -> impl IntoResponse {
    match ad_commands::handle_get_ad(ad_id, store.as_ref()).await {
        Ok(ad) => Json(ad).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 전체 광고 목록 조회
pub async fn handle_browse_ads(
    State((store, _)): State<AppState>,
    QueryParams(params): QueryParams<AdBrowseParams>,
) -> impl IntoResponse {
    match ad_commands::handle_browse_ads(params, store.as_ref()).await {
        Ok(ads) => Json(ads).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 판매자별 광고 목록 조회
pub async fn handle_get_user_ads(
    State((store, _)): State<AppState>,
    PathParam(user_id): PathParam<i64>,
) -> impl IntoResponse {
    match ad_commands::handle_list_user_ads(user_id, store.as_ref()).await {
        Ok(ads) => Json(ads).into_response(),
        Err(e) => e.into_response(),
    }
}

// endregion: --- Query Handlers
