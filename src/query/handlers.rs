// region:    --- Imports
use super::sort::BidOrdering;
use crate::bidding::model::BidView;
use crate::error::{AppError, AppResult};
use crate::store::{BidFilter, DataStore};
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// 입찰 목록 정렬 쿼리 파라미터 (?sortBy&sortOrder&priceSortOrder)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBidsParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub price_sort_order: Option<String>,
}

// region:    --- Query Handlers

/// 전체 입찰 목록 조회 (정렬 값 검증 후 조회)
pub async fn list_bids(store: &dyn DataStore, params: &ListBidsParams) -> AppResult<Vec<BidView>> {
    info!("{:<12} --> 입찰 목록 조회: {:?}", "Query", params);
    let ordering = BidOrdering::parse(
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
        params.price_sort_order.as_deref(),
    )?;
    store.list_bid_views(BidFilter::All, ordering).await
}

/// 입찰 조회
pub async fn get_bid(store: &dyn DataStore, bid_id: i64) -> AppResult<BidView> {
    info!("{:<12} --> 입찰 조회 id: {}", "Query", bid_id);
    store
        .find_bid_view(bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
}

/// 사용자 입찰 목록 조회 (결과가 없으면 빈 목록)
pub async fn list_bids_for_user(store: &dyn DataStore, user_id: i64) -> AppResult<Vec<BidView>> {
    info!("{:<12} --> 사용자 입찰 목록 조회 user_id: {}", "Query", user_id);
    store
        .list_bid_views(BidFilter::ByUser(user_id), BidOrdering::default())
        .await
}

/// 광고 입찰 목록 조회 (결과가 없으면 빈 목록)
pub async fn list_bids_for_ad(store: &dyn DataStore, ad_id: i64) -> AppResult<Vec<BidView>> {
    info!("{:<12} --> 광고 입찰 목록 조회 ad_id: {}", "Query", ad_id);
    store
        .list_bid_views(BidFilter::ByAd(ad_id), BidOrdering::default())
        .await
}

/// 낙찰 입찰 조회
pub async fn get_winner(store: &dyn DataStore, ad_id: i64) -> AppResult<BidView> {
    info!("{:<12} --> 낙찰 입찰 조회 ad_id: {}", "Query", ad_id);
    store
        .find_winner(ad_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No winning bid found for this ad".to_string()))
}

// endregion: --- Query Handlers
