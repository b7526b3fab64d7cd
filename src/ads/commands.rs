// region:    --- Imports
use super::model::{AdBrowseParams, AdChanges, AdDetail, AdListing, NewAd};
use crate::auth::gate::AuthorizationGate;
use crate::auth::IdentityToken;
use crate::bidding::model::{Ad, Role};
use crate::error::{AppError, AppResult};
use crate::query::sort::AdOrdering;
use crate::store::{AdFilter, DataStore};
use tracing::info;

// endregion: --- Imports

// region:    --- Ad Commands

/// 광고 등록 (판매자 전용, 호출자가 소유자가 된다)
pub async fn handle_create_ad(
    ad: NewAd,
    token: Option<&IdentityToken>,
    gate: &AuthorizationGate,
    store: &dyn DataStore,
) -> AppResult<Ad> {
    let identity = gate.require_role(token, Role::Seller)?;
    ad.validate()?;
    let created = store.insert_ad(identity.user_id, ad).await?;
    info!(
        "{:<12} --> 광고 등록 ad_id: {}, seller_id: {}",
        "Command", created.id, identity.user_id
    );
    Ok(created)
}

/// 내 광고 목록 (판매자 전용)
pub async fn handle_list_my_ads(
    token: Option<&IdentityToken>,
    gate: &AuthorizationGate,
    store: &dyn DataStore,
) -> AppResult<Vec<Ad>> {
    let identity = gate.require_role(token, Role::Seller)?;
    store.list_ads_for_user(identity.user_id).await
}

/// 광고 상세 조회
pub async fn handle_get_ad(ad_id: i64, store: &dyn DataStore) -> AppResult<AdDetail> {
    let ad = store
        .get_ad(ad_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;
    let has_winner = store.find_winner(ad_id).await?.is_some();
    Ok(AdDetail { ad, has_winner })
}

/// 광고 수정 (소유 판매자 전용)
pub async fn handle_update_ad(
    ad_id: i64,
    changes: AdChanges,
    token: Option<&IdentityToken>,
    gate: &AuthorizationGate,
    store: &dyn DataStore,
) -> AppResult<Ad> {
    let (identity, _) = gate.require_seller_ownership(token, ad_id).await?;
    changes.validate()?;
    let updated = store
        .update_ad(ad_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;
    info!(
        "{:<12} --> 광고 수정 ad_id: {}, seller_id: {}",
        "Command", ad_id, identity.user_id
    );
    Ok(updated)
}

/// 광고 삭제 (소유 판매자 전용, 입찰도 함께 삭제)
pub async fn handle_delete_ad(
    ad_id: i64,
    token: Option<&IdentityToken>,
    gate: &AuthorizationGate,
    store: &dyn DataStore,
) -> AppResult<Ad> {
    let (identity, _) = gate.require_seller_ownership(token, ad_id).await?;
    let deleted = store
        .delete_ad(ad_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;
    info!(
        "{:<12} --> 광고 삭제 ad_id: {}, seller_id: {}",
        "Command", ad_id, identity.user_id
    );
    Ok(deleted)
}

/// 전체 광고 목록 (필터와 정렬 값 검증 후 조회)
pub async fn handle_browse_ads(
    params: AdBrowseParams,
    store: &dyn DataStore,
) -> AppResult<Vec<AdListing>> {
    info!("{:<12} --> 광고 목록 조회: {:?}", "Query", params);
    let ordering = AdOrdering::parse(params.sort_by.as_deref(), params.sort_order.as_deref())?;
    let filter = AdFilter {
        seller_id: None,
        category: params.category.filter(|c| !c.is_empty()),
        min_price: params.min_price,
        max_price: params.max_price,
    };
    store.list_ad_listings(filter, ordering).await
}

/// 판매자별 광고 목록 (결과가 없으면 빈 목록)
pub async fn handle_list_user_ads(
    user_id: i64,
    store: &dyn DataStore,
) -> AppResult<Vec<AdListing>> {
    let filter = AdFilter {
        seller_id: Some(user_id),
        ..Default::default()
    };
    store.list_ad_listings(filter, AdOrdering::default()).await
}

// endregion: --- Ad Commands
