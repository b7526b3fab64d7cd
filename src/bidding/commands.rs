/// 입찰 관련 커맨드 처리
/// 1. 입찰
/// 2. 낙찰 선택
/// 3. 입찰 가격 수정
/// 4. 입찰 삭제
// region:    --- Imports
use crate::auth::gate::AuthorizationGate;
use crate::auth::IdentityToken;
use crate::bidding::model::{Bid, Role};
use crate::error::{AppError, AppResult};
use crate::store::DataStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub user_id: i64,
    pub ad_id: i64,
    pub price: i64,
}

/// 입찰 가격 수정 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateBidCommand {
    pub price: i64,
}

// 낙찰 트랜잭션 충돌 시 최대 재시도 횟수
const MAX_RETRIES: u32 = 3;

// 재시도 초기 대기 (매 회 두 배)
const RETRY_INITIAL_DELAY_MS: u64 = 50;

fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::InvalidArgument(
            "price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// 1. 입찰
pub async fn handle_place_bid(cmd: PlaceBidCommand, store: &dyn DataStore) -> AppResult<Bid> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    validate_price(cmd.price)?;

    let bid = store.place_bid(cmd.ad_id, cmd.user_id, cmd.price).await?;
    info!(
        "{:<12} --> 입찰 저장 완료 bid_id: {}, ad_id: {}",
        "Command", bid.id, bid.ad_id
    );
    Ok(bid)
}

/// 2. 낙찰 선택
///
/// 역할 검사 → 입찰 조회 → 광고 소유권 검사 → 광고 단위 트랜잭션 순으로 진행한다.
/// 트랜잭션은 별도 태스크에서 실행되어 요청이 끊겨도 커밋 또는 롤백까지 진행된다.
pub async fn handle_select_winner(
    bid_id: i64,
    token: Option<&IdentityToken>,
    gate: &AuthorizationGate,
    store: Arc<dyn DataStore>,
) -> AppResult<Bid> {
    info!("{:<12} --> 낙찰 선택 요청 bid_id: {}", "Command", bid_id);

    // 판매자가 아니면 입찰 존재 여부와 무관하게 거부
    gate.require_role(token, Role::Seller)?;

    let bid = store
        .get_bid(bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))?;

    let (identity, ad) = gate.require_seller_ownership(token, bid.ad_id).await?;

    let ad_id = ad.id;
    let winner = tokio::spawn(async move { select_with_retry(store, ad_id, bid_id).await })
        .await
        .map_err(|e| AppError::Internal(format!("winner selection task failed: {}", e)))??;

    info!(
        "{:<12} --> 낙찰 선택 완료 ad_id: {}, bid_id: {}, seller_id: {}",
        "Command", ad_id, bid_id, identity.user_id
    );
    Ok(winner)
}

async fn select_with_retry(store: Arc<dyn DataStore>, ad_id: i64, bid_id: i64) -> AppResult<Bid> {
    let mut retries = 0;
    let mut delay = Duration::from_millis(RETRY_INITIAL_DELAY_MS);

    loop {
        match store.select_winner(ad_id, bid_id).await {
            Err(e) if e.is_retryable() && retries < MAX_RETRIES => {
                retries += 1;
                warn!(
                    "{:<12} --> 낙찰 트랜잭션 충돌: 재시도 ({}/{})",
                    "Command", retries, MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            result => return result,
        }
    }
}

/// 3. 입찰 가격 수정
pub async fn handle_update_bid(
    bid_id: i64,
    cmd: UpdateBidCommand,
    store: &dyn DataStore,
) -> AppResult<Bid> {
    info!(
        "{:<12} --> 입찰 가격 수정 bid_id: {}, price: {}",
        "Command", bid_id, cmd.price
    );
    validate_price(cmd.price)?;
    store
        .update_bid_price(bid_id, cmd.price)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
}

/// 4. 입찰 삭제
pub async fn handle_delete_bid(bid_id: i64, store: &dyn DataStore) -> AppResult<Bid> {
    info!("{:<12} --> 입찰 삭제 bid_id: {}", "Command", bid_id);
    store
        .delete_bid(bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
}

// endregion: --- Commands
