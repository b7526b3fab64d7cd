//! 영속 계층 추상화
//!
//! 핸들러와 커맨드는 [`DataStore`]만 바라본다. 운영 환경은 Postgres
//! 구현을, 테스트는 메모리 구현을 주입한다.

// region:    --- Imports
use crate::ads::model::{AdChanges, AdListing, NewAd};
use crate::bidding::model::{Ad, Bid, BidView, NewUser, User};
use crate::error::AppResult;
use crate::query::sort::{AdOrdering, BidOrdering};
use async_trait::async_trait;

// endregion: --- Imports

pub mod memory;
pub mod postgres;

pub use memory::MemoryDataStore;
pub use postgres::PgDataStore;

/// 입찰 목록 조회 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidFilter {
    All,
    ByUser(i64),
    ByAd(i64),
}

impl BidFilter {
    pub fn matches(&self, bid: &Bid) -> bool {
        match self {
            BidFilter::All => true,
            BidFilter::ByUser(user_id) => bid.user_id == *user_id,
            BidFilter::ByAd(ad_id) => bid.ad_id == *ad_id,
        }
    }
}

/// 광고 목록 조회 조건 (None 은 조건 없음)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    pub seller_id: Option<i64>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl AdFilter {
    pub fn matches(&self, ad: &Ad) -> bool {
        self.seller_id.map_or(true, |id| ad.user_id == id)
            && self
                .category
                .as_ref()
                .map_or(true, |c| ad.category.as_ref() == Some(c))
            && self.min_price.map_or(true, |min| ad.ad_price >= min)
            && self.max_price.map_or(true, |max| ad.ad_price <= max)
    }
}

// region:    --- Data Store Trait
/// 트랜잭션을 지원하는 저장소 기능
///
/// `place_bid`와 `select_winner`는 원자적으로 실행되어야 한다.
/// 락 대기 시간이 초과되면 `AppError::Conflict`를 반환한다.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    async fn insert_ad(&self, seller_id: i64, ad: NewAd) -> AppResult<Ad>;

    async fn get_ad(&self, ad_id: i64) -> AppResult<Option<Ad>>;

    /// 소유자(user_id)는 변경하지 않는다
    async fn update_ad(&self, ad_id: i64, changes: AdChanges) -> AppResult<Option<Ad>>;

    async fn list_ads_for_user(&self, user_id: i64) -> AppResult<Vec<Ad>>;

    /// 광고 삭제. 광고의 입찰도 함께 삭제된다
    async fn delete_ad(&self, ad_id: i64) -> AppResult<Option<Ad>>;

    async fn list_ad_listings(
        &self,
        filter: AdFilter,
        ordering: AdOrdering,
    ) -> AppResult<Vec<AdListing>>;

    /// 입찰 저장과 입찰자 total_bid 증가를 한 트랜잭션으로 처리
    async fn place_bid(&self, ad_id: i64, bidder_id: i64, bid_price: i64) -> AppResult<Bid>;

    async fn get_bid(&self, bid_id: i64) -> AppResult<Option<Bid>>;

    async fn find_bid_view(&self, bid_id: i64) -> AppResult<Option<BidView>>;

    async fn list_bid_views(
        &self,
        filter: BidFilter,
        ordering: BidOrdering,
    ) -> AppResult<Vec<BidView>>;

    async fn find_winner(&self, ad_id: i64) -> AppResult<Option<BidView>>;

    /// 광고 단위로 직렬화된 트랜잭션 안에서 기존 낙찰을 모두 해제하고 대상 입찰을 낙찰 처리
    async fn select_winner(&self, ad_id: i64, bid_id: i64) -> AppResult<Bid>;

    async fn update_bid_price(&self, bid_id: i64, bid_price: i64) -> AppResult<Option<Bid>>;

    async fn delete_bid(&self, bid_id: i64) -> AppResult<Option<Bid>>;
}

// endregion: --- Data Store Trait
