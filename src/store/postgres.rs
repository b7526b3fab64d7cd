// region:    --- Imports
use super::{AdFilter, BidFilter, DataStore};
use crate::ads::model::{AdChanges, AdListing, NewAd};
use crate::bidding::model::{Ad, Bid, BidView, NewUser, User};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::query::queries;
use crate::query::sort::{AdOrdering, BidOrdering};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Postgres Data Store
/// Postgres 저장소 구현체
pub struct PgDataStore {
    db: Arc<DatabaseManager>,
    lock_timeout: Duration,
}

impl PgDataStore {
    pub fn new(db: Arc<DatabaseManager>, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }

    fn lock_timeout_ms(&self) -> u64 {
        // lock_timeout = 0 은 "무제한"이므로 최소 1ms
        (self.lock_timeout.as_millis() as u64).max(1)
    }
}

// 첫 조건 앞에는 WHERE, 이후에는 AND
fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, first: &mut bool, condition: &str) {
    builder.push(if *first { " WHERE " } else { " AND " });
    builder.push(condition);
    *first = false;
}

#[async_trait]
impl DataStore for PgDataStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(&user.number)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(&user.profile_pic)
            .fetch_one(self.db.pool())
            .await?;
        Ok(created)
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn insert_ad(&self, seller_id: i64, ad: NewAd) -> AppResult<Ad> {
        let created = sqlx::query_as::<_, Ad>(queries::INSERT_AD)
            .bind(seller_id)
            .bind(&ad.ad_title)
            .bind(ad.ad_price)
            .bind(&ad.ad_weight)
            .bind(&ad.ad_location)
            .bind(&ad.ad_delivery)
            .bind(&ad.category)
            .bind(ad.image_slot(0))
            .bind(ad.image_slot(1))
            .bind(ad.image_slot(2))
            .fetch_one(self.db.pool())
            .await?;
        Ok(created)
    }

    async fn get_ad(&self, ad_id: i64) -> AppResult<Option<Ad>> {
        let ad = sqlx::query_as::<_, Ad>(queries::GET_AD)
            .bind(ad_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(ad)
    }

    async fn update_ad(&self, ad_id: i64, changes: AdChanges) -> AppResult<Option<Ad>> {
        let ad = sqlx::query_as::<_, Ad>(queries::UPDATE_AD)
            .bind(ad_id)
            .bind(&changes.ad_title)
            .bind(changes.ad_price)
            .bind(&changes.ad_weight)
            .bind(&changes.ad_location)
            .bind(&changes.ad_delivery)
            .bind(&changes.category)
            .bind(&changes.image1_url)
            .bind(&changes.image2_url)
            .bind(&changes.image3_url)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(ad)
    }

    async fn list_ads_for_user(&self, user_id: i64) -> AppResult<Vec<Ad>> {
        let ads = sqlx::query_as::<_, Ad>(queries::LIST_ADS_FOR_USER)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(ads)
    }

    async fn delete_ad(&self, ad_id: i64) -> AppResult<Option<Ad>> {
        let ad = sqlx::query_as::<_, Ad>(queries::DELETE_AD)
            .bind(ad_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(ad)
    }

    async fn list_ad_listings(
        &self,
        filter: AdFilter,
        ordering: AdOrdering,
    ) -> AppResult<Vec<AdListing>> {
        debug!("{:<12} --> 광고 목록 쿼리: {:?} {:?}", "Store", filter, ordering);

        let mut builder = QueryBuilder::<Postgres>::new(queries::SELECT_AD_LISTINGS);
        let mut first = true;
        if let Some(seller_id) = filter.seller_id {
            push_condition(&mut builder, &mut first, "agro_ads.user_id = ");
            builder.push_bind(seller_id);
        }
        if let Some(category) = filter.category {
            push_condition(&mut builder, &mut first, "agro_ads.category = ");
            builder.push_bind(category);
        }
        if let Some(min_price) = filter.min_price {
            push_condition(&mut builder, &mut first, "agro_ads.ad_price >= ");
            builder.push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            push_condition(&mut builder, &mut first, "agro_ads.ad_price <= ");
            builder.push_bind(max_price);
        }
        builder.push(" ");
        builder.push(ordering.order_by_clause());

        let listings = builder
            .build_query_as::<AdListing>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(listings)
    }

    async fn place_bid(&self, ad_id: i64, bidder_id: i64, bid_price: i64) -> AppResult<Bid> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let ad = sqlx::query_scalar::<_, i64>(queries::AD_EXISTS)
                        .bind(ad_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if ad.is_none() {
                        return Err(AppError::NotFound("Ad not found".to_string()));
                    }

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(ad_id)
                        .bind(bidder_id)
                        .bind(bid_price)
                        .fetch_one(&mut **tx)
                        .await?;

                    let updated = sqlx::query(queries::INCREMENT_TOTAL_BID)
                        .bind(bidder_id)
                        .execute(&mut **tx)
                        .await?;
                    if updated.rows_affected() == 0 {
                        return Err(AppError::NotFound("User not found".to_string()));
                    }

                    Ok(bid)
                })
            })
            .await
    }

    async fn get_bid(&self, bid_id: i64) -> AppResult<Option<Bid>> {
        let bid = sqlx::query_as::<_, Bid>(queries::GET_BID)
            .bind(bid_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bid)
    }

    async fn find_bid_view(&self, bid_id: i64) -> AppResult<Option<BidView>> {
        let sql = format!("{} WHERE bids.id = $1", queries::SELECT_BID_VIEWS);
        let view = sqlx::query_as::<_, BidView>(&sql)
            .bind(bid_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(view)
    }

    async fn list_bid_views(
        &self,
        filter: BidFilter,
        ordering: BidOrdering,
    ) -> AppResult<Vec<BidView>> {
        let (condition, param) = match filter {
            BidFilter::All => ("", None),
            BidFilter::ByUser(user_id) => ("WHERE bids.user_id = $1", Some(user_id)),
            BidFilter::ByAd(ad_id) => ("WHERE bids.ad_id = $1", Some(ad_id)),
        };
        let sql = format!(
            "{} {} {}",
            queries::SELECT_BID_VIEWS,
            condition,
            ordering.order_by_clause()
        );
        debug!("{:<12} --> 입찰 목록 쿼리: {:?} {:?}", "Store", filter, ordering);

        let mut query = sqlx::query_as::<_, BidView>(&sql);
        if let Some(param) = param {
            query = query.bind(param);
        }
        let views = query.fetch_all(self.db.pool()).await?;
        Ok(views)
    }

    async fn find_winner(&self, ad_id: i64) -> AppResult<Option<BidView>> {
        let sql = format!(
            "{} WHERE bids.ad_id = $1 AND bids.winner",
            queries::SELECT_BID_VIEWS
        );
        let view = sqlx::query_as::<_, BidView>(&sql)
            .bind(ad_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(view)
    }

    async fn select_winner(&self, ad_id: i64, bid_id: i64) -> AppResult<Bid> {
        let set_lock_timeout = format!("SET LOCAL lock_timeout = {}", self.lock_timeout_ms());
        let bid = self
            .db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(&set_lock_timeout).execute(&mut **tx).await?;

                    // 같은 광고의 낙찰 트랜잭션은 이 행 잠금에서 직렬화된다
                    let locked = sqlx::query_scalar::<_, i64>(queries::LOCK_AD)
                        .bind(ad_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if locked.is_none() {
                        return Err(AppError::NotFound("Ad not found".to_string()));
                    }

                    sqlx::query(queries::CLEAR_WINNERS)
                        .bind(ad_id)
                        .execute(&mut **tx)
                        .await?;

                    sqlx::query_as::<_, Bid>(queries::SET_WINNER)
                        .bind(bid_id)
                        .bind(ad_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
                })
            })
            .await?;

        info!(
            "{:<12} --> 낙찰 커밋 ad_id: {}, bid_id: {}",
            "Store", ad_id, bid_id
        );
        Ok(bid)
    }

    async fn update_bid_price(&self, bid_id: i64, bid_price: i64) -> AppResult<Option<Bid>> {
        let bid = sqlx::query_as::<_, Bid>(queries::UPDATE_BID_PRICE)
            .bind(bid_id)
            .bind(bid_price)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bid)
    }

    async fn delete_bid(&self, bid_id: i64) -> AppResult<Option<Bid>> {
        let bid = sqlx::query_as::<_, Bid>(queries::DELETE_BID)
            .bind(bid_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bid)
    }
}

// endregion: --- Postgres Data Store
