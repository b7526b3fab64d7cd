//! 메모리 저장소
//!
//! Postgres 없이 서비스 전체를 구동하기 위한 구현체. 낙찰 선택은 광고별
//! 락으로 직렬화되고, 기존 낙찰 해제와 새 낙찰 설정은 하나의 쓰기 잠금
//! 구간 안에서 처리된다.

// region:    --- Imports
use super::{AdFilter, BidFilter, DataStore};
use crate::ads::model::{AdChanges, AdListing, NewAd};
use crate::bidding::model::{Ad, Bid, BidView, NewUser, User};
use crate::error::{AppError, AppResult};
use crate::query::sort::{AdOrdering, BidOrdering};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

// endregion: --- Imports

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    ads: BTreeMap<i64, Ad>,
    bids: BTreeMap<i64, Bid>,
    next_user_id: i64,
    next_ad_id: i64,
    next_bid_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn view(&self, bid: &Bid) -> Option<BidView> {
        let ad = self.ads.get(&bid.ad_id)?;
        let bidder = self.users.get(&bid.user_id)?;
        Some(BidView::new(bid.clone(), ad, bidder))
    }

    fn listing(&self, ad: &Ad) -> Option<AdListing> {
        let seller = self.users.get(&ad.user_id)?;
        Some(AdListing {
            ad: ad.clone(),
            seller_name: seller.username.clone(),
            seller_user_type: seller.user_type.clone(),
            has_winner: self.bids.values().any(|bid| bid.ad_id == ad.id && bid.winner),
        })
    }
}

// region:    --- Memory Data Store
pub struct MemoryDataStore {
    tables: RwLock<Tables>,
    ad_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            ad_locks: Mutex::new(HashMap::new()),
            lock_timeout,
        }
    }

    async fn ad_lock(&self, ad_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.ad_locks.lock().await;
        Arc::clone(locks.entry(ad_id).or_default())
    }

    /// 광고별 락 획득. 대기 시간 초과는 Conflict
    async fn lock_ad(&self, ad_id: i64) -> AppResult<OwnedMutexGuard<()>> {
        let lock = self.ad_lock(ad_id).await;
        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                AppError::Conflict("Concurrent winner selection, please retry".to_string())
            })
    }

    /// 대기자도 보유자도 없는 광고 락 제거
    async fn prune_ad_lock(&self, ad_id: i64) {
        let mut locks = self.ad_locks.lock().await;
        if locks
            .get(&ad_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&ad_id);
        }
    }

    async fn write_winner(&self, ad_id: i64, bid_id: i64) -> AppResult<Bid> {
        let mut tables = self.tables.write().await;

        if !tables.ads.contains_key(&ad_id) {
            return Err(AppError::NotFound("Ad not found".to_string()));
        }
        if tables.bids.get(&bid_id).map(|bid| bid.ad_id) != Some(ad_id) {
            return Err(AppError::NotFound("Bid not found".to_string()));
        }

        for bid in tables.bids.values_mut().filter(|bid| bid.ad_id == ad_id) {
            bid.winner = bid.id == bid_id;
        }
        tables
            .bids
            .get(&bid_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .users
            .values()
            .any(|u| u.number == user.number || u.username == user.username);
        if duplicate {
            return Err(AppError::InvalidArgument(
                "User with that number or username already exists".to_string(),
            ));
        }
        let id = Tables::next_id(&mut tables.next_user_id);
        let created = User {
            id,
            number: user.number,
            username: user.username,
            password: user.password_hash,
            user_type: user.role.as_str().to_string(),
            profile_pic: user.profile_pic,
            total_bid: 0,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn insert_ad(&self, seller_id: i64, ad: NewAd) -> AppResult<Ad> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&seller_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        let id = Tables::next_id(&mut tables.next_ad_id);
        let created = Ad {
            id,
            user_id: seller_id,
            image1_url: ad.image_slot(0),
            image2_url: ad.image_slot(1),
            image3_url: ad.image_slot(2),
            ad_title: ad.ad_title,
            ad_price: ad.ad_price,
            ad_weight: ad.ad_weight,
            ad_location: ad.ad_location,
            ad_delivery: ad.ad_delivery,
            category: ad.category,
            created_at: Utc::now(),
        };
        tables.ads.insert(id, created.clone());
        Ok(created)
    }

    async fn get_ad(&self, ad_id: i64) -> AppResult<Option<Ad>> {
        Ok(self.tables.read().await.ads.get(&ad_id).cloned())
    }

    async fn update_ad(&self, ad_id: i64, changes: AdChanges) -> AppResult<Option<Ad>> {
        let mut tables = self.tables.write().await;
        Ok(tables.ads.get_mut(&ad_id).map(|ad| {
            changes.apply(ad);
            ad.clone()
        }))
    }

    async fn list_ads_for_user(&self, user_id: i64) -> AppResult<Vec<Ad>> {
        let tables = self.tables.read().await;
        // 최신 등록 순
        Ok(tables
            .ads
            .values()
            .rev()
            .filter(|ad| ad.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_ad(&self, ad_id: i64) -> AppResult<Option<Ad>> {
        let removed = {
            let mut tables = self.tables.write().await;
            let removed = tables.ads.remove(&ad_id);
            if removed.is_some() {
                tables.bids.retain(|_, bid| bid.ad_id != ad_id);
            }
            removed
        };
        self.prune_ad_lock(ad_id).await;
        Ok(removed)
    }

    async fn list_ad_listings(
        &self,
        filter: AdFilter,
        ordering: AdOrdering,
    ) -> AppResult<Vec<AdListing>> {
        let tables = self.tables.read().await;
        let mut listings: Vec<AdListing> = tables
            .ads
            .values()
            .filter(|ad| filter.matches(ad))
            .filter_map(|ad| tables.listing(ad))
            .collect();
        listings.sort_by(|a, b| ordering.compare(a, b));
        Ok(listings)
    }

    async fn place_bid(&self, ad_id: i64, bidder_id: i64, bid_price: i64) -> AppResult<Bid> {
        let mut tables = self.tables.write().await;
        if !tables.ads.contains_key(&ad_id) {
            return Err(AppError::NotFound("Ad not found".to_string()));
        }
        if !tables.users.contains_key(&bidder_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let id = Tables::next_id(&mut tables.next_bid_id);
        let bid = Bid {
            id,
            ad_id,
            user_id: bidder_id,
            bid_price,
            created_at: Utc::now(),
            winner: false,
        };
        tables.bids.insert(id, bid.clone());
        if let Some(bidder) = tables.users.get_mut(&bidder_id) {
            bidder.total_bid += 1;
        }
        Ok(bid)
    }

    async fn get_bid(&self, bid_id: i64) -> AppResult<Option<Bid>> {
        Ok(self.tables.read().await.bids.get(&bid_id).cloned())
    }

    async fn find_bid_view(&self, bid_id: i64) -> AppResult<Option<BidView>> {
        let tables = self.tables.read().await;
        Ok(tables.bids.get(&bid_id).and_then(|bid| tables.view(bid)))
    }

    async fn list_bid_views(
        &self,
        filter: BidFilter,
        ordering: BidOrdering,
    ) -> AppResult<Vec<BidView>> {
        let tables = self.tables.read().await;
        let mut views: Vec<BidView> = tables
            .bids
            .values()
            .filter(|bid| filter.matches(bid))
            .filter_map(|bid| tables.view(bid))
            .collect();
        views.sort_by(|a, b| ordering.compare(a, b));
        Ok(views)
    }

    async fn find_winner(&self, ad_id: i64) -> AppResult<Option<BidView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bids
            .values()
            .find(|bid| bid.ad_id == ad_id && bid.winner)
            .and_then(|bid| tables.view(bid)))
    }

    async fn select_winner(&self, ad_id: i64, bid_id: i64) -> AppResult<Bid> {
        let result = {
            let _ad_guard = self.lock_ad(ad_id).await?;
            self.write_winner(ad_id, bid_id).await
        };
        self.prune_ad_lock(ad_id).await;
        result
    }

    async fn update_bid_price(&self, bid_id: i64, bid_price: i64) -> AppResult<Option<Bid>> {
        let mut tables = self.tables.write().await;
        Ok(tables.bids.get_mut(&bid_id).map(|bid| {
            bid.bid_price = bid_price;
            bid.clone()
        }))
    }

    async fn delete_bid(&self, bid_id: i64) -> AppResult<Option<Bid>> {
        Ok(self.tables.write().await.bids.remove(&bid_id))
    }
}

// endregion: --- Memory Data Store

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::model::Role;

    async fn seed(store: &MemoryDataStore) -> (User, User, Ad) {
        let seller = store
            .insert_user(NewUser {
                number: "010-0000-0001".into(),
                username: "seller".into(),
                password_hash: "hash".into(),
                role: Role::Seller,
                profile_pic: None,
            })
            .await
            .unwrap();
        let buyer = store
            .insert_user(NewUser {
                number: "010-0000-0002".into(),
                username: "buyer".into(),
                password_hash: "hash".into(),
                role: Role::Buyer,
                profile_pic: Some("https://cdn.example/buyer.png".into()),
            })
            .await
            .unwrap();
        let ad = store
            .insert_ad(
                seller.id,
                NewAd {
                    ad_title: "Rice 20kg".into(),
                    ad_price: 40,
                    ad_weight: Some("20kg".into()),
                    ad_location: None,
                    ad_delivery: None,
                    category: Some("grain".into()),
                    image_urls: vec!["https://cdn.example/rice.png".into()],
                },
            )
            .await
            .unwrap();
        (seller, buyer, ad)
    }

    #[tokio::test]
    async fn place_bid_increments_counter_in_same_step() {
        let store = MemoryDataStore::new();
        let (_, buyer, ad) = seed(&store).await;

        let bid = store.place_bid(ad.id, buyer.id, 50).await.unwrap();
        assert!(!bid.winner);
        assert_eq!(store.get_user(buyer.id).await.unwrap().unwrap().total_bid, 1);

        let view = store.find_bid_view(bid.id).await.unwrap().unwrap();
        assert_eq!(view.username, "buyer");
        assert_eq!(view.image1_url.as_deref(), Some("https://cdn.example/rice.png"));
    }

    #[tokio::test]
    async fn place_bid_on_missing_ad_writes_nothing() {
        let store = MemoryDataStore::new();
        let (_, buyer, _) = seed(&store).await;

        let err = store.place_bid(999, buyer.id, 50).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.get_user(buyer.id).await.unwrap().unwrap().total_bid, 0);
    }

    #[tokio::test]
    async fn select_winner_rejects_bid_from_other_ad() {
        let store = MemoryDataStore::new();
        let (seller, buyer, ad) = seed(&store).await;
        let other_ad = store
            .insert_ad(
                seller.id,
                NewAd {
                    ad_title: "Beans".into(),
                    ad_price: 10,
                    ad_weight: None,
                    ad_location: None,
                    ad_delivery: None,
                    category: None,
                    image_urls: vec![],
                },
            )
            .await
            .unwrap();
        let bid = store.place_bid(other_ad.id, buyer.id, 12).await.unwrap();

        let err = store.select_winner(ad.id, bid.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.find_winner(other_ad.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn held_ad_lock_times_out_as_conflict() {
        let store = MemoryDataStore::with_lock_timeout(Duration::from_millis(50));
        let (_, buyer, ad) = seed(&store).await;
        let bid = store.place_bid(ad.id, buyer.id, 50).await.unwrap();

        let lock = store.ad_lock(ad.id).await;
        let _held = lock.lock().await;

        let err = store.select_winner(ad.id, bid.id).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(store.find_winner(ad.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_ads_do_not_contend() {
        let store = MemoryDataStore::with_lock_timeout(Duration::from_millis(50));
        let (seller, buyer, ad) = seed(&store).await;
        let other_ad = store
            .insert_ad(
                seller.id,
                NewAd {
                    ad_title: "Corn".into(),
                    ad_price: 10,
                    ad_weight: None,
                    ad_location: None,
                    ad_delivery: None,
                    category: None,
                    image_urls: vec![],
                },
            )
            .await
            .unwrap();
        let bid = store.place_bid(other_ad.id, buyer.id, 11).await.unwrap();

        let lock = store.ad_lock(ad.id).await;
        let _held = lock.lock().await;

        let winner = store.select_winner(other_ad.id, bid.id).await.unwrap();
        assert!(winner.winner);
    }

    #[tokio::test]
    async fn selection_releases_its_ad_lock_entry() {
        let store = MemoryDataStore::new();
        let (_, buyer, ad) = seed(&store).await;
        let bid = store.place_bid(ad.id, buyer.id, 50).await.unwrap();

        store.select_winner(ad.id, bid.id).await.unwrap();
        assert!(store.ad_locks.lock().await.is_empty());

        // 실패한 선택도 남기지 않는다
        let err = store.select_winner(ad.id, bid.id + 100).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.ad_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delete_ad_removes_its_bids() {
        let store = MemoryDataStore::new();
        let (_, buyer, ad) = seed(&store).await;
        let bid = store.place_bid(ad.id, buyer.id, 50).await.unwrap();
        store.select_winner(ad.id, bid.id).await.unwrap();

        let removed = store.delete_ad(ad.id).await.unwrap().unwrap();
        assert_eq!(removed.id, ad.id);
        assert!(store.get_bid(bid.id).await.unwrap().is_none());
        assert!(store.find_winner(ad.id).await.unwrap().is_none());
        assert!(store.delete_ad(ad.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_committed_selection_wins() {
        let store = Arc::new(MemoryDataStore::new());
        let (_, buyer, ad) = seed(&store).await;
        let first = store.place_bid(ad.id, buyer.id, 50).await.unwrap();
        let second = store.place_bid(ad.id, buyer.id, 60).await.unwrap();
        let (ad_id, first_id, second_id) = (ad.id, first.id, second.id);

        // 락을 잡은 채 두 선택을 순서대로 대기시킨다 (tokio Mutex는 FIFO)
        let lock = store.ad_lock(ad.id).await;
        let held = lock.lock().await;

        let first_task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.select_winner(ad_id, first_id).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second_task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.select_winner(ad_id, second_id).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.find_winner(ad.id).await.unwrap().is_none());

        drop(held);
        first_task.await.unwrap().unwrap();
        second_task.await.unwrap().unwrap();

        let winner = store.find_winner(ad.id).await.unwrap().unwrap();
        assert_eq!(winner.id, second_id);
        assert!(!store.get_bid(first_id).await.unwrap().unwrap().winner);
    }
}
