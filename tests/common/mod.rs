#![allow(dead_code)]

use bidding_service::ads::model::NewAd;
use bidding_service::auth::gate::AuthorizationGate;
use bidding_service::auth::{AuthProvider, Identity, JwtAuthProvider};
use bidding_service::bidding::model::{Ad, Bid, NewUser, Role, User};
use bidding_service::handlers;
use bidding_service::store::DataStore;
use reqwest::{Client, Response};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-secret";

static SEQ: AtomicU64 = AtomicU64::new(0);

/// 트레이싱 초기화 (여러 번 호출되어도 안전)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 임의 포트에 띄운 테스트 서버
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<JwtAuthProvider>,
    pub client: Client,
}

pub async fn spawn_app(store: Arc<dyn DataStore>) -> TestApp {
    init_tracing();

    let auth = Arc::new(JwtAuthProvider::new(TEST_SECRET));
    let provider: Arc<dyn AuthProvider> = auth.clone();
    let gate = Arc::new(AuthorizationGate::new(provider, Arc::clone(&store)));
    let app = handlers::router((Arc::clone(&store), gate));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        store,
        auth,
        client: Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token_for(&self, user: &User) -> String {
        let identity = Identity {
            user_id: user.id,
            role: user.role().expect("test users carry a valid role"),
        };
        self.auth
            .issue(identity, Some(&user.number), None)
            .unwrap()
            .as_str()
            .to_string()
    }

    /// 테스트용 사용자 생성 (실행마다 고유한 이름)
    pub async fn create_user(&self, name: &str, role: Role) -> User {
        let seq = SEQ.fetch_add(1, Ordering::SeqCst);
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.store
            .insert_user(NewUser {
                number: format!("{}-{}-{}", name, nanos, seq),
                username: format!("{}_{}_{}", name, nanos, seq),
                password_hash: "$2a$10$not-a-real-hash".to_string(),
                role,
                profile_pic: Some(format!("https://cdn.example/{}.png", name)),
            })
            .await
            .unwrap()
    }

    /// 테스트용 광고 생성
    pub async fn create_ad(&self, seller: &User, title: &str) -> Ad {
        self.store
            .insert_ad(
                seller.id,
                NewAd {
                    ad_title: title.to_string(),
                    ad_price: 40,
                    ad_weight: Some("20kg".to_string()),
                    ad_location: Some("Jeonju".to_string()),
                    ad_delivery: Some("pickup".to_string()),
                    category: Some("grain".to_string()),
                    image_urls: vec![format!("https://cdn.example/{}.png", title)],
                },
            )
            .await
            .unwrap()
    }

    /// HTTP로 입찰
    pub async fn place_bid(&self, bidder: &User, ad: &Ad, price: i64) -> Bid {
        let response = self
            .client
            .post(self.url("/bids"))
            .json(&json!({ "user_id": bidder.id, "ad_id": ad.id, "price": price }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.unwrap()
    }

    /// HTTP로 낙찰 선택
    pub async fn select_winner(&self, bid_id: i64, token: Option<&str>) -> Response {
        let mut request = self
            .client
            .put(self.url(&format!("/bids/select-winner/{}", bid_id)));
        if let Some(token) = token {
            request = request.header("Authorization", token);
        }
        request.send().await.expect("Failed to send request")
    }

    /// 광고의 낙찰 입찰 수
    pub async fn winner_count(&self, ad_id: i64) -> usize {
        let bids: Vec<serde_json::Value> = self
            .client
            .get(self.url(&format!("/bids/ad/{}", ad_id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bids.iter().filter(|b| b["winner"] == json!(true)).count()
    }
}
