use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 기존 데이터는 "Seller" 처럼 대문자로 저장된 행이 있다
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

// 사용자 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub number: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub user_type: String,
    pub profile_pic: Option<String>,
    pub total_bid: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        self.user_type.parse().ok()
    }
}

/// 사용자 생성 입력 (비밀번호는 외부에서 해시된 값)
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub number: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_pic: Option<String>,
}

// 광고 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ad {
    pub id: i64,
    pub user_id: i64,
    pub ad_title: String,
    pub ad_price: i64,
    pub ad_weight: Option<String>,
    pub ad_location: Option<String>,
    pub ad_delivery: Option<String>,
    pub category: Option<String>,
    pub image1_url: Option<String>,
    pub image2_url: Option<String>,
    pub image3_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub ad_id: i64,
    pub user_id: i64,
    pub bid_price: i64,
    pub created_at: DateTime<Utc>,
    pub winner: bool,
}

/// 광고 대표 이미지와 입찰자 정보가 결합된 입찰 조회 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BidView {
    pub id: i64,
    pub ad_id: i64,
    pub user_id: i64,
    pub bid_price: i64,
    pub created_at: DateTime<Utc>,
    pub winner: bool,
    pub image1_url: Option<String>,
    pub profile_pic: Option<String>,
    pub username: String,
}

impl BidView {
    pub fn new(bid: Bid, ad: &Ad, bidder: &User) -> Self {
        Self {
            id: bid.id,
            ad_id: bid.ad_id,
            user_id: bid.user_id,
            bid_price: bid.bid_price,
            created_at: bid.created_at,
            winner: bid.winner,
            image1_url: ad.image1_url.clone(),
            profile_pic: bidder.profile_pic.clone(),
            username: bidder.username.clone(),
        }
    }
}
