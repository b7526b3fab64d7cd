use crate::bidding::model::Ad;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 광고당 최대 이미지 수
pub const MAX_IMAGES: usize = 3;

// 광고 등록 입력
#[derive(Debug, Clone, Deserialize)]
pub struct NewAd {
    pub ad_title: String,
    pub ad_price: i64,
    pub ad_weight: Option<String>,
    pub ad_location: Option<String>,
    pub ad_delivery: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewAd {
    pub fn validate(&self) -> AppResult<()> {
        if self.ad_title.trim().is_empty() {
            return Err(AppError::InvalidArgument("ad_title is required".to_string()));
        }
        if self.ad_price <= 0 {
            return Err(AppError::InvalidArgument(
                "ad_price must be a positive number".to_string(),
            ));
        }
        if self.image_urls.len() > MAX_IMAGES {
            return Err(AppError::InvalidArgument(format!(
                "at most {} images are allowed",
                MAX_IMAGES
            )));
        }
        Ok(())
    }

    /// image1_url ~ image3_url 슬롯
    pub fn image_slot(&self, index: usize) -> Option<String> {
        self.image_urls.get(index).cloned()
    }
}

// 광고 수정 입력 (None 필드는 유지)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdChanges {
    pub ad_title: Option<String>,
    pub ad_price: Option<i64>,
    pub ad_weight: Option<String>,
    pub ad_location: Option<String>,
    pub ad_delivery: Option<String>,
    pub category: Option<String>,
    pub image1_url: Option<String>,
    pub image2_url: Option<String>,
    pub image3_url: Option<String>,
}

impl AdChanges {
    pub fn validate(&self) -> AppResult<()> {
        if matches!(&self.ad_title, Some(title) if title.trim().is_empty()) {
            return Err(AppError::InvalidArgument("ad_title cannot be empty".to_string()));
        }
        if matches!(self.ad_price, Some(price) if price <= 0) {
            return Err(AppError::InvalidArgument(
                "ad_price must be a positive number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply(self, ad: &mut Ad) {
        if let Some(v) = self.ad_title {
            ad.ad_title = v;
        }
        if let Some(v) = self.ad_price {
            ad.ad_price = v;
        }
        if let Some(v) = self.ad_weight {
            ad.ad_weight = Some(v);
        }
        if let Some(v) = self.ad_location {
            ad.ad_location = Some(v);
        }
        if let Some(v) = self.ad_delivery {
            ad.ad_delivery = Some(v);
        }
        if let Some(v) = self.category {
            ad.category = Some(v);
        }
        if let Some(v) = self.image1_url {
            ad.image1_url = Some(v);
        }
        if let Some(v) = self.image2_url {
            ad.image2_url = Some(v);
        }
        if let Some(v) = self.image3_url {
            ad.image3_url = Some(v);
        }
    }
}

/// 광고 상세 (낙찰 여부 포함)
#[derive(Debug, Clone, Serialize)]
pub struct AdDetail {
    #[serde(flatten)]
    pub ad: Ad,
    pub has_winner: bool,
}

/// 공개 광고 목록 항목 (판매자 정보와 낙찰 여부 포함)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ad: Ad,
    pub seller_name: String,
    pub seller_user_type: String,
    pub has_winner: bool,
}

/// 광고 목록 조회 쿼리 파라미터 (?category&min_price&max_price&sort_by&sort_order)
#[derive(Debug, Default, Deserialize)]
pub struct AdBrowseParams {
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}
