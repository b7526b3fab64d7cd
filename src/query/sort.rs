// region:    --- Imports
use crate::ads::model::AdListing;
use crate::bidding::model::BidView;
use crate::error::{AppError, AppResult};
use std::cmp::Ordering;

// endregion: --- Imports

// region:    --- Sort Options
/// 입찰 목록 정렬 기준 (허용된 컬럼만)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    BidPrice,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "bids.created_at",
            SortField::BidPrice => "bids.bid_price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// 입찰 목록 정렬: 1차 기준 + 가격 2차 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BidOrdering {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub price_order: SortOrder,
}

impl BidOrdering {
    /// 쿼리 파라미터 검증. 허용 목록 밖의 값은 기본값으로 대체하지 않고 거부한다
    pub fn parse(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        price_sort_order: Option<&str>,
    ) -> AppResult<Self> {
        let sort_by = match non_empty(sort_by) {
            None => SortField::default(),
            Some("created_at") => SortField::CreatedAt,
            Some("bid_price") => SortField::BidPrice,
            Some(_) => return Err(AppError::InvalidArgument("Invalid sort field".to_string())),
        };
        Ok(Self {
            sort_by,
            sort_order: parse_order(sort_order)?,
            price_order: parse_order(price_sort_order)?,
        })
    }

    /// ORDER BY 절. 열거형 값만으로 조립된다
    pub fn order_by_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, bids.bid_price {}, bids.id ASC",
            self.sort_by.column(),
            self.sort_order.keyword(),
            self.price_order.keyword()
        )
    }

    /// 메모리 정렬용 비교 함수 (order_by_clause와 같은 순서)
    pub fn compare(&self, a: &BidView, b: &BidView) -> Ordering {
        let primary = match self.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::BidPrice => a.bid_price.cmp(&b.bid_price),
        };
        self.sort_order
            .apply(primary)
            .then_with(|| self.price_order.apply(a.bid_price.cmp(&b.bid_price)))
            .then_with(|| a.id.cmp(&b.id))
    }
}

// 빈 값은 미지정과 같다. 그 외 값은 가공 없이 그대로 비교한다
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_order(value: Option<&str>) -> AppResult<SortOrder> {
    parse_order_or(value, SortOrder::default())
}

fn parse_order_or(value: Option<&str>, default: SortOrder) -> AppResult<SortOrder> {
    match non_empty(value) {
        None => Ok(default),
        Some("ASC") => Ok(SortOrder::Asc),
        Some("DESC") => Ok(SortOrder::Desc),
        Some(_) => Err(AppError::InvalidArgument("Invalid sort order".to_string())),
    }
}

// endregion: --- Sort Options

// region:    --- Ad Sort Options
/// 광고 목록 정렬 기준. 미지정이면 최신 등록 순
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdSortField {
    #[default]
    CreatedAt,
    AdPrice,
    AdTitle,
    AdLocation,
    AdWeight,
}

impl AdSortField {
    pub fn column(&self) -> &'static str {
        match self {
            AdSortField::CreatedAt => "agro_ads.created_at",
            AdSortField::AdPrice => "agro_ads.ad_price",
            AdSortField::AdTitle => "agro_ads.ad_title",
            AdSortField::AdLocation => "agro_ads.ad_location",
            AdSortField::AdWeight => "agro_ads.ad_weight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdOrdering {
    pub sort_by: AdSortField,
    pub sort_order: SortOrder,
}

impl AdOrdering {
    /// 허용된 컬럼(ad_price, ad_title, ad_location, ad_weight)만 받는다.
    /// 컬럼을 지정하고 방향을 생략하면 오름차순
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> AppResult<Self> {
        let sort_by = match non_empty(sort_by) {
            None => return Ok(Self::default()),
            Some("ad_price") => AdSortField::AdPrice,
            Some("ad_title") => AdSortField::AdTitle,
            Some("ad_location") => AdSortField::AdLocation,
            Some("ad_weight") => AdSortField::AdWeight,
            Some(_) => return Err(AppError::InvalidArgument("Invalid sort column".to_string())),
        };
        Ok(Self {
            sort_by,
            sort_order: parse_order_or(sort_order, SortOrder::Asc)?,
        })
    }

    pub fn order_by_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, agro_ads.id DESC",
            self.sort_by.column(),
            self.sort_order.keyword()
        )
    }

    /// 메모리 정렬용 비교 함수. NULL은 Postgres처럼 오름차순에서 마지막
    pub fn compare(&self, a: &AdListing, b: &AdListing) -> Ordering {
        let (a, b) = (&a.ad, &b.ad);
        let primary = match self.sort_by {
            AdSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            AdSortField::AdPrice => a.ad_price.cmp(&b.ad_price),
            AdSortField::AdTitle => a.ad_title.cmp(&b.ad_title),
            AdSortField::AdLocation => nulls_last(&a.ad_location, &b.ad_location),
            AdSortField::AdWeight => nulls_last(&a.ad_weight, &b.ad_weight),
        };
        self.sort_order
            .apply(primary)
            .then_with(|| b.id.cmp(&a.id))
    }
}

fn nulls_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// endregion: --- Ad Sort Options
