/// 사용자 조회
pub const GET_USER: &str = "SELECT id, number, username, password, user_type, profile_pic, total_bid, created_at FROM agro_users WHERE id = $1";

/// 사용자 생성
pub const INSERT_USER: &str = r#"
    INSERT INTO agro_users (number, username, password, user_type, profile_pic)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, number, username, password, user_type, profile_pic, total_bid, created_at
"#;

/// 입찰 수 증가
pub const INCREMENT_TOTAL_BID: &str =
    "UPDATE agro_users SET total_bid = total_bid + 1 WHERE id = $1";

/// 광고 조회
pub const GET_AD: &str = r#"
    SELECT id, user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery, category,
           image1_url, image2_url, image3_url, created_at
    FROM agro_ads
    WHERE id = $1
"#;

/// 판매자 광고 목록
pub const LIST_ADS_FOR_USER: &str = r#"
    SELECT id, user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery, category,
           image1_url, image2_url, image3_url, created_at
    FROM agro_ads
    WHERE user_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// 광고 생성
pub const INSERT_AD: &str = r#"
    INSERT INTO agro_ads (user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery,
                          category, image1_url, image2_url, image3_url)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery, category,
              image1_url, image2_url, image3_url, created_at
"#;

/// 광고 수정 (user_id는 수정 대상이 아님)
pub const UPDATE_AD: &str = r#"
    UPDATE agro_ads SET
        ad_title = COALESCE($2, ad_title),
        ad_price = COALESCE($3, ad_price),
        ad_weight = COALESCE($4, ad_weight),
        ad_location = COALESCE($5, ad_location),
        ad_delivery = COALESCE($6, ad_delivery),
        category = COALESCE($7, category),
        image1_url = COALESCE($8, image1_url),
        image2_url = COALESCE($9, image2_url),
        image3_url = COALESCE($10, image3_url)
    WHERE id = $1
    RETURNING id, user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery, category,
              image1_url, image2_url, image3_url, created_at
"#;

/// 광고 삭제 (입찰은 FK cascade로 삭제)
pub const DELETE_AD: &str = r#"
    DELETE FROM agro_ads
    WHERE id = $1
    RETURNING id, user_id, ad_title, ad_price, ad_weight, ad_location, ad_delivery, category,
              image1_url, image2_url, image3_url, created_at
"#;

/// 판매자 정보와 낙찰 여부를 결합한 광고 목록 (WHERE / ORDER BY는 호출부에서 덧붙임)
pub const SELECT_AD_LISTINGS: &str = r#"
    SELECT agro_ads.id, agro_ads.user_id, agro_ads.ad_title, agro_ads.ad_price,
           agro_ads.ad_weight, agro_ads.ad_location, agro_ads.ad_delivery, agro_ads.category,
           agro_ads.image1_url, agro_ads.image2_url, agro_ads.image3_url, agro_ads.created_at,
           agro_users.username AS seller_name,
           agro_users.user_type AS seller_user_type,
           EXISTS (SELECT 1 FROM bids WHERE bids.ad_id = agro_ads.id AND bids.winner) AS has_winner
    FROM agro_ads
    JOIN agro_users ON agro_ads.user_id = agro_users.id
"#;

/// 광고 존재 확인
pub const AD_EXISTS: &str = "SELECT id FROM agro_ads WHERE id = $1";

/// 낙찰 트랜잭션용 광고 행 잠금. 입찰 INSERT의 FK 검사(FOR KEY SHARE)와는 충돌하지 않는다
pub const LOCK_AD: &str = "SELECT id FROM agro_ads WHERE id = $1 FOR NO KEY UPDATE";

/// 입찰 생성
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (ad_id, user_id, bid_price)
    VALUES ($1, $2, $3)
    RETURNING id, ad_id, user_id, bid_price, created_at, winner
"#;

/// 입찰 조회
pub const GET_BID: &str =
    "SELECT id, ad_id, user_id, bid_price, created_at, winner FROM bids WHERE id = $1";

/// 광고 이미지와 입찰자 정보 결합 조회 (WHERE / ORDER BY는 호출부에서 덧붙임)
pub const SELECT_BID_VIEWS: &str = r#"
    SELECT bids.id, bids.ad_id, bids.user_id, bids.bid_price, bids.created_at, bids.winner,
           agro_ads.image1_url, agro_users.profile_pic, agro_users.username
    FROM bids
    JOIN agro_ads ON bids.ad_id = agro_ads.id
    JOIN agro_users ON bids.user_id = agro_users.id
"#;

/// 광고의 기존 낙찰 해제
pub const CLEAR_WINNERS: &str = "UPDATE bids SET winner = FALSE WHERE ad_id = $1 AND winner";

/// 대상 입찰 낙찰 처리
pub const SET_WINNER: &str = r#"
    UPDATE bids SET winner = TRUE
    WHERE id = $1 AND ad_id = $2
    RETURNING id, ad_id, user_id, bid_price, created_at, winner
"#;

/// 입찰 가격 수정
pub const UPDATE_BID_PRICE: &str = r#"
    UPDATE bids SET bid_price = $2
    WHERE id = $1
    RETURNING id, ad_id, user_id, bid_price, created_at, winner
"#;

/// 입찰 삭제
pub const DELETE_BID: &str = r#"
    DELETE FROM bids
    WHERE id = $1
    RETURNING id, ad_id, user_id, bid_price, created_at, winner
"#;
