// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

// endregion: --- Imports

// region:    --- App Error
/// 서비스 전역 에러 분류
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// 트랜잭션 직렬화 실패 / 락 대기 시간 초과 (재시도 가능)
    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 호출자가 백오프 후 재시도해도 되는 에러인지 여부
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// endregion: --- App Error

// region:    --- sqlx 변환
// Postgres SQLSTATE 코드
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// 낙찰 입찰 유일성 인덱스 이름 (sql/01-create-schema.sql)
pub const WINNER_INDEX: &str = "bids_one_winner_per_ad";

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            match db_err.code().as_deref() {
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) | Some(LOCK_NOT_AVAILABLE)
                | Some(QUERY_CANCELED) => {
                    return AppError::Conflict(
                        "Concurrent update in progress, please retry".to_string(),
                    );
                }
                Some(UNIQUE_VIOLATION) if db_err.constraint() == Some(WINNER_INDEX) => {
                    return AppError::Conflict(
                        "Concurrent winner selection, please retry".to_string(),
                    );
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return AppError::NotFound("Referenced ad or user not found".to_string());
                }
                _ => {}
            }
        }
        match e {
            sqlx::Error::PoolTimedOut => {
                AppError::Conflict("Database busy, please retry".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

// endregion: --- sqlx 변환

// region:    --- HTTP 응답 변환
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 내부 에러 상세(쿼리, 드라이버 메시지)는 로그에만 남긴다
        let message = match &self {
            AppError::Internal(detail) => {
                error!("{:<12} --> 내부 오류: {}", "Error", detail);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// endregion: --- HTTP 응답 변환
