//! 요청 추출기
//!
//! axum 기본 추출기의 거부 응답(422, 텍스트 본문)을 `AppError::InvalidArgument`
//! 로 바꿔 `{ "error": .. }` 형식의 400 응답으로 통일한다.

// region:    --- Imports
use crate::error::AppError;
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

// endregion: --- Imports

// region:    --- Rejection 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("{:<12} --> 요청 본문 거부: {}", "Extract", rejection.body_text());
        AppError::InvalidArgument("Invalid request body".to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!("{:<12} --> 경로 파라미터 거부: {}", "Extract", rejection.body_text());
        AppError::InvalidArgument("Invalid path parameter".to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("{:<12} --> 쿼리 파라미터 거부: {}", "Extract", rejection.body_text());
        AppError::InvalidArgument("Invalid query parameter".to_string())
    }
}

// endregion: --- Rejection 변환

// region:    --- Extractors
/// JSON 본문
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// 경로 파라미터
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// 쿼리 문자열
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

// endregion: --- Extractors
