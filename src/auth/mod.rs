//! 호출자 신원 확인
//!
//! 토큰 검증은 [`AuthProvider`] 뒤에 숨겨져 있고, 역할/소유권 판단은
//! [`gate::AuthorizationGate`] 한 곳에서만 이루어진다.

// region:    --- Imports
use crate::bidding::model::Role;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

// endregion: --- Imports

pub mod gate;

// region:    --- Identity
/// 검증된 호출자 신원
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// 요청에 실려 온 검증 전 자격 증명
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Authorization 헤더에서 토큰 추출 ("Bearer " 접두사는 선택)
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();
        let raw = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value)
            .trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }
}

// 토큰 원문이 로그에 남지 않도록 한다
impl std::fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IdentityToken(***)")
    }
}

// endregion: --- Identity

// region:    --- Auth Provider
/// 외부 토큰 검증 기능. 검증 실패는 에러가 아닌 `None`
pub trait AuthProvider: Send + Sync {
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// 토큰 클레임 (id, number, user_type)
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: i64,
    #[serde(default)]
    number: Option<String>,
    user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<u64>,
}

/// HS256 JWT 기반 AuthProvider
pub struct JwtAuthProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 기존 발급 토큰에는 exp가 없다. 있으면 검사한다
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 토큰 발급 (로그인 서비스와 테스트에서 사용)
    pub fn issue(
        &self,
        identity: Identity,
        number: Option<&str>,
        expires_at: Option<u64>,
    ) -> Result<IdentityToken, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: identity.user_id,
            number: number.map(str::to_string),
            user_type: identity.role.as_str().to_string(),
            exp: expires_at,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IdentityToken(token))
    }
}

impl AuthProvider for JwtAuthProvider {
    fn verify(&self, token: &str) -> Option<Identity> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                debug!("{:<12} --> 토큰 검증 실패: {}", "Auth", e);
                return None;
            }
        };
        let role = data.claims.user_type.parse::<Role>().ok()?;
        Some(Identity {
            user_id: data.claims.id,
            role,
        })
    }
}

// endregion: --- Auth Provider

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn seller(id: i64) -> Identity {
        Identity {
            user_id: id,
            role: Role::Seller,
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let provider = JwtAuthProvider::new("test-secret");
        let token = provider.issue(seller(7), Some("01012345678"), None).unwrap();
        assert_eq!(provider.verify(token.as_str()), Some(seller(7)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtAuthProvider::new("one");
        let verifier = JwtAuthProvider::new("two");
        let token = issuer.issue(seller(7), None, None).unwrap();
        assert_eq!(verifier.verify(token.as_str()), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let provider = JwtAuthProvider::new("test-secret");
        let token = provider.issue(seller(7), None, Some(1)).unwrap();
        assert_eq!(provider.verify(token.as_str()), None);
    }

    #[test]
    fn garbage_is_rejected_without_panicking() {
        let provider = JwtAuthProvider::new("test-secret");
        assert_eq!(provider.verify("not-a-jwt"), None);
        assert_eq!(provider.verify(""), None);
    }

    #[test]
    fn header_extraction_accepts_raw_and_bearer() {
        let mut headers = HeaderMap::new();
        assert!(IdentityToken::from_headers(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(
            IdentityToken::from_headers(&headers),
            Some(IdentityToken::new("abc.def.ghi"))
        );

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            IdentityToken::from_headers(&headers),
            Some(IdentityToken::new("abc.def.ghi"))
        );

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(IdentityToken::from_headers(&headers).is_none());
    }
}
