// region:    --- Imports
use super::{AuthProvider, Identity, IdentityToken};
use crate::bidding::model::{Ad, Role};
use crate::error::{AppError, AppResult};
use crate::store::DataStore;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Authorization Gate
/// 역할 및 광고 소유권 검사
pub struct AuthorizationGate {
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
}

impl AuthorizationGate {
    pub fn new(provider: Arc<dyn AuthProvider>, store: Arc<dyn DataStore>) -> Self {
        Self { provider, store }
    }

    /// 토큰 검증만 수행
    pub fn authenticate(&self, token: Option<&IdentityToken>) -> AppResult<Identity> {
        let token =
            token.ok_or_else(|| AppError::Unauthenticated("Token required".to_string()))?;
        self.provider
            .verify(token.as_str())
            .ok_or_else(|| AppError::Unauthenticated("Invalid token".to_string()))
    }

    /// 역할 검사
    pub fn require_role(&self, token: Option<&IdentityToken>, role: Role) -> AppResult<Identity> {
        let identity = self.authenticate(token)?;
        if identity.role != role {
            warn!(
                "{:<12} --> 역할 불일치 user_id: {}, 필요: {}, 실제: {}",
                "Gate", identity.user_id, role, identity.role
            );
            return Err(AppError::Forbidden(format!(
                "You must be a {} to perform this action",
                role
            )));
        }
        Ok(identity)
    }

    /// 판매자 역할 + 광고 소유권 검사
    pub async fn require_seller_ownership(
        &self,
        token: Option<&IdentityToken>,
        ad_id: i64,
    ) -> AppResult<(Identity, Ad)> {
        let identity = self.require_role(token, Role::Seller)?;
        let ad = self
            .store
            .get_ad(ad_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;

        if ad.user_id != identity.user_id {
            info!(
                "{:<12} --> 광고 소유자 아님 user_id: {}, ad_id: {}",
                "Gate", identity.user_id, ad_id
            );
            return Err(AppError::Forbidden(
                "You are not authorized to modify this ad".to_string(),
            ));
        }
        Ok((identity, ad))
    }
}

// endregion: --- Authorization Gate
