use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::auth::Claims,
    entity::sellers::{Column as SellerCol, Entity as Sellers, Model as SellerModel},
    error::{AppError, AppResult},
    state::AppState,
};

/// An authenticated principal decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn is_owner_or_staff(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_staff
    }
}

pub fn ensure_owner_or_staff(user: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if !user.is_owner_or_staff(owner_id) {
        return Err(AppError::forbidden(
            "You do not have permission to perform this action",
        ));
    }
    Ok(())
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff {
        return Err(AppError::forbidden("Staff only"));
    }
    Ok(())
}

/// Resolves the caller's seller profile, requiring it to be approved.
pub async fn approved_seller(orm: &OrmConn, user: &AuthUser) -> AppResult<SellerModel> {
    let seller = Sellers::find()
        .filter(SellerCol::UserId.eq(user.user_id))
        .filter(SellerCol::IsApproved.eq(true))
        .one(orm)
        .await?;
    seller.ok_or_else(|| AppError::forbidden("Access is denied"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        decode_token(token, &state.config.jwt_secret)
    }
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        is_staff: decoded.claims.is_staff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn buyer(id: Uuid) -> AuthUser {
        AuthUser {
            user_id: id,
            is_staff: false,
        }
    }

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner_or_staff(&buyer(owner), owner).is_ok());

        let err = ensure_owner_or_staff(&buyer(Uuid::new_v4()), owner).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn staff_overrides_ownership() {
        let staff = AuthUser {
            is_staff: true,
            ..buyer(Uuid::new_v4())
        };
        assert!(ensure_owner_or_staff(&staff, Uuid::new_v4()).is_ok());
        assert!(ensure_staff(&staff).is_ok());
        assert!(ensure_staff(&buyer(Uuid::new_v4())).is_err());
    }

    #[test]
    fn decodes_a_token_issued_with_the_same_secret() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            account_type: "SELLER".into(),
            is_staff: false,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let user = decode_token(&token, "secret").unwrap();
        assert_eq!(user.user_id, id);
        assert!(!user.is_staff);

        let err = decode_token(&token, "other").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
