use std::fmt;
use std::str::FromStr;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;
use crate::utils::error::AppError;

/// Role hierarchy. Variant order is the permission order, so the derived
/// `Ord` gives `Basic < Staff < Admin` directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Basic,
    Staff,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Basic => "basic",
            Role::Staff => "staff",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Role::Basic),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The authenticated caller as asserted by the upstream gateway. Token
/// verification happens there; this service only consumes the result.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";
const USER_EMAIL_HEADER: &str = "x-user-email";

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Result<String, AppError> {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::AuthError("Missing caller identity".to_string()))
        };

        let id = header(USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::AuthError("Malformed caller identity".to_string()))?;

        Ok(Identity {
            id,
            name: header(USER_NAME_HEADER)?,
            email: header(USER_EMAIL_HEADER)?,
        })
    }
}

/// Role lookup against the users table.
#[derive(Clone)]
pub struct RoleStore {
    pool: PgPool,
}

impl RoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn has_permission(&self, user_id: Uuid, required: Role) -> Result<bool, AppError> {
        Ok(self
            .get_role(user_id)
            .await?
            .map(|role| role >= required)
            .unwrap_or(false))
    }

    /// Resolves the caller's role, failing 401 for an unknown user and 403
    /// for an insufficient one.
    pub async fn require_role(&self, identity: &Identity, required: Role) -> Result<Role, AppError> {
        let role = self
            .get_role(identity.id)
            .await?
            .ok_or_else(|| AppError::AuthError("Unknown caller identity".to_string()))?;

        if role >= required {
            Ok(role)
        } else {
            Err(AppError::Forbidden(format!(
                "Requires {} role or above",
                required
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_matches_hierarchy() {
        assert!(Role::Admin > Role::Staff);
        assert!(Role::Staff > Role::Basic);
        assert!(Role::Admin > Role::Basic);
        assert!(Role::Basic >= Role::Basic);
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Basic, Role::Staff, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }
}
