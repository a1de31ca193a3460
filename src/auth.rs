use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::models::auth::User;
use crate::utils::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub username: String,
    pub email: String,
    pub role: String,
    pub iat: usize, // Issued at (Unix timestamp)
}

/// Issues and validates the bearer tokens used by every protected route.
/// Constructed once in main and shared through `web::Data`.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        // Tokens are issued without an `exp` claim, so validation must not
        // demand one.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        AuthService {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, ServiceError> {
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: Utc::now().timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| ServiceError::Unauthorized("Invalid token".to_string()))?;

        let claims = data.claims;
        if self.is_revoked(&claims) {
            return Err(ServiceError::Unauthorized(
                "Token has been revoked".to_string(),
            ));
        }

        Ok(claims)
    }

    // No token blocklist is kept; the deployment is stateless.
    fn is_revoked(&self, _claims: &Claims) -> bool {
        false
    }

    /// Extract and validate the bearer token from the Authorization header.
    pub fn authenticate(&self, req: &HttpRequest) -> Result<Claims, ServiceError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;

        self.verify_token(token)
    }

    /// Resolve the token's subject to a user record. Role checks always go
    /// through the database row, not the token copy of the role.
    pub async fn current_user(
        &self,
        req: &HttpRequest,
        db: &Database,
    ) -> Result<User, ServiceError> {
        let claims = self.authenticate(req)?;

        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::Unauthorized("Invalid user ID in token".to_string()))?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, created_at, last_login, is_active
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error resolving current user: {}", e);
            ServiceError::DatabaseError("Failed to query user".to_string())
        })?;

        user.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use crate::models::auth::ROLE_TEAM_MEMBER;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            role: ROLE_TEAM_MEMBER.to_string(),
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let auth = AuthService::new("test-secret");
        let user = sample_user();

        let token = auth.create_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, ROLE_TEAM_MEMBER);
    }

    #[test]
    fn token_without_expiry_still_validates() {
        // Tokens are configured to never expire; decoding must not reject
        // the missing exp claim.
        let auth = AuthService::new("test-secret");
        let token = auth.create_token(&sample_user()).unwrap();

        assert!(auth.verify_token(&token).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = AuthService::new("secret-a");
        let verifier = AuthService::new("secret-b");

        let token = issuer.create_token(&sample_user()).unwrap();
        let err = verifier.verify_token(&token).unwrap_err();

        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn authenticate_requires_bearer_header() {
        let auth = AuthService::new("test-secret");

        let no_header = TestRequest::default().to_http_request();
        assert!(matches!(
            auth.authenticate(&no_header),
            Err(ServiceError::Unauthorized(_))
        ));

        let wrong_scheme = TestRequest::default()
            .insert_header(("Authorization", "Basic abc123"))
            .to_http_request();
        assert!(matches!(
            auth.authenticate(&wrong_scheme),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn authenticate_accepts_valid_bearer_token() {
        let auth = AuthService::new("test-secret");
        let token = auth.create_token(&sample_user()).unwrap();

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        let claims = auth.authenticate(&req).unwrap();
        assert_eq!(claims.sub, "7");
    }
}
