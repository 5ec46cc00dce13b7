use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Access-token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id, hex
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: ObjectId, email: String, expiration_hours: i64) -> Self {
        let now = Utc::now();
        Claims {
            sub: user_id.to_hex(),
            email,
            exp: (now + Duration::hours(expiration_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Refresh-token payload; deliberately carries nothing but the subject.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl RefreshClaims {
    pub fn new(user_id: ObjectId, expiration_days: i64) -> Self {
        let now = Utc::now();
        RefreshClaims {
            sub: user_id.to_hex(),
            exp: (now + Duration::days(expiration_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn create_token<T: Serialize>(claims: &T, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_token<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, anyhow::Error> {
    let validation = Validation::default();
    let token_data = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let user_id = ObjectId::new();
        let claims = Claims::new(user_id, "a@x.com".to_string(), 1);
        let token = create_token(&claims, "secret").unwrap();
        let decoded: Claims = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, user_id.to_hex());
        assert_eq!(decoded.email, "a@x.com");
    }

    #[test]
    fn refresh_token_rejects_wrong_secret() {
        let claims = RefreshClaims::new(ObjectId::new(), 10);
        let token = create_token(&claims, "refresh-secret").unwrap();
        assert!(verify_token::<RefreshClaims>(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        let mut claims = Claims::new(ObjectId::new(), "a@x.com".to_string(), 1);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = create_token(&claims, "secret").unwrap();
        assert!(verify_token::<Claims>(&token, "secret").is_err());
    }
}
