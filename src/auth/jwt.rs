use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, expiration_hours: i64) -> Self {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            email,
            exp: (now + Duration::hours(expiration_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, anyhow::Error> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, anyhow::Error> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_claims() {
        let claims = Claims::new(42, "cook@example.com".to_string(), 24);
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "42");
        assert_eq!(decoded.email, "cook@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(42, "cook@example.com".to_string(), 24);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative expiry puts `exp` well past the default leeway.
        let claims = Claims::new(42, "cook@example.com".to_string(), -2);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }
}
