use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::middleware::auth::Claims;

/// Issues the HS256 bearer token handed back after OTP verification.
pub fn issue_token(student_id: &str, access_level: &str) -> Result<String> {
    let config = crate::config::get_config();
    let expiry = Utc::now() + Duration::hours(config.jwt_expiry_hours);
    let claims = Claims {
        sub: student_id.to_string(),
        exp: expiry.timestamp() as usize,
        role: Some(access_level.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

pub fn generate_access_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_tokens_have_requested_length() {
        assert_eq!(generate_access_token(32).len(), 32);
        assert_eq!(generate_access_token(6).len(), 6);
    }

    #[test]
    fn access_tokens_are_alphanumeric() {
        let token = generate_access_token(64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
