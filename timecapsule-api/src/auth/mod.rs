mod extractor;

pub use extractor::AuthUser;

use serde::{Deserialize, Serialize};

/// Claims carried by the bearer tokens the identity provider issues.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id (database SERIAL).
    pub sub: i32,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

    #[test]
    fn claims_roundtrip_through_a_signed_token() {
        let claims = Claims {
            sub: 42,
            exp: (time::OffsetDateTime::now_utc() + time::Duration::hours(1)).unix_timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, 42);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let claims = Claims {
            sub: 42,
            exp: (time::OffsetDateTime::now_utc() + time::Duration::hours(1)).unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"wrong-secret"),
        )
        .unwrap();

        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .is_err());
    }
}
