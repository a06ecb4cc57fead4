use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::{Account, SignupResult};
use crate::response::ErrorKind;

/// Longest session token lifetime accepted: one year
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Identity fields carried inside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub profile_id: i64,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email_address: String,
}

impl SessionClaims {
    /// No identity at all: nothing worth signing
    pub fn is_empty(&self) -> bool {
        self.id == 0 && self.email_address.trim().is_empty()
    }
}

impl From<SignupResult> for SessionClaims {
    fn from(r: SignupResult) -> Self {
        Self {
            id: r.id,
            profile_id: r.profile_id,
            first_name: r.first_name,
            last_name: r.last_name,
            email_address: r.email_address,
        }
    }
}

impl From<Account> for SessionClaims {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            profile_id: a.profile_id.unwrap_or_default(),
            first_name: a.first_name,
            last_name: a.last_name,
            email_address: a.email_address,
        }
    }
}

/// Wire format of the token payload
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    session: SessionClaims,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("A token cannot be created because of invalid credentials.")]
    EmptyClaims,

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(#[source] jsonwebtoken::errors::Error),
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyClaims | Self::Signing(_) | Self::ExpiryOutOfRange => ErrorKind::Internal,
            Self::TokenExpired | Self::TokenInvalid(_) => ErrorKind::Credential,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EmptyClaims => "EMPTY_CLAIMS",
            Self::Signing(_) => "TOKEN_SIGNING_FAILED",
            Self::ExpiryOutOfRange => "TOKEN_EXPIRY_OUT_OF_RANGE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid(_) => "TOKEN_INVALID",
        }
    }
}

/// Issues and verifies HS256 session tokens with a fixed lifetime
pub struct CredentialIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl CredentialIssuer {
    /// `ttl_secs` is capped at [`MAX_TOKEN_TTL_SECS`]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(ttl_secs.min(MAX_TOKEN_TTL_SECS)).unwrap_or_default();
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_seconds(ttl_secs).unwrap_or_default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, CredentialError> {
        self.issue_at(claims, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        if claims.is_empty() {
            return Err(CredentialError::EmptyClaims);
        }

        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(CredentialError::ExpiryOutOfRange)?;

        let token_claims = TokenClaims {
            session: claims.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &token_claims,
            &self.encoding_key,
        )
        .map_err(CredentialError::Signing)
    }

    /// Verify signature and expiry, returning the identity fields
    pub fn verify(&self, token: &str) -> Result<SessionClaims, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<TokenClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.session),
            Err(e) if matches!(e.kind(), JwtErrorKind::ExpiredSignature) => {
                Err(CredentialError::TokenExpired)
            }
            Err(e) => Err(CredentialError::TokenInvalid(e)),
        }
    }
}
