//! Bearer-token check for write routes.

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 48;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex MAC. The admin CLI uses the same
/// function to produce the `ADMIN_TOKEN_HASH` value.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random 48-character alphanumeric admin token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Authenticates write requests against a single admin token.
///
/// Only the HMAC of the token is configured, so leaking the configuration does
/// not leak a usable credential without the signing secret.
pub struct AuthService {
    signing_secret: String,
    admin_mac: Vec<u8>,
}

impl AuthService {
    /// Creates the service from the signing secret and the hex-encoded token MAC.
    ///
    /// # Errors
    ///
    /// Fails if `admin_token_hash` is not valid hex.
    pub fn new(
        signing_secret: String,
        admin_token_hash: &str,
    ) -> Result<Self, hex::FromHexError> {
        Ok(Self {
            signing_secret,
            admin_mac: hex::decode(admin_token_hash.trim())?,
        })
    }

    /// Checks a raw bearer token.
    ///
    /// The MAC comparison is constant-time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token does not match.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());

        mac.verify_slice(&self.admin_mac).map_err(|_| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid token" }))
        })
    }
}
