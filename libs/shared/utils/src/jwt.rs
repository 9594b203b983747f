use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;
use shared_models::auth::JwtClaims;

/// Reads the claims of a bearer token without checking its signature. The
/// client never holds the signing secret; the server stays the authority and
/// this is only used to learn when the session runs out.
pub fn decode_claims(token: &str) -> Result<JwtClaims, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let claims_b64 = parts[1].trim_end_matches('=');

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(e) => {
            debug!("Failed to decode claims: {}", e);
            return Err("Invalid claims encoding".to_string());
        }
    };

    serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })
}

/// Expiry of a token, if it is a JWT carrying an `exp` claim. Opaque tokens
/// yield `None`.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let claims = decode_claims(token).ok()?;
    claims
        .exp
        .and_then(|timestamp| Utc.timestamp_opt(timestamp, 0).single())
}
