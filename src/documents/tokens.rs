use std::collections::HashMap;

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::types::RecordId;

/// Per-document bearer tokens obtained by password verification.
///
/// Lives only as long as its owner; nothing is written to disk. At most one
/// token is held per document and a new verification overwrites it.
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: HashMap<RecordId, String>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc_id: RecordId, token: String) {
        tracing::debug!("Caching access token {} for document {}", fingerprint(&token), doc_id);
        self.tokens.insert(doc_id, token);
    }

    /// Token for `doc_id` unless it is a JWT whose `exp` has passed, in
    /// which case the entry is dropped.
    pub fn live_token(&mut self, doc_id: &RecordId) -> Option<String> {
        self.live_token_at(doc_id, chrono::Utc::now().timestamp())
    }

    pub fn live_token_at(&mut self, doc_id: &RecordId, now: i64) -> Option<String> {
        let token = self.tokens.get(doc_id)?;
        if is_expired_at(token, now) {
            tracing::debug!("Access token for document {} expired", doc_id);
            self.tokens.remove(doc_id);
            return None;
        }
        Some(token.clone())
    }

    pub fn contains(&self, doc_id: &RecordId) -> bool {
        self.tokens.contains_key(doc_id)
    }

    pub fn remove(&mut self, doc_id: &RecordId) -> Option<String> {
        self.tokens.remove(doc_id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Expiry claim of a JWT-shaped token. The signature is not checked: the
/// server does that; this only avoids sending a token we know is stale.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// Opaque tokens never expire client-side.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}

/// Short stable identifier for logs; tokens themselves are never logged.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..4].iter().map(|b| format!("{:02x}", b)).collect()
}
