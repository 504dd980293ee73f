//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::core_state::CoreState;

/// Session lifetime: 24 hours.
const SESSION_TTL_SECS: u64 = 24 * 3600;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus API-specific in-memory stores.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// User context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated user, injected into request extensions by the auth
/// middleware after token validation. Handlers scope every query by
/// `user_id` — never by a client-supplied identifier.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: String,
}

// ═══════════════════════════════════════════════════════════
// Bearer tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Session store — token hash → user, with TTL
// ═══════════════════════════════════════════════════════════

struct SessionEntry {
    user_id: Uuid,
    email: String,
    expires_at: Instant,
}

/// In-memory session store. Tokens are held hashed; sessions expire
/// after [`SESSION_TTL_SECS`] and are lost on restart.
pub struct SessionStore {
    entries: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::from_secs(SESSION_TTL_SECS),
        }
    }

    /// Issue a fresh token for a user. Returns the plaintext token,
    /// which is never stored.
    pub fn issue(&mut self, user_id: Uuid, email: String) -> String {
        if self.entries.len() > 1024 {
            self.cleanup();
        }
        let token = generate_token();
        self.entries.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                email,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Resolve a presented token to its user. Expired entries are removed.
    pub fn validate(&mut self, token: &str) -> Option<UserContext> {
        let key = hash_token(token);
        let entry = self.entries.get(&key)?;
        if Instant::now() > entry.expires_at {
            self.entries.remove(&key);
            return None;
        }
        Some(UserContext {
            user_id: entry.user_id,
            email: entry.email.clone(),
        })
    }

    /// Revoke a token (logout). Returns whether it existed.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.entries.remove(&hash_token(token)).is_some()
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, e| now < e.expires_at);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-caller sliding window
// ═══════════════════════════════════════════════════════════

/// Per-caller rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            // The client polls the box mirror sub-second, so the budget
            // is generous compared to a typical CRUD API.
            per_minute: 1200,
            per_hour: 20_000,
        }
    }

    /// Check if a caller is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let entries = self.windows.entry(key.to_string()).or_default();

        // Clean entries older than 1 hour
        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        // Check per-minute
        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        // Check per-hour
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
