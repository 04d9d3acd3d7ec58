//! Request and storage models for the board.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent Redis data structures.

use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// ============================================================================
// User Models
// ============================================================================

/// User credential record as stored in Redis.
///
/// The secret is kept only as a salted one-way hash; the plaintext never
/// reaches storage or logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub identifier: String,
    pub display_name: String,
    pub secret_hash: String,
    pub created_at: u64,
}

impl StoredUser {
    /// Project to the public view, dropping the secret hash.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            identifier: self.identifier,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

/// Resolved request identity: a user record with the secret hash stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub identifier: String,
    pub display_name: String,
    pub created_at: u64,
}

// ============================================================================
// Session Models
// ============================================================================

/// Minimal claim serialized into a session record.
///
/// Kept small on purpose: the full user record is re-loaded from the store
/// on every resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaim {
    pub user_id: String,
    pub identifier: String,
}

/// Session record as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub claim: SessionClaim,
    pub issued_at: u64,
    pub expires_at: u64,
}

// ============================================================================
// Post Models
// ============================================================================

/// Post document as stored in Redis.
///
/// author_id and author_name are stamped at creation and never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: u64,
}

// ============================================================================
// Request Bodies
// ============================================================================

/// Registration form body.
///
/// The confirmation field is compared against the secret and discarded;
/// it is never hashed or stored.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub identifier: String,
    pub display_name: String,
    pub secret: String,
    pub secret_confirm: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("secret", &"[REDACTED]")
            .field("secret_confirm", &"[REDACTED]")
            .finish()
    }
}

/// Login form body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Post creation form body.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Post update form body. Author fields are not accepted.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_public_strips_secret_hash() {
        let user = StoredUser {
            id: "abc123".to_string(),
            identifier: "a@x.com".to_string(),
            display_name: "Alice".to_string(),
            secret_hash: "$2b$10$secret".to_string(),
            created_at: 1_700_000_000,
        };

        let public = user.into_public();
        assert_eq!(public.id, "abc123");
        assert_eq!(public.identifier, "a@x.com");
        assert_eq!(public.display_name, "Alice");

        // The serialized form must not carry the hash under any key
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let req = RegisterRequest {
            identifier: "a@x.com".to_string(),
            display_name: "Alice".to_string(),
            secret: "hunter2hunter2".to_string(),
            secret_confirm: "hunter2hunter2".to_string(),
        };
        let rendered = format!("{:?}", req);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));

        let req = LoginRequest {
            identifier: "a@x.com".to_string(),
            secret: "hunter2hunter2".to_string(),
        };
        let rendered = format!("{:?}", req);
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_session_round_trip() {
        let session = StoredSession {
            token: "tok".to_string(),
            claim: SessionClaim {
                user_id: "u1".to_string(),
                identifier: "a@x.com".to_string(),
            },
            issued_at: 100,
            expires_at: 3700,
        };

        let json = serde_json::to_string(&session).unwrap();
        let back: StoredSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.claim.user_id, "u1");
        assert_eq!(back.expires_at, 3700);
    }
}
