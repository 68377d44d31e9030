//! Camera shared-secret check
//!
//! One secret authorizes frame uploads and stream start/stop.

use std::fmt;

/// Built-in fallback secret, used when `CAMERA_PASSWORD` is unset
pub const DEFAULT_SECRET: &str = "your_default_password";

/// Shared secret, read-only after startup
#[derive(Clone)]
pub struct SharedSecret {
    secret: Vec<u8>,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into_bytes(),
        }
    }

    /// Compare caller credentials in constant time
    ///
    /// Missing credentials never match.
    pub fn verify(&self, candidate: Option<&str>) -> bool {
        match candidate {
            Some(candidate) => constant_time_eq(&self.secret, candidate.as_bytes()),
            None => false,
        }
    }

    /// True if the secret is the built-in fallback
    pub fn is_default(&self) -> bool {
        self.secret == DEFAULT_SECRET.as_bytes()
    }
}

// Never print the secret
impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("len", &self.secret.len())
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
