//! Configuration types for login protection.
//!
//! One struct holds every tunable: the lockout policy, token lifetimes and
//! the length of generated tokens.
//!
//! # Example
//!
//! ```rust
//! use portcullis::config::{PortcullisConfig, ThrottleConfig};
//! use chrono::Duration;
//!
//! // Use defaults: 5 failures, 24 hour cooldown
//! let config = PortcullisConfig::default();
//!
//! // Or customize
//! let config = PortcullisConfig {
//!     throttle: ThrottleConfig {
//!         max_attempts: 3,
//!         cooldown: Duration::minutes(30),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

/// Message returned to a locked-out client.
pub const DEFAULT_LOCKOUT_MESSAGE: &str = "Too many request";

#[derive(Debug, Clone)]
pub struct PortcullisConfig {
    /// Lockout policy.
    pub throttle: ThrottleConfig,

    /// Token expiration settings.
    pub tokens: TokenConfig,
}

impl Default for PortcullisConfig {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            tokens: TokenConfig::default(),
        }
    }
}

impl PortcullisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient settings for local development: more attempts, short cooldown.
    pub fn development() -> Self {
        Self {
            throttle: ThrottleConfig {
                max_attempts: 10,
                cooldown: Duration::minutes(5),
                message: DEFAULT_LOCKOUT_MESSAGE.to_owned(),
            },
            tokens: TokenConfig {
                access_token_expiry: Duration::hours(24),
            },
        }
    }

    /// Fewer attempts and shorter-lived tokens.
    pub fn strict() -> Self {
        Self {
            throttle: ThrottleConfig {
                max_attempts: 3,
                cooldown: Duration::hours(24),
                message: DEFAULT_LOCKOUT_MESSAGE.to_owned(),
            },
            tokens: TokenConfig {
                access_token_expiry: Duration::hours(1),
            },
        }
    }
}

/// Controls how repeated failed logins for one identifier are handled.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failed attempts after which the identifier is blocked.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// How long a blocked identifier stays blocked after its last failure.
    ///
    /// Default: 24 hours
    pub cooldown: Duration,

    /// Message sent with a rejected request.
    ///
    /// Default: `"Too many request"`
    pub message: String,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            cooldown: Duration::hours(24),
            message: DEFAULT_LOCKOUT_MESSAGE.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// How long access tokens remain valid after creation.
    ///
    /// Default: 7 days
    pub access_token_expiry: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: Duration::days(7),
        }
    }
}
