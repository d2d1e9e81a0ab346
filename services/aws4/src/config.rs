use crate::constants::*;
use aws4_core::utils::Redact;
use aws4_core::Context;
use std::fmt::{Debug, Formatter};

/// Config carries credentials configured outside of code.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`, then `AWS_ACCESS_KEY`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`, then `AWS_SECRET_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        Self {
            access_key_id: ctx
                .env_var(AWS_ACCESS_KEY_ID)
                .or_else(|| ctx.env_var(AWS_ACCESS_KEY)),
            secret_access_key: ctx
                .env_var(AWS_SECRET_ACCESS_KEY)
                .or_else(|| ctx.env_var(AWS_SECRET_KEY)),
            session_token: ctx.env_var(AWS_SESSION_TOKEN),
        }
    }
}
