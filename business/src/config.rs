use std::any::Any;

use streams_states::{State, state_assign_impl};

/// Default backend for local development, matching a locally running Strapi.
const DEFAULT_ENDPOINT: &str = "http://localhost:1337";
const DEFAULT_TOKEN_FRAGMENT: &str = "secret";

/// Backend connection settings, fixed at build time.
///
/// `STREAMS_ENDPOINT` and `STREAMS_TOKEN` are read via `option_env!` so a CI
/// build can point at another backend without code changes. Tests override
/// the base URL at runtime through [`BusinessConfig::new`].
#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub api_base_url: String,
    /// The fixed middle fragment of the bearer token.
    token_fragment: String,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            token_fragment: option_env!("STREAMS_TOKEN")
                .unwrap_or(DEFAULT_TOKEN_FRAGMENT)
                .to_owned(),
        }
    }

    #[doc(hidden)]
    pub fn with_token_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.token_fragment = fragment.into();
        self
    }

    pub fn api_url(&self) -> String {
        if self.api_base_url.is_empty() {
            "/api".to_owned()
        } else {
            format!("{}/api", self.api_base_url)
        }
    }

    /// Compose the bearer credential: pass phrase 1, the fixed fragment, pass
    /// phrase 2, concatenated in that order with no hashing.
    ///
    /// This mirrors what the backend validates; it is a compatibility
    /// requirement, not an authentication scheme worth imitating.
    pub fn bearer(&self, pass_phrase_1: &str, pass_phrase_2: &str) -> String {
        format!("{pass_phrase_1}{}{pass_phrase_2}", self.token_fragment)
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(option_env!("STREAMS_ENDPOINT").unwrap_or(DEFAULT_ENDPOINT))
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
