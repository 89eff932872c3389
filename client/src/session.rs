use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Github,
    Email,
}

/// Drive bearer token. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub provider: Provider,
    #[serde(default)]
    pub provider_token: Option<String>,
}

impl Session {
    /// The Drive credential for this session. Only Google sessions carry one.
    pub fn drive_credential(&self) -> Option<Credential> {
        if self.provider != Provider::Google {
            return None;
        }
        self.provider_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Credential::new)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .field("has_provider_token", &self.provider_token.is_some())
            .finish_non_exhaustive()
    }
}
