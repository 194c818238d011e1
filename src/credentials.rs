use log::info;
use crate::config::AppConfig;

/// Which collaborator a caller token is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Places,
    Language,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Places => "google",
            CredentialKind::Language => "gemini",
        }
    }
}

/// Maps caller-supplied tokens to the key actually sent upstream. An admin
/// passphrase is swapped for the server-held secret; anything else is the
/// caller's own key and passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    places_passphrase: Option<String>,
    places_secret: Option<String>,
    language_passphrase: Option<String>,
    language_secret: Option<String>,
}

impl CredentialResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            places_passphrase: config.admin_user.clone(),
            places_secret: config.google_maps_api_key.clone(),
            language_passphrase: config.admin_password.clone(),
            language_secret: config.gemini_api_key.clone(),
        }
    }

    pub fn resolve(&self, kind: CredentialKind, token: Option<&str>) -> Option<String> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;

        let (passphrase, secret) = match kind {
            CredentialKind::Places => (&self.places_passphrase, &self.places_secret),
            CredentialKind::Language => (&self.language_passphrase, &self.language_secret),
        };

        if passphrase.as_deref() == Some(token) {
            info!("Admin mode: using server-side {} key", kind.as_str());
            return secret.clone();
        }

        Some(token.to_string())
    }
}
