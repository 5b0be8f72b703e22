//! OAuth credential acquisition and caching.
//!
//! The consent flow only runs when the store has nothing usable for the
//! requested scopes; expired tokens with a refresh token are renewed
//! silently and written back through the same store.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use yup_oauth2::storage::{TokenInfo, TokenStorage, TokenStorageError};
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::config::Config;
use crate::error::{Error, Result};

/// A cached token along with the scopes it was granted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub scopes: Vec<String>,
    pub token: TokenInfo,
}

impl Credential {
    fn covers(&self, scopes: &[&str]) -> bool {
        let mut have: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        let mut want = scopes.to_vec();
        have.sort_unstable();
        want.sort_unstable();
        have == want
    }
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(credential)?)?;
        debug!("saved credential to {}", self.path.display());
        Ok(())
    }
}

/// Lets yup-oauth2 read and write tokens through a `CredentialStore`.
struct StoreAdapter<S>(S);

#[async_trait]
impl<S> TokenStorage for StoreAdapter<S>
where
    S: CredentialStore,
{
    async fn set(
        &self,
        scopes: &[&str],
        token: TokenInfo,
    ) -> std::result::Result<(), TokenStorageError> {
        let credential = Credential {
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            token,
        };
        self.0
            .save(&credential)
            .map_err(|err| TokenStorageError::Other(err.to_string().into()))
    }

    async fn get(&self, scopes: &[&str]) -> Option<TokenInfo> {
        match self.0.load() {
            Ok(Some(credential)) if credential.covers(scopes) => Some(credential.token),
            Ok(Some(_)) => {
                info!("cached credential was granted for other scopes, asking again");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!("ignoring unreadable credential cache: {}", err);
                None
            }
        }
    }
}

/// Returns a bearer token for `config.scopes`, running the browser consent
/// flow if nothing cached can be used.
pub async fn authenticate<S>(config: &Config, store: S) -> Result<String>
where
    S: CredentialStore + 'static,
{
    let secret = yup_oauth2::read_application_secret(&config.client_secret_path)
        .await
        .map_err(|err| {
            Error::Auth(format!(
                "cannot read client secret {}: {}",
                config.client_secret_path.display(),
                err
            ))
        })?;

    let auth =
        InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
            .with_storage(Box::new(StoreAdapter(store)))
            .build()
            .await?;

    let scopes: Vec<&str> = config.scopes.iter().map(String::as_str).collect();
    let token = auth.token(&scopes).await?;

    token
        .token()
        .map(str::to_string)
        .ok_or_else(|| Error::Auth("provider returned no access token".into()))
}
