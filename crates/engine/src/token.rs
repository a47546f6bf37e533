//! Credential resolution and the on-disk token cache.
//!
//! A token is an opaque string of exactly [`TOKEN_LENGTH`] characters. Where
//! it came from (its provenance) drives error messaging and cache eviction,
//! so resolution always reports a [`TokenSource`] next to the token itself.

use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error::ResultEngine,
    util::{restrict_dir, write_private},
};

/// Personal access tokens issued by the service are 43 characters long.
pub const TOKEN_LENGTH: usize = 43;

/// Environment variable that may supply a token.
pub const TOKEN_ENV: &str = "YNAB_API_TOKEN";

/// Set to `true` to skip reading the cached token during resolution.
pub const NO_CACHE_ENV: &str = "YNAB_EXPORT_NO_CACHE";

const APP_DIR_NAME: &str = "ynab-export";
const TOKEN_FILE_NAME: &str = "api-token";

/// Where the API token was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    None,
    Flag,
    Env,
    Cached,
    Manual,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("no source"),
            Self::Flag => f.write_str("command-line flag (--token)"),
            Self::Env => write!(f, "environment variable ({TOKEN_ENV})"),
            Self::Cached => f.write_str("cached token file"),
            Self::Manual => f.write_str("manual entry"),
        }
    }
}

impl TokenSource {
    /// Sources whose token is worth persisting after a successful validation.
    ///
    /// A token that already came from the cache does not need to be written
    /// back.
    pub fn should_cache(self) -> bool {
        matches!(self, Self::Flag | Self::Env | Self::Manual)
    }
}

/// Plaintext token cache at a per-user location.
///
/// The file holds secret material, so writes use owner-only permissions.
/// Absence of the file is never an error.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Cache under the user cache directory, falling back to the config
    /// directory when the platform has no cache dir.
    pub fn at_default_location() -> Option<Self> {
        dirs::cache_dir()
            .or_else(dirs::config_dir)
            .map(|dir| Self::at(dir.join(APP_DIR_NAME).join(TOKEN_FILE_NAME)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path where the token is or would be stored, for display purposes.
    pub fn location(&self) -> &Path {
        &self.path
    }

    /// Reads the cached token.
    ///
    /// Returns `Ok(None)` when no token is cached (missing or empty file);
    /// any other read failure is an error the caller should report but
    /// survive.
    pub fn load(&self) -> ResultEngine<Option<String>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let token = data.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Writes the token, creating the cache directory as needed.
    pub fn save(&self, token: &str) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
            restrict_dir(parent)?;
        }
        write_private(&self.path, token.as_bytes())?;
        Ok(())
    }

    /// Removes the cached token. Missing file counts as success.
    pub fn delete(&self) -> ResultEngine<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Outcome of credential resolution.
#[derive(Debug)]
pub struct Resolution {
    pub token: String,
    pub source: TokenSource,
    /// Set when the cache could not be read; resolution still succeeds and
    /// degrades to interactive entry.
    pub warning: Option<String>,
}

impl Resolution {
    fn none(warning: Option<String>) -> Self {
        Self {
            token: String::new(),
            source: TokenSource::None,
            warning,
        }
    }
}

/// Determines the token and its provenance.
///
/// Precedence, first match wins: explicit flag, environment variable, cached
/// token. When nothing matches the caller must prompt interactively.
pub fn resolve(flag: Option<&str>, env: Option<&str>, cache: Option<&TokenCache>) -> Resolution {
    if let Some(token) = flag.map(str::trim).filter(|t| !t.is_empty()) {
        return Resolution {
            token: token.to_string(),
            source: TokenSource::Flag,
            warning: None,
        };
    }

    if let Some(token) = env.map(str::trim).filter(|t| !t.is_empty()) {
        return Resolution {
            token: token.to_string(),
            source: TokenSource::Env,
            warning: None,
        };
    }

    let Some(cache) = cache else {
        return Resolution::none(None);
    };

    match cache.load() {
        Ok(Some(token)) => Resolution {
            token,
            source: TokenSource::Cached,
            warning: None,
        },
        Ok(None) => Resolution::none(None),
        Err(err) => {
            tracing::warn!("token cache unreadable: {err}");
            Resolution::none(Some(format!(
                "could not read cached token from {}: {err}",
                cache.location().display()
            )))
        }
    }
}
