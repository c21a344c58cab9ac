//! Where credential sets live on disk and how they're read and written.
//!
//! Every tracker gets its own directory under the configuration root, and every account configured
//! for that tracker gets a `config<name>` directory inside it holding three flat text files.

use std::{
    io,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use platform_dirs::AppDirs;

use crate::fs;

const BASE_URL_FILE: &str = "base-url.txt";
const EMAIL_FILE: &str = "email-address.txt";
const TOKEN_FILE: &str = "api-token.txt";
const CREDENTIAL_DIR_PREFIX: &str = "config";

/// Resolve the configuration root, preferring an explicit override over the platform default.
pub(crate) fn config_root(override_dir: Option<PathBuf>) -> Result<PathBuf, Error> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }
    AppDirs::new(Some("ticket-report"), true)
        .map(|app_dirs| app_dirs.config_dir)
        .ok_or(Error::NoConfigDir)
}

/// The values needed to talk to one tracker account, as read from a [`CredentialSet`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub email: Option<String>,
    pub token: String,
}

/// A directory holding one account's credentials. Nothing is cached, every [`Self::load`] hits
/// the disk again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialSet {
    dir: PathBuf,
}

impl CredentialSet {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> Result<Credentials, Error> {
        let base_url = read_value(&self.dir.join(BASE_URL_FILE))?;
        let token = read_value(&self.dir.join(TOKEN_FILE))?;
        let email = match std::fs::read_to_string(self.dir.join(EMAIL_FILE)) {
            Ok(email) => Some(email.trim().to_string()).filter(|email| !email.is_empty()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(Error::Fs(fs::Error::Read {
                    path: self.dir.join(EMAIL_FILE),
                    source,
                }))
            }
        };
        Ok(Credentials {
            base_url,
            email,
            token,
        })
    }

    pub(crate) fn save(dir: PathBuf, credentials: &Credentials) -> Result<Self, Error> {
        fs::create_dir(&dir)?;
        fs::write(&dir.join(BASE_URL_FILE), &credentials.base_url)?;
        fs::write(
            &dir.join(EMAIL_FILE),
            credentials.email.as_deref().unwrap_or_default(),
        )?;
        fs::write(&dir.join(TOKEN_FILE), &credentials.token)?;
        Ok(Self::new(dir))
    }
}

fn read_value(path: &Path) -> Result<String, Error> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Every credential set stored for one tracker, ordered by directory name.
pub(crate) fn list_credential_sets(tracker_dir: &Path) -> Result<Vec<CredentialSet>, Error> {
    Ok(fs::list_dirs(tracker_dir)?
        .into_iter()
        .filter(|dir| {
            dir.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(CREDENTIAL_DIR_PREFIX))
        })
        .map(CredentialSet::new)
        .collect())
}

/// Replace the characters which are illegal in a file name on at least one platform.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect()
}

/// The directory a new credential set called `name` would be stored in, or `None` if that name
/// is taken.
pub(crate) fn new_credential_dir(tracker_dir: &Path, name: &str) -> Option<PathBuf> {
    let dir = tracker_dir.join(format!("{CREDENTIAL_DIR_PREFIX}{}", sanitize_name(name)));
    if dir.is_dir() {
        None
    } else {
        Some(dir)
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("Could not find a configuration directory for this platform")]
    #[diagnostic(
        code(app_config::no_config_dir),
        help("Pass --config-dir or set TICKET_REPORT_CONFIG_DIR to choose one explicitly.")
    )]
    NoConfigDir,
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
}
