// Fbxmon - Freebox telemetry exporter for Graphite and InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::error::{ErrorKind, FreeboxError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "fbxmon";
const CREDENTIALS_FILE_NAME: &str = "credentials.toml";
const FALLBACK_FILE_NAME: &str = ".fbxmon-credentials.toml";

/// Long-lived credentials issued by a Freebox once the operator approves the
/// registration on the device itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub track_id: String,
    pub app_token: String,
    pub app_id: String,
    pub app_name: String,
    pub device_name: String,
}

/// Default location of the credentials file: the user configuration directory
/// when there is one, the working directory otherwise.
pub fn default_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(CONFIG_DIR_NAME).join(CREDENTIALS_FILE_NAME),
        None => PathBuf::from(FALLBACK_FILE_NAME),
    }
}

/// TOML file holding one table of credentials per Freebox endpoint.
///
/// The file is read once and written at most once per invocation. There is no
/// locking, only one instance is expected to run against a given file at a time.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    entries: BTreeMap<String, Credentials>,
}

impl CredentialStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FreeboxError> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, Credentials> = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| {
                FreeboxError::KindMsgCause(ErrorKind::Credentials, "unable to parse credentials file", Box::new(e))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(FreeboxError::KindMsgCause(
                    ErrorKind::Credentials,
                    "unable to read credentials file",
                    Box::new(e),
                ))
            }
        };

        tracing::debug!(message = "loaded credentials", path = %path.display(), endpoints = entries.len());
        Ok(CredentialStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, endpoint: &str) -> Option<&Credentials> {
        self.entries.get(endpoint)
    }

    /// Credentials for `endpoint` or a credentials error telling the operator to register.
    pub fn require(&self, endpoint: &str) -> Result<&Credentials, FreeboxError> {
        self.get(endpoint).ok_or(FreeboxError::KindMsg(
            ErrorKind::Credentials,
            "no credentials for this endpoint, register the application first",
        ))
    }

    /// Store credentials for `endpoint` and write the whole file back to disk.
    pub fn insert(&mut self, endpoint: &str, creds: Credentials) -> Result<(), FreeboxError> {
        self.entries.insert(endpoint.to_owned(), creds);
        self.save()
    }

    fn save(&self) -> Result<(), FreeboxError> {
        let contents = toml::to_string_pretty(&self.entries).map_err(|e| {
            FreeboxError::KindMsgCause(ErrorKind::Credentials, "unable to encode credentials", Box::new(e))
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                FreeboxError::KindMsgCause(
                    ErrorKind::Credentials,
                    "unable to create credentials directory",
                    Box::new(e),
                )
            })?;
        }

        // Private temp file renamed over the final one
        let tmp = temp_path(&self.path);
        write_private(&tmp, contents.as_bytes())
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                FreeboxError::KindMsgCause(ErrorKind::Credentials, "unable to write credentials file", Box::new(e))
            })?;

        tracing::info!(message = "saved credentials", path = %self.path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Create `path` readable only by its owner (on Unix) and write `contents` to it.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    // A stale file from an interrupted save may have any mode, start over
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let mut file = opts.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod test {
    use super::{temp_path, CredentialStore, Credentials};
    use crate::error::ErrorKind;
    use std::fs;

    fn example_credentials() -> Credentials {
        Credentials {
            track_id: "42".to_owned(),
            app_token: "dyNYgfK0Ya6FWGqq83sBHa7TwzWo+pg4fDFUJHShcjVYzTfaRrZzm93p7OTAfH/0".to_owned(),
            app_id: "fr.freebox.seximonitor".to_owned(),
            app_name: "SexiMonitor".to_owned(),
            device_name: "SexiServer".to_owned(),
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credentials.toml")).unwrap();

        assert!(store.get("mafreebox.freebox.fr").is_none());
        assert_eq!(
            ErrorKind::Credentials,
            store.require("mafreebox.freebox.fr").unwrap_err().kind()
        );
    }

    #[test]
    fn test_insert_persists_per_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let mut store = CredentialStore::open(&path).unwrap();
        store.insert("mafreebox.freebox.fr", example_credentials()).unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(Some(&example_credentials()), reopened.get("mafreebox.freebox.fr"));
        assert!(reopened.get("192.168.0.254").is_none());

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("mafreebox.freebox.fr"));
        assert!(contents.contains("track_id"));
    }

    #[cfg(unix)]
    #[test]
    fn test_insert_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::open(&path).unwrap();
        store.insert("mafreebox.freebox.fr", example_credentials()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(0o600, mode & 0o777);
    }

    #[cfg(unix)]
    #[test]
    fn test_insert_replaces_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        // Left behind by an interrupted save
        fs::write(temp_path(&path), "stale").unwrap();

        let mut store = CredentialStore::open(&path).unwrap();
        store.insert("mafreebox.freebox.fr", example_credentials()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(0o600, mode & 0o777);
        assert!(!temp_path(&path).exists());
        assert_eq!(
            Some(&example_credentials()),
            CredentialStore::open(&path).unwrap().get("mafreebox.freebox.fr")
        );
    }

    #[test]
    fn test_open_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "this is [not valid").unwrap();

        let err = CredentialStore::open(&path).unwrap_err();
        assert_eq!(ErrorKind::Credentials, err.kind());
    }
}
