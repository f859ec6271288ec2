use std::path::{Path, PathBuf};

use log::{info, warn};

/// Basic-auth credentials for a Jenkins host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Default netrc location: `~/.netrc`.
pub fn default_netrc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".netrc"))
}

/// Looks up credentials for `host` in a netrc file.
///
/// Never fails: a missing or unreadable file, or a file without a matching
/// `machine` (or `default`) entry, logs a warning and yields `None` so the
/// run proceeds unauthenticated.
pub fn resolve_credentials(netrc_path: &Path, host: &str) -> Option<Credentials> {
    let contents = match std::fs::read_to_string(netrc_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Netrc file not found: {}, proceeding without authentication",
                netrc_path.display()
            );
            return None;
        }
        Err(e) => {
            warn!("Error reading {}: {e}", netrc_path.display());
            return None;
        }
    };

    if let Some(credentials) = lookup(&contents, host) {
        info!(
            "Using credentials from {} for {host}",
            netrc_path.display()
        );
        Some(credentials)
    } else {
        warn!("No credentials found in {} for {host}", netrc_path.display());
        None
    }
}

#[derive(Default)]
struct Entry {
    login: Option<String>,
    password: Option<String>,
}

impl Entry {
    fn into_credentials(self) -> Option<Credentials> {
        let login = self.login?;
        Some(Credentials::new(login, self.password.unwrap_or_default()))
    }
}

/// Parses netrc text and returns the entry for `host`, falling back to a
/// `default` entry. The first matching `machine` wins.
fn lookup(contents: &str, host: &str) -> Option<Credentials> {
    let mut machine: Option<(String, Entry)> = None;
    let mut default: Option<Entry> = None;
    let mut in_default = false;

    let mut lines = contents.lines();
    while let Some(line) = lines.next() {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    if let Some((name, entry)) = machine.take() {
                        if name == host {
                            return entry.into_credentials();
                        }
                    }
                    in_default = false;
                    machine = tokens.next().map(|name| (name.to_string(), Entry::default()));
                }
                "default" => {
                    if let Some((name, entry)) = machine.take() {
                        if name == host {
                            return entry.into_credentials();
                        }
                    }
                    in_default = true;
                    default = Some(Entry::default());
                }
                "login" | "password" | "account" => {
                    let value = tokens.next().map(ToString::to_string);
                    let entry = if in_default {
                        default.as_mut()
                    } else {
                        machine.as_mut().map(|(_, entry)| entry)
                    };
                    if let Some(entry) = entry {
                        match token {
                            "login" => entry.login = value,
                            "password" => entry.password = value,
                            _ => {}
                        }
                    }
                }
                "macdef" => {
                    // Macro bodies run until the next blank line.
                    for body in lines.by_ref() {
                        if body.trim().is_empty() {
                            break;
                        }
                    }
                    break;
                }
                _ => {}
            }
        }
    }

    if let Some((name, entry)) = machine {
        if name == host {
            return entry.into_credentials();
        }
    }

    default.and_then(Entry::into_credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_matching_machine() {
        let netrc = "machine jenkins.example.com\n  login alice\n  password s3cret\n";
        let creds = lookup(netrc, "jenkins.example.com").unwrap();
        assert_eq!(creds.login(), "alice");
        assert_eq!(creds.password(), "s3cret");
    }

    #[test]
    fn test_lookup_single_line_entries() {
        let netrc = "machine other.example.com login bob password one\n\
                     machine jenkins.example.com login alice password two\n";
        let creds = lookup(netrc, "jenkins.example.com").unwrap();
        assert_eq!(creds.login(), "alice");
        assert_eq!(creds.password(), "two");
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let netrc = "machine other.example.com login bob password one\n\
                     default login anon password guest\n";
        let creds = lookup(netrc, "jenkins.example.com").unwrap();
        assert_eq!(creds.login(), "anon");
    }

    #[test]
    fn test_lookup_skips_macdef_bodies() {
        let netrc = "macdef init\nmachine fake login x password y\n\n\
                     machine jenkins.example.com login alice password two\n";
        let creds = lookup(netrc, "jenkins.example.com").unwrap();
        assert_eq!(creds.login(), "alice");
        assert!(lookup(netrc, "fake").is_none());
    }

    #[test]
    fn test_lookup_no_match() {
        let netrc = "machine other.example.com login bob password one\n";
        assert!(lookup(netrc, "jenkins.example.com").is_none());
    }

    #[test]
    fn test_resolve_credentials_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");
        assert!(resolve_credentials(&path, "jenkins.example.com").is_none());
    }

    #[test]
    fn test_resolve_credentials_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "machine jenkins.example.com login alice password token").unwrap();

        let creds = resolve_credentials(file.path(), "jenkins.example.com").unwrap();
        assert_eq!(creds, Credentials::new("alice", "token"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
