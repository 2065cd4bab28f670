//! Discovery and parsing of `.edgerc` API client credentials.
//!
//! The credentials file is INI-shaped: `[section]` headers followed by
//! `key = value` lines. The path and section are resolved from command-line
//! overrides, then [`Config`], then the `AKAMAI_EDGERC*` environment
//! variables, then the built-in defaults. Any failure here is fatal to the
//! invoking command.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::Config;
use crate::defaults::{DEFAULT_EDGERC_FILE, DEFAULT_EDGERC_SECTION, EDGERC_ENV, EDGERC_SECTION_ENV};

/// Largest request body hashed for signing when the file does not say.
pub const DEFAULT_MAX_BODY: usize = 131_072;

/// Errors raised while locating or reading credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credentials file could not be read.
    #[error("Unable to read edgerc file \"{path}\": {source}")]
    Unreadable {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A line was neither a section header, a comment, nor a key/value pair.
    #[error("malformed line {line} in edgerc file \"{path}\": {content}")]
    Malformed {
        /// Path of the offending file.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
        /// Text of the offending line.
        content: String,
    },
    /// The requested section is absent.
    #[error("Edgerc section \"{section}\" not found in \"{path}\"")]
    MissingSection {
        /// Section that was requested.
        section: String,
        /// Path of the file searched.
        path: Utf8PathBuf,
    },
    /// A required key is absent from the section.
    #[error("edgerc section \"{section}\" is missing \"{key}\"")]
    MissingKey {
        /// Name of the absent key.
        key: &'static str,
        /// Section that was searched.
        section: String,
    },
    /// A key carried a value that could not be interpreted.
    #[error("edgerc section \"{section}\" has an invalid \"{key}\" value: {value}")]
    InvalidValue {
        /// Name of the key.
        key: &'static str,
        /// Section that was searched.
        section: String,
        /// Offending raw value.
        value: String,
    },
}

/// API client credentials for a single control-plane host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Control-plane host name, without scheme.
    pub host: String,
    /// Client token issued for the API client.
    pub client_token: String,
    /// Secret used to derive request signing keys.
    pub client_secret: String,
    /// Access token granted to the API client.
    pub access_token: String,
    /// Largest request body prefix included in the content hash.
    pub max_body: usize,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("host", &self.host)
            .field("client_token", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("max_body", &self.max_body)
            .finish()
    }
}

/// Overrides supplied directly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialOverrides {
    /// Value of `--edgerc`.
    pub edgerc: Option<Utf8PathBuf>,
    /// Value of `--section`.
    pub section: Option<String>,
}

/// Fully resolved location of the credentials to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSource {
    /// Credentials file path.
    pub path: Utf8PathBuf,
    /// Section inside the file.
    pub section: String,
}

impl CredentialSource {
    /// Resolves the credentials location using the process environment.
    #[must_use]
    pub fn resolve(overrides: &CredentialOverrides, config: &Config) -> Self {
        Self::resolve_with(overrides, config, |key| std::env::var(key).ok(), home_edgerc)
    }

    /// Resolves the credentials location with injectable lookups.
    ///
    /// `env` reads environment variables; `home` yields the default path
    /// used when nothing else names a file.
    pub fn resolve_with<F, H>(
        overrides: &CredentialOverrides,
        config: &Config,
        env: F,
        home: H,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
        H: FnOnce() -> Utf8PathBuf,
    {
        let path = overrides
            .edgerc
            .clone()
            .or_else(|| config.edgerc.clone())
            .or_else(|| non_empty(env(EDGERC_ENV)).map(Utf8PathBuf::from))
            .unwrap_or_else(home);
        let section = overrides
            .section
            .clone()
            .or_else(|| config.section.clone())
            .or_else(|| non_empty(env(EDGERC_SECTION_ENV)))
            .unwrap_or_else(|| DEFAULT_EDGERC_SECTION.to_owned());
        Self { path, section }
    }

    /// Reads the file and extracts the configured section.
    ///
    /// # Errors
    /// Returns [`CredentialsError`] when the file is unreadable, malformed, or
    /// lacks the section or one of its required keys.
    pub fn load(&self) -> Result<Credentials, CredentialsError> {
        EdgeRc::read(&self.path)?.credentials(&self.section)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn home_edgerc() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
        .join(DEFAULT_EDGERC_FILE)
}

/// Parsed contents of a credentials file.
#[derive(Debug, Clone, Default)]
pub struct EdgeRc {
    path: Utf8PathBuf,
    sections: HashMap<String, HashMap<String, String>>,
}

impl EdgeRc {
    /// Reads and parses the credentials file at `path`.
    ///
    /// # Errors
    /// Returns [`CredentialsError::Unreadable`] or
    /// [`CredentialsError::Malformed`].
    pub fn read(path: &Utf8Path) -> Result<Self, CredentialsError> {
        let text = fs::read_to_string(path).map_err(|source| CredentialsError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parses credentials text; `path` is only used in diagnostics.
    ///
    /// Keys are case-insensitive. Keys appearing before any section header
    /// are ignored, and a repeated key keeps its last value.
    ///
    /// # Errors
    /// Returns [`CredentialsError::Malformed`] for unparseable lines.
    pub fn parse(path: &Utf8Path, text: &str) -> Result<Self, CredentialsError> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                let name = header.trim().to_owned();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }
            let Some((key, value)) = line.split_once(['=', ':']) else {
                return Err(CredentialsError::Malformed {
                    path: path.to_path_buf(),
                    line: number + 1,
                    content: line.to_owned(),
                });
            };
            if let Some(section) = current.as_ref() {
                sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_lowercase(), value.trim().to_owned());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Returns true when the file declares `section`.
    #[must_use]
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Extracts the credentials held in `section`.
    ///
    /// # Errors
    /// Returns [`CredentialsError::MissingSection`],
    /// [`CredentialsError::MissingKey`], or
    /// [`CredentialsError::InvalidValue`].
    pub fn credentials(&self, section: &str) -> Result<Credentials, CredentialsError> {
        let entries = self
            .sections
            .get(section)
            .ok_or_else(|| CredentialsError::MissingSection {
                section: section.to_owned(),
                path: self.path.clone(),
            })?;
        let required = |key: &'static str| {
            entries
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| CredentialsError::MissingKey {
                    key,
                    section: section.to_owned(),
                })
        };

        let host = required("host")?;
        let max_body = match entries.get("max_body") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| CredentialsError::InvalidValue {
                    key: "max_body",
                    section: section.to_owned(),
                    value: raw.clone(),
                })?,
            None => DEFAULT_MAX_BODY,
        };

        Ok(Credentials {
            host: normalise_host(&host),
            client_token: required("client_token")?,
            client_secret: required("client_secret")?,
            access_token: required("access_token")?,
            max_body,
        })
    }
}

fn normalise_host(host: &str) -> String {
    let bare = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    bare.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
# sample credentials
[default]
host = akab-default.luna.akamaiapis.net

[cloudlets]
client_secret = c2VjcmV0
host = https://akab-cloudlets.luna.akamaiapis.net/
access_token = akab-access
client_token = akab-client
max_body = 2048
";

    fn parse(text: &str) -> EdgeRc {
        EdgeRc::parse(Utf8Path::new("/tmp/.edgerc"), text).expect("parse edgerc")
    }

    #[test]
    fn extracts_section_credentials() {
        let credentials = parse(SAMPLE).credentials("cloudlets").expect("credentials");
        assert_eq!(credentials.host, "akab-cloudlets.luna.akamaiapis.net");
        assert_eq!(credentials.client_token, "akab-client");
        assert_eq!(credentials.client_secret, "c2VjcmV0");
        assert_eq!(credentials.access_token, "akab-access");
        assert_eq!(credentials.max_body, 2048);
    }

    #[test]
    fn max_body_defaults_when_absent() {
        let text = "[s]\nhost=h\nclient_token=a\nclient_secret=b\naccess_token=c\n";
        let credentials = parse(text).credentials("s").expect("credentials");
        assert_eq!(credentials.max_body, DEFAULT_MAX_BODY);
    }

    #[test]
    fn missing_section_is_reported() {
        let error = parse(SAMPLE).credentials("papi").unwrap_err();
        assert!(matches!(error, CredentialsError::MissingSection { ref section, .. } if section == "papi"));
    }

    #[test]
    fn missing_key_is_reported() {
        let error = parse(SAMPLE).credentials("default").unwrap_err();
        assert!(matches!(error, CredentialsError::MissingKey { key: "client_token", .. }));
    }

    #[test]
    fn invalid_max_body_is_reported() {
        let text = "[s]\nhost=h\nclient_token=a\nclient_secret=b\naccess_token=c\nmax_body=lots\n";
        let error = parse(text).credentials("s").unwrap_err();
        assert!(matches!(error, CredentialsError::InvalidValue { key: "max_body", .. }));
    }

    #[test]
    fn padded_secret_keeps_trailing_equals() {
        let text = "[s]\nhost=h\nclient_token=a\nclient_secret = abc==\naccess_token=c\n";
        let credentials = parse(text).credentials("s").expect("credentials");
        assert_eq!(credentials.client_secret, "abc==");
    }

    #[rstest]
    #[case("host: https://akab.example.net/x=y", "akab.example.net/x=y")]
    #[case("host = https://akab.example.net:443", "akab.example.net:443")]
    fn earliest_delimiter_splits_the_line(#[case] line: &str, #[case] host: &str) {
        let text = format!("[s]\n{line}\nclient_token=a\nclient_secret=b\naccess_token=c\n");
        let credentials = parse(&text).credentials("s").expect("credentials");
        assert_eq!(credentials.host, host);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let error = EdgeRc::parse(Utf8Path::new("x"), "[s]\nthis is not valid\n").unwrap_err();
        assert!(matches!(error, CredentialsError::Malformed { line: 2, .. }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = parse(SAMPLE).credentials("cloudlets").expect("credentials");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("akab-cloudlets.luna.akamaiapis.net"));
    }

    #[rstest]
    #[case::flag_wins(Some("/flag"), Some("/config"), Some("/env"), "/flag")]
    #[case::config_before_env(None, Some("/config"), Some("/env"), "/config")]
    #[case::env_before_home(None, None, Some("/env"), "/env")]
    #[case::home_fallback(None, None, None, "/home/op/.edgerc")]
    fn path_resolution_precedence(
        #[case] flag: Option<&str>,
        #[case] configured: Option<&str>,
        #[case] env_value: Option<&str>,
        #[case] expected: &str,
    ) {
        let overrides = CredentialOverrides {
            edgerc: flag.map(Utf8PathBuf::from),
            section: None,
        };
        let config = Config {
            edgerc: configured.map(Utf8PathBuf::from),
            ..Config::default()
        };
        let source = CredentialSource::resolve_with(
            &overrides,
            &config,
            |key| (key == EDGERC_ENV).then(|| env_value.map(str::to_owned)).flatten(),
            || Utf8PathBuf::from("/home/op/.edgerc"),
        );
        assert_eq!(source.path, Utf8PathBuf::from(expected));
        assert_eq!(source.section, "cloudlets");
    }

    #[test]
    fn section_falls_back_to_environment() {
        let source = CredentialSource::resolve_with(
            &CredentialOverrides::default(),
            &Config::default(),
            |key| (key == EDGERC_SECTION_ENV).then(|| String::from("alb")),
            || Utf8PathBuf::from("/home/op/.edgerc"),
        );
        assert_eq!(source.section, "alb");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join(".edgerc")).expect("utf8 path");
        fs::write(&path, SAMPLE).expect("write edgerc");
        let source = CredentialSource {
            path,
            section: String::from("cloudlets"),
        };
        let credentials = source.load().expect("load credentials");
        assert_eq!(credentials.access_token, "akab-access");
    }

    #[test]
    fn load_reports_unreadable_file() {
        let source = CredentialSource {
            path: Utf8PathBuf::from("/nonexistent/alb/.edgerc"),
            section: String::from("cloudlets"),
        };
        let error = source.load().unwrap_err();
        assert!(matches!(error, CredentialsError::Unreadable { .. }));
        assert!(error.to_string().starts_with("Unable to read edgerc file"));
    }
}
