use crate::domain_port::DirectoryEntry;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    #[serde(default)]
    pub gate: Gate,
    pub log: Log,
    #[serde(default)]
    pub directory: Directory,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "google"
    pub google: Option<Google>,
    pub fake: Option<FakeIdentity>,
}

#[derive(Deserialize)]
pub struct Google {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

// Settings are logged at debug level; keep the OAuth secrets out of it.
impl fmt::Debug for Google {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Google")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct FakeIdentity {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub backend: String, // "fake" or "http"
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Gate {
    pub wait_window_ms: u64,
    pub renewal_timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            wait_window_ms: 10_000,
            renewal_timeout_ms: 10_000,
            retry_attempts: 2,
            retry_base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<DirectoryEntry>,
}

fn default_token_url() -> String {
    crate::application_impl::GOOGLE_TOKEN_URL.to_string()
}

fn default_userinfo_url() -> String {
    crate::application_impl::GOOGLE_USERINFO_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "CARTOLA";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[auth]
backend = "fake"

[http]
backend = "fake"
base_url = "http://localhost:8080"

[log]
filter = "info"
"#;

    #[test]
    fn test_defaults_when_sections_missing() {
        let settings = parse_settings_str(MINIMAL).unwrap();
        assert_eq!(settings.gate.wait_window_ms, 10_000);
        assert_eq!(settings.gate.retry_attempts, 2);
        assert_eq!(settings.http.timeout_ms, 30_000);
        assert!(settings.directory.users.is_empty());
        assert!(settings.auth.google.is_none());
    }

    #[test]
    fn test_directory_rows() {
        let toml = format!(
            "{MINIMAL}\n{}",
            r#"
[[directory.users]]
email = "ana@example.com"
display_name = "Ana"
role = "admin"

[[directory.users]]
email = "bob@example.com"
display_name = "Bob"
active = false
"#
        );
        let settings = parse_settings_str(&toml).unwrap();
        let users = &settings.directory.users;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].role, "admin");
        assert_eq!(users[1].role, "player");
        assert!(!users[1].active);
    }

    #[test]
    fn test_google_urls_default() {
        let toml = MINIMAL.replace(
            "backend = \"fake\"\n\n[http]",
            "backend = \"google\"\n\n[auth.google]\nclient_id = \"id\"\nclient_secret = \"s\"\n\n[http]",
        );
        let settings = parse_settings_str(&toml).unwrap();
        let google = settings.auth.google.unwrap();
        assert_eq!(google.token_url, crate::application_impl::GOOGLE_TOKEN_URL);
        assert!(google.refresh_token.is_empty());
    }

    #[test]
    fn test_partial_gate_section_keeps_other_defaults() {
        let toml = format!("{MINIMAL}\n[gate]\nwait_window_ms = 2500\n");
        let settings = parse_settings_str(&toml).unwrap();
        assert_eq!(settings.gate.wait_window_ms, 2500);
        assert_eq!(settings.gate.renewal_timeout_ms, 10_000);
        assert_eq!(settings.gate.retry_attempts, 2);
        assert_eq!(settings.gate.retry_base_delay_ms, 500);
    }

    #[test]
    fn test_debug_output_hides_google_secrets() {
        let toml = MINIMAL.replace(
            "backend = \"fake\"\n\n[http]",
            "backend = \"google\"\n\n[auth.google]\nclient_id = \"id-123\"\nclient_secret = \"TOPSECRET\"\nrefresh_token = \"1//REFRESH\"\n\n[http]",
        );
        let settings = parse_settings_str(&toml).unwrap();
        let printed = format!("{:?}", settings);
        assert!(printed.contains("id-123"));
        assert!(!printed.contains("TOPSECRET"));
        assert!(!printed.contains("1//REFRESH"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(parse_settings(Some("")).is_err());
    }
}
