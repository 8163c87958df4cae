use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wattwise_analytics::Tariff;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub tariff: Tariff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}

fn default_api_port() -> u16 {
    8080
}

/// Where readings come from. `fixture_path` takes precedence over `base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        let mut cfg: Self = serde_yaml::from_str(&expanded)?;

        // Optional: allow WATTWISE_UPSTREAM_URL env to override whatever YAML had
        if let Ok(url) = std::env::var("WATTWISE_UPSTREAM_URL") {
            cfg.upstream.base_url = Some(url);
        }

        Ok(cfg)
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let close = match it.peek().copied() {
            Some('$') => {
                // Escape "$$" -> "$"
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };
        it.next();
        let var = read_until(&mut it, close)
            .with_context(|| format!("unterminated env placeholder: missing '{}'", close))?;
        let val = std::env::var(&var)
            .with_context(|| format!("missing environment variable: {}", var))?;
        out.push_str(&val);
    }

    Ok(out)
}

/// Read characters until we hit `end`, returning the collected string.
fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_expand_placeholders() {
        std::env::set_var("WATTWISE_TEST_HOST", "readings.local");
        let raw = "a: $(WATTWISE_TEST_HOST)\nb: ${WATTWISE_TEST_HOST}\nc: $$5 $x";
        let out = expand_env_placeholders(raw).unwrap();
        assert_eq!(out, "a: readings.local\nb: readings.local\nc: $5 $x");
        std::env::remove_var("WATTWISE_TEST_HOST");
    }

    #[test]
    #[serial]
    fn test_missing_variable_is_an_error() {
        std::env::remove_var("WATTWISE_TEST_MISSING");
        assert!(expand_env_placeholders("url: ${WATTWISE_TEST_MISSING}").is_err());
        assert!(expand_env_placeholders("url: ${WATTWISE_TEST_MISSING").is_err());
    }

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var("WATTWISE_UPSTREAM_URL");
        let cfg = Config::from_yaml("upstream:\n  base_url: http://127.0.0.1:5000\n").unwrap();

        assert_eq!(cfg.api.host, "0.0.0.0");
        assert_eq!(cfg.api.port, 8080);
        assert_eq!(cfg.upstream.timeout_secs, 10);
        assert_eq!(cfg.upstream.fixture_path, None);
        assert_eq!(cfg.tariff, Tariff::default());
    }

    #[test]
    #[serial]
    fn test_upstream_url_env_override() {
        std::env::set_var("WATTWISE_UPSTREAM_URL", "http://override:5000");
        let cfg = Config::from_yaml("upstream:\n  base_url: http://127.0.0.1:5000\n").unwrap();
        std::env::remove_var("WATTWISE_UPSTREAM_URL");

        assert_eq!(cfg.upstream.base_url.as_deref(), Some("http://override:5000"));
    }
}
