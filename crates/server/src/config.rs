use anyhow::Context;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND: &str = "0.0.0.0";
/// Matches the 32 MiB multipart limit uploads have always been held to.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `APP_BIND`, `APP_PORT` and `APP_MAX_UPLOAD_BYTES` from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            bind: lookup("APP_BIND")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.bind),
            port: parse_or(&lookup, "APP_PORT", defaults.port)?,
            max_upload_bytes: parse_or(&lookup, "APP_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.max_upload_bytes, 33_554_432);
    }

    #[test]
    fn reads_overrides() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[
            ("APP_PORT", "9000"),
            ("APP_BIND", "127.0.0.1"),
            ("APP_MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bind, "127.0.0.1");
        assert_eq!(cfg.max_upload_bytes, 1024);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("APP_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
