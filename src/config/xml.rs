//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Renders the effective settings back to XML for `print-config`.
//!
//! Notes:
//! - A missing file means "use defaults"; an unreadable or malformed one is an error.
//! - Unknown XML fields are rejected to surface typos early.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    max_attempts: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    retry_delay_ms: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    timeout_secs: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    buffer_size: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    secure_passes: Option<u64>,
    preserve_metadata: Option<bool>,
    temp_prefix: Option<String>,
}

// Numbers may be surrounded by whitespace in hand-edited files; garbage is an error.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{s}': {e}"))),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn to_u32(field: &str, v: u64) -> Result<u32> {
    u32::try_from(v).with_context(|| format!("{field} out of range: {v}"))
}

// Map XmlConfig -> Config on top of the defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = non_empty(parsed.log_file).map(PathBuf::from);
    if let Some(n) = parsed.max_attempts {
        cfg.max_attempts = to_u32("max_attempts", n)?;
    }
    if let Some(ms) = parsed.retry_delay_ms {
        cfg.retry_delay = Duration::from_millis(ms);
    }
    cfg.timeout = parsed.timeout_secs.map(Duration::from_secs);
    if let Some(n) = parsed.buffer_size {
        cfg.buffer_size = usize::try_from(n).with_context(|| format!("buffer_size out of range: {n}"))?;
    }
    if let Some(n) = parsed.secure_passes {
        cfg.secure_passes = to_u32("secure_passes", n)?;
    }
    if let Some(b) = parsed.preserve_metadata {
        cfg.preserve_metadata = b;
    }
    if let Some(p) = non_empty(parsed.temp_prefix) {
        cfg.temp_prefix = p;
    }
    Ok(cfg)
}

/// Parse config XML text into a validated Config.
pub fn parse_config_xml(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;
    let cfg = xml_to_config(parsed)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_config_xml(&contents).with_context(|| format!("load config '{}'", path.display()))
}

/// Load the config from `$SAFE_FILEOPS_CONFIG` or the default location.
/// Returns the path used when a file was actually read.
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let Some(path) = default_config_path() else {
        debug!("no config location available; using defaults");
        return Ok((Config::default(), None));
    };
    if !path.exists() {
        debug!(path = %path.display(), "config file not found; using defaults");
        return Ok((Config::default(), None));
    }
    if path.is_dir() {
        bail!("config path is a directory: {}", path.display());
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "loaded config");
    Ok((cfg, Some(path)))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Render `cfg` as a config.xml document that [`parse_config_xml`] accepts.
pub fn render_config_xml(cfg: &Config) -> String {
    let mut out = String::from("<config>\n");
    out.push_str(&format!("  <log_level>{}</log_level>\n", cfg.log_level));
    if let Some(p) = &cfg.log_file {
        out.push_str(&format!("  <log_file>{}</log_file>\n", escape(&p.display().to_string())));
    }
    out.push_str(&format!("  <max_attempts>{}</max_attempts>\n", cfg.max_attempts));
    out.push_str(&format!("  <retry_delay_ms>{}</retry_delay_ms>\n", cfg.retry_delay.as_millis()));
    if let Some(t) = cfg.timeout {
        out.push_str(&format!("  <timeout_secs>{}</timeout_secs>\n", t.as_secs()));
    }
    out.push_str(&format!("  <buffer_size>{}</buffer_size>\n", cfg.buffer_size));
    out.push_str(&format!("  <secure_passes>{}</secure_passes>\n", cfg.secure_passes));
    out.push_str(&format!("  <preserve_metadata>{}</preserve_metadata>\n", cfg.preserve_metadata));
    out.push_str(&format!("  <temp_prefix>{}</temp_prefix>\n", escape(&cfg.temp_prefix)));
    out.push_str("</config>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let cfg = parse_config_xml(
            "<config>\n  <max_attempts> 5 </max_attempts>\n  <log_level>debug</log_level>\n</config>",
        )
        .unwrap();
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.buffer_size, Config::default().buffer_size);
        assert_eq!(cfg.timeout, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_config_xml("<config><download_base>/x</download_base></config>").unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"), "{err:#}");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse_config_xml("<config><max_attempts>many</max_attempts></config>").is_err());
        assert!(parse_config_xml("<config><log_level>loud</log_level></config>").is_err());
        assert!(parse_config_xml("<config><buffer_size>0</buffer_size></config>").is_err());
    }

    #[test]
    fn rendered_config_parses_back() {
        let cfg = Config {
            log_file: Some(PathBuf::from("/var/log/a&b.log")),
            timeout: Some(Duration::from_secs(30)),
            retry_delay: Duration::from_millis(250),
            preserve_metadata: false,
            ..Default::default()
        };
        assert_eq!(parse_config_xml(&render_config_xml(&cfg)).unwrap(), cfg);
    }
}
