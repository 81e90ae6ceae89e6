//! # Proxy list loader.
//!
//! Reads the proxy list file into [`ProxyConfig`]s, one per meaningful line.
//!
//! ## Format
//! ```text
//! # comment lines begin with '#'
//! 8080:db.internal:5432
//! 2222:bastion:22        # trailing comments are allowed
//! ```
//!
//! ## Rules
//! - blank lines and `#` lines are skipped but still counted
//! - the 1-based line number is the unit's identity
//! - the first malformed line aborts the whole load with `path: line N: reason`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConfigError, ProxyParseError};
use crate::units::proxy::{ProxyConfig, ProxyUnit, Transport};
use crate::units::runner::ProcessRunner;
use crate::units::{UnitId, UnitRef};

/// Parsed proxy list, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyList {
    path: PathBuf,
    proxies: Vec<ProxyConfig>,
}

impl ProxyList {
    /// Reads and parses the proxy list at `path`.
    pub fn load(path: impl AsRef<Path>, transport: Transport) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| ConfigError::read(path, e))?;
        Self::parse_bytes(path, &content, transport)
    }

    /// Parses proxy list `content`; `path` is only used for error messages.
    pub fn parse(
        path: impl Into<PathBuf>,
        content: &str,
        transport: Transport,
    ) -> Result<Self, ConfigError> {
        Self::parse_bytes(path, content.as_bytes(), transport)
    }

    /// Like [`parse`](Self::parse), but decodes line by line so a line that is
    /// not UTF-8 is reported with its number.
    fn parse_bytes(
        path: impl Into<PathBuf>,
        content: &[u8],
        transport: Transport,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut proxies = Vec::new();

        for (idx, raw) in content.split(|b| *b == b'\n').enumerate() {
            let line_num = idx + 1;
            let line = std::str::from_utf8(strip_comment(raw))
                .map_err(|_| ConfigError::parse(&path, line_num, ProxyParseError::InvalidUtf8))?
                .trim();
            if line.is_empty() {
                continue;
            }
            let proxy = parse_proxy(line, UnitId::new(line_num), transport)
                .map_err(|reason| ConfigError::parse(&path, line_num, reason))?;
            proxies.push(proxy);
        }

        Ok(Self { path, proxies })
    }

    /// File the list was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of configured forwards.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Returns `true` when the list holds no forwards.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Iterates over the forwards in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ProxyConfig> {
        self.proxies.iter()
    }

    /// Turns every forward into a supervised unit sharing `runner`.
    pub fn into_units(self, runner: Arc<dyn ProcessRunner>) -> Vec<UnitRef> {
        self.proxies
            .into_iter()
            .map(|cfg| Arc::new(ProxyUnit::new(cfg, Arc::clone(&runner))) as UnitRef)
            .collect()
    }
}

/// Drops everything from the first `#` on.
fn strip_comment(raw: &[u8]) -> &[u8] {
    raw.split(|b| *b == b'#').next().unwrap_or_default()
}

/// Parses `<local_port>:<remote>:<remote_port>`.
pub fn parse_proxy(
    line: &str,
    id: UnitId,
    transport: Transport,
) -> Result<ProxyConfig, ProxyParseError> {
    let mut parts = line.split(':').map(str::trim);

    let local_port = parse_port(parts.next(), "local port")?;
    let remote = parts
        .next()
        .ok_or(ProxyParseError::MissingField("remote host"))?;
    if remote.is_empty() {
        return Err(ProxyParseError::EmptyRemote);
    }
    let remote_port = parse_port(parts.next(), "remote port")?;
    if parts.next().is_some() {
        return Err(ProxyParseError::TooManyFields);
    }

    Ok(ProxyConfig {
        id,
        transport,
        local_port,
        remote: remote.to_string(),
        remote_port,
    })
}

fn parse_port(field: Option<&str>, name: &'static str) -> Result<u16, ProxyParseError> {
    let raw = field.ok_or(ProxyParseError::MissingField(name))?;
    if raw.is_empty() {
        return Err(ProxyParseError::MissingField(name));
    }
    let invalid = || ProxyParseError::InvalidPort {
        field: name,
        value: raw.to_string(),
    };
    // `u16::from_str` would also take a leading '+'.
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<u16>().map_err(|_| invalid())
}
