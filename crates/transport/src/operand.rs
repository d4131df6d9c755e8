//! Endpoint operand parsing.
//!
//! Operands take the form `[user@]host:dataset` for remote datasets and plain
//! `dataset` for local ones. A colon only introduces a host when it appears
//! before the first `/`, so local dataset names containing colons further down
//! the hierarchy stay local. IPv6 hosts are written in brackets
//! (`[::1]:tank/data`).

use std::fmt;

use thiserror::Error;

/// Host component of a remote endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RemoteHost {
    user: Option<String>,
    host: String,
}

impl RemoteHost {
    /// Creates a host with an optional login name.
    #[must_use]
    pub fn new(user: Option<String>, host: impl Into<String>) -> Self {
        Self {
            user,
            host: host.into(),
        }
    }

    /// Parses a `user@host` or `host` label as rendered by [`fmt::Display`].
    ///
    /// Returns `None` for the empty label, which denotes the local machine.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        if label.is_empty() {
            return None;
        }
        match label.rsplit_once('@') {
            Some((user, host)) if !user.is_empty() => {
                Some(Self::new(Some(user.to_owned()), host))
            }
            _ => Some(Self::new(None, label)),
        }
    }

    /// Returns the login name, if present.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the hostname or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{user}@{}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// A parsed source or destination operand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    remote: Option<RemoteHost>,
    path: String,
}

impl Endpoint {
    /// Endpoint on the local machine.
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            remote: None,
            path: path.into(),
        }
    }

    /// Endpoint reached through the remote shell.
    #[must_use]
    pub fn remote(host: RemoteHost, path: impl Into<String>) -> Self {
        Self {
            remote: Some(host),
            path: path.into(),
        }
    }

    /// Returns the remote host, or `None` for local endpoints.
    #[must_use]
    pub const fn remote_host(&self) -> Option<&RemoteHost> {
        self.remote.as_ref()
    }

    /// Returns `true` when the endpoint lives on the local machine.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.remote.is_none()
    }

    /// Returns the dataset path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Renders the host as `user@host`, `host`, or the empty string when local.
    #[must_use]
    pub fn host_label(&self) -> String {
        self.remote
            .as_ref()
            .map_or_else(String::new, ToString::to_string)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote {
            Some(host) if host.host().contains(':') => match host.user() {
                Some(user) => write!(f, "{user}@[{}]:{}", host.host(), self.path),
                None => write!(f, "[{}]:{}", host.host(), self.path),
            },
            Some(host) => write!(f, "{host}:{}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// Errors produced while parsing an endpoint operand.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EndpointParseError {
    /// The operand string was empty.
    #[error("endpoint operand is empty")]
    Empty,
    /// A host prefix was present but the host itself was empty.
    #[error("missing host in endpoint '{0}'")]
    MissingHost(String),
    /// The dataset part after the host was empty.
    #[error("missing dataset in endpoint '{0}'")]
    MissingPath(String),
    /// A bracketed IPv6 host was not terminated or not followed by `:`.
    #[error("malformed bracketed host in endpoint '{0}'")]
    MalformedBracket(String),
}

/// Parses a `[user@]host:dataset` or `dataset` operand.
///
/// # Errors
///
/// Returns [`EndpointParseError`] when the operand is empty, names an empty
/// host or dataset, or contains an unterminated IPv6 bracket.
pub fn parse_endpoint(text: &str) -> Result<Endpoint, EndpointParseError> {
    if text.is_empty() {
        return Err(EndpointParseError::Empty);
    }

    if !has_host_prefix(text) {
        return Ok(Endpoint::local(text));
    }

    let (user, rest) = extract_user(text);
    let (host, path) = extract_host_and_path(rest)
        .ok_or_else(|| EndpointParseError::MalformedBracket(text.to_owned()))?;

    if host.is_empty() || user.is_some_and(str::is_empty) {
        return Err(EndpointParseError::MissingHost(text.to_owned()));
    }
    if path.is_empty() {
        return Err(EndpointParseError::MissingPath(text.to_owned()));
    }

    Ok(Endpoint::remote(
        RemoteHost::new(user.map(str::to_owned), host),
        path,
    ))
}

fn has_host_prefix(text: &str) -> bool {
    if text.starts_with('[') || text.contains("@[") {
        return true;
    }
    match (text.find(':'), text.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn extract_user(text: &str) -> (Option<&str>, &str) {
    let boundary = text.find('[').or_else(|| text.find(':'));
    if let Some(boundary) = boundary
        && let Some(at) = text[..boundary].rfind('@')
    {
        return (Some(&text[..at]), &text[at + 1..]);
    }
    (None, text)
}

fn extract_host_and_path(text: &str) -> Option<(&str, &str)> {
    if let Some(bracketed) = text.strip_prefix('[') {
        let close = bracketed.find(']')?;
        let path = bracketed[close + 1..].strip_prefix(':')?;
        return Some((&bracketed[..close], path));
    }
    text.split_once(':')
}
