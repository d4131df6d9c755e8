//! Replication configuration and its builder.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::str::FromStr;

use engine::{Dataset, ReplicationPolicy};
use filters::SnapshotFilter;
use transport::ssh::parse_remote_shell;
use transport::{CommandError, Endpoint};

use crate::error::ClientError;

/// A `NAME=VALUE` property applied to received datasets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyOverride {
    name: String,
    value: String,
}

impl PropertyOverride {
    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Splits into `(name, value)`.
    #[must_use]
    pub fn into_pair(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl FromStr for PropertyOverride {
    type Err = ClientError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ClientError::InvalidPropertyOverride(text.to_owned());
        let (name, value) = text.split_once('=').ok_or_else(invalid)?;
        if !is_property_name(name) {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl fmt::Display for PropertyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Property names are lower-case words, optionally with a `module:` prefix
/// for user properties.
fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '@'))
}

/// Configuration describing one replication run.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    source: Option<Endpoint>,
    destination: Option<Endpoint>,
    policy: ReplicationPolicy,
    filter: Option<SnapshotFilter>,
    property_overrides: Vec<PropertyOverride>,
    property_excludes: Vec<String>,
    remote_shell: Option<OsString>,
}

impl ClientConfig {
    /// Returns a builder with every option at its default.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the source endpoint.
    #[must_use]
    pub const fn source(&self) -> Option<&Endpoint> {
        self.source.as_ref()
    }

    /// Returns the destination endpoint.
    #[must_use]
    pub const fn destination(&self) -> Option<&Endpoint> {
        self.destination.as_ref()
    }

    /// Returns the replication policy.
    #[must_use]
    pub const fn policy(&self) -> &ReplicationPolicy {
        &self.policy
    }

    /// Returns the snapshot filter, if any.
    #[must_use]
    pub const fn filter(&self) -> Option<&SnapshotFilter> {
        self.filter.as_ref()
    }

    /// Returns the `-o` properties set on every receive.
    #[must_use]
    pub fn property_overrides(&self) -> &[PropertyOverride] {
        &self.property_overrides
    }

    /// Returns the `-x` properties excluded on every receive.
    #[must_use]
    pub fn property_excludes(&self) -> &[String] {
        &self.property_excludes
    }

    /// Returns the remote shell specification, if one was given.
    #[must_use]
    pub fn remote_shell(&self) -> Option<&OsStr> {
        self.remote_shell.as_deref()
    }

    /// Returns the source dataset.
    ///
    /// # Errors
    ///
    /// Fails when no source was given or its name is malformed.
    pub fn source_dataset(&self) -> Result<Dataset, ClientError> {
        endpoint_dataset(self.source.as_ref(), "source")
    }

    /// Returns the destination dataset.
    ///
    /// # Errors
    ///
    /// Fails when no destination was given or its name is malformed.
    pub fn destination_dataset(&self) -> Result<Dataset, ClientError> {
        endpoint_dataset(self.destination.as_ref(), "destination")
    }

    /// Checks the configuration before anything is queried or changed.
    ///
    /// # Errors
    ///
    /// Returns a configuration [`ClientError`] when an operand is missing or
    /// malformed, both operands name the same dataset, a recursive run would
    /// receive into its own source tree, a property option is malformed, or
    /// the remote shell cannot be split into words.
    pub fn validate(&self) -> Result<(), ClientError> {
        let source = self.source_dataset()?;
        let destination = self.destination_dataset()?;

        if source == destination {
            return Err(ClientError::SameDataset(source.to_string()));
        }
        if self.policy.recursive() && destination.relative_to(&source).is_some() {
            return Err(ClientError::NestedDestination {
                source_dataset: source.to_string(),
                destination: destination.to_string(),
            });
        }

        if let Some(exclude) = self
            .property_excludes
            .iter()
            .find(|name| !is_property_name(name))
        {
            return Err(ClientError::InvalidPropertyExclude(exclude.clone()));
        }

        if let Some(shell) = &self.remote_shell {
            parse_remote_shell(shell)
                .map_err(|error| ClientError::RemoteShell(CommandError::from(error)))?;
        }
        Ok(())
    }
}

fn endpoint_dataset(endpoint: Option<&Endpoint>, role: &'static str) -> Result<Dataset, ClientError> {
    let endpoint = endpoint.ok_or(ClientError::MissingOperand(role))?;
    Dataset::new(endpoint.host_label(), endpoint.path())
        .map_err(|source| ClientError::InvalidDataset { role, source })
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
    source: Option<Endpoint>,
    destination: Option<Endpoint>,
    policy: ReplicationPolicy,
    filter: Option<SnapshotFilter>,
    property_overrides: Vec<PropertyOverride>,
    property_excludes: Vec<String>,
    remote_shell: Option<OsString>,
}

impl ClientConfigBuilder {
    /// Sets the endpoint snapshots are replicated from.
    #[must_use]
    pub fn source(mut self, endpoint: Endpoint) -> Self {
        self.source = Some(endpoint);
        self
    }

    /// Sets the endpoint snapshots are replicated to.
    #[must_use]
    pub fn destination(mut self, endpoint: Endpoint) -> Self {
        self.destination = Some(endpoint);
        self
    }

    /// Sets the replication policy.
    #[must_use]
    pub const fn policy(mut self, policy: ReplicationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restricts which source snapshots are replicated.
    #[must_use]
    #[doc(alias = "--snapshot-filter")]
    pub fn filter(mut self, filter: Option<SnapshotFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Adds a property set on every received dataset.
    #[must_use]
    #[doc(alias = "--property")]
    #[doc(alias = "-o")]
    pub fn property_override(mut self, property: PropertyOverride) -> Self {
        self.property_overrides.push(property);
        self
    }

    /// Adds a property excluded from every receive.
    #[must_use]
    #[doc(alias = "--exclude-property")]
    #[doc(alias = "-x")]
    pub fn property_exclude(mut self, name: impl Into<String>) -> Self {
        self.property_excludes.push(name.into());
        self
    }

    /// Sets the program used to reach remote endpoints.
    #[must_use]
    #[doc(alias = "--rsh")]
    #[doc(alias = "-e")]
    pub fn remote_shell(mut self, spec: Option<OsString>) -> Self {
        self.remote_shell = spec;
        self
    }

    /// Finalises the configuration. Use [`ClientConfig::validate`] to check it.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            source: self.source,
            destination: self.destination,
            policy: self.policy,
            filter: self.filter,
            property_overrides: self.property_overrides,
            property_excludes: self.property_excludes,
            remote_shell: self.remote_shell,
        }
    }
}
