//! Dataset identity.

use std::fmt;

use thiserror::Error;

/// A dataset on a (possibly remote) host.
///
/// The host is a `user@host` label understood by the transport, or empty for
/// the local machine. The path is a ZFS dataset name such as `tank/a/b`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Dataset {
    host: String,
    path: String,
}

/// Reasons a dataset name is rejected.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DatasetError {
    /// The dataset name was empty.
    #[error("dataset name is empty")]
    Empty,
    /// The name started or ended with `/` or contained `//`.
    #[error("dataset name '{0}' has an empty component")]
    EmptyComponent(String),
    /// The name referred to a snapshot rather than a dataset.
    #[error("dataset name '{0}' must not contain '@'")]
    SnapshotName(String),
    /// The name contained a control character.
    #[error("dataset name '{0}' contains a control character")]
    ControlCharacter(String),
}

impl Dataset {
    /// Validates `path` and pairs it with `host`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when `path` is not a well-formed dataset name.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Result<Self, DatasetError> {
        let path = path.into();
        validate(&path)?;
        Ok(Self {
            host: host.into(),
            path,
        })
    }

    /// Validates `path` as a dataset on the local machine.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when `path` is not a well-formed dataset name.
    pub fn local(path: impl Into<String>) -> Result<Self, DatasetError> {
        Self::new(String::new(), path)
    }

    /// Returns the host label, empty when local.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the dataset name.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` when the dataset is on the local machine.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }

    /// Returns the pool, the first component of the name.
    #[must_use]
    pub fn pool(&self) -> &str {
        self.path.split('/').next().unwrap_or(&self.path)
    }

    /// Returns the parent dataset, or `None` for a pool root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (parent, _) = self.path.rsplit_once('/')?;
        Some(Self {
            host: self.host.clone(),
            path: parent.to_owned(),
        })
    }

    /// Returns this dataset followed by every ancestor up to the pool root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    /// Appends a relative name below this dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the combined name is malformed.
    pub fn join(&self, relative: &str) -> Result<Self, DatasetError> {
        if relative.is_empty() {
            return Ok(self.clone());
        }
        Self::new(self.host.clone(), format!("{}/{relative}", self.path))
    }

    /// Returns the part of this name below `root`, or `None` when this dataset
    /// is not `root` or one of its descendants. The root itself yields `""`.
    #[must_use]
    pub fn relative_to(&self, root: &Self) -> Option<&str> {
        if self.host != root.host {
            return None;
        }
        let rest = self.path.strip_prefix(root.path.as_str())?;
        if rest.is_empty() {
            return Some(rest);
        }
        rest.strip_prefix('/')
    }

    /// Returns the full name of snapshot `name` of this dataset.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> String {
        format!("{}@{name}", self.path)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}:{}", self.host, self.path)
        }
    }
}

fn validate(path: &str) -> Result<(), DatasetError> {
    if path.is_empty() {
        return Err(DatasetError::Empty);
    }
    if path.split('/').any(str::is_empty) {
        return Err(DatasetError::EmptyComponent(path.to_owned()));
    }
    if path.contains('@') {
        return Err(DatasetError::SnapshotName(path.to_owned()));
    }
    if path.chars().any(char::is_control) {
        return Err(DatasetError::ControlCharacter(path.escape_debug().to_string()));
    }
    Ok(())
}
