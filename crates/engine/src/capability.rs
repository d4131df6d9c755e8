//! Send/receive capabilities and pool features.
//!
//! A capability is probed by running the bare command with its flag and no
//! operands. The command always fails for lack of operands; only the text
//! decides, via [`classify_probe`]. Pool features are read from pool
//! properties and interpreted by [`pool_feature_enabled`].

use std::fmt;

use crate::signatures::{UNSUPPORTED_OPTION, has_signature};

/// Which side of a transfer a capability belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// `zfs send`.
    Send,
    /// `zfs receive`.
    Receive,
}

impl Direction {
    /// Subcommand name.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
        }
    }
}

/// An optional send or receive flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// `send -L`: records larger than 128 KiB.
    SendLargeBlocks,
    /// `send -e`: embedded data blocks.
    SendEmbedded,
    /// `send -c`: compressed blocks as stored.
    SendCompressed,
    /// `send -R`: replication stream package.
    SendReplicationPackage,
    /// `send -t`: resume from a token.
    SendResumeToken,
    /// `receive -s`: save partial state for resuming.
    ReceiveResumable,
}

impl Capability {
    /// Every capability, in probe order.
    pub const ALL: [Self; 6] = [
        Self::SendLargeBlocks,
        Self::SendEmbedded,
        Self::SendCompressed,
        Self::SendReplicationPackage,
        Self::SendResumeToken,
        Self::ReceiveResumable,
    ];

    /// The command line flag.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::SendLargeBlocks => "-L",
            Self::SendEmbedded => "-e",
            Self::SendCompressed => "-c",
            Self::SendReplicationPackage => "-R",
            Self::SendResumeToken => "-t",
            Self::ReceiveResumable => "-s",
        }
    }

    /// The subcommand the flag belongs to.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::ReceiveResumable => Direction::Receive,
            _ => Direction::Send,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction().verb(), self.flag())
    }
}

/// A pool feature that gates a send flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum PoolFeature {
    /// `feature@large_blocks`.
    LargeBlocks,
    /// `feature@embedded_data`.
    EmbeddedData,
}

impl PoolFeature {
    /// Pool property holding the feature state.
    #[must_use]
    pub const fn property(self) -> &'static str {
        match self {
            Self::LargeBlocks => "feature@large_blocks",
            Self::EmbeddedData => "feature@embedded_data",
        }
    }
}

/// Interprets the output of a capability probe.
///
/// Only a recognized unsupported-option message means "unsupported"; any
/// other output, success included, means the flag is understood.
#[must_use]
pub fn classify_probe(output: &str) -> bool {
    !has_signature(output, UNSUPPORTED_OPTION)
}

/// Interprets a pool feature property value.
#[must_use]
pub fn pool_feature_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("enabled" | "active"))
}

/// Probe and pool results that decide the transfer flags of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NegotiationInputs {
    /// Source understands `send -L`.
    pub source_large_blocks: bool,
    /// Source understands `send -e`.
    pub source_embedded: bool,
    /// Source understands `send -c`.
    pub source_compressed: bool,
    /// Source understands `send -R`.
    pub source_replication_package: bool,
    /// Destination understands `receive -s`.
    pub destination_resumable: bool,
    /// Destination pool has `large_blocks`.
    pub destination_pool_large_blocks: bool,
    /// Source pool has `embedded_data`.
    pub source_pool_embedded: bool,
    /// Destination pool has `embedded_data`.
    pub destination_pool_embedded: bool,
}

/// Transfer flags agreed for a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TransferFeatures {
    /// Send with `-L`.
    pub large_blocks: bool,
    /// Send with `-e`.
    pub embedded: bool,
    /// Send with `-c`.
    pub compressed: bool,
    /// Send with `-p`.
    pub properties: bool,
    /// Receive with `-s`.
    pub resumable_receive: bool,
    /// Replication stream packages (`send -R`) are available.
    pub stream_package: bool,
}

impl TransferFeatures {
    /// Combines probe and pool results into the flags to use.
    #[must_use]
    pub const fn negotiate(inputs: &NegotiationInputs) -> Self {
        Self {
            large_blocks: inputs.source_large_blocks && inputs.destination_pool_large_blocks,
            embedded: inputs.source_embedded
                && inputs.source_pool_embedded
                && inputs.destination_pool_embedded,
            compressed: inputs.source_compressed,
            properties: true,
            resumable_receive: inputs.destination_resumable,
            stream_package: inputs.source_replication_package,
        }
    }
}
