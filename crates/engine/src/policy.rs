//! Replication policy.

/// What the user allowed a run to do.
///
/// Built once from the command line and never changed afterwards. As with
/// rsync, requesting `delete_before` or `delete_excluded` implies `delete`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReplicationPolicy {
    delete: bool,
    delete_before: bool,
    delete_excluded: bool,
    no_mount: bool,
    recursive: bool,
    dry_run: bool,
}

impl ReplicationPolicy {
    /// Creates a [`ReplicationPolicyBuilder`].
    #[must_use]
    pub const fn builder() -> ReplicationPolicyBuilder {
        ReplicationPolicyBuilder {
            policy: Self {
                delete: false,
                delete_before: false,
                delete_excluded: false,
                no_mount: false,
                recursive: false,
                dry_run: false,
            },
        }
    }

    /// Destination snapshots absent from the source may be destroyed.
    #[must_use]
    pub const fn delete(&self) -> bool {
        self.delete
    }

    /// Deletions happen before transfers instead of after.
    #[must_use]
    pub const fn delete_before(&self) -> bool {
        self.delete_before
    }

    /// Snapshots excluded by the filter are eligible for deletion too.
    #[must_use]
    pub const fn delete_excluded(&self) -> bool {
        self.delete_excluded
    }

    /// Received datasets are not mounted.
    #[must_use]
    pub const fn no_mount(&self) -> bool {
        self.no_mount
    }

    /// Descendant datasets are replicated as well.
    #[must_use]
    pub const fn recursive(&self) -> bool {
        self.recursive
    }

    /// Only query and report; nothing is transmitted or destroyed.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for [`ReplicationPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplicationPolicyBuilder {
    policy: ReplicationPolicy,
}

impl ReplicationPolicyBuilder {
    /// Enables or disables deletion of destination-only snapshots.
    #[must_use]
    #[doc(alias = "--delete")]
    pub const fn delete(mut self, enabled: bool) -> Self {
        self.policy.delete = enabled;
        self
    }

    /// Deletes destination-only snapshots before transferring.
    #[must_use]
    #[doc(alias = "--delete-before")]
    pub const fn delete_before(mut self, enabled: bool) -> Self {
        self.policy.delete_before = enabled;
        self
    }

    /// Lets deletion reach snapshots that the filter excludes.
    #[must_use]
    #[doc(alias = "--delete-excluded")]
    pub const fn delete_excluded(mut self, enabled: bool) -> Self {
        self.policy.delete_excluded = enabled;
        self
    }

    /// Receives datasets without mounting them.
    #[must_use]
    #[doc(alias = "--no-mount")]
    pub const fn no_mount(mut self, enabled: bool) -> Self {
        self.policy.no_mount = enabled;
        self
    }

    /// Replicates descendant datasets.
    #[must_use]
    #[doc(alias = "--recursive")]
    pub const fn recursive(mut self, enabled: bool) -> Self {
        self.policy.recursive = enabled;
        self
    }

    /// Only reports what would happen.
    #[must_use]
    #[doc(alias = "--dry-run")]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.policy.dry_run = enabled;
        self
    }

    /// Finalizes the policy, applying the implied `delete`.
    #[must_use]
    pub const fn build(self) -> ReplicationPolicy {
        let mut policy = self.policy;
        if policy.delete_before || policy.delete_excluded {
            policy.delete = true;
        }
        policy
    }
}
