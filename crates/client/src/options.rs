//! Per-step send and receive flags.

use engine::capability::TransferFeatures;
use engine::{EncryptionRules, ReplicationPolicy, TransferStep};

use crate::config::PropertyOverride;
use crate::repository::{ReceiveOptions, SendOptions};

/// Everything that decides the flags of a transfer, apart from the step.
#[derive(Clone, Debug, Default)]
pub struct OptionSet {
    features: TransferFeatures,
    no_mount: bool,
    overrides: Vec<(String, String)>,
    excludes: Vec<String>,
}

impl OptionSet {
    /// Combines negotiated features with the user's options.
    #[must_use]
    pub fn new(
        features: TransferFeatures,
        policy: &ReplicationPolicy,
        overrides: &[PropertyOverride],
        excludes: &[String],
    ) -> Self {
        Self {
            features,
            no_mount: policy.no_mount(),
            overrides: overrides.iter().cloned().map(PropertyOverride::into_pair).collect(),
            excludes: excludes.to_vec(),
        }
    }

    /// Returns the negotiated features.
    #[must_use]
    pub const fn features(&self) -> &TransferFeatures {
        &self.features
    }

    /// Sending flags for `step` under `rules`.
    #[must_use]
    pub const fn send_options(&self, rules: &EncryptionRules, step: &TransferStep) -> SendOptions {
        SendOptions {
            large_blocks: self.features.large_blocks,
            embedded: self.features.embedded && !rules.strip_embedded,
            compressed: self.features.compressed,
            properties: self.features.properties && !rules.strip_properties,
            replicate: step.whole_stream,
        }
    }

    /// Receiving flags for `step` under `rules`.
    ///
    /// A full receive into a dataset that already exists needs `-F`, as does
    /// every stream package. User overrides win over re-applied source
    /// properties, and nothing that is excluded is also set.
    #[must_use]
    pub fn receive_options(
        &self,
        rules: &EncryptionRules,
        step: &TransferStep,
        destination_exists: bool,
    ) -> ReceiveOptions {
        let mut excludes = self.excludes.clone();
        if step.is_initial() {
            for name in &rules.initial_receive_excludes {
                if !excludes.contains(name) {
                    excludes.push(name.clone());
                }
            }
        }

        let mut overrides: Vec<(String, String)> = Vec::new();
        for (name, value) in rules.receive_overrides.iter().chain(&self.overrides) {
            if excludes.contains(name) {
                continue;
            }
            match overrides.iter_mut().find(|(existing, _)| existing == name) {
                Some(entry) => entry.1.clone_from(value),
                None => overrides.push((name.clone(), value.clone())),
            }
        }

        ReceiveOptions {
            force: step.whole_stream || (step.is_initial() && destination_exists),
            resumable: self.features.resumable_receive,
            no_mount: self.no_mount,
            excludes,
            overrides,
        }
    }

    /// Receiving flags for continuing an interrupted receive.
    ///
    /// The resumed stream already carries the original receive's settings,
    /// so only state-keeping and mount behaviour are passed.
    #[must_use]
    pub const fn resume_receive_options(&self) -> ReceiveOptions {
        ReceiveOptions {
            force: false,
            resumable: self.features.resumable_receive,
            no_mount: self.no_mount,
            excludes: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::EncryptionContext;
    use std::collections::BTreeMap;

    fn all_features() -> TransferFeatures {
        TransferFeatures {
            large_blocks: true,
            embedded: true,
            compressed: true,
            properties: true,
            resumable_receive: true,
            stream_package: true,
        }
    }

    fn step(from: Option<&str>, whole_stream: bool) -> TransferStep {
        TransferStep {
            from: from.map(str::to_owned),
            to: "s2".to_owned(),
            whole_stream,
        }
    }

    fn rules(source_encrypted: bool, destination_encrypted: bool) -> EncryptionRules {
        let context = EncryptionContext {
            source_encrypted,
            destination_encrypted,
            source_local_properties: BTreeMap::from([
                ("compression".to_owned(), "lz4".to_owned()),
                ("keylocation".to_owned(), "prompt".to_owned()),
                ("recordsize".to_owned(), "1M".to_owned()),
            ]),
        };
        EncryptionRules::evaluate(&context, "tank/a", "backup/a").expect("rules")
    }

    #[test]
    fn plain_pair_keeps_every_feature() {
        let options = OptionSet::new(all_features(), &ReplicationPolicy::default(), &[], &[]);
        let send = options.send_options(&rules(false, false), &step(Some("s1"), false));
        assert_eq!(
            send,
            SendOptions {
                large_blocks: true,
                embedded: true,
                compressed: true,
                properties: true,
                replicate: false,
            }
        );

        let receive = options.receive_options(&rules(false, false), &step(Some("s1"), false), true);
        assert!(!receive.force);
        assert!(receive.resumable);
        assert!(receive.excludes.is_empty());
    }

    #[test]
    fn encrypted_pair_strips_flags_and_reapplies_properties() {
        let options = OptionSet::new(all_features(), &ReplicationPolicy::default(), &[], &[]);
        let rules = rules(true, true);
        let send = options.send_options(&rules, &step(None, false));
        assert!(!send.embedded);
        assert!(!send.properties);
        assert!(send.compressed);

        let receive = options.receive_options(&rules, &step(None, false), false);
        assert_eq!(
            receive.overrides,
            [
                ("compression".to_owned(), "lz4".to_owned()),
                ("recordsize".to_owned(), "1M".to_owned()),
            ]
        );
    }

    #[test]
    fn plain_into_encrypted_excludes_encryption_only_initially() {
        let options = OptionSet::new(all_features(), &ReplicationPolicy::default(), &[], &[]);
        let rules = rules(false, true);

        let initial = options.receive_options(&rules, &step(None, false), false);
        assert_eq!(initial.excludes, ["encryption"]);
        assert!(!initial.force);

        let incremental = options.receive_options(&rules, &step(Some("s1"), false), true);
        assert!(incremental.excludes.is_empty());
        assert!(!options.send_options(&rules, &step(Some("s1"), false)).embedded);
    }

    #[test]
    fn whole_stream_and_existing_destination_force() {
        let options = OptionSet::new(all_features(), &ReplicationPolicy::default(), &[], &[]);
        let rules = rules(false, false);
        assert!(options.receive_options(&rules, &step(Some("s1"), true), true).force);
        assert!(options.receive_options(&rules, &step(None, false), true).force);
        assert!(!options.receive_options(&rules, &step(None, false), false).force);
        assert!(options.send_options(&rules, &step(Some("s1"), true)).replicate);
    }

    #[test]
    fn user_properties_override_and_exclusions_win() {
        let overrides = [
            "compression=zstd".parse::<PropertyOverride>().expect("override"),
            "atime=off".parse::<PropertyOverride>().expect("override"),
        ];
        let excludes = ["recordsize".to_owned()];
        let policy = ReplicationPolicy::builder().no_mount(true).build();
        let options = OptionSet::new(all_features(), &policy, &overrides, &excludes);

        let receive = options.receive_options(&rules(true, true), &step(Some("s1"), false), true);
        assert_eq!(
            receive.overrides,
            [
                ("compression".to_owned(), "zstd".to_owned()),
                ("atime".to_owned(), "off".to_owned()),
            ]
        );
        assert_eq!(receive.excludes, ["recordsize"]);
        assert!(receive.no_mount);
    }

    #[test]
    fn resume_receive_carries_no_properties() {
        let overrides = ["atime=off".parse::<PropertyOverride>().expect("override")];
        let options = OptionSet::new(all_features(), &ReplicationPolicy::default(), &overrides, &[]);
        let receive = options.resume_receive_options();
        assert!(receive.resumable);
        assert!(receive.overrides.is_empty());
        assert!(!receive.force);
    }
}
