//! Encryption boundary rules.
//!
//! | source | destination | effect |
//! |---|---|---|
//! | encrypted | plain | refused |
//! | encrypted | encrypted | no `-e`, no `-p`, local properties re-applied with `-o` |
//! | plain | encrypted | no `-e`, the initial receive adds `-x encryption` |
//! | plain | plain | unchanged |

use std::collections::BTreeMap;

use crate::error::PlanError;

/// Properties that carry the source's own key material or key handling and
/// must never be forced onto an encrypted destination.
const ENCRYPTION_PARAMETERS: &[&str] = &[
    "encryption",
    "keyformat",
    "keylocation",
    "pbkdf2iters",
    "pbkdf2salt",
    "encryptionroot",
];

/// Encryption state of one dataset pair.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EncryptionContext {
    /// The source dataset is encrypted.
    pub source_encrypted: bool,
    /// The destination dataset, or its nearest existing ancestor, is encrypted.
    pub destination_encrypted: bool,
    /// Properties set locally on the source dataset.
    pub source_local_properties: BTreeMap<String, String>,
}

impl EncryptionContext {
    /// Returns `true` when replication would drop encryption.
    #[must_use]
    pub const fn is_downgrade(&self) -> bool {
        self.source_encrypted && !self.destination_encrypted
    }
}

/// Option adjustments derived from an [`EncryptionContext`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EncryptionRules {
    /// Drop `-e` from sends.
    pub strip_embedded: bool,
    /// Drop `-p` from sends.
    pub strip_properties: bool,
    /// `name=value` pairs passed to every receive as `-o`.
    pub receive_overrides: Vec<(String, String)>,
    /// Properties passed as `-x` to the initial full receive only.
    pub initial_receive_excludes: Vec<String>,
}

impl EncryptionRules {
    /// Evaluates the rule table for `context`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EncryptionDowngrade`] for an encrypted source and
    /// an unencrypted destination. `source` and `destination` only label the
    /// error.
    pub fn evaluate(
        context: &EncryptionContext,
        source: &str,
        destination: &str,
    ) -> Result<Self, PlanError> {
        match (context.source_encrypted, context.destination_encrypted) {
            (true, false) => Err(PlanError::EncryptionDowngrade {
                source_dataset: source.to_owned(),
                destination: destination.to_owned(),
            }),
            (true, true) => Ok(Self {
                strip_embedded: true,
                strip_properties: true,
                receive_overrides: context
                    .source_local_properties
                    .iter()
                    .filter(|(name, value)| reapplicable(name, value))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                initial_receive_excludes: Vec::new(),
            }),
            (false, true) => Ok(Self {
                strip_embedded: true,
                strip_properties: false,
                receive_overrides: Vec::new(),
                initial_receive_excludes: vec!["encryption".to_owned()],
            }),
            (false, false) => Ok(Self::default()),
        }
    }
}

fn reapplicable(name: &str, value: &str) -> bool {
    if ENCRYPTION_PARAMETERS.contains(&name) {
        return false;
    }
    // Received filesystems default to canmount=on already.
    !(name == "canmount" && value == "on")
}

/// Interprets the value of the `encryption` property.
///
/// Missing values and `off` mean unencrypted; any cipher name means
/// encrypted.
#[must_use]
pub fn is_encrypted(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.is_empty() && value != "off" && value != "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(source: bool, destination: bool) -> EncryptionContext {
        EncryptionContext {
            source_encrypted: source,
            destination_encrypted: destination,
            source_local_properties: BTreeMap::from([
                ("compression".to_owned(), "lz4".to_owned()),
                ("canmount".to_owned(), "on".to_owned()),
                ("keylocation".to_owned(), "prompt".to_owned()),
                ("encryption".to_owned(), "aes-256-gcm".to_owned()),
                ("recordsize".to_owned(), "1048576".to_owned()),
            ]),
        }
    }

    #[test]
    fn downgrade_is_refused() {
        let error = EncryptionRules::evaluate(&context(true, false), "tank/a", "backup/a")
            .expect_err("downgrade");
        assert_eq!(
            error,
            PlanError::EncryptionDowngrade {
                source_dataset: "tank/a".to_owned(),
                destination: "backup/a".to_owned(),
            }
        );
    }

    #[test]
    fn encrypted_pair_reapplies_local_properties() {
        let rules =
            EncryptionRules::evaluate(&context(true, true), "tank/a", "backup/a").expect("rules");
        assert!(rules.strip_embedded);
        assert!(rules.strip_properties);
        assert_eq!(
            rules.receive_overrides,
            vec![
                ("compression".to_owned(), "lz4".to_owned()),
                ("recordsize".to_owned(), "1048576".to_owned()),
            ]
        );
        assert!(rules.initial_receive_excludes.is_empty());
    }

    #[test]
    fn canmount_other_than_on_is_reapplied() {
        let mut context = context(true, true);
        context
            .source_local_properties
            .insert("canmount".to_owned(), "noauto".to_owned());
        let rules = EncryptionRules::evaluate(&context, "a", "b").expect("rules");
        assert!(
            rules
                .receive_overrides
                .contains(&("canmount".to_owned(), "noauto".to_owned()))
        );
    }

    #[test]
    fn plaintext_into_encrypted_excludes_encryption_on_initial_receive() {
        let rules = EncryptionRules::evaluate(&context(false, true), "a", "b").expect("rules");
        assert!(rules.strip_embedded);
        assert!(!rules.strip_properties);
        assert!(rules.receive_overrides.is_empty());
        assert_eq!(rules.initial_receive_excludes, vec!["encryption".to_owned()]);
    }

    #[test]
    fn plaintext_pair_is_unchanged() {
        let rules = EncryptionRules::evaluate(&context(false, false), "a", "b").expect("rules");
        assert_eq!(rules, EncryptionRules::default());
    }

    #[test]
    fn encryption_property_values() {
        assert!(is_encrypted(Some("aes-256-gcm")));
        assert!(!is_encrypted(Some("off")));
        assert!(!is_encrypted(Some("-")));
        assert!(!is_encrypted(None));
    }
}
