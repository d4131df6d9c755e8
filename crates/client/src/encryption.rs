//! Encryption context of a dataset pair.

use std::collections::BTreeMap;

use engine::{Dataset, EncryptionContext, is_encrypted};
use tracing::debug;

use crate::repository::{Repository, RepositoryError};

/// Reads what the encryption rules need to know about a pair.
///
/// The destination inherits encryption from its nearest existing ancestor
/// when it does not exist yet. With no existing ancestor it is treated as
/// unencrypted. Locally set source properties are only read when both sides
/// are encrypted, the one case where they are re-applied.
///
/// # Errors
///
/// Fails when the source cannot be queried or a query other than a missing
/// dataset fails.
pub fn resolve_encryption<R>(
    repository: &mut R,
    source: &Dataset,
    destination: &Dataset,
) -> Result<EncryptionContext, RepositoryError>
where
    R: Repository + ?Sized,
{
    let source_encrypted =
        is_encrypted(repository.get_property(source, "encryption")?.as_deref());

    let mut destination_encrypted = false;
    for candidate in destination.ancestors() {
        match repository.get_property(&candidate, "encryption") {
            Ok(value) => {
                destination_encrypted = is_encrypted(value.as_deref());
                if candidate != *destination {
                    debug!(
                        target: "zrsync::plan",
                        "{destination}: encryption taken from {candidate}"
                    );
                }
                break;
            }
            Err(error) if error.is_not_found() => {}
            Err(error) => return Err(error),
        }
    }

    let source_local_properties = if source_encrypted && destination_encrypted {
        repository.local_properties(source)?
    } else {
        BTreeMap::new()
    };

    Ok(EncryptionContext {
        source_encrypted,
        destination_encrypted,
        source_local_properties,
    })
}
