use std::ffi::OsString;

use client::{ClientConfig, ClientError, PropertyOverride};
use engine::ReplicationPolicy;
use filters::SnapshotFilter;
use transport::{Endpoint, parse_endpoint};

use super::arguments::ParsedArgs;

/// Builds the client configuration for a replication request.
pub(crate) fn build_config(parsed: ParsedArgs) -> Result<ClientConfig, ClientError> {
    let ParsedArgs {
        dry_run,
        recursive,
        delete,
        delete_before,
        delete_excluded,
        no_mount,
        snapshot_filter,
        properties,
        exclude_properties,
        rsh,
        operands,
        ..
    } = parsed;

    let (source, destination) = operands_pair(operands)?;

    let policy = ReplicationPolicy::builder()
        .delete(delete)
        .delete_before(delete_before)
        .delete_excluded(delete_excluded)
        .no_mount(no_mount)
        .recursive(recursive)
        .dry_run(dry_run)
        .build();

    let filter = snapshot_filter.map(SnapshotFilter::new).transpose()?;

    let mut builder = ClientConfig::builder()
        .source(source)
        .destination(destination)
        .policy(policy)
        .filter(filter)
        .remote_shell(rsh);
    for property in properties {
        builder = builder.property_override(property.parse::<PropertyOverride>()?);
    }
    for name in exclude_properties {
        builder = builder.property_exclude(name);
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

fn operands_pair(operands: Vec<OsString>) -> Result<(Endpoint, Endpoint), ClientError> {
    let mut operands = operands.into_iter();
    let source = operands.next().ok_or(ClientError::MissingOperand("source"))?;
    let destination = operands
        .next()
        .ok_or(ClientError::MissingOperand("destination"))?;
    if let Some(extra) = operands.next() {
        return Err(invalid_operand(&extra, "unexpected extra operand"));
    }
    Ok((endpoint(&source)?, endpoint(&destination)?))
}

fn endpoint(operand: &OsString) -> Result<Endpoint, ClientError> {
    let text = operand
        .to_str()
        .ok_or_else(|| invalid_operand(operand, "not valid UTF-8"))?;
    parse_endpoint(text).map_err(|source| ClientError::InvalidEndpoint {
        operand: text.to_owned(),
        source,
    })
}

fn invalid_operand(operand: &OsString, reason: &'static str) -> ClientError {
    ClientError::InvalidOperand {
        operand: operand.to_string_lossy().into_owned(),
        reason,
    }
}
