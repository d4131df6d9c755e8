//! Command lines for the `zfs` and `zpool` programs.

use engine::Dataset;
use engine::capability::Capability;
use transport::CommandSpec;

use crate::repository::{TransferRequest, TransferStream};

const ZFS: &str = "zfs";
const ZPOOL: &str = "zpool";

pub(super) fn list_snapshots(dataset: &Dataset) -> CommandSpec {
    CommandSpec::new(ZFS)
        .args(["list", "-H", "-p", "-o", "name", "-t", "snapshot", "-s", "createtxg", "-d", "1"])
        .arg(dataset.path())
}

pub(super) fn list_datasets(root: &Dataset) -> CommandSpec {
    CommandSpec::new(ZFS)
        .args(["list", "-H", "-o", "name", "-t", "filesystem,volume", "-r"])
        .arg(root.path())
}

pub(super) fn get_property(dataset: &Dataset, name: &str) -> CommandSpec {
    CommandSpec::new(ZFS)
        .args(["get", "-H", "-p", "-o", "value", name])
        .arg(dataset.path())
}

pub(super) fn local_properties(dataset: &Dataset) -> CommandSpec {
    CommandSpec::new(ZFS)
        .args(["get", "-H", "-p", "-o", "property,value", "-s", "local", "all"])
        .arg(dataset.path())
}

pub(super) fn pool_properties(pool: &str) -> CommandSpec {
    CommandSpec::new(ZPOOL)
        .args(["get", "-H", "-p", "-o", "property,value", "all", pool])
}

pub(super) fn resume_token(dataset: &Dataset) -> CommandSpec {
    CommandSpec::new(ZFS)
        .args(["get", "-H", "-o", "value", "receive_resume_token"])
        .arg(dataset.path())
}

/// The flag alone, with no operands: the program rejects the missing operand
/// after it has accepted or refused the flag.
pub(super) fn probe(capability: Capability) -> CommandSpec {
    CommandSpec::new(ZFS)
        .arg(capability.direction().verb())
        .arg(capability.flag())
}

pub(super) fn send(request: &TransferRequest) -> CommandSpec {
    let mut spec = CommandSpec::new(ZFS).arg("send");
    if request.dry_run {
        spec.push("-n");
        spec.push("-v");
    }

    let (from, to) = match &request.stream {
        TransferStream::Resume { token } => return spec.arg("-t").arg(token.as_str()),
        TransferStream::Snapshot { from, to } => (from, to),
    };

    let options = &request.send;
    for (enabled, flag) in [
        (options.large_blocks, "-L"),
        (options.embedded, "-e"),
        (options.compressed, "-c"),
        (options.properties, "-p"),
        (options.replicate, "-R"),
    ] {
        if enabled {
            spec.push(flag);
        }
    }
    if let Some(from) = from {
        spec.push(if options.replicate { "-I" } else { "-i" });
        spec.push(request.source.snapshot(from));
    }
    spec.arg(request.source.snapshot(to))
}

pub(super) fn receive(request: &TransferRequest) -> CommandSpec {
    let options = &request.receive;
    let mut spec = CommandSpec::new(ZFS).arg("receive");
    for (enabled, flag) in [
        (options.force, "-F"),
        (options.resumable, "-s"),
        (options.no_mount, "-u"),
    ] {
        if enabled {
            spec.push(flag);
        }
    }
    for name in &options.excludes {
        spec.push("-x");
        spec.push(name.as_str());
    }
    for (name, value) in &options.overrides {
        spec.push("-o");
        spec.push(format!("{name}={value}"));
    }
    spec.arg(request.destination.path())
}

pub(super) fn destroy_dataset(dataset: &Dataset, recursive: bool, dry_run: bool) -> CommandSpec {
    let mut spec = CommandSpec::new(ZFS).arg("destroy");
    if dry_run {
        spec.push("-n");
        spec.push("-v");
    }
    if recursive {
        spec.push("-r");
    }
    spec.arg(dataset.path())
}

pub(super) fn destroy_snapshots(dataset: &Dataset, names: &[String], dry_run: bool) -> CommandSpec {
    let mut spec = CommandSpec::new(ZFS).arg("destroy");
    if dry_run {
        spec.push("-n");
        spec.push("-v");
    }
    spec.arg(dataset.snapshot(&names.join(",")))
}

pub(super) fn abort_receive(dataset: &Dataset) -> CommandSpec {
    CommandSpec::new(ZFS).args(["receive", "-A"]).arg(dataset.path())
}
