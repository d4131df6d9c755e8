use super::*;
use crate::repository::{ReceiveOptions, SendOptions, TransferStream};
use crate::test_utils::{ScriptedRunner, local, pipeline_output, remote};

fn request(stream: TransferStream) -> TransferRequest {
    TransferRequest {
        source: local("tank/a"),
        destination: remote("backup@nas", "vault/a"),
        stream,
        send: SendOptions::default(),
        receive: ReceiveOptions::default(),
        dry_run: false,
    }
}

fn incremental(from: Option<&str>, to: &str) -> TransferStream {
    TransferStream::Snapshot {
        from: from.map(str::to_owned),
        to: to.to_owned(),
    }
}

#[test]
fn list_snapshots_strips_dataset_and_reverses() {
    let runner = ScriptedRunner::new().respond(
        "zfs list -H -p -o name -t snapshot -s createtxg -d 1 tank/a",
        CommandOutput::success("tank/a@s1\ntank/a@s2\ntank/a@s3\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let names = zfs.list_snapshots(&local("tank/a")).expect("list");
    assert_eq!(names, ["s3", "s2", "s1"]);
}

#[test]
fn missing_dataset_maps_to_not_found() {
    let runner = ScriptedRunner::new().respond(
        "[nas] zfs list -H -p -o name -t snapshot -s createtxg -d 1 vault/a",
        CommandOutput::failure(1, "cannot open 'vault/a': dataset does not exist\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let error = zfs.list_snapshots(&remote("nas", "vault/a")).unwrap_err();
    assert!(error.is_not_found());
}

#[test]
fn other_failures_keep_the_command() {
    let runner = ScriptedRunner::new().respond(
        "zfs list -H -o name -t filesystem,volume -r tank/a",
        CommandOutput::failure(1, "permission denied\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let error = zfs.list_datasets(&local("tank/a")).unwrap_err();
    assert_eq!(
        error.to_string(),
        "'zfs list -H -o name -t filesystem,volume -r tank/a' failed: permission denied"
    );
}

#[test]
fn list_datasets_keeps_the_host() {
    let runner = ScriptedRunner::new().respond(
        "[nas] zfs list -H -o name -t filesystem,volume -r vault/a",
        CommandOutput::success("vault/a\nvault/a/b\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let datasets = zfs.list_datasets(&remote("nas", "vault/a")).expect("list");
    assert_eq!(datasets, [remote("nas", "vault/a"), remote("nas", "vault/a/b")]);
}

#[test]
fn malformed_listing_is_reported() {
    let runner = ScriptedRunner::new().respond(
        "zfs list -H -p -o name -t snapshot -s createtxg -d 1 tank/a",
        CommandOutput::success("tank/a\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    assert!(matches!(
        zfs.list_snapshots(&local("tank/a")),
        Err(RepositoryError::Malformed { .. })
    ));
}

#[test]
fn dash_property_is_unset() {
    let runner = ScriptedRunner::new()
        .respond(
            "zfs get -H -p -o value encryption tank/a",
            CommandOutput::success("-\n"),
        )
        .respond(
            "zfs get -H -p -o value encryption tank/b",
            CommandOutput::success("aes-256-gcm\n"),
        );
    let mut zfs = ZfsRepository::new(runner);

    assert_eq!(zfs.get_property(&local("tank/a"), "encryption").expect("get"), None);
    assert_eq!(
        zfs.get_property(&local("tank/b"), "encryption").expect("get").as_deref(),
        Some("aes-256-gcm")
    );
}

#[test]
fn property_listings_are_parsed() {
    let runner = ScriptedRunner::new()
        .respond(
            "zfs get -H -p -o property,value -s local all tank/a",
            CommandOutput::success("compression\tlz4\nrecordsize\t1048576\n"),
        )
        .respond(
            "[nas] zpool get -H -p -o property,value all vault",
            CommandOutput::success("size\t1000\nfeature@large_blocks\tenabled\n"),
        );
    let mut zfs = ZfsRepository::new(runner);

    let local_properties = zfs.local_properties(&local("tank/a")).expect("local");
    assert_eq!(local_properties.get("recordsize").map(String::as_str), Some("1048576"));

    let pool = zfs.pool_properties("nas", "vault").expect("pool");
    assert_eq!(pool.get("feature@large_blocks").map(String::as_str), Some("enabled"));
}

#[test]
fn probe_classifies_the_rejection() {
    let runner = ScriptedRunner::new()
        .respond(
            "zfs send -L",
            CommandOutput::failure(2, "invalid option 'L'\nusage:\n"),
        )
        .respond(
            "zfs receive -s",
            CommandOutput::failure(2, "missing snapshot argument\nusage:\n"),
        );
    let mut zfs = ZfsRepository::new(runner);

    assert!(!zfs.probe("", Capability::SendLargeBlocks).expect("probe"));
    assert!(zfs.probe("", Capability::ReceiveResumable).expect("probe"));
}

#[test]
fn missing_program_is_a_command_error() {
    let mut zfs = ZfsRepository::new(ScriptedRunner::new().missing("zfs"));
    let error = zfs.probe("", Capability::SendCompressed).unwrap_err();
    assert!(matches!(error, RepositoryError::Command(ref inner) if inner.is_not_found()));
}

#[test]
fn resume_token_normalizes_values() {
    let runner = ScriptedRunner::new()
        .respond(
            "zfs get -H -o value receive_resume_token tank/a",
            CommandOutput::success("1-abc-def\n"),
        )
        .respond(
            "zfs get -H -o value receive_resume_token tank/b",
            CommandOutput::success("-\n"),
        )
        .respond(
            "zfs get -H -o value receive_resume_token tank/c",
            CommandOutput::failure(1, "cannot open 'tank/c': dataset does not exist"),
        );
    let mut zfs = ZfsRepository::new(runner);

    assert_eq!(zfs.resume_token(&local("tank/a")).expect("token").as_deref(), Some("1-abc-def"));
    assert_eq!(zfs.resume_token(&local("tank/b")).expect("token"), None);
    assert_eq!(zfs.resume_token(&local("tank/c")).expect("token"), None);
}

#[test]
fn incremental_transfer_command_lines() {
    let mut request = request(incremental(Some("s1"), "s2"));
    request.send = SendOptions {
        large_blocks: true,
        embedded: false,
        compressed: true,
        properties: true,
        replicate: false,
    };
    request.receive = ReceiveOptions {
        force: false,
        resumable: true,
        no_mount: true,
        excludes: vec!["mountpoint".to_owned()],
        overrides: vec![("readonly".to_owned(), "on".to_owned())],
    };
    let mut zfs = ZfsRepository::new(ScriptedRunner::new());

    let outcome = zfs.transfer(&request).expect("transfer");
    assert!(outcome.succeeded);
    assert_eq!(
        zfs.runner().calls,
        ["zfs send -L -c -p -i tank/a@s1 tank/a@s2 | [backup@nas] zfs receive -s -u -x mountpoint -o readonly=on vault/a"]
    );
}

#[test]
fn whole_stream_uses_replication_package() {
    let mut request = request(incremental(Some("s1"), "s3"));
    request.send.replicate = true;
    request.receive.force = true;
    let mut zfs = ZfsRepository::new(ScriptedRunner::new());

    zfs.transfer(&request).expect("transfer");
    assert_eq!(
        zfs.runner().calls,
        ["zfs send -R -I tank/a@s1 tank/a@s3 | [backup@nas] zfs receive -F vault/a"]
    );
}

#[test]
fn resume_and_dry_run_commands() {
    let mut zfs = ZfsRepository::new(ScriptedRunner::new());
    zfs.transfer(&request(TransferStream::Resume {
        token: "1-abc".to_owned(),
    }))
    .expect("resume");

    let mut dry = request(incremental(None, "s1"));
    dry.dry_run = true;
    zfs.transfer(&dry).expect("dry run");

    assert_eq!(
        zfs.runner().calls,
        [
            "zfs send -t 1-abc | [backup@nas] zfs receive vault/a",
            "zfs send -n -v tank/a@s1",
        ]
    );
}

#[test]
fn benign_receive_failure_is_flagged() {
    let runner = ScriptedRunner::new().respond_pipe(
        "zfs send tank/a@s1 | [backup@nas] zfs receive vault/a",
        pipeline_output(
            0,
            "",
            1,
            "filesystem successfully created, but it may only be mounted by root\n",
        ),
    );
    let mut zfs = ZfsRepository::new(runner);

    let outcome = zfs.transfer(&request(incremental(None, "s1"))).expect("transfer");
    assert!(!outcome.succeeded);
    assert!(outcome.benign_failure);
    assert!(outcome.is_effective_success());
}

#[test]
fn benign_text_after_sender_failure_is_a_failure() {
    let runner = ScriptedRunner::new().respond_pipe(
        "zfs send tank/a@s1 | [backup@nas] zfs receive vault/a",
        pipeline_output(1, "broken pipe\n", 1, "cannot share 'vault/a'\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let outcome = zfs.transfer(&request(incremental(None, "s1"))).expect("transfer");
    assert!(!outcome.is_effective_success());
    assert_eq!(outcome.diagnostic, "broken pipe\ncannot share 'vault/a'\n");
}

#[test]
fn destroy_snapshots_batches_and_tolerates_missing() {
    let names: Vec<String> = (0..2001).map(|index| format!("s{index}")).collect();
    let last_batch = "zfs destroy tank/a@s2000";
    let runner = ScriptedRunner::new().respond(
        last_batch,
        CommandOutput::failure(1, "could not find any snapshots to destroy; check snapshot names.\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    zfs.destroy_snapshots(&local("tank/a"), &names, false).expect("destroy");
    let calls = &zfs.runner().calls;
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("zfs destroy tank/a@s0,s1,"));
    assert_eq!(calls[1], last_batch);
}

#[test]
fn destroy_failure_is_reported() {
    let runner = ScriptedRunner::new().respond(
        "zfs destroy -n -v tank/a@x1,x2",
        CommandOutput::failure(1, "snapshot is held\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    let error = zfs
        .destroy_snapshots(&local("tank/a"), &["x1".to_owned(), "x2".to_owned()], true)
        .unwrap_err();
    assert!(matches!(error, RepositoryError::CommandFailed { ref diagnostic, .. } if diagnostic == "snapshot is held"));
}

#[test]
fn destroy_dataset_and_abort_commands() {
    let mut zfs = ZfsRepository::new(ScriptedRunner::new());
    zfs.destroy_dataset(&remote("nas", "vault/a"), true, false).expect("destroy");
    zfs.abort_pending_receive(&remote("nas", "vault/a")).expect("abort");

    assert_eq!(
        zfs.runner().calls,
        ["[nas] zfs destroy -r vault/a", "[nas] zfs receive -A vault/a"]
    );
}

#[test]
fn destroying_missing_dataset_is_not_found() {
    let runner = ScriptedRunner::new().respond(
        "zfs destroy -r backup/a",
        CommandOutput::failure(1, "cannot open 'backup/a': dataset does not exist\n"),
    );
    let mut zfs = ZfsRepository::new(runner);

    assert!(zfs.destroy_dataset(&local("backup/a"), true, false).unwrap_err().is_not_found());
}
