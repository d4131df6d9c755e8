use std::env;
use std::ffi::OsString;

use super::PROGRAM_NAME;
use super::command_builder::clap_command;

/// Environment variable naming the default remote shell.
pub(crate) const RSH_ENV: &str = "ZRSYNC_RSH";

/// Switches and operands recognised on the command line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) verbosity: u8,
    pub(crate) dry_run: bool,
    pub(crate) recursive: bool,
    pub(crate) delete: bool,
    pub(crate) delete_before: bool,
    pub(crate) delete_excluded: bool,
    pub(crate) no_mount: bool,
    pub(crate) snapshot_filter: Option<String>,
    pub(crate) properties: Vec<String>,
    pub(crate) exclude_properties: Vec<String>,
    pub(crate) rsh: Option<OsString>,
    pub(crate) operands: Vec<OsString>,
}

/// Parses `arguments`, the first of which is the program name.
///
/// `--rsh` falls back to `ZRSYNC_RSH` when absent; an empty variable counts
/// as unset.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    parse_args_with_env(arguments, env_rsh_default())
}

pub(crate) fn parse_args_with_env<I, S>(
    arguments: I,
    env_rsh: Option<OsString>,
) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let mut matches = clap_command(PROGRAM_NAME).try_get_matches_from(arguments)?;

    let strings = |matches: &mut clap::ArgMatches, id: &str| -> Vec<String> {
        matches
            .remove_many::<String>(id)
            .map(Iterator::collect)
            .unwrap_or_default()
    };
    let properties = strings(&mut matches, "property");
    let exclude_properties = strings(&mut matches, "exclude-property");

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        verbosity: matches.get_count("verbose"),
        dry_run: matches.get_flag("dry-run"),
        recursive: matches.get_flag("recursive"),
        delete: matches.get_flag("delete"),
        delete_before: matches.get_flag("delete-before"),
        delete_excluded: matches.get_flag("delete-excluded"),
        no_mount: matches.get_flag("no-mount"),
        snapshot_filter: matches.remove_one::<String>("snapshot-filter"),
        properties,
        exclude_properties,
        rsh: matches.remove_one::<OsString>("rsh").or(env_rsh),
        operands: matches
            .remove_many::<OsString>("operands")
            .map(Iterator::collect)
            .unwrap_or_default(),
    })
}

fn env_rsh_default() -> Option<OsString> {
    env::var_os(RSH_ENV).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(arguments: &[&str]) -> ParsedArgs {
        parse_args_with_env(arguments.iter().copied(), None).expect("parse")
    }

    #[test]
    fn parse_args_recognises_replication_switches() {
        let parsed = parse(&[
            "zrsync",
            "-nru",
            "--delete-before",
            "--snapshot-filter",
            "^daily-",
            "tank/a",
            "nas:vault/a",
        ]);
        assert!(parsed.dry_run);
        assert!(parsed.recursive);
        assert!(parsed.no_mount);
        assert!(parsed.delete_before);
        assert!(!parsed.delete);
        assert_eq!(parsed.snapshot_filter.as_deref(), Some("^daily-"));
        assert_eq!(
            parsed.operands,
            [OsString::from("tank/a"), OsString::from("nas:vault/a")]
        );
    }

    #[test]
    fn parse_args_collects_repeated_properties() {
        let parsed = parse(&[
            "zrsync",
            "-o",
            "readonly=on",
            "--property=compression=zstd",
            "-x",
            "mountpoint",
            "-x",
            "sharenfs",
            "a",
            "b",
        ]);
        assert_eq!(parsed.properties, ["readonly=on", "compression=zstd"]);
        assert_eq!(parsed.exclude_properties, ["mountpoint", "sharenfs"]);
    }

    #[test]
    fn parse_args_counts_verbosity() {
        assert_eq!(parse(&["zrsync", "-vvv"]).verbosity, 3);
        assert_eq!(parse(&["zrsync", "-v", "--verbose"]).verbosity, 2);
        assert_eq!(parse(&["zrsync"]).verbosity, 0);
    }

    #[test]
    fn rsh_option_takes_precedence_over_environment() {
        let parsed = parse_args_with_env(
            ["zrsync", "-e", "ssh -p 2222", "a", "b"],
            Some(OsString::from("rsh")),
        )
        .expect("parse");
        assert_eq!(parsed.rsh, Some(OsString::from("ssh -p 2222")));

        let parsed =
            parse_args_with_env(["zrsync", "a", "b"], Some(OsString::from("ssh -i key")))
                .expect("parse");
        assert_eq!(parsed.rsh, Some(OsString::from("ssh -i key")));
    }

    #[test]
    fn parse_args_rejects_unknown_options() {
        assert!(parse_args_with_env(["zrsync", "--archive", "a", "b"], None).is_err());
    }

    #[test]
    fn parse_args_recognises_help_and_version() {
        assert!(parse(&["zrsync", "--help"]).show_help);
        assert!(parse(&["zrsync", "-h"]).show_help);
        assert!(parse(&["zrsync", "-V"]).show_version);
    }
}
