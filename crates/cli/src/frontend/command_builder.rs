use clap::{Arg, ArgAction, Command as ClapCommand, builder::OsStringValueParser};

pub(crate) fn clap_command(program_name: &'static str) -> ClapCommand {
    ClapCommand::new(program_name)
        .about("Replicate ZFS snapshot history with rsync-style delete semantics.")
        .override_usage(format!("{program_name} [OPTIONS] SOURCE DEST"))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase verbosity; repeat for more detail.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Show what would be replicated without changing the destination.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Replicate descendant datasets too.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .help("Delete destination snapshots that are absent from the source.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delete-before")
                .long("delete-before")
                .help("Delete before transferring instead of after (implies --delete).")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delete-excluded")
                .long("delete-excluded")
                .help("Also delete destination snapshots the filter excludes (implies --delete).")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-mount")
                .short('u')
                .long("no-mount")
                .help("Do not mount received datasets.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("snapshot-filter")
                .long("snapshot-filter")
                .value_name("REGEX")
                .help("Only replicate snapshots whose name matches REGEX.")
                .num_args(1)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("property")
                .short('o')
                .long("property")
                .value_name("NAME=VALUE")
                .help("Set property NAME to VALUE on received datasets.")
                .num_args(1)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-property")
                .short('x')
                .long("exclude-property")
                .value_name("NAME")
                .help("Do not carry property NAME to received datasets.")
                .num_args(1)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("rsh")
                .short('e')
                .long("rsh")
                .value_name("COMMAND")
                .help("Remote shell used to reach remote hosts (default: ssh, or ZRSYNC_RSH).")
                .num_args(1)
                .allow_hyphen_values(true)
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("operands")
                .value_name("ENDPOINT")
                .help("SOURCE and DEST as [[user@]host:]dataset.")
                .num_args(0..)
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Append),
        )
}
