use argtree::{argument, flag, CliError, Command, FlagMap, Parents, ParsedArgs, RunConfig, RunError};
use expect_test::expect;
use futures::executor::block_on;

use crate::{argv, check, git, render, Sink};

#[test]
fn help() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "--help", expect![[r#"
        help:
        DESCRIPTION
          Stupid content tracker

        USAGE
          git <subcommand> [flags]

        FLAGS
          --verbose, -v  Print more

        SUBCOMMANDS
          add     Add files
          remove  Remove files
          clone
          remote  Manage remotes
    "#]]);
    check(&git, &sink, "add -h", expect![[r#"
        help:
        DESCRIPTION
          Add files

        USAGE
          git add [flags] <file>

        ARGUMENTS
          <file>  File to add

        FLAGS
          --force, -f
    "#]]);
    check(&git, &sink, "remote add --help", expect![[r#"
        help:
        DESCRIPTION
          Add a remote

        USAGE
          git remote add [flags] <name> <url>

        ARGUMENTS
          <name>
          <url>
    "#]]);
}

#[test]
fn help_wins_over_errors() {
    let sink = Sink::default();
    let git = git(&sink);
    let with_errors = render(&git, &sink, "add --bogus --help");
    assert_eq!(with_errors, render(&git, &sink, "--help add"));
    assert!(with_errors.starts_with("help:\nDESCRIPTION\n  Add files\n"));
}

#[test]
fn commands_without_handler_show_help() {
    let sink = Sink::default();
    let git = git(&sink);
    assert_eq!(render(&git, &sink, ""), render(&git, &sink, "--help"));
    check(&git, &sink, "remote -n", expect![[r#"
        help:
        DESCRIPTION
          Manage remotes

        USAGE
          git remote <subcommand> [flags]

        FLAGS
          --dry-run, -n  Only print what would change

        SUBCOMMANDS
          add  Add a remote
    "#]]);
}

#[test]
fn version() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "--version", expect![[r#"
        version: git v1.2.3
    "#]]);
    check(&git, &sink, "remote add --version", expect![[r#"
        version: git v1.2.3
    "#]]);
}

#[test]
fn log_level() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "--log-level debug add x", expect![[r#"
        log-level: Debug
        add force=false file=x verbose=Some(false)
    "#]]);
    check(&git, &sink, "add x --log-level=warn", expect![[r#"
        log-level: Warning
        add force=false file=x verbose=Some(false)
    "#]]);
    check(&git, &sink, "--log-level loud add x", expect![[r#"
        error: Invalid value for flag --log-level: "loud". Expected: one of all | trace | debug | info | warn | warning | error | fatal | none
    "#]]);
}

#[test]
fn handler_errors_propagate() {
    let cmd = Command::new("fail", argument::string("reason"))
        .with_handler(|reason, _| async move { Err::<(), _>(anyhow::anyhow!("failed: {reason}")) });
    let sink = Sink::default();
    check(&cmd, &sink, "disk-full", expect![[r#"
        handler error: failed: disk-full
    "#]]);

    let err = block_on(cmd.run(&argv("disk-full"), &RunConfig::new("0.1.0"))).unwrap_err();
    assert!(matches!(&err, RunError::Handler(_)));
    assert_eq!(err.to_string(), "failed: disk-full");

    let err = block_on(cmd.run(&argv("a b"), &RunConfig::new("0.1.0"))).unwrap_err();
    match err {
        RunError::Cli(errors) => {
            let command = vec!["fail".to_string()];
            assert_eq!(errors, [CliError::UnexpectedArgument { value: "b".to_string(), command }])
        }
        RunError::Handler(err) => panic!("handler ran: {err}"),
    }
}

#[test]
fn run_to_completion() {
    let sink = Sink::default();
    let git = git(&sink);
    block_on(git.run(&argv("remove a"), &RunConfig::new("1.2.3"))).unwrap();
    assert_eq!(sink.take(), ["remove recursive=false paths=[\"a\"]"]);
}

#[test]
fn parse_and_handle_directly() {
    let config = (flag::integer("count"), argument::string("file"));
    let cmd = Command::<_, anyhow::Error>::new("tool", config);

    let mut flags = FlagMap::new();
    flags.insert("count".to_string(), vec!["3".to_string()]);
    let args = ParsedArgs { flags, arguments: vec!["a.txt".to_string()] };
    let value = cmd.parse(&args).unwrap();
    assert_eq!(value, (3, "a.txt".to_string()));

    let err = cmd.handle(value, Parents::default()).err();
    assert_eq!(err, Some(CliError::ShowHelp { command: vec!["tool".to_string()] }));

    let titles = cmd.build_help_doc().sections.iter().map(|it| it.title).collect::<Vec<_>>();
    assert_eq!(titles, ["USAGE", "ARGUMENTS", "FLAGS"]);
}
