use argtree::{flag, Command, Parents};
use expect_test::expect;

use crate::{check, git, Sink};

#[test]
fn dispatch() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "add file.txt", expect![[r#"
        add force=false file=file.txt verbose=Some(false)
    "#]]);
    check(&git, &sink, "-v add -f file.txt", expect![[r#"
        add force=true file=file.txt verbose=Some(true)
    "#]]);
    check(&git, &sink, "remove -r a b", expect![[r#"
        remove recursive=true paths=["a", "b"]
    "#]]);
    check(&git, &sink, "clone --depth 1 https://example.com/repo.git", expect![[r#"
        clone depth=Some(1) repository=https://example.com/repo.git verbose=Some(false)
    "#]]);
}

#[test]
fn parent_flags_after_subcommand() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "add file.txt --verbose", expect![[r#"
        add force=false file=file.txt verbose=Some(true)
    "#]]);
    check(&git, &sink, "clone repo -v", expect![[r#"
        clone depth=None repository=repo verbose=Some(true)
    "#]]);
}

#[test]
fn nested() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "remote -n add origin https://example.com", expect![[r#"
        remote add name=origin url=https://example.com dry_run=Some(true) verbose=Some(false)
    "#]]);
    check(&git, &sink, "--verbose remote add origin u --dry-run", expect![[r#"
        remote add name=origin url=u dry_run=Some(true) verbose=Some(true)
    "#]]);
}

#[test]
fn unknown_subcommand() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "ad file.txt", expect![[r#"
        error: Unknown subcommand `ad` for `git`. Did you mean add?
    "#]]);
    check(&git, &sink, "remot add origin u", expect![[r#"
        error: Unknown subcommand `remot` for `git`. Did you mean remote?
    "#]]);
    check(&git, &sink, "remote ad origin", expect![[r#"
        error: Unknown subcommand `ad` for `git remote`. Did you mean add?
    "#]]);
    check(&git, &sink, "push", expect![[r#"
        error: Unknown subcommand `push` for `git`
    "#]]);
}

#[test]
fn errors_in_subcommands() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "add --forse --quiet file.txt", expect![[r#"
        error: Unrecognized flag: --forse in command git add. Did you mean --force?
        error: Unrecognized flag: --quiet in command git add
    "#]]);
    check(&git, &sink, "--quiet add file.txt", expect![[r#"
        error: Unrecognized flag: --quiet in command git
    "#]]);
    check(&git, &sink, "add", expect![[r#"
        error: Missing required argument: <file>
    "#]]);
    check(&git, &sink, "remove", expect![[r#"
        error: Invalid value for argument <path>: "". Expected: at least 1 value(s)
    "#]]);
    check(&git, &sink, "clone --depth one repo", expect![[r#"
        error: Invalid value for flag --depth: "one". Expected: integer
    "#]]);
}

#[test]
fn errors_from_every_level_are_reported() {
    let sink = Sink::default();
    let git = git(&sink);
    check(&git, &sink, "--quiet add --bogus file.txt --loud", expect![[r#"
        error: Unrecognized flag: --quiet in command git
        error: Unrecognized flag: --bogus in command git add
        error: Unrecognized flag: --loud in command git add
    "#]]);
    check(&git, &sink, "--verbos ad --bogus", expect![[r#"
        error: Unrecognized flag: --verbos in command git. Did you mean --verbose?
        error: Unknown subcommand `ad` for `git`. Did you mean add?
        error: Unrecognized flag: --bogus in command git
    "#]]);
    check(&git, &sink, "clone --depth", expect![[r#"
        error: Invalid value for flag --depth: "". Expected: integer
    "#]]);
}

#[test]
fn duplicate_flag_is_rejected_at_construction() {
    let noop = |_: bool, _: Parents| async { Ok::<(), anyhow::Error>(()) };
    let child = Command::new("child", flag::boolean("verbose")).with_handler(noop);
    let err = Command::new("root", flag::boolean("verbose").with_alias("v"))
        .with_subcommands([child.boxed()])
        .unwrap_err();
    expect![[r#"
        Duplicate flag name --verbose in parent command `root` and subcommand `child`. Parent commands cannot share flag names with their subcommands"#]]
    .assert_eq(&err.to_string());

    // Siblings may share names.
    let first = Command::new("first", flag::boolean("force")).with_handler(noop);
    let second = Command::new("second", flag::boolean("force")).with_handler(noop);
    let root = Command::new("root", flag::boolean("verbose"));
    assert!(root.with_subcommands([first.boxed(), second.boxed()]).is_ok());
}
