mod run;
mod subcommands;

use std::sync::{Arc, Mutex};

use argtree::{argument, flag, Command, Config, Execution, Flag, Parents, RunConfig};
use expect_test::Expect;
use futures::executor::block_on;

/// Lines written by handlers under test.
#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<String>>>);

impl Sink {
    fn push(&self, line: String) {
        self.0.lock().unwrap().push(line)
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

fn argv(args: &str) -> Vec<String> {
    args.split_ascii_whitespace().map(String::from).collect()
}

/// Runs `args` through `cmd` without touching stdout, and renders what
/// happened: help, version, errors, or the lines the handler wrote.
fn render<C>(cmd: &Command<C>, sink: &Sink, args: &str) -> String
where
    C: Config,
    C::Output: Send + Sync + 'static,
{
    let mut buf = String::new();
    match cmd.prepare(&argv(args), &RunConfig::new("1.2.3")) {
        Execution::Help(help) => {
            buf.push_str("help:\n");
            buf.push_str(&help);
        }
        Execution::Version(version) => buf.push_str(&format!("version: {version}\n")),
        Execution::Failed { errors, .. } => {
            for err in errors {
                buf.push_str(&format!("error: {err}\n"));
            }
        }
        Execution::Run { handler, log_level } => {
            if let Some(level) = log_level {
                buf.push_str(&format!("log-level: {level:?}\n"));
            }
            let res = block_on(handler);
            for line in sink.take() {
                buf.push_str(&line);
                buf.push('\n');
            }
            if let Err(err) = res {
                buf.push_str(&format!("handler error: {err}\n"));
            }
        }
    }
    assert!(sink.take().is_empty(), "handler ran without being asked to");
    buf
}

fn check<C>(cmd: &Command<C>, sink: &Sink, args: &str, expect: Expect)
where
    C: Config,
    C::Output: Send + Sync + 'static,
{
    expect.assert_eq(&render(cmd, sink, args));
}

/// `git` with `add`, `remove`, `clone` and `remote add`. The root has no
/// handler of its own.
fn git(sink: &Sink) -> Command<Flag<bool>> {
    let add = {
        let sink = sink.clone();
        let force = flag::boolean("force").with_alias("f");
        let file = argument::string("file").with_description("File to add");
        Command::new("add", (force, file)).with_description("Add files").with_handler(
            move |(force, file), parents: Parents| {
                let verbose = parents.get::<bool>("git").copied();
                let sink = sink.clone();
                async move {
                    sink.push(format!("add force={force} file={file} verbose={verbose:?}"));
                    Ok::<(), anyhow::Error>(())
                }
            },
        )
    };

    let remove = {
        let sink = sink.clone();
        let recursive = flag::boolean("recursive").with_alias("r");
        Command::new("remove", (recursive, argument::string("path").at_least(1)))
            .with_description("Remove files")
            .with_handler(move |(recursive, paths), _| {
                let sink = sink.clone();
                async move {
                    sink.push(format!("remove recursive={recursive} paths={paths:?}"));
                    Ok::<(), anyhow::Error>(())
                }
            })
    };

    let clone = {
        let sink = sink.clone();
        let config = (flag::integer("depth").optional(), argument::string("repository"));
        Command::new("clone", config).with_handler(move |(depth, repository), parents: Parents| {
            let verbose = parents.get::<bool>("git").copied();
            let sink = sink.clone();
            async move {
                sink.push(format!(
                    "clone depth={depth:?} repository={repository} verbose={verbose:?}"
                ));
                Ok::<(), anyhow::Error>(())
            }
        })
    };

    let remote_add = {
        let sink = sink.clone();
        Command::new("add", (argument::string("name"), argument::string("url")))
            .with_description("Add a remote")
            .with_handler(move |(name, url), parents: Parents| {
                let dry_run = parents.get::<bool>("remote").copied();
                let verbose = parents.get::<bool>("git").copied();
                let sink = sink.clone();
                async move {
                    sink.push(format!(
                        "remote add name={name} url={url} dry_run={dry_run:?} verbose={verbose:?}"
                    ));
                    Ok::<(), anyhow::Error>(())
                }
            })
    };
    let remote = Command::new(
        "remote",
        flag::boolean("dry-run").with_alias("n").with_description("Only print what would change"),
    )
    .with_description("Manage remotes")
    .with_subcommands([remote_add.boxed()])
    .unwrap();

    Command::new("git", flag::boolean("verbose").with_alias("v").with_description("Print more"))
        .with_description("Stupid content tracker")
        .with_subcommands([add.boxed(), remove.boxed(), clone.boxed(), remote.boxed()])
        .unwrap()
}

#[test]
fn commands_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Command<Flag<bool>>>();
    assert_send_sync::<argtree::Argument<Vec<String>>>();
    assert_send_sync::<Box<dyn argtree::AnyCommand<anyhow::Error>>>();
}
