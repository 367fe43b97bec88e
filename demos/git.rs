use argtree::{argument, flag, Command, RunConfig};

fn main() {
    let add = Command::new(
        "add",
        (
            flag::boolean("force").with_alias("f").with_description("Allow adding ignored files"),
            argument::string("paths").at_least(1).with_description("Files to add"),
        ),
    )
    .with_description("Add file contents to the index")
    .with_handler(|(force, paths), _| async move {
        for path in paths {
            tracing::info!(%path, force, "adding");
            println!("add '{path}'");
        }
        Ok::<(), anyhow::Error>(())
    });

    let clone = Command::new(
        "clone",
        (
            flag::integer("depth")
                .optional()
                .with_description("Truncate history to this many commits"),
            argument::string("repository"),
            argument::string("directory").optional(),
        ),
    )
    .with_description("Clone a repository into a new directory")
    .with_handler(|(depth, repository, directory), parents| async move {
        let verbose = parents.get::<bool>("git").copied().unwrap_or(false);
        let directory = directory
            .unwrap_or_else(|| repository.rsplit('/').next().unwrap_or("repo").to_string());
        if verbose {
            println!("depth: {depth:?}");
        }
        println!("Cloning into '{directory}'...");
        Ok::<(), anyhow::Error>(())
    });

    let verbose = flag::boolean("verbose").with_alias("v").with_description("Be more talkative");
    let git = Command::new("git", verbose)
        .with_description("A toy version of git")
        .with_subcommands([add.boxed(), clone.boxed()]);
    let git = match git {
        Ok(it) => it,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2)
        }
    };

    let config = RunConfig::new(env!("CARGO_PKG_VERSION"));
    let res = futures::executor::block_on(git.run_from_env(&config));
    if res.is_err() {
        std::process::exit(1)
    }
}
