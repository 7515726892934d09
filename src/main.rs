use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use twig::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A small content-addressable version control engine",
    long_about = "twig is a simplified version control engine: a content-addressable \
    object store plus a commit graph with branching, merging, rebasing, diffing and blame. \
    It is a learning-scale tool, not a replacement for a full version control system.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(about = "Stage files for the next commit ('.' stages everything)")]
    Add {
        #[arg(required = true, help = "Files to stage, or '.'")]
        paths: Vec<String>,
    },
    #[command(about = "Record the staged snapshot as a new commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "Show staged, modified and untracked files")]
    Status,
    #[command(about = "Show the commit history of HEAD")]
    Log,
    #[command(about = "Show the differences between two revisions")]
    Diff {
        #[arg(index = 1, help = "Left revision (branch or commit hash)")]
        left: String,
        #[arg(index = 2, help = "Right revision (branch or commit hash)")]
        right: String,
    },
    #[command(about = "Show which commit last touched each line of a file")]
    Blame {
        #[arg(index = 1, help = "The file to annotate")]
        path: String,
    },
    #[command(about = "List branches, or create a new one")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
    },
    #[command(about = "Switch to a branch or a commit")]
    Checkout {
        #[arg(index = 1, help = "Branch name or commit hash")]
        target: String,
    },
    #[command(about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
    #[command(about = "Replay the current branch on top of another branch")]
    Rebase {
        #[arg(index = 1, help = "The branch to rebase onto")]
        branch: String,
    },
    #[command(about = "Set a configuration value (user.name, user.email)")]
    Config {
        #[arg(index = 1, help = "Configuration key")]
        key: String,
        #[arg(index = 2, help = "Configuration value")]
        value: String,
    },
    #[command(about = "Show the configured identity")]
    Whoami,
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::open(&pwd, Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            std::fs::create_dir_all(&path)?;

            let repository = Repository::new(&path, Box::new(std::io::stdout()))?;
            repository.init()?
        }
        Commands::Add { paths } => {
            let repository = open_repository()?;
            for path in paths {
                repository.add(path)?;
            }
        }
        Commands::Commit { message } => open_repository()?.commit(message)?,
        Commands::Status => open_repository()?.status()?,
        Commands::Log => open_repository()?.log()?,
        Commands::Diff { left, right } => open_repository()?.diff(left, right)?,
        Commands::Blame { path } => open_repository()?.blame(path)?,
        Commands::Branch { name } => open_repository()?.branch(name.as_deref())?,
        Commands::Checkout { target } => open_repository()?.checkout(target)?,
        Commands::Merge { branch } => open_repository()?.merge(branch)?,
        Commands::Rebase { branch } => open_repository()?.rebase(branch)?,
        Commands::Config { key, value } => open_repository()?.config_set(key, value)?,
        Commands::Whoami => open_repository()?.whoami()?,
    }

    Ok(())
}
