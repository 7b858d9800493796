//! dotkeeper - dotfile tracking command line interface

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dotkeeper::fs::read_for_staging;
use dotkeeper::ops::{self, unified_diff};
use dotkeeper::{
    current_identity, read_blob, read_commit, read_tree, resolve, with_index, ChangeKind, Config,
    Error, Hash, Index, Repo,
};

const DEFAULT_COMMIT_MESSAGE: &str = "Update dotfiles";

#[derive(Parser)]
#[command(name = "dotkeeper")]
#[command(about = "track dotfiles in a content-addressed, commit-chained store")]
#[command(version)]
struct Cli {
    /// repository base directory (default: ~/.dotkeeper)
    #[arg(short, long, global = true, env = "DOTKEEPER_DIR")]
    base_dir: Option<PathBuf>,

    /// enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// create a repository and commit its config file
    Init(InitArgs),

    /// stage files (directories are added recursively)
    Add(PathsArgs),

    /// remove files from the index
    Rm(PathsArgs),

    /// show staged and unstaged changes
    Status,

    /// show content changes between the filesystem and the index
    Diff(DiffArgs),

    /// record the index as a new commit
    Commit(CommitArgs),

    /// show commit history, newest first
    Log(LogArgs),

    /// list the files of a commit
    LsTree(LsTreeArgs),

    /// show contents of an object
    CatFile(CatFileArgs),
}

#[derive(Args)]
struct InitArgs {
    /// author recorded in commits (default: the user name)
    #[arg(short, long)]
    author: Option<String>,
}

#[derive(Args)]
struct PathsArgs {
    /// files or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Args)]
struct DiffArgs {
    /// limit the diff to these files or directories
    paths: Vec<PathBuf>,
}

#[derive(Args)]
struct CommitArgs {
    /// commit message
    #[arg(short, long, default_value = DEFAULT_COMMIT_MESSAGE)]
    message: String,

    /// author name (default: from config)
    #[arg(long)]
    author: Option<String>,
}

#[derive(Args)]
struct LogArgs {
    /// maximum number of commits to show
    #[arg(short = 'n', long)]
    max_count: Option<usize>,
}

#[derive(Args)]
struct LsTreeArgs {
    /// commit to list
    #[arg(default_value = "HEAD")]
    rev: String,
}

#[derive(Args)]
struct CatFileArgs {
    /// object type (blob, tree, commit)
    object_type: String,

    /// object hash
    object: String,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DOTKEEPER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> dotkeeper::Result<()> {
    let base = match cli.base_dir {
        Some(base) => absolute(&base)?,
        None => current_identity()?.0.join(".dotkeeper"),
    };

    match cli.command {
        Commands::Init(args) => cmd_init(&base, args),
        Commands::Add(args) => cmd_add(&Repo::open(&base)?, args),
        Commands::Rm(args) => cmd_rm(&Repo::open(&base)?, args),
        Commands::Status => cmd_status(&Repo::open(&base)?),
        Commands::Diff(args) => cmd_diff(&Repo::open(&base)?, args),
        Commands::Commit(args) => cmd_commit(&Repo::open(&base)?, args),
        Commands::Log(args) => cmd_log(&Repo::open(&base)?, args),
        Commands::LsTree(args) => cmd_ls_tree(&Repo::open(&base)?, args),
        Commands::CatFile(args) => cmd_cat_file(&Repo::open(&base)?, args),
    }
}

fn cmd_init(base: &Path, args: InitArgs) -> dotkeeper::Result<()> {
    let mut config = Config::detect()?;
    config.identity.author = args.author;

    let (repo, hash) = ops::init(base, config)?;
    println!(
        "initialized dotkeeper repository at {} ({})",
        repo.path().display(),
        hash.short()
    );
    Ok(())
}

fn cmd_add(repo: &Repo, args: PathsArgs) -> dotkeeper::Result<()> {
    let paths = absolute_all(&args.paths)?;
    let staged = with_index(repo, |index| ops::add(repo, index, &paths))?;

    for path in staged {
        println!("staged {}", path);
    }
    Ok(())
}

fn cmd_rm(repo: &Repo, args: PathsArgs) -> dotkeeper::Result<()> {
    let mut repo_paths = Vec::with_capacity(args.paths.len());
    for path in absolute_all(&args.paths)? {
        repo_paths.push(repo.translator().to_repo_path(&path)?);
    }

    with_index(repo, |index| {
        for repo_path in &repo_paths {
            match index.unstage(repo_path) {
                Some(_) => println!("unstaged {}", repo_path),
                None => warn!(path = %repo_path, "not in the index"),
            }
        }
        Ok(())
    })
}

fn cmd_status(repo: &Repo) -> dotkeeper::Result<()> {
    let index = Index::load(repo)?;
    let status = ops::status(repo, &index)?;

    match status.head {
        Some(head) => println!("head {}", head.short()),
        None => println!("no commits yet"),
    }
    if status.is_clean() {
        println!("nothing to commit");
        return Ok(());
    }

    if !status.staged.is_empty() {
        println!("\nchanges to be committed:");
        for entry in &status.staged {
            println!("  {}", entry);
        }
    }
    if !status.unstaged.is_empty() {
        println!("\nchanges not staged:");
        for entry in &status.unstaged {
            println!("  {}", entry);
        }
    }
    Ok(())
}

fn cmd_diff(repo: &Repo, args: DiffArgs) -> dotkeeper::Result<()> {
    let mut filters = Vec::with_capacity(args.paths.len());
    for path in absolute_all(&args.paths)? {
        filters.push(repo.translator().to_repo_path(&path)?);
    }
    let selected = |repo_path: &str| {
        filters.is_empty()
            || filters.iter().any(|f| {
                repo_path == f
                    || repo_path
                        .strip_prefix(f.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    };

    let index = Index::load(repo)?;
    let mut stdout = io::stdout().lock();

    for change in ops::diff_worktree_index(repo, &index)? {
        if !selected(&change.path) {
            continue;
        }
        let Some(entry) = index.get(&change.path) else {
            continue;
        };

        let text = match change.kind {
            ChangeKind::Modified => {
                let old = read_blob(repo, &entry.hash)?;
                let (new, _) = read_for_staging(&repo.translator().to_absolute_path(&change.path)?)?;
                unified_diff(&old, &new, &change.path)
            }
            ChangeKind::Missing => {
                let old = read_blob(repo, &entry.hash)?;
                unified_diff(&old, b"", &change.path)
            }
            ChangeKind::ModeChanged => format!("mode change {}\n", change.path),
            _ => continue,
        };

        stdout
            .write_all(text.as_bytes())
            .map_err(|e| Error::Io {
                path: "stdout".into(),
                source: e,
            })?;
    }
    Ok(())
}

fn cmd_commit(repo: &Repo, args: CommitArgs) -> dotkeeper::Result<()> {
    let author = args
        .author
        .unwrap_or_else(|| repo.config().author().to_string());

    let hash = with_index(repo, |index| ops::commit(repo, index, &args.message, &author))?;
    println!("{}", hash);
    Ok(())
}

fn cmd_log(repo: &Repo, args: LogArgs) -> dotkeeper::Result<()> {
    let limit = args.max_count.unwrap_or(usize::MAX);

    for entry in ops::log(repo)?.take(limit) {
        println!("{}", entry?);
    }
    Ok(())
}

fn cmd_ls_tree(repo: &Repo, args: LsTreeArgs) -> dotkeeper::Result<()> {
    let commit = read_commit(repo, &resolve(repo, &args.rev)?)?;

    for entry in ops::ls_tree(repo, &commit.tree)? {
        if entry.entry.kind.is_blob() {
            println!("{}", entry);
        }
    }
    Ok(())
}

fn cmd_cat_file(repo: &Repo, args: CatFileArgs) -> dotkeeper::Result<()> {
    let hash = Hash::from_hex(&args.object)?;

    match args.object_type.as_str() {
        "blob" => {
            let data = read_blob(repo, &hash)?;
            io::stdout().write_all(&data).map_err(|e| Error::Io {
                path: "stdout".into(),
                source: e,
            })?;
        }
        "tree" => {
            let tree = read_tree(repo, &hash)?;
            for entry in tree.entries() {
                println!(
                    "{:06o} {} {}\t{}",
                    entry.kind.mode(),
                    entry.type_name(),
                    entry.kind.hash(),
                    entry.name
                );
            }
        }
        "commit" => {
            let commit = read_commit(repo, &hash)?;
            println!("tree {}", commit.tree);
            if let Some(parent) = commit.parent {
                println!("parent {}", parent);
            }
            println!("author {}", commit.author);
            println!("timestamp {}", commit.timestamp);
            println!();
            println!("{}", commit.message);
        }
        _ => return Err(Error::InvalidObjectType(args.object_type)),
    }
    Ok(())
}

/// resolve a command line path against the working directory
fn absolute(path: &Path) -> dotkeeper::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::Io {
        path: ".".into(),
        source: e,
    })?;
    Ok(cwd.join(path))
}

fn absolute_all(paths: &[PathBuf]) -> dotkeeper::Result<Vec<PathBuf>> {
    paths.iter().map(|p| absolute(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_args(argv: &[&str]) -> CommitArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Commit(args) => args,
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn test_commit_message_is_optional() {
        let args = commit_args(&["dotkeeper", "commit"]);
        assert_eq!(args.message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(args.author, None);

        let args = commit_args(&["dotkeeper", "commit", "--message", "track vimrc"]);
        assert_eq!(args.message, "track vimrc");
    }
}
