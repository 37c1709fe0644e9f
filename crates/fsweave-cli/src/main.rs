//! fsweave CLI - Build, walk and query directory trees
//!
//! Usage:
//!   fsweave build tree.json --root /tmp/sandbox   # Materialize a tree descriptor
//!   fsweave walk / --root /tmp/sandbox            # List entries in walk order
//!   fsweave contains /home/user/x /home/user      # Containment by identity

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fsweave::{Builder, BuilderOptions, Entry, Fs, OsFs, PathFs, WalkControl};
use tracing_subscriber::EnvFilter;

type DynFs = dyn Fs<File = std::fs::File>;

/// fsweave - Composable filesystem layers
#[derive(Parser, Debug)]
#[command(name = "fsweave")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a JSON tree descriptor under a directory
    Build {
        /// Descriptor file (`-` for stdin)
        descriptor: PathBuf,

        /// Directory the tree is built under; created if missing
        #[arg(long)]
        root: PathBuf,

        /// Octal umask applied to every created entry
        #[arg(long, default_value = "022", value_parser = parse_octal)]
        umask: u32,

        /// Log every action taken
        #[arg(short, long)]
        verbose: bool,
    },

    /// List a tree in walk order: type, permissions, size, path
    Walk {
        #[arg(default_value = "/")]
        path: PathBuf,

        /// Resolve paths under this directory
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print whether PATH is PREFIX or lies beneath it (exit 1 if not)
    Contains {
        path: PathBuf,
        prefix: PathBuf,

        /// Resolve paths under this directory
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

// A umask only ever clears rwx bits, so anything above 0o777 is a typo. File
// modes in descriptors may also carry setuid/setgid/sticky and allow 0o7777.
fn parse_octal(text: &str) -> std::result::Result<u32, String> {
    let digits = text.strip_prefix("0o").unwrap_or(text);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o777 => Ok(mode),
        _ => Err(format!("invalid octal mode: {text}")),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(matches!(args.command, Command::Build { verbose: true, .. }))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args.command, &mut out)
}

fn init_logging(verbose: bool) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive("fsweave::build=info".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

fn run(command: Command, out: &mut impl Write) -> Result<ExitCode> {
    match command {
        Command::Build {
            descriptor,
            root,
            umask,
            verbose,
        } => {
            let options = BuilderOptions::new().umask(umask).verbose(verbose);
            build(&descriptor, &root, options)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Walk { path, root } => {
            let fs = open_fs(root);
            list(&*fs, &path, out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Contains { path, prefix, root } => {
            let fs = open_fs(root);
            let contained = fsweave::contains(&*fs, &path, &prefix)
                .with_context(|| format!("checking {} against {}", path.display(), prefix.display()))?;
            writeln!(out, "{contained}")?;
            Ok(if contained {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn open_fs(root: Option<PathBuf>) -> Box<DynFs> {
    match root {
        Some(root) => Box::new(PathFs::new(OsFs::new(), root)),
        None => Box::new(OsFs::new()),
    }
}

fn read_descriptor(descriptor: &Path) -> Result<Entry> {
    let text = if descriptor == Path::new("-") {
        io::read_to_string(io::stdin()).context("reading descriptor from stdin")?
    } else {
        std::fs::read_to_string(descriptor)
            .with_context(|| format!("reading descriptor {}", descriptor.display()))?
    };
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing descriptor {}", descriptor.display()))?;
    Ok(Entry::from_json(&value)?)
}

fn build(descriptor: &Path, root: &Path, options: BuilderOptions) -> Result<()> {
    let entry = read_descriptor(descriptor)?;
    let builder = Builder::new(options);
    builder
        .mkdir_all(&OsFs::new(), root, fsweave::DEFAULT_DIR_PERM)
        .with_context(|| format!("creating root {}", root.display()))?;
    let fs = PathFs::new(OsFs::new(), root);
    builder
        .build(&fs, "/", &entry)
        .with_context(|| format!("building under {}", root.display()))
}

fn list(fs: &DynFs, path: &Path, out: &mut impl Write) -> Result<()> {
    fsweave::walk_slash(fs, path, |path, info| -> Result<WalkControl> {
        match info {
            Ok(metadata) => {
                writeln!(
                    out,
                    "{} {:04o} {:>8} {}",
                    metadata.file_type.as_char(),
                    metadata.perm(),
                    metadata.size,
                    path
                )?;
                Ok(WalkControl::Continue)
            }
            Err(err) if err.is_permission_denied() => {
                tracing::warn!(path, error = %err, "skipping unreadable entry");
                Ok(WalkControl::SkipDir)
            }
            Err(err) => Err(err.into()),
        }
    })
}
