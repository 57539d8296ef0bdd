//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// slicebuild - assemble build scripts from versioned slices
///
/// Resolves layers and their dependencies from a local slice registry
/// and renders them as a shell script or a Dockerfile.
#[derive(Parser, Debug)]
#[command(name = "sb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Slice registry root (overrides registry.root)
    #[arg(long, global = true, env = "SB_ROOT")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List slices available for an OS
    Find(FindArgs),

    /// Render layers into a shell script or Dockerfile
    Make(MakeArgs),

    /// Download the latest compatible slice registry
    Fetch(FetchArgs),

    /// Render layers as a Dockerfile and build it
    Test(TestArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the find command
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Only list slices whose name contains one of these
    pub names: Vec<String>,

    /// Target OS (defaults to registry.os)
    #[arg(long)]
    pub os: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Print each slice rendered as shell
    #[arg(long)]
    pub show: bool,
}

/// Arguments for the make command
#[derive(Parser, Debug)]
pub struct MakeArgs {
    /// Comma-separated layers, e.g. jekyll,ruby-2.3
    pub layers: String,

    /// Target OS, e.g. debian-8 (defaults to registry.os)
    pub os: Option<String>,

    /// Output format: sh[ell] or d[ocker] (defaults to output.format)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file, or - for stdout (defaults to <output.dir>/<label>/...)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Branch to download instead of the newest compatible one
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Archive URL to download instead of the configured one
    #[arg(long)]
    pub url: Option<String>,

    /// Replace existing registry directories without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Comma-separated layers, e.g. jekyll,ruby-2.3
    pub layers: String,

    /// Target OS, e.g. debian-8 (defaults to registry.os)
    pub os: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., registry.os)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

/// Output format for the find command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn make_takes_layers_and_os() {
        let cli = Cli::parse_from(["sb", "make", "jekyll,ruby", "debian-8", "-f", "docker"]);
        match cli.command {
            Commands::Make(args) => {
                assert_eq!(args.layers, "jekyll,ruby");
                assert_eq!(args.os.as_deref(), Some("debian-8"));
                assert_eq!(args.format.as_deref(), Some("docker"));
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["sb", "find", "ruby", "-vv", "--root", "/srv/slices"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/slices")));
    }
}
