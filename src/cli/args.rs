//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// embedbin - materialize executables into a content-addressed cache
///
/// Writes a binary to `<cache-root>/embedbin/<name>-<sha256>` once and
/// reuses it on every later call.
#[derive(Parser, Debug)]
#[command(name = "embedbin")]
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
    #[arg(short, long, global = true, env = "EMBEDBIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides the config file)
    #[arg(long, global = true, env = "EMBEDBIN_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a binary into the cache and print its path
    Materialize(MaterializeArgs),

    /// Materialize a binary and run it
    Run(RunArgs),

    /// Print the canonical cache path of a binary without writing it
    Path(PathArgs),

    /// Inspect the cache directory
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Binary selection shared by materialize and run
#[derive(Parser, Debug)]
pub struct BinaryArgs {
    /// File whose bytes are materialized
    pub file: PathBuf,

    /// Logical name (defaults to the file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Permission mode in octal (default: from config)
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<u32>,
}

impl BinaryArgs {
    /// Logical name for the binary
    pub fn logical_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| default_name(&self.file))
    }
}

/// Arguments for the materialize command
#[derive(Parser, Debug)]
pub struct MaterializeArgs {
    #[command(flatten)]
    pub binary: BinaryArgs,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub binary: BinaryArgs,

    /// Arguments passed to the binary
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// File whose bytes determine the path
    pub file: PathBuf,

    /// Logical name (defaults to the file stem)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache directory
    Dir,

    /// List cached binaries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
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
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one path per line)
    Plain,
}

/// Logical name derived from a file path
pub fn default_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "binary".to_string())
}

/// Parse an octal permission mode such as `755` or `0o700`
fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("invalid octal mode '{s}'"))?;
    if mode > 0o7777 {
        return Err(format!("mode '{s}' is out of range"));
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_valid() {
        assert_eq!(parse_mode("755").unwrap(), 0o755);
        assert_eq!(parse_mode("0o700").unwrap(), 0o700);
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
    }

    #[test]
    fn parse_mode_invalid() {
        assert!(parse_mode("789").is_err());
        assert!(parse_mode("rwx").is_err());
        assert!(parse_mode("17777").is_err());
    }

    #[test]
    fn default_name_from_stem() {
        assert_eq!(default_name(Path::new("/build/hello.exe")), "hello");
        assert_eq!(default_name(Path::new("tool")), "tool");
    }

    #[test]
    fn cli_parses_run() {
        let cli = Cli::parse_from(["embedbin", "run", "./hello", "--mode", "700", "--", "-x", "y"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.binary.file, PathBuf::from("./hello"));
                assert_eq!(args.binary.mode, Some(0o700));
                assert_eq!(args.binary.logical_name(), "hello");
                assert_eq!(args.args, vec!["-x", "y"]);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_materialize_with_name() {
        let cli = Cli::parse_from(["embedbin", "materialize", "a.out", "--name", "tool"]);
        match cli.command {
            Commands::Materialize(args) => {
                assert_eq!(args.binary.logical_name(), "tool");
                assert!(args.binary.mode.is_none());
            }
            _ => panic!("expected Materialize command"),
        }
    }

    #[test]
    fn cli_parses_cache_list() {
        let cli = Cli::parse_from(["embedbin", "cache", "list", "--format", "json"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::List { format },
            }) => assert!(matches!(format, OutputFormat::Json)),
            _ => panic!("expected Cache List command"),
        }
    }

    #[test]
    fn cli_global_cache_root() {
        let cli = Cli::parse_from(["embedbin", "cache", "dir", "--cache-root", "/srv/cache"]);
        assert_eq!(cli.cache_root, Some(PathBuf::from("/srv/cache")));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["embedbin", "cache", "dir"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["embedbin", "-v", "cache", "dir"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["embedbin", "-vv", "cache", "dir"]);
        assert_eq!(cli.verbose, 2);
    }
}
