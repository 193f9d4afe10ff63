//! CLI tool for zpack compression and containers.

mod commands;
mod exit_codes;
mod logger;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// DEFLATE compressor and container tool
#[derive(Parser)]
#[command(name = "zpack")]
#[command(author, version, about = "DEFLATE compressor and container tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a single file (alias: c)
    #[command(alias = "c")]
    Compress {
        /// File to compress
        source: PathBuf,

        /// Compressed output file
        dest: PathBuf,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "9")]
        level: u32,

        /// Emit bare DEFLATE without the zlib header and trailer
        #[arg(long)]
        raw: bool,
    },

    /// Decompress a single file (alias: d)
    #[command(alias = "d")]
    Decompress {
        /// Compressed input file
        source: PathBuf,

        /// Decompressed output file
        dest: PathBuf,

        /// Input is bare DEFLATE without the zlib header and trailer
        #[arg(long)]
        raw: bool,
    },

    /// Compress files and bundle them into a container (alias: a)
    #[command(alias = "a")]
    Pack {
        /// Container file to create
        archive: PathBuf,

        /// Files to add, optionally renamed with FILE=NAME
        #[arg(required = true, value_name = "FILE[=NAME]")]
        files: Vec<String>,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "9")]
        level: u32,

        /// Largest member in bytes read whole into memory before writing
        #[arg(long, value_name = "BYTES")]
        max_buffered: Option<u64>,
    },

    /// Extract members from a container (alias: x)
    #[command(alias = "x")]
    Unpack {
        /// Container file to read
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Extract only the first member
        #[arg(long)]
        first: bool,

        /// How member names are mapped to output paths
        #[arg(long, value_enum, default_value = "strict")]
        path_safety: PathSafetyArg,
    },

    /// List container members (alias: l)
    #[command(alias = "l")]
    List {
        /// Container file to list
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PathSafetyArg {
    Strict,
    Relaxed,
    Disabled,
}

impl From<PathSafetyArg> for zpack::PathSafety {
    fn from(arg: PathSafetyArg) -> Self {
        match arg {
            PathSafetyArg::Strict => zpack::PathSafety::Strict,
            PathSafetyArg::Relaxed => zpack::PathSafety::Relaxed,
            PathSafetyArg::Disabled => zpack::PathSafety::Disabled,
        }
    }
}

fn main() {
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();
    logger::init(cli.verbose);

    let exit_code = match cli.command {
        Commands::Compress {
            source,
            dest,
            level,
            raw,
        } => commands::compress(&commands::CompressConfig {
            source: &source,
            dest: &dest,
            level,
            raw,
            format: cli.format,
        }),

        Commands::Decompress { source, dest, raw } => {
            commands::decompress(&source, &dest, raw, cli.format)
        }

        Commands::Pack {
            archive,
            files,
            level,
            max_buffered,
        } => commands::pack(&commands::PackConfig {
            archive_path: &archive,
            files: &files,
            level,
            max_buffered,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Unpack {
            archive,
            output,
            first,
            path_safety,
        } => commands::unpack(&commands::UnpackConfig {
            archive_path: &archive,
            output_dir: &output,
            first,
            path_safety: path_safety.into(),
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::List { archive } => commands::list(&archive, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
