//! packjar CLI - rebuilds JAR libraries from `.pack.xz` bundles.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{CompressionLevel, UnpackOptions, cmd_detect, cmd_inspect, cmd_list, cmd_unpack};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "packjar")]
#[command(
    author,
    version,
    about = "Rebuild JAR libraries from pack200 .pack.xz bundles"
)]
#[command(long_about = "
packjar decompresses a .pack.xz bundle, checks its SIGN trailer, expands the
pack200 body with unpack200 and writes a JAR holding the expanded classes
plus a checksums.sha1 entry.

Examples:
  packjar unpack scala-library.jar.pack.xz scala-library.jar
  packjar unpack lib.jar.pack.xz lib.jar --unpack200 /opt/jdk8/bin/unpack200
  packjar inspect lib.jar.pack.xz --json
  packjar list lib.jar -v -I 'scala/*'
  packjar detect lib.jar.pack.xz
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a JAR from a .pack.xz bundle
    #[command(alias = "u")]
    Unpack {
        /// Input .pack.xz file
        input: PathBuf,

        /// Output JAR file (replaced if it exists)
        output: PathBuf,

        /// unpack200 executable used to expand the pack200 body
        #[arg(long, env = "PACKJAR_UNPACK200", default_value = "unpack200")]
        unpack200: PathBuf,

        /// Directory for the scratch pack file (system temp dir if unset)
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Compression level for expanded entries
        #[arg(short = 'l', long, value_enum, default_value = "normal")]
        compression: CompressionLevel,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Suppress progress output
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,
    },

    /// Show the layout of a .pack.xz bundle without unpacking it
    #[command(alias = "i")]
    Inspect {
        /// Input .pack.xz file
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// List contents of a JAR
    #[command(alias = "l")]
    List {
        /// JAR file to list
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only files matching pattern (glob syntax: *.class, scala/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude files matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Detect file format
    Detect {
        /// File to detect
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Unpack {
            input,
            output,
            unpack200,
            scratch_dir,
            compression,
            verbose,
            quiet,
        } => cmd_unpack(&UnpackOptions {
            input: &input,
            output: &output,
            unpack200: &unpack200,
            scratch_dir: scratch_dir.as_deref(),
            compression,
            verbose,
            quiet,
        }),
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
        Commands::List {
            archive,
            verbose,
            json,
            include,
            exclude,
        } => cmd_list(&archive, verbose, json, &include, &exclude),
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "packjar", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
