//! a7zip CLI - archive sessions from the command line
//!
//! Lists, extracts, tests and creates archives through the a7zip engine:
//! ZIP, TAR, GZIP and split volume sets (`name.001`, `name.002`, ...).

mod commands;
mod session;
mod utils;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use commands::{ExtractOptions, ListOptions, OutputFormat};
use session::ArchiveArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "a7zip")]
#[command(author, version, about = "Archive sessions over the a7zip engine")]
#[command(long_about = "
a7zip opens archives through a handle-based extraction engine.
Supported formats: ZIP, GZIP, TAR and split volume sets (.001)

Examples:
  a7zip list archive.zip
  a7zip list --json archive.tar
  a7zip extract archive.zip -o out
  a7zip extract multi-volume.zip.001
  a7zip extract --charset gbk legacy.zip
  a7zip test *.zip
  a7zip create archive.zip file1.txt folder
  a7zip info archive.zip
")]
struct Cli {
    /// More output; repeat for debug logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Password for encrypted archives (prompted for if needed)
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Charset of entry names and comments (e.g. gbk, shift_jis, cp437)
    #[arg(long, global = true)]
    charset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only files matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude files matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract files from an archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Files to extract (all if empty)
        files: Vec<String>,

        /// Include only files matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude files matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Test archive integrity
    #[command(alias = "t")]
    Test {
        /// Archive files to test
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },

    /// Create a new archive
    #[command(alias = "c")]
    Create {
        /// Output archive file
        archive: PathBuf,

        /// Files and directories to add
        files: Vec<PathBuf>,

        /// Archive format (guessed from the archive name if not given)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show information about an archive
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 | 1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let verbose = cli.verbose > 0;
    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "a7zip", &mut io::stdout());
        return Ok(());
    }

    let charset = match cli.charset.as_deref() {
        Some(label) => Some(
            a7zip::charset::for_label(label).ok_or_else(|| format!("Unknown charset: {label}"))?,
        ),
        None => None,
    };
    let args = ArchiveArgs::new(cli.password, charset);
    a7zip::initialize()?;

    match cli.command {
        Commands::List {
            archive,
            json,
            include,
            exclude,
        } => commands::cmd_list(
            &archive,
            &args,
            &ListOptions {
                verbose,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            files,
            include,
            exclude,
            no_progress,
        } => commands::cmd_extract(
            &archive,
            &args,
            &ExtractOptions {
                output: &output,
                files: &files,
                include: &include,
                exclude: &exclude,
                verbose,
                progress: !no_progress,
            },
        ),
        Commands::Test { archives } => commands::cmd_test(&archives, &args, verbose),
        Commands::Create {
            archive,
            files,
            format,
        } => commands::cmd_create(&archive, &files, format, verbose),
        Commands::Info { archive } => commands::cmd_info(&archive, &args),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
