use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tzar::cli::{
    build_container, extract_container, list_container, protect_container, show_info,
    unprotect_container, ExtractOptions, UnprotectOptions,
};
use tzar::TzarError;

/// Version info from build.rs
const VERSION: &str = env!("TZAR_VERSION");
const BUILD: &str = env!("TZAR_BUILD");
const PROFILE: &str = env!("TZAR_PROFILE");
const GIT_HASH: &str = env!("TZAR_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "tzar")]
#[command(author, about = "Sequential file container with optional password scrambling", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// More progress output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files and directories into a .tzar container
    #[command(alias = "c")]
    Build {
        /// Output base name; the extension is replaced by .tzar
        output: PathBuf,

        /// Files or directories to archive
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List stored paths and sizes
    #[command(alias = "l")]
    List {
        /// Container to read
        container: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract all entries, or only the named ones
    #[command(alias = "x")]
    Extract {
        /// Container to read
        container: PathBuf,

        /// Stored paths to extract (default: everything)
        names: Vec<String>,

        /// Destination directory
        #[arg(long, default_value = ".")]
        dest: PathBuf,

        /// Password, needed for protected containers
        #[arg(long, env = "TZAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Scramble a .tzar container into a .tzar2 container
    #[command(alias = "p")]
    Protect {
        /// Plain container to read
        container: PathBuf,

        /// Output base name; the extension is replaced by .tzar2
        output: PathBuf,

        /// Password the key is derived from
        #[arg(long, env = "TZAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Unscramble a .tzar2 container into a directory named after it
    #[command(alias = "u")]
    Unprotect {
        /// Protected container to read
        container: PathBuf,

        /// Directory the output directory is created in
        #[arg(long, default_value = ".")]
        dest: PathBuf,

        /// Password the key is derived from
        #[arg(long, env = "TZAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show information about a container
    #[command(alias = "i")]
    Info {
        /// Container to inspect
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn require_password(password: Option<String>) -> Result<String, TzarError> {
    match password {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(TzarError::PasswordRequired),
    }
}

fn run(command: Commands) -> Result<(), TzarError> {
    match command {
        Commands::Build { output, inputs } => {
            let report = build_container(&output, &inputs)?;
            println!(
                "Archived {} files and {} directories ({} bytes) to {}",
                report.files,
                report.directories,
                report.bytes,
                report.path.display()
            );
            if !report.warnings.is_empty() {
                println!("{} items skipped", report.warnings.len());
            }
        }

        Commands::List { container, json } => {
            let listing = list_container(&container)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for entry in &listing.entries {
                    println!("{}\t{}", entry.size, entry.path);
                }
            }
        }

        Commands::Extract {
            container,
            names,
            dest,
            password,
        } => {
            let options = ExtractOptions {
                targets: names,
                password,
                dest,
            };
            let report = extract_container(&container, &options)?;
            println!(
                "Extracted {} items, skipped {} items",
                report.extracted, report.skipped
            );
            for name in &report.unmatched {
                println!("Not found: {}", name);
            }
        }

        Commands::Protect {
            container,
            output,
            password,
        } => {
            let password = require_password(password)?;
            let report = protect_container(&container, &output, &password)?;
            println!(
                "Protected {} entries to {}",
                report.entries,
                report.path.display()
            );
        }

        Commands::Unprotect {
            container,
            dest,
            password,
        } => {
            let options = UnprotectOptions {
                password: require_password(password)?,
                dest,
            };
            let report = unprotect_container(&container, &options)?;
            println!(
                "Extracted {} items to {}",
                report.extract.extracted,
                report.output_dir.display()
            );
        }

        Commands::Info { file } => {
            print!("{}", show_info(&file)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("tzar {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
