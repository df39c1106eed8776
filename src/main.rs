use vitascan::cli::commands::{CliArgs, Commands};
use vitascan::cli::handlers::{handle_analyze, handle_health, handle_patient, handle_reports};
use vitascan::util::logging::{self, LoggingConfig};
use vitascan::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("vitascan v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args).await,
        Commands::Reports(reports_args) => handle_reports(reports_args),
        Commands::Patient(patient_args) => handle_patient(patient_args),
        Commands::Health => handle_health().await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        Some(logging::parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    };

    match level {
        Some(level) => logging::init_logging(LoggingConfig::with_level(level)),
        // No explicit flag: defer to VITASCAN_LOG_LEVEL / VITASCAN_LOG_JSON
        None => logging::init_from_env(),
    }
}
