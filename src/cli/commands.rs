use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// AI-assisted vitamin deficiency screening from medical photos
#[derive(Parser, Debug)]
#[command(
    name = "vitascan",
    about = "AI-assisted vitamin deficiency screening from medical photos",
    version,
    long_about = "vitascan validates that a photo shows a relevant skin, eye, or oral \
                  condition, classifies the visible condition, infers plausible vitamin \
                  deficiencies for the diagnosis, and records the result against a patient."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a condition photo and store the report",
        long_about = "Runs the three-stage analysis pipeline on the given image and, when \
                      it completes, stores a report against the patient.\n\n\
                      Examples:\n  \
                      vitascan analyze --patient-id p-17 --name \"Asha Rao\" lesion.jpg\n  \
                      vitascan analyze --patient-id p-17 --name \"Asha Rao\" \
                      --phone 555-0102 lesion.jpg"
    )]
    Analyze(AnalyzeArgs),

    #[command(about = "List a patient's stored reports, most recent first")]
    Reports(PatientRefArgs),

    #[command(about = "Show a patient record")]
    Patient(PatientRefArgs),

    #[command(about = "Check that the inference provider is reachable")]
    Health,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Patient identifier (externally supplied natural key)
    #[arg(long, value_name = "ID")]
    pub patient_id: String,

    /// Patient name
    #[arg(long)]
    pub name: String,

    /// Patient address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Patient phone number
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Path to the condition photo
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,
}

#[derive(Args, Debug)]
pub struct PatientRefArgs {
    /// Patient identifier
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: String,
}
