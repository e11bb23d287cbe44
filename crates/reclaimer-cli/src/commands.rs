use clap::{Parser, Subcommand, ValueEnum};
use reclaimer_core::Sensitivity;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reclaimer")]
#[command(about = "Find duplicate files, pick the copy to keep, and trash the rest reversibly", long_about = None)]
pub struct Cli {
    /// Only show warnings and errors on the console
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index the configured root paths and write the file records as JSON
    Index {
        /// Write records here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Group duplicates and suggest which copy to keep
    Analyze {
        /// JSON file of file records; indexes the configured root paths when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Overrides the configured sensitivity
        #[arg(short, long, value_enum)]
        sensitivity: Option<SensitivityArg>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve duplicate groups with the configured rules
    ApplyRules {
        /// JSON file of file records; indexes the configured root paths when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Overrides the configured sensitivity
        #[arg(short, long, value_enum)]
        sensitivity: Option<SensitivityArg>,
        /// Move the resolved delete sets into the trash ledger and report its status
        #[arg(long)]
        trash: bool,
    },
    /// Compare two files side by side and recommend which one to keep
    Compare {
        first: PathBuf,
        second: PathBuf,
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the category of a file extension
    FileType { extension: String },
    /// Print configuration values
    PrintConfig,
}

impl Cli {
    /// Whether the command writes machine-readable output to stdout.
    pub fn emits_data(&self) -> bool {
        match &self.command {
            Some(Commands::Index { output }) => output.is_none(),
            Some(Commands::Analyze { json, .. }) | Some(Commands::Compare { json, .. }) => *json,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SensitivityArg {
    Low,
    Medium,
    High,
}

impl From<SensitivityArg> for Sensitivity {
    fn from(arg: SensitivityArg) -> Self {
        match arg {
            SensitivityArg::Low => Sensitivity::Low,
            SensitivityArg::Medium => Sensitivity::Medium,
            SensitivityArg::High => Sensitivity::High,
        }
    }
}
