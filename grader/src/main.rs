use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use grader::{cli, logging};

#[derive(Parser)]
#[command(name = "grader", version, about = "Weighted check-based assignment grader")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the results file for the session described by CONFIG_FILE.
    Setup {
        config_file: PathBuf,
        /// Overwrite the results file if it already exists.
        #[arg(short = 'x', long)]
        overwrite: bool,
        /// Update the results file with checks added to the rubric.
        #[arg(short = 'u', long)]
        update: bool,
    },
    /// Write an example rubric file.
    ExampleRubric {
        rubric_file: PathBuf,
        /// Overwrite the rubric file if it already exists.
        #[arg(short = 'x', long)]
        overwrite: bool,
    },
    /// Run checks that have not produced a result yet.
    Run {
        config_file: PathBuf,
        /// Force all checks to run, including resolved ones.
        #[arg(short, long)]
        force: bool,
        /// The working directory to run checks from.
        #[arg(short = 'd', long, default_value = ".")]
        working_directory: PathBuf,
    },
    /// Score a results file and print the grading report.
    Summary { results_file: PathBuf },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Setup {
            config_file,
            overwrite,
            update,
        } => cli::setup(&config_file, overwrite, update),
        Command::ExampleRubric {
            rubric_file,
            overwrite,
        } => cli::write_example_rubric(&rubric_file, overwrite),
        Command::Run {
            config_file,
            force,
            working_directory,
        } => cli::run_checks(&config_file, force, &working_directory),
        Command::Summary { results_file } => cli::print_summary(&results_file),
    }
}
