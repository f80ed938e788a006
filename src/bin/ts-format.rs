//! Timesheet formatter CLI
//!
//! Finds the newest timesheet, drops excluded employees, removes the footer
//! and adds signature lines, then opens the result.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::warn;

use ts_format::config::{Dirs, RawConfig, DEFAULT_CONFIG_NAME};
use ts_format::diagnostics::DiagnosticContext;
use ts_format::pipeline;

/// Timesheet formatter - remove excluded employees and add signature lines
#[derive(Parser)]
#[command(name = "ts-format")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Set RUST_LOG=debug to see per-page progress.")]
struct Cli {
    /// Configuration file, relative to the program's directory
    #[arg(default_value = DEFAULT_CONFIG_NAME)]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run(&cli.config));
}

/// Run the formatter and return the process exit code
fn run(config_arg: &Path) -> i32 {
    let dirs = match Dirs::detect() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let settings = match RawConfig::load(&dirs.config_path(config_arg)) {
        Ok(raw) => raw.resolve(&dirs),
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    let mut ctx = DiagnosticContext::new();
    ctx.set_environment(&dirs);
    ctx.set_settings(&settings);

    let started = chrono::Local::now().naive_local();

    let (code, show_debug) = match pipeline::run(&settings, &started, &mut ctx) {
        Ok(outcome) => {
            eprintln!(
                "Output: {} ({} of {} pages)",
                outcome.output.display(),
                outcome.summary.written_pages,
                outcome.summary.source_pages
            );
            if let Err(e) = open_file(&outcome.output) {
                warn!(error = %e, "could not open the output file");
            }
            (0, settings.debug.active)
        }
        Err(e) if e.is_expected() => {
            prompt(&format!("\n{}", e));
            return 0;
        }
        Err(e) => {
            eprintln!("{}", unexpected_failure(e));
            (1, true)
        }
    };

    if show_debug {
        println!("{}", ctx.render(&settings.debug));
        prompt("\n--- PRESS ENTER TO CONTINUE ---");
    }

    code
}

/// Full report for a failure the user cannot fix from the message alone
fn unexpected_failure(error: ts_format::Error) -> String {
    let report = anyhow::Error::new(error).context("Formatting the timesheet failed");
    format!(
        "\n\nAn unexpected error occurred. Send the details below to whoever maintains this tool.\n\n{:?}",
        report
    )
}

/// Show a message and wait for the user to press Enter
fn prompt(message: &str) {
    println!("{}", message);
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}
