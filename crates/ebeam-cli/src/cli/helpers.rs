use super::CliError;
use anyhow::Context;
use ebeam_core::BeamSettings;
use ebeam_core::serialization::write_beam_settings;
use ebeam_core::settings::StaleField;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub(super) fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second initialisation (repeated in-process runs) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Asks `prompt` on stderr and reads a yes/no answer from `input`.
/// Anything other than an explicit yes, including end of input, declines.
pub(super) fn confirm_on<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> bool {
    if write!(output, "{prompt} [y/N] ").and_then(|_| output.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}

pub(super) fn confirm_on_terminal(prompt: &str) -> bool {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stderr();
    confirm_on(&mut input, &mut output, prompt)
}

pub(super) fn print_settings_json(settings: &BeamSettings) -> anyhow::Result<()> {
    let rendered =
        serde_json::to_string_pretty(settings).context("failed to render settings as JSON")?;
    println!("{rendered}");
    Ok(())
}

pub(super) fn emit_settings(settings: &BeamSettings, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            write_beam_settings(path, settings)?;
            println!("Settings written to {}", path.display());
        }
        None => print_settings_json(settings)?,
    }
    Ok(())
}

pub(super) fn render_stale_fields(stale: &[StaleField]) -> String {
    if stale.is_empty() {
        return "Derived views: up to date".to_string();
    }

    let mut lines = vec![format!("Derived views: {} stale field(s)", stale.len())];
    for field in stale {
        lines.push(format!(
            "  {}: stored {:e}, derived {:e}",
            field.field, field.stored, field.derived
        ));
    }
    lines.join("\n")
}
