#![forbid(unsafe_code)]

mod constants;
mod reconcile;
mod settings;
mod target;
#[cfg(test)]
mod test_log;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use settings::{Setting, SettingValue, SettingsRegistry, UnknownKeyPolicy};
use target::{InMemoryTarget, Slot};

#[derive(Parser, Debug)]
#[command(version, about = "Persisted game tweaks, reconciled onto a live game")]
struct Cli {
    /// Settings file to load and save
    #[arg(
        long,
        global = true,
        env = constants::settings::PATH_ENV,
        default_value = constants::settings::FILENAME
    )]
    settings: PathBuf,

    /// Ignore keys in the settings file that are not part of the catalog
    #[arg(long, global = true)]
    ignore_unknown: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every setting (or one) with its current value
    Show { id: Option<String> },
    /// Change one setting and save (use `unset` to clear a number)
    Set { id: String, value: String },
    /// Restore one setting, or all of them, to the default and save
    Reset { id: Option<String> },
    /// Print the writes one reconciliation tick would perform
    Plan,
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let policy = if cli.ignore_unknown {
        UnknownKeyPolicy::Skip
    } else {
        UnknownKeyPolicy::Reject
    };

    let mut registry = load(&cli.settings, policy)?;

    match cli.command {
        Command::Show { id: None } => registry.get_all().iter().for_each(show),
        Command::Show { id: Some(id) } => {
            show(registry.get(&id).with_context(|| format!("Failed to show '{id}'"))?)
        }
        Command::Set { id, value } => {
            registry
                .set_from_input(&id, &value)
                .with_context(|| format!("Failed to set '{id}'"))?;
            save(&registry, &cli.settings)?;
        }
        Command::Reset { id: Some(id) } => {
            registry
                .reset(&id)
                .with_context(|| format!("Failed to reset '{id}'"))?;
            save(&registry, &cli.settings)?;
        }
        Command::Reset { id: None } => {
            registry.reset_all();
            save(&registry, &cli.settings)?;
        }
        Command::Plan => plan(&registry),
    }

    Ok(())
}

fn load(path: &Path, policy: UnknownKeyPolicy) -> Result<SettingsRegistry> {
    SettingsRegistry::load_or_create(path, policy)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn save(registry: &SettingsRegistry, path: &Path) -> Result<()> {
    registry
        .save(path)
        .with_context(|| format!("Failed to save settings to {}", path.display()))
}

fn show(setting: &Setting) {
    println!("{} = {} (default: {})", setting.id(), setting.value(), setting.default_value());
    println!("    {}: {}", setting.display_name(), setting.description());
    if let SettingValue::Whitelisted(w) = setting.value() {
        println!("    allowed: {}", w.allowed_values().join(", "));
    }
}

fn plan(registry: &SettingsRegistry) {
    let mut target = InMemoryTarget::zeroed();
    let report = reconcile::tick(registry, Some(&mut target));

    for write in target.writes() {
        println!("{write}");
    }
    for slot in Slot::ALL {
        if let Some(value) = target.current(slot) {
            debug!(slot = %slot, value = value, "Slot value after planned tick");
        }
    }
    if report.skipped {
        warn!("Target not attached, nothing to plan");
    }
    if !report.is_clean() {
        for failure in &report.failures {
            warn!(
                setting = %failure.setting,
                error = %reconcile::sanitize_error(&failure.error),
                "Setting would not apply"
            );
        }
    }
    info!(
        writes = report.writes,
        failures = report.failures.len(),
        "Planned settings tick"
    );
}
