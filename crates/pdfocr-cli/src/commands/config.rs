//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use pdfocr_core::models::config::PdfocrConfig;

use super::config_file;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "pdf.render_dpi")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (parsed as JSON, falling back to a string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_file(config_path);
    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn read_or_default(path: &Path) -> anyhow::Result<PdfocrConfig> {
    if path.exists() {
        Ok(PdfocrConfig::from_file(path)?)
    } else {
        Ok(PdfocrConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = read_or_default(path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| default_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    PdfocrConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Walk a dotted key through the JSON form of the config.
fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> anyhow::Result<&'a serde_json::Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_or_default(path)?)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = read_or_default(path)?;

    let parsed_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;

    let (parent_key, field) = match key.rsplit_once('.') {
        Some((parent, field)) => (Some(parent), field),
        None => (None, key),
    };

    let parent = match parent_key {
        Some(parent_key) => {
            let mut current = &mut json;
            for part in parent_key.split('.') {
                current = current.get_mut(part).ok_or_else(|| {
                    anyhow::anyhow!("Configuration path not found: {}", key)
                })?;
            }
            current
        }
        None => &mut json,
    };

    let obj = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?;
    if !obj.contains_key(field) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    obj.insert(field.to_string(), parsed_value.clone());

    let config: PdfocrConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'pdfocr config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(PdfocrConfig::default()).unwrap();
        assert_eq!(lookup(&json, "pdf.render_dpi").unwrap(), &serde_json::json!(200));
        assert!(lookup(&json, "pdf.missing").is_err());
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(set_config(&path, "pdf.bogus", "1").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(set_config(&path, "pdf.render_dpi", "\"high\"").is_err());
    }

    #[test]
    fn test_set_persists_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        set_config(&path, "concurrency.on_failure", "isolate").unwrap();

        let config = PdfocrConfig::from_file(&path).unwrap();
        assert_eq!(
            config.concurrency.on_failure,
            pdfocr_core::FailurePolicy::Isolate
        );
    }
}
