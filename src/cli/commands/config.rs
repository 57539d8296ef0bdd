//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SliceError, SliceResult};
use crate::format::FormatKind;
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `sb config set`
const VALID_KEYS: [&str; 11] = [
    "general.verbose",
    "general.log_format",
    "registry.root",
    "registry.major",
    "registry.os",
    "output.format",
    "output.dir",
    "fetch.branches_url",
    "fetch.archive_url",
    "build.runtime",
    "build.tag_prefix",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> SliceResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SliceResult<()> {
    let toml = toml::to_string_pretty(config)?;
    println!("{}", toml);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> SliceResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> SliceResult<()> {
    let ctx = UiContext::detect();

    let mut updated = config.clone();
    if let Err(e) = apply_value(&mut updated, key, value) {
        if matches!(e, SliceError::User(ref msg) if msg.starts_with("Unknown config key")) {
            ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        }
        return Err(e);
    }

    manager.save(&updated).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Set a dot-separated key on `config`
fn apply_value(config: &mut Config, key: &str, value: &str) -> SliceResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => {
            if !matches!(value, "text" | "json") {
                return Err(SliceError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )));
            }
            config.general.log_format = value.to_string();
        }

        ["registry", "root"] => config.registry.root = PathBuf::from(value),
        ["registry", "major"] => config.registry.major = Some(parse_u32(value)?),
        ["registry", "os"] => config.registry.os = value.to_string(),

        ["output", "format"] => {
            config.output.format = FormatKind::parse(value)?.as_str().to_string()
        }
        ["output", "dir"] => config.output.dir = PathBuf::from(value),

        ["fetch", "branches_url"] => config.fetch.branches_url = value.to_string(),
        ["fetch", "archive_url"] => config.fetch.archive_url = value.to_string(),

        ["build", "runtime"] => config.build.runtime = value.to_string(),
        ["build", "tag_prefix"] => config.build.tag_prefix = value.to_string(),

        _ => return Err(SliceError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_bool(value: &str) -> SliceResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SliceError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u32(value: &str) -> SliceResult<u32> {
    value
        .parse()
        .map_err(|_| SliceError::User(format!("Invalid number: {}", value)))
}
