//! `validate` command implementation.

use std::collections::HashSet;

use anyhow::{Context, Result};
use contracts::ServiceConfigList;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    service_count: usize,
    endpoints: Vec<String>,
    subscriptions: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.service_config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.service_config.display().to_string();

    if !args.service_config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.service_config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.service_config) {
        Ok(configs) => {
            let warnings = collect_warnings(&configs);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&configs)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(configs: &ServiceConfigList) -> ConfigSummary {
    ConfigSummary {
        service_count: configs.configs.len(),
        endpoints: configs
            .endpoints()
            .map(|c| format!("{}@{}:{}", c.name, c.host, c.port.unwrap_or_default()))
            .collect(),
        subscriptions: configs
            .subscriptions()
            .map(|s| {
                format!(
                    "{}{} (every {})",
                    s.service_name().unwrap_or_default(),
                    s.path(),
                    s.every_n
                )
            })
            .collect(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(configs: &ServiceConfigList) -> Vec<String> {
    let mut warnings = Vec::new();

    if configs.subscriptions().next().is_none() {
        warnings.push("No subscriptions configured - nothing will be displayed".to_string());
    }

    let subscribed: HashSet<&str> = configs
        .subscriptions()
        .filter_map(|s| s.service_name())
        .collect();
    for endpoint in configs.endpoints() {
        if !subscribed.contains(endpoint.name.as_str()) {
            warnings.push(format!("Service '{}' has no subscriptions", endpoint.name));
        }
        if !endpoint.subscriptions.is_empty() {
            warnings.push(format!(
                "Service '{}' has a port; its own subscription list is ignored",
                endpoint.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Services: {}", summary.service_count);
            println!("  Endpoints:");
            for endpoint in &summary.endpoints {
                println!("    - {}", endpoint);
            }
            println!("  Subscriptions:");
            for subscription in &summary.subscriptions {
                println!("    - {}", subscription);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
