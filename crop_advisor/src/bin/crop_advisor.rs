//! Crop advisor command-line front end.
//!
//! Fills the measurement form from `key=value` arguments, submits it once and
//! prints the resulting view.
//!
//! # Usage
//!
//! ```bash
//! crop-advisor N=90 P=42 K=43 temperature=20.8 humidity=82 ph=6.5 rainfall=202.9
//! crop-advisor --config ./advisor.toml N=90 ...
//! ```
//!
//! # Environment Variables
//!
//! - `CROP_ADVISOR_URL`: Prediction service base URL
//! - `CROP_ADVISOR_VALIDATION`: `bounded` or `legacy`
//! - `CROP_ADVISOR_CLIENT`: `http` or `scripted`
//! - `RUST_LOG`: Log level (default: warn)

use std::env;

use anyhow::{bail, Context, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crop_advisor::client::ClientFactory;
use crop_advisor::presentation::render_text;
use crop_advisor::{AdvisorConfig, Field, FormEvent, SubmissionOrchestrator, SubmitOutcome};

struct CliArgs {
    config_path: Option<String>,
    values: Vec<(Field, String)>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut config_path = None;
    let mut values = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = Some(args.next().context("--config requires a path")?);
            continue;
        }
        let Some((key, value)) = arg.split_once('=') else {
            bail!("Expected key=value, got '{}'", arg);
        };
        let field = Field::from_wire_name(key).map_err(|e| anyhow::anyhow!(e))?;
        values.push((field, value.to_string()));
    }

    Ok(CliArgs { config_path, values })
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;

    let config = match &args.config_path {
        Some(path) => AdvisorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => AdvisorConfig::from_default_location()?,
    }
    .with_env_overrides();

    let client =
        ClientFactory::create(&config.service).context("Failed to create prediction client")?;
    let validator = config.validator()?;
    let mut orchestrator =
        SubmissionOrchestrator::new(client, validator, config.estimator(), config.catalog());

    for (field, raw) in args.values {
        orchestrator.dispatch(FormEvent::FieldChanged { field, raw }).await;
    }
    let outcome = orchestrator.dispatch(FormEvent::Submit).await;

    print!("{}", render_text(orchestrator.settled_view()));

    match outcome {
        Some(SubmitOutcome::Succeeded) => Ok(()),
        Some(SubmitOutcome::Invalid { focus }) => bail!("Invalid input for {}", focus),
        Some(SubmitOutcome::Failed(e)) => Err::<(), _>(e).context("Prediction failed"),
        Some(SubmitOutcome::Busy) | None => bail!("Submission did not run"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(strings(&["--config", "a.toml", "N=90", "ph=6.5"])).unwrap();
        assert_eq!(args.config_path.as_deref(), Some("a.toml"));
        assert_eq!(
            args.values,
            vec![(Field::Nitrogen, "90".to_string()), (Field::Ph, "6.5".to_string())]
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(strings(&["--config"])).is_err());
        assert!(parse_args(strings(&["N"])).is_err());
        assert!(parse_args(strings(&["zinc=4"])).is_err());
    }
}
