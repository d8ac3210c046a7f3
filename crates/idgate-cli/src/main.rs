#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use config::{Action, CliArgs, Config};
use idgate::{IdGenerator, LockIdGenerator, SystemClock};
use telemetry::init_telemetry;

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Unauthorized,
}

fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry()?;

    let outcome = run(&config, &mut io::stdout().lock())?;
    Ok(match outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Unauthorized => ExitCode::FAILURE,
    })
}

fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<Outcome> {
    match &config.action {
        Action::Id { count } => {
            let node_id = config.node_id();
            tracing::info!(%node_id, count, "generating identifiers");
            let generator = LockIdGenerator::new(node_id, SystemClock::default());
            for _ in 0..*count {
                writeln!(out, "{}", generator.generate_i64()?)?;
            }
        }
        Action::Issue {
            user_id,
            email,
            ttl,
        } => {
            let token = config.authenticator()?.issue(*user_id, email, *ttl)?;
            tracing::info!(user_id, ttl, "issued token");
            writeln!(out, "{token}")?;
        }
        Action::Verify { credential } => match config.authenticator()?.authenticate(credential) {
            Ok(claims) => writeln!(out, "{}", serde_json::to_string_pretty(&claims)?)?,
            Err(reason) => {
                tracing::warn!(%reason, "credential rejected");
                writeln!(out, "{}", reason.public_message())?;
                return Ok(Outcome::Unauthorized);
            }
        },
        Action::Node => writeln!(out, "{}", config.node_id())?,
    }
    Ok(Outcome::Success)
}
