use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_JSON: &str = "json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the identity API")
                .default_value("http://localhost:8080")
                .env("KYCFLOW_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long(ARG_STATE_FILE)
                .help("File keeping the session between commands")
                .long_help(
                    "File keeping correlation ids, verification flags, the bearer token and the current page between commands. Created with owner-only permissions.",
                )
                .default_value("kycflow-session.json")
                .env("KYCFLOW_STATE_FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .default_value("10")
                .env("KYCFLOW_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new(ARG_JSON)
                .long(ARG_JSON)
                .help("Print results as { success, data, error } JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: String,
    pub state_file: PathBuf,
    pub timeout: Duration,
    pub json: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .context("missing required argument: --api-url")?;
        let state_file = matches
            .get_one::<PathBuf>(ARG_STATE_FILE)
            .cloned()
            .context("missing required argument: --state-file")?;
        let timeout = matches
            .get_one::<u64>(ARG_TIMEOUT)
            .copied()
            .map(Duration::from_secs)
            .context("missing required argument: --timeout")?;

        Ok(Self {
            api_url,
            state_file,
            timeout,
            json: matches.get_flag(ARG_JSON),
        })
    }
}
