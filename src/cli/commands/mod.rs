pub mod account;
pub mod api;
pub mod logging;
pub mod register;
pub mod sandbox;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("kycflow")
        .about("Retailer portal: login, recovery and KYC registration")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(account::login())
        .subcommand(account::recover())
        .subcommand(account::reset())
        .subcommand(register::register())
        .subcommand(account::status())
        .subcommand(sandbox::sandbox());

    let command = api::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CLEARED: [(&str, Option<&str>); 8] = [
        ("KYCFLOW_API_URL", None),
        ("KYCFLOW_STATE_FILE", None),
        ("KYCFLOW_TIMEOUT", None),
        ("KYCFLOW_LOG_LEVEL", None),
        ("KYCFLOW_USERNAME", None),
        ("KYCFLOW_PASSWORD", None),
        ("KYCFLOW_SANDBOX_PORT", None),
        ("OTEL_EXPORTER_OTLP_ENDPOINT", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "kycflow");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Retailer portal: login, recovery and KYC registration".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from(vec!["kycflow", "status"]);
            assert_eq!(
                matches.get_one::<String>(api::ARG_API_URL).cloned(),
                Some("http://localhost:8080".to_string())
            );
            assert_eq!(
                matches.get_one::<PathBuf>(api::ARG_STATE_FILE).cloned(),
                Some(PathBuf::from("kycflow-session.json"))
            );
            assert_eq!(matches.get_one::<u64>(api::ARG_TIMEOUT).copied(), Some(10));
            assert!(!matches.get_flag(api::ARG_JSON));
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("KYCFLOW_API_URL", Some("https://api.retail.test")),
                ("KYCFLOW_STATE_FILE", Some("/tmp/kycflow-state.json")),
                ("KYCFLOW_TIMEOUT", Some("30")),
                ("KYCFLOW_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["kycflow", "register", "status"]);
                assert_eq!(
                    matches.get_one::<String>(api::ARG_API_URL).cloned(),
                    Some("https://api.retail.test".to_string())
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(api::ARG_STATE_FILE).cloned(),
                    Some(PathBuf::from("/tmp/kycflow-state.json"))
                );
                assert_eq!(matches.get_one::<u64>(api::ARG_TIMEOUT).copied(), Some(30));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("KYCFLOW_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["kycflow", "status"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("KYCFLOW_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["kycflow".to_string(), "status".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_global_args_after_subcommand() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from(vec![
                "kycflow",
                "register",
                "send-mobile-otp",
                "--mobile",
                "9876543210",
                "--json",
                "--api-url",
                "http://127.0.0.1:9000",
            ]);
            assert!(matches.get_flag(api::ARG_JSON));
            assert_eq!(
                matches.get_one::<String>(api::ARG_API_URL).cloned(),
                Some("http://127.0.0.1:9000".to_string())
            );
        });
    }

    #[test]
    fn test_login_requires_password() {
        temp_env::with_vars(CLEARED, || {
            let result =
                new().try_get_matches_from(vec!["kycflow", "login", "--username", "RA176900435"]);
            assert_eq!(
                result.map(|_| ()).map_err(|e| e.kind()),
                Err(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_zero_timeout_rejected() {
        temp_env::with_vars(CLEARED, || {
            let result = new().try_get_matches_from(vec!["kycflow", "status", "--timeout", "0"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        let result = new().try_get_matches_from(vec!["kycflow", "send-otp"]);
        assert_eq!(
            result.map(|_| ()).map_err(|e| e.kind()),
            Err(clap::error::ErrorKind::InvalidSubcommand)
        );
    }
}
