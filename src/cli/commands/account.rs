use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_RECOVER: &str = "recover";
pub const CMD_RESET: &str = "reset";
pub const CMD_STATUS: &str = "status";

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_MOBILE: &str = "mobile";
pub const ARG_OTP: &str = "otp";

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("KYCFLOW_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in to the retailer portal")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long(ARG_USERNAME)
                .help("Retailer username, e.g. RA176900435")
                .env("KYCFLOW_USERNAME")
                .required(true),
        )
        .arg(password_arg())
}

#[must_use]
pub fn recover() -> Command {
    Command::new(CMD_RECOVER)
        .about("Recover a forgotten username or password")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("username")
                .about("Send the username to the registered mobile")
                .arg(
                    Arg::new(ARG_MOBILE)
                        .short('m')
                        .long(ARG_MOBILE)
                        .help("Registered 10-digit mobile")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("password")
                .about("Send a password reset link to the registered contacts")
                .arg(
                    Arg::new(ARG_USERNAME)
                        .short('u')
                        .long(ARG_USERNAME)
                        .help("Retailer username")
                        .env("KYCFLOW_USERNAME")
                        .required(true),
                ),
        )
}

#[must_use]
pub fn reset() -> Command {
    Command::new(CMD_RESET)
        .about("Reset the password after a login asked for it")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("initiate").about("Request the reset OTP"))
        .subcommand(
            Command::new("confirm")
                .about("Confirm the OTP and set the new password")
                .arg(
                    Arg::new(ARG_OTP)
                        .long(ARG_OTP)
                        .help("6-digit OTP")
                        .required(true),
                )
                .arg(password_arg().help("New password, at least 8 characters")),
        )
}

#[must_use]
pub fn status() -> Command {
    Command::new(CMD_STATUS).about("Show the current page and session")
}
