use clap::{Arg, Command};

pub const CMD_SANDBOX: &str = "sandbox";
pub const ARG_PORT: &str = "port";

#[must_use]
pub fn sandbox() -> Command {
    Command::new(CMD_SANDBOX)
        .about("Run a local identity API with demo accounts and OTP 123456")
        .arg(
            Arg::new(ARG_PORT)
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("KYCFLOW_SANDBOX_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
}
