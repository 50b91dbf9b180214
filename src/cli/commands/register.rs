use clap::{Arg, ArgAction, Command};

pub const CMD_REGISTER: &str = "register";

pub const ARG_MOBILE: &str = "mobile";
pub const ARG_EMAIL: &str = "email";
pub const ARG_AADHAAR: &str = "aadhaar";
pub const ARG_PAN: &str = "pan";
pub const ARG_OTP: &str = "otp";
pub const ARG_ACCEPT_TERMS: &str = "accept-terms";
pub const ARG_NAME: &str = "name";
pub const ARG_ADDRESS: &str = "address";
pub const ARG_CITY: &str = "city";
pub const ARG_PINCODE: &str = "pincode";

fn otp_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(
        Arg::new(ARG_OTP)
            .long(ARG_OTP)
            .help("6-digit OTP")
            .required(true),
    )
}

fn value_command(
    name: &'static str,
    about: &'static str,
    arg: &'static str,
    help: &'static str,
) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new(arg).long(arg).help(help).required(true))
}

#[must_use]
pub fn register() -> Command {
    Command::new(CMD_REGISTER)
        .about("Three-step retailer registration")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("status").about("Show step, flags and the next-step link"))
        .subcommand(Command::new("advance").about("Follow the next-step link"))
        .subcommand(Command::new("back").about("Go back one step"))
        .subcommand(value_command(
            "send-mobile-otp",
            "Step 1: start registration and send an OTP to the mobile",
            ARG_MOBILE,
            "10-digit mobile",
        ))
        .subcommand(otp_command("verify-mobile-otp", "Step 1: verify the mobile OTP"))
        .subcommand(value_command(
            "send-email-otp",
            "Step 1: send an OTP to the email",
            ARG_EMAIL,
            "Email address",
        ))
        .subcommand(otp_command("verify-email-otp", "Step 1: verify the email OTP"))
        .subcommand(value_command(
            "send-aadhaar-otp",
            "Step 2: send an OTP to the Aadhaar linked mobile",
            ARG_AADHAAR,
            "12-digit Aadhaar number",
        ))
        .subcommand(otp_command(
            "verify-aadhaar-otp",
            "Step 2: verify the Aadhaar OTP",
        ))
        .subcommand(value_command(
            "verify-pan",
            "Step 2: verify the PAN",
            ARG_PAN,
            "PAN, e.g. ABCDE1234F",
        ))
        .subcommand(
            Command::new("submit")
                .about("Step 3: complete the profile, accept the terms and finish registration")
                .arg(
                    Arg::new(ARG_NAME)
                        .long(ARG_NAME)
                        .help("Full name, defaults to the PAN registered name"),
                )
                .arg(
                    Arg::new(ARG_ADDRESS)
                        .long(ARG_ADDRESS)
                        .help("Address, defaults to the PAN address"),
                )
                .arg(Arg::new(ARG_CITY).long(ARG_CITY).help("City").required(true))
                .arg(
                    Arg::new(ARG_PINCODE)
                        .long(ARG_PINCODE)
                        .help("6-digit PIN code")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_ACCEPT_TERMS)
                        .long(ARG_ACCEPT_TERMS)
                        .help("Accept the terms and conditions")
                        .action(ArgAction::SetTrue),
                ),
        )
}
