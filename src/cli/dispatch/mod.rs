use crate::cli::{
    actions::{login, recover, register, reset, sandbox, status, Action},
    commands::{
        account::{self, ARG_MOBILE, ARG_OTP, ARG_PASSWORD, ARG_USERNAME},
        api, register as register_cmd, sandbox as sandbox_cmd,
    },
    globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn subcommand(matches: &ArgMatches) -> Result<(&str, &ArgMatches)> {
    matches.subcommand().context("missing subcommand")
}

/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::from(api::Options::parse(matches)?);

    match subcommand(matches)? {
        (account::CMD_LOGIN, sub_m) => Ok(Action::Login(login::Args {
            globals,
            username: required(sub_m, ARG_USERNAME)?,
            password: SecretString::from(required(sub_m, ARG_PASSWORD)?),
        })),
        (account::CMD_RECOVER, sub_m) => {
            let target = match subcommand(sub_m)? {
                ("username", m) => recover::Target::Username {
                    mobile: required(m, ARG_MOBILE)?,
                },
                ("password", m) => recover::Target::Password {
                    username: required(m, ARG_USERNAME)?,
                },
                (other, _) => return Err(anyhow!("unknown recover command: {other}")),
            };
            Ok(Action::Recover(recover::Args { globals, target }))
        }
        (account::CMD_RESET, sub_m) => {
            let step = match subcommand(sub_m)? {
                ("initiate", _) => reset::Step::Initiate,
                ("confirm", m) => reset::Step::Confirm {
                    otp: required(m, ARG_OTP)?,
                    password: SecretString::from(required(m, ARG_PASSWORD)?),
                },
                (other, _) => return Err(anyhow!("unknown reset command: {other}")),
            };
            Ok(Action::Reset(reset::Args { globals, step }))
        }
        (register_cmd::CMD_REGISTER, sub_m) => Ok(Action::Register(register::Args {
            globals,
            step: register_step(sub_m)?,
        })),
        (account::CMD_STATUS, _) => Ok(Action::Status(status::Args { globals })),
        (sandbox_cmd::CMD_SANDBOX, sub_m) => Ok(Action::Sandbox(sandbox::Args {
            port: sub_m
                .get_one::<u16>(sandbox_cmd::ARG_PORT)
                .copied()
                .unwrap_or(8080),
        })),
        (other, _) => Err(anyhow!("unknown command: {other}")),
    }
}

fn register_step(matches: &ArgMatches) -> Result<register::Step> {
    use register_cmd::{
        ARG_AADHAAR, ARG_ACCEPT_TERMS, ARG_ADDRESS, ARG_CITY, ARG_EMAIL, ARG_NAME, ARG_PAN,
        ARG_PINCODE,
    };

    let step = match subcommand(matches)? {
        ("status", _) => register::Step::Status,
        ("advance", _) => register::Step::Advance,
        ("back", _) => register::Step::Back,
        ("send-mobile-otp", m) => register::Step::SendMobileOtp {
            mobile: required(m, register_cmd::ARG_MOBILE)?,
        },
        ("verify-mobile-otp", m) => register::Step::VerifyMobileOtp {
            otp: required(m, register_cmd::ARG_OTP)?,
        },
        ("send-email-otp", m) => register::Step::SendEmailOtp {
            email: required(m, ARG_EMAIL)?,
        },
        ("verify-email-otp", m) => register::Step::VerifyEmailOtp {
            otp: required(m, register_cmd::ARG_OTP)?,
        },
        ("send-aadhaar-otp", m) => register::Step::SendAadhaarOtp {
            aadhaar: required(m, ARG_AADHAAR)?,
        },
        ("verify-aadhaar-otp", m) => register::Step::VerifyAadhaarOtp {
            otp: required(m, register_cmd::ARG_OTP)?,
        },
        ("verify-pan", m) => register::Step::VerifyPan {
            pan: required(m, ARG_PAN)?,
        },
        ("submit", m) => register::Step::Submit {
            profile: register::ProfileArgs {
                name: m.get_one::<String>(ARG_NAME).cloned(),
                address: m.get_one::<String>(ARG_ADDRESS).cloned(),
                city: required(m, ARG_CITY)?,
                pincode: required(m, ARG_PINCODE)?,
            },
            accept_terms: m.get_flag(ARG_ACCEPT_TERMS),
        },
        (other, _) => return Err(anyhow!("unknown register command: {other}")),
    };

    Ok(step)
}
