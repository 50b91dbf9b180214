//! # kycflow (retail identity verification portal)
//!
//! `kycflow` drives the client side of a retail account portal: login, username
//! and password recovery, the password reset a login can demand, and a
//! three-step KYC registration.
//!
//! ## Registration
//!
//! 1. **Contact:** mobile OTP, then email OTP. Verifying the mobile OTP hands out
//!    the registration `URN` that every later call must carry.
//! 2. **KYC:** Aadhaar OTP and PAN verification. PAN verification returns the
//!    registered name and address used to prefill the profile.
//! 3. **Profile:** terms acceptance and final submission.
//!
//! Each step unlocks the next only when its verification flags are set. The
//! correlation ids issued by the remote identity API live in a
//! [`portal::session::VerificationSession`] that is passed explicitly into every
//! client call and persisted by a single [`portal::store::SessionStore`].
//!
//! ## Authorization
//!
//! A `401` from the remote API clears the stored bearer token and sends the user
//! back to the login page, whatever call produced it.

pub mod cli;
pub mod portal;
pub mod sandbox;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
