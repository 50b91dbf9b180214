//! Correlation identifiers handed out by the remote identity API.
//!
//! A [`VerificationSession`] is created empty, filled by successful client calls
//! and read back by the calls that follow them. Only the client writes to it;
//! everyone else gets read access.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel an OTP was sent through during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Mobile,
    Email,
}

impl Channel {
    /// Storage key of the reference id the matching send call produced.
    #[must_use]
    pub const fn reference_key(self) -> &'static str {
        match self {
            Self::Mobile => "registration_ref_id",
            Self::Email => "registration_ref_id_email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mobile => f.write_str("mobile"),
            Self::Email => f.write_str("email"),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VerificationSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email_otp_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aadhaar_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reset_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pan_registered_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pan_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, with = "secret_token", skip_serializing_if = "Option::is_none")]
    auth_token: Option<SecretString>,
}

impl VerificationSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registration_ref(&self) -> Option<&str> {
        self.registration_ref.as_deref()
    }

    #[must_use]
    pub fn email_otp_ref(&self) -> Option<&str> {
        self.email_otp_ref.as_deref()
    }

    #[must_use]
    pub fn aadhaar_ref(&self) -> Option<&str> {
        self.aadhaar_ref.as_deref()
    }

    #[must_use]
    pub fn urn(&self) -> Option<&str> {
        self.urn.as_deref()
    }

    #[must_use]
    pub fn reset_ref(&self) -> Option<&str> {
        self.reset_ref.as_deref()
    }

    #[must_use]
    pub fn pan_registered_name(&self) -> Option<&str> {
        self.pan_registered_name.as_deref()
    }

    #[must_use]
    pub fn pan_address(&self) -> Option<&str> {
        self.pan_address.as_deref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<&SecretString> {
        self.auth_token.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Reference id the verify call for `channel` must echo back.
    #[must_use]
    pub fn otp_reference(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Mobile => self.registration_ref(),
            Channel::Email => self.email_otp_ref(),
        }
    }

    pub(crate) fn set_otp_reference(&mut self, channel: Channel, reference: String) {
        match channel {
            Channel::Mobile => self.registration_ref = Some(reference),
            Channel::Email => self.email_otp_ref = Some(reference),
        }
    }

    pub(crate) fn set_urn(&mut self, urn: String) {
        self.urn = Some(urn);
    }

    pub(crate) fn set_aadhaar_ref(&mut self, reference: String) {
        self.aadhaar_ref = Some(reference);
    }

    pub(crate) fn set_reset_ref(&mut self, reference: String) {
        self.reset_ref = Some(reference);
    }

    pub(crate) fn set_pan_preview(&mut self, name: Option<String>, address: Option<String>) {
        if name.is_some() {
            self.pan_registered_name = name;
        }
        if address.is_some() {
            self.pan_address = address;
        }
    }

    pub(crate) fn set_user_id(&mut self, user_id: String) {
        self.user_id = Some(user_id);
    }

    pub(crate) fn set_auth_token(&mut self, token: SecretString) {
        self.auth_token = Some(token);
    }

    pub(crate) fn clear_auth_token(&mut self) {
        self.auth_token = None;
    }
}

impl fmt::Debug for VerificationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationSession")
            .field("registration_ref", &self.registration_ref)
            .field("email_otp_ref", &self.email_otp_ref)
            .field("aadhaar_ref", &self.aadhaar_ref)
            .field("urn", &self.urn)
            .field("reset_ref", &self.reset_ref)
            .field("pan_registered_name", &self.pan_registered_name)
            .field("pan_address", &self.pan_address)
            .field("user_id", &self.user_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// The bearer token is written to the store as plain text; the store file is
/// created with owner-only permissions.
mod secret_token {
    use super::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        token: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match token {
            Some(token) => serializer.serialize_some(token.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}
