//! In-memory records behind the sandbox API.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// OTP accepted for every challenge the sandbox issues.
pub const SANDBOX_OTP: &str = "123456";

/// Outstanding tickets kept before the oldest are dropped.
const MAX_TICKETS: usize = 1024;

pub type SharedState = Arc<Mutex<SandboxState>>;

/// What an issued OTP unlocks when verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    Mobile { mobile: String },
    Email { urn: String, email: String },
    Aadhaar { urn: String },
    PasswordReset { user_id: String },
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub challenge: Challenge,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub mobile: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub aadhaar_verified: bool,
    pub pan: Option<String>,
    pub username: Option<String>,
}

impl Registration {
    pub fn kyc_complete(&self) -> bool {
        self.email_verified && self.aadhaar_verified && self.pan.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub username: String,
    pub password: Option<String>,
    pub mobile: String,
    pub reset_required: bool,
}

#[derive(Debug)]
pub struct SandboxState {
    tickets: HashMap<String, Ticket>,
    issued: VecDeque<String>,
    registrations: HashMap<String, Registration>,
    accounts: Vec<Account>,
    tokens: HashSet<String>,
    next_username: u64,
}

impl Default for SandboxState {
    fn default() -> Self {
        Self {
            tickets: HashMap::new(),
            issued: VecDeque::new(),
            registrations: HashMap::new(),
            accounts: vec![
                Account {
                    user_id: Uuid::new_v4().to_string(),
                    username: "RA176900435".to_string(),
                    password: Some("Password@123".to_string()),
                    mobile: "9876543210".to_string(),
                    reset_required: false,
                },
                Account {
                    user_id: Uuid::new_v4().to_string(),
                    username: "RA100000001".to_string(),
                    password: Some("Password@123".to_string()),
                    mobile: "9123456780".to_string(),
                    reset_required: true,
                },
            ],
            tokens: HashSet::new(),
            next_username: 200_000_000,
        }
    }
}

impl SandboxState {
    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Store a challenge and return its reference id. A resend replaces the
    /// earlier ticket for the same challenge.
    pub fn issue(&mut self, challenge: Challenge) -> String {
        self.tickets.retain(|_, ticket| ticket.challenge != challenge);
        self.issued.retain(|ref_id| self.tickets.contains_key(ref_id));
        while self.issued.len() >= MAX_TICKETS {
            if let Some(oldest) = self.issued.pop_front() {
                self.tickets.remove(&oldest);
            }
        }

        let ref_id = Uuid::new_v4().to_string();
        self.issued.push_back(ref_id.clone());
        self.tickets.insert(
            ref_id.clone(),
            Ticket {
                challenge,
                code: SANDBOX_OTP.to_string(),
            },
        );
        ref_id
    }

    pub fn ticket(&self, ref_id: &str) -> Option<&Ticket> {
        self.tickets.get(ref_id)
    }

    pub fn consume(&mut self, ref_id: &str) -> Option<Ticket> {
        self.tickets.remove(ref_id)
    }

    /// Open a registration for a verified mobile and return its URN.
    pub fn open_registration(&mut self, mobile: String) -> String {
        let urn = format!("URN{}", Uuid::new_v4().simple()).to_uppercase();
        self.registrations.insert(
            urn.clone(),
            Registration {
                mobile,
                ..Registration::default()
            },
        );
        urn
    }

    pub fn registration(&self, urn: &str) -> Option<&Registration> {
        self.registrations.get(urn)
    }

    pub fn registration_mut(&mut self, urn: &str) -> Option<&mut Registration> {
        self.registrations.get_mut(urn)
    }

    /// Turn a finished registration into an account that must set a
    /// password before its first login.
    pub fn create_account(&mut self, urn: &str) -> Option<Account> {
        let mobile = self.registrations.get(urn)?.mobile.clone();
        self.next_username += 1;
        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            username: format!("RA{}", self.next_username),
            password: None,
            mobile,
            reset_required: true,
        };
        if let Some(registration) = self.registrations.get_mut(urn) {
            registration.username = Some(account.username.clone());
        }
        self.accounts.push(account.clone());
        Some(account)
    }

    pub fn account_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn account_by_id_mut(&mut self, user_id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.user_id == user_id)
    }

    pub fn account_by_mobile(&self, mobile: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.mobile == mobile)
    }

    pub fn issue_token(&mut self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone());
        token
    }

    pub fn knows_token(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}
