use crate::{
    cli::commands::api::Options,
    portal::{
        client::{ClientConfig, DEFAULT_TIMEOUT},
        store::FileSessionStore,
    },
};
use std::{path::PathBuf, time::Duration};

/// Options shared by every portal command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_file: PathBuf,
    pub timeout: Duration,
    pub json: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, state_file: PathBuf) -> Self {
        Self {
            api_url,
            state_file,
            timeout: DEFAULT_TIMEOUT,
            json: false,
        }
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout(self.timeout)
    }

    #[must_use]
    pub fn store(&self) -> FileSessionStore {
        FileSessionStore::new(&self.state_file)
    }
}

impl From<Options> for GlobalArgs {
    fn from(options: Options) -> Self {
        Self {
            api_url: options.api_url,
            state_file: options.state_file,
            timeout: options.timeout,
            json: options.json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "http://localhost:8080".to_string(),
            PathBuf::from("kycflow-session.json"),
        );
        assert_eq!(args.timeout, DEFAULT_TIMEOUT);
        assert!(!args.json);

        let config = args.client_config();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.user_agent, crate::APP_USER_AGENT);
        assert_eq!(args.store().path(), PathBuf::from("kycflow-session.json"));
    }
}
