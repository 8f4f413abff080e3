use std::env;

use crate::modules::runs::RelevantRunIdentifiers;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub cloud_api_url: String,
    pub cloud_api_token: Option<String>,
    pub project_slug: Option<String>,
    pub current_run_number: Option<u32>,
    pub next_run_number: Option<u32>,
    pub poller_config_path: Option<String>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let cloud_api_url = env::var("CLOUD_API_URL")
            .map_err(|_| "CLOUD_API_URL must be set".to_string())?;

        let cloud_api_token = optional_var("CLOUD_API_TOKEN");
        let project_slug = optional_var("PROJECT_SLUG");
        let current_run_number = run_number_var("CURRENT_RUN_NUMBER")?;
        let next_run_number = run_number_var("NEXT_RUN_NUMBER")?;
        let poller_config_path = optional_var("POLLER_CONFIG_PATH");

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            cloud_api_url,
            cloud_api_token,
            project_slug,
            current_run_number,
            next_run_number,
            poller_config_path,
            bind_addr,
        })
    }

    pub fn identifiers(&self) -> RelevantRunIdentifiers {
        RelevantRunIdentifiers::new(self.current_run_number, self.next_run_number)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn run_number_var(name: &str) -> Result<Option<u32>, String> {
    match optional_var(name) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(format!("{} must be a positive integer, got {:?}", name, raw)),
        },
    }
}
