use log::*;
use mbg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct FootDataConfig {
    pub base_url: String,
    pub api_token: Secret<String>,
    pub api_version: String,
}

impl FootDataConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("MDS_FOOTDATA_BASE_URL").unwrap_or_else(|_| {
            warn!("MDS_FOOTDATA_BASE_URL not set, using https://api.football-data.org as default");
            "https://api.football-data.org".to_string()
        });
        let api_version = std::env::var("MDS_FOOTDATA_API_VERSION").unwrap_or_else(|_| {
            warn!("MDS_FOOTDATA_API_VERSION not set, using v4 as default");
            "v4".to_string()
        });
        let api_token = Secret::new(std::env::var("MDS_FOOTDATA_API_TOKEN").unwrap_or_else(|_| {
            warn!("MDS_FOOTDATA_API_TOKEN not set, using (probably useless default");
            "00000000000000".to_string()
        }));
        Self { base_url, api_token, api_version }
    }
}
