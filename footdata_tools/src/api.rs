use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;

use crate::{config::FootDataConfig, data_objects::MatchDay, FeedMatch, FootDataApiError};

#[derive(Clone)]
pub struct FootDataApi {
    config: FootDataConfig,
    client: Arc<Client>,
}

impl FootDataApi {
    pub fn new(config: FootDataConfig) -> Result<Self, FootDataApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_token.reveal().as_str())
            .map_err(|e| FootDataApiError::Initialization(e.to_string()))?;
        headers.insert("X-Auth-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| FootDataApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FootDataApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.get(url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| FootDataApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| FootDataApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| FootDataApiError::RestResponseError(e.to_string()))?;
            Err(FootDataApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}{path}", self.config.base_url, self.config.api_version)
    }

    /// Fetches the current matchday across all competitions visible to the
    /// configured token.
    pub async fn fetch_matches(&self) -> Result<Vec<FeedMatch>, FootDataApiError> {
        debug!("Fetching current matches");
        let result = self.rest_query::<MatchDay>("/matches", &[]).await?;
        info!("Fetched {} matches from the feed", result.matches.len());
        Ok(result.matches)
    }

    /// Fetches matches within a date window, `YYYY-MM-DD` bounds inclusive.
    pub async fn fetch_matches_between(&self, from: &str, to: &str) -> Result<Vec<FeedMatch>, FootDataApiError> {
        debug!("Fetching matches between {from} and {to}");
        let params = [("dateFrom", from), ("dateTo", to)];
        let result = self.rest_query::<MatchDay>("/matches", &params).await?;
        info!("Fetched {} matches from the feed", result.matches.len());
        Ok(result.matches)
    }

    /// Fetches the matches of a single competition, e.g. `IT1`.
    pub async fn fetch_competition_matches(&self, code: &str) -> Result<Vec<FeedMatch>, FootDataApiError> {
        let path = format!("/competitions/{code}/matches");
        debug!("Fetching matches for competition {code}");
        let result = self.rest_query::<MatchDay>(&path, &[]).await?;
        info!("Fetched {} matches for competition {code}", result.matches.len());
        Ok(result.matches)
    }
}
