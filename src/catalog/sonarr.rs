//! Sonarr v3 HTTP client

use super::types::{
    LanguageProfile, MonitorMode, QualityProfile, QueueItem, QueuePage, RootFolder, Series,
    SeriesSubmission, Tag,
};
use super::CatalogError;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const QUEUE_PAGE_SIZE: u32 = 10;

/// Thin typed wrapper over Sonarr's REST API
pub struct SonarrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SonarrClient {
    pub fn new(api_host: &str, api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/api/v3", api_host.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, CatalogError> {
        let start = Instant::now();
        let url = format!("{}/{endpoint}", self.base_url);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header("X-Api-Key", &self.api_key)
            .query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let result = async move {
            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(CatalogError::from_status(status, &text));
            }
            let bytes = response.bytes().await?;
            // DELETE and command endpoints may answer with an empty body
            let slice: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            serde_json::from_slice(slice).map_err(|e| CatalogError::decode(e.to_string()))
        }
        .await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => tracing::debug!(
                %method,
                endpoint,
                duration_ms = %duration.as_millis(),
                "Sonarr request completed"
            ),
            Err(e) => tracing::warn!(
                %method,
                endpoint,
                duration_ms = %duration.as_millis(),
                kind = ?e.kind,
                error = %e.message,
                "Sonarr request failed"
            ),
        }

        result
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        self.request(Method::GET, endpoint, query, None).await
    }

    pub async fn lookup(&self, term: &str) -> Result<Vec<Series>, CatalogError> {
        self.get("series/lookup", &[("term", term.to_string())]).await
    }

    pub async fn list_series(&self) -> Result<Vec<Series>, CatalogError> {
        self.get("series", &[]).await
    }

    pub async fn root_folders(&self) -> Result<Vec<RootFolder>, CatalogError> {
        self.get("rootfolder", &[]).await
    }

    pub async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, CatalogError> {
        self.get("qualityprofile", &[]).await
    }

    /// Language profiles; Sonarr v4 removed the endpoint, which yields an empty list
    pub async fn language_profiles(&self) -> Result<Vec<LanguageProfile>, CatalogError> {
        match self.get("languageprofile", &[]).await {
            Err(e) if e.kind == super::CatalogErrorKind::NotFound => Ok(Vec::new()),
            other => other,
        }
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, CatalogError> {
        self.get("tag", &[]).await
    }

    pub async fn queue(&self) -> Result<Vec<QueueItem>, CatalogError> {
        let page: QueuePage = self
            .get("queue", &[("pageSize", QUEUE_PAGE_SIZE.to_string())])
            .await?;
        Ok(page.records)
    }

    pub async fn search_season(&self, series_id: i64, season: i32) -> Result<(), CatalogError> {
        let body = json!({
            "name": "SeasonSearch",
            "seriesId": series_id,
            "seasonNumber": season,
        });
        self.request::<Value>(Method::POST, "command", &[], Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn search_series(&self, series_id: i64) -> Result<(), CatalogError> {
        let body = json!({ "name": "SeriesSearch", "seriesId": series_id });
        self.request::<Value>(Method::POST, "command", &[], Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn add_series(&self, submission: &SeriesSubmission) -> Result<Series, CatalogError> {
        let body = submission_body(submission)?;
        self.request(Method::POST, "series", &[], Some(&body)).await
    }

    pub async fn update_series(
        &self,
        submission: &SeriesSubmission,
    ) -> Result<Series, CatalogError> {
        let id = submission
            .series
            .id
            .ok_or_else(|| CatalogError::rejected("cannot update a series without id"))?;
        let body = submission_body(submission)?;
        self.request(Method::PUT, &format!("series/{id}"), &[], Some(&body))
            .await
    }

    pub async fn remove_series(&self, series_id: i64) -> Result<(), CatalogError> {
        self.request::<Value>(
            Method::DELETE,
            &format!("series/{series_id}"),
            &[("deleteFiles", "false".to_string())],
            None,
        )
        .await
        .map(|_| ())
    }
}

/// Build the JSON body for `POST /series` and `PUT /series/{id}`.
///
/// Starts from the series record itself so that fields Sonarr requires on
/// add (`titleSlug`, `images`, ...) are passed through untouched.
pub fn submission_body(submission: &SeriesSubmission) -> Result<Value, CatalogError> {
    let mut body =
        serde_json::to_value(&submission.series).map_err(|e| CatalogError::decode(e.to_string()))?;
    let Some(object) = body.as_object_mut() else {
        return Err(CatalogError::decode("series did not serialize to an object"));
    };

    let monitored = submission.monitor == MonitorMode::All;
    object.insert("qualityProfileId".into(), submission.quality_profile_id.into());
    object.insert("languageProfileId".into(), submission.language_profile_id.into());
    object.insert("rootFolderPath".into(), submission.root_folder_path.clone().into());
    object.insert("tags".into(), json!(submission.tags));
    object.insert("seasonFolder".into(), submission.season_folder.into());
    object.insert("monitored".into(), monitored.into());
    object.insert(
        "addOptions".into(),
        json!({
            "searchForMissingEpisodes": submission.search_for_missing,
            "monitor": submission.monitor,
        }),
    );

    Ok(body)
}
