use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::{
    domain::identity::Identity,
    infra::{config::DirectoryConfig, error::AppError},
    usecases::contracts::{DirectoryClient, DirectoryError},
};

const DIRECTORY_REQUEST_FAILED: &str = "DIRECTORY_REQUEST_FAILED";

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "userID")]
    user_id: i64,
    username: String,
}

impl From<UserRecord> for Identity {
    fn from(record: UserRecord) -> Self {
        Identity::new(record.user_id, record.username)
    }
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    #[serde(rename = "groupID")]
    group_id: i64,
    #[serde(rename = "groupName", default)]
    group_name: Option<String>,
}

/// Directory client speaking the server's REST user and group endpoints.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    http: reqwest::Client,
    base_url: Url,
    all_users_path: Vec<String>,
}

impl HttpDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| AppError::InvalidConfig {
            details: format!("directory.base_url: {error}"),
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http,
            base_url,
            all_users_path: config
                .all_users_path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        })
    }

    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::lookup_failed("directory base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetches one JSON record. `Ok(None)` means the directory has no entry:
    /// a 404, an empty body or a literal `null`.
    async fn fetch<T>(&self, url: Url) -> Result<Option<T>, DirectoryError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|error| request_failed(&url, error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(request_failed(&url, format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|error| request_failed(&url, error))?;
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }

        serde_json::from_str(body)
            .map(Some)
            .map_err(|error| request_failed(&url, format!("undecodable body: {error}")))
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn resolve_user(&self, name: &str) -> Result<Identity, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::not_found(name));
        }

        let url = self.endpoint(["user", name])?;
        self.fetch::<UserRecord>(url)
            .await?
            .map(Identity::from)
            .ok_or_else(|| DirectoryError::not_found(name))
    }

    async fn resolve_group(&self, name: &str) -> Result<Identity, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::not_found(name));
        }

        let url = self.endpoint(["group", name])?;
        self.fetch::<GroupRecord>(url)
            .await?
            .map(|record| {
                Identity::new(
                    record.group_id,
                    record.group_name.unwrap_or_else(|| name.to_owned()),
                )
            })
            .ok_or_else(|| DirectoryError::not_found(name))
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DirectoryError> {
        let url = self.endpoint(self.all_users_path.iter().map(String::as_str))?;
        let records = self
            .fetch::<Vec<UserRecord>>(url.clone())
            .await?
            .ok_or_else(|| request_failed(&url, "empty user list"))?;

        Ok(records.into_iter().map(Identity::from).collect())
    }
}

fn request_failed(url: &Url, details: impl std::fmt::Display) -> DirectoryError {
    tracing::warn!(
        code = DIRECTORY_REQUEST_FAILED,
        url = %url,
        details = %details,
        "directory request failed"
    );
    DirectoryError::lookup_failed(format!("GET {url}: {details}"))
}
