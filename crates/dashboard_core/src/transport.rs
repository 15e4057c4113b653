//! HTTP access to the statistics backend.

use std::path::Path;

use reqwest::{multipart, Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::protocol::{UploadResponse, SEARCH_PATH, UPLOAD_PATH};
use url::Url;

use crate::error::FetchError;

/// A file picked by the user for `/upload`.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { filename, bytes })
    }

    fn mime_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct UploadReply {
    pub status: StatusCode,
    pub body: UploadResponse,
}

/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DashboardHttp {
    http: Client,
    base_url: Url,
}

impl DashboardHttp {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Self {
            http,
            base_url: Url::parse(&raw)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| FetchError::InvalidUrl {
                endpoint: path.to_string(),
                source,
            })
    }

    /// GETs `path` and decodes the body. Non-2xx statuses are errors; the body
    /// of a failed response is never decoded.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint_url(path)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| transport(path, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| transport(path, source))?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
            endpoint: path.to_string(),
            source,
        })
    }

    pub async fn search(&self, query: &str) -> Result<StatusCode, FetchError> {
        let url = self.endpoint_url(SEARCH_PATH)?;
        let response = self
            .http
            .get(url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|source| transport(SEARCH_PATH, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: SEARCH_PATH.to_string(),
                status,
            });
        }
        Ok(status)
    }

    /// Submits `file` as the `file` part of a multipart form. Unlike
    /// [`get_json`](Self::get_json) the body is decoded for every status,
    /// since failures carry an `error` message for the user.
    pub async fn upload(&self, file: UploadFile) -> Result<UploadReply, FetchError> {
        let url = self.endpoint_url(UPLOAD_PATH)?;
        let mime = file.mime_type();
        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&mime)
            .map_err(|source| transport(UPLOAD_PATH, source))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| transport(UPLOAD_PATH, source))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| transport(UPLOAD_PATH, source))?;
        let body = serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
            endpoint: UPLOAD_PATH.to_string(),
            source,
        })?;

        Ok(UploadReply { status, body })
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}
