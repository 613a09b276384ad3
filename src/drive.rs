//! Minimal Google Drive v3 REST client.
//!
//! Only the three calls the shop needs: list a folder, download a file and upload
//! a file with multipart metadata. Every failure, including non-success status
//! codes, becomes [`Error::Transport`].

use crate::errors::{Error, Result};
use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const UPLOAD_BOUNDARY: &str = "shopfloor-upload-boundary";

/// File metadata returned by Drive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file identity
    pub id: String,
    /// File name, extension included
    pub name: String,
    /// Content type reported by Drive
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Authenticated Drive client.
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    /// Builds a client with a 30 second request timeout.
    pub fn new(api_base: &str, token: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(http, api_base, token))
    }

    /// Builds a client around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(http: Client, api_base: &str, token: String) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Image files directly inside `folder_id`, in the order Drive returns them.
    ///
    /// Follows `nextPageToken` until Drive reports no further page, so folders
    /// larger than one page are listed in full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if any page request fails or answers with a
    /// non-success status.
    pub async fn list_images(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            folder_id.replace('\\', "\\\\").replace('\'', "\\'")
        );
        debug!("Listing Drive folder {}", folder_id);

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(format!("{}/drive/v3/files", self.api_base))
                .bearer_auth(&self.token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", "nextPageToken,files(id,name,mimeType)"),
                    ("pageSize", "1000"),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = check(request.send().await?).await?.json().await?;
            files.extend(page.files);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Drive folder {} holds {} image(s)", folder_id, files.len());
        Ok(files)
    }

    /// Raw content of a file.
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        debug!("Downloading Drive file {}", file_id);
        let response = self
            .http
            .get(format!("{}/drive/v3/files/{file_id}", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        Ok(check(response).await?.bytes().await?.to_vec())
    }

    /// Uploads `content` as a new file named `name` inside `folder_id`.
    pub async fn upload(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> Result<DriveFile> {
        let metadata = json!({ "name": name, "parents": [folder_id] });

        let mut body = Vec::with_capacity(content.len() + 512);
        body.extend_from_slice(
            format!(
                "--{UPLOAD_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{UPLOAD_BOUNDARY}\r\nContent-Type: {mime_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}--\r\n").as_bytes());

        let response = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id,name,mimeType")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={UPLOAD_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Transport {
        message: format!("Drive answered {status}: {}", detail.trim()),
    })
}
