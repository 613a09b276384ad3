use super::ImageSource;
use crate::{drive::DriveClient, errors::Result};
use async_trait::async_trait;

/// Designs stored in a Drive folder.
///
/// A file whose stem equals the design name wins. Failing that, the first listed
/// image whose file name contains the design name is used, so `flores` still finds
/// `flores_v2.png` when no `flores.*` exists.
#[derive(Debug, Clone)]
pub struct DriveImageSource {
    client: DriveClient,
    folder_id: String,
}

impl DriveImageSource {
    /// Source reading from `folder_id`.
    #[must_use]
    pub const fn new(client: DriveClient, folder_id: String) -> Self {
        Self { client, folder_id }
    }
}

#[async_trait]
impl ImageSource for DriveImageSource {
    fn describe(&self) -> String {
        format!("Drive folder {}", self.folder_id)
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if name.is_empty() {
            return Ok(None);
        }
        let files = self.client.list_images(&self.folder_id).await?;
        let exact = files
            .iter()
            .position(|f| f.name.rsplit_once('.').map(|(stem, _)| stem) == Some(name));
        let chosen = exact.or_else(|| files.iter().position(|f| f.name.contains(name)));
        match chosen.and_then(|index| files.get(index)) {
            Some(file) => Ok(Some(self.client.download(&file.id).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{assets::tests::png_bytes, errors::Error};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn source_for(server: &MockServer) -> DriveImageSource {
        let client =
            DriveClient::with_client(reqwest::Client::new(), &server.uri(), "t".to_string());
        DriveImageSource::new(client, "designs".to_string())
    }

    #[tokio::test]
    async fn test_exact_stem_beats_earlier_partial_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [
                    { "id": "x", "name": "caveira.png", "mimeType": "image/png" },
                    { "id": "y", "name": "b_flores.png", "mimeType": "image/png" },
                    { "id": "z", "name": "flores.png", "mimeType": "image/png" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/z"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(1, 1, [0, 0, 0, 255])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/y"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let bytes = source_for(&server).fetch("flores").await.unwrap();
        assert!(bytes.is_some());
    }

    #[tokio::test]
    async fn test_partial_match_used_without_exact_stem() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [
                    { "id": "x", "name": "caveira.png", "mimeType": "image/png" },
                    { "id": "v", "name": "flores_v2.jpg", "mimeType": "image/jpeg" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/v"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(1, 1, [0, 0, 0, 255])))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = source_for(&server).fetch("flores").await.unwrap();
        assert!(bytes.is_some());
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
            .mount(&server)
            .await;

        assert!(source_for(&server).fetch("flores").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = source_for(&server).fetch("flores").await;
        assert!(matches!(result, Err(Error::Transport { .. })));
    }
}
