use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::ClientError,
    models::{DeleteConfirmation, FileEntry},
    navigation::ListScope,
    session::Credential,
};

pub const DRIVE_TOKEN_HEADER: &str = "X-Google-Access-Token";

/// File operations exposed by the relay. The credential travels with every
/// call; no header state is kept between calls.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn list_files(
        &self,
        credential: Option<&Credential>,
        scope: &ListScope,
    ) -> Result<Vec<FileEntry>, ClientError>;

    async fn create_file(
        &self,
        credential: Option<&Credential>,
        file_name: &str,
        content: &str,
    ) -> Result<FileEntry, ClientError>;

    async fn read_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
    ) -> Result<String, ClientError>;

    async fn update_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
        content: &str,
    ) -> Result<FileEntry, ClientError>;

    async fn delete_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
    ) -> Result<String, ClientError>;
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: Url,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ClientError::Config(format!("invalid relay url {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "relay url {base_url} cannot hold file paths"
            )));
        }

        let http = Client::builder().build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.relay_base_url)
    }

    fn file_url(&self, file_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(file_id);
        }
        url
    }

    fn request(&self, method: Method, url: Url, credential: Option<&Credential>) -> RequestBuilder {
        let request = self.http.request(method, url);
        match credential {
            Some(credential) => request.header(DRIVE_TOKEN_HEADER, credential.expose()),
            None => request,
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status,
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<RelayErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn list_files(
        &self,
        credential: Option<&Credential>,
        scope: &ListScope,
    ) -> Result<Vec<FileEntry>, ClientError> {
        debug!(folder_id = %scope.folder_id, search = scope.is_search(), "requesting listing");
        let response = self
            .request(Method::GET, self.base_url.clone(), credential)
            .query(&[
                ("folderId", scope.folder_id.as_str()),
                ("searchQuery", scope.search_query.as_str()),
            ])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_file(
        &self,
        credential: Option<&Credential>,
        file_name: &str,
        content: &str,
    ) -> Result<FileEntry, ClientError> {
        let response = self
            .request(Method::POST, self.base_url.clone(), credential)
            .json(&json!({ "fileName": file_name, "fileContent": content }))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn read_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .request(Method::GET, self.file_url(file_id), credential)
            .send()
            .await?;
        Ok(ensure_success(response).await?.text().await?)
    }

    async fn update_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
        content: &str,
    ) -> Result<FileEntry, ClientError> {
        let response = self
            .request(Method::PUT, self.file_url(file_id), credential)
            .json(&json!({ "fileContent": content }))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete_file(
        &self,
        credential: Option<&Credential>,
        file_id: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .request(Method::DELETE, self.file_url(file_id), credential)
            .send()
            .await?;
        let confirmation: DeleteConfirmation = ensure_success(response).await?.json().await?;
        Ok(confirmation.message)
    }
}
