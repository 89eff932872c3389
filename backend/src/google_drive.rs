use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, header::CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    drive::{DriveError, DriveOperation, DriveStore, LIST_PAGE_SIZE, ListScope},
    error::AppError,
    gate::Credential,
    models::files::{FileEntry, TEXT_MIME_TYPE},
};

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const FILE_FIELDS: &str = "id, name, mimeType";
const MULTIPART_BOUNDARY: &str = "drive_relay_part_boundary";

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<GoogleErrorReason>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorReason {
    #[serde(default)]
    reason: String,
}

pub struct GoogleDriveClient {
    http: Client,
    api_base: String,
    upload_base: String,
}

impl GoogleDriveClient {
    pub fn new(api_base: &str, upload_base: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        operation: DriveOperation,
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<Response, DriveError> {
        let response = request
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|err| DriveError::failed(operation, err.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(operation, status, &body))
    }
}

/// Splits a non-success Drive response into credential rejection or a
/// generic failure carrying the remote message.
fn classify_failure(operation: DriveOperation, status: StatusCode, body: &str) -> DriveError {
    let parsed = serde_json::from_str::<GoogleErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .map(|body| body.error.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));

    let auth_error = parsed
        .as_ref()
        .is_some_and(|body| body.error.errors.iter().any(|e| e.reason == "authError"));

    if status == StatusCode::UNAUTHORIZED || auth_error {
        DriveError::CredentialRejected(message)
    } else {
        DriveError::failed(operation, message)
    }
}

fn file_url(
    base: &str,
    file_id: &str,
    operation: DriveOperation,
) -> Result<Url, DriveError> {
    let mut url = Url::parse(base)
        .map_err(|err| DriveError::failed(operation, format!("invalid drive url: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| DriveError::failed(operation, "drive url cannot take path segments"))?
        .push("files")
        .push(file_id);
    Ok(url)
}

// boundary grows until the payload no longer contains it
fn multipart_body(metadata: &serde_json::Value, content: &str) -> (String, String) {
    let mut boundary = MULTIPART_BOUNDARY.to_string();
    while content.contains(&boundary) {
        boundary.push('_');
    }

    let body = format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: {TEXT_MIME_TYPE}; charset=UTF-8\r\n\r\n\
         {content}\r\n\
         --{boundary}--"
    );
    (boundary, body)
}

#[async_trait]
impl DriveStore for GoogleDriveClient {
    async fn list(
        &self,
        credential: &Credential,
        scope: &ListScope,
    ) -> Result<Vec<FileEntry>, DriveError> {
        let operation = DriveOperation::List;
        let query = scope.to_query();
        debug!(%query, "listing drive files");

        let request = self.http.get(format!("{}/files", self.api_base)).query(&[
            ("q", query),
            ("pageSize", LIST_PAGE_SIZE.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ]);
        let response = self.send(operation, request, credential).await?;

        let list: DriveFileList = response
            .json()
            .await
            .map_err(|err| DriveError::failed(operation, format!("invalid listing: {err}")))?;
        Ok(list.files)
    }

    async fn create(
        &self,
        credential: &Credential,
        name: &str,
        content: &str,
    ) -> Result<FileEntry, DriveError> {
        let operation = DriveOperation::Create;
        let metadata = json!({ "name": name, "mimeType": TEXT_MIME_TYPE });
        let (boundary, body) = multipart_body(&metadata, content);

        let request = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body);
        let response = self.send(operation, request, credential).await?;

        let entry: FileEntry = response
            .json()
            .await
            .map_err(|err| DriveError::failed(operation, format!("invalid file metadata: {err}")))?;
        info!(file_id = %entry.id, "created drive file");
        Ok(entry)
    }

    async fn update(
        &self,
        credential: &Credential,
        file_id: &str,
        content: &str,
    ) -> Result<FileEntry, DriveError> {
        let operation = DriveOperation::Update;
        let url = file_url(&self.upload_base, file_id, operation)?;

        let request = self
            .http
            .patch(url)
            .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
            .header(CONTENT_TYPE, format!("{TEXT_MIME_TYPE}; charset=UTF-8"))
            .body(content.to_string());
        let response = self.send(operation, request, credential).await?;

        let entry: FileEntry = response
            .json()
            .await
            .map_err(|err| DriveError::failed(operation, format!("invalid file metadata: {err}")))?;
        info!(%file_id, "updated drive file");
        Ok(entry)
    }

    async fn read(&self, credential: &Credential, file_id: &str) -> Result<String, DriveError> {
        let operation = DriveOperation::Read;
        let url = file_url(&self.api_base, file_id, operation)?;

        let request = self.http.get(url).query(&[("alt", "media")]);
        let response = self.send(operation, request, credential).await?;

        response
            .text()
            .await
            .map_err(|err| DriveError::failed(operation, err.to_string()))
    }

    async fn delete(&self, credential: &Credential, file_id: &str) -> Result<(), DriveError> {
        let operation = DriveOperation::Delete;
        let url = file_url(&self.api_base, file_id, operation)?;

        self.send(operation, self.http.delete(url), credential).await?;
        info!(%file_id, "deleted drive file");
        Ok(())
    }
}
