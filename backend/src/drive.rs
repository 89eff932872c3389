use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::{gate::Credential, models::files::FileEntry};

pub const LIST_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOperation {
    List,
    Create,
    Update,
    Read,
    Delete,
}

impl DriveOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveOperation::List => "list",
            DriveOperation::Create => "create",
            DriveOperation::Update => "update",
            DriveOperation::Read => "read",
            DriveOperation::Delete => "delete",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            DriveOperation::List => "Could not list files from Google Drive.",
            DriveOperation::Create => "Could not create file in Google Drive.",
            DriveOperation::Update => "Could not update file in Google Drive.",
            DriveOperation::Read => "Could not read file from Google Drive.",
            DriveOperation::Delete => "Could not delete file from Google Drive.",
        }
    }
}

impl fmt::Display for DriveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the remote store.
///
/// Every remote failure collapses into `Failed`, except a credential the
/// store refuses outright. The gate needs that distinction to degrade a
/// listing for callers whose token was minted by another provider.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("drive rejected the credential: {0}")]
    CredentialRejected(String),
    #[error("drive {operation} failed: {message}")]
    Failed {
        operation: DriveOperation,
        message: String,
    },
}

impl DriveError {
    pub fn failed(operation: DriveOperation, message: impl Into<String>) -> Self {
        DriveError::Failed {
            operation,
            message: message.into(),
        }
    }

    /// Message safe to hand back to the HTTP caller. Remote error text stays
    /// in the server log.
    pub fn public_message(&self) -> String {
        match self {
            DriveError::CredentialRejected(_) => "Google Drive rejected the access token.".into(),
            DriveError::Failed { operation, .. } => operation.failure_message().into(),
        }
    }
}

/// What a listing call covers. A non-empty search spans the whole Drive and
/// ignores the folder the caller is browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Folder(String),
    Search(String),
}

impl ListScope {
    pub fn from_params(folder_id: Option<&str>, search_query: Option<&str>) -> Option<Self> {
        if let Some(search) = search_query.filter(|value| !value.trim().is_empty()) {
            return Some(ListScope::Search(search.to_string()));
        }

        folder_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ListScope::Folder(value.to_string()))
    }

    pub fn to_query(&self) -> String {
        match self {
            ListScope::Folder(folder_id) => format!(
                "'{}' in parents and trashed = false",
                escape_query_literal(folder_id)
            ),
            ListScope::Search(text) => format!(
                "name contains '{}' and trashed = false",
                escape_query_literal(text)
            ),
        }
    }
}

pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
pub trait DriveStore: Send + Sync {
    async fn list(
        &self,
        credential: &Credential,
        scope: &ListScope,
    ) -> Result<Vec<FileEntry>, DriveError>;

    /// Creates a plain-text file at the Drive root.
    async fn create(
        &self,
        credential: &Credential,
        name: &str,
        content: &str,
    ) -> Result<FileEntry, DriveError>;

    /// Replaces the body of an existing file. Name and parents are untouched.
    async fn update(
        &self,
        credential: &Credential,
        file_id: &str,
        content: &str,
    ) -> Result<FileEntry, DriveError>;

    async fn read(&self, credential: &Credential, file_id: &str) -> Result<String, DriveError>;

    async fn delete(&self, credential: &Credential, file_id: &str) -> Result<(), DriveError>;
}
