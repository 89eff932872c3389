use std::{
    fmt,
    future::{Ready, ready},
};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header::HeaderMap};
use tracing::{debug, error, warn};

use crate::{
    drive::{DriveError, DriveStore, ListScope},
    error::AppError,
    models::files::{FileEntry, ListFilesQuery},
};

pub const DRIVE_TOKEN_HEADER: &str = "x-google-access-token";

const PLACEHOLDER_TOKENS: [&str; 2] = ["undefined", "null"];

/// Bearer token for Drive, forwarded verbatim. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveAccess {
    Granted(Credential),
    Anonymous,
}

impl DriveAccess {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let raw = headers
            .get(DRIVE_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(token)
                if !token.is_empty()
                    && !PLACEHOLDER_TOKENS
                        .iter()
                        .any(|placeholder| token.eq_ignore_ascii_case(placeholder)) =>
            {
                DriveAccess::Granted(Credential::new(token))
            }
            _ => DriveAccess::Anonymous,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, DriveAccess::Granted(_))
    }

    /// Operations other than listing have no anonymous fallback.
    pub fn require(self) -> Result<Credential, AppError> {
        match self {
            DriveAccess::Granted(credential) => Ok(credential),
            DriveAccess::Anonymous => Err(AppError::BadRequest(
                "missing Google Drive access token".into(),
            )),
        }
    }
}

impl FromRequest for DriveAccess {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(DriveAccess::from_headers(req.headers())))
    }
}

/// Lists files for the caller, degrading to an empty result when the caller
/// has no usable Drive credential.
pub async fn gated_list(
    drive: &dyn DriveStore,
    access: DriveAccess,
    query: &ListFilesQuery,
) -> Result<Vec<FileEntry>, AppError> {
    let credential = match access {
        DriveAccess::Granted(credential) => credential,
        DriveAccess::Anonymous => {
            debug!("no drive credential on listing request, returning empty result");
            return Ok(Vec::new());
        }
    };

    let scope = ListScope::from_params(query.folder_id.as_deref(), query.search_query.as_deref())
        .ok_or_else(|| AppError::BadRequest("folderId or searchQuery is required".into()))?;

    match drive.list(&credential, &scope).await {
        Ok(files) => {
            debug!(
                count = files.len(),
                folders = files.iter().filter(|file| file.is_folder()).count(),
                search = matches!(scope, ListScope::Search(_)),
                "listed drive files"
            );
            Ok(files)
        }
        Err(DriveError::CredentialRejected(reason)) => {
            warn!(%reason, "drive refused the credential on listing, returning empty result");
            Ok(Vec::new())
        }
        Err(err) => {
            error!(error = %err, "drive listing failed");
            Err(err.into())
        }
    }
}
