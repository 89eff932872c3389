use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    drive::DriveError,
    error::AppError,
    gate::{DriveAccess, gated_list},
    models::files::{CreateFileRequest, DeleteFileResponse, ListFilesQuery, UpdateFileRequest},
};

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api/files")
            .app_data(json_config())
            .service(list_files)
            .service(create_file)
            .service(read_file)
            .service(update_file)
            .service(delete_file),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("invalid JSON body: {err}")).into())
}

#[get("/healthz")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "drive-relay-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("")]
async fn list_files(
    query: web::Query<ListFilesQuery>,
    access: DriveAccess,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    info!(
        has_credential = access.is_granted(),
        folder_id = query.folder_id.as_deref().unwrap_or(""),
        searching = query.search_query.as_deref().is_some_and(|q| !q.trim().is_empty()),
        "list files"
    );

    let files = gated_list(state.drive.as_ref(), access, &query).await?;
    Ok(HttpResponse::Ok().json(files))
}

#[post("")]
async fn create_file(
    body: web::Json<CreateFileRequest>,
    access: DriveAccess,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credential = access.require()?;
    let CreateFileRequest {
        file_name,
        file_content,
    } = body.into_inner();

    let file_name = file_name
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("fileName is required".into()))?;
    let file_content =
        file_content.ok_or_else(|| AppError::BadRequest("fileContent is required".into()))?;

    let entry = state
        .drive
        .create(&credential, &file_name, &file_content)
        .await
        .map_err(log_failure)?;
    Ok(HttpResponse::Created().json(entry))
}

#[get("/{file_id}")]
async fn read_file(
    path: web::Path<String>,
    access: DriveAccess,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credential = access.require()?;
    let file_id = parse_file_id(path.into_inner())?;

    let content = state
        .drive
        .read(&credential, &file_id)
        .await
        .map_err(log_failure)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(content))
}

#[put("/{file_id}")]
async fn update_file(
    path: web::Path<String>,
    body: web::Json<UpdateFileRequest>,
    access: DriveAccess,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credential = access.require()?;
    let file_id = parse_file_id(path.into_inner())?;
    let file_content = body
        .into_inner()
        .file_content
        .ok_or_else(|| AppError::BadRequest("fileContent is required".into()))?;

    let entry = state
        .drive
        .update(&credential, &file_id, &file_content)
        .await
        .map_err(log_failure)?;
    Ok(HttpResponse::Ok().json(entry))
}

#[delete("/{file_id}")]
async fn delete_file(
    path: web::Path<String>,
    access: DriveAccess,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credential = access.require()?;
    let file_id = parse_file_id(path.into_inner())?;

    state
        .drive
        .delete(&credential, &file_id)
        .await
        .map_err(log_failure)?;
    Ok(HttpResponse::Ok().json(DeleteFileResponse {
        message: "File deleted successfully.".into(),
    }))
}

fn parse_file_id(raw: String) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return Err(AppError::BadRequest("fileId is required".into()));
    }
    Ok(trimmed.to_string())
}

fn log_failure(err: DriveError) -> AppError {
    error!(error = %err, "drive operation failed");
    AppError::Drive(err)
}
