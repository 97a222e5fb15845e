//! 文件上传的 HTTP 处理器

use crate::{
    auth::Identity,
    error::AppError,
    middleware::AppState,
    models::upload::UploadResponse,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

/// 表单中文件字段的名称
pub const FILE_FIELD: &str = "file";

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// 上传文件（需要认证）
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected multipart request: {}", e);
        AppError::BadRequest("Failed to parse form data".to_string())
    })?;

    let file = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let url = state
        .upload_service
        .upload(
            &identity.subject,
            &file.filename,
            file.content_type.as_deref(),
            file.data,
            Utc::now(),
        )
        .await?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url,
    }))
}

/// 读取第一个带文件名的 `file` 字段，其余字段忽略
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // 没有 filename 的同名字段是普通表单值，不是文件
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(form_error)?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }

    Ok(None)
}

fn form_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }

    tracing::debug!("Failed to read multipart body: {}", e.body_text());
    AppError::BadRequest("Failed to parse form data".to_string())
}
