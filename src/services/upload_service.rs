//! 文件上传服务

use crate::{error::AppError, services::storage_service::ObjectStore};
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const FALLBACK_FILENAME: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct UploadService {
    store: Arc<dyn ObjectStore>,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// 保存上传文件，返回公开访问 URL
    pub async fn upload(
        &self,
        subject: &str,
        filename: &str,
        content_type: Option<&str>,
        data: Bytes,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let key = object_key(filename, now);
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| content_type_for(&key));
        let size = data.len();

        let url = self.store.put(&key, data, content_type).await?;

        tracing::info!(
            subject = %subject,
            key = %key,
            size,
            backend = self.store.backend_name(),
            "File uploaded"
        );
        metrics::counter!("uploads_total").increment(1);
        metrics::histogram!("upload_size_bytes").record(size as f64);

        Ok(url)
    }
}

/// 生成对象键："{unix_nanos}_{文件名}"
pub fn object_key(filename: &str, now: DateTime<Utc>) -> String {
    let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros() * 1000);
    format!("{}_{}", nanos, sanitize_filename(filename))
}

/// 只保留文件名部分，并替换不安全字符
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // 去掉前导点，避免隐藏文件和 ".."
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// 文件扩展名（不含点）
pub fn file_extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// 根据扩展名推断内容类型
pub fn content_type_for(filename: &str) -> &'static str {
    match file_extension(filename).map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
