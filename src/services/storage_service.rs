//! 对象存储服务
//!
//! 提供统一的存储抽象接口，支持多种存储后端：
//! - 本地文件系统
//! - S3 兼容存储 (AWS S3, MinIO)
//! - 内存（开发与测试）

use crate::{
    config::{S3StorageConfig, StorageConfig},
    error::AppError,
};
use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;
use s3::{bucket::Bucket, creds::Credentials, Region};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// 对象存储接口
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 写入对象，返回可公开访问的 URL
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, AppError>;

    /// 检查存储是否可用
    async fn health_check(&self) -> bool;

    /// 后端名称
    fn backend_name(&self) -> &'static str;
}

/// 根据配置创建对象存储
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, AppError> {
    let store: Arc<dyn ObjectStore> = match config.backend.to_lowercase().as_str() {
        "local" => Arc::new(LocalObjectStore::new(
            &config.local.base_path,
            &config.local.base_url,
        )),
        "s3" => Arc::new(S3ObjectStore::new(&config.s3)?),
        "memory" => Arc::new(MemoryObjectStore::new()),
        other => {
            return Err(AppError::Config(format!("Unknown storage backend: {}", other)));
        }
    };

    tracing::info!(backend = store.backend_name(), "Object store initialized");
    Ok(store)
}

// ==================== 本地文件系统 ====================

/// 本地文件系统存储
pub struct LocalObjectStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 对象在磁盘上的位置
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.base_path).await.map_err(|e| {
            AppError::storage(&format!("Failed to create {}: {}", self.base_path.display(), e))
        })?;

        let path = self.path_for(key);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::storage(&format!("Failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), size = data.len(), "Object written to local storage");

        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn health_check(&self) -> bool {
        tokio::fs::create_dir_all(&self.base_path).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

// ==================== S3 兼容存储 ====================

/// S3 兼容存储
///
/// 桶客户端在构造时建立一次；自定义端点使用 path-style 寻址
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(config: &S3StorageConfig) -> Result<Self, AppError> {
        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => Credentials::new(
                Some(access_key.expose_secret()),
                Some(secret_key.expose_secret()),
                None,
                None,
                None,
            ),
            // 回退到环境变量 / profile
            _ => Credentials::default(),
        }
        .map_err(|e| AppError::Config(format!("Failed to construct S3 credentials: {}", e)))?;

        let endpoint = config
            .endpoint
            .as_deref()
            .map(|endpoint| endpoint.trim_end_matches('/').to_string());

        let region = match &endpoint {
            // 自定义端点（如 MinIO）
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse().unwrap_or(Region::UsEast1),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Config(format!("Failed to create S3 bucket client: {}", e)))?;
        // MinIO 默认不支持 virtual-host 寻址
        let bucket = if endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        let public_base_url = match (&config.public_base_url, &endpoint) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => format!("{}/{}", endpoint, config.bucket),
            (None, None) => format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region),
        };

        Ok(Self {
            bucket: Box::new(bucket),
            public_base_url,
        })
    }

    /// 对象的公开访问地址
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// 请求实际发往的桶地址
    pub fn bucket_url(&self) -> String {
        self.bucket.url()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(format!("/{}", key), &data, content_type)
            .await
            .map_err(|e| AppError::storage(&format!("Failed to upload {}: {}", key, e)))?;

        debug!(
            bucket = %self.bucket.name(),
            key = %key,
            status = response.status_code(),
            "Object uploaded to S3"
        );

        Ok(self.public_url(key))
    }

    async fn health_check(&self) -> bool {
        match self.bucket.exists().await {
            Ok(true) => true,
            Ok(false) => {
                warn!(bucket = %self.bucket.name(), "S3 bucket does not exist");
                false
            }
            Err(e) => {
                warn!("S3 endpoint unreachable: {}", e);
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

// ==================== 内存存储 ====================

/// 内存中的对象
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// 内存存储
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, AppError> {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(format!("memory://{}", key))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
