//! 业务服务层

pub mod auth_service;
pub mod storage_service;
pub mod upload_service;

pub use auth_service::AuthService;
pub use storage_service::{LocalObjectStore, MemoryObjectStore, ObjectStore, S3ObjectStore};
pub use upload_service::UploadService;
