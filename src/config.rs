//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8087"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 用户存储后端: postgres, memory
    pub backend: String,
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty, compact
    pub format: String,
}

impl LoggingConfig {
    /// 解析日志格式（不区分大小写）
    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.format.parse()
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 生产环境
    Json,
    /// 本地开发
    Pretty,
    /// 单行输出
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(ConfigError::Message(format!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥文件路径（文件内容即密钥）
    #[serde(default)]
    pub jwt_secret_file: Option<String>,
    /// 内联 JWT 密钥（仅在未配置密钥文件时使用）
    #[serde(default)]
    pub jwt_secret: Option<Secret<String>>,
    /// 令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// 密码最小长度
    pub password_min_length: usize,
    /// Argon2 内存开销（KiB）
    pub password_hash_memory_kib: u32,
    /// Argon2 迭代次数
    pub password_hash_iterations: u32,
    /// Argon2 并行度
    pub password_hash_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageConfig {
    /// 基础路径
    pub base_path: String,
    /// 对外访问的基础 URL
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3StorageConfig {
    /// Bucket 名称
    #[serde(default)]
    pub bucket: String,
    /// 区域
    pub region: String,
    /// 端点 URL (用于 MinIO 等兼容服务)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access Key
    #[serde(default)]
    pub access_key: Option<Secret<String>>,
    /// Secret Key
    #[serde(default)]
    pub secret_key: Option<Secret<String>>,
    /// 对外访问的基础 URL（可选，覆盖默认的 bucket 地址）
    #[serde(default)]
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 对象存储后端: local, s3, memory
    pub backend: String,
    /// 单次上传的最大字节数
    pub max_upload_bytes: usize,
    pub local: LocalStorageConfig,
    pub s3: S3StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// 允许的来源（逗号分隔）
    pub allowed_origins: String,
    /// 是否允许携带凭据
    pub allow_credentials: bool,
}

impl CorsConfig {
    /// 解析后的来源列表
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:8087")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 86400)?
            .set_default("security.password_min_length", 8)?
            .set_default("security.password_hash_memory_kib", 65536)?
            .set_default("security.password_hash_iterations", 3)?
            .set_default("security.password_hash_parallelism", 4)?
            // 存储默认配置
            .set_default("storage.backend", "local")?
            .set_default("storage.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("storage.local.base_path", "./uploads")?
            .set_default("storage.local.base_url", "/files")?
            .set_default("storage.s3.region", "us-east-1")?
            // CORS 默认配置
            .set_default("cors.allowed_origins", "http://127.0.0.1:5500")?
            .set_default("cors.allow_credentials", true)?;

        // 从环境变量加载配置（前缀为 UPLOAD_）
        settings = settings.add_source(
            Environment::with_prefix("UPLOAD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        self.logging.log_format()?;

        // 验证用户存储后端
        match self.database.backend.to_lowercase().as_str() {
            "postgres" => {
                if self.database.url.expose_secret().is_empty() {
                    return Err(ConfigError::Message(
                        "database.url is required for the postgres backend".to_string(),
                    ));
                }
            }
            "memory" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid database backend: {}. Must be one of: postgres, memory",
                    self.database.backend
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 密钥来源必须存在，内容在启动时加载校验
        if self.security.jwt_secret_file.is_none() && self.security.jwt_secret.is_none() {
            return Err(ConfigError::Message(
                "One of security.jwt_secret_file or security.jwt_secret must be set".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.security.token_ttl_secs < 60 || self.security.token_ttl_secs > 604800 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be between 60 and 604800 (1 minute to 7 days)".to_string(),
            ));
        }

        // 验证密码策略
        if self.security.password_min_length < 6 || self.security.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 6 and 128".to_string(),
            ));
        }

        if self.security.password_hash_memory_kib == 0
            || self.security.password_hash_iterations == 0
            || self.security.password_hash_parallelism == 0
        {
            return Err(ConfigError::Message(
                "password hash cost parameters must be greater than zero".to_string(),
            ));
        }

        // 验证对象存储后端
        match self.storage.backend.to_lowercase().as_str() {
            "local" | "memory" => {}
            "s3" => {
                if self.storage.s3.bucket.is_empty() {
                    return Err(ConfigError::Message(
                        "storage.s3.bucket is required for the s3 backend".to_string(),
                    ));
                }
            }
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid storage backend: {}. Must be one of: local, s3, memory",
                    self.storage.backend
                )))
            }
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::Message(
                "storage.max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
