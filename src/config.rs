use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认配置文件路径（不存在时仅使用默认值与环境变量）
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 存储凭证的兜底环境变量名（与托管 Blob 服务的约定一致）
pub const BLOB_TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3939,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（未设置 RUST_LOG 时生效）
    pub level: String,
    /// 日志格式：full | compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "full".to_string(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 路由前缀
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/v1".to_string(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 是否启用 CORS
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    pub allowed_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    pub max_age_secs: Option<u64>,
}

/// 对象存储（Blob）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Blob API 基地址
    pub api_url: String,
    /// 读写令牌；缺省时回落到环境变量 `BLOB_READ_WRITE_TOKEN`
    pub token: Option<String>,
    /// 单次上传请求超时（秒）
    pub timeout_secs: u64,
    /// 生成对象名时使用的前缀
    pub object_prefix: String,
}

impl BlobConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// 解析最终生效的令牌：配置优先，其次环境变量；空白字符串视为未配置。
    pub fn resolve_token(&self) -> Option<String> {
        pick_token(self.token.as_deref(), std::env::var(BLOB_TOKEN_ENV).ok())
    }
}

fn pick_token(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            from_env
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            api_url: "https://blob.vercel-storage.com".to_string(),
            token: None,
            timeout_secs: 60,
            object_prefix: "product".to_string(),
        }
    }
}

/// 上传入口限制
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 单批最多图片数（0=不限制，不建议）
    pub max_images: usize,
    /// 请求体大小上限（字节），base64 图片体积较大，需要显式放宽
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_images: 20,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
    pub blob: BlobConfig,
    pub upload: UploadConfig,
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从默认路径加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 从指定文件加载配置（文件可缺省），再叠加 `APP_` 前缀的环境变量。
    ///
    /// 嵌套字段使用双下划线分隔，例如 `APP_UPLOAD__MAX_IMAGES=10`、`APP_BLOB__TOKEN=...`。
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        tracing::info!("正在从 {:?} 加载配置文件", path);

        let builder = ConfigBuilder::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;

        tracing::debug!(
            "配置加载完成: blob.api_url = {}, blob.token 已配置 = {}",
            config.blob.api_url,
            config.blob.token.is_some()
        );

        Ok(config)
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
