//! 本地上传工具：把本地图片编码为 data URI 后走同一套中转逻辑上传，打印结果 JSON。
//!
//! 令牌来自 config.toml 的 blob.token 或环境变量 BLOB_READ_WRITE_TOKEN，不接受命令行传入（避免进入 shell history）。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_relay::AppConfig;
use image_relay::features::storage::VercelBlobClient;
use image_relay::features::upload::data_uri;
use image_relay::features::upload::{RelayConfig, UploadRelay, UploadResult};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 最小日志：仅在需要调试时启用（例如 RUST_LOG=debug）。
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = match Args::parse(std::env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            print_help();
            std::process::exit(2);
        }
    };
    if args.help || args.files.is_empty() {
        print_help();
        return Ok(());
    }

    let config = match args.config_path.as_deref() {
        Some(p) => AppConfig::load_from(p)?,
        None => AppConfig::load()?,
    };

    let mut images = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path).await?;
        images.push(data_uri::encode(mime_for_path(path), &bytes));
    }

    let client = Arc::new(VercelBlobClient::new(&config.blob)?);
    let relay = UploadRelay::new(client, RelayConfig::from_blob_config(&config.blob));

    let result = if args.detail {
        match relay.upload_detailed(&images).await {
            Ok(report) => UploadResult {
                items: Some(report.items),
                ..UploadResult::success(report.urls)
            },
            Err(e) => UploadResult::failure(&e),
        }
    } else {
        relay.upload(&images).await
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.error.is_some() {
        std::process::exit(2);
    }
    Ok(())
}

/// 按扩展名推断 MIME；未知扩展名交给服务端默认值（image/jpeg）处理
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, Default)]
struct Args {
    help: bool,
    detail: bool,
    config_path: Option<String>,
    files: Vec<PathBuf>,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, String> {
        let mut args = Self::default();
        let mut it = argv.into_iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "-h" | "--help" => args.help = true,
                "--detail" => args.detail = true,
                "--config" => {
                    let path = it.next().ok_or("--config 缺少文件路径")?;
                    args.config_path = Some(path);
                }
                _ => args.files.push(PathBuf::from(a)),
            }
        }
        Ok(args)
    }
}

fn print_help() {
    println!(
        r#"relay_upload（本地上传工具）

用法：
  BLOB_READ_WRITE_TOKEN=... cargo run --bin relay_upload -- a.png b.jpg

参数：
  --detail          输出逐项结果（items）
  --config PATH     指定配置文件（默认 config.toml，可缺省）
  -h, --help        显示帮助
"#
    );
}
