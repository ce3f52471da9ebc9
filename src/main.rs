use std::sync::Arc;

use image_relay::app::build_app;
use image_relay::config::AppConfig;
use image_relay::features::storage::VercelBlobClient;
use image_relay::features::upload::{RelayConfig, UploadRelay};
use image_relay::state::AppState;
use image_relay::ShutdownManager;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("image_relay={},tower_http=info", config.logging.level).into()
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format.eq_ignore_ascii_case("compact") {
        builder.compact().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // 日志格式依赖配置，因此配置加载失败只能直接输出到 stderr
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let blob_client = match VercelBlobClient::new(&config.blob) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Blob client init failed: {}", e);
            std::process::exit(1);
        }
    };

    // 令牌缺失不阻止启动：上传请求会返回明确的配置错误
    let relay_config = RelayConfig::from_blob_config(&config.blob);
    if relay_config.token.is_none() {
        tracing::warn!("未配置存储令牌（blob.token / BLOB_READ_WRITE_TOKEN），上传接口将返回配置错误");
    }

    let app_state = AppState {
        relay: Arc::new(UploadRelay::new(blob_client, relay_config)),
        upload_limits: config.upload.clone(),
    };
    let app = build_app(&config, app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!(
        "Upload API: http://{}{}/uploads/images",
        addr,
        config.api.prefix
    );
    tracing::info!("Blob API: {}", config.blob.api_url);

    let server_shutdown = shutdown_manager.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let reason = server_shutdown.wait_for_shutdown().await;
                tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
            })
            .await
    });

    // 收到退出信号后，给进行中的上传批次留出超时时间
    let shutdown_timeout = config.shutdown.timeout_duration();
    let finished_early = tokio::select! {
        res = &mut server => Some(res),
        _ = shutdown_manager.wait_for_shutdown() => None,
    };
    let result = match finished_early {
        Some(res) => res,
        None => {
            tracing::info!("优雅退出超时时间: {}秒", config.shutdown.timeout_secs);
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!("优雅退出超时，强制退出");
                    std::process::exit(1);
                }
            }
        }
    };

    match result {
        Ok(Ok(())) => tracing::info!("服务器已优雅关闭"),
        Ok(Err(e)) => {
            tracing::error!("服务器运行错误: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("服务器任务异常退出: {}", e);
            std::process::exit(1);
        }
    }
}
