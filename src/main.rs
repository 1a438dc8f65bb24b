// src/main.rs

use axum::{routing::post, serve, Router};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

mod api;
mod bidder;
mod bidding;
mod config;
mod logging;
mod mock_partner;
mod model;
mod openrtb;
mod privacy;

use bidding::partner_client::PartnerClient;
use config::config_manager::ConfigManager;
use model::adapters::{ConfigAdapter, FileConfigAdapter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigManager>,
    pub client: PartnerClient,
}

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "OpenRTB ADX with demand-partner adapters")]
struct CliArgs {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// 合作方配置文件
    #[arg(long, default_value = "static/partners.json")]
    partners: String,
    /// 指定后在该端口启动模拟合作方
    #[arg(long)]
    mock_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let _guard = logging::init(&args.log_dir)?;
    info!("ADX server starting on port {}", args.port);

    // 读取合作方配置并实例化适配器；endpoint 非法直接退出
    let partners = FileConfigAdapter::new(&args.partners).get_partners()?;
    let config = Arc::new(ConfigManager::new(partners)?);
    info!(partners = ?config.registry().names(), "partner registry loaded");

    let mock_server = args.mock_port.map(|port| {
        tokio::spawn(async move {
            if let Err(e) = mock_partner::start_mock_partner_server(port).await {
                error!("mock partner stopped: {}", e);
            }
        })
    });

    let state = Arc::new(AppState {
        config,
        client: PartnerClient::new(),
    });

    let app = Router::new()
        .route("/openrtb", post(api::handlers::handle_openrtb_request))
        .with_state(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("ADX server running at http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                error!("unable to listen for shutdown signal: {}", e);
            }
            info!("Shutting down gracefully...");
        })
        .await?;

    if let Some(handle) = mock_server {
        handle.abort();
    }
    info!("ADX server shut down.");
    Ok(())
}
