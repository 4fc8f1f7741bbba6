use farm_waste_advisor::{api, load_catalog, AdvisorService, AppConfig};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    let level = Level::from_str(&config.log.level).unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_max_level(level)
        .init();

    info!("Starting server with config: {:?}", config);

    // 加载只读数据集
    let catalog = Arc::new(load_catalog(Path::new(&config.dataset.path))?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let service = Arc::new(AdvisorService::new(catalog, config));
    let app = api::router(service);

    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/wastes  - list waste types");
    info!("  POST /api/wastes  - add waste type (applied on restart)");
    info!("  POST /api/advise  - fuzzy match and recommend");
    info!("  POST /api/report  - download advice report");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
