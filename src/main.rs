use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use json_file_service::config::{self, AppState, ServiceMode};
use json_file_service::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 配置文件路径（不带扩展名），默认 config.toml
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(&cfg));

    match state.mode {
        ServiceMode::Files => state.store.ensure_root().await?,
        // 启动时加载，之后常驻内存
        ServiceMode::Static => {
            state.document.get();
        }
    }

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::start_server_loop(
        listener,
        state,
        Arc::new(AtomicUsize::new(0)),
        Arc::clone(&signals.shutdown),
    )
    .await
}
