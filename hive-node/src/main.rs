use clap::Parser;
use hive_node::{
    api::rest::{serve, AppState},
    build_runtime,
    cli::Args,
    config::Config,
    setup::ensure_config,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    std::panic::set_hook(Box::new(|info| {
        let msg = match info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<Any>",
            },
        };
        let location = match info.location() {
            Some(l) => format!("at {}:{}:{}", l.file(), l.line(), l.column()),
            None => "unknown location".to_string(),
        };
        let err_msg = format!("CRASH: {} {}\n", msg, location);
        eprintln!("{}", err_msg);
        let _ = std::fs::write("panic.log", err_msg);
    }));

    let log_filename = format!("logs/audit-{}.log", args.node_label());
    let file_appender = tracing_appender::rolling::never(".", log_filename);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let audit_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "consensus" || metadata.target().starts_with("hive_")
        }));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hive_node=debug".into()),
        )
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() != "consensus"
        }));

    tracing_subscriber::registry()
        .with(audit_layer)
        .with(stdout_layer)
        .init();

    info!("--- STARTING HIVE NODE ---");
    info!("Config: {}", args.config_path);

    if let Err(e) = ensure_config(&args.config_path) {
        error!("Failed to generate config: {}", e);
        return Err(e.into());
    }

    let mut config = Config::load_from_file(&args.config_path)?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let runtime = match build_runtime(config, args.offline_calendar) {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start node: {}", e);
            return Err(e.into());
        }
    };

    let listener = TcpListener::bind(runtime.config.bind_addr()).await?;
    let state = AppState {
        name: runtime.config.name.clone(),
        service: runtime.service.clone(),
    };

    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("🛑 Shutdown requested");
    })
    .await?;

    Ok(())
}
