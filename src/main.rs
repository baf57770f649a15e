use actix_web::{web, App, HttpServer};
use delaymap::{
    environment, handlers::routes, tools::logger::setup_tracing,
    tools::prometheus::{prometheus_metrics, FleetMetrics},
};
use std::{env, net::Ipv4Addr};
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::var("DELAYMAP_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/delaymap.dhall".to_string());
    let app_config = environment::read_config(&config_path).unwrap_or_else(|err| {
        eprintln!("Config Reading Error ({}): {:#}", config_path, err);
        std::process::exit(1);
    });

    let _guard = setup_tracing(app_config.logger_cfg.clone());
    info!("Configuration loaded successfully from {}", config_path);

    let prometheus = prometheus_metrics()?;
    let metrics = FleetMetrics::new()?;
    metrics.register(&prometheus.registry)?;

    let port = app_config.port;
    let app_state = environment::AppState::new(app_config, metrics)?;

    let poller = app_state.poller.clone();
    tokio::spawn(async move {
        poller.start_polling().await;
        error!("Polling task stopped");
    });

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(TracingLogger::default())
            .wrap(prometheus.clone())
            .configure(routes::create_routes)
    })
    .bind((Ipv4Addr::UNSPECIFIED, port))?
    .workers(num_cpus::get())
    .run()
    .await?;

    Ok(())
}
