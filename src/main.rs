use facecheck::{
    DetectionEngine, DetectionParams, backends::DefaultDetector, config::FaceCheckArgs, server,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: FaceCheckArgs = argh::from_env();

    let addr = args.addr();
    let model_path = args.model.clone();
    let engine = Arc::new(DetectionEngine::spawn(DetectionParams::default(), move || {
        DefaultDetector::load(&model_path)
    })?);

    let params = engine.params();
    log::info!(
        "Detector ready (scale factor {}, min neighbors {}, min size {}x{})",
        params.scale_factor,
        params.min_neighbors,
        params.min_size.0,
        params.min_size.1
    );

    let app = server::router(engine, &args.server_config());

    log::info!("Starting the face detection server");
    log::info!("Listening on: {}", addr);
    log::info!("Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
