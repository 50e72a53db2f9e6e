use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use backend::config::Config;
use backend::error::PipelineError;
use backend::pipeline::{engine::Engine, labels::LabelCatalog};
use backend::routes::{AppState, configure_routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = Config::from_env();
    if let Ok(current_dir) = std::env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let catalog = LabelCatalog::resolve(&config.labels_path, config.training_dir.as_deref());

    // A load failure is survivable: the server starts, /health reports
    // model_loaded: false and /predict answers 500 until the artifact is
    // fixed. A catalog/output-width mismatch is not, since every prediction
    // would be mislabeled.
    let engine = match Engine::load(&config.model_path, catalog.len()) {
        Ok(engine) => {
            log::info!("Model loaded from {}", config.model_path.display());
            Some(engine)
        }
        Err(err) => {
            if let Some(PipelineError::ConfigurationMismatch { .. }) =
                err.downcast_ref::<PipelineError>()
            {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    err.to_string(),
                ));
            }
            log::error!("Failed to load model at startup: {:?}", err);
            None
        }
    };

    std::fs::create_dir_all(&config.upload_dir)?;
    let state = web::Data::new(AppState {
        engine,
        catalog,
        upload_dir: config.upload_dir.clone(),
    });

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    let frontend_dir = config.frontend_dir.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
