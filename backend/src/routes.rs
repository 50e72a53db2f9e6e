use std::path::PathBuf;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::TryStreamExt;
use log::info;
use shared::HealthResponse;

use crate::error::PipelineError;
use crate::pipeline;
use crate::pipeline::{engine::Engine, labels::LabelCatalog};
use crate::stats;
use crate::upload::{MAX_UPLOAD_BYTES, TempUpload, allowed_extension};

/// Process-wide state handed to every handler. The engine is `None` when
/// the artifact failed to load at startup; handlers must check before
/// running inference.
pub struct AppState {
    pub engine: Option<Engine>,
    pub catalog: LabelCatalog,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn model_loaded(&self) -> bool {
        self.engine.is_some()
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/stats/distribution").route(web::get().to(class_distribution)))
        .service(web::resource("/stats/accuracy").route(web::get().to(accuracy_metrics)))
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(Files::new("/static", frontend_dir).index_file("index.html"));
}

async fn handle_predict(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    // validate the upload before anything touches the engine or the disk
    let (extension, bytes) = read_image_field(&mut payload).await?;

    let engine = state
        .engine
        .as_ref()
        .ok_or(PipelineError::ModelUnavailable)?;

    // scoped to this request; removed on drop whatever happens below
    let upload = TempUpload::write(&state.upload_dir, &extension, &bytes)
        .map_err(|e| PipelineError::Inference(format!("cannot store upload: {}", e)))?;

    let response = pipeline::classify_file(engine, &state.catalog, upload.path())?;
    info!(
        "Predicted {} with confidence {:.4}",
        response.class, response.confidence
    );
    Ok(HttpResponse::Ok().json(response))
}

/// Pulls the `image` field out of the multipart payload, enforcing the
/// extension allow-list and the size cap while streaming.
async fn read_image_field(payload: &mut Multipart) -> Result<(String, Vec<u8>), Error> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some("image") {
            // drain so the stream can move on to the next field
            while field.try_next().await?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("")
            .to_string();
        if filename.is_empty() {
            return Err(PipelineError::NotFound("no image selected".to_string()).into());
        }
        let extension = allowed_extension(&filename).ok_or_else(|| {
            PipelineError::UnsupportedFormat(
                "please upload a valid image file (png, jpg, jpeg)".to_string(),
            )
        })?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(PipelineError::UploadTooLarge.into());
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(PipelineError::NotFound("no image selected".to_string()).into());
        }
        return Ok((extension, bytes));
    }

    Err(PipelineError::NotFound("no image part in the request".to_string()).into())
}

async fn class_distribution() -> HttpResponse {
    HttpResponse::Ok().json(stats::class_distribution())
}

async fn accuracy_metrics() -> HttpResponse {
    HttpResponse::Ok().json(stats::accuracy_report())
}

async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.model_loaded(),
    })
}
