use std::env;
use std::path::PathBuf;

/// Runtime configuration, collected from environment variables once at
/// startup. `.env` files are honored via dotenv before this is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Serialized model artifact (ONNX), loaded read-only at process start.
    pub model_path: PathBuf,
    /// Ordered label manifest persisted next to the model artifact.
    pub labels_path: PathBuf,
    /// Optional training-data directory; its sorted sub-directory names are
    /// the fallback label catalog when the manifest is absent.
    pub training_dir: Option<PathBuf>,
    /// Directory holding transient uploads for the duration of one request.
    pub upload_dir: PathBuf,
    pub frontend_dir: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let model_path = PathBuf::from(
            env::var("MODEL_PATH").unwrap_or_else(|_| "models/brain_tumor.onnx".to_string()),
        );
        let labels_path = env::var("LABELS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| model_path.with_file_name("labels.json"));

        let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            format!("{}/../frontend/dist", manifest_dir)
        } else {
            "/usr/src/app/frontend/dist".to_string()
        };

        Self {
            model_path,
            labels_path,
            training_dir: env::var("TRAINING_DIR").ok().map(PathBuf::from),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            frontend_dir,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        }
    }
}
