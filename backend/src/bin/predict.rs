use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use backend::pipeline::{self, engine::Engine, labels::LabelCatalog};
use clap::Parser;
use shared::PredictionResponse;

const BAR_WIDTH: usize = 40;

/// Classify a brain MRI scan from the command line.
#[derive(Parser, Debug)]
#[command(name = "predict", version, about)]
struct Args {
    /// Path to the MRI image; defaults to a known glioma sample
    image_path: Option<PathBuf>,

    /// Serialized model artifact
    #[arg(long, env = "MODEL_PATH", default_value = "models/brain_tumor.onnx")]
    model: PathBuf,

    /// Label manifest; defaults to labels.json next to the model
    #[arg(long, env = "LABELS_PATH")]
    labels: Option<PathBuf>,

    /// Directory of per-class test images, used for sample listings
    #[arg(long, env = "TESTING_DIR", default_value = "Testing")]
    testing_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let args = Args::parse();

    let image_path = match &args.image_path {
        Some(path) => {
            println!("Using provided image path: {}", path.display());
            path.clone()
        }
        None => {
            let default = args.testing_dir.join("glioma/Te-gl_0010.jpg");
            println!("Using default test image: {}", default.display());
            default
        }
    };

    if !image_path.exists() {
        println!(
            "File {} not found. Please provide a valid image path.",
            image_path.display()
        );
        print_sample_images(&args.testing_dir);
        println!();
        println!("Usage: predict [IMAGE_PATH]");
        println!("Example: predict Testing/meningioma/Te-me_0013.jpg");
        return ExitCode::SUCCESS;
    }

    let labels_path = args
        .labels
        .clone()
        .unwrap_or_else(|| args.model.with_file_name("labels.json"));
    let catalog = LabelCatalog::resolve(&labels_path, None);

    let engine = match Engine::load(&args.model, catalog.len()) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("Failed to load model {}: {}", args.model.display(), err);
            return ExitCode::FAILURE;
        }
    };

    match pipeline::classify_file(&engine, &catalog, &image_path) {
        Ok(result) => {
            print_result(&catalog, &result);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Prediction failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn print_result(catalog: &LabelCatalog, result: &PredictionResponse) {
    println!();
    println!("Predicted class: {}", result.class);
    println!("Confidence: {:.2}", result.confidence);
    println!();
    for label in catalog.labels() {
        let confidence = result.class_confidences.get(label).copied().unwrap_or(0.0);
        let filled = (confidence * BAR_WIDTH as f32).round() as usize;
        let marker = if *label == result.class { " <--" } else { "" };
        println!(
            "{:<12} [{}{}] {:.4}{}",
            label,
            "#".repeat(filled.min(BAR_WIDTH)),
            " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            confidence,
            marker
        );
    }
}

/// Lists up to two images per class directory so the user can retry with a
/// path that exists.
fn print_sample_images(testing_dir: &Path) {
    let Ok(entries) = fs::read_dir(testing_dir) else {
        return;
    };
    let mut classes: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    classes.sort();
    if classes.is_empty() {
        return;
    }

    println!();
    println!("Available test images:");
    for class_dir in classes {
        let Ok(images) = fs::read_dir(&class_dir) else {
            continue;
        };
        let mut files: Vec<PathBuf> = images
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        for file in files.iter().take(2) {
            println!("- {}", file.display());
        }
    }
}
