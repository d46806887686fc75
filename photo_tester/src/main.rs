mod command_model;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use command_model::CommandModel;
use fruit_vision::ClassifierConfig;
use fruit_vision::core_modules::decoder::{ClassificationResult, ResultDecoder, confidences_from_ne_bytes};
use fruit_vision::core_modules::image_helper::image_helper;
use fruit_vision::parallel_pipeline::encode_batch;
use fruit_vision::pipeline::ClassificationPipeline;
use log::{error, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "photo_tester", about = "Encode photos for the fruit classifier and decode its scores")]
struct Cli {
    /// JSON file overriding the model side length and label table.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one `<stem>.tensor` file of native-endian f32 values per image.
    Encode {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Also write the prepared model input as `<stem>.input.png`.
        #[arg(long)]
        dump_input: bool,
    },
    /// Decode a raw native-endian f32 score file into a label and report.
    Decode {
        scores: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Prepare, encode, run an external model program and decode its output.
    Classify {
        image: PathBuf,
        /// Program that reads the tensor on stdin and writes scores on stdout.
        #[arg(long)]
        model_cmd: String,
        #[arg(long = "model-arg", allow_hyphen_values = true)]
        model_args: Vec<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ClassifierConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Encode {
            images,
            out_dir,
            dump_input,
        } => encode(images, &out_dir, dump_input, &config).await,
        Commands::Decode { scores, json } => decode(&scores, json, &config).await,
        Commands::Classify {
            image,
            model_cmd,
            model_args,
            json,
        } => classify(image, model_cmd, model_args, json, config).await,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Output files are named by stem, so two inputs sharing one would overwrite each other.
fn ensure_unique_stems(images: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for path in images {
        if let Some(first) = seen.insert(file_stem(path), path) {
            anyhow::bail!(
                "{} and {} would both write {}.tensor",
                first.display(),
                path.display(),
                file_stem(path)
            );
        }
    }
    Ok(())
}

async fn encode(images: Vec<PathBuf>, out_dir: &Path, dump_input: bool, config: &ClassifierConfig) -> Result<()> {
    ensure_unique_stems(&images)?;
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let results = encode_batch(images.clone(), config.image_size).await;

    let mut failures = 0usize;
    for (path, result) in images.iter().zip(results) {
        let stem = file_stem(path);
        match result {
            Ok(tensor) => {
                let target = out_dir.join(format!("{}.tensor", stem));
                tokio::fs::write(&target, tensor.to_ne_bytes())
                    .await
                    .with_context(|| format!("writing {}", target.display()))?;
                info!("{} -> {} (shape {:?})", path.display(), target.display(), tensor.shape());

                if dump_input {
                    let preview = out_dir.join(format!("{}.input.png", stem));
                    dump_prepared(path.clone(), preview, config.image_size).await?;
                }
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed to encode", failures, images.len());
    }
    Ok(())
}

/// Writes the prepared model input of `image` as a PNG, on the blocking pool.
async fn dump_prepared(image: PathBuf, preview: PathBuf, image_size: u32) -> Result<()> {
    let target = preview.display().to_string();
    tokio::task::spawn_blocking(move || -> fruit_vision::Result<()> {
        let loaded = image_helper::load(&image)?;
        let bitmap = image_helper::prepare(&loaded, image_size);
        image_helper::save_png(&preview, &bitmap)
    })
    .await
    .context("input dump task panicked")?
    .with_context(|| format!("writing {}", target))
}

async fn decode(scores: &Path, json: bool, config: &ClassifierConfig) -> Result<()> {
    let result = decode_file(scores, config).await?;
    print!("{}", render(&result, json)?);
    Ok(())
}

async fn decode_file(scores: &Path, config: &ClassifierConfig) -> Result<ClassificationResult> {
    let bytes = tokio::fs::read(scores)
        .await
        .with_context(|| format!("reading {}", scores.display()))?;
    let confidences = confidences_from_ne_bytes(&bytes)?;
    let decoder = ResultDecoder::new(config.labels.iter().cloned())?;
    Ok(decoder.decode(&confidences)?)
}

async fn classify(
    image: PathBuf,
    model_cmd: String,
    model_args: Vec<String>,
    json: bool,
    config: ClassifierConfig,
) -> Result<()> {
    // The model call blocks on a child process; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || -> fruit_vision::Result<ClassificationResult> {
        let model = CommandModel::new(model_cmd, model_args);
        let mut pipeline = ClassificationPipeline::new(config, model)?;
        pipeline.classify_path(&image)
    })
    .await
    .context("classification task panicked")??;

    print!("{}", render(&result, json)?);
    Ok(())
}

fn render(result: &ClassificationResult, json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(result)?))
    } else {
        Ok(result.to_string())
    }
}
