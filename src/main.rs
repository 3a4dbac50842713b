use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::DynamicImage;
use log::{info, warn};
use postura::{
    config, examination::Examination, intake::Patient, pdf, summary, Analysis, BlazePoseDetector,
    Pipeline,
};
use postura_vision::video::Camera;

#[derive(Parser)]
#[command(name = "postura")]
#[command(
    version,
    about = "Postural assessment from a single standing photograph"
)]
struct Cli {
    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photograph from disk
    Analyze {
        /// JPEG or PNG of the patient standing, facing the camera
        photo: PathBuf,
        #[command(flatten)]
        output: ReportArgs,
    },
    /// Take a photograph with the camera and analyze it
    Capture {
        /// V4L2 device (defaults to the configured camera)
        #[arg(short, long)]
        device: Option<String>,
        #[command(flatten)]
        output: ReportArgs,
    },
    /// Open config file in editor
    Config,
}

#[derive(Args)]
struct ReportArgs {
    /// Patient name ("Anonyme" when omitted)
    #[arg(short, long)]
    name: Option<String>,
    /// Patient height in centimeters, between 50 and 250
    #[arg(long)]
    height: Option<f64>,
    /// Write the PDF report here (a directory gets the default file name)
    #[arg(long)]
    pdf: Option<PathBuf>,
    /// Save the annotated photograph here
    #[arg(long)]
    annotated: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Override the configured pose model
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { photo, output } => {
            info!("Loading image: {}", photo.display());
            let img = image::open(&photo)
                .with_context(|| format!("Failed to open image {}", photo.display()))?;
            analyze(&cfg, &img, &output)
        }
        Commands::Capture { device, output } => {
            let device = device.unwrap_or_else(|| cfg.camera.clone());
            info!("Opening camera: {}", device);
            let mut camera = Camera::open(&device).context("Failed to open camera")?;
            let img = camera
                .snapshot(cfg.warmup_frames)
                .context("Failed to capture photograph")?;
            analyze(&cfg, &img, &output)
        }
        Commands::Config => open_config(cli.config.as_deref()),
    }
}

fn analyze(cfg: &config::Config, img: &DynamicImage, args: &ReportArgs) -> Result<()> {
    let patient = Patient::new(
        args.name.as_deref(),
        args.height.unwrap_or(cfg.default_height_cm),
    )?;

    let model_path = args.model.as_deref().unwrap_or(cfg.model_path.as_path());
    let detector = BlazePoseDetector::new(model_path, cfg.presence_threshold)
        .context("Failed to initialize pose detector")?;
    let mut pipeline = Pipeline::new(detector);

    info!("Analyzing posture for: {}", patient.name);

    let (report, annotated) = match pipeline.analyze(img, &patient.name, patient.height_cm)? {
        Analysis::Measured {
            report, annotated, ..
        } => (report, annotated),
        Analysis::NoPersonDetected => {
            anyhow::bail!(
                "Détection impossible. Assurez-vous d'être bien visible de face, de la tête aux pieds."
            );
        }
    };

    let degenerate = report.degenerate_fields();
    if !degenerate.is_empty() {
        warn!(
            "Some measurements could not be computed and were set to zero: {}",
            degenerate.join(", ")
        );
    }
    if report.min_visibility < cfg.visibility_threshold {
        warn!(
            "Low landmark visibility ({:.2}); measurements may be unreliable",
            report.min_visibility
        );
    }

    let exam = Examination::new(report);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&exam)?);
    } else {
        print!("{}", summary::render(&exam));
    }

    if let Some(path) = &args.annotated {
        annotated
            .save(path)
            .with_context(|| format!("Failed to save annotated image {}", path.display()))?;
        info!("Annotated image saved: {}", path.display());
    }

    if let Some(path) = &args.pdf {
        let path = pdf_destination(path, &exam);
        pdf::write(&path, &exam, &annotated).context("Failed to export PDF report")?;
        info!("✓ PDF report saved: {}", path.display());
    }

    Ok(())
}

fn pdf_destination(path: &Path, exam: &Examination) -> PathBuf {
    if path.is_dir() {
        path.join(exam.pdf_file_name())
    } else {
        path.to_path_buf()
    }
}

fn open_config(path: Option<&Path>) -> Result<()> {
    let config_path = path.unwrap_or(config::CONFIG_PATH.as_path());
    if !config_path.exists() {
        config::save_config(&config::Config::default(), Some(config_path))
            .context("Failed to write default config")?;
    }
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
