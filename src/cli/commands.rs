//! Subcommand handlers for inspect, record and config actions.

use std::path::Path;
use std::sync::Arc;

use classifier_studio::archive::{
    summarize, ExportError, ExportSink, FileExportSink, ImportError,
};
use classifier_studio::capture::PreviewBuffer;
use classifier_studio::config::{default_path, Config, ConfigError};
use classifier_studio::controller::{StudioController, StudioOptions};
use classifier_studio::session::{CaptureProfile, NameKey, PressEvent, SessionError};
use classifier_studio::source::{
    load_frames_from_dir, FrameProvider, ReplayProvider, SourceError, SourceKind,
};
use classifier_studio::store::{LabelStore, MemoryLabelStore, StoreError};
use classifier_studio::training::{TrainError, TrainOutcome};

use super::args::{ConfigAction, RecordArgs};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config: {0}")]
    WriteConfig(#[source] std::io::Error),

    #[error("config file already exists: {0}")]
    ConfigExists(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("camera unavailable")]
    CameraUnavailable,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Print an archive's manifest and per-class sample counts.
pub fn inspect(path: &Path) -> Result<(), CliError> {
    let summary = summarize(&read_file(path)?)?;

    println!("Archive: {}", path.display());
    println!("SHA-256: {}", summary.sha256);
    println!();
    println!("Classes:");
    for (index, record) in summary.records.iter().enumerate() {
        println!(
            "  [{}] {:<20} enabled: {:<5} result: {:<12} dataset: {:<3} samples: {}",
            index,
            record.name,
            if record.enable { "yes" } else { "no" },
            record.result.name.as_deref().unwrap_or("-"),
            if record.result.dataset.is_some() { "yes" } else { "no" },
            summary.sample_count(index)
        );
    }
    let orphaned: Vec<_> = summary
        .samples
        .iter()
        .filter(|(class, _)| **class >= summary.records.len())
        .collect();
    for (class, count) in orphaned {
        println!("  [{}] (no manifest record) samples: {}", class, count);
    }
    if !summary.other_entries.is_empty() {
        println!();
        println!("Other entries:");
        for entry in &summary.other_entries {
            println!("  {}", entry);
        }
    }
    Ok(())
}

/// Replay a directory of images into one class, train, and export.
pub async fn record(args: RecordArgs, config: &Config) -> Result<(), CliError> {
    let frames = load_frames_from_dir(&args.frames)?;
    let (width, height) = frames
        .first()
        .map(|f| (f.width, f.height))
        .unwrap_or((640, 480));

    let store = Arc::new(MemoryLabelStore::new(config.store.slots));
    if let Some(from) = &args.from {
        let report = classifier_studio::archive::import_collection(store.as_ref(), read_file(from)?)
            .await?;
        println!(
            "Loaded {}: {} classes, {} samples, {} skipped",
            from.display(),
            report.enabled,
            report.samples,
            report.skipped.len()
        );
    }

    let profile = CaptureProfile::from(args.profile);
    let sample_every = match profile {
        CaptureProfile::Classifier => config.capture.classifier_sample_every,
        CaptureProfile::FaceEnrollment => config.capture.face_sample_every,
    }
    .max(1);
    let mirror = args.mirror;
    let replay_frames = frames.clone();
    let factory = move |kind: SourceKind| -> Box<dyn FrameProvider> {
        Box::new(ReplayProvider::new(kind, replay_frames.clone()).with_mirror(mirror))
    };

    let mut controller = StudioController::new(
        store.clone() as Arc<dyn LabelStore>,
        Box::new(factory),
        PreviewBuffer::new(width, height),
        StudioOptions {
            step: config.capture.step(),
            settle: config.training.settle(),
            profile,
            sample_every: Some(sample_every),
        },
    );
    controller.mount(width, height + classifier_studio::controller::HEADER_HEIGHT);

    controller.with_session(|session| -> Result<(), SessionError> {
        session.add_class(args.class)?;
        if let Some(name) = &args.name {
            session.begin_rename(args.class)?;
            session.edit_name(name)?;
            session.name_key(NameKey::Enter)?;
        }
        Ok(())
    })?;

    controller.select_source(args.source.into());
    controller.pump_events();
    if controller.active_source().is_none() || !controller.access() {
        controller.unmount()?;
        return Err(CliError::CameraUnavailable);
    }

    let ticks = args
        .ticks
        .unwrap_or(frames.len() as u64 * sample_every)
        .max(1);
    log::info!("Recording class {} for {} ticks", args.class, ticks);
    controller.with_session(|session| session.record_camera(PressEvent::Down(args.class)));
    for _ in 0..ticks {
        tokio::time::sleep(config.capture.step()).await;
        controller.pump_events();
    }
    controller.with_session(|session| session.record_camera(PressEvent::Up));
    println!(
        "Recorded {} samples into class {}",
        store.example_count(args.class),
        args.class
    );

    match controller.train().await? {
        TrainOutcome::Completed => println!("Training finished"),
        other => println!("Training not run: {:?}", other),
    }

    let archive = controller
        .export(&config.archive.export_options())
        .await?;
    let path = FileExportSink::new(&args.out).deliver(&archive)?;
    controller.unmount()?;

    println!("Wrote {} ({})", path.display(), archive.mime_type);
    Ok(())
}

const DEFAULT_CONFIG_HEADER: &str = "# classifier-studio configuration\n\n";

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), CliError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path))?;
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", config_path.display());
            }
            println!();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CliError::ConfigExists(config_path.display().to_string()));
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(CliError::WriteConfig)?;
            }
            let body = format!("{}{}", DEFAULT_CONFIG_HEADER, Config::default().to_toml()?);
            std::fs::write(&config_path, body).map_err(CliError::WriteConfig)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
