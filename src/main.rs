// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use std::path::Path;

use avrviz::cli::{
    print_clip_info, print_json, print_summary, Cli, ClipInfo, Command, PipelineArgs,
    ProgressListener, RenderArgs,
};
use avrviz::config::VizConfig;
use avrviz::core::visualization::{render_spectrogram, render_waveform, save_png};
use avrviz::core::{decode_file, ArtifactRecord, BatchArtifactPipeline, ClipPipeline, LogListener};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = VizConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Batch(args) => {
            let mut config = config;
            args.apply(&mut config);
            config.validate()?;

            let pipeline = ClipPipeline::new(config.pipeline_config())?;
            let batch = BatchArtifactPipeline::new(pipeline, config.batch_options());

            let report = if args.quiet {
                batch.run(&mut LogListener)
            } else {
                batch.run(&mut ProgressListener::new())
            }
            .context("Batch run failed")?;

            let options = batch.options();
            print_summary(&report.summary, &options.artifacts_path(), &options.summary_path());
        }
        Command::Inspect { file, pipeline, json } => {
            let pipeline = build_pipeline(config, &pipeline)?;
            let clip = decode_file(&file).with_context(|| format!("Failed to decode {}", file.display()))?;
            let artifact = pipeline.compute(&clip_id(&file), &clip)?;
            let info = ClipInfo::new(&file, &clip, &artifact);

            if json {
                let record = ArtifactRecord::from(&artifact);
                print_json(&serde_json::json!({ "info": info, "artifact": record }))?;
            } else {
                print_clip_info(&info);
            }
        }
        Command::Render(args) => render(config, &args)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn build_pipeline(mut config: VizConfig, overrides: &PipelineArgs) -> Result<ClipPipeline> {
    overrides.apply(&mut config);
    config.validate()?;
    Ok(ClipPipeline::new(config.pipeline_config())?)
}

fn render(config: VizConfig, args: &RenderArgs) -> Result<()> {
    let pipeline = build_pipeline(config, &args.pipeline)?;
    let clip = decode_file(&args.file)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;
    let artifact = pipeline.compute(&clip_id(&args.file), &clip)?;

    let (width, height) = (args.image_width, args.image_height);

    let spec_img = render_spectrogram(&artifact.spectrogram, width, height);
    save_png(&spec_img, &args.output)?;
    println!("Spectrogram saved to: {}", args.output.display().to_string().cyan());

    if let Some(path) = &args.waveform {
        let wave_img = render_waveform(&artifact.waveform, width, height);
        save_png(&wave_img, path)?;
        println!("Waveform saved to: {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn clip_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
