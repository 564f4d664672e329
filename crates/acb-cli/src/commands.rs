use std::path::Path;
use std::time::Instant;

use acb_core::{PanelRun, PipelineConfig, build_panel, ingest, presence_windows};
use acb_output::{write_panels, write_presence};
use acb_scales::{COMBINED_FILE, DRUG_NAMES_FILE, harmonize, write_combined};
use anyhow::{Context, Result};
use tracing::{info, info_span};

use crate::cli::{ConfigArgs, PanelArgs, PresenceArgs, ScalesArgs};
use crate::types::{FileSummary, RunResult};

/// Load the config file (or defaults) and apply command line overrides.
pub fn load_config(args: &ConfigArgs, separator: Option<char>) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(separator) = separator {
        config.separator = separator;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

pub fn run_panel(args: &PanelArgs) -> Result<RunResult> {
    let config = load_config(&args.config, args.separator)?;

    // =========================================================================
    // Stage 1: Ingest
    // =========================================================================
    let granularities = args.granularity.granularities();
    let inputs = ingest(&config, &granularities).context("load inputs")?;
    let excluded = inputs.events.dropped();

    // =========================================================================
    // Stages 2-4: Aggregate, assemble and censor every requested granularity
    // =========================================================================
    // Nothing is written until every panel has been built.
    let mut runs: Vec<PanelRun> = Vec::new();
    for &granularity in &granularities {
        let run = build_panel(&inputs, &config, granularity)
            .with_context(|| format!("build {granularity} panel"))?;
        runs.push(run);
    }

    // =========================================================================
    // Stage 5: Output
    // =========================================================================
    let files = info_span!("output", output_dir = %config.output_dir.display()).in_scope(
        || -> Result<Vec<FileSummary>> {
            let start = Instant::now();
            let panels: Vec<_> = runs.iter().map(|run| &run.panel).collect();
            let written = write_panels(&panels, &config.output_dir, config.separator)
                .context("write panels")?;
            let files: Vec<FileSummary> = runs
                .iter()
                .zip(written)
                .map(|(run, written)| FileSummary {
                    label: format!("{} panel", run.granularity),
                    written,
                    excluded: Some(excluded),
                    censored: Some(run.outside_window + run.without_window),
                })
                .collect();
            info!(
                files = files.len(),
                duration_ms = start.elapsed().as_millis(),
                "outputs written"
            );
            Ok(files)
        },
    )?;

    Ok(RunResult {
        command: "panel",
        output_dir: config.output_dir,
        files,
    })
}

pub fn run_presence(args: &PresenceArgs) -> Result<RunResult> {
    let config = load_config(&args.config, None)?;
    let derived = presence_windows(&config).context("derive presence windows")?;

    let written = info_span!("output", output_dir = %config.output_dir.display())
        .in_scope(|| write_presence(&derived.windows, &config.output_dir))
        .context("write presence table")?;
    info!(
        subjects = derived.windows.len(),
        placeholder_dates = derived.placeholder_dates,
        unparsable_dates = derived.unparsable_dates,
        "presence windows written"
    );

    Ok(RunResult {
        command: "presence",
        output_dir: config.output_dir,
        files: vec![FileSummary {
            label: "presence windows".to_string(),
            written,
            excluded: Some(derived.placeholder_dates + derived.unparsable_dates),
            censored: None,
        }],
    })
}

pub fn run_scales(args: &ScalesArgs) -> Result<RunResult> {
    let dir = args.scales_dir.as_path();
    let names = args
        .names
        .clone()
        .unwrap_or_else(|| dir.join(DRUG_NAMES_FILE));
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| dir.join(COMBINED_FILE));

    let rows = harmonize(dir, &names)
        .with_context(|| format!("harmonize scales in {}", dir.display()))?;
    let written = info_span!("output", path = %output.display())
        .in_scope(|| write_combined(&rows, &output))
        .context("write combined scales")?;

    Ok(RunResult {
        command: "scales",
        output_dir: output
            .parent()
            .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf),
        files: vec![FileSummary {
            label: "combined scales".to_string(),
            written,
            excluded: None,
            censored: None,
        }],
    })
}
