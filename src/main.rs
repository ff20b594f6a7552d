use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::{json, Value as JsonValue};

use music_gait::layout::trial_files;
use music_gait::study::load_channel_name_mapping;
use music_gait::trial::start_end_frames;
use music_gait::{load_song_genres, DataLayout, Table, TrialName};

/// Rows shown per table in the summary.
const HEAD_ROWS: usize = 3;

fn main() -> Result<()> {
    env_logger::init();

    let layout = match std::env::args_os().nth(1) {
        Some(root) => DataLayout::new(PathBuf::from(root)),
        None => DataLayout::from_current_dir().context("resolving dataset root")?,
    };
    info!("inspecting dataset at {}", layout.root().display());

    let summary = json!({
        "root": layout.root(),
        "figures_folder": layout.figures_folder(),
        "songs": load_song_genres(),
        "channels": load_channel_name_mapping(),
        "heels": heel_summary(&layout),
        "center_of_pressure": cop_summary(&layout),
        "participants": participants_summary(&layout)?,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// Missing or malformed tables are reported in the summary rather than aborting.
fn table_or_error(result: music_gait::Result<JsonValue>) -> JsonValue {
    result.unwrap_or_else(|e| {
        warn!("{e}");
        json!({ "error": e.to_string() })
    })
}

fn heel_summary(layout: &DataLayout) -> JsonValue {
    table_or_error(layout.load_lr_heel_data().map(|(left, right)| {
        json!({
            "left": left.summary_json(HEAD_ROWS),
            "right": right.summary_json(HEAD_ROWS),
        })
    }))
}

fn cop_summary(layout: &DataLayout) -> JsonValue {
    table_or_error(layout.load_cop_data().map(|mut cop: Table| {
        cop.rename_columns(&load_channel_name_mapping());
        cop.summary_json(HEAD_ROWS)
    }))
}

/// Every trial file per participant folder, with its parsed name and frame window.
fn participants_summary(layout: &DataLayout) -> Result<JsonValue> {
    let folders = layout
        .participants_data_folders()
        .context("listing participant folders")?;

    let start_times = match layout.load_start_times() {
        Ok(rows) => rows,
        Err(e) => {
            warn!("start times unavailable: {e}");
            Vec::new()
        }
    };

    let mut out = Vec::with_capacity(folders.len());
    for folder in &folders {
        let files = trial_files(folder)
            .with_context(|| format!("listing {}", folder.display()))?;

        let trials: Vec<JsonValue> = files
            .iter()
            .map(|file| {
                let file_name = file.file_name().map(|n| n.to_string_lossy().into_owned());
                match TrialName::parse(file) {
                    Ok(trial) => {
                        let frames =
                            start_end_frames(&start_times, &trial.song_name, trial.participant)
                                .map(|(start, end)| json!({ "start": start, "end": end }))
                                .unwrap_or_else(|e| json!({ "error": e.to_string() }));
                        json!({ "file": file_name, "trial": trial, "frames": frames })
                    }
                    Err(e) => json!({ "file": file_name, "error": e.to_string() }),
                }
            })
            .collect();

        out.push(json!({ "folder": folder, "trials": trials }));
    }
    Ok(JsonValue::Array(out))
}
