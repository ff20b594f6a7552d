use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use music_gait::layout::PARTICIPANT_FOLDER_SUFFIX;
use music_gait::{
    load_channel_name_mapping, load_participant_numbers, DataLayout, Literal, Song, StartTime,
    FRAMES_PER_SECOND, PILOT_PARTICIPANT,
};

/// Frames written per participant/song into the trajectory files.
const FRAMES_PER_TRIAL: usize = 30;

/// Minimal deterministic PRNG (splitmix64).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

fn round(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Heel position (mm) while stepping in place: the heel lifts once per step.
fn heel_position(frame: usize, phase: f64, rng: &mut SimpleRng) -> Literal {
    let t = frame as f64 / f64::from(FRAMES_PER_SECOND);
    let lift = (2.0 * std::f64::consts::PI * 1.8 * t + phase).sin().max(0.0);
    Literal::Tuple(vec![
        Literal::Float(round(rng.uniform(-2.0, 2.0))),
        Literal::Float(round(150.0 + rng.uniform(-2.0, 2.0))),
        Literal::Float(round(40.0 + 60.0 * lift)),
    ])
}

fn trial_column(participant: u32, song: Song) -> String {
    format!("P{participant}_{song}")
}

fn write_heels(layout: &DataLayout, rng: &mut SimpleRng) -> Result<()> {
    let (left_path, right_path) = layout.heel_paths();
    for (path, phase) in [(left_path, 0.0), (right_path, std::f64::consts::PI)] {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header = vec![String::new()];
        for participant in load_participant_numbers() {
            header.extend(Song::ALL.iter().map(|&song| trial_column(participant, song)));
        }
        writer.write_record(&header)?;

        for frame in 0..FRAMES_PER_TRIAL {
            let mut record = vec![frame.to_string()];
            for _ in load_participant_numbers() {
                for _ in Song::ALL {
                    record.push(heel_position(frame, phase, rng).to_string());
                }
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn write_cop(layout: &DataLayout, rng: &mut SimpleRng) -> Result<()> {
    let path = layout.cop_path();
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let channels: Vec<&str> = load_channel_name_mapping().keys().copied().collect();
    let mut header = vec!["participant", "song", "cop_x", "cop_y"];
    header.extend(&channels);
    writer.write_record(&header)?;

    for participant in load_participant_numbers() {
        for song in Song::ALL {
            let trace = |rng: &mut SimpleRng, centre: f64| {
                Literal::List(
                    (0..FRAMES_PER_TRIAL)
                        .map(|_| Literal::Float(round(centre + rng.uniform(-0.02, 0.02))))
                        .collect(),
                )
            };
            let cop_x = trace(rng, 0.0);
            let cop_y = trace(rng, 0.1);

            let mut record = vec![
                participant.to_string(),
                song.to_string(),
                cop_x.to_string(),
                cop_y.to_string(),
            ];
            // Mean force (N) and moment (N·m) per channel; Fz carries body weight.
            record.push(round(rng.uniform(-15.0, 15.0)).to_string());
            record.push(round(rng.uniform(-15.0, 15.0)).to_string());
            record.push(round(rng.uniform(600.0, 850.0)).to_string());
            for _ in 0..3 {
                record.push(round(rng.uniform(-40.0, 40.0)).to_string());
            }
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Start times plus one folder per participant holding a file per trial,
/// named after the order in which the songs were played.
fn write_sessions(layout: &DataLayout, rng: &mut SimpleRng) -> Result<usize> {
    let path = layout.start_times_path();
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    // Pilot session, dropped by the frame lookup.
    writer.serialize(StartTime {
        participant: i64::from(PILOT_PARTICIPANT),
        song: Song::Bloodline.to_string(),
        start_frame: 900,
    })?;

    let mut n_files = 0;
    for participant in load_participant_numbers() {
        let session = format!("S1-P{participant}");
        let folder: PathBuf = layout
            .final_data_dir()
            .join(format!("{session}{PARTICIPANT_FOLDER_SUFFIX}"));
        fs::create_dir_all(&folder).with_context(|| format!("creating {}", folder.display()))?;

        let mut order = Song::ALL;
        rng.shuffle(&mut order);

        let mut start_frame = (rng.uniform(1.0, 5.0) * f64::from(FRAMES_PER_SECOND)) as i64;
        for (position, song) in order.into_iter().enumerate() {
            writer.serialize(StartTime {
                participant: i64::from(participant),
                song: song.to_string(),
                start_frame,
            })?;

            let file = folder.join(format!("{session}-0{}_{song}_Filled.csv", position + 1));
            write_trial_file(&file, start_frame, song)?;
            n_files += 1;

            start_frame += song.duration_frames() + 20 * i64::from(FRAMES_PER_SECOND);
        }
    }
    writer.flush()?;
    info!("wrote {}", path.display());
    Ok(n_files)
}

fn write_trial_file(path: &Path, start_frame: i64, song: Song) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["frame", "song"])?;
    for offset in 0..FRAMES_PER_TRIAL as i64 {
        writer.write_record([(start_frame + offset).to_string(), song.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_study"));
    let layout = DataLayout::new(&root);

    fs::create_dir_all(layout.final_data_dir())
        .with_context(|| format!("creating {}", layout.final_data_dir().display()))?;
    fs::create_dir_all(layout.figures_folder())
        .with_context(|| format!("creating {}", layout.figures_folder().display()))?;

    let mut rng = SimpleRng::new(42);
    write_heels(&layout, &mut rng)?;
    write_cop(&layout, &mut rng)?;
    let n_files = write_sessions(&layout, &mut rng)?;

    println!(
        "Wrote sample study for {} participants ({n_files} trial files) to {}",
        load_participant_numbers().len(),
        root.display()
    );
    Ok(())
}
