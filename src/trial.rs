//! Trial identification: filename parsing and start/end frame lookup.
//!
//! Trial files are named like `S1-P3-01_BackInBlack_Filled.csv`: `-P` is
//! followed by the participant digit, `-0` by the song digit, an optional
//! separator, the song name and a fixed 11-character suffix.
//!
//! Only single-digit participant and song numbers are recognised, and the
//! suffix length is fixed; other naming schemes are not supported.

use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::study::{Song, PILOT_PARTICIPANT};

/// Length of the fixed suffix that follows the song name.
pub const TRIAL_SUFFIX_LEN: usize = 11;

static SONG_RE: OnceLock<Regex> = OnceLock::new();
static SONG_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
static PARTICIPANT_RE: OnceLock<Regex> = OnceLock::new();

// Greedy `^.*` anchors every pattern on the last marker in the path.
fn song_re() -> &'static Regex {
    SONG_RE.get_or_init(|| {
        let pattern = format!(
            r"^.*-0(?P<song_number>[0-9])[^A-Za-z0-9]?(?P<song_name>.+).{{{TRIAL_SUFFIX_LEN}}}$"
        );
        Regex::new(&pattern).expect("song pattern is valid")
    })
}

fn song_number_re() -> &'static Regex {
    SONG_NUMBER_RE.get_or_init(|| {
        Regex::new(r"^.*-0(?P<song_number>[0-9])").expect("song number pattern is valid")
    })
}

fn participant_re() -> &'static Regex {
    PARTICIPANT_RE.get_or_init(|| {
        Regex::new(r"^.*-P(?P<participant>[0-9])").expect("participant pattern is valid")
    })
}

/// The whole path as text; markers may sit in the session folder name.
fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn malformed(name: &str, reason: &'static str) -> Error {
    Error::TrialName {
        name: name.to_string(),
        reason,
    }
}

fn digit(caps: &regex::Captures<'_>, group: &str) -> u32 {
    caps[group]
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Filename parsers
// ---------------------------------------------------------------------------

/// Song digit following the last `-0` in the path.
pub fn path_to_song_number(path: impl AsRef<Path>) -> Result<u32> {
    let name = path_text(path.as_ref());
    let caps = song_number_re()
        .captures(&name)
        .ok_or_else(|| malformed(&name, "no '-0<digit>' marker"))?;
    Ok(digit(&caps, "song_number"))
}

/// Song name between the song digit and the 11-character suffix.
pub fn path_to_song_name(path: impl AsRef<Path>) -> Result<String> {
    let name = path_text(path.as_ref());
    let caps = song_re()
        .captures(&name)
        .ok_or_else(|| malformed(&name, "no '-0<digit><song><suffix>' marker"))?;
    Ok(caps["song_name"].to_string())
}

/// Participant digit following the last `-P` in the path.
pub fn path_to_participant_number(path: impl AsRef<Path>) -> Result<u32> {
    let name = path_text(path.as_ref());
    let caps = participant_re()
        .captures(&name)
        .ok_or_else(|| malformed(&name, "no '-P<digit>' marker"))?;
    Ok(digit(&caps, "participant"))
}

/// Everything encoded in a trial file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialName {
    pub participant: u32,
    pub song_number: u32,
    pub song_name: String,
}

impl TrialName {
    pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            participant: path_to_participant_number(path)?,
            song_number: path_to_song_number(path)?,
            song_name: path_to_song_name(path)?,
        })
    }

    pub fn song(&self) -> Result<Song> {
        self.song_name.parse()
    }
}

// ---------------------------------------------------------------------------
// Start times
// ---------------------------------------------------------------------------

/// One row of `StartTimes.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTime {
    #[serde(rename = "Participant")]
    pub participant: i64,
    #[serde(rename = "Song")]
    pub song: String,
    #[serde(rename = "Start frame")]
    pub start_frame: i64,
}

/// `(start_frame, end_frame)` of one participant's trial for `song_name`.
///
/// Pilot rows are ignored. Exactly one row must match; the end frame is the
/// start plus the song's excerpt length in frames.
pub fn start_end_frames(
    start_times: &[StartTime],
    song_name: &str,
    participant: u32,
) -> Result<(i64, i64)> {
    let song: Song = song_name.parse()?;

    let matching: Vec<&StartTime> = start_times
        .iter()
        .filter(|row| row.participant > i64::from(PILOT_PARTICIPANT))
        .filter(|row| row.participant == i64::from(participant) && row.song == song_name)
        .collect();

    let row = match matching.as_slice() {
        [row] => *row,
        [] => {
            return Err(Error::StartTimeNotFound {
                participant,
                song: song_name.to_string(),
            })
        }
        rows => {
            return Err(Error::AmbiguousStartTime {
                participant,
                song: song_name.to_string(),
                count: rows.len(),
            })
        }
    };

    let end_frame = row.start_frame + song.duration_frames();
    debug!(
        "participant {participant}, {song}: frames {}..{end_frame}",
        row.start_frame
    );
    Ok((row.start_frame, end_frame))
}
