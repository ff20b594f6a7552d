//! Fixed study metadata: songs, genres, durations, participants, axes and
//! force-plate channels.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::Error;

/// Motion capture and force plate sampling rate.
pub const FRAMES_PER_SECOND: u32 = 300;

/// Participant id of the pilot session, excluded from analysis.
pub const PILOT_PARTICIPANT: u32 = 0;

pub const PARTICIPANTS: std::ops::RangeInclusive<u32> = 1..=9;

// ---------------------------------------------------------------------------
// Songs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    HeavyMetal,
    Rock,
    Jazz,
}

impl Genre {
    pub fn label(self) -> &'static str {
        match self {
            Genre::HeavyMetal => "Heavy metal",
            Genre::Rock => "Rock",
            Genre::Jazz => "Jazz",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six songs, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Song {
    Bloodline,
    GoIntoTheWater,
    BackInBlack,
    TheOcean,
    Juju,
    SoWhat,
}

impl Song {
    pub const ALL: [Song; 6] = [
        Song::Bloodline,
        Song::GoIntoTheWater,
        Song::BackInBlack,
        Song::TheOcean,
        Song::Juju,
        Song::SoWhat,
    ];

    /// Name as written in filenames and in `StartTimes.csv`.
    pub fn name(self) -> &'static str {
        match self {
            Song::Bloodline => "Bloodline",
            Song::GoIntoTheWater => "GoIntoTheWater",
            Song::BackInBlack => "BackInBlack",
            Song::TheOcean => "TheOcean",
            Song::Juju => "Juju",
            Song::SoWhat => "SoWhat",
        }
    }

    pub fn genre(self) -> Genre {
        match self {
            Song::Bloodline | Song::GoIntoTheWater => Genre::HeavyMetal,
            Song::BackInBlack | Song::TheOcean => Genre::Rock,
            Song::Juju | Song::SoWhat => Genre::Jazz,
        }
    }

    /// Length of the excerpt played during a trial.
    pub fn duration_secs(self) -> f64 {
        match self {
            Song::Bloodline => 25.0,
            Song::GoIntoTheWater => 24.25,
            Song::BackInBlack => 21.5,
            Song::TheOcean => 21.0,
            Song::Juju => 25.187,
            Song::SoWhat => 28.0,
        }
    }

    /// Excerpt length in frames, rounded down.
    pub fn duration_frames(self) -> i64 {
        (self.duration_secs() * f64::from(FRAMES_PER_SECOND)).floor() as i64
    }

    /// 0-based position in presentation order.
    pub fn number(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Song {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Song::ALL
            .into_iter()
            .find(|song| song.name() == s)
            .ok_or_else(|| Error::UnknownSong(s.to_string()))
    }
}

/// Song name → genre, in presentation order.
pub fn load_song_genres() -> IndexMap<&'static str, &'static str> {
    Song::ALL
        .into_iter()
        .map(|song| (song.name(), song.genre().label()))
        .collect()
}

pub fn load_song_names() -> Vec<&'static str> {
    load_song_genres().keys().copied().collect()
}

/// Song name → 0-based position in [`load_song_names`].
pub fn load_song_numbers() -> IndexMap<&'static str, usize> {
    load_song_names()
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect()
}

/// Two-line axis labels, `"Name\n(Genre)"`.
pub fn load_song_labels_for_figures() -> Vec<String> {
    load_song_genres()
        .iter()
        .map(|(song, genre)| format!("{song}\n({genre})"))
        .collect()
}

pub fn load_participant_numbers() -> Vec<u32> {
    PARTICIPANTS.collect()
}

// ---------------------------------------------------------------------------
// Axes and force-plate channels
// ---------------------------------------------------------------------------

/// Index of a coordinate inside a position tuple. Z is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub fn index(self) -> usize {
        self as usize
    }
}

pub fn xdim() -> usize {
    Axis::X.index()
}

pub fn ydim() -> usize {
    Axis::Y.index()
}

pub fn zdim() -> usize {
    Axis::Z.index()
}

// C3D TYPE-4 force platform channel order:
// https://www.c3d.org/HTML/default.htm?turl=Documents%2Ftype24.htm
const CHANNEL_NAMES: [(&str, &str); 6] = [
    ("Channel_01", "Force_x"),
    ("Channel_02", "Force_y"),
    ("Channel_03", "Force_z"),
    ("Channel_04", "Moment_x"),
    ("Channel_05", "Moment_y"),
    ("Channel_06", "Moment_z"),
];

/// Raw force-plate channel → force/moment axis name.
pub fn load_channel_name_mapping() -> IndexMap<&'static str, &'static str> {
    CHANNEL_NAMES.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn song_tables_agree() {
        let genres = load_song_genres();
        let names = load_song_names();
        let numbers = load_song_numbers();
        assert_eq!(names.len(), genres.len());
        assert_eq!(numbers.len(), genres.len());
        for (i, name) in names.iter().enumerate() {
            assert_eq!(numbers[name], i);
        }
        assert_eq!(
            names,
            vec!["Bloodline", "GoIntoTheWater", "BackInBlack", "TheOcean", "Juju", "SoWhat"]
        );
    }

    #[test]
    fn genres_in_order() {
        let genres: Vec<_> = load_song_genres().into_values().collect();
        assert_eq!(
            genres,
            vec!["Heavy metal", "Heavy metal", "Rock", "Rock", "Jazz", "Jazz"]
        );
    }

    #[test]
    fn figure_labels() {
        let labels = load_song_labels_for_figures();
        let genres = load_song_genres();
        assert_eq!(labels.len(), 6);
        for (label, (name, genre)) in labels.iter().zip(&genres) {
            assert_eq!(*label, format!("{name}\n({genre})"));
        }
        assert_eq!(labels[0], "Bloodline\n(Heavy metal)");
    }

    #[test]
    fn participants_one_to_nine() {
        let participants = load_participant_numbers();
        assert_eq!(participants, (1..=9).collect::<Vec<u32>>());
        assert!(!participants.contains(&PILOT_PARTICIPANT));
    }

    #[test]
    fn durations_in_frames() {
        assert_eq!(Song::Bloodline.duration_frames(), 7500);
        assert_eq!(Song::GoIntoTheWater.duration_frames(), 7275);
        assert_eq!(Song::BackInBlack.duration_frames(), 6450);
        assert_eq!(Song::TheOcean.duration_frames(), 6300);
        assert_eq!(Song::Juju.duration_frames(), 7556);
        assert_eq!(Song::SoWhat.duration_frames(), 8400);
    }

    #[test]
    fn song_from_name() {
        assert_eq!("Juju".parse::<Song>().unwrap(), Song::Juju);
        assert_eq!(Song::Juju.number(), 4);
        assert!(matches!("juju".parse::<Song>(), Err(Error::UnknownSong(_))));
    }

    #[test]
    fn channel_mapping_is_one_to_one() {
        let mapping = load_channel_name_mapping();
        assert_eq!(mapping["Channel_01"], "Force_x");
        assert_eq!(mapping["Channel_06"], "Moment_z");
        assert_eq!(mapping.len(), 6);
        let distinct: HashSet<_> = mapping.values().collect();
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn axis_indices() {
        assert_eq!((xdim(), ydim(), zdim()), (0, 1, 2));
    }
}
