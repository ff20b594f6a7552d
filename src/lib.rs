//! Data loaders and fixed metadata for a walking-to-music study combining
//! heel motion capture with a force plate.

pub mod data;
pub mod error;
pub mod layout;
pub mod study;
pub mod trial;

pub use data::literal::{Literal, LiteralError};
pub use data::loader::{get_start_end_frames, load_cop_data, load_lr_heel_data};
pub use data::model::Table;
pub use error::{Error, Result};
pub use layout::{get_figures_folder, get_participants_data_folders, DataLayout};
pub use study::{
    load_channel_name_mapping, load_participant_numbers, load_song_genres,
    load_song_labels_for_figures, load_song_names, load_song_numbers, xdim, ydim, zdim, Axis,
    Genre, Song, FRAMES_PER_SECOND, PILOT_PARTICIPANT,
};
pub use trial::{
    path_to_participant_number, path_to_song_name, path_to_song_number, StartTime, TrialName,
};
