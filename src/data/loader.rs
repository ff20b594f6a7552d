use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use super::literal::Literal;
use super::model::Table;
use crate::error::{Error, Result};
use crate::layout::DataLayout;
use crate::trial::{self, StartTime};

/// Columns of the centre-of-pressure file holding coordinate sequences.
pub const COP_COLUMNS: [&str; 2] = ["cop_x", "cop_y"];

// ---------------------------------------------------------------------------
// Column decoding
// ---------------------------------------------------------------------------

/// How the cells of a column are turned into [`Literal`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    /// Cell text is a literal (tuple, list, number, quoted string); failures are errors.
    Literal,
    /// Plain CSV scalar, typed per column as pandas does.
    Guess,
}

/// Open `path` for CSV reading; a missing or unreadable file is an I/O error.
fn open_csv(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(csv::Reader::from_reader(file))
}

/// Read a CSV file into a [`Table`].
///
/// With `index_col` the first column becomes the row index (its header may be
/// empty, as pandas writes it). `decode` picks the decoding for each remaining
/// column by name. Plain columns, and the index, are typed column by column.
fn read_table(
    path: &Path,
    index_col: bool,
    decode: impl Fn(&str) -> Decode,
) -> Result<Table> {
    let mut reader = open_csv(path)?;
    let mut headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::csv(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let index_name = if index_col && !headers.is_empty() {
        Some(headers.remove(0))
    } else {
        None
    };
    let skip = usize::from(index_name.is_some());

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, _>>()
        .map_err(|e| Error::csv(path, e))?;
    let text_of = |col: usize| -> Vec<&str> {
        records.iter().map(|r| r.get(col).unwrap_or("")).collect()
    };

    let index = if index_name.is_some() {
        Literal::guess_column(&text_of(0))
    } else {
        (0..records.len() as i64).map(Literal::Integer).collect()
    };

    let mut columns: Vec<Vec<Literal>> = Vec::with_capacity(headers.len());
    for (col_idx, column) in headers.iter().enumerate() {
        let cells = text_of(col_idx + skip);
        let decoded = match decode(column) {
            Decode::Literal => cells
                .iter()
                .enumerate()
                .map(|(row_no, text)| {
                    Literal::parse(text).map_err(|source| Error::Literal {
                        path: path.to_path_buf(),
                        row: row_no,
                        column: column.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Decode::Guess => Literal::guess_column(&cells),
        };
        columns.push(decoded);
    }

    let rows: Vec<Vec<Literal>> = (0..records.len())
        .map(|row_no| columns.iter().map(|col| col[row_no].clone()).collect())
        .collect();

    debug!(
        "read {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(Table {
        index_name: index_name.filter(|name| !name.is_empty()),
        index,
        columns: headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Loaders bound to a dataset root
// ---------------------------------------------------------------------------

impl DataLayout {
    /// Left and right heel trajectories; every non-index cell is a literal.
    pub fn load_lr_heel_data(&self) -> Result<(Table, Table)> {
        let (left_path, right_path) = self.heel_paths();
        let left = read_table(&left_path, true, |_| Decode::Literal)?;
        let right = read_table(&right_path, true, |_| Decode::Literal)?;
        info!(
            "loaded heel trajectories: {} left rows, {} right rows",
            left.len(),
            right.len()
        );
        Ok((left, right))
    }

    /// Centre-of-pressure samples with `cop_x` / `cop_y` decoded.
    pub fn load_cop_data(&self) -> Result<Table> {
        let path = self.cop_path();
        let table = read_table(&path, false, |column| {
            if COP_COLUMNS.contains(&column) {
                Decode::Literal
            } else {
                Decode::Guess
            }
        })?;

        for column in COP_COLUMNS {
            if table.column_index(column).is_none() {
                return Err(Error::MissingColumn {
                    path,
                    column: column.to_string(),
                });
            }
        }
        info!("loaded {} centre-of-pressure rows", table.len());
        Ok(table)
    }

    /// Every row of `StartTimes.csv`, pilot rows included.
    pub fn load_start_times(&self) -> Result<Vec<StartTime>> {
        let path = self.start_times_path();
        let mut reader = open_csv(&path)?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<StartTime>, _>>()
            .map_err(|e| Error::csv(&path, e))?;
        debug!("read {} start times from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Start and end frame of a participant's trial for `song_name`.
    pub fn start_end_frames(&self, song_name: &str, participant_number: u32) -> Result<(i64, i64)> {
        let start_times = self.load_start_times()?;
        trial::start_end_frames(&start_times, song_name, participant_number)
    }
}

// ---------------------------------------------------------------------------
// Default-layout entry points
// ---------------------------------------------------------------------------

/// Heel trajectories from the dataset rooted at the parent of the working directory.
pub fn load_lr_heel_data() -> Result<(Table, Table)> {
    DataLayout::from_current_dir()?.load_lr_heel_data()
}

pub fn load_cop_data() -> Result<Table> {
    DataLayout::from_current_dir()?.load_cop_data()
}

pub fn get_start_end_frames(song_name: &str, participant_number: u32) -> Result<(i64, i64)> {
    DataLayout::from_current_dir()?.start_end_frames(song_name, participant_number)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn layout_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DataLayout) {
        let tmp = tempfile::tempdir().unwrap();
        for (rel, contents) in files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        let layout = DataLayout::new(tmp.path());
        (tmp, layout)
    }

    #[test]
    fn heel_cells_round_trip() {
        let position = Literal::Tuple(vec![
            Literal::Float(102.5),
            Literal::Float(-33.25),
            Literal::Float(41.0),
        ]);
        let left = format!(",P1_Bloodline\n0,\"{position}\"\n1,\"(1.0, 2.0, 3.0)\"\n");
        let right = ",P1_Bloodline\n0,\"[0.5, 0.5, 0.5]\"\n1,\"(4, 5, 6)\"\n";
        let (_tmp, layout) = layout_with(&[
            ("data/data-prep_mocap-of-heels_left.csv", &left),
            ("data/data-prep_mocap-of-heels_right.csv", right),
        ]);

        let (lh, rh) = layout.load_lr_heel_data().unwrap();
        assert_eq!(lh.index_name, None);
        assert_eq!(lh.index, vec![Literal::Integer(0), Literal::Integer(1)]);
        assert_eq!(lh.columns, vec!["P1_Bloodline"]);
        assert_eq!(lh.get(0, "P1_Bloodline"), Some(&position));
        assert_eq!(
            rh.get(1, "P1_Bloodline").unwrap().to_f64_vec(),
            Some(vec![4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn bad_heel_cell_names_its_location() {
        let (_tmp, layout) = layout_with(&[
            ("data/data-prep_mocap-of-heels_left.csv", "frame,P2_Juju\n0,\"(1.0, 2.0\"\n"),
            ("data/data-prep_mocap-of-heels_right.csv", "frame,P2_Juju\n0,\"(1.0, 2.0)\"\n"),
        ]);
        match layout.load_lr_heel_data() {
            Err(Error::Literal { row, column, .. }) => {
                assert_eq!(row, 0);
                assert_eq!(column, "P2_Juju");
            }
            other => panic!("expected literal error, got {other:?}"),
        }
    }

    #[test]
    fn missing_files_are_io_errors() {
        let (_tmp, layout) = layout_with(&[]);
        match layout.load_lr_heel_data() {
            Err(Error::Io { path, source }) => {
                assert_eq!(path, layout.heel_paths().0);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
        assert!(matches!(layout.load_cop_data(), Err(Error::Io { .. })));
        assert!(matches!(
            layout.start_end_frames("Bloodline", 1),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn cop_plain_columns_take_one_type_per_column() {
        let csv = "participant,force,cop_x,cop_y\n\
                   3,700,\"[0.1]\",\"[0.2]\"\n\
                   4,702.5,\"[0.1]\",\"[0.2]\"\n";
        let (_tmp, layout) =
            layout_with(&[("data/data-prep_force-plate-center-of-pressure.csv", csv)]);

        let cop = layout.load_cop_data().unwrap();
        assert_eq!(
            cop.column("participant").unwrap(),
            vec![&Literal::Integer(3), &Literal::Integer(4)]
        );
        assert_eq!(
            cop.column("force").unwrap(),
            vec![&Literal::Float(700.0), &Literal::Float(702.5)]
        );
    }

    #[test]
    fn cop_decodes_only_cop_columns() {
        let csv = "participant,song,cop_x,cop_y\n3,TheOcean,\"[0.1, 0.2]\",\"[1.5, 1.25]\"\n";
        let (_tmp, layout) =
            layout_with(&[("data/data-prep_force-plate-center-of-pressure.csv", csv)]);

        let cop = layout.load_cop_data().unwrap();
        assert_eq!(cop.len(), 1);
        assert_eq!(cop.get(0, "participant"), Some(&Literal::Integer(3)));
        assert_eq!(cop.get(0, "song"), Some(&Literal::String("TheOcean".into())));
        assert_eq!(
            cop.get(0, "cop_y"),
            Some(&Literal::List(vec![Literal::Float(1.5), Literal::Float(1.25)]))
        );
    }

    #[test]
    fn cop_without_cop_y_is_rejected() {
        let csv = "cop_x\n\"[0.1]\"\n";
        let (_tmp, layout) =
            layout_with(&[("data/data-prep_force-plate-center-of-pressure.csv", csv)]);
        assert!(matches!(
            layout.load_cop_data(),
            Err(Error::MissingColumn { column, .. }) if column == "cop_y"
        ));
    }

    #[test]
    fn start_end_frames_from_csv() {
        let csv = ",Participant,Song,Start frame\n\
                   0,0,Bloodline,50\n\
                   1,4,Bloodline,1000\n\
                   2,4,SoWhat,30000\n";
        let (_tmp, layout) = layout_with(&[("data/final_data/StartTimes.csv", csv)]);

        assert_eq!(layout.load_start_times().unwrap().len(), 3);
        assert_eq!(layout.start_end_frames("Bloodline", 4).unwrap(), (1000, 8500));
        assert_eq!(layout.start_end_frames("SoWhat", 4).unwrap(), (30000, 38400));
        assert!(matches!(
            layout.start_end_frames("Bloodline", 0),
            Err(Error::StartTimeNotFound { .. })
        ));
    }
}
