use std::path::{Path, PathBuf};

use crate::field::Field;
use crate::grid::Grid;
use crate::output::OutputField;
use crate::Error;

/// Width of the zero-padded step number in snapshot names.
const STEP_WIDTH: usize = 7;
/// Subdirectory of the output path holding snapshots.
const DATA_DIR: &str = "data";

/// Describes the contents of one snapshot.
pub struct SnapshotDescriptor<'a> {
    pub grid: &'a Grid,
    pub step: usize,
    pub time: f64,
    pub fields: Vec<(OutputField, &'a Field)>,
}

/// The HDF5 file holding the fields of one saved step.
///
/// Each field is a `(ny, nx)` dataset named by its label. Grid geometry and
/// time are stored as file attributes.
#[derive(Debug)]
pub struct SnapshotFile {
    root: PathBuf,
    name: String,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(root: P, step: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            name: format!("t{:0width$}.h5", step, width = STEP_WIDTH),
        }
    }

    /// Directory that snapshots are written to under `root`.
    pub fn data_dir<P: AsRef<Path>>(root: P) -> PathBuf {
        root.as_ref().join(DATA_DIR)
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.abs_path().is_file()
    }

    #[inline]
    pub fn abs_path(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(&self.name)
    }

    /// Path relative to the output root, as listed in the index.
    #[inline]
    pub fn rel_path(&self) -> String {
        format!("{}/{}", DATA_DIR, self.name)
    }

    pub fn write(&self, desc: SnapshotDescriptor) -> Result<(), Error> {
        let grid = desc.grid;
        let file = hdf5::File::create(self.abs_path())?;

        for (field, values) in &desc.fields {
            file.new_dataset::<f64>()
                .shape((grid.ny(), grid.nx()))
                .create(field.label())?
                .write(values.values())?;
        }

        file.new_attr::<f64>()
            .shape(hdf5::Extents::Scalar)
            .create("time")?
            .write_scalar(&desc.time)?;
        file.new_attr::<u64>()
            .shape(hdf5::Extents::Scalar)
            .create("step")?
            .write_scalar(&(desc.step as u64))?;
        file.new_attr::<f64>()
            .shape(2)
            .create("spacing")?
            .write(&ndarray::arr1(&[grid.spacing(0), grid.spacing(1)]))?;
        file.new_attr::<u64>()
            .shape(2)
            .create("size")?
            .write(&ndarray::arr1(&[grid.nx() as u64, grid.ny() as u64]))?;
        file.new_attr::<f64>()
            .shape(2)
            .create("origin")?
            .write(&ndarray::arr1(&[grid.x(0), grid.y(0)]))?;

        file.close()?;
        Ok(())
    }

    /// Loads the phase and undercooling fields saved in this snapshot.
    pub fn read(&self, psi: &mut Field, u: &mut Field) -> Result<(), Error> {
        let file = hdf5::File::open(self.abs_path())?;
        for (field, target) in [(OutputField::Psi, psi), (OutputField::U, u)] {
            let dataset = file.dataset(field.label()).map_err(|e| Error::Restart {
                reason: format!("{} has no {} dataset ({})", self.rel_path(), field.label(), e),
            })?;
            let values = dataset.read_2d::<f64>()?;
            let grid = target.grid();
            if values.dim() != (grid.ny(), grid.nx()) {
                return Err(Error::Restart {
                    reason: format!(
                        "{} holds a {:?} {} array, expected {:?}",
                        self.rel_path(),
                        values.dim(),
                        field.label(),
                        (grid.ny(), grid.nx()),
                    ),
                });
            }
            target.assign_values(values.view());
        }
        file.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded_steps() {
        let snapshot = SnapshotFile::new("/tmp/run", 420);
        assert_eq!(snapshot.rel_path(), "data/t0000420.h5");
        assert_eq!(
            snapshot.abs_path(),
            PathBuf::from("/tmp/run/data/t0000420.h5")
        );
    }

    #[test]
    fn fields_survive_a_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(SnapshotFile::data_dir(dir.path())).unwrap();
        let grid = Grid::quadrant([1.0, 0.5], [0.25, 0.25]);
        let psi = Field::from_fn(&grid, |i, j| i as f64 - 0.5 * j as f64);
        let u = Field::from_fn(&grid, |i, j| -0.1 * (i * j) as f64);

        let snapshot = SnapshotFile::new(dir.path(), 30);
        assert!(!snapshot.exists());
        snapshot
            .write(SnapshotDescriptor {
                grid: &grid,
                step: 30,
                time: 0.3,
                fields: vec![(OutputField::Psi, &psi), (OutputField::U, &u)],
            })
            .unwrap();
        assert!(snapshot.exists());

        let mut psi_read = Field::new(&grid, 0.0);
        let mut u_read = Field::new(&grid, 0.0);
        snapshot.read(&mut psi_read, &mut u_read).unwrap();
        assert_eq!(psi_read.values(), psi.values());
        assert_eq!(u_read.values(), u.values());
    }

    #[test]
    fn missing_phase_field_is_a_restart_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(SnapshotFile::data_dir(dir.path())).unwrap();
        let grid = Grid::quadrant([1.0, 0.5], [0.25, 0.25]);
        let u = Field::new(&grid, -0.5);

        let snapshot = SnapshotFile::new(dir.path(), 0);
        snapshot
            .write(SnapshotDescriptor {
                grid: &grid,
                step: 0,
                time: 0.0,
                fields: vec![(OutputField::U, &u)],
            })
            .unwrap();

        let mut psi = Field::new(&grid, 0.0);
        let mut u = Field::new(&grid, 0.0);
        let result = snapshot.read(&mut psi, &mut u);
        assert!(matches!(result, Err(Error::Restart { .. })));
    }
}
