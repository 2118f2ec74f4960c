use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Error;

/// One line of tip diagnostics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TipRecord {
    pub step: usize,
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub k1: f64,
    pub k2: f64,
    pub kpar: f64,
}

/// An append-only text log with one [`TipRecord`] per line.
pub struct TipLog {
    path: PathBuf,
    file: File,
}

impl TipLog {
    /// Opens `dir/name`, truncating it unless `append` is set.
    pub fn create<P: AsRef<Path>>(dir: P, name: &str, append: bool) -> Result<Self, Error> {
        let path = dir.as_ref().join(name);
        let file = OpenOptions::new()
            .create(true)
            .write(!append)
            .append(append)
            .truncate(!append)
            .open(&path)?;

        Ok(Self { path, file })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one record. Each line reaches the file before this returns.
    pub fn add(&mut self, record: &TipRecord) -> Result<(), Error> {
        writeln!(
            self.file,
            "{} {} {} {} {} {} {}",
            record.step,
            scientific(record.time),
            scientific(record.position),
            scientific(record.velocity),
            scientific(record.k1),
            scientific(record.k2),
            scientific(record.kpar),
        )?;
        Ok(())
    }
}

/// C-style `%.16e`: a signed exponent of at least two digits.
fn scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{:.16e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_matches_c_layout() {
        assert_eq!(scientific(1.0), "1.0000000000000000e+00");
        assert_eq!(scientific(-0.00125), "-1.2500000000000000e-03");
        assert_eq!(scientific(6.0199999999999995e123), "6.0199999999999995e+123");
        assert_eq!(scientific(f64::NAN), "nan");
        assert_eq!(scientific(0.0), "0.0000000000000000e+00");
    }

    #[test]
    fn records_append_one_line_each() {
        let dir = tempfile::tempdir().unwrap();
        let record = TipRecord {
            step: 12,
            time: 0.012,
            position: 1.5,
            velocity: 0.25,
            k1: -1.0,
            k2: -0.5,
            kpar: f64::NAN,
        };
        {
            let mut log = TipLog::create(dir.path(), "tip_test", false).unwrap();
            log.add(&record).unwrap();
        }
        {
            let mut log = TipLog::create(dir.path(), "tip_test", true).unwrap();
            log.add(&TipRecord { step: 13, ..record }).unwrap();
        }
        let contents = std::fs::read_to_string(dir.path().join("tip_test")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("12 1.2000000000000000e-02 1.5000000000000000e+00"));
        assert!(lines[1].starts_with("13 "));
        assert!(lines[1].ends_with(" nan"));

        // a fresh start truncates
        TipLog::create(dir.path(), "tip_test", false).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("tip_test")).unwrap();
        assert!(contents.is_empty());
    }
}
