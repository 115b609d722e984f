// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Recovery Store
//!
//! An append-only log of `path,default_value` lines, one per resource that
//! has a non-empty path, written at registration time. On startup, `replay`
//! reads it back so the daemon can restore every tunable to its recorded
//! default before the arbitration table starts accepting requests -- the
//! same crash-recovery contract the registry's recovery file serves in the
//! original.

use cocotuned_domain::TunerError;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub struct RecoveryStore {
    path: PathBuf,
    file: File,
}

impl RecoveryStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TunerError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(TunerError::from)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(TunerError::from)?;
        Ok(RecoveryStore { path, file })
    }

    /// Appends one `path,default_value` record. Callers gate this on
    /// `path` being non-empty (see `cocotuned_domain::ResourceRegistry::register`).
    pub fn record(&mut self, path: &str, default_value: &str) -> Result<(), TunerError> {
        writeln!(self.file, "{path},{default_value}").map_err(TunerError::from)
    }

    /// Reads every `path,default_value` record currently on disk, in the
    /// order they were written. Malformed lines (missing the comma) are
    /// skipped rather than treated as fatal.
    pub fn replay(&self) -> Result<Vec<(String, String)>, TunerError> {
        Self::replay_path(&self.path)
    }

    fn replay_path(path: &Path) -> Result<Vec<(String, String)>, TunerError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(TunerError::from(e)),
        };
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(TunerError::from)?;
            if let Some((path, default_value)) = line.split_once(',') {
                records.push((path.to_string(), default_value.to_string()));
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("cocotuned-recovery-test-{name}-{:p}", name.as_ptr()))
    }

    #[test]
    fn record_then_replay_round_trips() {
        let path = temp_path("round-trip");
        {
            let mut store = RecoveryStore::open(&path).unwrap();
            store.record("/sys/a", "0").unwrap();
            store.record("/sys/b", "1").unwrap();
        }
        let store = RecoveryStore::open(&path).unwrap();
        let records = store.replay().unwrap();
        assert_eq!(records, vec![("/sys/a".to_string(), "0".to_string()), ("/sys/b".to_string(), "1".to_string())]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn replay_of_missing_file_is_empty() {
        let path = temp_path("missing");
        let records = RecoveryStore::replay_path(&path).unwrap();
        assert!(records.is_empty());
    }
}
