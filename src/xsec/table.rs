//! Coefficient table: partial-wave coefficients for all 36 dispatcher keys.
//!
//! The numeric values are physics constants computed outside this crate, so the
//! table is loaded from a JSON file rather than compiled in. The file is a flat
//! list of entries:
//!
//! ```json
//! { "entries": [ { "process": "sstoqq", "rep": 3, "sommerfeld": false,
//!                  "waves": [1.0e-9, 2.0e-10, 0.0, 0.0, 0.0] } ] }
//! ```
//!
//! Loading fails unless every (process, representation, mode) key appears
//! exactly once.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CorrectionMode, FinalState, Process, Representation, SpinFamily, TableKey};
use crate::error::XsecError;

/// Number of tabulated partial waves (orders `0..=4`).
pub const WAVE_COUNT: usize = 5;

const KEY_COUNT: usize = 36;

/// One row of the table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub process: Process,
    pub rep: Representation,
    #[serde(default)]
    pub sommerfeld: bool,
    pub waves: [f64; WAVE_COUNT],
}

impl TableEntry {
    pub fn key(&self) -> TableKey {
        TableKey::new(self.process, self.rep, CorrectionMode::from_flag(self.sommerfeld))
    }
}

/// On-disk representation of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub entries: Vec<TableEntry>,
}

/// Validated, immutable coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    waves: [[f64; WAVE_COUNT]; KEY_COUNT],
}

impl CoefficientTable {
    /// Build a table from entries, rejecting duplicates, gaps and non-finite values.
    pub fn from_entries(entries: impl IntoIterator<Item = TableEntry>) -> Result<Self, XsecError> {
        let mut slots: [Option<[f64; WAVE_COUNT]>; KEY_COUNT] = [None; KEY_COUNT];

        for entry in entries {
            let key = entry.key();
            if let Some(bad) = entry.waves.iter().find(|v| !v.is_finite()) {
                return Err(XsecError::InvalidTable(format!(
                    "non-finite coefficient {bad} for {key}"
                )));
            }
            let slot = &mut slots[key_index(key)];
            if slot.is_some() {
                return Err(XsecError::InvalidTable(format!("duplicate entry for {key}")));
            }
            *slot = Some(entry.waves);
        }

        let mut waves = [[0.0; WAVE_COUNT]; KEY_COUNT];
        for key in TableKey::all() {
            let idx = key_index(key);
            waves[idx] = slots[idx]
                .ok_or_else(|| XsecError::InvalidTable(format!("missing entry for {key}")))?;
        }

        Ok(Self { waves })
    }

    pub fn from_file(file: TableFile) -> Result<Self, XsecError> {
        Self::from_entries(file.entries)
    }

    pub fn from_json_str(json: &str) -> Result<Self, XsecError> {
        let file: TableFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Read and validate a table file.
    pub fn load(path: &Path) -> Result<Self, XsecError> {
        let file = File::open(path).map_err(|source| XsecError::TableIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table: TableFile = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::from_file(table)
    }

    /// Coefficients for `key`, ordered by partial-wave order.
    pub fn waves(&self, key: TableKey) -> &[f64; WAVE_COUNT] {
        &self.waves[key_index(key)]
    }

    /// Sum of the coefficients of orders `0..=cutoff`.
    pub fn partial_sum(&self, key: TableKey, cutoff: u32) -> Result<f64, XsecError> {
        let max = WAVE_COUNT as u32 - 1;
        if cutoff > max {
            return Err(XsecError::OutOfRangeWave {
                requested: cutoff,
                max,
            });
        }
        Ok(self.waves(key)[..=cutoff as usize].iter().sum())
    }

    /// Convert back to the file representation, entries in canonical key order.
    pub fn to_file(&self) -> TableFile {
        let entries = TableKey::all()
            .map(|key| TableEntry {
                process: key.process,
                rep: key.rep,
                sommerfeld: key.mode.is_sommerfeld(),
                waves: *self.waves(key),
            })
            .collect();
        TableFile {
            description: None,
            entries,
        }
    }
}

/// A complete table file with every coefficient set to zero, meant to be filled in.
pub fn table_template() -> TableFile {
    let entries = TableKey::all()
        .map(|key| TableEntry {
            process: key.process,
            rep: key.rep,
            sommerfeld: key.mode.is_sommerfeld(),
            waves: [0.0; WAVE_COUNT],
        })
        .collect();
    TableFile {
        description: Some(
            "Partial-wave coefficients (1/GeV^2) for orders l = 0..4; replace the zeros.".to_string(),
        ),
        entries,
    }
}

fn key_index(key: TableKey) -> usize {
    let family = match key.process.family {
        SpinFamily::Scalar => 0,
        SpinFamily::Fermion => 1,
        SpinFamily::Vector => 2,
    };
    let final_state = match key.process.final_state {
        FinalState::Quarks => 0,
        FinalState::Gluons => 1,
    };
    let rep = match key.rep {
        Representation::Triplet => 0,
        Representation::Sextet => 1,
        Representation::Octet => 2,
    };
    let mode = match key.mode {
        CorrectionMode::Uncorrected => 0,
        CorrectionMode::Sommerfeld => 1,
    };
    ((family * 2 + final_state) * 3 + rep) * 2 + mode
}
