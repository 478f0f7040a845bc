//! Cross-section dispatch: validate the request, pick the coefficient list, sum a prefix.

use crate::domain::{CorrectionMode, PhysicalParams, Process, Representation, TableKey};
use crate::error::XsecError;
use crate::xsec::table::CoefficientTable;

/// Default partial-wave cutoff of the dispatcher CLI.
pub const DEFAULT_CUTOFF: u32 = 2;

/// Annihilation cross section (1/GeV^2) summed over partial waves `0..=partial_wave_cutoff`.
///
/// `process` must be one of the six process identifiers and `representation`
/// one of 3, 6 or 8. A cutoff beyond the tabulated orders is an error rather
/// than a silent truncation.
///
/// `params` do not enter the result, the table holds precomputed constants.
/// Non-finite values are therefore accepted as they are.
pub fn compute_cross_section(
    table: &CoefficientTable,
    process: &str,
    representation: i64,
    partial_wave_cutoff: u32,
    sommerfeld_enabled: bool,
    params: &PhysicalParams,
) -> Result<f64, XsecError> {
    let process: Process = process.parse()?;
    let rep = Representation::try_from(representation)?;

    let key = TableKey::new(process, rep, CorrectionMode::from_flag(sommerfeld_enabled));
    table.partial_sum(key, partial_wave_cutoff)
}
