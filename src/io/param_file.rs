//! Solver parameter file.
//!
//! Two `KEY value` lines with no trailing newline:
//!
//! ```text
//! MDM 250.0
//! MX 262.5
//! ```
//!
//! Values use the shortest decimal form that round-trips (`250.0`, `1.005`).

use std::path::Path;

use crate::domain::GridPoint;
use crate::error::ScanError;

/// Key of the dark matter mass line.
pub const PRIMARY_MASS_KEY: &str = "MDM";
/// Key of the colored partner mass line.
pub const SECONDARY_MASS_KEY: &str = "MX";

pub fn render_param_file(point: &GridPoint) -> String {
    format!(
        "{PRIMARY_MASS_KEY} {:?}\n{SECONDARY_MASS_KEY} {:?}",
        point.mass_dm, point.mass_x
    )
}

/// Overwrite `path` with the parameters of `point`.
pub fn write_param_file(path: &Path, point: &GridPoint) -> Result<(), ScanError> {
    std::fs::write(path, render_param_file(point)).map_err(|source| ScanError::MalformedParameterFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(text: &str) -> Vec<(String, f64)> {
        text.lines()
            .map(|line| {
                let (key, value) = line.split_once(' ').unwrap();
                (key.to_string(), value.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn unsplit_point_writes_equal_masses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.par");
        write_param_file(&path, &GridPoint::new(250.0, 0.0)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "MDM 250.0\nMX 250.0");
        let parsed = fields(&text);
        assert_eq!(parsed[0], ("MDM".to_string(), 250.0));
        assert_eq!(parsed[1], ("MX".to_string(), 250.0));
    }

    #[test]
    fn split_point_writes_partner_mass() {
        let text = render_param_file(&GridPoint::new(26.0, 0.25));
        assert_eq!(text, "MDM 26.0\nMX 32.5");
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("input.par");
        let err = write_param_file(&path, &GridPoint::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, ScanError::MalformedParameterFile { .. }));
    }
}
