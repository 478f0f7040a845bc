//! Extraction of scalar results from solver output.

/// Marker of the relic-abundance line printed by the solver.
pub const DEFAULT_MARKER: &str = "omega_h^2 = ";

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No line contains the marker.
    MissingMarker,
    /// The last token of the marked line is not a number.
    Unparsable(String),
}

/// Value of the last line containing `marker`, taken from its final whitespace token.
pub fn extract_marked_value(output: &str, marker: &str) -> Result<f64, ExtractError> {
    let line = output
        .lines()
        .rev()
        .find(|line| line.contains(marker))
        .ok_or(ExtractError::MissingMarker)?;
    let token = line.split_whitespace().last().unwrap_or_default();
    token
        .parse::<f64>()
        .map_err(|_| ExtractError::Unparsable(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVER_OUTPUT: &str = "\
Sommerfeld corrections enabled: true
Bound state formation enabled: false

==== Calculation of relic density =====
Xf=2.5012e+01 Omega=1.1830e-01
Xf(FO)=2.5012e+01 Omega(FO)=1.1790e-01
omega_h^2 = 1.1830E-01
omega_h^2(FO) = 1.1790E-01
";

    #[test]
    fn picks_marked_line_not_freeze_out_line() {
        let v = extract_marked_value(SOLVER_OUTPUT, DEFAULT_MARKER).unwrap();
        assert!((v - 0.1183).abs() < 1e-12);
    }

    #[test]
    fn last_marked_line_wins() {
        let out = "omega_h^2 = 1.0\nomega_h^2 = 2.0\n";
        assert_eq!(extract_marked_value(out, DEFAULT_MARKER), Ok(2.0));
    }

    #[test]
    fn missing_marker() {
        assert_eq!(
            extract_marked_value("Omega=1.0\n", DEFAULT_MARKER),
            Err(ExtractError::MissingMarker)
        );
    }

    #[test]
    fn unparsable_value() {
        assert_eq!(
            extract_marked_value("omega_h^2 = nope\n", DEFAULT_MARKER),
            Err(ExtractError::Unparsable("nope".to_string()))
        );
    }
}
