//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the lookup and scan code stays free of presentation details
//! - output changes are localized

use crate::domain::{FinalState, PhysicalParams, Process, Representation};
use crate::physics::{DecodedParticle, alpha_strong, casimir2};
use crate::scan::ScanSummary;

pub mod format;

pub use format::{XSEC_DIGITS, format_significant};

/// The dispatcher's bare output: the cross section with 15 significant digits.
pub fn format_xsec(value: f64) -> String {
    format_significant(value, XSEC_DIGITS)
}

/// Annotated dispatcher output (`--extended`).
pub fn format_xsec_extended(
    process: Process,
    rep: Representation,
    params: &PhysicalParams,
    cutoff: u32,
    sommerfeld: bool,
    value: f64,
) -> String {
    let num = |v: f64| format_significant(v, XSEC_DIGITS);
    let mut out = String::new();
    out.push_str(&format!(
        "Annihilation cross section for {process} with color representation {rep}\n"
    ));
    out.push_str(&format!(
        "and m = {}, v = {}, alpha_s = {}, alpha_sommerfeld = {}\n",
        num(params.mass),
        num(params.velocity),
        num(params.alpha_s),
        num(params.alpha_sommerfeld)
    ));
    out.push_str(&format!("and for l = {cutoff} and sommerfeld {sommerfeld} equals:\n"));
    out.push_str(&format!("\t{}", num(value)));
    out
}

/// Summary printed after a scan.
pub fn format_scan_summary(summary: &ScanSummary) -> String {
    let mut out = String::new();

    out.push_str("=== relic - scan summary ===\n");
    out.push_str(&format!("Output: {}\n", summary.output.display()));
    out.push_str(&format!("Solver: {}\n", summary.solver));
    out.push_str(&format!(
        "Points: total={} | written={} | resumed={} | skipped={}\n",
        summary.points_total,
        summary.rows_written,
        summary.resumed,
        summary.skipped.len()
    ));
    let elapsed = summary.finished_at - summary.started_at;
    out.push_str(&format!(
        "Time: {} -> {} ({:.1}s)\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S"),
        summary.finished_at.format("%H:%M:%S"),
        elapsed.num_milliseconds() as f64 / 1000.0
    ));

    if !summary.skipped.is_empty() {
        out.push_str("\nSkipped points:\n");
        for s in &summary.skipped {
            out.push_str(&format!("- {}: {}\n", s.point, s.reason));
        }
    }

    out
}

/// `Q alpha_s(Q)` table.
pub fn format_alpha_table(scales: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>12} {:>12}\n", "Q [GeV]", "alpha_s"));
    for &q in scales {
        out.push_str(&format!("{q:>12.4} {:>12.6}\n", alpha_strong(q)));
    }
    out
}

pub fn format_identify(particle: &DecodedParticle) -> String {
    let mut out = String::new();
    out.push_str(&format!("Code: {}\n", particle.code));
    out.push_str(&format!("Spin: {}\n", particle.family.display_name()));
    out.push_str(&format!(
        "Color: {} (C2 = {:.4})\n",
        particle.rep,
        casimir2(particle.rep)
    ));
    let processes: Vec<String> = FinalState::ALL
        .into_iter()
        .map(|fs| particle.process(fs).to_string())
        .collect();
    out.push_str(&format!("Processes: {}\n", processes.join(", ")));
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{Duration, Local};

    use super::*;
    use crate::domain::{GridPoint, ScanLayout, SpinFamily};
    use crate::physics::ParticleCode;
    use crate::scan::SkippedPoint;

    #[test]
    fn extended_output_lists_inputs_then_value() {
        let params = PhysicalParams {
            mass: 1000.0,
            velocity: 0.1,
            alpha_s: 0.1,
            alpha_sommerfeld: 0.12,
        };
        let text = format_xsec_extended(
            Process::new(SpinFamily::Fermion, FinalState::Gluons),
            Representation::Octet,
            &params,
            2,
            true,
            3.5e-9,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Annihilation cross section for fftogg with color representation 8");
        assert_eq!(
            lines[1],
            "and m = 1000.0, v = 0.1, alpha_s = 0.1, alpha_sommerfeld = 0.12"
        );
        assert_eq!(lines[2], "and for l = 2 and sommerfeld true equals:");
        assert_eq!(lines[3], "\t3.5e-9");
    }

    #[test]
    fn scan_summary_lists_skipped_points() {
        let started_at = Local::now();
        let summary = ScanSummary {
            layout: ScanLayout::Mass,
            output: PathBuf::from("rd_mass.txt"),
            solver: "./main".to_string(),
            started_at,
            finished_at: started_at + Duration::milliseconds(2500),
            points_total: 241,
            rows_written: 240,
            resumed: 0,
            skipped: vec![SkippedPoint {
                point: GridPoint::new(26.0, 0.0),
                reason: "timed out".to_string(),
            }],
        };
        let text = format_scan_summary(&summary);
        assert!(text.contains("Points: total=241 | written=240 | resumed=0 | skipped=1"));
        assert!(text.contains("(2.5s)"));
        assert!(text.contains("- mdm = 26.0000, mx = 26.0000, delta = 0.0000: timed out"));
    }

    #[test]
    fn alpha_table_has_one_row_per_scale() {
        let text = format_alpha_table(&[10.0, 91.1876]);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(2).unwrap().trim_start().starts_with("91.1876"));
    }

    #[test]
    fn identify_lists_both_processes() {
        let p = ParticleCode(9_000_103).decode().unwrap();
        let text = format_identify(&p);
        assert!(text.contains("Spin: scalar"));
        assert!(text.contains("C2 = 1.3333"));
        assert!(text.contains("Processes: sstoqq, sstogg"));
    }
}
