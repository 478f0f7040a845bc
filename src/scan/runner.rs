//! Grid scan driver.
//!
//! For every grid point: write the parameter file, run the solver once per
//! correction setting, extract the relic abundance from each run and append
//! one row to the results table. Points are processed strictly in order.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Corrections, FailurePolicy, GridPoint, ResultRow, ScanConfig, ScanLayout};
use crate::error::ScanError;
use crate::io::{PointKey, ResultsWriter, completed_points, write_param_file};
use crate::scan::grid::grid_points;
use crate::scan::output::{ExtractError, extract_marked_value};
use crate::scan::solver::{Solver, SolverFailure};

/// A grid point left out under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPoint {
    pub point: GridPoint,
    pub reason: String,
}

/// Outcome of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub layout: ScanLayout,
    pub output: PathBuf,
    pub solver: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub points_total: usize,
    pub rows_written: usize,
    /// Points already present in the results file when resuming.
    pub resumed: usize,
    pub skipped: Vec<SkippedPoint>,
}

/// Run the scan described by `config` against `solver`.
pub fn run_scan(config: &ScanConfig, solver: &dyn Solver) -> Result<ScanSummary, ScanError> {
    let started_at = Local::now();
    let points = grid_points(&config.mass, &config.delta)?;

    let done: HashSet<PointKey> = if config.resume {
        completed_points(&config.output, config.layout)?
    } else {
        HashSet::new()
    };
    let mut writer = if config.resume {
        ResultsWriter::append(&config.output, config.layout)?
    } else {
        ResultsWriter::create(&config.output, config.layout)?
    };

    info!(
        points = points.len(),
        already_done = done.len(),
        output = %config.output.display(),
        solver = %solver.describe(),
        "starting scan"
    );

    let mut rows_written = 0;
    let mut resumed = 0;
    let mut skipped = Vec::new();

    for point in &points {
        if done.contains(&PointKey::of(point)) {
            debug!(%point, "already in results file");
            resumed += 1;
            continue;
        }

        info!(mdm = point.mass_dm, delta = point.delta, "scanning grid point");
        match evaluate_point(config, solver, *point) {
            Ok(row) => {
                writer.write_row(&row)?;
                rows_written += 1;
            }
            Err(err) if config.on_error == FailurePolicy::Skip && err.is_point_failure() => {
                warn!(%point, error = %err, "skipping grid point");
                skipped.push(SkippedPoint {
                    point: *point,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(rows_written, resumed, skipped = skipped.len(), "scan finished");

    Ok(ScanSummary {
        layout: config.layout,
        output: config.output.clone(),
        solver: solver.describe(),
        started_at,
        finished_at: Local::now(),
        points_total: points.len(),
        rows_written,
        resumed,
        skipped,
    })
}

/// Run all four solver configurations for one point.
pub fn evaluate_point(
    config: &ScanConfig,
    solver: &dyn Solver,
    point: GridPoint,
) -> Result<ResultRow, ScanError> {
    write_param_file(&config.param_file, &point)?;

    let mut omega = [0.0; 4];
    for (slot, corrections) in omega.iter_mut().zip(Corrections::ALL) {
        debug!(%corrections, "running solver");
        let stdout = solver
            .run(&config.param_file, corrections)
            .map_err(|failure| solver_error(solver, failure, corrections, point))?;
        *slot = extract_marked_value(&stdout, &config.marker).map_err(|e| match e {
            ExtractError::MissingMarker => ScanError::MissingMarker {
                marker: config.marker.clone(),
                corrections,
                point,
            },
            ExtractError::Unparsable(token) => ScanError::UnparsableValue {
                marker: config.marker.clone(),
                token,
                corrections,
                point,
            },
        })?;
    }

    Ok(ResultRow { point, omega })
}

fn solver_error(
    solver: &dyn Solver,
    failure: SolverFailure,
    corrections: Corrections,
    point: GridPoint,
) -> ScanError {
    let command = solver.describe();
    match failure {
        SolverFailure::Spawn(source) => ScanError::SolverSpawn { command, source },
        SolverFailure::Wait(e) => ScanError::SolverInvocation {
            command,
            corrections,
            point,
            status: "unknown".to_string(),
            stderr: format!("failed to wait for solver: {e}"),
        },
        SolverFailure::Exit { status, stderr } => ScanError::SolverInvocation {
            command,
            corrections,
            point,
            status,
            stderr,
        },
        SolverFailure::Timeout { seconds } => ScanError::SolverTimeout {
            command,
            corrections,
            point,
            seconds,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::domain::AxisRange;
    use crate::io::header;
    use crate::scan::output::DEFAULT_MARKER;

    /// In-process stand-in for the solver binary.
    struct StubSolver<F: Fn(&str, Corrections) -> Result<String, SolverFailure>> {
        respond: F,
        calls: RefCell<Vec<(String, Corrections)>>,
    }

    impl<F: Fn(&str, Corrections) -> Result<String, SolverFailure>> StubSolver<F> {
        fn new(respond: F) -> Self {
            Self {
                respond,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F: Fn(&str, Corrections) -> Result<String, SolverFailure>> Solver for StubSolver<F> {
        fn describe(&self) -> String {
            "stub".to_string()
        }

        fn run(&self, param_file: &Path, corrections: Corrections) -> Result<String, SolverFailure> {
            let params = std::fs::read_to_string(param_file).unwrap();
            self.calls.borrow_mut().push((params.clone(), corrections));
            (self.respond)(&params, corrections)
        }
    }

    fn config(dir: &Path, layout: ScanLayout, mass: AxisRange, delta: AxisRange) -> ScanConfig {
        ScanConfig {
            layout,
            mass,
            delta,
            solver: vec!["stub".to_string()],
            param_file: dir.join("input_micromegas.par"),
            output: dir.join(layout.default_output()),
            marker: DEFAULT_MARKER.to_string(),
            timeout: None,
            on_error: FailurePolicy::Fail,
            resume: false,
            summary: None,
        }
    }

    fn data_rows(path: &Path) -> Vec<Vec<String>> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn single_point_scan_writes_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), ScanLayout::Mass, AxisRange::single(100.0), AxisRange::single(0.0));
        let solver = StubSolver::new(|_, _| Ok("some banner\nomega_h^2 = 0.1200\n".to_string()));

        let summary = run_scan(&cfg, &solver).unwrap();
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.points_total, 1);

        let text = std::fs::read_to_string(&cfg.output).unwrap();
        assert_eq!(text.lines().next().unwrap(), header(ScanLayout::Mass));
        let rows = data_rows(&cfg.output);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row[0], row[1]);
        assert_eq!(row[0], "100.0000");
        for omega in &row[3..7] {
            assert_eq!(omega.parse::<f64>().unwrap(), 0.12);
        }
    }

    #[test]
    fn solver_runs_once_per_correction_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), ScanLayout::Mass, AxisRange::single(250.0), AxisRange::single(0.0));
        let solver = StubSolver::new(|_, c| {
            let v = match c {
                Corrections::Baseline => 0.1,
                Corrections::Sommerfeld => 0.2,
                Corrections::BoundState => 0.3,
                Corrections::Both => 0.4,
            };
            Ok(format!("omega_h^2 = {v}\n"))
        });

        run_scan(&cfg, &solver).unwrap();

        let calls = solver.calls.borrow();
        let order: Vec<Corrections> = calls.iter().map(|(_, c)| *c).collect();
        assert_eq!(order, Corrections::ALL.to_vec());
        assert!(calls.iter().all(|(params, _)| params == "MDM 250.0\nMX 250.0"));

        let rows = data_rows(&cfg.output);
        assert_eq!(rows[0][3..7], ["1.0000e-01", "2.0000e-01", "3.0000e-01", "4.0000e-01"]);
    }

    #[test]
    fn missing_marker_fails_before_writing_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), ScanLayout::Mass, AxisRange::single(100.0), AxisRange::single(0.0));
        let solver = StubSolver::new(|_, _| Ok("Omega=0.12\n".to_string()));

        let err = run_scan(&cfg, &solver).unwrap_err();
        match &err {
            ScanError::MissingMarker { marker, corrections, point } => {
                assert_eq!(marker, DEFAULT_MARKER);
                assert_eq!(*corrections, Corrections::Baseline);
                assert_eq!(point.mass_dm, 100.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("mdm = 100.0000"));
        assert!(data_rows(&cfg.output).is_empty());
    }

    #[test]
    fn nonzero_exit_is_a_solver_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), ScanLayout::Mass, AxisRange::single(1.0), AxisRange::single(0.0));
        let solver = StubSolver::new(|_, _| {
            Err(SolverFailure::Exit {
                status: "exit status: 1".to_string(),
                stderr: "Can not open the file".to_string(),
            })
        });

        let err = run_scan(&cfg, &solver).unwrap_err();
        assert!(matches!(err, ScanError::SolverInvocation { .. }));
        assert!(err.to_string().contains("Can not open the file"));
    }

    #[test]
    fn skip_policy_continues_past_failing_points() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(
            dir.path(),
            ScanLayout::Mass,
            AxisRange::new(1.0, 51.0, 25.0),
            AxisRange::single(0.0),
        );
        cfg.on_error = FailurePolicy::Skip;
        let solver = StubSolver::new(|params, _| {
            if params.starts_with("MDM 26.0") {
                Ok("no result\n".to_string())
            } else {
                Ok("omega_h^2 = 1.0E-01\n".to_string())
            }
        });

        let summary = run_scan(&cfg, &solver).unwrap();
        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].point.mass_dm, 26.0);
        let rows = data_rows(&cfg.output);
        assert_eq!(rows[0][0], "1.0000");
        assert_eq!(rows[1][0], "51.0000");
    }

    #[test]
    fn skip_policy_does_not_hide_spawn_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), ScanLayout::Mass, AxisRange::single(1.0), AxisRange::single(0.0));
        cfg.on_error = FailurePolicy::Skip;
        let solver = StubSolver::new(|_, _| {
            Err(SolverFailure::Spawn(std::io::Error::from(std::io::ErrorKind::NotFound)))
        });

        assert!(matches!(
            run_scan(&cfg, &solver),
            Err(ScanError::SolverSpawn { .. })
        ));
    }

    #[test]
    fn two_dimensional_scan_uses_delta_first_columns() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(
            dir.path(),
            ScanLayout::MassDelta,
            AxisRange::single(100.0),
            AxisRange::new(0.0, 0.01, 0.005),
        );
        let solver = StubSolver::new(|_, _| Ok("omega_h^2 = 0.1\n".to_string()));

        run_scan(&cfg, &solver).unwrap();
        let rows = data_rows(&cfg.output);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0..3], ["0.0050", "100.0000", "100.5000"]);
    }

    #[test]
    fn resume_skips_points_already_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(
            dir.path(),
            ScanLayout::Mass,
            AxisRange::new(1.0, 51.0, 25.0),
            AxisRange::single(0.0),
        );
        let first = StubSolver::new(|params, _| {
            if params.starts_with("MDM 51.0") {
                Ok(String::new())
            } else {
                Ok("omega_h^2 = 0.1\n".to_string())
            }
        });
        assert!(run_scan(&cfg, &first).is_err());
        assert_eq!(data_rows(&cfg.output).len(), 2);

        cfg.resume = true;
        let second = StubSolver::new(|_, _| Ok("omega_h^2 = 0.1\n".to_string()));
        let summary = run_scan(&cfg, &second).unwrap();
        assert_eq!(summary.resumed, 2);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(second.calls.borrow().len(), 4);

        let text = std::fs::read_to_string(&cfg.output).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("mass_dm")).count(), 1);
        assert_eq!(data_rows(&cfg.output).len(), 3);
    }
}
