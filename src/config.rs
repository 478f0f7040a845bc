//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Command-line flags always win.

use std::path::PathBuf;

use crate::error::{AppError, EXIT_INVALID_INPUT};

/// Path of the JSON coefficient table.
pub const ENV_XSEC_TABLE: &str = "RELIC_XSEC_TABLE";
/// Solver command line, split on whitespace.
pub const ENV_SOLVER: &str = "RELIC_SOLVER";
/// Log filter directives for `tracing-subscriber`.
pub const ENV_LOG: &str = "RELIC_LOG";

pub const DEFAULT_SOLVER: &str = "./main";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub xsec_table: Option<PathBuf>,
    pub solver: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            xsec_table: non_empty(ENV_XSEC_TABLE).map(PathBuf::from),
            solver: non_empty(ENV_SOLVER),
        }
    }

    /// Coefficient table path: flag, then environment.
    pub fn table_path(&self, flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
        flag.or_else(|| self.xsec_table.clone()).ok_or_else(|| {
            AppError::new(
                EXIT_INVALID_INPUT,
                format!("No coefficient table given. Pass --table or set {ENV_XSEC_TABLE} (.env)."),
            )
        })
    }

    /// Solver command: flag, then environment, then `./main`.
    pub fn solver_command(&self, flag: Option<&str>) -> Vec<String> {
        let raw = flag
            .map(str::to_string)
            .or_else(|| self.solver.clone())
            .unwrap_or_else(|| DEFAULT_SOLVER.to_string());
        raw.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn flag_beats_environment() {
        let s = settings(&[(ENV_XSEC_TABLE, "env.json")]);
        assert_eq!(
            s.table_path(Some(PathBuf::from("flag.json"))).unwrap(),
            PathBuf::from("flag.json")
        );
        assert_eq!(s.table_path(None).unwrap(), PathBuf::from("env.json"));
    }

    #[test]
    fn missing_table_is_invalid_input() {
        let err = settings(&[]).table_path(None).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
        assert!(err.to_string().contains(ENV_XSEC_TABLE));
    }

    #[test]
    fn solver_defaults_to_main_in_working_directory() {
        assert_eq!(settings(&[]).solver_command(None), vec!["./main"]);
        let s = settings(&[(ENV_SOLVER, "  mpirun -n 1 ./main ")]);
        assert_eq!(s.solver_command(None), vec!["mpirun", "-n", "1", "./main"]);
        assert_eq!(s.solver_command(Some("./other")), vec!["./other"]);
    }

    #[test]
    fn blank_variables_are_ignored() {
        assert_eq!(settings(&[(ENV_SOLVER, "   ")]), Settings::default());
    }
}
