//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and environment settings
//! - sets up logging
//! - runs the cross-section lookup or a grid scan
//! - prints reports and writes optional summaries

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{
    AlphaSArgs, Command, IdentifyArgs, ScanCommonArgs, ScanGridArgs, ScanMassArgs, TableCheckArgs,
    TableTemplateArgs, XsecArgs,
};
use crate::config::Settings;
use crate::domain::{AxisRange, PhysicalParams, Process, Representation, ScanConfig, ScanLayout};
use crate::error::{AppError, EXIT_INVALID_INPUT, XsecError};
use crate::physics::ParticleCode;
use crate::scan::{ProcessSolver, run_scan};
use crate::xsec::{CoefficientTable, compute_cross_section, table_template};

pub mod logging;

/// Entry point for the `relic` binary.
pub fn run() -> Result<(), AppError> {
    // `relic -p sstoqq -r 3 -v ...` keeps working without naming the `xsec`
    // subcommand; see `rewrite_args`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::from_env();
    logging::init_logging(cli.quiet);
    debug!(?settings, "loaded settings");

    match cli.command {
        Command::Xsec(args) => handle_xsec(args, &settings),
        Command::ScanMass(args) => handle_scan_mass(args, &settings),
        Command::ScanGrid(args) => handle_scan_grid(args, &settings),
        Command::AlphaS(args) => handle_alpha_s(args),
        Command::Identify(args) => handle_identify(args),
        Command::TableTemplate(args) => handle_table_template(args),
        Command::TableCheck(args) => handle_table_check(args),
    }
}

fn handle_xsec(args: XsecArgs, settings: &Settings) -> Result<(), AppError> {
    // Reject bad names before touching the table so they always exit with code 2.
    let process: Process = args.process.parse()?;
    let rep = Representation::try_from(args.rep)?;

    let &[mass, velocity, alpha_s, alpha_sommerfeld] = args.vars.as_slice() else {
        return Err(AppError::new(
            EXIT_INVALID_INPUT,
            "--vars takes exactly four values: m, v, alpha_s, alpha_sommerfeld.",
        ));
    };
    let params = PhysicalParams {
        mass,
        velocity,
        alpha_s,
        alpha_sommerfeld,
    };

    let table = CoefficientTable::load(&settings.table_path(args.table)?)?;
    let value = compute_cross_section(
        &table,
        &args.process,
        args.rep,
        args.lwave,
        args.sommerfeld,
        &params,
    )?;

    if args.extended {
        println!(
            "{}",
            crate::report::format_xsec_extended(process, rep, &params, args.lwave, args.sommerfeld, value)
        );
    } else {
        println!("{}", crate::report::format_xsec(value));
    }
    Ok(())
}

fn handle_scan_mass(args: ScanMassArgs, settings: &Settings) -> Result<(), AppError> {
    let mass = AxisRange::new(args.mass.mass_min, args.mass.mass_max, args.mass.mass_step);
    let config = scan_config(ScanLayout::Mass, mass, AxisRange::single(args.delta), &args.common, settings);
    run_scan_command(&config)
}

fn handle_scan_grid(args: ScanGridArgs, settings: &Settings) -> Result<(), AppError> {
    let mass = AxisRange::new(args.mass.mass_min, args.mass.mass_max, args.mass.mass_step);
    let delta = AxisRange::new(args.delta_min, args.delta_max, args.delta_step);
    let config = scan_config(ScanLayout::MassDelta, mass, delta, &args.common, settings);
    run_scan_command(&config)
}

pub fn scan_config(
    layout: ScanLayout,
    mass: AxisRange,
    delta: AxisRange,
    common: &ScanCommonArgs,
    settings: &Settings,
) -> ScanConfig {
    ScanConfig {
        layout,
        mass,
        delta,
        solver: settings.solver_command(common.solver.as_deref()),
        param_file: common.param_file.clone(),
        output: common
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(layout.default_output())),
        marker: common.marker.clone(),
        timeout: common.timeout_secs.map(Duration::from_secs),
        on_error: common.on_error,
        resume: common.resume,
        summary: common.summary.clone(),
    }
}

fn run_scan_command(config: &ScanConfig) -> Result<(), AppError> {
    let solver = ProcessSolver::new(&config.solver, config.timeout)?;
    let summary = run_scan(config, &solver)?;

    println!("{}", crate::report::format_scan_summary(&summary));

    if let Some(path) = &config.summary {
        crate::io::write_summary_json(path, &summary)?;
        info!(path = %path.display(), "wrote scan summary");
    }
    Ok(())
}

fn handle_alpha_s(args: AlphaSArgs) -> Result<(), AppError> {
    if let Some(q) = args.scales.iter().find(|q| !q.is_finite()) {
        return Err(AppError::new(EXIT_INVALID_INPUT, format!("Scale {q} is not a finite number.")));
    }
    print!("{}", crate::report::format_alpha_table(&args.scales));
    Ok(())
}

fn handle_identify(args: IdentifyArgs) -> Result<(), AppError> {
    let particle = ParticleCode(args.code).decode()?;
    print!("{}", crate::report::format_identify(&particle));
    Ok(())
}

fn handle_table_template(args: TableTemplateArgs) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&table_template()).map_err(XsecError::from)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json + "\n").map_err(|e| {
                AppError::new(
                    EXIT_INVALID_INPUT,
                    format!("Failed to write table template '{}': {e}", path.display()),
                )
            })?;
            info!(path = %path.display(), "wrote coefficient table template");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_table_check(args: TableCheckArgs) -> Result<(), AppError> {
    let table = CoefficientTable::load(&args.path)?;
    let entries = table.to_file().entries;
    let zero_keys = entries
        .iter()
        .filter(|e| e.waves.iter().all(|w| *w == 0.0))
        .count();
    println!(
        "Coefficient table OK: {} ({} entries, {} all-zero)",
        args.path.display(),
        entries.len(),
        zero_keys
    );
    Ok(())
}

/// Rewrite argv so a bare flag list runs the `xsec` subcommand.
///
/// Rules:
/// - `relic -p sstoqq -r 3 ...`    -> `relic xsec -p sstoqq -r 3 ...`
/// - `relic -q -p sstoqq ...`      -> `relic -q xsec -p sstoqq ...`
/// - `relic --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Skip leading global flags.
    let pos = argv
        .iter()
        .skip(1)
        .position(|a| !matches!(a.as_str(), "-q" | "--quiet"))
        .map(|p| p + 1);
    let Some(pos) = pos else {
        return argv;
    };

    let arg = argv[pos].as_str();
    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "xsec flags".
    if arg.starts_with('-') {
        argv.insert(pos, "xsec".to_string());
    }
    argv
}
