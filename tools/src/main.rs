//! bank-desk: terminal desk for synthetic banking analytics.
//!
//! Usage:
//!   bank-desk --seed 42 --export-dir ./exports
//!   bank-desk --config generator.json --log-file desk.log
//!   bank-desk --headless --seed 7 --export-dir ./out

mod shell;
mod ui;

use anyhow::Result;
use bankdesk_core::{
    analytics::AnalysisKind,
    clock::{Clock, SystemClock},
    config::GeneratorConfig,
    view_model::ViewModel,
};
use shell::Tab;
use std::env;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");
    let export_dir = flag_value(&args, "--export-dir").unwrap_or("./exports");
    let log_file = flag_value(&args, "--log-file").unwrap_or("bank-desk.log");

    init_logging(headless, log_file)?;

    let mut config = match flag_value(&args, "--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let vm = ViewModel::new(config, clock, export_dir);

    if headless {
        run_headless(vm)
    } else {
        shell::run(vm)
    }
}

/// Headless: stderr logging as usual. Interactive: the screen belongs to
/// the UI, so logging is off unless RUST_LOG asks for it, and then it
/// goes to a file.
fn init_logging(headless: bool, log_file: &str) -> Result<()> {
    if headless {
        env_logger::init();
    } else if env::var_os("RUST_LOG").is_some() {
        let file = File::create(log_file)?;
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
    Ok(())
}

/// Generate, analyse, run every algorithm, print, export, exit.
fn run_headless(mut vm: ViewModel) -> Result<()> {
    let cfg = vm.config();
    println!("bank-desk headless run");
    println!("  seed:        {}", cfg.seed);
    println!("  accounts:    {}", cfg.num_accounts);
    println!("  export dir:  {}", vm.export_root().display());
    println!();

    vm.generate_dataset()?;

    // Failures below are already in the System Log printed at the end.
    for kind in AnalysisKind::ALL {
        let _ = vm.run_analysis(kind);
    }
    let _ = vm.run_all_algorithms();
    wait_until_idle(&mut vm);

    for tab in Tab::ALL {
        if tab != Tab::SystemLog && tab.has_result(&vm) {
            println!("{}", tab.render(&vm));
        }
    }

    let _ = vm.export_all();
    wait_until_idle(&mut vm);

    println!("=== SYSTEM LOG ===");
    for entry in vm.log() {
        println!("  {entry}");
    }
    if let Some(dir) = vm.last_export() {
        println!();
        println!("Exported to {}", dir.display());
    }
    Ok(())
}

fn wait_until_idle(vm: &mut ViewModel) {
    while !vm.wait_idle(Duration::from_secs(1)) {}
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
