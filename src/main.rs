#![allow(non_snake_case)]
use RustedAlgex::Utils::config::{AlgexConfig, parse_level};
use RustedAlgex::Utils::logger::init_logger;
use RustedAlgex::Utils::session::{Flow, Session};
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;
use std::process;

/// Interactive exact algebra calculator
#[derive(Parser, Debug)]
#[command(name = "algex", version, about)]
struct Cli {
    /// algex script (.ax) to run before reading stdin
    #[arg(long)]
    file: Option<PathBuf>,
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// rounds of applying bindings to each result (1..=8)
    #[arg(long)]
    passes: Option<usize>,
    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
    /// also write the log to algex_log_<timestamp>.txt
    #[arg(long)]
    log_file: bool,
}

fn load_config(cli: &Cli) -> Result<AlgexConfig, String> {
    let mut config = match &cli.config {
        Some(path) => AlgexConfig::load(path).map_err(|e| format!("{:?}: {}", path, e))?,
        None => AlgexConfig::default(),
    };
    if let Some(passes) = cli.passes {
        config.session.passes = passes;
    }
    if let Some(level) = &cli.log_level {
        if parse_level(level).is_none() {
            return Err(format!("unknown log level {:?}", level));
        }
        config.logging.level = level.clone();
    }
    if cli.log_file {
        config.logging.file = true;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    };
    if let Err(e) = init_logger(&config.logging.level, config.logging.file) {
        eprintln!("{}", e);
        process::exit(1);
    }
    println!("Algex (exact symbolic algebra)\n");

    let mut session = Session::new(config.session.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(path) = &cli.file {
        if !path.exists() {
            eprintln!("unable to open {:?}", path);
            process::exit(1);
        }
        match session.run_file(path, &mut out) {
            Ok(Flow::Exit) => return,
            Ok(Flow::Continue) => {}
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
    let stdin = io::stdin();
    if let Err(e) = session.run(stdin.lock(), &mut out, true) {
        eprintln!("unable to recover: {}", e);
        process::exit(1);
    }
    info!("session ended");
}
