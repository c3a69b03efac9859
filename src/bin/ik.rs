#![allow(non_snake_case)]
use RustedAlgex::Utils::logger::init_logger;
use RustedAlgex::symbolic::kinematics::{
    Isolated, pose_equations, six_axis_arm, solve, split_up, target_pose,
};
use clap::Parser;
use log::debug;
use std::process;

/// Reduces the equations relating a pose of a six axis arm to its joint angles
#[derive(Parser, Debug)]
#[command(name = "ik", version, about)]
struct Cli {
    /// log every equation and each elimination step
    #[arg(long)]
    debug: bool,
}

fn run() -> Result<(), String> {
    let arm = six_axis_arm().map_err(|e| e.to_string())?;
    let (r, b) = target_pose().map_err(|e| e.to_string())?;
    println!("r = {}", r);
    println!("b = {}", b);
    for (i, joint) in arm.iter().enumerate() {
        println!("a[{}] = {}, {}", i, joint.rotation, joint.offset);
    }

    let eqs = pose_equations(&arm, &r, &b).map_err(|e| e.to_string())?;
    let mut rollers: Vec<Isolated> = Vec::with_capacity(eqs.len());
    for (e, refs) in &eqs {
        debug!("{} = 0 : {}", e, refs.join(","));
        rollers.push(split_up(e).map_err(|err| format!("{}: {}", e, err))?);
    }
    for line in solve("", rollers).map_err(|e| e.to_string())? {
        println!("{}", line);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.debug { "debug" } else { "warn" };
    if let Err(e) = init_logger(level, false) {
        eprintln!("{}", e);
        process::exit(1);
    }
    if let Err(msg) = run() {
        eprintln!("{}", msg);
        process::exit(1);
    }
}
