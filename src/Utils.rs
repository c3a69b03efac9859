//! different utility modules used throughout the project
/// settings of the calculator read from a TOML file
pub mod config;
/// logger initialisation (terminal and optional file)
pub mod logger;
/// interactive calculator: bindings, commands, scripts
pub mod session;
#[cfg(test)]
mod session_tests;
