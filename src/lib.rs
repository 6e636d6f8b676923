//! Salary summary viewer: average, min and max salary per department as an
//! interactive chart, a summary table and optional simulated distributions.
//!
//! The same report pass ([`report::build_report`]) feeds the egui window, the
//! headless HTTP server and the `export` command.

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod format;
pub mod report;
pub mod secrets;
pub mod server;
pub mod state;
pub mod ui;
