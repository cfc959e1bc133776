// Run lifecycle records and their management

pub mod manager;
pub mod run;

pub use manager::RunManager;
pub use run::{ExportRun, ExportRunBuilder, RunStatus, RunUpdate};
