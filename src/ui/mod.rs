//! Ratatui front-end for the DDT ledger: one table screen with modal modes
//! for the record form and the clear-all confirmation.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
