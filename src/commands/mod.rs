//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod dashboard;
pub mod init;
pub mod output;
pub mod score;
pub mod validate;

pub use dashboard::{execute_dashboard, DashboardOptions};
pub use init::{execute_init, InitOptions};
pub use output::{gauge_bar, render_details, render_header, render_prediction, render_report};
pub use score::{execute_score, parse_fill, ScoreOptions};
pub use validate::{execute_validate, ValidateOptions};
