//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive prompts and log lines with automatic
//! fallback to plain output in CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use slicebuild::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Looking up slice releases...");
//! // ... do work ...
//! spinner.stop("Found release 1.2");
//!
//! if ui::confirm(&ctx, "Replace slices-1.2?", true).await? {
//!     ui::step_ok(&ctx, "Slices installed");
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, remark, step_error, step_info, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::{BuildProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::init_theme;
