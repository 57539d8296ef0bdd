//! CLI command implementations

pub mod completions;
pub mod config;
pub mod fetch;
pub mod find;
pub mod make;

pub use completions::execute as completions;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use find::execute as find;
pub use make::execute as make;
pub use test::execute as test;
