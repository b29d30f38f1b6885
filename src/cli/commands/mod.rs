//! CLI command implementations

pub mod config;
pub mod invalidate;
pub mod run;
pub mod status;

pub use config::execute as config;
pub use invalidate::execute as invalidate;
pub use run::execute as run;
pub use status::execute as status;
