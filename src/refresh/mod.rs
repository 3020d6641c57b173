//! Index refresh: full rebuilds of the prefix index on a fixed schedule

mod pipeline;
mod scheduler;
mod status;

pub use pipeline::RefreshPipeline;
pub use scheduler::{run_refresh_loop, wait_for_store, RefreshSchedule};
pub use status::{BuildReport, IndexStatus};
