//! Background work owned by the server process.

pub mod retention_sweeper;
pub mod visit_worker;

pub use retention_sweeper::{RetentionSweeper, SweeperConfig, sweep_once};
pub use visit_worker::{enqueue_visit, run_visit_worker};
