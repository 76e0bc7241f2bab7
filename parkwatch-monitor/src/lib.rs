pub mod activation;
pub mod cycle;
pub mod report;
pub mod scheduler;

pub use activation::{ActivationPolicy, MonitorGuard};
pub use cycle::ReconciliationCycle;
pub use report::{CycleReport, PassOutcome};
pub use scheduler::{MonitorScheduler, MonitorSettings, MonitorState, DEFAULT_PERIOD};
