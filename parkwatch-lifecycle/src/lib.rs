pub mod actions;
pub mod camera;
pub mod commands;
pub mod dashboard;
pub mod input;
pub mod refresh;

pub use actions::{BookingExtension, LifecycleActions};
pub use camera::{CameraFeed, CameraView};
pub use commands::{DashboardCommands, Notice, NoticeKind};
pub use dashboard::{BookingCard, DashboardLoader, DashboardSnapshot};
pub use input::{Captured, InputCapture, ScriptedInput};
pub use refresh::{DataRefresh, RefreshReason};
