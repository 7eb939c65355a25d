pub mod notifier;
pub mod permission;
pub mod scheduler;
pub mod worker;

pub use permission::{answer_prompt, request_permission, PermissionOutcome};
pub use scheduler::Scheduler;
pub use worker::Worker;
