//! Permission system for hosted web content
//!
//! Decides whether an origin may use a browser capability (notifications,
//! geolocation, ...). Decisions are remembered per (origin, capability) in a
//! JSON file; configured trusted origins bypass them.

mod manager;
mod mediator;
pub mod origin;
pub mod storage;

pub use manager::PermissionManager;
pub use mediator::{
    PermissionMediator, PermissionPrompt, PermissionRequest, PromptAnswer, Verdict, VerdictSource,
};
pub use origin::extract_origin;
pub use storage::{PermissionDecision, PermissionTable};
