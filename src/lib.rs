//! Permission gate for web content hosted in a desktop shell
//!
//! Remembers whether each web origin may use a browser capability such as
//! notifications or geolocation, with a configured set of trusted origins
//! that are always granted.
//!
//! ```ignore
//! use permission_gate::permissions::{PermissionManager, PermissionMediator};
//! use permission_gate::cli::Console;
//!
//! let mut manager = PermissionManager::new("permission.json", ["https://chat.example.com"]);
//! let mediator = PermissionMediator::new(Console::new());
//!
//! let verdict = mediator.handle_url(&mut manager, "https://other.example/page", "notifications")?;
//! if verdict.is_granted() {
//!     // let the page show notifications
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod permissions;

pub use crate::config::GateConfig;
pub use crate::core::{GateError, GateResult};
pub use crate::permissions::{PermissionDecision, PermissionManager};
