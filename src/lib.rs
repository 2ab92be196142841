//! A language-agnostic debug adapter proxy: fronts an in-process debug
//! control API against external debuggers speaking the Debug Adapter
//! Protocol over stdio (see `SPEC_FULL.md` for the full design).

pub mod breakpoints;
pub mod capabilities;
pub mod child;
pub mod config;
pub mod driver;
pub mod error;
pub mod framing;
pub mod logging;
pub mod notifications;
pub mod protocol;
pub mod session;
pub mod trace;
pub mod transport;

pub use breakpoints::{BreakpointId, BreakpointInfo};
pub use config::ProxyConfig;
pub use driver::Driver;
pub use error::{Error, Result};
pub use notifications::Notification;
pub use session::{Action, Granularity, InspectRequest, RunOptions, Session, StackFrameInfo, StopState, Variable};
