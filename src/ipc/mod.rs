//! JSON IPC surface: protocol types and the session loop that serves them.

pub mod protocol;
pub mod session;

pub use protocol::{IpcCommand, IpcEvent};
pub use session::{Session, SessionDeps};
