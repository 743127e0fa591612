mod address;
mod conn;
pub mod session;

pub use address::IAddress;
pub use conn::{Network, DEFAULT_TIMEOUT};
pub use session::{LengthPrefix, Session, SessionState};
