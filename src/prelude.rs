pub use crate::core::{IAddress, Network, SessionState, DEFAULT_TIMEOUT};
pub use crate::error::{PlcError, PlcResult};
pub use crate::mitsubishi::{McClient, McValue, McVersion, ValueKind};
pub use crate::{DataType, IPlc};
