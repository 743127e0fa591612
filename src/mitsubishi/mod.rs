// ! 三菱PLC

mod client;
mod mc;
mod mc_1e_binary;
mod mc_3e_binary;
mod value;

pub use self::client::McClient;
pub use self::mc::{
    payload_len, Component, Exchange, McAddress, McProtocol, McVersion, Radix,
    A_1E_COMPONENTS, QNA_3E_COMPONENTS,
};
pub use self::mc_1e_binary::Mc1eBinary;
pub use self::mc_3e_binary::Mc3eBinary;
pub use self::value::{McScalar, McValue, ValueKind, BIT_ON};

use crate::core::Network;
use std::time::Duration;

/// 创建一个 三菱 网口PLC (MC协议 二进制)
pub fn new_mc_binary_tcp_plc(version: McVersion, conn: Network, timeout: Duration) -> McClient {
    McClient::new(version, conn, timeout)
}
