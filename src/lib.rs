//! 三菱 MELSEC MC协议(二进制)客户端
//!
//! 支持 A系列兼容1E帧 和 QnA系列兼容3E帧，按位/按字批量读写软元件。
//!
//! ```no_run
//! use mc_plc::prelude::*;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), PlcError> {
//! let plc = McClient::new(
//!     McVersion::Qna3e,
//!     Network::new("192.168.1.100", 6001),
//!     Duration::from_millis(300),
//! );
//! plc.connect().await?;
//! let on = plc.read_bool("M100").await?;
//! plc.write_value("M200", !on).await?;
//! plc.write_value("D204", -134.2f32).await?;
//! let speed = plc.read_f32("D204").await?;
//! # let _ = speed;
//! plc.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! 日志通过 `tracing` 输出，由使用方安装 subscriber。

mod core;
mod error;
pub mod mitsubishi;
pub mod prelude;

pub use crate::core::{LengthPrefix, Session};
use prelude::*;
use std::future::Future;

/// ! 通用接口，所有PLC必须实现此接口
pub trait IPlc {
    /// 连接PLC，已有的连接会先断开
    fn connect(&self) -> impl Future<Output = PlcResult> + Send;
    /// 断开PLC连接
    fn disconnect(&self) -> impl Future<Output = PlcResult> + Send;
    /// 读取PLC数据
    /// * `len` 按字读取时为字节数，按位读取时为点数
    fn read(
        &self,
        address_name: &str,
        data_type: DataType,
        len: u16,
    ) -> impl Future<Output = Result<Vec<u8>, PlcError>> + Send;
    /// 写入PLC数据
    fn write(
        &self,
        address_name: &str,
        data_type: DataType,
        datas: &[u8],
    ) -> impl Future<Output = PlcResult> + Send;
    /// 获取PLC连接状态
    fn is_connect(&self) -> bool;
}

/// PLC 数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 按位读写(线圈)
    Bit,
    /// 按字读写(寄存器)
    Word,
}
