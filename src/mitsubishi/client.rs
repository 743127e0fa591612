// ! 三菱 网口PLC MC协议 客户端

use std::time::Duration;
use tracing::{event, Level};

use super::mc::{Exchange, McProtocol, McVersion};
use super::mc_1e_binary::Mc1eBinary;
use super::mc_3e_binary::Mc3eBinary;
use super::value::{McScalar, McValue, ValueKind};
use crate::core::session::{Session, SessionState};
use crate::prelude::*;

/// 三菱 网口PLC MC协议 二进制
///
/// 协议版本在创建时确定。所有读写共用一个TCP连接，同一时间只有一个请求在交互，
/// 可以通过 `Arc` 在多个任务间共享。
pub struct McClient {
    /// 协议帧格式
    protocol: Box<dyn McProtocol>,
    /// 通讯会话
    session: Session,
}

impl McClient {
    /// 创建PLC实例
    /// * `version` 协议版本
    /// * `conn` 连接参数
    /// * `timeout` 连接超时时间，为0时不限制
    pub fn new(version: McVersion, conn: Network, timeout: Duration) -> Self {
        let protocol: Box<dyn McProtocol> = match version {
            McVersion::A1e => Box::new(Mc1eBinary),
            McVersion::Qna3e => Box::new(Mc3eBinary),
        };
        McClient {
            protocol,
            session: Session::new(conn, timeout),
        }
    }

    /// 协议版本
    pub fn version(&self) -> McVersion {
        self.protocol.version()
    }

    /// 连接参数
    pub fn network(&self) -> &Network {
        self.session.network()
    }

    /// 会话状态
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// 关闭连接，之后可以重新 `connect`
    pub async fn close(&self) -> PlcResult {
        self.session.close().await
    }

    pub async fn read_bool(&self, address_name: &str) -> Result<bool, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_i16(&self, address_name: &str) -> Result<i16, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_u16(&self, address_name: &str) -> Result<u16, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_i32(&self, address_name: &str) -> Result<i32, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_u32(&self, address_name: &str) -> Result<u32, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_i64(&self, address_name: &str) -> Result<i64, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_u64(&self, address_name: &str) -> Result<u64, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_f32(&self, address_name: &str) -> Result<f32, PlcError> {
        self.read_value(address_name).await
    }

    pub async fn read_f64(&self, address_name: &str) -> Result<f64, PlcError> {
        self.read_value(address_name).await
    }

    /// 按返回值的类型读取
    ///
    /// ```ignore
    /// let speed: f32 = plc.read_value("D100").await?;
    /// ```
    pub async fn read_value<T: McScalar>(&self, address_name: &str) -> Result<T, PlcError> {
        let datas = self
            .read_bytes(address_name, T::KIND.byte_len(), T::KIND.data_type())
            .await?;
        T::decode(&datas)
    }

    /// 按运行时指定的类型读取
    pub async fn read_value_kind(
        &self,
        address_name: &str,
        kind: ValueKind,
    ) -> Result<McValue, PlcError> {
        let datas = self
            .read_bytes(address_name, kind.byte_len(), kind.data_type())
            .await?;
        kind.decode(&datas)
    }

    /// 写入一个值，bool 按位写入，其他类型按字写入
    pub async fn write_value(
        &self,
        address_name: &str,
        value: impl Into<McValue>,
    ) -> PlcResult {
        let value = value.into();
        event!(Level::DEBUG, "写入\t{}={}\t{}", address_name, value, value.kind());
        self.write_bytes(address_name, &value.encode(), value.kind().data_type())
            .await
    }

    async fn read_bytes(
        &self,
        address_name: &str,
        len: u16,
        data_type: DataType,
    ) -> Result<Vec<u8>, PlcError> {
        // 地址解析
        let address = self.protocol.resolve_address(address_name)?;
        // 创建读取PLC数据buffer
        let buf = self.protocol.build_read_frame(&address, len, &data_type)?;
        let reply = self.exchange(&buf).await?;
        let datas = self
            .protocol
            .parse_read_response(&reply, len, &data_type)?;
        Ok(datas.to_vec())
    }

    async fn write_bytes(&self, address_name: &str, datas: &[u8], data_type: DataType) -> PlcResult {
        let address = self.protocol.resolve_address(address_name)?;
        // 创建写入PLC数据buffer
        let buf = self
            .protocol
            .build_write_frame(&address, datas, &data_type)?;
        let reply = self.exchange(&buf).await?;
        self.protocol.parse_response(&reply)?;
        Ok(())
    }

    async fn exchange(&self, buf: &[u8]) -> Result<Vec<u8>, PlcError> {
        let r = match self.protocol.exchange() {
            Exchange::Single => self.session.send_single(buf).await,
            Exchange::Reliable(prefix) => self.session.send_reliable(buf, prefix).await,
        };
        if let Err(err) = &r {
            event!(Level::ERROR, "\t通讯失败\t{}\t{}", self.session.network(), err);
        }
        r
    }
}

impl IPlc for McClient {
    async fn connect(&self) -> PlcResult {
        self.session.connect().await
    }

    async fn disconnect(&self) -> PlcResult {
        self.close().await
    }

    async fn read(
        &self,
        address_name: &str,
        data_type: DataType,
        len: u16,
    ) -> Result<Vec<u8>, PlcError> {
        self.read_bytes(address_name, len, data_type).await
    }

    async fn write(&self, address_name: &str, data_type: DataType, datas: &[u8]) -> PlcResult {
        self.write_bytes(address_name, datas, data_type).await
    }

    fn is_connect(&self) -> bool {
        self.session.state() == SessionState::Connected
    }
}
