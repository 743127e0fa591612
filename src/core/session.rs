// ! PLC 通讯会话，独占一个TCP连接，保证同一时间只有一次 请求-应答 交互

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{event, Level};

use super::conn::Network;
use crate::prelude::*;

/// 单次读取应答时的缓冲区大小
const MAX_RESPONSE: usize = 1024;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// 带长度字段的应答格式：固定长度的头部，头部中有一个2字节（大端）的数据长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPrefix {
    /// 头部长度
    pub header_len: usize,
    /// 长度字段在头部中的位置
    pub len_offset: usize,
}

impl LengthPrefix {
    /// 头部之后还需要读取的字节数
    pub fn body_len(&self, header: &[u8]) -> usize {
        match header.get(self.len_offset..self.len_offset + 2) {
            Some(len) => u16::from_be_bytes([len[0], len[1]]) as usize,
            None => 0,
        }
    }
}

/// 一次交互的失败位置，写入失败的请求不能重发
enum Failure {
    Write(PlcError),
    Read(PlcError),
}

impl Failure {
    fn into_inner(self) -> PlcError {
        match self {
            Failure::Write(err) | Failure::Read(err) => err,
        }
    }
}

/// PLC 通讯会话
pub struct Session {
    /// 连接参数
    network: Network,
    /// 连接超时时间，为0时不限制
    timeout: Duration,
    /// 客户端连接
    client: Mutex<Option<TcpStream>>,
    /// 连接状态（不需要加锁即可查询）
    connected: AtomicBool,
}

impl Session {
    pub fn new(network: Network, timeout: Duration) -> Self {
        Session {
            network,
            timeout,
            client: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// 连接参数
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// 当前会话状态
    pub fn state(&self) -> SessionState {
        if self.connected.load(Ordering::Acquire) {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// 连接PLC，已有的连接会先关闭
    pub async fn connect(&self) -> PlcResult {
        let mut client = self.client.lock().await;
        self.open(&mut client).await
    }

    /// 断开PLC连接
    pub async fn close(&self) -> PlcResult {
        let mut client = self.client.lock().await;
        if let Some(mut tcp) = client.take() {
            event!(Level::INFO, "断开PLC连接\t{}", self.network);
            let _ = tcp.shutdown().await;
        }
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    /// 单次交互：必须已经连接，发送一次、读取一次，不会自动重连
    pub async fn send_single(&self, frame: &[u8]) -> Result<Vec<u8>, PlcError> {
        let mut client = self.client.lock().await;
        let stream = client.as_mut().ok_or(PlcError::NotConnect)?;
        event!(Level::DEBUG, "发送数据\t{:02X?}", frame);
        if let Err(err) = stream.write_all(frame).await {
            self.forget(&mut client);
            return Err(err.into());
        }
        let mut buf = vec![0u8; MAX_RESPONSE];
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                self.forget(&mut client);
                return Err(PlcError::Connection("连接已被PLC关闭".into()));
            }
            Ok(n) => n,
            Err(err) => {
                self.forget(&mut client);
                return Err(err.into());
            }
        };
        buf.truncate(n);
        event!(Level::DEBUG, "接收数据\tlen={}\t{:02X?}", n, buf);
        Ok(buf)
    }

    /// 可靠交互：未连接时先重连一次；读取应答失败时重连并完整重发一次，之后不再重试
    pub async fn send_reliable(
        &self,
        frame: &[u8],
        prefix: LengthPrefix,
    ) -> Result<Vec<u8>, PlcError> {
        let mut client = self.client.lock().await;
        if client.is_none() {
            event!(Level::WARN, "PLC未连接,尝试重新连接\t{}", self.network);
            self.open(&mut client).await?;
        }
        match self.round_trip(&mut client, frame, prefix).await {
            Ok(buf) => Ok(buf),
            Err(Failure::Write(err)) => Err(err),
            Err(Failure::Read(err)) => {
                event!(Level::WARN, "读取应答失败,重新连接后重试\terr={}", err);
                self.open(&mut client).await?;
                self.round_trip(&mut client, frame, prefix)
                    .await
                    .map_err(Failure::into_inner)
            }
        }
    }

    async fn open(&self, client: &mut Option<TcpStream>) -> PlcResult {
        if let Some(mut old) = client.take() {
            let _ = old.shutdown().await;
        }
        self.connected.store(false, Ordering::Release);
        let addr = self.network.socket_addr();
        let r = match connect_within(self.timeout, TcpStream::connect(addr.as_str())).await {
            Ok(r) => r,
            Err(err) => {
                event!(Level::ERROR, "\t连接超时\t{}", addr);
                return Err(err);
            }
        };
        let stream = match r {
            Ok(stream) => stream,
            Err(err) => {
                let err = format!("连接错误\t{}\t{}", addr, err);
                event!(Level::ERROR, "\t{}", &err);
                return Err(PlcError::Connection(err));
            }
        };
        let _ = stream.set_nodelay(true);
        event!(Level::INFO, "已连接PLC\t{}", addr);
        *client = Some(stream);
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    /// 发送请求并读取一个完整的带长度应答
    async fn round_trip(
        &self,
        client: &mut Option<TcpStream>,
        frame: &[u8],
        prefix: LengthPrefix,
    ) -> Result<Vec<u8>, Failure> {
        let stream = client
            .as_mut()
            .ok_or(Failure::Write(PlcError::NotConnect))?;
        event!(Level::DEBUG, "发送数据\t{:02X?}", frame);
        if let Err(err) = stream.write_all(frame).await {
            self.forget(client);
            return Err(Failure::Write(err.into()));
        }
        let mut buf = vec![0u8; prefix.header_len];
        if let Err(err) = stream.read_exact(&mut buf).await {
            self.forget(client);
            return Err(Failure::Read(err.into()));
        }
        let body_len = prefix.body_len(&buf);
        buf.resize(prefix.header_len + body_len, 0);
        if let Err(err) = stream.read_exact(&mut buf[prefix.header_len..]).await {
            self.forget(client);
            return Err(Failure::Read(err.into()));
        }
        event!(Level::DEBUG, "接收数据\tlen={}\t{:02X?}", buf.len(), buf);
        Ok(buf)
    }

    /// 连接已不可用，丢弃
    fn forget(&self, client: &mut Option<TcpStream>) {
        *client = None;
        self.connected.store(false, Ordering::Release);
    }
}

/// 在 `limit` 时间内完成连接，`limit` 为0时不限制
async fn connect_within<T, F>(limit: Duration, dial: F) -> Result<io::Result<T>, PlcError>
where
    F: Future<Output = io::Result<T>>,
{
    if limit.is_zero() {
        return Ok(dial.await);
    }
    Ok(timeout(limit, dial).await?)
}
