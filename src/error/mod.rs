use std::io;

use thiserror::Error;

/// PLC fn 结果
pub type PlcResult = Result<(), PlcError>;

/// PLC 通讯错误
#[derive(Debug, Error)]
pub enum PlcError {
    /// IO 错误，读写过程中连接被中断
    #[error("PLC IO错误:{0}")]
    Io(#[from] io::Error),
    /// 连接错误(Connection Error)
    #[error("PLC连接错误:{0}")]
    Connection(String),
    /// 连接超时
    #[error("PLC连接超时")]
    Timeout,
    /// 未连接(Not Connect)
    #[error("PLC未连接")]
    NotConnect,
    /// 协议错误(Protocol Error)，报文不完整或协议版本无效
    #[error("PLC协议错误:{0}")]
    Protocol(String),
    /// 地址错误(Address Error)
    #[error("PLC地址错误:{0}")]
    Addr(String),
    /// 不支持的数据类型
    #[error("PLC不支持的数据类型:{0}")]
    UnsupportedType(String),
    /// PLC返回数据为空
    #[error("PLC返回数据为空")]
    EmptyResponse,
    /// 参数错误(Parameter Error)
    #[error("PLC参数错误:{0}")]
    Param(String),
}

impl PlcError {
    /// 是否为连接类错误（拨号失败、超时、未连接、读写时连接断开）
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            PlcError::Io(_) | PlcError::Connection(_) | PlcError::Timeout | PlcError::NotConnect
        )
    }
}

/// 异步超时
impl From<tokio::time::error::Elapsed> for PlcError {
    fn from(_value: tokio::time::error::Elapsed) -> Self {
        PlcError::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_kinds() {
        assert!(PlcError::NotConnect.is_connection_error());
        assert!(PlcError::Timeout.is_connection_error());
        assert!(PlcError::Connection("refused".into()).is_connection_error());
        let io = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        assert!(PlcError::from(io).is_connection_error());
        assert!(!PlcError::EmptyResponse.is_connection_error());
        assert!(!PlcError::Addr("Q1".into()).is_connection_error());
    }

    #[test]
    fn display() {
        assert_eq!(PlcError::NotConnect.to_string(), "PLC未连接");
        assert_eq!(
            PlcError::Protocol("未知的协议版本".into()).to_string(),
            "PLC协议错误:未知的协议版本"
        );
    }
}
