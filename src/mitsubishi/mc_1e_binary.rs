// ! 三菱 MC协议 1E帧 二进制

use super::mc::{self, Exchange, McAddress, McProtocol, McVersion};
use crate::prelude::*;

/// 请求头部长度，写入数据从此处开始
pub const REQUEST_HEADER_LEN: usize = 12;

/// 应答头部长度：副标题 + 结束代码
pub const RESPONSE_HEADER_LEN: usize = 2;

/// 副标题
#[allow(unused)]
pub mod cmd {
    /// 批量读取_位
    pub const READ_BIT: u8 = 0x00;

    /// 批量读取_字
    pub const READ_WORD: u8 = 0x01;

    /// 批量写入_位
    pub const WRITE_BIT: u8 = 0x02;

    /// 批量写入_字
    pub const WRITE_WORD: u8 = 0x03;
}

/// 三菱 MC协议 1E帧 二进制格式
#[derive(Debug, Clone, Copy, Default)]
pub struct Mc1eBinary;

impl McProtocol for Mc1eBinary {
    fn version(&self) -> McVersion {
        McVersion::A1e
    }

    fn build_read_frame(
        &self,
        address: &McAddress,
        len: u16,
        data_type: &DataType,
    ) -> Result<Vec<u8>, PlcError> {
        let count = mc::point_count(len as usize, data_type)?;
        let command = match data_type {
            DataType::Bit => cmd::READ_BIT,
            DataType::Word => cmd::READ_WORD,
        };
        create_buf(address, command, count, &[])
    }

    fn build_write_frame(
        &self,
        address: &McAddress,
        datas: &[u8],
        data_type: &DataType,
    ) -> Result<Vec<u8>, PlcError> {
        let count = mc::point_count(datas.len(), data_type)?;
        let command = match data_type {
            DataType::Bit => cmd::WRITE_BIT,
            DataType::Word => cmd::WRITE_WORD,
        };
        create_buf(address, command, count, datas)
    }

    fn parse_response<'a>(&self, buf: &'a [u8]) -> Result<&'a [u8], PlcError> {
        if buf.len() < RESPONSE_HEADER_LEN {
            return Err(PlcError::Protocol(format!(
                "应答头部不完整\tlen={}",
                buf.len()
            )));
        }
        Ok(&buf[RESPONSE_HEADER_LEN..])
    }

    fn exchange(&self) -> Exchange {
        Exchange::Single
    }
}

/// 创建mc指令，读取时`datas`为空
fn create_buf(
    address: &McAddress,
    command: u8,
    count: u16,
    datas: &[u8],
) -> Result<Vec<u8>, PlcError> {
    address.ensure_version(McVersion::A1e)?;
    let code = match address.component_code() {
        [high, low] => [*low, *high],
        other => {
            return Err(PlcError::Protocol(format!(
                "1E帧软元件代码必须为2个字节\t{:02X?}",
                other
            )))
        }
    };
    let mut buf = Vec::with_capacity(REQUEST_HEADER_LEN + datas.len());
    buf.push(command); // 副标题
    buf.push(0xFF); // PLC编号：0xFF
    buf.push(0x0A); // CPU监视定时器：0x0A 0x00
    buf.push(0x00);
    // 起始软元件(低16位，低字节在前)，高位固定为0
    let begin = address.get_address() as u16;
    buf.extend(begin.to_le_bytes());
    buf.push(0x00);
    buf.push(0x00);
    // 软元件代码，低字节在前
    buf.extend(code);
    // 软元件点数(2位，低字节在前)
    buf.extend(count.to_le_bytes());
    buf.extend_from_slice(datas);
    Ok(buf)
}
