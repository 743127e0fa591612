// ! 三菱 MC协议 3E帧 二进制

use super::mc::{self, Exchange, McAddress, McProtocol, McVersion};
use crate::core::session::LengthPrefix;
use crate::prelude::*;

/// 应答头部长度：副标题(2) 网络号(1) PLC编号(1) IO编号(2) 站号(1) 数据长度(2)
pub const RESPONSE_HEADER_LEN: usize = 9;

/// 应答数据长度在头部中的位置
const RESPONSE_LEN_OFFSET: usize = 7;

/// 请求中数据长度字段之前的字节数
const REQUEST_LEN_START: usize = 9;

/// 请求头部长度，写入数据从此处开始
pub const REQUEST_HEADER_LEN: usize = 21;

/// 指令，前面的 0x01 是CPU监视定时器的最后一个字节
#[allow(unused)]
pub mod cmd {
    /// 批量读取_位
    pub const READ_BIT: [u8; 4] = [0x01, 0x04, 0x01, 0x00];

    /// 批量读取_字
    pub const READ_WORD: [u8; 4] = [0x01, 0x04, 0x00, 0x00];

    /// 批量写入_位
    pub const WRITE_BIT: [u8; 4] = [0x01, 0x14, 0x01, 0x00];

    /// 批量写入_字
    pub const WRITE_WORD: [u8; 4] = [0x01, 0x14, 0x00, 0x00];
}

/// 三菱 MC协议 3E帧 二进制格式
#[derive(Debug, Clone, Copy, Default)]
pub struct Mc3eBinary;

impl McProtocol for Mc3eBinary {
    fn version(&self) -> McVersion {
        McVersion::Qna3e
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
        // 按位写入时每个字节对应一个点，不减半
        let count = mc::point_count(datas.len(), data_type)?;
        let command = match data_type {
            DataType::Bit => cmd::WRITE_BIT,
            DataType::Word => cmd::WRITE_WORD,
        };
        create_buf(address, command, count, datas)
    }

    /// 返回头部之后声明长度的数据
    fn parse_response<'a>(&self, buf: &'a [u8]) -> Result<&'a [u8], PlcError> {
        if buf.len() < RESPONSE_HEADER_LEN {
            return Err(PlcError::Protocol(format!(
                "应答头部不完整\tlen={}",
                buf.len()
            )));
        }
        let len = RESPONSE_PREFIX.body_len(buf);
        let end = RESPONSE_HEADER_LEN + len;
        if buf.len() < end {
            return Err(PlcError::Protocol(format!(
                "应答数据不完整\t声明长度={}\t实际长度={}",
                len,
                buf.len() - RESPONSE_HEADER_LEN
            )));
        }
        Ok(&buf[RESPONSE_HEADER_LEN..end])
    }

    fn exchange(&self) -> Exchange {
        Exchange::Reliable(RESPONSE_PREFIX)
    }
}

const RESPONSE_PREFIX: LengthPrefix = LengthPrefix {
    header_len: RESPONSE_HEADER_LEN,
    len_offset: RESPONSE_LEN_OFFSET,
};

/// 创建mc指令，读取时`datas`为空
fn create_buf(
    address: &McAddress,
    command: [u8; 4],
    count: u16,
    datas: &[u8],
) -> Result<Vec<u8>, PlcError> {
    address.ensure_version(McVersion::Qna3e)?;
    let code = match address.component_code() {
        [code] => *code,
        other => {
            return Err(PlcError::Protocol(format!(
                "3E帧软元件代码必须为1个字节\t{:02X?}",
                other
            )))
        }
    };
    let len = u16::try_from(REQUEST_HEADER_LEN - REQUEST_LEN_START + datas.len())
        .map_err(|_| PlcError::Param(format!("写入数据过长\tlen={}", datas.len())))?;
    let mut buf = Vec::with_capacity(REQUEST_HEADER_LEN + datas.len());
    buf.push(0x50); // 副标题：0x50 0x00
    buf.push(0x00);
    buf.push(0x00); // 网络号：0x00
    buf.push(0xFF); // PLC编号：0xFF
    buf.push(0xFF); // 请求目标模块IO编号：0xFF 0X03
    buf.push(0x03);
    buf.push(0x00); // 请求目标模块站号：0x00
    buf.extend(len.to_le_bytes()); // [7~8]请求数据长度，从CPU监视定时器开始计算
    buf.push(0x0A); // CPU监视定时器：0x0A 0x00
    buf.push(0x00);
    // 添加指令+子指令，低字节在前（已处理）
    buf.extend(command);
    // 添加起始软元件(3位，低字节在前)
    let begin = address.get_address();
    buf.push(begin as u8);
    buf.push((begin >> 8) as u8);
    buf.push((begin >> 16) as u8);
    // 添加软元件代码
    buf.push(code);
    // 添加软元件点数(2位，低字节在前)
    buf.extend(count.to_le_bytes());
    // 添加写入软元件的数据
    buf.extend_from_slice(datas);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(name: &str) -> McAddress {
        Mc3eBinary.resolve_address(name).unwrap()
    }

    #[test]
    fn test_create_read_buf() {
        let buf = Mc3eBinary
            .build_read_frame(&address("D10"), 20, &DataType::Word)
            .unwrap();
        assert_eq!(
            buf,
            [80, 0, 0, 255, 255, 3, 0, 12, 0, 10, 0, 1, 4, 0, 0, 10, 0, 0, 168, 10, 0]
        );
    }

    #[test]
    fn read_bit_frame() {
        let buf = Mc3eBinary
            .build_read_frame(&address("M100"), 3, &DataType::Bit)
            .unwrap();
        assert_eq!(buf.len(), REQUEST_HEADER_LEN);
        assert_eq!(buf[12], 0x04);
        assert_eq!(buf[13], 0x01);
        assert_eq!(&buf[15..18], &[100, 0, 0]);
        assert_eq!(buf[18], 0x90);
        // 按位读取点数不减半
        assert_eq!(&buf[19..21], &[3, 0]);
    }

    #[test]
    fn write_bit_frame() {
        let buf = Mc3eBinary
            .build_write_frame(&address("M200"), &[0x10], &DataType::Bit)
            .unwrap();
        assert_eq!(buf.len(), REQUEST_HEADER_LEN + 1);
        assert_eq!(&buf[7..9], &[13, 0]);
        assert_eq!(buf[12], 0x14);
        assert_eq!(buf[13], 0x01);
        assert_eq!(&buf[19..21], &[1, 0]);
        assert_eq!(buf[21], 0x10);
    }

    #[test]
    fn write_word_frame() {
        let buf = Mc3eBinary
            .build_write_frame(&address("ZR1A"), &[0x34, 0x12, 0x78, 0x56], &DataType::Word)
            .unwrap();
        assert_eq!(&buf[7..9], &[16, 0]);
        assert_eq!(buf[13], 0x00);
        assert_eq!(&buf[15..19], &[0x1A, 0, 0, 0xB0]);
        assert_eq!(&buf[19..21], &[2, 0]);
        assert_eq!(&buf[21..], &[0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn three_byte_address() {
        let buf = Mc3eBinary
            .build_read_frame(&address("D123456"), 2, &DataType::Word)
            .unwrap();
        assert_eq!(&buf[15..18], &[0x40, 0xE2, 0x01]);
    }

    #[test]
    fn rejects_1e_address() {
        let a1e = McAddress::new("D10", McVersion::A1e).unwrap();
        let err = Mc3eBinary
            .build_read_frame(&a1e, 2, &DataType::Word)
            .unwrap_err();
        assert!(matches!(err, PlcError::Protocol(_)));
    }

    #[test]
    fn parse_declared_length() {
        let buf = [0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x03, 0xAA, 0xBB, 0xCC];
        assert_eq!(Mc3eBinary.parse_response(&buf).unwrap(), &[0xAA, 0xBB, 0xCC]);
        // 写入应答没有数据
        let ack = [0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00];
        assert!(Mc3eBinary.parse_response(&ack).unwrap().is_empty());
        assert!(matches!(
            Mc3eBinary.parse_response(&buf[..10]),
            Err(PlcError::Protocol(_))
        ));
        assert!(matches!(
            Mc3eBinary.parse_response(&buf[..5]),
            Err(PlcError::Protocol(_))
        ));
    }

    #[test]
    fn read_round_trip() {
        for (len, data_type, datas) in [
            (5u16, DataType::Bit, vec![0x10u8, 0x01, 0x10]),
            (4, DataType::Word, vec![0x01, 0x02, 0x03, 0x04]),
        ] {
            let frame = Mc3eBinary
                .build_read_frame(&address("D0"), len, &data_type)
                .unwrap();
            let count = u16::from_le_bytes([frame[19], frame[20]]) as usize;
            let mut reply = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
            reply.extend((datas.len() as u16).to_be_bytes());
            reply.extend(&datas);
            let r = Mc3eBinary
                .parse_read_response(&reply, len, &data_type)
                .unwrap();
            assert_eq!(r, datas.as_slice());
            if data_type == DataType::Bit {
                // n 个点占 ceil(n/2) 个字节
                assert_eq!(r.len(), count.div_ceil(2));
            }
        }
    }

    #[test]
    fn read_response_checks() {
        let empty = [0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00];
        assert!(matches!(
            Mc3eBinary.parse_read_response(&empty, 1, &DataType::Bit),
            Err(PlcError::EmptyResponse)
        ));
        let short = [0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x02, 0x01, 0x02];
        assert!(matches!(
            Mc3eBinary.parse_read_response(&short, 4, &DataType::Word),
            Err(PlcError::Protocol(_))
        ));
    }
}
