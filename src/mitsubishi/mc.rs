use std::fmt::Display;
use std::str::FromStr;

use crate::core::session::LengthPrefix;
use crate::prelude::*;

/// MC 协议版本(帧格式)，创建客户端时确定，之后不可修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McVersion {
    /// A系列兼容 1E 帧
    A1e,
    /// QnA系列兼容 3E 帧
    Qna3e,
}

impl Display for McVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            McVersion::A1e => f.write_str("A-1E"),
            McVersion::Qna3e => f.write_str("Qna-3E"),
        }
    }
}

impl FromStr for McVersion {
    type Err = PlcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match name.as_str() {
            "A1E" | "1E" => Ok(McVersion::A1e),
            "QNA3E" | "3E" => Ok(McVersion::Qna3e),
            _ => Err(PlcError::Protocol(format!("未知的协议版本\t{}", s))),
        }
    }
}

/// 软元件地址的进制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Oct,
    Dec,
    Hex,
    /// 百进制，每两位十进制数字为一位，数值与十进制写法相同
    Centi,
}

impl Radix {
    pub fn base(&self) -> u32 {
        match self {
            Radix::Oct => 8,
            Radix::Dec => 10,
            Radix::Hex => 16,
            Radix::Centi => 100,
        }
    }

    /// 解析地址数字部分，非法字符或溢出时返回 None
    pub fn parse(&self, digits: &str) -> Option<u32> {
        let radix = match self {
            Radix::Centi => 10,
            other => other.base(),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        u32::from_str_radix(digits, radix).ok()
    }
}

/// 软元件表中的一项
#[derive(Debug, Clone, Copy)]
pub struct Component {
    /// 寄存器头部，一个或两个字母
    pub header: &'static str,
    /// 软元件代码，3E帧为1个字节，1E帧为2个字节(高字节在前)
    pub code: &'static [u8],
    pub data_type: DataType,
    pub radix: Radix,
}

const fn component(
    header: &'static str,
    code: &'static [u8],
    data_type: DataType,
    radix: Radix,
) -> Component {
    Component {
        header,
        code,
        data_type,
        radix,
    }
}

/// 3E 帧软元件代码
pub static QNA_3E_COMPONENTS: &[Component] = &[
    component("X", &[0x9C], DataType::Bit, Radix::Hex),
    component("Y", &[0x9D], DataType::Bit, Radix::Hex),
    component("M", &[0x90], DataType::Bit, Radix::Dec),
    component("L", &[0x92], DataType::Bit, Radix::Dec),
    component("F", &[0x93], DataType::Bit, Radix::Dec),
    component("V", &[0x94], DataType::Bit, Radix::Dec),
    component("B", &[0xA0], DataType::Bit, Radix::Hex),
    component("D", &[0xA8], DataType::Word, Radix::Dec),
    component("W", &[0xB4], DataType::Word, Radix::Hex),
    component("R", &[0xAF], DataType::Word, Radix::Dec),
    component("ZR", &[0xB0], DataType::Word, Radix::Hex),
    component("Z", &[0xCC], DataType::Word, Radix::Dec),
    component("DX", &[0xA2], DataType::Bit, Radix::Hex),
    component("DY", &[0xA3], DataType::Bit, Radix::Hex),
    component("SM", &[0x91], DataType::Bit, Radix::Dec),
    component("SD", &[0xA9], DataType::Word, Radix::Dec),
    component("SB", &[0xA1], DataType::Bit, Radix::Hex),
    component("SW", &[0xB5], DataType::Word, Radix::Hex),
    // 累计定时器
    component("SC", &[0xC6], DataType::Bit, Radix::Dec),
    component("SS", &[0xC7], DataType::Bit, Radix::Dec),
    component("SN", &[0xC8], DataType::Word, Radix::Centi),
    // 步进继电器
    component("S", &[0x98], DataType::Bit, Radix::Dec),
    // 定时器
    component("TS", &[0xC1], DataType::Bit, Radix::Dec),
    component("TC", &[0xC0], DataType::Bit, Radix::Dec),
    component("TN", &[0xC2], DataType::Word, Radix::Dec),
    // 计数器
    component("CS", &[0xC4], DataType::Bit, Radix::Dec),
    component("CC", &[0xC3], DataType::Bit, Radix::Dec),
    component("CN", &[0xC5], DataType::Word, Radix::Dec),
];

/// 1E 帧软元件代码
pub static A_1E_COMPONENTS: &[Component] = &[
    component("X", &[0x58, 0x20], DataType::Bit, Radix::Oct),
    component("Y", &[0x59, 0x20], DataType::Bit, Radix::Hex),
    component("M", &[0x4D, 0x20], DataType::Bit, Radix::Dec),
    component("S", &[0x53, 0x20], DataType::Bit, Radix::Dec),
    component("F", &[0x46, 0x20], DataType::Bit, Radix::Dec),
    component("B", &[0x42, 0x20], DataType::Bit, Radix::Hex),
    component("TS", &[0x54, 0x53], DataType::Bit, Radix::Dec),
    component("TN", &[0x54, 0x4E], DataType::Word, Radix::Dec),
    component("CS", &[0x43, 0x53], DataType::Bit, Radix::Dec),
    component("CN", &[0x43, 0x4E], DataType::Word, Radix::Dec),
    component("D", &[0x44, 0x20], DataType::Word, Radix::Dec),
    component("W", &[0x57, 0x20], DataType::Word, Radix::Hex),
    component("R", &[0x52, 0x20], DataType::Word, Radix::Dec),
];

/// 软元件地址，每次读写时解析，只能由生成它的协议版本使用
#[derive(Debug, Clone)]
pub struct McAddress {
    /// 寄存器完整地址
    address_name: String,
    /// 寄存器数据类型
    data_type: DataType,
    /// 寄存器头部
    inner_address_header: &'static str,
    /// 软元件代码
    component_code: &'static [u8],
    /// 地址进制
    radix: Radix,
    /// 寄存器当前的地址
    inner_address: u32,
    version: McVersion,
}

impl McAddress {
    /// 按协议版本的软元件表解析寄存器地址
    ///
    /// # Error
    /// 无效的寄存器头部、地址数字或超出帧格式能表示的地址范围
    pub fn new(address_name: impl Into<String>, version: McVersion) -> Result<Self, PlcError> {
        let (table, max_address) = match version {
            McVersion::A1e => (A_1E_COMPONENTS, u16::MAX as u32),
            McVersion::Qna3e => (QNA_3E_COMPONENTS, 0x00FF_FFFF),
        };
        let address_name = address_name.into().trim().to_ascii_uppercase();
        if address_name.len() <= 1 {
            return Err(PlcError::Addr(format!(
                "PLC 寄存器地址错误\t寄存器={}",
                address_name
            )));
        }
        // 两个字母的头部优先，找不到再按一个字母匹配
        let component = table
            .iter()
            .filter(|c| address_name.starts_with(c.header))
            .max_by_key(|c| c.header.len())
            .ok_or_else(|| {
                PlcError::Addr(format!(
                    "PLC 无效的寄存器地址\t寄存器={}\t协议={}",
                    address_name, version
                ))
            })?;
        let address = component
            .radix
            .parse(&address_name[component.header.len()..])
            .filter(|address| *address <= max_address)
            .ok_or_else(|| {
                PlcError::Addr(format!(
                    "PLC 无效的寄存器地址\t寄存器={}\t进制={}",
                    address_name,
                    component.radix.base()
                ))
            })?;
        Ok(McAddress {
            address_name,
            data_type: component.data_type,
            inner_address_header: component.header,
            component_code: component.code,
            radix: component.radix,
            inner_address: address,
            version,
        })
    }

    /// 软元件代码
    pub fn component_code(&self) -> &'static [u8] {
        self.component_code
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn version(&self) -> McVersion {
        self.version
    }

    /// 检查地址是否由指定协议版本解析
    pub(super) fn ensure_version(&self, version: McVersion) -> PlcResult {
        if self.version != version {
            return Err(PlcError::Protocol(format!(
                "寄存器地址{}由{}协议解析,不能用于{}协议",
                self.address_name, self.version, version
            )));
        }
        Ok(())
    }
}

impl IAddress for McAddress {
    /// 获取完整的寄存器地址
    fn get_address_name(&self) -> &str {
        &self.address_name
    }
    /// 获取寄存器地址头部
    fn get_address_header(&self) -> &str {
        self.inner_address_header
    }
    /// 获取当前寄存器的地址
    fn get_address(&self) -> u32 {
        self.inner_address
    }
    /// 获取数据类型
    fn get_data_type(&self) -> &DataType {
        &self.data_type
    }
}

/// 收发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// 只读取一次，不重连
    Single,
    /// 按长度读取完整应答，失败时重连重试一次
    Reliable(LengthPrefix),
}

/// MC 协议帧格式，每个协议版本一个实现
pub trait McProtocol: Send + Sync {
    /// 协议版本
    fn version(&self) -> McVersion;

    /// 解析寄存器地址
    fn resolve_address(&self, address_name: &str) -> Result<McAddress, PlcError> {
        McAddress::new(address_name, self.version())
    }

    /// 创建读取指令
    /// * `len` - 读取的字节数，按位读取时为点数
    fn build_read_frame(
        &self,
        address: &McAddress,
        len: u16,
        data_type: &DataType,
    ) -> Result<Vec<u8>, PlcError>;

    /// 创建写入指令
    fn build_write_frame(
        &self,
        address: &McAddress,
        datas: &[u8],
        data_type: &DataType,
    ) -> Result<Vec<u8>, PlcError>;

    /// 取出应答中的数据部分
    fn parse_response<'a>(&self, buf: &'a [u8]) -> Result<&'a [u8], PlcError>;

    /// 收发方式
    fn exchange(&self) -> Exchange;

    /// 解析读取应答，返回请求长度对应的数据
    fn parse_read_response<'a>(
        &self,
        buf: &'a [u8],
        len: u16,
        data_type: &DataType,
    ) -> Result<&'a [u8], PlcError> {
        let datas = self.parse_response(buf)?;
        if datas.is_empty() {
            return Err(PlcError::EmptyResponse);
        }
        let expected = payload_len(len, data_type);
        if datas.len() < expected {
            return Err(PlcError::Protocol(format!(
                "应答数据不完整\t需要={}\t实际={}",
                expected,
                datas.len()
            )));
        }
        Ok(&datas[..expected])
    }
}

/// 读取应答的数据字节数：按位读取时两个点占一个字节
pub fn payload_len(len: u16, data_type: &DataType) -> usize {
    match data_type {
        DataType::Bit => (len as usize).div_ceil(2),
        DataType::Word => len as usize,
    }
}

/// 软元件点数：按字读写时长度减半
pub(super) fn point_count(len: usize, data_type: &DataType) -> Result<u16, PlcError> {
    if len == 0 {
        return Err(PlcError::Param("读写长度不能为0".into()));
    }
    let count = match data_type {
        DataType::Bit => len,
        DataType::Word => {
            if len % 2 != 0 {
                return Err(PlcError::Param(format!("按字读写时字节数必须为偶数\tlen={}", len)));
            }
            len / 2
        }
    };
    u16::try_from(count).map_err(|_| PlcError::Param(format!("读写长度超出范围\tlen={}", len)))
}
