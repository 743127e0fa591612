// ! PLC 数据类型与字节之间的转换，全部为小端

use std::fmt::Display;
use std::str::FromStr;

use crate::prelude::*;

/// 按位写入时 ON 的编码（高4位为1）
pub const BIT_ON: u8 = 0x10;

/// 支持读写的数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ValueKind {
    /// 读取长度：bool 为点数，其他为字节数
    pub fn byte_len(&self) -> u16 {
        match self {
            ValueKind::Bool => 1,
            ValueKind::Int16 | ValueKind::UInt16 => 2,
            ValueKind::Int32 | ValueKind::UInt32 | ValueKind::Float32 => 4,
            ValueKind::Int64 | ValueKind::UInt64 | ValueKind::Float64 => 8,
        }
    }

    /// 按位还是按字读写
    pub fn data_type(&self) -> DataType {
        match self {
            ValueKind::Bool => DataType::Bit,
            _ => DataType::Word,
        }
    }

    /// 把读取到的字节转换为该类型的值
    pub fn decode(&self, bytes: &[u8]) -> Result<McValue, PlcError> {
        let value = match self {
            ValueKind::Bool => McValue::Bool(bool::decode(bytes)?),
            ValueKind::Int16 => McValue::Int16(i16::decode(bytes)?),
            ValueKind::UInt16 => McValue::UInt16(u16::decode(bytes)?),
            ValueKind::Int32 => McValue::Int32(i32::decode(bytes)?),
            ValueKind::UInt32 => McValue::UInt32(u32::decode(bytes)?),
            ValueKind::Int64 => McValue::Int64(i64::decode(bytes)?),
            ValueKind::UInt64 => McValue::UInt64(u64::decode(bytes)?),
            ValueKind::Float32 => McValue::Float32(f32::decode(bytes)?),
            ValueKind::Float64 => McValue::Float64(f64::decode(bytes)?),
        };
        Ok(value)
    }

    pub fn to_str(&self) -> &str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int16 => "int16",
            ValueKind::UInt16 => "uint16",
            ValueKind::Int32 => "int32",
            ValueKind::UInt32 => "uint32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for ValueKind {
    type Err = PlcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "bit" => ValueKind::Bool,
            "int16" | "i16" | "short" => ValueKind::Int16,
            "uint16" | "u16" | "ushort" | "word" => ValueKind::UInt16,
            "int32" | "i32" | "int" => ValueKind::Int32,
            "uint32" | "u32" | "uint" | "dword" => ValueKind::UInt32,
            "int64" | "i64" | "long" => ValueKind::Int64,
            "uint64" | "u64" | "ulong" => ValueKind::UInt64,
            "float32" | "f32" | "float" | "real" => ValueKind::Float32,
            "float64" | "f64" | "double" => ValueKind::Float64,
            _ => return Err(PlcError::UnsupportedType(s.to_string())),
        };
        Ok(kind)
    }
}

/// 可写入PLC的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum McValue {
    Bool(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

impl McValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            McValue::Bool(_) => ValueKind::Bool,
            McValue::Int16(_) => ValueKind::Int16,
            McValue::UInt16(_) => ValueKind::UInt16,
            McValue::Int32(_) => ValueKind::Int32,
            McValue::UInt32(_) => ValueKind::UInt32,
            McValue::Int64(_) => ValueKind::Int64,
            McValue::UInt64(_) => ValueKind::UInt64,
            McValue::Float32(_) => ValueKind::Float32,
            McValue::Float64(_) => ValueKind::Float64,
        }
    }

    /// 转换为写入PLC的字节
    pub fn encode(&self) -> Vec<u8> {
        match self {
            McValue::Bool(v) => vec![if *v { BIT_ON } else { 0x00 }],
            McValue::Int16(v) => v.to_le_bytes().to_vec(),
            McValue::UInt16(v) => v.to_le_bytes().to_vec(),
            McValue::Int32(v) => v.to_le_bytes().to_vec(),
            McValue::UInt32(v) => v.to_le_bytes().to_vec(),
            McValue::Int64(v) => v.to_le_bytes().to_vec(),
            McValue::UInt64(v) => v.to_le_bytes().to_vec(),
            McValue::Float32(v) => v.to_le_bytes().to_vec(),
            McValue::Float64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// 按指定类型解析文本，例如配置文件中的写入值
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, PlcError> {
        let text = text.trim();
        let err = || PlcError::UnsupportedType(format!("{}不是有效的{}", text, kind));
        let value = match kind {
            ValueKind::Bool => match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => McValue::Bool(true),
                "0" | "false" | "off" => McValue::Bool(false),
                _ => return Err(err()),
            },
            ValueKind::Int16 => McValue::Int16(text.parse().map_err(|_| err())?),
            ValueKind::UInt16 => McValue::UInt16(text.parse().map_err(|_| err())?),
            ValueKind::Int32 => McValue::Int32(text.parse().map_err(|_| err())?),
            ValueKind::UInt32 => McValue::UInt32(text.parse().map_err(|_| err())?),
            ValueKind::Int64 => McValue::Int64(text.parse().map_err(|_| err())?),
            ValueKind::UInt64 => McValue::UInt64(text.parse().map_err(|_| err())?),
            ValueKind::Float32 => McValue::Float32(text.parse().map_err(|_| err())?),
            ValueKind::Float64 => McValue::Float64(text.parse().map_err(|_| err())?),
        };
        Ok(value)
    }
}

impl Display for McValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            McValue::Bool(v) => v.fmt(f),
            McValue::Int16(v) => v.fmt(f),
            McValue::UInt16(v) => v.fmt(f),
            McValue::Int32(v) => v.fmt(f),
            McValue::UInt32(v) => v.fmt(f),
            McValue::Int64(v) => v.fmt(f),
            McValue::UInt64(v) => v.fmt(f),
            McValue::Float32(v) => v.fmt(f),
            McValue::Float64(v) => v.fmt(f),
        }
    }
}

/// 可以直接从PLC读取的类型
pub trait McScalar: Sized + Into<McValue> {
    const KIND: ValueKind;

    /// 从读取到的字节转换，只使用开头需要的字节
    fn decode(bytes: &[u8]) -> Result<Self, PlcError>;
}

/// 取出开头的 N 个字节
fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N], PlcError> {
    if bytes.is_empty() {
        return Err(PlcError::EmptyResponse);
    }
    match bytes.get(..N) {
        Some(head) => {
            let mut buf = [0u8; N];
            buf.copy_from_slice(head);
            Ok(buf)
        }
        None => Err(PlcError::Protocol(format!(
            "数据长度不足\t需要={}\t实际={}",
            N,
            bytes.len()
        ))),
    }
}

impl From<bool> for McValue {
    fn from(value: bool) -> Self {
        McValue::Bool(value)
    }
}

impl McScalar for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn decode(bytes: &[u8]) -> Result<Self, PlcError> {
        let [byte] = take::<1>(bytes)?;
        Ok(byte & BIT_ON != 0)
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$ty> for McValue {
                fn from(value: $ty) -> Self {
                    McValue::$kind(value)
                }
            }

            impl McScalar for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn decode(bytes: &[u8]) -> Result<Self, PlcError> {
                    Ok(<$ty>::from_le_bytes(take(bytes)?))
                }
            }
        )*
    };
}

impl_scalar!(
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: McScalar + Copy>(value: T) -> T {
        let value: McValue = value.into();
        let bytes = value.encode();
        assert_eq!(bytes.len(), T::KIND.byte_len() as usize);
        T::decode(&bytes).unwrap()
    }

    #[test]
    fn bool_codec() {
        assert_eq!(McValue::Bool(true).encode(), vec![0x10]);
        assert_eq!(McValue::Bool(false).encode(), vec![0x00]);
        // 只检查第4位
        assert!(bool::decode(&[0x10]).unwrap());
        assert!(bool::decode(&[0xFF]).unwrap());
        assert!(bool::decode(&[0x11, 0x00]).unwrap());
        assert!(!bool::decode(&[0xEF]).unwrap());
        assert!(!bool::decode(&[0x01]).unwrap());
        assert!(round_trip(true));
        assert!(!round_trip(false));
    }

    #[test]
    fn integer_round_trip() {
        for v in [i16::MIN, -1, 0, 1, i16::MAX] {
            assert_eq!(round_trip(v), v);
        }
        for v in [0u16, 0x1234, u16::MAX] {
            assert_eq!(round_trip(v), v);
        }
        for v in [i32::MIN, -123_456, i32::MAX] {
            assert_eq!(round_trip(v), v);
        }
        for v in [0u32, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(round_trip(v), v);
        }
        for v in [i64::MIN, -1, i64::MAX] {
            assert_eq!(round_trip(v), v);
        }
        for v in [0u64, u64::MAX] {
            assert_eq!(round_trip(v), v);
        }
    }

    #[test]
    fn little_endian() {
        assert_eq!(McValue::from(0x1234u16).encode(), vec![0x34, 0x12]);
        assert_eq!(McValue::from(-2i32).encode(), vec![0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(i16::decode(&[0xFE, 0xFF]).unwrap(), -2);
        assert_eq!(u32::decode(&[0x78, 0x56, 0x34, 0x12]).unwrap(), 0x1234_5678);
    }

    #[test]
    fn float_bits() {
        for v in [
            -134.2f32,
            0.0,
            -0.0,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::MIN_POSITIVE,
            f32::NAN,
        ] {
            assert_eq!(round_trip(v).to_bits(), v.to_bits());
        }
        for v in [std::f64::consts::PI, f64::NEG_INFINITY, f64::NAN, -0.0] {
            assert_eq!(round_trip(v).to_bits(), v.to_bits());
        }
        let nan = f32::from_bits(0x7FC0_0001);
        assert_eq!(round_trip(nan).to_bits(), 0x7FC0_0001);
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(u16::decode(&[]), Err(PlcError::EmptyResponse)));
        assert!(matches!(bool::decode(&[]), Err(PlcError::EmptyResponse)));
        assert!(matches!(u32::decode(&[0x01, 0x02]), Err(PlcError::Protocol(_))));
        assert!(matches!(
            ValueKind::Float64.decode(&[0; 4]),
            Err(PlcError::Protocol(_))
        ));
    }

    #[test]
    fn kind_dispatch() {
        assert_eq!(
            ValueKind::Int32.decode(&[0xFF; 4]).unwrap(),
            McValue::Int32(-1)
        );
        assert_eq!(McValue::from(1.5f64).kind(), ValueKind::Float64);
        assert_eq!(ValueKind::Bool.data_type(), DataType::Bit);
        assert_eq!(ValueKind::UInt64.data_type(), DataType::Word);
    }

    #[test]
    fn parse_kind_and_value() {
        assert_eq!("Float32".parse::<ValueKind>().unwrap(), ValueKind::Float32);
        assert_eq!("u16".parse::<ValueKind>().unwrap(), ValueKind::UInt16);
        assert!(matches!(
            "string".parse::<ValueKind>(),
            Err(PlcError::UnsupportedType(_))
        ));
        assert_eq!(
            McValue::parse(ValueKind::Int16, "-42").unwrap(),
            McValue::Int16(-42)
        );
        assert_eq!(
            McValue::parse(ValueKind::Bool, "ON").unwrap(),
            McValue::Bool(true)
        );
        assert!(matches!(
            McValue::parse(ValueKind::UInt16, "-1"),
            Err(PlcError::UnsupportedType(_))
        ));
        assert_eq!(McValue::Float32(-134.2).to_string(), "-134.2");
    }
}
