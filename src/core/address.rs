use crate::prelude::*;

/// 寄存器地址接口
pub trait IAddress {
    /// 获取完整的寄存器地址
    fn get_address_name(&self) -> &str;
    /// 获取寄存器地址头部
    fn get_address_header(&self) -> &str;
    /// 获取寄存器地址尾部
    fn get_address(&self) -> u32;
    /// 获取数据类型
    fn get_data_type(&self) -> &DataType;
}
