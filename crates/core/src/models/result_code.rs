use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CheckerError;

/// 检查结果状态码
///
/// 数值是对外协议的一部分，不能重新编号。`InternalError` 只用于表示
/// Worker自身的故障（操作逻辑抛出错误或行为异常）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ResultCode {
    Up = 101,
    Corrupt = 102,
    Mumble = 103,
    Down = 104,
    InternalError = 110,
}

impl ResultCode {
    pub const ALL: [ResultCode; 5] = [
        ResultCode::Up,
        ResultCode::Corrupt,
        ResultCode::Mumble,
        ResultCode::Down,
        ResultCode::InternalError,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    /// 根据数值反查状态码
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// 符号名称，用于日志和诊断
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Up => "UP",
            ResultCode::Corrupt => "CORRUPT",
            ResultCode::Mumble => "MUMBLE",
            ResultCode::Down => "DOWN",
            ResultCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// 根据数值反查符号名称
    pub fn name_of(code: u16) -> Option<&'static str> {
        Self::from_code(code).map(Self::name)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ResultCode> for u16 {
    fn from(code: ResultCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ResultCode {
    type Error = CheckerError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
            .ok_or_else(|| CheckerError::Serialization(format!("未知的状态码: {code}")))
    }
}
