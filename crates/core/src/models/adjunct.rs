use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 与flag关联的不透明负载
///
/// 内存中保存原始字节，传输时编码为base64文本。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjunct(Vec<u8>);

impl Adjunct {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_base64(text: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(text).map(Self)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// base64形式截断到 `max_chars` 个字符，超出部分以 `...` 表示
    pub fn truncated(&self, max_chars: usize) -> String {
        let encoded = self.to_base64();
        if encoded.len() <= max_chars {
            encoded
        } else {
            // base64字符均为ASCII，按字节截断安全
            format!("{}...", &encoded[..max_chars])
        }
    }
}

impl From<Vec<u8>> for Adjunct {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Adjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for Adjunct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Adjunct {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Adjunct::from_base64(&text)
            .map_err(|e| serde::de::Error::custom(format!("adjunct不是有效的base64: {e}")))
    }
}
