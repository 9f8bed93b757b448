//! 서버 주소

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// 기본 Bolt 포트
pub const DEFAULT_PORT: u16 = 7687;

const SCHEMES: [&str; 6] = [
    "bolt://",
    "bolt+s://",
    "bolt+ssc://",
    "zeta4g://",
    "zeta4g+s://",
    "zeta4g+ssc://",
];

/// 서버 주소 (히스토그램 키)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ServerAddress {
    /// 호스트
    pub host: String,
    /// 포트
    pub port: u16,
}

impl ServerAddress {
    /// 새 서버 주소 생성
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

/// 주소 파싱 오류
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// 호스트 없음
    #[error("Missing host in server address")]
    MissingHost,
    /// 잘못된 포트
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    /// 잘못된 형식
    #[error("Invalid server address: {0}")]
    Malformed(String),
}

impl FromStr for ServerAddress {
    type Err = AddressParseError;

    /// `host`, `host:port`, `bolt://host:port` 형식 파싱
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = SCHEMES
            .iter()
            .find_map(|scheme| s.strip_prefix(scheme))
            .unwrap_or(s);

        let parts: Vec<&str> = rest.split(':').collect();
        let (host, port) = match parts.as_slice() {
            [host] => (*host, DEFAULT_PORT),
            [host, port] => {
                let port = port
                    .parse()
                    .map_err(|_| AddressParseError::InvalidPort(port.to_string()))?;
                (*host, port)
            }
            _ => return Err(AddressParseError::Malformed(s.to_string())),
        };

        if host.is_empty() {
            return Err(AddressParseError::MissingHost);
        }
        Ok(Self::new(host, port))
    }
}
