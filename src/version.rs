//! HTTP バージョン

use std::fmt;

/// HTTP バージョン
///
/// `HTTP/1.` に続くマイナーバージョンが 0/1 以外の場合は Unknown。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    Http10,
    #[default]
    Http11,
    Unknown,
}

impl Version {
    /// マイナーバージョンから判定
    pub fn from_minor(minor: u8) -> Self {
        match minor {
            0 => Version::Http10,
            1 => Version::Http11,
            _ => Version::Unknown,
        }
    }

    /// ワイヤー上の表記 (Unknown は None)
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Version::Http10 => Some("HTTP/1.0"),
            Version::Http11 => Some("HTTP/1.1"),
            Version::Unknown => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("HTTP/1.?"))
    }
}
