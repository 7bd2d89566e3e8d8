//! HTTP メソッド

use std::fmt;

/// HTTP メソッド
///
/// 既知のメソッド以外は Unknown になる。生のメソッド名は
/// パース結果のスパンに残る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    Get,
    Put,
    Post,
    Head,
    Patch,
    Trace,
    Delete,
    Options,
    Connect,
    #[default]
    Unknown,
}

impl Method {
    /// バイト列からメソッドを判定 (大文字小文字を区別する)
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            b"GET" => Method::Get,
            b"PUT" => Method::Put,
            b"POST" => Method::Post,
            b"HEAD" => Method::Head,
            b"PATCH" => Method::Patch,
            b"TRACE" => Method::Trace,
            b"DELETE" => Method::Delete,
            b"OPTIONS" => Method::Options,
            b"CONNECT" => Method::Connect,
            _ => Method::Unknown,
        }
    }

    /// ワイヤー上の表記 (Unknown は None)
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Method::Get => Some("GET"),
            Method::Put => Some("PUT"),
            Method::Post => Some("POST"),
            Method::Head => Some("HEAD"),
            Method::Patch => Some("PATCH"),
            Method::Trace => Some("TRACE"),
            Method::Delete => Some("DELETE"),
            Method::Options => Some("OPTIONS"),
            Method::Connect => Some("CONNECT"),
            Method::Unknown => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("UNKNOWN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes() {
        assert_eq!(Method::from_bytes(b"GET"), Method::Get);
        assert_eq!(Method::from_bytes(b"PUT"), Method::Put);
        assert_eq!(Method::from_bytes(b"POST"), Method::Post);
        assert_eq!(Method::from_bytes(b"HEAD"), Method::Head);
        assert_eq!(Method::from_bytes(b"PATCH"), Method::Patch);
        assert_eq!(Method::from_bytes(b"TRACE"), Method::Trace);
        assert_eq!(Method::from_bytes(b"DELETE"), Method::Delete);
        assert_eq!(Method::from_bytes(b"OPTIONS"), Method::Options);
        assert_eq!(Method::from_bytes(b"CONNECT"), Method::Connect);
        assert_eq!(Method::from_bytes(b"get"), Method::Unknown);
        assert_eq!(Method::from_bytes(b"PROPFIND"), Method::Unknown);
        assert_eq!(Method::from_bytes(b""), Method::Unknown);
    }

    #[test]
    fn as_str_round_trip() {
        for method in [
            Method::Get,
            Method::Put,
            Method::Post,
            Method::Head,
            Method::Patch,
            Method::Trace,
            Method::Delete,
            Method::Options,
            Method::Connect,
        ] {
            let s = method.as_str().unwrap();
            assert_eq!(Method::from_bytes(s.as_bytes()), method);
        }
        assert_eq!(Method::Unknown.as_str(), None);
    }

    #[test]
    fn patch_is_spelled_correctly() {
        assert_eq!(Method::Patch.as_str(), Some("PATCH"));
    }
}
