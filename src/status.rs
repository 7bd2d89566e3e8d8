//! HTTP ステータスコードと理由フレーズ表

use std::fmt;

/// ステータスクラス (先頭桁)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusClass {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    #[default]
    Unknown,
}

impl StatusClass {
    /// ステータスコードの先頭桁 (ASCII) から判定
    pub fn from_first_digit(digit: u8) -> Self {
        match digit {
            b'1' => StatusClass::Informational,
            b'2' => StatusClass::Success,
            b'3' => StatusClass::Redirection,
            b'4' => StatusClass::ClientError,
            b'5' => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    /// 数値のステータスコードから判定
    pub fn from_code(code: u16) -> Self {
        match code / 100 {
            1 => StatusClass::Informational,
            2 => StatusClass::Success,
            3 => StatusClass::Redirection,
            4 => StatusClass::ClientError,
            5 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }
}

// ワイヤー互換のため文字列は変更しないこと
static REASON_PHRASES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (421, "Misdirected Request"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
];

/// 標準ステータスコード
///
/// 理由フレーズ表に存在するコードのみ表現できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode {
    code: u16,
    reason: &'static str,
}

impl StatusCode {
    /// 数値から標準ステータスコードを取得
    pub fn from_u16(code: u16) -> Option<Self> {
        REASON_PHRASES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(code, reason)| Self { code, reason })
    }

    /// 数値
    pub fn as_u16(&self) -> u16 {
        self.code
    }

    /// 理由フレーズ
    pub fn reason(&self) -> &'static str {
        self.reason
    }

    /// ステータスクラス
    pub fn class(&self) -> StatusClass {
        StatusClass::from_code(self.code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        let ok = StatusCode::from_u16(200).unwrap();
        assert_eq!(ok.as_u16(), 200);
        assert_eq!(ok.reason(), "OK");
        assert_eq!(ok.class(), StatusClass::Success);

        let network_auth = StatusCode::from_u16(511).unwrap();
        assert_eq!(network_auth.reason(), "Network Authentication Required");
        assert_eq!(network_auth.class(), StatusClass::ServerError);
    }

    #[test]
    fn unknown_codes() {
        assert!(StatusCode::from_u16(102).is_none());
        assert!(StatusCode::from_u16(418).is_none());
        assert!(StatusCode::from_u16(999).is_none());
    }

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(REASON_PHRASES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn class_from_first_digit() {
        assert_eq!(StatusClass::from_first_digit(b'1'), StatusClass::Informational);
        assert_eq!(StatusClass::from_first_digit(b'3'), StatusClass::Redirection);
        assert_eq!(StatusClass::from_first_digit(b'4'), StatusClass::ClientError);
        assert_eq!(StatusClass::from_first_digit(b'0'), StatusClass::Unknown);
        assert_eq!(StatusClass::from_first_digit(b'9'), StatusClass::Unknown);
    }

    #[test]
    fn display() {
        assert_eq!(StatusCode::from_u16(404).unwrap().to_string(), "404 Not Found");
    }
}
