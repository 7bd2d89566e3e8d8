//! ゼロコピー HTTP/1.x パーサー
//!
//! 呼び出し側が所有するバッファを直接参照してリクエスト/レスポンス/ヘッダーを解析する。
//! パース中にバイトをコピーすることはない。
//!
//! ## 戻り値
//!
//! - `Ok(Status::Complete(n))`: パース完了、先頭 `n` バイトを消費
//! - `Ok(Status::Partial)`: 入力が足りない (バッファを追加して再度呼び出す)
//! - `Err(ParseError)`: 不正な入力 (このメッセージの処理は打ち切る)
//!
//! ## オフセット
//!
//! パース結果のスライスはバッファが移動すると無効になる。
//! 読み込みのたびにバッファが伸びる場合は `layout()` でオフセットだけの
//! レイアウトに変換し、バッファの更新後に `Span::slice()` で引き直す。
//!
//! ## 使い方
//!
//! ```rust
//! use ncollectd_http::{Method, ParsedHeader, ParsedRequest, Status};
//!
//! let buf = b"GET /metrics HTTP/1.1\r\nHost: localhost\r\n\r\n";
//! let mut headers = [ParsedHeader::EMPTY; 16];
//! let mut request = ParsedRequest::new(&mut headers);
//! let status = request.parse(buf, 0).unwrap();
//! assert_eq!(status, Status::Complete(buf.len()));
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.path, b"/metrics");
//! assert_eq!(request.headers().len(), 1);
//! ```

/// `Status::Partial` をそのまま呼び出し元へ返す
macro_rules! complete {
    ($e:expr) => {
        match $e {
            $crate::parser::Status::Complete(v) => v,
            $crate::parser::Status::Partial => {
                return Ok($crate::parser::Status::Partial);
            }
        }
    };
}

mod complete;
mod headers;
mod request;
mod response;
mod scanner;
mod token;

pub use complete::is_complete;
pub use headers::parse_headers;
pub use request::{ParsedRequest, RequestLayout};
pub use response::{ParsedResponse, ResponseLayout};

pub(crate) use token::is_token_char;

use crate::header::HeaderName;

/// 不完全な入力を表す C 互換の戻り値
pub const PARTIAL_CODE: isize = -2;

/// パースの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<T> {
    /// パース完了
    Complete(T),
    /// 入力が足りない
    Partial,
}

impl<T> Status<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Complete(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Status::Partial)
    }

    /// 完了していれば値を返す
    pub fn complete(self) -> Option<T> {
        match self {
            Status::Complete(v) => Some(v),
            Status::Partial => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Status<U> {
        match self {
            Status::Complete(v) => Status::Complete(f(v)),
            Status::Partial => Status::Partial,
        }
    }
}

impl Status<usize> {
    /// C 互換の戻り値 (消費バイト数、または -2)
    pub fn code(&self) -> isize {
        match self {
            Status::Complete(n) => isize::try_from(*n).unwrap_or(isize::MAX),
            Status::Partial => PARTIAL_CODE,
        }
    }
}

/// バッファ先頭からのオフセットと長さ
///
/// バッファが再確保されても有効な位置情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub const EMPTY: Span = Span { offset: 0, len: 0 };

    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            len: end - start,
        }
    }

    /// 終端位置 (この位置は含まない)
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// バッファからスライスを引き直す
    ///
    /// 範囲がバッファ外なら `None`。
    pub fn slice<'b>(&self, buf: &'b [u8]) -> Option<&'b [u8]> {
        let end = self.offset.checked_add(self.len)?;
        buf.get(self.offset..end)
    }
}

/// パース済みヘッダー 1 件
///
/// `raw_name` と `value` は入力バッファを直接参照する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHeader<'b> {
    /// 既知ヘッダー表で解決した識別子 (未知なら Unknown)
    pub name: HeaderName,
    /// 受信したままのヘッダー名
    pub raw_name: &'b [u8],
    /// 前後の空白を除いた値
    pub value: &'b [u8],
    pub name_span: Span,
    pub value_span: Span,
}

impl ParsedHeader<'static> {
    /// ヘッダー配列の初期化用
    pub const EMPTY: ParsedHeader<'static> = ParsedHeader {
        name: HeaderName::Unknown,
        raw_name: &[],
        value: &[],
        name_span: Span::EMPTY,
        value_span: Span::EMPTY,
    };
}

impl ParsedHeader<'_> {
    /// オフセットだけのレイアウトに変換
    pub fn layout(&self) -> HeaderLayout {
        HeaderLayout {
            name: self.name,
            name_span: self.name_span,
            value_span: self.value_span,
        }
    }
}

impl Default for ParsedHeader<'_> {
    fn default() -> Self {
        ParsedHeader::EMPTY
    }
}

/// バッファを参照しないヘッダーの位置情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub name: HeaderName,
    pub name_span: Span,
    pub value_span: Span,
}

impl HeaderLayout {
    /// バッファからヘッダーを引き直す
    pub fn resolve<'b>(&self, buf: &'b [u8]) -> Option<ParsedHeader<'b>> {
        Some(ParsedHeader {
            name: self.name,
            raw_name: self.name_span.slice(buf)?,
            value: self.value_span.slice(buf)?,
            name_span: self.name_span,
            value_span: self.value_span,
        })
    }
}

/// レイアウトの並びをまとめて引き直す
///
/// どれか 1 つでも範囲外なら `None`。
pub fn resolve_headers<'b>(layouts: &[HeaderLayout], buf: &'b [u8]) -> Option<Vec<ParsedHeader<'b>>> {
    layouts.iter().map(|layout| layout.resolve(buf)).collect()
}
