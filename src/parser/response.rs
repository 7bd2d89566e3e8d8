use crate::error::ParseError;
use crate::status::StatusClass;
use crate::version::Version;

use super::complete::is_complete;
use super::headers::parse_header_block;
use super::token::{get_token_to_eol, parse_http_version, skip_spaces_after};
use super::{HeaderLayout, ParsedHeader, Span, Status};

/// パース済みレスポンス
#[derive(Debug)]
pub struct ParsedResponse<'h, 'b> {
    pub version: Version,
    /// `HTTP/1.x` の x (未パースなら None)
    pub minor_version: Option<u8>,
    /// 3 桁のステータスコード
    pub status: u16,
    pub status_class: StatusClass,
    /// 先頭の空白を除いた理由フレーズ
    pub reason: &'b [u8],
    pub reason_span: Span,
    headers: &'h mut [ParsedHeader<'b>],
    num_headers: usize,
}

impl<'h, 'b> ParsedResponse<'h, 'b> {
    pub fn new(headers: &'h mut [ParsedHeader<'b>]) -> Self {
        Self {
            version: Version::Unknown,
            minor_version: None,
            status: 0,
            status_class: StatusClass::Unknown,
            reason: &[],
            reason_span: Span::EMPTY,
            headers,
            num_headers: 0,
        }
    }

    /// レスポンスをパースする
    ///
    /// `prior_len` は前回呼び出し時のバッファ長 (初回は 0)。
    /// 完了しなかった場合はすべてのフィールドを初期状態に戻す。
    pub fn parse(&mut self, buf: &'b [u8], prior_len: usize) -> Result<Status<usize>, ParseError> {
        self.clear();
        let result = self.parse_inner(buf, prior_len);
        if !matches!(result, Ok(Status::Complete(_))) {
            self.clear();
        }
        result
    }

    fn parse_inner(&mut self, buf: &'b [u8], prior_len: usize) -> Result<Status<usize>, ParseError> {
        if prior_len != 0 {
            complete!(is_complete(buf, prior_len)?);
        }

        let (version, minor, pos) = complete!(parse_http_version(buf, 0)?);
        self.version = version;
        self.minor_version = Some(minor);

        if buf.get(pos) != Some(&b' ') {
            return Err(ParseError::InvalidStatusLine);
        }
        let mut pos = complete!(skip_spaces_after(buf, pos));

        // 3 桁の数字と直後の 1 バイトが揃うまで待つ
        if buf.len() - pos < 4 {
            return Ok(Status::Partial);
        }
        let digits = &buf[pos..pos + 3];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(ParseError::InvalidStatusCode);
        }
        self.status_class = StatusClass::from_first_digit(digits[0]);
        self.status = digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
        pos += 3;

        let (reason_end, next) = complete!(get_token_to_eol(buf, pos)?);
        let mut reason_start = pos;
        if reason_end > pos {
            if buf[pos] != b' ' {
                return Err(ParseError::InvalidStatusLine);
            }
            while reason_start < reason_end && buf[reason_start] == b' ' {
                reason_start += 1;
            }
        }
        self.reason = &buf[reason_start..reason_end];
        self.reason_span = Span::new(reason_start, reason_end);

        let end = complete!(parse_header_block(
            buf,
            next,
            self.headers,
            &mut self.num_headers
        )?);
        Ok(Status::Complete(end))
    }

    fn clear(&mut self) {
        self.version = Version::Unknown;
        self.minor_version = None;
        self.status = 0;
        self.status_class = StatusClass::Unknown;
        self.reason = &[];
        self.reason_span = Span::EMPTY;
        self.num_headers = 0;
    }

    /// パース済みヘッダー
    pub fn headers(&self) -> &[ParsedHeader<'b>] {
        &self.headers[..self.num_headers]
    }

    /// バッファを参照しないレイアウトに変換
    ///
    /// `head_len` には `parse` が返した消費バイト数を渡す。
    pub fn layout(&self, head_len: usize) -> ResponseLayout {
        ResponseLayout {
            version: self.version,
            minor_version: self.minor_version,
            status: self.status,
            status_class: self.status_class,
            reason_span: self.reason_span,
            headers: self.headers().iter().map(ParsedHeader::layout).collect(),
            head_len,
        }
    }
}

/// オフセットだけで表したレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLayout {
    pub version: Version,
    pub minor_version: Option<u8>,
    pub status: u16,
    pub status_class: StatusClass,
    pub reason_span: Span,
    pub headers: Vec<HeaderLayout>,
    /// ヘッダーブロック終端までのバイト数
    pub head_len: usize,
}
