use crate::error::ParseError;
use crate::method::Method;
use crate::version::Version;

use super::complete::is_complete;
use super::headers::parse_header_block;
use super::token::{parse_http_version, parse_line_end, parse_path, parse_token, skip_spaces_after};
use super::{HeaderLayout, ParsedHeader, Span, Status};

/// パース済みリクエスト
///
/// ヘッダー配列は呼び出し側が用意し、その長さが最大ヘッダー数になる。
#[derive(Debug)]
pub struct ParsedRequest<'h, 'b> {
    pub method: Method,
    /// 受信したままのメソッド名
    pub raw_method: &'b [u8],
    pub method_span: Span,
    pub path: &'b [u8],
    pub path_span: Span,
    pub version: Version,
    /// `HTTP/1.x` の x (未パースなら None)
    pub minor_version: Option<u8>,
    headers: &'h mut [ParsedHeader<'b>],
    num_headers: usize,
}

impl<'h, 'b> ParsedRequest<'h, 'b> {
    pub fn new(headers: &'h mut [ParsedHeader<'b>]) -> Self {
        Self {
            method: Method::Unknown,
            raw_method: &[],
            method_span: Span::EMPTY,
            path: &[],
            path_span: Span::EMPTY,
            version: Version::Unknown,
            minor_version: None,
            headers,
            num_headers: 0,
        }
    }

    /// リクエストをパースする
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

        // POST ボディの後に CRLF を送るクライアントがあるため先頭の空行は読み飛ばす
        let mut pos = match buf.first() {
            None => return Ok(Status::Partial),
            Some(b'\r' | b'\n') => complete!(parse_line_end(buf, 0)?),
            Some(_) => 0,
        };

        let method_end = complete!(parse_token(buf, pos, b' ')?);
        self.raw_method = &buf[pos..method_end];
        self.method_span = Span::new(pos, method_end);
        self.method = Method::from_bytes(self.raw_method);

        pos = complete!(skip_spaces_after(buf, method_end));
        let path_end = complete!(parse_path(buf, pos)?);
        self.path = &buf[pos..path_end];
        self.path_span = Span::new(pos, path_end);

        pos = complete!(skip_spaces_after(buf, path_end));
        if self.raw_method.is_empty() {
            return Err(ParseError::EmptyMethod);
        }
        if self.path.is_empty() {
            return Err(ParseError::EmptyPath);
        }

        let (version, minor, next) = complete!(parse_http_version(buf, pos)?);
        self.version = version;
        self.minor_version = Some(minor);

        pos = complete!(parse_line_end(buf, next)?);
        let end = complete!(parse_header_block(
            buf,
            pos,
            self.headers,
            &mut self.num_headers
        )?);
        Ok(Status::Complete(end))
    }

    fn clear(&mut self) {
        self.method = Method::Unknown;
        self.raw_method = &[];
        self.method_span = Span::EMPTY;
        self.path = &[];
        self.path_span = Span::EMPTY;
        self.version = Version::Unknown;
        self.minor_version = None;
        self.num_headers = 0;
    }

    /// パース済みヘッダー
    pub fn headers(&self) -> &[ParsedHeader<'b>] {
        &self.headers[..self.num_headers]
    }

    /// バッファを参照しないレイアウトに変換
    ///
    /// `head_len` には `parse` が返した消費バイト数を渡す。
    pub fn layout(&self, head_len: usize) -> RequestLayout {
        RequestLayout {
            method: self.method,
            method_span: self.method_span,
            path_span: self.path_span,
            version: self.version,
            minor_version: self.minor_version,
            headers: self.headers().iter().map(ParsedHeader::layout).collect(),
            head_len,
        }
    }
}

/// オフセットだけで表したリクエスト
///
/// バッファが再確保された後でも `Span::slice` で各要素を引き直せる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLayout {
    pub method: Method,
    pub method_span: Span,
    pub path_span: Span,
    pub version: Version,
    pub minor_version: Option<u8>,
    pub headers: Vec<HeaderLayout>,
    /// ヘッダーブロック終端までのバイト数
    pub head_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderName;

    #[test]
    fn simple_get() {
        let buf = b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\n\r\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 0), Ok(Status::Complete(buf.len())));
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.raw_method, b"GET");
        assert_eq!(req.path, b"/metrics");
        assert_eq!(req.path_span, Span { offset: 4, len: 8 });
        assert_eq!(req.version, Version::Http11);
        assert_eq!(req.minor_version, Some(1));
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.headers()[0].name, HeaderName::Host);
        assert_eq!(req.headers()[1].value, b"*/*");
    }

    #[test]
    fn unknown_method_keeps_raw_name() {
        let buf = b"PROPFIND /dav HTTP/1.0\r\n\r\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 0), Ok(Status::Complete(buf.len())));
        assert_eq!(req.method, Method::Unknown);
        assert_eq!(req.raw_method, b"PROPFIND");
        assert_eq!(req.version, Version::Http10);
    }

    #[test]
    fn skips_leading_blank_line() {
        let buf = b"\r\nPOST /write HTTP/1.1\r\n\r\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 0), Ok(Status::Complete(buf.len())));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.method_span, Span { offset: 2, len: 4 });
    }

    #[test]
    fn multiple_spaces_between_elements() {
        let buf = b"GET   /   HTTP/1.1\n\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 0), Ok(Status::Complete(buf.len())));
        assert_eq!(req.path, b"/");
    }

    #[test]
    fn partial_resets_fields() {
        let buf = b"GET /metrics HTTP/1.1\r\nHost: local";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 0), Ok(Status::Partial));
        assert_eq!(req.method, Method::Unknown);
        assert!(req.path.is_empty());
        assert_eq!(req.minor_version, None);
        assert!(req.headers().is_empty());
    }

    #[test]
    fn every_prefix_is_partial() {
        let buf = b"GET /metrics HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        for end in 0..buf.len() {
            assert_eq!(req.parse(&buf[..end], 0), Ok(Status::Partial), "end={end}");
        }
        assert_eq!(req.parse(buf, 0), Ok(Status::Complete(buf.len())));
    }

    #[test]
    fn malformed() {
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert!(req.parse(b"GET\r\n", 0).is_err());
        assert!(req.parse(b"GET /\x01 HTTP/1.1\r\n\r\n", 0).is_err());
        assert!(req.parse(b"GET /\x7f HTTP/1.1\r\n\r\n", 0).is_err());
        assert_eq!(
            req.parse(b"GET / HTTP/2.0\r\n\r\n", 0),
            Err(ParseError::InvalidVersion)
        );
        assert_eq!(
            req.parse(b" GET / HTTP/1.1\r\n\r\n", 0),
            Err(ParseError::InvalidToken(b' '))
        );
        assert_eq!(
            req.parse(b"GET / HTTP/1.1 \r\n\r\n", 0),
            Err(ParseError::InvalidLineEnding)
        );
        assert_eq!(req.method, Method::Unknown);
    }

    #[test]
    fn too_many_headers() {
        let buf = b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\n";
        let mut headers = [ParsedHeader::EMPTY; 1];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(
            req.parse(buf, 0),
            Err(ParseError::TooManyHeaders { limit: 1 })
        );
        assert!(req.headers().is_empty());
    }

    #[test]
    fn layout_survives_reallocation() {
        let mut buf = b"PUT /v1/write HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc".to_vec();
        let layout = {
            let mut headers = [ParsedHeader::EMPTY; 4];
            let mut req = ParsedRequest::new(&mut headers);
            let Status::Complete(head_len) = req.parse(&buf, 0).unwrap() else {
                panic!("partial");
            };
            req.layout(head_len)
        };
        buf.reserve(64 * 1024);

        assert_eq!(layout.method, Method::Put);
        assert_eq!(layout.head_len, buf.len() - 3);
        assert_eq!(layout.path_span.slice(&buf), Some(&b"/v1/write"[..]));
        let header = layout.headers[0].resolve(&buf).unwrap();
        assert_eq!(header.name, HeaderName::ContentLength);
        assert_eq!(header.value, b"3");
    }

    #[test]
    fn prior_len_incomplete_block() {
        let buf = b"GET / HTTP/1.1\r\nHost: a\r\n";
        let mut headers = [ParsedHeader::EMPTY; 4];
        let mut req = ParsedRequest::new(&mut headers);
        assert_eq!(req.parse(buf, 10), Ok(Status::Partial));
    }
}
