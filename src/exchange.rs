//! 同期 I/O の送受信ドライバー
//!
//! 接続済みのストリーム上でリクエスト/レスポンスを 1 つずつ送受信する。
//! 呼び出しは完了するまでブロックし、内部でスレッドを生成することはない。
//!
//! ヘッダー部は `ExchangeLimits::read_buffer_size` ずつ伸ばしながら読み、
//! 読むたびに前回の長さを渡してパースし直す。
//! ボディは Content-Length のバイト数だけ読むか、chunked をデコードする。

use std::io::{self, Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::chunked::ChunkedDecoder;
use crate::encoder::{encode_request_head, encode_response_head};
use crate::error::{Error, ParseError};
use crate::header::{HeaderName, HeaderSet};
use crate::limits::ExchangeLimits;
use crate::method::Method;
use crate::parser::{
    HeaderLayout, ParsedHeader, ParsedRequest, ParsedResponse, RequestLayout, ResponseLayout,
    Span, Status, resolve_headers,
};
use crate::request::Request;
use crate::response::Response;
use crate::status::StatusClass;

/// 送受信に使う接続済みストリーム
pub trait Transport: Read + Write {
    /// 以降の read/write に適用するタイムアウトを設定する (None で無期限)
    fn set_io_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn set_io_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)?;
        self.set_write_timeout(timeout)
    }
}

#[cfg(unix)]
impl Transport for UnixStream {
    fn set_io_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)?;
        self.set_write_timeout(timeout)
    }
}

/// ボディの区切り方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFraming {
    /// ボディなし
    Empty,
    /// Content-Length
    Length(usize),
    /// Transfer-Encoding: chunked
    Chunked,
}

/// リクエストを送信する
///
/// ヘッダー部は `write_buffer_size` の固定バッファにエンコードし、ヘッダー部と
/// ボディをそれぞれ 1 回の write で送る。書き込みが途中で終わった場合は
/// `Error::ShortWrite` を返す。
pub fn write_request<T: Transport + ?Sized>(
    stream: &mut T,
    request: &Request,
    limits: &ExchangeLimits,
) -> Result<(), Error> {
    stream.set_io_timeout(limits.timeout)?;

    let mut head = vec![0u8; limits.write_buffer_size];
    let head_len = encode_request_head(request, &mut head)?;
    debug!(
        "writing request: {} {} (head = {}, body = {})",
        request.method,
        request.path,
        head_len,
        request.body.len()
    );

    write_once(stream, &head[..head_len])?;
    write_once(stream, &request.body)?;
    stream.flush()?;
    Ok(())
}

/// レスポンスを送信する
pub fn write_response<T: Transport + ?Sized>(
    stream: &mut T,
    response: &Response,
    limits: &ExchangeLimits,
) -> Result<(), Error> {
    stream.set_io_timeout(limits.timeout)?;

    let mut head = vec![0u8; limits.write_buffer_size];
    let head_len = encode_response_head(response, &mut head)?;
    debug!(
        "writing response: {} (head = {}, body = {})",
        response.status,
        head_len,
        response.body.len()
    );

    write_once(stream, &head[..head_len])?;
    write_once(stream, &response.body)?;
    stream.flush()?;
    Ok(())
}

/// レスポンスを受信する
///
/// ヘッダー部が `max_head_size` に収まらない場合は `Error::HeadTooLarge` を返す。
pub fn read_response<T: Transport + ?Sized>(
    stream: &mut T,
    limits: &ExchangeLimits,
) -> Result<Response, Error> {
    read_response_inner(stream, limits, true)
}

/// リクエストを送信してレスポンスを受信する
///
/// HEAD リクエストに対するレスポンスのボディは読まない。
pub fn fetch<T: Transport + ?Sized>(
    stream: &mut T,
    request: &Request,
    limits: &ExchangeLimits,
) -> Result<Response, Error> {
    write_request(stream, request, limits)?;
    read_response_inner(stream, limits, request.method != Method::Head)
}

/// リクエストを受信する (サーバー側)
pub fn read_request<T: Transport + ?Sized>(
    stream: &mut T,
    limits: &ExchangeLimits,
) -> Result<Request, Error> {
    stream.set_io_timeout(limits.timeout)?;

    let (mut buf, layout): (Vec<u8>, RequestLayout) =
        read_head(stream, limits, |buf, prior_len| {
            let mut headers = vec![ParsedHeader::EMPTY; limits.max_headers];
            let mut request = ParsedRequest::new(&mut headers);
            let status = request.parse(buf, prior_len)?;
            if status.is_complete() && request.method == Method::Unknown {
                debug!(
                    "unknown request method: {:?}",
                    String::from_utf8_lossy(request.raw_method)
                );
            }
            Ok(status.map(|head_len| request.layout(head_len)))
        })?;

    let buffered = buf.split_off(layout.head_len);
    let parsed = resolve_layout(&layout.headers, &buf)?;
    let framing = body_framing(&parsed)?;
    let mut headers = HeaderSet::new();
    headers.extend_from_parsed(&parsed);
    let path = span_string(layout.path_span, &buf)?;
    debug!(
        "request head parsed: {} {} (head = {}, headers = {})",
        layout.method,
        path,
        layout.head_len,
        headers.len()
    );

    let body = read_body(stream, framing, buffered, limits)?;
    Ok(Request {
        method: layout.method,
        path,
        version: layout.version,
        headers,
        body,
    })
}

fn read_response_inner<T: Transport + ?Sized>(
    stream: &mut T,
    limits: &ExchangeLimits,
    expect_body: bool,
) -> Result<Response, Error> {
    stream.set_io_timeout(limits.timeout)?;

    let (mut buf, layout): (Vec<u8>, ResponseLayout) =
        read_head(stream, limits, |buf, prior_len| {
            let mut headers = vec![ParsedHeader::EMPTY; limits.max_headers];
            let mut response = ParsedResponse::new(&mut headers);
            let status = response.parse(buf, prior_len)?;
            Ok(status.map(|head_len| response.layout(head_len)))
        })?;

    let buffered = buf.split_off(layout.head_len);
    let parsed = resolve_layout(&layout.headers, &buf)?;
    let mut headers = HeaderSet::new();
    headers.extend_from_parsed(&parsed);
    let reason = span_string(layout.reason_span, &buf)?;
    debug!(
        "response head parsed: {} {} (head = {}, headers = {})",
        layout.status,
        reason,
        layout.head_len,
        headers.len()
    );

    // 1xx, 204, 304 と HEAD へのレスポンスはボディを持たない
    let has_body = expect_body
        && layout.status_class != StatusClass::Informational
        && layout.status != 204
        && layout.status != 304;
    let framing = if has_body {
        body_framing(&parsed)?
    } else {
        BodyFraming::Empty
    };

    let body = read_body(stream, framing, buffered, limits)?;
    Ok(Response {
        version: layout.version,
        status: layout.status,
        status_class: layout.status_class,
        reason,
        headers,
        body,
    })
}

/// ヘッダー部を終端まで読む
///
/// `parse` には読み込み済みのバッファと前回の長さを渡す。
/// 完了時はバッファ全体 (ボディの先頭を含みうる) とパース結果を返す。
fn read_head<T, L, F>(stream: &mut T, limits: &ExchangeLimits, mut parse: F) -> Result<(Vec<u8>, L), Error>
where
    T: Transport + ?Sized,
    F: FnMut(&[u8], usize) -> Result<Status<L>, ParseError>,
{
    let mut buf = Vec::with_capacity(limits.read_buffer_size.min(limits.max_head_size));
    loop {
        let prior_len = buf.len();
        if prior_len >= limits.max_head_size {
            warn!(
                "message head too large: {} >= {}",
                prior_len, limits.max_head_size
            );
            return Err(Error::HeadTooLarge {
                size: prior_len,
                limit: limits.max_head_size,
            });
        }

        let want = limits
            .read_buffer_size
            .max(1)
            .min(limits.max_head_size - prior_len);
        buf.resize(prior_len + want, 0);
        let n = match read_some(stream, &mut buf[prior_len..]) {
            Ok(n) => n,
            Err(e) => {
                buf.truncate(prior_len);
                return Err(e);
            }
        };
        buf.truncate(prior_len + n);
        trace!("head read: bytes = {}, total = {}", n, buf.len());

        match parse(&buf, prior_len) {
            Ok(Status::Complete(parsed)) => return Ok((buf, parsed)),
            Ok(Status::Partial) => {}
            Err(e) => {
                debug!("invalid http1 head: {e}");
                return Err(e.into());
            }
        }
    }
}

/// ヘッダーのレイアウトを受信バッファから引き直す
fn resolve_layout<'b>(
    layouts: &[HeaderLayout],
    buf: &'b [u8],
) -> Result<Vec<ParsedHeader<'b>>, Error> {
    resolve_headers(layouts, buf).ok_or_else(|| {
        let end = layouts
            .iter()
            .map(|l| l.name_span.end().max(l.value_span.end()))
            .max()
            .unwrap_or(0);
        warn!("header layout out of bounds: {} > {}", end, buf.len());
        Error::CorruptLayout {
            end,
            len: buf.len(),
        }
    })
}

fn span_string(span: Span, buf: &[u8]) -> Result<String, Error> {
    match span.slice(buf) {
        Some(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        None => {
            warn!("span out of bounds: {} > {}", span.end(), buf.len());
            Err(Error::CorruptLayout {
                end: span.end(),
                len: buf.len(),
            })
        }
    }
}

/// ボディを読む
///
/// `buffered` はヘッダー部と一緒に読み込まれたボディの先頭部分。
fn read_body<T: Transport + ?Sized>(
    stream: &mut T,
    framing: BodyFraming,
    mut buffered: Vec<u8>,
    limits: &ExchangeLimits,
) -> Result<Vec<u8>, Error> {
    match framing {
        BodyFraming::Empty => {
            if !buffered.is_empty() {
                debug!("ignoring {} bytes after message without body", buffered.len());
            }
            Ok(Vec::new())
        }
        BodyFraming::Length(declared) => {
            if declared > limits.max_body_size {
                warn!(
                    "body too large: {} > {}",
                    declared, limits.max_body_size
                );
                return Err(Error::BodyTooLarge {
                    size: declared,
                    limit: limits.max_body_size,
                });
            }
            if buffered.len() > declared {
                warn!(
                    "buffered body exceeds Content-Length: {} > {}",
                    buffered.len(),
                    declared
                );
                return Err(Error::BodyOverrun {
                    buffered: buffered.len(),
                    declared,
                });
            }

            // 宣言値ではなく実際に届いた分だけバッファを伸ばす
            while buffered.len() < declared {
                let start = buffered.len();
                let want = (declared - start).min(limits.read_buffer_size.max(1));
                buffered.resize(start + want, 0);
                let n = read_some(stream, &mut buffered[start..])?;
                buffered.truncate(start + n);
                trace!(
                    "body read: bytes = {}, remaining = {}",
                    n,
                    declared - buffered.len()
                );
            }
            Ok(buffered)
        }
        BodyFraming::Chunked => {
            let mut decoder = ChunkedDecoder::new().consume_trailer(true);
            let mut body = Vec::new();
            let mut pending = buffered;
            loop {
                let mut len = pending.len();
                let status = decoder.decode(&mut pending, &mut len)?;
                body.extend_from_slice(&pending[..len]);
                if body.len() > limits.max_body_size {
                    warn!(
                        "body too large: {} > {}",
                        body.len(),
                        limits.max_body_size
                    );
                    return Err(Error::BodyTooLarge {
                        size: body.len(),
                        limit: limits.max_body_size,
                    });
                }
                if let Status::Complete(rest) = status {
                    if rest != 0 {
                        debug!("ignoring {} bytes after chunked body", rest);
                    }
                    return Ok(body);
                }

                pending.resize(limits.read_buffer_size.max(1), 0);
                let n = read_some(stream, &mut pending)?;
                pending.truncate(n);
                trace!("chunked read: bytes = {}, decoded = {}", n, body.len());
            }
        }
    }
}

/// Content-Length / Transfer-Encoding からボディの区切り方を決める
///
/// chunked 以外の Transfer-Encoding、値の異なる複数の Content-Length、
/// 両方の指定はエラーにする。
fn body_framing(headers: &[ParsedHeader<'_>]) -> Result<BodyFraming, Error> {
    let mut chunked = false;
    let mut content_length: Option<usize> = None;

    for header in headers {
        match header.name {
            HeaderName::TransferEncoding => {
                for token in header.value.split(|&b| b == b',') {
                    let token = token.trim_ascii();
                    if !token.eq_ignore_ascii_case(b"chunked") {
                        return Err(Error::InvalidTransferEncoding(
                            String::from_utf8_lossy(token).into_owned(),
                        ));
                    }
                    if chunked {
                        return Err(Error::InvalidTransferEncoding(
                            "duplicate chunked".to_string(),
                        ));
                    }
                    chunked = true;
                }
            }
            HeaderName::ContentLength => {
                let parsed = parse_content_length(header.value)?;
                match content_length {
                    Some(prev) if prev != parsed => {
                        warn!("multiple Content-Length values found: [{}, {}]", prev, parsed);
                        return Err(Error::InvalidContentLength(
                            "mismatched values".to_string(),
                        ));
                    }
                    _ => content_length = Some(parsed),
                }
            }
            _ => {}
        }
    }

    match (chunked, content_length) {
        (true, Some(_)) => Err(Error::InvalidTransferEncoding(
            "both Transfer-Encoding and Content-Length".to_string(),
        )),
        (true, None) => Ok(BodyFraming::Chunked),
        (false, Some(0)) | (false, None) => Ok(BodyFraming::Empty),
        (false, Some(len)) => Ok(BodyFraming::Length(len)),
    }
}

/// Content-Length 値をパース (10 進数のみ)
fn parse_content_length(value: &[u8]) -> Result<usize, Error> {
    let invalid = || Error::InvalidContentLength(String::from_utf8_lossy(value).into_owned());
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    value.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(usize::from(d - b'0')))
            .ok_or_else(invalid)
    })
}

/// 1 回の write で全バイトを書き込む
fn write_once<T: Transport + ?Sized>(stream: &mut T, bytes: &[u8]) -> Result<(), Error> {
    if bytes.is_empty() {
        return Ok(());
    }
    let written = loop {
        match stream.write(bytes) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("write failed: {e}");
                return Err(e.into());
            }
        }
    };
    trace!("write: bytes = {}, expected = {}", written, bytes.len());
    if written != bytes.len() {
        warn!("short write: {} < {}", written, bytes.len());
        return Err(Error::ShortWrite {
            written,
            expected: bytes.len(),
        });
    }
    Ok(())
}

/// 1 回の read (0 バイトは相手の切断)
fn read_some<T: Transport + ?Sized>(stream: &mut T, buf: &mut [u8]) -> Result<usize, Error> {
    loop {
        match stream.read(buf) {
            Ok(0) => {
                warn!("connection closed by peer");
                return Err(Error::PeerClosed);
            }
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("read failed: {e}");
                return Err(e.into());
            }
        }
    }
}
