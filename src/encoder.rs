//! リクエスト/レスポンスのエンコーダー
//!
//! ヘッダー部は固定長バッファにも `Vec<u8>` にも書き込める。
//! Content-Length は常にボディ長から自動で付与し、
//! ヘッダーセットに含まれる Content-Length は出力しない。

use crate::error::Error;
use crate::header::{HeaderName, HeaderSet};
use crate::parser::is_token_char;
use crate::request::Request;
use crate::response::Response;
use crate::status::StatusCode;

/// ヘッダー部の書き込み先
trait HeadSink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

impl HeadSink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// 固定長バッファへの書き込み
struct FixedWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl HeadSink for FixedWriter<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.pos + bytes.len();
        let Some(dst) = self.buf.get_mut(self.pos..end) else {
            return Err(Error::WriteBufferOverflow {
                size: end,
                limit: self.buf.len(),
            });
        };
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

fn put_line<S: HeadSink>(sink: &mut S, parts: &[&[u8]]) -> Result<(), Error> {
    for part in parts {
        sink.put(part)?;
    }
    sink.put(b"\r\n")
}

fn validate_path(path: &str) -> Result<(), Error> {
    let valid = !path.is_empty() && path.bytes().all(|b| b > b' ' && b != 0x7f);
    if !valid {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn is_valid_value_byte(b: u8) -> bool {
    b == b'\t' || (b' '..=b'~').contains(&b) || b >= 0x80
}

fn write_headers<S: HeadSink>(sink: &mut S, headers: &HeaderSet, body_len: usize) -> Result<(), Error> {
    for header in headers {
        if header.name() == HeaderName::ContentLength {
            continue;
        }
        let name = header.name_str();
        if !header.name().is_known() && (name.is_empty() || !name.bytes().all(is_token_char)) {
            return Err(Error::InvalidHeaderName(name.to_string()));
        }
        if !header.value().bytes().all(is_valid_value_byte) {
            return Err(Error::InvalidHeaderValue(name.to_string()));
        }
        put_line(sink, &[name.as_bytes(), b": ", header.value().as_bytes()])?;
    }
    let content_length = body_len.to_string();
    put_line(
        sink,
        &[b"Content-Length: ", content_length.as_bytes()],
    )?;
    sink.put(b"\r\n")
}

fn write_request_head<S: HeadSink>(sink: &mut S, request: &Request) -> Result<(), Error> {
    let method = request.method.as_str().ok_or(Error::UnknownMethod)?;
    let version = request.version.as_str().ok_or(Error::UnknownVersion)?;
    validate_path(&request.path)?;

    // Request line: METHOD SP PATH SP VERSION CRLF
    put_line(
        sink,
        &[
            method.as_bytes(),
            b" ",
            request.path.as_bytes(),
            b" ",
            version.as_bytes(),
        ],
    )?;
    write_headers(sink, &request.headers, request.body.len())
}

fn write_response_head<S: HeadSink>(sink: &mut S, response: &Response) -> Result<(), Error> {
    let version = response.version.as_str().ok_or(Error::UnknownVersion)?;
    let status = StatusCode::from_u16(response.status).ok_or(Error::UnknownStatus(response.status))?;

    // Status line: VERSION SP STATUS-CODE SP REASON-PHRASE CRLF
    let code = status.as_u16().to_string();
    put_line(
        sink,
        &[
            version.as_bytes(),
            b" ",
            code.as_bytes(),
            b" ",
            status.reason().as_bytes(),
        ],
    )?;
    write_headers(sink, &response.headers, response.body.len())
}

/// リクエストのヘッダー部を固定長バッファにエンコードし、書き込んだバイト数を返す
///
/// 収まらない場合は `Error::WriteBufferOverflow`。
pub fn encode_request_head(request: &Request, buf: &mut [u8]) -> Result<usize, Error> {
    let mut writer = FixedWriter { buf, pos: 0 };
    write_request_head(&mut writer, request)?;
    Ok(writer.pos)
}

/// レスポンスのヘッダー部を固定長バッファにエンコードし、書き込んだバイト数を返す
pub fn encode_response_head(response: &Response, buf: &mut [u8]) -> Result<usize, Error> {
    let mut writer = FixedWriter { buf, pos: 0 };
    write_response_head(&mut writer, response)?;
    Ok(writer.pos)
}

/// リクエストをエンコード (ヘッダー部 + ボディ)
pub fn encode_request(request: &Request) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_request_head(&mut buf, request)?;
    buf.extend_from_slice(&request.body);
    Ok(buf)
}

/// レスポンスをエンコード (ヘッダー部 + ボディ)
pub fn encode_response(response: &Response) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_response_head(&mut buf, response)?;
    buf.extend_from_slice(&response.body);
    Ok(buf)
}

impl Request {
    /// リクエストをバイト列にエンコード
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        encode_request(self)
    }
}

impl Response {
    /// レスポンスをバイト列にエンコード
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        encode_response(self)
    }
}

/// Chunked Transfer Encoding 用のチャンクをエンコード
///
/// 空のデータを渡すと終端チャンク (0\r\n\r\n) を生成する。
pub fn encode_chunk(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(data.len() + 20);
    push_chunk(&mut buf, data);
    if data.is_empty() {
        buf.extend_from_slice(b"\r\n");
    }
    buf
}

/// 複数のデータを chunked 形式でエンコードし、終端チャンクを追加する
///
/// 空のデータは終端と区別できないため読み飛ばす。
pub fn encode_chunks(chunks: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();
    for chunk in chunks.iter().filter(|c| !c.is_empty()) {
        push_chunk(&mut buf, chunk);
    }
    buf.extend_from_slice(b"0\r\n\r\n");
    buf
}

fn push_chunk(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
    if !data.is_empty() {
        buf.extend_from_slice(b"\r\n");
    }
}
