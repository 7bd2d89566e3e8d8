//! ヘッダーブロックのパーサー

use crate::error::ParseError;
use crate::header::HeaderName;

use super::complete::is_complete;
use super::token::{get_token_to_eol, parse_line_end, parse_token};
use super::{ParsedHeader, Span, Status};

/// 空行までのヘッダーを `headers` に詰める
///
/// 読み取ったヘッダー数は `count` に加算する。ヘッダー数が `headers.len()` を
/// 超える場合はエラーにし、黙って切り捨てることはしない。
///
/// 空白で始まる行 (obs-fold) は前の行に連結しない。名前が空の未知ヘッダーとして扱う。
pub(crate) fn parse_header_block<'b>(
    buf: &'b [u8],
    mut pos: usize,
    headers: &mut [ParsedHeader<'b>],
    count: &mut usize,
) -> Result<Status<usize>, ParseError> {
    loop {
        match buf.get(pos) {
            None => return Ok(Status::Partial),
            Some(b'\r' | b'\n') => return parse_line_end(buf, pos),
            Some(_) => {}
        }

        if *count == headers.len() {
            return Err(ParseError::TooManyHeaders {
                limit: headers.len(),
            });
        }

        let (name, name_span) = if *count != 0 && matches!(buf[pos], b' ' | b'\t') {
            (HeaderName::Unknown, Span::new(pos, pos))
        } else {
            // コロン前の空白は読み飛ばさない (トークンエラーになる)
            let name_end = complete!(parse_token(buf, pos, b':')?);
            if name_end == pos {
                return Err(ParseError::EmptyHeaderName);
            }
            let span = Span::new(pos, name_end);
            pos = name_end + 1;
            loop {
                match buf.get(pos) {
                    None => return Ok(Status::Partial),
                    Some(b' ' | b'\t') => pos += 1,
                    Some(_) => break,
                }
            }
            (HeaderName::lookup(&buf[span.offset..span.end()]), span)
        };

        let (line_end, next) = complete!(get_token_to_eol(buf, pos)?);
        let mut value_end = line_end;
        while value_end > pos && matches!(buf[value_end - 1], b' ' | b'\t') {
            value_end -= 1;
        }

        headers[*count] = ParsedHeader {
            name,
            raw_name: &buf[name_span.offset..name_span.end()],
            value: &buf[pos..value_end],
            name_span,
            value_span: Span::new(pos, value_end),
        };
        *count += 1;
        pos = next;
    }
}

/// ヘッダーブロックだけをパースする
///
/// 成功時は `(消費バイト数, ヘッダー数)` を返す。`prior_len` が 0 以外なら
/// 先に終端の有無だけを確認する。
pub fn parse_headers<'b>(
    buf: &'b [u8],
    headers: &mut [ParsedHeader<'b>],
    prior_len: usize,
) -> Result<Status<(usize, usize)>, ParseError> {
    if prior_len != 0 {
        complete!(is_complete(buf, prior_len)?);
    }
    let mut count = 0;
    let consumed = complete!(parse_header_block(buf, 0, headers, &mut count)?);
    Ok(Status::Complete((consumed, count)))
}
