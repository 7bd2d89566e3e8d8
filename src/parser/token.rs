//! トークン、行、バージョンのパーサー
//!
//! すべて `buf` 先頭からの位置で動作し、バッファをコピーしない。

use crate::error::ParseError;
use crate::version::Version;

use super::Status;
use super::scanner::{ByteRanges, find_outside};

// `|` と `~` は区間数の上限に収まらないため is_token_char 側で判定する
static TOKEN_FAST: ByteRanges = ByteRanges::new(&[
    (b'!', b'!'),
    (b'#', b'\''),
    (b'*', b'+'),
    (b'-', b'.'),
    (b'0', b'9'),
    (b'A', b'Z'),
    (b'^', b'z'),
]);

// HTAB, SP から DEL の手前まで, MSB が立っているバイト
static EOL_FAST: ByteRanges = ByteRanges::new(&[(b'\t', b'\t'), (0x20, 0x7e), (0x80, 0xff)]);

// SP と制御文字と DEL 以外
static PATH_FAST: ByteRanges = ByteRanges::new(&[(0x21, 0x7e), (0x80, 0xff)]);

/// RFC 7230 tchar
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// `stop` が現れるまでトークン文字を読み進め、`stop` の位置を返す
pub(crate) fn parse_token(buf: &[u8], start: usize, stop: u8) -> Result<Status<usize>, ParseError> {
    let Some(rest) = buf.get(start..) else {
        return Ok(Status::Partial);
    };
    let mut pos = start + find_outside(rest, &TOKEN_FAST);
    loop {
        let Some(&b) = buf.get(pos) else {
            return Ok(Status::Partial);
        };
        if b == stop {
            return Ok(Status::Complete(pos));
        }
        if !is_token_char(b) {
            return Err(ParseError::InvalidToken(b));
        }
        pos += 1;
    }
}

/// 行末までを値として読み取る
///
/// 成功時は `(値の終端, 次の行の先頭)` を返す。改行 (CRLF / LF) は値に含めない。
pub(crate) fn get_token_to_eol(
    buf: &[u8],
    start: usize,
) -> Result<Status<(usize, usize)>, ParseError> {
    let Some(rest) = buf.get(start..) else {
        return Ok(Status::Partial);
    };
    let pos = start + find_outside(rest, &EOL_FAST);
    match buf.get(pos) {
        None => Ok(Status::Partial),
        Some(b'\r') => match buf.get(pos + 1) {
            None => Ok(Status::Partial),
            Some(b'\n') => Ok(Status::Complete((pos, pos + 2))),
            Some(_) => Err(ParseError::InvalidLineEnding),
        },
        Some(b'\n') => Ok(Status::Complete((pos, pos + 1))),
        Some(&b) => Err(ParseError::ControlCharacter(b)),
    }
}

/// パス (SP で終わる印字可能文字列) を読み取り、終端の SP の位置を返す
pub(crate) fn parse_path(buf: &[u8], start: usize) -> Result<Status<usize>, ParseError> {
    let Some(rest) = buf.get(start..) else {
        return Ok(Status::Partial);
    };
    let pos = start + find_outside(rest, &PATH_FAST);
    match buf.get(pos) {
        None => Ok(Status::Partial),
        Some(b' ') => Ok(Status::Complete(pos)),
        Some(&b) => Err(ParseError::ControlCharacter(b)),
    }
}

/// `HTTP/1.x` を読み取り、`(バージョン, マイナーバージョン, 次の位置)` を返す
///
/// 判定には直後の 1 バイトを含む 9 バイトが必要。
pub(crate) fn parse_http_version(
    buf: &[u8],
    start: usize,
) -> Result<Status<(Version, u8, usize)>, ParseError> {
    let Some(rest) = buf.get(start..) else {
        return Ok(Status::Partial);
    };
    if rest.len() < 9 {
        return Ok(Status::Partial);
    }
    if &rest[..7] != b"HTTP/1." {
        return Err(ParseError::InvalidVersion);
    }
    let digit = rest[7];
    if !digit.is_ascii_digit() {
        return Err(ParseError::InvalidVersion);
    }
    let minor = digit - b'0';
    Ok(Status::Complete((Version::from_minor(minor), minor, start + 8)))
}

/// CRLF または LF を読み取り、次の行の先頭を返す
pub(crate) fn parse_line_end(buf: &[u8], pos: usize) -> Result<Status<usize>, ParseError> {
    match buf.get(pos) {
        None => Ok(Status::Partial),
        Some(b'\r') => match buf.get(pos + 1) {
            None => Ok(Status::Partial),
            Some(b'\n') => Ok(Status::Complete(pos + 2)),
            Some(_) => Err(ParseError::InvalidLineEnding),
        },
        Some(b'\n') => Ok(Status::Complete(pos + 1)),
        Some(_) => Err(ParseError::InvalidLineEnding),
    }
}

/// SP の並びを読み飛ばす (`pos` の次のバイトから)
pub(crate) fn skip_spaces_after(buf: &[u8], mut pos: usize) -> Status<usize> {
    loop {
        pos += 1;
        match buf.get(pos) {
            None => return Status::Partial,
            Some(b' ') => {}
            Some(_) => return Status::Complete(pos),
        }
    }
}
