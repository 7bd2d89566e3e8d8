//! ヘッダーブロック終端の事前チェック
//!
//! 大きなヘッダーブロックを少しずつ送りつける相手 (slowloris) に対して、
//! 読み込みのたびに全体をパースし直さないためのチェック。

use memchr::memchr2;

use crate::error::ParseError;

use super::Status;

/// 連続する 2 つの改行 (CRLF または LF) を探す
///
/// 前回の長さ `prior_len` の 3 バイト手前から走査する。
/// 見つかればその直後の位置を返す。構文全体の妥当性までは保証しない。
pub fn is_complete(buf: &[u8], prior_len: usize) -> Result<Status<usize>, ParseError> {
    let mut pos = prior_len.saturating_sub(3);
    let mut line_ends = 0;
    loop {
        let Some(rest) = buf.get(pos..) else {
            return Ok(Status::Partial);
        };
        let Some(found) = memchr2(b'\r', b'\n', rest) else {
            return Ok(Status::Partial);
        };
        if found != 0 {
            line_ends = 0;
        }
        pos += found;
        if buf[pos] == b'\r' {
            match buf.get(pos + 1) {
                None => return Ok(Status::Partial),
                Some(b'\n') => pos += 2,
                Some(_) => return Err(ParseError::InvalidLineEnding),
            }
        } else {
            pos += 1;
        }
        line_ends += 1;
        if line_ends == 2 {
            return Ok(Status::Complete(pos));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_crlf() {
        let buf = b"HTTP/1.1 200 OK\r\nFoo: bar\r\n\r\n";
        assert_eq!(is_complete(buf, 1), Ok(Status::Complete(buf.len())));
    }

    #[test]
    fn bare_lf_and_mixed() {
        assert_eq!(is_complete(b"a\n\n", 1), Ok(Status::Complete(3)));
        assert_eq!(is_complete(b"a\r\n\n", 1), Ok(Status::Complete(4)));
        assert_eq!(is_complete(b"a\n\r\n", 1), Ok(Status::Complete(4)));
    }

    #[test]
    fn single_line_end_is_partial() {
        assert_eq!(is_complete(b"Foo: bar\r\n", 1), Ok(Status::Partial));
        assert_eq!(is_complete(b"Foo: bar\r\nBaz", 1), Ok(Status::Partial));
        assert_eq!(is_complete(b"Foo: bar\r\n\r", 1), Ok(Status::Partial));
    }

    #[test]
    fn non_terminator_resets_count() {
        assert_eq!(is_complete(b"a\r\nb\r\nc\r\n", 1), Ok(Status::Partial));
    }

    #[test]
    fn cr_without_lf() {
        assert_eq!(
            is_complete(b"Foo: bar\rX\r\n\r\n", 1),
            Err(ParseError::InvalidLineEnding)
        );
    }

    #[test]
    fn starts_three_bytes_before_prior_len() {
        let buf = b"HTTP/1.1 200 OK\r\nFoo: bar\r\n\r\n";
        // 直前の読み込みが "\r\n\r" まで届いていた場合
        let prior = buf.len() - 1;
        assert_eq!(is_complete(buf, prior), Ok(Status::Complete(buf.len())));
    }

    #[test]
    fn prior_len_beyond_buffer() {
        assert_eq!(is_complete(b"ab", 100), Ok(Status::Partial));
    }
}
