//! chunked 転送符号化のデコーダー
//!
//! 入力バッファ上でチャンクサイズ行とトレーラーを取り除き、
//! デコード済みのデータをバッファ先頭に詰める。
//! 状態は呼び出しをまたいで保持されるため、1 つのストリームにつき 1 つ用意すること。
//!
//! ```rust
//! use ncollectd_http::{ChunkedDecoder, Status};
//!
//! let mut buf = b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n".to_vec();
//! let mut decoder = ChunkedDecoder::new().consume_trailer(true);
//! let mut len = buf.len();
//! let status = decoder.decode(&mut buf, &mut len).unwrap();
//! assert_eq!(status, Status::Complete(0));
//! assert_eq!(&buf[..len], b"hello world");
//! ```

use memchr::memchr;

use crate::error::ParseError;
use crate::parser::Status;

// usize に収まる 16 進数の最大桁数
const MAX_HEX_DIGITS: u8 = (std::mem::size_of::<usize>() * 2) as u8;

/// デコーダーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkedState {
    /// チャンクサイズ (16 進数)
    #[default]
    ChunkSize,
    /// チャンク拡張 (LF まで読み飛ばす)
    ChunkExt,
    /// チャンクデータ
    ChunkData,
    /// チャンクデータ後の CRLF
    ChunkCrlf,
    /// トレーラー行の先頭
    TrailersLineHead,
    /// トレーラー行の途中
    TrailersLineMiddle,
}

/// chunked デコーダー
#[derive(Debug, Clone, Default)]
pub struct ChunkedDecoder {
    bytes_left_in_chunk: usize,
    consume_trailer: bool,
    hex_count: u8,
    state: ChunkedState,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 終端チャンク後のトレーラーと空行まで読み取るか (デフォルト: false)
    ///
    /// false の場合は終端チャンクの行で完了し、残りは未処理バイトとして返す。
    pub fn consume_trailer(mut self, consume: bool) -> Self {
        self.consume_trailer = consume;
        self
    }

    pub fn state(&self) -> ChunkedState {
        self.state
    }

    /// 現在のチャンクの残りバイト数
    pub fn bytes_left_in_chunk(&self) -> usize {
        self.bytes_left_in_chunk
    }

    /// チャンクデータの途中か
    pub fn is_in_data(&self) -> bool {
        self.state == ChunkedState::ChunkData
    }

    /// `buf[..*len]` をデコードする
    ///
    /// デコード済みのデータは `buf[..*len]` に詰め直される。
    ///
    /// - `Ok(Status::Complete(n))`: ボディ終端に到達。`n` は終端より後ろの未処理バイト数で、
    ///   `buf[*len..*len + n]` に置かれる
    /// - `Ok(Status::Partial)`: 入力が足りない
    /// - `Err(_)`: 不正なチャンク形式
    pub fn decode(&mut self, buf: &mut [u8], len: &mut usize) -> Result<Status<usize>, ParseError> {
        let bufsz = *len;
        if bufsz > buf.len() {
            return Err(ParseError::CorruptDecoder);
        }
        let mut src = 0;
        let mut dst = 0;
        let result = self.decode_inner(buf, bufsz, &mut src, &mut dst);
        if dst != src {
            buf.copy_within(src..bufsz, dst);
        }
        *len = dst;
        result
    }

    /// `Vec` をデコードし、デコード済みの長さに切り詰める
    ///
    /// ボディ終端より後ろの未処理バイトは破棄する。残す必要がある場合は `decode` を使う。
    pub fn decode_vec(&mut self, buf: &mut Vec<u8>) -> Result<Status<usize>, ParseError> {
        let mut len = buf.len();
        let result = self.decode(buf.as_mut_slice(), &mut len);
        buf.truncate(len);
        result
    }

    fn decode_inner(
        &mut self,
        buf: &mut [u8],
        bufsz: usize,
        src: &mut usize,
        dst: &mut usize,
    ) -> Result<Status<usize>, ParseError> {
        loop {
            match self.state {
                ChunkedState::ChunkSize => {
                    loop {
                        let Some(&b) = buf[..bufsz].get(*src) else {
                            return Ok(Status::Partial);
                        };
                        let Some(v) = decode_hex(b) else {
                            if self.hex_count == 0 {
                                return Err(ParseError::InvalidChunkSize);
                            }
                            break;
                        };
                        if self.hex_count == MAX_HEX_DIGITS {
                            return Err(ParseError::ChunkSizeOverflow);
                        }
                        self.bytes_left_in_chunk = (self.bytes_left_in_chunk << 4) | usize::from(v);
                        self.hex_count += 1;
                        *src += 1;
                    }
                    self.hex_count = 0;
                    self.state = ChunkedState::ChunkExt;
                }
                ChunkedState::ChunkExt => {
                    // 拡張は解釈しない
                    let Some(i) = memchr(b'\n', &buf[*src..bufsz]) else {
                        *src = bufsz;
                        return Ok(Status::Partial);
                    };
                    *src += i + 1;
                    if self.bytes_left_in_chunk == 0 {
                        if self.consume_trailer {
                            self.state = ChunkedState::TrailersLineHead;
                            continue;
                        }
                        return Ok(Status::Complete(bufsz - *src));
                    }
                    self.state = ChunkedState::ChunkData;
                }
                ChunkedState::ChunkData => {
                    let n = (bufsz - *src).min(self.bytes_left_in_chunk);
                    if *dst != *src {
                        buf.copy_within(*src..*src + n, *dst);
                    }
                    *src += n;
                    *dst += n;
                    self.bytes_left_in_chunk -= n;
                    if self.bytes_left_in_chunk != 0 {
                        return Ok(Status::Partial);
                    }
                    self.state = ChunkedState::ChunkCrlf;
                }
                ChunkedState::ChunkCrlf => {
                    skip_cr(buf, bufsz, src);
                    match buf[..bufsz].get(*src) {
                        None => return Ok(Status::Partial),
                        Some(b'\n') => *src += 1,
                        Some(_) => return Err(ParseError::InvalidChunkTerminator),
                    }
                    self.state = ChunkedState::ChunkSize;
                }
                ChunkedState::TrailersLineHead => {
                    skip_cr(buf, bufsz, src);
                    let Some(&b) = buf[..bufsz].get(*src) else {
                        return Ok(Status::Partial);
                    };
                    *src += 1;
                    if b == b'\n' {
                        return Ok(Status::Complete(bufsz - *src));
                    }
                    self.state = ChunkedState::TrailersLineMiddle;
                }
                ChunkedState::TrailersLineMiddle => {
                    let Some(i) = memchr(b'\n', &buf[*src..bufsz]) else {
                        *src = bufsz;
                        return Ok(Status::Partial);
                    };
                    *src += i + 1;
                    self.state = ChunkedState::TrailersLineHead;
                }
            }
        }
    }
}

fn skip_cr(buf: &[u8], bufsz: usize, src: &mut usize) {
    while *src < bufsz && buf[*src] == b'\r' {
        *src += 1;
    }
}

fn decode_hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
