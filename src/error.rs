use std::io;

use thiserror::Error;

use crate::parser::PARTIAL_CODE;

/// 不正な入力 (メッセージ単位で致命的)
///
/// パーサーはこのエラーを返した時点でそのメッセージの処理を打ち切る。
/// バイトを読み飛ばして回復することはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// トークン文字以外のバイト
    #[error("invalid token character: 0x{0:02x}")]
    InvalidToken(u8),
    /// CR の直後が LF ではない
    #[error("invalid line ending: CR without LF")]
    InvalidLineEnding,
    /// 許可されていない制御文字
    #[error("invalid control character: 0x{0:02x}")]
    ControlCharacter(u8),
    /// HTTP-version が `HTTP/1.x` ではない
    #[error("invalid HTTP version")]
    InvalidVersion,
    /// ステータスコードが 3 桁の数字ではない
    #[error("invalid status code")]
    InvalidStatusCode,
    /// ステータスコード直後に空白以外の文字
    #[error("invalid status line: garbage after status code")]
    InvalidStatusLine,
    /// メソッドが空
    #[error("empty method")]
    EmptyMethod,
    /// パスが空
    #[error("empty path")]
    EmptyPath,
    /// ヘッダー名が空
    #[error("empty header name")]
    EmptyHeaderName,
    /// ヘッダー数超過
    #[error("too many headers: limit {limit}")]
    TooManyHeaders { limit: usize },
    /// チャンクサイズが 16 進数ではない
    #[error("invalid chunk size")]
    InvalidChunkSize,
    /// チャンクサイズの桁数が usize に収まらない
    #[error("chunk size overflow")]
    ChunkSizeOverflow,
    /// チャンクデータの後に改行がない
    #[error("invalid chunk terminator")]
    InvalidChunkTerminator,
    /// chunked デコーダーの内部状態が壊れている
    #[error("chunked decoder is corrupt")]
    CorruptDecoder,
}

impl ParseError {
    /// C 互換の戻り値 (-1)
    pub fn code(&self) -> isize {
        -1
    }
}

/// 送受信処理のエラー
#[derive(Debug, Error)]
pub enum Error {
    /// 受信したメッセージが不正
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// read/write システムコールの失敗
    #[error("I/O error: {0}")]
    Io(io::Error),
    /// write が全バイトを書き込めなかった
    #[error("short write: {written} < {expected}")]
    ShortWrite { written: usize, expected: usize },
    /// 相手が接続を閉じた (0 バイト読み取り)
    #[error("connection closed by peer")]
    PeerClosed,
    /// I/O タイムアウト
    #[error("I/O timeout")]
    Timeout,
    /// ヘッダーブロックが固定バッファに収まらない
    #[error("message head too large: {size} > {limit}")]
    HeadTooLarge { size: usize, limit: usize },
    /// エンコードしたヘッダー部が送信用の固定バッファに収まらない
    #[error("message head exceeds write buffer: {size} > {limit}")]
    WriteBufferOverflow { size: usize, limit: usize },
    /// パース結果の位置情報が受信バッファの範囲外を指している
    #[error("parsed layout out of buffer bounds: {end} > {len}")]
    CorruptLayout { end: usize, len: usize },
    /// ボディサイズ超過
    #[error("body too large: {size} > {limit}")]
    BodyTooLarge { size: usize, limit: usize },
    /// 受信済みのボディが Content-Length を超えている
    #[error("buffered body exceeds Content-Length: {buffered} > {declared}")]
    BodyOverrun { buffered: usize, declared: usize },
    /// Content-Length が 10 進数ではない
    #[error("invalid Content-Length: {0}")]
    InvalidContentLength(String),
    /// 送信できないメソッド
    #[error("unknown method")]
    UnknownMethod,
    /// 送信できない HTTP バージョン
    #[error("unknown HTTP version")]
    UnknownVersion,
    /// 空白や制御文字を含むパス
    #[error("invalid request path: {0:?}")]
    InvalidPath(String),
    /// 理由フレーズ表にないステータスコード
    #[error("unknown status code: {0}")]
    UnknownStatus(u16),
    /// Transfer-Encoding が chunked 単独ではない
    #[error("invalid Transfer-Encoding: {0}")]
    InvalidTransferEncoding(String),
    /// トークンとして不正なヘッダー名
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),
    /// 改行や制御文字を含むヘッダー値
    #[error("invalid header value for {0:?}")]
    InvalidHeaderValue(String),
}

impl Error {
    /// C 互換の戻り値
    ///
    /// 受信したヘッダーブロックが長すぎる場合のみ -2、それ以外は -1。
    /// 送信側のバッファ不足は -1 になる。
    pub fn code(&self) -> isize {
        match self {
            Error::HeadTooLarge { .. } => PARTIAL_CODE,
            _ => -1,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
            io::ErrorKind::UnexpectedEof => Error::PeerClosed,
            _ => Error::Io(e),
        }
    }
}
