use std::time::Duration;

/// 送受信処理の制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeLimits {
    /// 1 回の read で確保するバッファ量 (デフォルト: 4KB)
    pub read_buffer_size: usize,
    /// ヘッダーブロックの最大サイズ (デフォルト: 4KB)
    ///
    /// この大きさまで読んでもヘッダーが終端しない場合は HeadTooLarge を返す。
    pub max_head_size: usize,
    /// 最大ヘッダー数 (デフォルト: 32)
    pub max_headers: usize,
    /// リクエスト/レスポンスのヘッダーをエンコードする固定バッファ (デフォルト: 4KB)
    pub write_buffer_size: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    pub max_body_size: usize,
    /// read/write ごとのタイムアウト (デフォルト: なし)
    pub timeout: Option<Duration>,
}

impl Default for ExchangeLimits {
    fn default() -> Self {
        Self {
            read_buffer_size: 4 * 1024,  // 4KB
            max_head_size: 4 * 1024,     // 4KB
            max_headers: 32,
            write_buffer_size: 4 * 1024,     // 4KB
            max_body_size: 10 * 1024 * 1024, // 10MB
            timeout: None,
        }
    }
}

impl ExchangeLimits {
    /// サーバー側 (リクエスト受信) 向けの設定を作成
    ///
    /// ヘッダーブロックは 64KB まで受け付ける。
    pub fn server() -> Self {
        Self {
            max_head_size: 64 * 1024, // 64KB
            ..Self::default()
        }
    }

    /// 制限なしの設定を作成
    ///
    /// ヘッダー配列と書き込みバッファは事前に確保するためデフォルトのまま。
    pub fn unlimited() -> Self {
        Self {
            max_head_size: usize::MAX,
            max_body_size: usize::MAX,
            ..Self::default()
        }
    }

    /// タイムアウトを設定
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
