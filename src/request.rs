use crate::header::{HeaderName, HeaderSet};
use crate::method::Method;
use crate::version::Version;

/// HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP メソッド
    pub method: Method,
    /// リクエストパス
    pub path: String,
    /// HTTP バージョン (デフォルト: HTTP/1.1)
    pub version: Version,
    /// ヘッダー
    pub headers: HeaderSet,
    /// ボディ
    pub body: Vec<u8>,
}

impl Request {
    /// 新しいリクエストを作成 (HTTP/1.1)
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            version: Version::Http11,
            headers: HeaderSet::new(),
            body: Vec::new(),
        }
    }

    /// カスタムバージョンでリクエストを作成
    pub fn with_version(method: Method, path: &str, version: Version) -> Self {
        Self {
            version,
            ..Self::new(method, path)
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    ///
    /// 同じ名前のヘッダーがあれば値を置き換える。
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// ヘッダーを追加
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.append(name, value);
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// ヘッダーが存在するか確認
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// Content-Length ヘッダーの値を取得
    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get_known(HeaderName::ContentLength)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Connection ヘッダーの値を取得
    pub fn connection(&self) -> Option<&str> {
        self.headers.get_known(HeaderName::Connection)
    }

    /// キープアライブ接続かどうかを判定
    ///
    /// HTTP/1.1 ではデフォルトでキープアライブ
    /// HTTP/1.0 では Connection: keep-alive が必要
    pub fn is_keep_alive(&self) -> bool {
        let mut has_keep_alive = false;
        if let Some(value) = self.connection() {
            for token in value.split(',') {
                let token = token.trim();
                if token.eq_ignore_ascii_case("close") {
                    return false;
                }
                if token.eq_ignore_ascii_case("keep-alive") {
                    has_keep_alive = true;
                }
            }
        }
        has_keep_alive || self.version == Version::Http11
    }
}
