use crate::header::{HeaderName, HeaderSet};
use crate::status::{StatusClass, StatusCode};
use crate::version::Version;

/// HTTP レスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP バージョン
    pub version: Version,
    /// ステータスコード (200, 404, etc.)
    pub status: u16,
    /// ステータスクラス
    pub status_class: StatusClass,
    /// 理由フレーズ
    ///
    /// 受信したレスポンスでは受信したままの値。送信時は参照せず、
    /// ステータスコード表の理由フレーズを使う。
    pub reason: String,
    /// ヘッダー
    pub headers: HeaderSet,
    /// ボディ
    pub body: Vec<u8>,
}

impl Response {
    /// 新しいレスポンスを作成 (HTTP/1.1)
    pub fn new(status: u16) -> Self {
        Self::with_version(Version::Http11, status)
    }

    /// カスタムバージョンでレスポンスを作成
    pub fn with_version(version: Version, status: u16) -> Self {
        Self {
            version,
            status,
            status_class: StatusClass::from_code(status),
            reason: StatusCode::from_u16(status)
                .map(|s| s.reason().to_string())
                .unwrap_or_default(),
            headers: HeaderSet::new(),
            body: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
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

    /// 標準ステータスコード (表にない場合は None)
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status)
    }

    /// ステータスコードが情報レスポンス (1xx) か確認
    pub fn is_informational(&self) -> bool {
        self.status_class == StatusClass::Informational
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        self.status_class == StatusClass::Success
    }

    /// ステータスコードがリダイレクト (3xx) か確認
    pub fn is_redirect(&self) -> bool {
        self.status_class == StatusClass::Redirection
    }

    /// ステータスコードがクライアントエラー (4xx) か確認
    pub fn is_client_error(&self) -> bool {
        self.status_class == StatusClass::ClientError
    }

    /// ステータスコードがサーバーエラー (5xx) か確認
    pub fn is_server_error(&self) -> bool {
        self.status_class == StatusClass::ServerError
    }

    /// Content-Length ヘッダーの値を取得
    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get_known(HeaderName::ContentLength)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Content-Type ヘッダーの値を取得
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_known(HeaderName::ContentType)
    }
}
