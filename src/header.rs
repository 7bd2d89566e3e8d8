//! ヘッダー名表とヘッダーセット
//!
//! 既知のヘッダー名は静的な表で大文字小文字を区別せずに解決する。
//! 表にない名前は Unknown となり、生の名前を別に保持する。

use std::fmt;

use crate::parser::ParsedHeader;

/// 既知のヘッダー名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderName {
    #[default]
    Unknown,
    Accept,
    AcceptCh,
    AcceptCharset,
    AcceptDatetime,
    AcceptEncoding,
    AcceptLanguage,
    AcceptPatch,
    AcceptRanges,
    AccessControlAllowCredentials,
    AccessControlAllowHeaders,
    AccessControlAllowMethods,
    AccessControlAllowOrigin,
    AccessControlExposeHeaders,
    AccessControlMaxAge,
    AccessControlRequestHeaders,
    AccessControlRequestMethod,
    Age,
    AIm,
    Allow,
    AltSvc,
    Authorization,
    CacheControl,
    Connection,
    ContentDisposition,
    ContentEncoding,
    ContentLanguage,
    ContentLength,
    ContentLocation,
    ContentRange,
    ContentSecurityPolicy,
    ContentType,
    Cookie,
    Date,
    DeltaBase,
    Dnt,
    Etag,
    Expect,
    ExpectCt,
    Expires,
    Forwarded,
    From,
    FrontEndHttps,
    Host,
    IfMatch,
    IfModifiedSince,
    IfNoneMatch,
    IfRange,
    IfUnmodifiedSince,
    Im,
    LastModified,
    Link,
    Location,
    MaxForwards,
    Nel,
    Origin,
    P3p,
    PermissionsPolicy,
    Pragma,
    Prefer,
    PreferenceApplied,
    ProxyAuthenticate,
    ProxyAuthorization,
    ProxyConnection,
    PublicKeyPins,
    Range,
    Referer,
    Refresh,
    ReportTo,
    RetryAfter,
    SaveData,
    Server,
    SetCookie,
    Status,
    StrictTransportSecurity,
    Te,
    TimingAllowOrigin,
    Tk,
    Trailer,
    TransferEncoding,
    Upgrade,
    UpgradeInsecureRequests,
    UserAgent,
    Vary,
    Via,
    Warning,
    WwwAuthenticate,
    XAttDeviceid,
    XContentDuration,
    XContentSecurityPolicy,
    XContentTypeOptions,
    XCorrelationId,
    XCsrfToken,
    XForwardedFor,
    XForwardedHost,
    XForwardedProto,
    XHttpMethodOverride,
    XPoweredBy,
    XRedirectBy,
    XRequestedWith,
    XRequestId,
    XUaCompatible,
    XUidh,
    XWapProfile,
    XWebkitCsp,
    XXssProtection,
}

// ワイヤー互換のため文字列は変更しないこと
static HEADER_NAMES: &[(HeaderName, &str)] = &[
    (HeaderName::Accept, "Accept"),
    (HeaderName::AcceptCh, "Accept-CH"),
    (HeaderName::AcceptCharset, "Accept-Charset"),
    (HeaderName::AcceptDatetime, "Accept-Datetime"),
    (HeaderName::AcceptEncoding, "Accept-Encoding"),
    (HeaderName::AcceptLanguage, "Accept-Language"),
    (HeaderName::AcceptPatch, "Accept-Patch"),
    (HeaderName::AcceptRanges, "Accept-Ranges"),
    (HeaderName::AccessControlAllowCredentials, "Access-Control-Allow-Credentials"),
    (HeaderName::AccessControlAllowHeaders, "Access-Control-Allow-Headers"),
    (HeaderName::AccessControlAllowMethods, "Access-Control-Allow-Methods"),
    (HeaderName::AccessControlAllowOrigin, "Access-Control-Allow-Origin"),
    (HeaderName::AccessControlExposeHeaders, "Access-Control-Expose-Headers"),
    (HeaderName::AccessControlMaxAge, "Access-Control-Max-Age"),
    (HeaderName::AccessControlRequestHeaders, "Access-Control-Request-Headers"),
    (HeaderName::AccessControlRequestMethod, "Access-Control-Request-Method"),
    (HeaderName::Age, "Age"),
    (HeaderName::AIm, "A-IM"),
    (HeaderName::Allow, "Allow"),
    (HeaderName::AltSvc, "Alt-Svc"),
    (HeaderName::Authorization, "Authorization"),
    (HeaderName::CacheControl, "Cache-Control"),
    (HeaderName::Connection, "Connection"),
    (HeaderName::ContentDisposition, "Content-Disposition"),
    (HeaderName::ContentEncoding, "Content-Encoding"),
    (HeaderName::ContentLanguage, "Content-Language"),
    (HeaderName::ContentLength, "Content-Length"),
    (HeaderName::ContentLocation, "Content-Location"),
    (HeaderName::ContentRange, "Content-Range"),
    (HeaderName::ContentSecurityPolicy, "Content-Security-Policy"),
    (HeaderName::ContentType, "Content-Type"),
    (HeaderName::Cookie, "Cookie"),
    (HeaderName::Date, "Date"),
    (HeaderName::DeltaBase, "Delta-Base"),
    (HeaderName::Dnt, "DNT"),
    (HeaderName::Etag, "ETag"),
    (HeaderName::Expect, "Expect"),
    (HeaderName::ExpectCt, "Expect-CT"),
    (HeaderName::Expires, "Expires"),
    (HeaderName::Forwarded, "Forwarded"),
    (HeaderName::From, "From"),
    (HeaderName::FrontEndHttps, "Front-End-Https"),
    (HeaderName::Host, "Host"),
    (HeaderName::IfMatch, "If-Match"),
    (HeaderName::IfModifiedSince, "If-Modified-Since"),
    (HeaderName::IfNoneMatch, "If-None-Match"),
    (HeaderName::IfRange, "If-Range"),
    (HeaderName::IfUnmodifiedSince, "If-Unmodified-Since"),
    (HeaderName::Im, "IM"),
    (HeaderName::LastModified, "Last-Modified"),
    (HeaderName::Link, "Link"),
    (HeaderName::Location, "Location"),
    (HeaderName::MaxForwards, "Max-Forwards"),
    (HeaderName::Nel, "NEL"),
    (HeaderName::Origin, "Origin"),
    (HeaderName::P3p, "P3P"),
    (HeaderName::PermissionsPolicy, "Permissions-Policy"),
    (HeaderName::Pragma, "Pragma"),
    (HeaderName::Prefer, "Prefer"),
    (HeaderName::PreferenceApplied, "Preference-Applied"),
    (HeaderName::ProxyAuthenticate, "Proxy-Authenticate"),
    (HeaderName::ProxyAuthorization, "Proxy-Authorization"),
    (HeaderName::ProxyConnection, "Proxy-Connection"),
    (HeaderName::PublicKeyPins, "Public-Key-Pins"),
    (HeaderName::Range, "Range"),
    (HeaderName::Referer, "Referer"),
    (HeaderName::Refresh, "Refresh"),
    (HeaderName::ReportTo, "Report-To"),
    (HeaderName::RetryAfter, "Retry-After"),
    (HeaderName::SaveData, "Save-Data"),
    (HeaderName::Server, "Server"),
    (HeaderName::SetCookie, "Set-Cookie"),
    (HeaderName::Status, "Status"),
    (HeaderName::StrictTransportSecurity, "Strict-Transport-Security"),
    (HeaderName::Te, "TE"),
    (HeaderName::TimingAllowOrigin, "Timing-Allow-Origin"),
    (HeaderName::Tk, "Tk"),
    (HeaderName::Trailer, "Trailer"),
    (HeaderName::TransferEncoding, "Transfer-Encoding"),
    (HeaderName::Upgrade, "Upgrade"),
    (HeaderName::UpgradeInsecureRequests, "Upgrade-Insecure-Requests"),
    (HeaderName::UserAgent, "User-Agent"),
    (HeaderName::Vary, "Vary"),
    (HeaderName::Via, "Via"),
    (HeaderName::Warning, "Warning"),
    (HeaderName::WwwAuthenticate, "WWW-Authenticate"),
    (HeaderName::XAttDeviceid, "X-ATT-DeviceId"),
    (HeaderName::XContentDuration, "X-Content-Duration"),
    (HeaderName::XContentSecurityPolicy, "X-Content-Security-Policy"),
    (HeaderName::XContentTypeOptions, "X-Content-Type-Options"),
    (HeaderName::XCorrelationId, "X-Correlation-ID"),
    (HeaderName::XCsrfToken, "X-Csrf-Token"),
    (HeaderName::XForwardedFor, "X-Forwarded-For"),
    (HeaderName::XForwardedHost, "X-Forwarded-Host"),
    (HeaderName::XForwardedProto, "X-Forwarded-Proto"),
    (HeaderName::XHttpMethodOverride, "X-Http-Method-Override"),
    (HeaderName::XPoweredBy, "X-Powered-By"),
    (HeaderName::XRedirectBy, "X-Redirect-By"),
    (HeaderName::XRequestedWith, "X-Requested-With"),
    (HeaderName::XRequestId, "X-Request-ID"),
    (HeaderName::XUaCompatible, "X-UA-Compatible"),
    (HeaderName::XUidh, "X-UIDH"),
    (HeaderName::XWapProfile, "X-Wap-Profile"),
    (HeaderName::XWebkitCsp, "X-WebKit-CSP"),
    (HeaderName::XXssProtection, "X-XSS-Protection"),
];

impl HeaderName {
    /// 名前から既知ヘッダーを解決 (大文字小文字を区別しない)
    pub fn lookup(name: &[u8]) -> Self {
        HEADER_NAMES
            .iter()
            .find(|(_, s)| s.len() == name.len() && s.as_bytes().eq_ignore_ascii_case(name))
            .map(|&(h, _)| h)
            .unwrap_or(HeaderName::Unknown)
    }

    /// 正規の表記 (Unknown は None)
    pub fn as_str(&self) -> Option<&'static str> {
        HEADER_NAMES
            .iter()
            .find(|(h, _)| h == self)
            .map(|&(_, s)| s)
    }

    /// 既知のヘッダーかどうか
    pub fn is_known(&self) -> bool {
        *self != HeaderName::Unknown
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("Unknown"))
    }
}

/// 所有権を持つヘッダー 1 件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: HeaderName,
    raw_name: Option<String>,
    value: String,
}

impl Header {
    /// ヘッダーの識別子
    pub fn name(&self) -> HeaderName {
        self.name
    }

    /// ヘッダー名の文字列
    ///
    /// 既知ヘッダーは表の正規表記、未知ヘッダーは受信/指定した生の名前。
    pub fn name_str(&self) -> &str {
        match self.name.as_str() {
            Some(s) => s,
            None => self.raw_name.as_deref().unwrap_or(""),
        }
    }

    /// 値
    pub fn value(&self) -> &str {
        &self.value
    }

    fn same_name(&self, name: HeaderName, raw_name: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        if name.is_known() {
            return true;
        }
        let a = self.raw_name.as_deref().unwrap_or("");
        let b = raw_name.unwrap_or("");
        a.eq_ignore_ascii_case(b)
    }
}

/// 挿入順を保持するヘッダーセット
///
/// 同じ名前のヘッダーを追加すると、既存エントリの値を置き換える
/// (位置は変わらない)。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<Header>,
}

impl HeaderSet {
    /// 空のヘッダーセットを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 名前を解決してヘッダーを追加
    pub fn append(&mut self, name: &str, value: &str) {
        let header_name = HeaderName::lookup(name.as_bytes());
        let raw_name = if header_name.is_known() {
            None
        } else {
            Some(name)
        };
        self.append_with(header_name, raw_name, value);
    }

    /// 既知ヘッダーを追加
    pub fn insert(&mut self, name: HeaderName, value: &str) {
        self.append_with(name, None, value);
    }

    fn append_with(&mut self, name: HeaderName, raw_name: Option<&str>, value: &str) {
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|h| h.same_name(name, raw_name))
        {
            existing.value = value.to_string();
            return;
        }
        self.headers.push(Header {
            name,
            raw_name: if name.is_known() {
                None
            } else {
                Some(raw_name.unwrap_or("").to_string())
            },
            value: value.to_string(),
        });
    }

    /// パース結果のヘッダーをすべて取り込む
    ///
    /// 値に UTF-8 として不正なバイトが含まれる場合は置換文字に変換する。
    pub fn extend_from_parsed(&mut self, parsed: &[ParsedHeader<'_>]) {
        for header in parsed {
            let value = String::from_utf8_lossy(header.value);
            if header.name.is_known() {
                self.append_with(header.name, None, &value);
            } else {
                let raw_name = String::from_utf8_lossy(header.raw_name);
                self.append_with(header.name, Some(&raw_name), &value);
            }
        }
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get(&self, name: &str) -> Option<&str> {
        let header_name = HeaderName::lookup(name.as_bytes());
        let raw_name = if header_name.is_known() {
            None
        } else {
            Some(name)
        };
        self.headers
            .iter()
            .find(|h| h.same_name(header_name, raw_name))
            .map(|h| h.value.as_str())
    }

    /// 既知ヘッダーを取得
    pub fn get_known(&self, name: HeaderName) -> Option<&str> {
        if !name.is_known() {
            return None;
        }
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 挿入順に走査
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// すべてのヘッダーを削除
    pub fn clear(&mut self) {
        self.headers.clear();
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}
