//! PBT テスト共通ユーティリティ

use ncollectd_http::{Method, ParsedHeader, ParsedRequest, Request, Status};
use proptest::prelude::*;

// ========================================
// メッセージ要素の生成
// ========================================

fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
        Just('!'),
        Just('~'),
    ]
}

/// トークン (1-max_len 文字)
pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// 送信できるメソッド
pub fn http_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Get),
        Just(Method::Put),
        Just(Method::Post),
        Just(Method::Head),
        Just(Method::Patch),
        Just(Method::Trace),
        Just(Method::Delete),
        Just(Method::Options),
        Just(Method::Connect),
    ]
}

/// リクエストパス
pub fn http_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9/_.?=&%-]{1,64}".prop_map(|s| s),
    ]
}

/// ヘッダー値 (前後に空白を含まない印字可能文字列)
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,40}[!-~])?".prop_map(|s| s)
}

/// 名前が重ならない独自ヘッダー
pub fn custom_headers(max: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((token_string(16), header_value()), 0..=max).prop_map(|headers| {
        headers
            .into_iter()
            .enumerate()
            .map(|(i, (name, value))| (format!("X-{i}-{name}"), value))
            .collect()
    })
}

/// 理由フレーズ表にあるステータスコード
pub fn known_status() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(100u16),
        Just(101),
        Just(200),
        Just(201),
        Just(202),
        Just(204),
        Just(206),
        Just(301),
        Just(302),
        Just(304),
        Just(400),
        Just(401),
        Just(403),
        Just(404),
        Just(405),
        Just(500),
        Just(502),
        Just(503),
    ]
}

/// ボディ
pub fn body(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=max_len)
}

/// 生成した要素からリクエストを組み立てる
pub fn request() -> impl Strategy<Value = Request> {
    (http_method(), http_path(), custom_headers(8), body(128)).prop_map(
        |(method, path, headers, body)| {
            let mut request = Request::new(method, &path);
            for (name, value) in &headers {
                request.add_header(name, value);
            }
            request.body(body)
        },
    )
}

// ========================================
// パース補助
// ========================================

/// リクエストを一度にパースした結果 (ヘッダー部の長さと `(名前, 値)` の一覧)
pub fn parse_request_once(buf: &[u8]) -> Option<(usize, Vec<(Vec<u8>, Vec<u8>)>)> {
    let mut headers = [ParsedHeader::EMPTY; 64];
    let mut request = ParsedRequest::new(&mut headers);
    match request.parse(buf, 0) {
        Ok(Status::Complete(n)) => Some((
            n,
            request
                .headers()
                .iter()
                .map(|h| (h.raw_name.to_vec(), h.value.to_vec()))
                .collect(),
        )),
        _ => None,
    }
}
