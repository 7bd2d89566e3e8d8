//! パーサーのプロパティテスト (parser/)

use ncollectd_http::{
    Method, ParseError, ParsedHeader, ParsedRequest, ParsedResponse, Response, Status,
    StatusClass, Version, is_complete,
};
use pbt::{custom_headers, header_value, known_status, parse_request_once, request};
use proptest::prelude::*;

// ========================================
// インクリメンタルパース
// ========================================

proptest! {
    /// 少しずつ伸ばしたバッファでも、一度にパースした場合と同じ結果になる
    #[test]
    fn incremental_equivalence(request in request(), step in 1usize..32) {
        let bytes = request.encode().unwrap();
        let (head_len, expected) = parse_request_once(&bytes).unwrap();

        let mut prior_len = 0;
        let mut end = 0;
        loop {
            end = (end + step).min(bytes.len());
            let mut headers = [ParsedHeader::EMPTY; 64];
            let mut parsed = ParsedRequest::new(&mut headers);
            match parsed.parse(&bytes[..end], prior_len).unwrap() {
                Status::Complete(n) => {
                    prop_assert_eq!(n, head_len);
                    prop_assert!(end >= head_len);
                    prop_assert_eq!(parsed.method, request.method);
                    prop_assert_eq!(parsed.path, request.path.as_bytes());
                    let actual: Vec<(Vec<u8>, Vec<u8>)> = parsed
                        .headers()
                        .iter()
                        .map(|h| (h.raw_name.to_vec(), h.value.to_vec()))
                        .collect();
                    prop_assert_eq!(actual, expected);
                    break;
                }
                Status::Partial => {
                    prop_assert!(end < head_len);
                    prop_assert!(parsed.headers().is_empty());
                }
            }
            prior_len = end;
        }
    }

    /// 事前チェックはヘッダー部の終端を正しく見つける
    #[test]
    fn is_complete_finds_head_end(request in request(), prior_len in 1usize..256) {
        let bytes = request.encode().unwrap();
        let (head_len, _) = parse_request_once(&bytes).unwrap();
        let prior_len = prior_len.min(head_len - 1);
        prop_assert_eq!(
            is_complete(&bytes[..head_len], prior_len).unwrap(),
            Status::Complete(head_len)
        );
    }
}

// ========================================
// エンコードとパース
// ========================================

proptest! {
    #[test]
    fn request_round_trip(request in request()) {
        let bytes = request.encode().unwrap();
        let mut headers = [ParsedHeader::EMPTY; 64];
        let mut parsed = ParsedRequest::new(&mut headers);
        let head_len = parsed.parse(&bytes, 0).unwrap().complete().unwrap();

        prop_assert_eq!(parsed.method, request.method);
        prop_assert_eq!(parsed.path, request.path.as_bytes());
        prop_assert_eq!(parsed.version, Version::Http11);
        prop_assert_eq!(parsed.minor_version, Some(1));
        prop_assert_eq!(&bytes[head_len..], request.body.as_slice());

        // 独自ヘッダーの後に Content-Length が続く
        let parsed_headers = parsed.headers();
        prop_assert_eq!(parsed_headers.len(), request.headers.len() + 1);
        for (header, sent) in parsed_headers.iter().zip(request.headers.iter()) {
            prop_assert_eq!(header.raw_name, sent.name_str().as_bytes());
            prop_assert_eq!(header.value, sent.value().as_bytes());
        }
        let content_length = request.body.len().to_string();
        prop_assert_eq!(
            parsed_headers[parsed_headers.len() - 1].value,
            content_length.as_bytes()
        );
    }

    #[test]
    fn request_layout_survives_reallocation(request in request()) {
        let bytes = request.encode().unwrap();
        let layout = {
            let mut headers = [ParsedHeader::EMPTY; 64];
            let mut parsed = ParsedRequest::new(&mut headers);
            let head_len = parsed.parse(&bytes, 0).unwrap().complete().unwrap();
            parsed.layout(head_len)
        };

        let mut moved = Vec::with_capacity(bytes.len() * 2);
        moved.extend_from_slice(&bytes);
        prop_assert_eq!(layout.path_span.slice(&moved).unwrap(), request.path.as_bytes());
        for (header, sent) in layout.headers.iter().zip(request.headers.iter()) {
            let resolved = header.resolve(&moved).unwrap();
            prop_assert_eq!(resolved.value, sent.value().as_bytes());
        }
    }

    #[test]
    fn response_round_trip(
        status in known_status(),
        headers in custom_headers(8),
        body in pbt::body(64),
    ) {
        let mut response = Response::new(status).body(body);
        for (name, value) in &headers {
            response.add_header(name, value);
        }
        let bytes = response.encode().unwrap();

        let mut parsed_headers = [ParsedHeader::EMPTY; 16];
        let mut parsed = ParsedResponse::new(&mut parsed_headers);
        let head_len = parsed.parse(&bytes, 0).unwrap().complete().unwrap();

        prop_assert_eq!(parsed.status, status);
        prop_assert_eq!(parsed.status_class, StatusClass::from_code(status));
        prop_assert_eq!(parsed.reason, response.reason.as_bytes());
        prop_assert_eq!(parsed.headers().len(), headers.len() + 1);
        prop_assert_eq!(&bytes[head_len..], response.body.as_slice());
    }
}

// ========================================
// ヘッダー数の上限
// ========================================

proptest! {
    /// 上限を超えたヘッダーは切り捨てずにエラーにする
    #[test]
    fn header_bound(count in 0usize..40, limit in 1usize..40, value in header_value()) {
        let mut buf = b"GET / HTTP/1.1\r\n".to_vec();
        for i in 0..count {
            buf.extend_from_slice(format!("X-{i}: {value}\r\n").as_bytes());
        }
        buf.extend_from_slice(b"\r\n");

        let mut headers = vec![ParsedHeader::EMPTY; limit];
        let mut parsed = ParsedRequest::new(&mut headers);
        let result = parsed.parse(&buf, 0);
        if count > limit {
            prop_assert_eq!(result, Err(ParseError::TooManyHeaders { limit }));
            prop_assert!(parsed.headers().is_empty());
        } else {
            prop_assert_eq!(result, Ok(Status::Complete(buf.len())));
            prop_assert_eq!(parsed.headers().len(), count);
        }
    }
}

// ========================================
// 任意の入力
// ========================================

proptest! {
    #[test]
    fn arbitrary_bytes_never_overrun(
        bytes in proptest::collection::vec(any::<u8>(), 0..512),
        prior_len in 0usize..512,
    ) {
        let prior_len = prior_len.min(bytes.len());

        let mut headers = [ParsedHeader::EMPTY; 8];
        let mut request = ParsedRequest::new(&mut headers);
        if let Ok(Status::Complete(n)) = request.parse(&bytes, prior_len) {
            prop_assert!(n <= bytes.len());
        }

        let mut headers = [ParsedHeader::EMPTY; 8];
        let mut response = ParsedResponse::new(&mut headers);
        if let Ok(Status::Complete(n)) = response.parse(&bytes, prior_len) {
            prop_assert!(n <= bytes.len());
            prop_assert!(response.status <= 999);
        }

        if let Ok(Status::Complete(n)) = is_complete(&bytes, prior_len) {
            prop_assert!(n <= bytes.len());
        }
    }
}

#[test]
fn malformed_is_rejected() {
    let mut headers = [ParsedHeader::EMPTY; 4];
    let mut request = ParsedRequest::new(&mut headers);
    assert!(request.parse(b"GET\r\n", 0).is_err());
    assert_eq!(request.method, Method::Unknown);

    let mut headers = [ParsedHeader::EMPTY; 4];
    let mut response = ParsedResponse::new(&mut headers);
    assert_eq!(
        response.parse(b"HTTP/2.0 200 OK\r\n\r\n", 0),
        Err(ParseError::InvalidVersion)
    );
}
