#![no_main]

use libfuzzer_sys::fuzz_target;
use ncollectd_http::{ParsedHeader, ParsedRequest, Status};

fn parse_once(data: &[u8]) -> Option<usize> {
    let mut headers = [ParsedHeader::EMPTY; 32];
    let mut request = ParsedRequest::new(&mut headers);
    match request.parse(data, 0) {
        Ok(Status::Complete(n)) => {
            assert!(n <= data.len());
            let layout = request.layout(n);
            assert_eq!(layout.path_span.slice(data), Some(request.path));
            Some(n)
        }
        _ => None,
    }
}

fuzz_target!(|data: &[u8]| {
    let once = parse_once(data);

    // 1 バイトずつ伸ばしても同じ位置で完了する
    let mut prior_len = 0;
    for end in 1..=data.len() {
        let mut headers = [ParsedHeader::EMPTY; 32];
        let mut request = ParsedRequest::new(&mut headers);
        match request.parse(&data[..end], prior_len) {
            Ok(Status::Complete(n)) => {
                if let Some(expected) = once {
                    assert_eq!(n, expected);
                }
                return;
            }
            Ok(Status::Partial) => {}
            Err(_) => return,
        }
        prior_len = end;
    }
});
