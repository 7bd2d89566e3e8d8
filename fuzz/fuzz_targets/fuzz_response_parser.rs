#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ncollectd_http::{ParsedHeader, ParsedResponse, Status, StatusClass, parse_headers};

#[derive(Arbitrary, Debug)]
struct FuzzResponse {
    data: Vec<u8>,
    max_headers: u8,
    prior_len: u16,
}

fuzz_target!(|input: FuzzResponse| {
    let data = &input.data;
    let max_headers = usize::from(input.max_headers % 64);
    let prior_len = usize::from(input.prior_len).min(data.len());

    let mut headers = vec![ParsedHeader::EMPTY; max_headers];
    let mut response = ParsedResponse::new(&mut headers);
    if let Ok(Status::Complete(n)) = response.parse(data, prior_len) {
        assert!(n <= data.len());
        assert!(response.headers().len() <= max_headers);
        if response.status_class != StatusClass::Unknown {
            assert_eq!(response.status_class, StatusClass::from_code(response.status));
        }
    }

    let mut headers = vec![ParsedHeader::EMPTY; max_headers];
    if let Ok(Status::Complete((n, count))) = parse_headers(data, &mut headers, prior_len) {
        assert!(n <= data.len());
        assert!(count <= max_headers);
    }
});
