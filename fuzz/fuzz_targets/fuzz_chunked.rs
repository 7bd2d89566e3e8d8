#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ncollectd_http::{ChunkedDecoder, Status, encode_chunk, encode_chunks};

#[derive(Arbitrary, Debug)]
struct FuzzChunked {
    chunks: Vec<Vec<u8>>,
    raw: Vec<u8>,
    split_hint: u8,
}

fn decode_split(encoded: &[u8], split_size: usize) -> Option<Vec<u8>> {
    let mut decoder = ChunkedDecoder::new().consume_trailer(true);
    let mut body = Vec::new();
    for piece in encoded.chunks(split_size) {
        let mut buf = piece.to_vec();
        let mut len = buf.len();
        match decoder.decode(&mut buf, &mut len) {
            Ok(Status::Complete(_)) => {
                body.extend_from_slice(&buf[..len]);
                return Some(body);
            }
            Ok(Status::Partial) => body.extend_from_slice(&buf[..len]),
            Err(_) => return None,
        }
    }
    None
}

fuzz_target!(|input: FuzzChunked| {
    let mut chunks = input.chunks;
    chunks.retain(|chunk| !chunk.is_empty());
    chunks.truncate(64);
    let expected = chunks.concat();
    let split_size = (input.split_hint as usize % 32) + 1;

    let refs: Vec<&[u8]> = chunks.iter().map(|chunk| chunk.as_slice()).collect();
    let encoded = encode_chunks(&refs);
    assert_eq!(decode_split(&encoded, split_size), Some(expected.clone()));

    let mut single = Vec::new();
    for chunk in &chunks {
        single.extend_from_slice(&encode_chunk(chunk));
    }
    single.extend_from_slice(&encode_chunk(&[]));
    assert_eq!(decode_split(&single, split_size), Some(expected));

    // 任意の入力でもデコード結果は入力より長くならない
    let mut buf = input.raw.clone();
    let mut len = buf.len();
    let mut decoder = ChunkedDecoder::new();
    if let Ok(status) = decoder.decode(&mut buf, &mut len) {
        assert!(len <= input.raw.len());
        if let Status::Complete(rest) = status {
            assert!(len + rest <= input.raw.len());
        }
    }
});
