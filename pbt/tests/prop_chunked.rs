//! chunked デコーダーのプロパティテスト (chunked.rs)

use ncollectd_http::{ChunkedDecoder, ParseError, Status, encode_chunks};
use proptest::prelude::*;

fn chunks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..128), 0..8)
}

/// `step` バイトずつ別々のバッファでデコードし、デコード結果と最後の状態を返す
fn decode_in_pieces(
    decoder: &mut ChunkedDecoder,
    encoded: &[u8],
    step: usize,
) -> (Vec<u8>, Vec<Result<Status<usize>, ParseError>>) {
    let mut body = Vec::new();
    let mut results = Vec::new();
    for piece in encoded.chunks(step) {
        let mut buf = piece.to_vec();
        let mut len = buf.len();
        let result = decoder.decode(&mut buf, &mut len);
        body.extend_from_slice(&buf[..len]);
        let done = !matches!(result, Ok(Status::Partial));
        results.push(result);
        if done {
            break;
        }
    }
    (body, results)
}

proptest! {
    #[test]
    fn round_trip(chunks in chunks(), step in 1usize..64) {
        let refs: Vec<&[u8]> = chunks.iter().map(|c| c.as_slice()).collect();
        let encoded = encode_chunks(&refs);
        let expected = chunks.concat();

        let mut decoder = ChunkedDecoder::new().consume_trailer(true);
        let (body, results) = decode_in_pieces(&mut decoder, &encoded, step);

        prop_assert_eq!(body, expected);
        prop_assert_eq!(results.len(), encoded.len().div_ceil(step));
        let (last, rest) = results.split_last().unwrap();
        prop_assert_eq!(*last, Ok(Status::Complete(0)));
        prop_assert!(rest.iter().all(|r| *r == Ok(Status::Partial)));
    }

    /// 終端チャンクの行で完了し、残りの空行は未処理として返す
    #[test]
    fn without_trailer_consumption(chunks in chunks(), tail in proptest::collection::vec(any::<u8>(), 0..16)) {
        let refs: Vec<&[u8]> = chunks.iter().map(|c| c.as_slice()).collect();
        let mut encoded = encode_chunks(&refs);
        encoded.extend_from_slice(&tail);

        let mut decoder = ChunkedDecoder::new();
        let mut len = encoded.len();
        let status = decoder.decode(&mut encoded, &mut len).unwrap();

        prop_assert_eq!(status, Status::Complete(2 + tail.len()));
        let expected = chunks.concat();
        prop_assert_eq!(&encoded[..len], expected.as_slice());
        prop_assert_eq!(&encoded[len..len + 2], b"\r\n");
    }

    #[test]
    fn extensions_and_trailers_are_skipped(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..64), 1..6),
        ext in "[a-z]{1,8}(=[a-z0-9]{1,8})?",
        trailers in proptest::collection::vec("[A-Za-z-]{1,16}: [ -~]{0,16}", 0..4),
        step in 1usize..32,
    ) {
        let mut encoded = Vec::new();
        for chunk in &chunks {
            encoded.extend_from_slice(format!("{:X};{}\r\n", chunk.len(), ext).as_bytes());
            encoded.extend_from_slice(chunk);
            encoded.extend_from_slice(b"\r\n");
        }
        encoded.extend_from_slice(b"0\r\n");
        for trailer in &trailers {
            encoded.extend_from_slice(trailer.as_bytes());
            encoded.extend_from_slice(b"\r\n");
        }
        encoded.extend_from_slice(b"\r\n");

        let mut decoder = ChunkedDecoder::new().consume_trailer(true);
        let (body, results) = decode_in_pieces(&mut decoder, &encoded, step);
        prop_assert_eq!(body, chunks.concat());
        prop_assert_eq!(results.last().copied(), Some(Ok(Status::Complete(0))));
    }

    /// usize に収まらない桁数のチャンクサイズはエラー
    #[test]
    fn chunk_size_overflow(digits in "[0-9a-fA-F]{17,40}") {
        let mut buf = format!("{digits}\r\n").into_bytes();
        let mut len = buf.len();
        let mut decoder = ChunkedDecoder::new();
        prop_assert_eq!(
            decoder.decode(&mut buf, &mut len),
            Err(ParseError::ChunkSizeOverflow)
        );
    }

    #[test]
    fn arbitrary_bytes_stay_in_bounds(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut buf = bytes.clone();
        let mut len = buf.len();
        let mut decoder = ChunkedDecoder::new().consume_trailer(true);
        if let Ok(status) = decoder.decode(&mut buf, &mut len) {
            prop_assert!(len <= bytes.len());
            if let Status::Complete(rest) = status {
                prop_assert!(len + rest <= bytes.len());
            }
        }
    }
}

#[test]
fn in_data_query() {
    let mut decoder = ChunkedDecoder::new();
    let mut buf = b"a\r\nabc".to_vec();
    let mut len = buf.len();
    assert_eq!(decoder.decode(&mut buf, &mut len), Ok(Status::Partial));
    assert!(decoder.is_in_data());
    assert_eq!(decoder.bytes_left_in_chunk(), 7);
    assert_eq!(&buf[..len], b"abc");
}
