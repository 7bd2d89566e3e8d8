//! # ncollectd_http
//!
//! ncollectd のプラグインが使う HTTP/1.x コーデック
//!
//! ## 特徴
//!
//! - **ゼロコピーパーサー**: 呼び出し側のバッファを直接参照して解析する
//! - **インクリメンタル**: 途中までのバッファでも `Status::Partial` を返して再開できる
//! - **chunked デコーダー**: バッファ内でその場でデコードする
//! - **同期 I/O ドライバー**: 接続済みのストリームで 1 往復を送受信する
//!
//! ## 使い方
//!
//! ### クライアント (リクエスト送信、レスポンス受信)
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//!
//! use ncollectd_http::{ExchangeLimits, Method, Request, fetch};
//!
//! let mut stream = TcpStream::connect("127.0.0.1:9100")?;
//! let request = Request::new(Method::Get, "/metrics")
//!     .header("Host", "127.0.0.1")
//!     .header("Accept", "text/plain");
//! let response = fetch(&mut stream, &request, &ExchangeLimits::default())?;
//! if response.is_success() {
//!     println!("{}", String::from_utf8_lossy(&response.body));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### サーバー (リクエスト受信、レスポンス送信)
//!
//! ```rust,no_run
//! use std::net::TcpListener;
//!
//! use ncollectd_http::{ExchangeLimits, Response, read_request, write_response};
//!
//! let listener = TcpListener::bind("127.0.0.1:9103")?;
//! let (mut stream, _) = listener.accept()?;
//! let limits = ExchangeLimits::server();
//! let request = read_request(&mut stream, &limits)?;
//! let response = Response::new(200)
//!     .header("Content-Type", "text/plain")
//!     .body(format!("path {}\n", request.path).into_bytes());
//! write_response(&mut stream, &response, &limits)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### chunked ボディのデコード
//!
//! ```rust
//! use ncollectd_http::{ChunkedDecoder, Status};
//!
//! let mut body = b"4\r\nwiki\r\n5\r\npedia\r\n0\r\n\r\n".to_vec();
//! let mut decoder = ChunkedDecoder::new();
//! let status = decoder.decode_vec(&mut body).unwrap();
//! assert_eq!(status, Status::Complete(2));
//! assert_eq!(body, b"wikipedia");
//! ```

mod chunked;
mod encoder;
mod error;
mod exchange;
mod header;
mod limits;
mod method;
pub mod parser;
mod request;
mod response;
mod status;
mod version;

pub use chunked::{ChunkedDecoder, ChunkedState};
pub use encoder::{
    encode_chunk, encode_chunks, encode_request, encode_request_head, encode_response,
    encode_response_head,
};
pub use error::{Error, ParseError};
pub use exchange::{Transport, fetch, read_request, read_response, write_request, write_response};
pub use header::{Header, HeaderName, HeaderSet};
pub use limits::ExchangeLimits;
pub use method::Method;
pub use parser::{
    HeaderLayout, ParsedHeader, ParsedRequest, ParsedResponse, RequestLayout, ResponseLayout,
    Span, Status, is_complete, parse_headers,
};
pub use request::Request;
pub use response::Response;
pub use status::{StatusClass, StatusCode};
pub use version::Version;
