#![no_main]

use std::io::{self, Read, Write};
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ncollectd_http::{ExchangeLimits, Transport, read_request, read_response};

#[derive(Arbitrary, Debug)]
struct FuzzExchange {
    data: Vec<u8>,
    read_size: u8,
    read_buffer_size: u16,
}

struct FuzzStream {
    input: Vec<u8>,
    pos: usize,
    read_size: usize,
}

impl Read for FuzzStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf
            .len()
            .min(self.read_size)
            .min(self.input.len() - self.pos);
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for FuzzStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for FuzzStream {
    fn set_io_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|input: FuzzExchange| {
    let read_size = usize::from(input.read_size).max(1);
    let limits = ExchangeLimits {
        read_buffer_size: usize::from(input.read_buffer_size).max(1),
        max_head_size: 8 * 1024,
        max_body_size: 64 * 1024,
        ..ExchangeLimits::default()
    };

    let mut stream = FuzzStream {
        input: input.data.clone(),
        pos: 0,
        read_size,
    };
    if let Ok(response) = read_response(&mut stream, &limits) {
        assert!(response.body.len() <= limits.max_body_size);
    }

    let mut stream = FuzzStream {
        input: input.data,
        pos: 0,
        read_size,
    };
    if let Ok(request) = read_request(&mut stream, &limits) {
        assert!(request.body.len() <= limits.max_body_size);
    }
});
