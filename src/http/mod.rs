pub mod server;
pub use server::*;

pub mod request;
pub use request::*;

pub mod response;
pub use response::*;

pub mod client;
pub use client::*;

use crate::errors::{Error, Result};
use std::io::Read;

/// Header list as carried by requests and responses
pub type Headers = Vec<(String, String)>;

/// Copy the headers out of an httparse buffer
fn owned_headers(headers: &[httparse::Header]) -> Headers {
    headers
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect()
}

/// Look up a header value, ignoring the case of its name
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Read a full HTTP message (request or response) from a byte stream.
///
/// `parse_head` is called on everything received so far until it manages to parse the whole
/// head, returning its length and the owned start line data. The body is then read according
/// to Content-Length. Anything received past the body is dropped, which is fine as long as
/// connections carry a single exchange.
fn read_message<R, T, F>(reader: &mut R, mut parse_head: F) -> Result<(T, Headers, String)>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<Option<(usize, T, Headers)>>,
{
    let mut chunk = [0; 4096];
    let mut buf: Vec<u8> = Vec::new();

    let (head_len, head, headers) = loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            return Err(Error::ConnectionReset);
        }
        buf.extend_from_slice(&chunk[..bytes_read]);

        if let Some(parsed) = parse_head(&buf)? {
            break parsed;
        }
    };

    let body_len = find_header(&headers, "Content-Length")
        .and_then(|length| length.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() - head_len < body_len {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            return Err(Error::ConnectionReset);
        }
        buf.extend_from_slice(&chunk[..bytes_read]);
    }

    let body = String::from_utf8_lossy(&buf[head_len..head_len + body_len]).to_string();
    Ok((head, headers, body))
}
