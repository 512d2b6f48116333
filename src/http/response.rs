use std::io::Read;

use crate::errors::Result;
use crate::http::{owned_headers, read_message, Headers};

/// An HTTP response, either built by the server or parsed by the client
#[derive(Debug)]
pub struct Response {
    /// Status code of the response. Optional because that's what httparse returns, but it
    /// shouldn't happen in practice since we control the responses.
    pub status: Option<u16>,
    /// Headers for the response. It is not necessary to add Content-Length to it, this is done
    /// automatically on serialization.
    pub headers: Headers,
    /// Body of the response. Give an empty string for an empty body
    pub body: String,
}

impl Response {
    /// Creates an empty OK response (204)
    pub fn ok() -> Response {
        Response {
            status: Some(204),
            headers: vec![],
            body: String::new(),
        }
    }

    /// Creates an OK (200) response with the given JSON body
    pub fn ok_with_body(body: String) -> Response {
        Self::json(200, body)
    }

    /// Creates a Created (201) response with the given JSON body
    pub fn created(body: String) -> Response {
        Self::json(201, body)
    }

    fn json(status: u16, body: String) -> Response {
        Response {
            status: Some(status),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    /// Creates an error response.
    ///
    /// The code must be in the 4xx or 5xx range. No body is added, to avoid leaking information
    /// about the server.
    pub fn error(code: u16) -> Response {
        debug_assert!((400..600).contains(&code), "Invalid error code");
        Response {
            status: Some(code),
            headers: vec![],
            body: String::new(),
        }
    }

    /// Creates an Internal Server Error (500) response.
    pub fn internal_server_error() -> Response {
        Self::error(500)
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

/// Parse an HTTP response from a byte stream
pub fn parse_response<T>(mut reader: T) -> Result<Response>
where
    T: Read,
{
    let (status, headers, body) = read_message(&mut reader, |buf| {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut resp = httparse::Response::new(&mut headers);
        match resp.parse(buf)? {
            httparse::Status::Complete(parsed_len) => {
                Ok(Some((parsed_len, resp.code, owned_headers(resp.headers))))
            }
            httparse::Status::Partial => Ok(None),
        }
    })?;

    Ok(Response {
        status,
        headers,
        body,
    })
}
