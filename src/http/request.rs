use crate::errors::Result;
use crate::http::{owned_headers, read_message, Headers};
use std::io::Read;

/// Represents an HTTP request.
#[derive(Debug)]
pub struct Request {
    /// The HTTP method used in the request
    pub method: String,
    /// The full path of the request
    pub path: String,
    /// Headers of the request
    pub headers: Headers,
    /// Body of the request
    pub body: String,
}

impl Request {
    /// Create a new request from scratch
    pub fn new(method: &str, path: &str, headers: Headers, body: String) -> Request {
        Request {
            method: method.to_string(),
            path: path.to_string(),
            headers,
            body,
        }
    }
    /// Create a new GET request for the given path, with an empty body
    pub fn get(path: &str) -> Request {
        Self::new("GET", path, vec![], String::new())
    }
    /// Create a new POST request for the given path, with the given body
    pub fn post(path: &str, body: String) -> Request {
        Self::new("POST", path, vec![], body)
    }
    /// Create a new PUT request for the given path, with the given body
    pub fn put(path: &str, body: String) -> Request {
        Self::new("PUT", path, vec![], body)
    }
    /// Create a new DELETE request for the given path, with an empty body
    pub fn delete(path: &str) -> Request {
        Self::new("DELETE", path, vec![], String::new())
    }
}

/// Parse an HTTP request from a byte stream
pub fn parse_request<T>(mut reader: T) -> Result<Request>
where
    T: Read,
{
    let ((method, path), headers, body) = read_message(&mut reader, |buf| {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut req = httparse::Request::new(&mut headers);
        match req.parse(buf)? {
            httparse::Status::Complete(parsed_len) => Ok(Some((
                parsed_len,
                (
                    req.method.unwrap_or("GET").to_string(),
                    req.path.unwrap_or("/").to_string(),
                ),
                owned_headers(req.headers),
            ))),
            httparse::Status::Partial => Ok(None),
        }
    })?;

    Ok(Request {
        method,
        path,
        headers,
        body,
    })
}
