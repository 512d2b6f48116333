use crate::errors;
use crate::http::{parse_response, Response};
use std::io::{BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

/// How long a client waits on a silent server before giving up on a read or a write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Simple HTTP client
///
/// It sends HTTP requests from a set of parameters, then parses and yields the server response.
pub struct HttpClient {
    stream: TcpStream,
    host: String,
}

impl HttpClient {
    /// Create a new client connected to the given server, with [`DEFAULT_TIMEOUT`].
    ///
    /// An error is returned if the connection cannot be made for whatever reason
    pub fn new(server: &str) -> errors::Result<Self> {
        Self::with_timeout(server, DEFAULT_TIMEOUT)
    }

    /// Create a new client whose reads and writes fail once `timeout` elapses without progress
    pub fn with_timeout(server: &str, timeout: Duration) -> errors::Result<Self> {
        let stream = TcpStream::connect(server)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        Ok(HttpClient {
            stream,
            host: server.to_string(),
        })
    }

    /// Send an HTTP request on the open connection.
    ///
    /// Connection keep-alive is not implemented server side, drop the object after the response
    /// is retrieved.
    pub fn send(&mut self, method: &str, endpoint: &str, body: &str) -> errors::Result<Response> {
        log::debug!("{} {} ({} bytes)", method, endpoint, body.len());
        let content_type = if body.is_empty() {
            ""
        } else {
            "Content-Type: application/json\r\n"
        };
        self.stream.write_all(
            format!(
                "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Length: {}\r\n{}\r\n{}",
                method,
                endpoint,
                self.host,
                body.len(),
                content_type,
                body
            )
            .as_bytes(),
        )?;

        let response = parse_response(BufReader::new(&mut self.stream))?;
        log::debug!("{} {} -> {:?}", method, endpoint, response.status);
        Ok(response)
    }
}

/// Open a connection, send a single request and return the response
pub fn send_once(
    server: &str,
    timeout: Duration,
    method: &str,
    endpoint: &str,
    body: &str,
) -> errors::Result<Response> {
    HttpClient::with_timeout(server, timeout)?.send(method, endpoint, body)
}
