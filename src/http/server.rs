use crate::http::{parse_request, Request, Response};
use crate::{errors, threadpool::ThreadPool};
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

/// Turn an HTTP status code into its reason phrase
pub fn code_to_string(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// This is the main server.
///
/// It listens for incomming connections on a TCP socket, parses the requests and dispatches them
/// to a handler. Whatever the handler produces is then converted in an HTTP response and sent
/// back to the client.
pub struct HttpServer {
    listener: TcpListener,
}

impl HttpServer {
    /// Create a new server listening on the given address. Port 0 picks a free port, see
    /// [`HttpServer::local_addr`].
    pub fn new(addr: &str) -> errors::Result<Self> {
        Ok(HttpServer {
            listener: TcpListener::bind(addr)?,
        })
    }

    /// Address the server is actually bound to
    pub fn local_addr(&self) -> errors::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the server
    ///
    /// Calls the handler with the incoming requests. Uses a threadpool internally to handle the
    /// requests concurrently on as many threads as the system can handle.
    ///
    /// This function is blocking, with no real way of stopping it (except the socket being
    /// forcefully closed by the OS or the program being killed)
    pub fn serve<F>(&self, handler: F)
    where
        F: Fn(Request) -> Response + Send + Sync + 'static + Clone,
    {
        let threadpool = ThreadPool::new(
            std::thread::available_parallelism()
                .map(|x| x.into())
                .unwrap_or(4),
        );
        for stream in self.listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log::warn!("Failed to accept connection: {}", err);
                    continue;
                }
            };
            let handler = handler.clone();
            if let Err(err) = threadpool.execute(move || handle_stream(&mut stream, &handler)) {
                log::error!("{}", err);
                break;
            }
        }
    }

    /// Utility function for one-shot servers.
    ///
    /// This is mostly for testing, it listens to a single connection, processes the
    /// request and exit.
    pub fn serve_once<F>(&self, handler: F)
    where
        F: Fn(Request) -> Response,
    {
        match self.listener.accept() {
            Ok((mut stream, _)) => handle_stream(&mut stream, &handler),
            Err(err) => log::warn!("Failed to accept connection: {}", err),
        }
    }
}

/// Parse an HTTP request from a TCP stream, calls the handler and write back the answer
fn handle_stream<F>(stream: &mut TcpStream, handler: F)
where
    F: Fn(Request) -> Response,
{
    match parse_request(BufReader::new(&mut *stream)) {
        Ok(req) => {
            let line = format!("{} {}", req.method, req.path);
            let resp = handler(req);
            log::info!("{} -> {}", line, resp.status.unwrap_or(500));
            respond(stream, resp)
        }
        Err(err) => {
            log::warn!("Rejecting unparsable request: {}", err);
            respond(stream, Response::error(400))
        }
    }
}

/// Writes an HTTP response to a stream
fn respond(stream: &mut TcpStream, resp: Response) {
    let status = resp.status.unwrap_or(500);
    let result = stream.write_all(
        format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}\r\n{}",
            status,
            code_to_string(status),
            resp.body.len(),
            resp.headers
                .iter()
                .map(|(k, v)| format!("{}: {}\r\n", k, v))
                .collect::<String>(),
            resp.body
        )
        .as_bytes(),
    );

    if let Err(err) = result {
        log::warn!("Failed to respond: {}", err);
    }
}
