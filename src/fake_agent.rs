//! A stand-in Jolokia agent for tests. Every accepted connection gets one canned JSON answer.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) struct FakeAgent {
    port: u16,
    handle: JoinHandle<io::Result<Vec<String>>>,
}

impl FakeAgent {
    /// Answers one connection per body, in order.
    pub(crate) fn serve(bodies: Vec<serde_json::Value>) -> io::Result<Self> {
        Self::serve_after(Duration::ZERO, bodies)
    }

    /// Like [FakeAgent::serve], but holds every answer back for `delay`.
    pub(crate) fn serve_after(delay: Duration, bodies: Vec<serde_json::Value>) -> io::Result<Self> {
        Self::spawn(move |listener| {
            let mut requests = Vec::new();
            for body in bodies {
                let (mut stream, _) = listener.accept()?;
                requests.push(read_request(&mut stream)?);
                thread::sleep(delay);
                write_response(&mut stream, &body.to_string())?;
            }
            Ok(requests)
        })
    }

    /// Accepts a single connection and never answers. Returns once the client hangs up.
    pub(crate) fn silent() -> io::Result<Self> {
        Self::spawn(|listener| {
            let (mut stream, _) = listener.accept()?;
            match io::copy(&mut stream, &mut io::sink()) {
                Err(e) if e.kind() != io::ErrorKind::ConnectionReset => Err(e),
                _ => Ok(Vec::new()),
            }
        })
    }

    fn spawn<F>(f: F) -> io::Result<Self>
    where
        F: FnOnce(TcpListener) -> io::Result<Vec<String>> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let handle = thread::spawn(move || f(listener));
        Ok(FakeAgent { port, handle })
    }

    pub(crate) fn url(&self) -> String {
        format!("service:jmx:jolokia://127.0.0.1:{}/jolokia", self.port)
    }

    /// Waits for the agent to finish and returns the raw requests it received.
    pub(crate) fn requests(self) -> io::Result<Vec<String>> {
        self.handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "fake agent panicked"))?
    }
}

fn read_request(stream: &mut TcpStream) -> io::Result<String> {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    let mut content_length = 0;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            }
        }
        let end_of_head = line == "\r\n";
        request.push_str(&line);
        if end_of_head {
            break;
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;
    request.push_str(&String::from_utf8_lossy(&body));
    Ok(request)
}

fn write_response(stream: &mut TcpStream, body: &str) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )?;
    stream.flush()
}
