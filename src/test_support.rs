use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(5);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Minimal HTTP/1.1 server answering every request with a canned response.
///
/// The request head of every connection is forwarded to `requests`.
pub(crate) struct TestServer {
    pub(crate) url: String,
    pub(crate) requests: mpsc::Receiver<String>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

pub(crate) fn spawn_http_server(response: &'static [u8]) -> Result<TestServer, String> {
    spawn_http_server_with_delay(response, Duration::ZERO)
}

pub(crate) fn spawn_http_server_with_delay(
    response: &'static [u8],
    delay: Duration,
) -> Result<TestServer, String> {
    spawn_paced_server(response, Pacing { delay, stall: None })
}

/// Writes the first `split_at` bytes of `response` at once and the rest after
/// `pause`.
pub(crate) fn spawn_http_server_with_stall(
    response: &'static [u8],
    split_at: usize,
    pause: Duration,
) -> Result<TestServer, String> {
    spawn_paced_server(
        response,
        Pacing {
            delay: Duration::ZERO,
            stall: Some((split_at, pause)),
        },
    )
}

#[derive(Clone, Copy)]
struct Pacing {
    /// Wait before the first response byte.
    delay: Duration,
    /// Split offset and the pause taken there.
    stall: Option<(usize, Duration)>,
}

fn spawn_paced_server(response: &'static [u8], pacing: Pacing) -> Result<TestServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let (request_tx, request_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((stream, _)) => {
                    let request_tx = request_tx.clone();
                    thread::spawn(move || handle_client(stream, response, pacing, &request_tx));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(_) => break,
            }
        }
    });

    Ok(TestServer {
        url: format!("http://{}", addr),
        requests: request_rx,
        shutdown: shutdown_tx,
        thread: Some(handle),
    })
}

/// Returns a URL on a local port nothing is listening on.
pub(crate) fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind probe failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("probe addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn handle_client(
    mut stream: TcpStream,
    response: &'static [u8],
    pacing: Pacing,
    request_tx: &mpsc::Sender<String>,
) {
    if stream.set_nonblocking(false).is_err() || stream.set_read_timeout(Some(READ_TIMEOUT)).is_err()
    {
        return;
    }
    let mut head = Vec::new();
    let mut buffer = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(read) => head.extend_from_slice(buffer.get(..read).unwrap_or_default()),
        }
    }
    let text = String::from_utf8_lossy(&head).into_owned();
    let head_len = text.find("\r\n\r\n").map_or(head.len(), |idx| idx.saturating_add(4));
    let mut remaining = content_length(&text).saturating_sub(head.len().saturating_sub(head_len));
    while remaining > 0 {
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(read) => remaining = remaining.saturating_sub(read),
        }
    }
    drop(request_tx.send(text));
    if !pacing.delay.is_zero() {
        thread::sleep(pacing.delay);
    }
    let (first, rest) = match pacing.stall {
        Some((split_at, _)) => response.split_at(split_at.min(response.len())),
        None => (response, &[][..]),
    };
    if stream.write_all(first).is_err() || stream.flush().is_err() {
        return;
    }
    if let Some((_, pause)) = pacing.stall {
        thread::sleep(pause);
        if stream.write_all(rest).is_err() || stream.flush().is_err() {
            return;
        }
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
