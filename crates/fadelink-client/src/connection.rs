use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use fadelink_proto::{Device, Reply, Request, RequestFrame, DEFAULT_TIMEOUT};
use fadelink_wire::{LineReader, LineWriter, WireError, WireStream};
use tracing::{debug, error};

use crate::error::{ClientError, Result};

/// State shared between caller-facing handles and the reader thread.
struct Shared {
    writer: Mutex<LineWriter<WireStream>>,
    /// In-flight requests keyed by sequence id. Settling a request
    /// (reply or timeout, whichever removes the entry first) is the
    /// exactly-once point; the losing path finds no entry and no-ops.
    pending: Mutex<HashMap<u64, mpsc::Sender<Reply>>>,
    /// Starts at 1, strictly increasing, never reused.
    next_sequence: AtomicU64,
}

/// A persistent connection to the device server.
///
/// All request/response traffic shares one ordered message stream;
/// replies are dispatched by sequence id, so they may arrive in any
/// order relative to sends. Methods take `&self` and may be called
/// from multiple threads.
pub struct Connection {
    shared: Arc<Shared>,
    /// Populated once at open, sorted ascending by serial.
    devices: Vec<Device>,
    stream: WireStream,
    reader: Option<JoinHandle<()>>,
}

impl Connection {
    /// Connect to `addr` and enumerate attached devices.
    pub fn open(addr: &str) -> Result<Self> {
        Self::open_with_timeout(addr, DEFAULT_TIMEOUT)
    }

    /// Connect with an explicit deadline for the enumeration request.
    ///
    /// Enumeration is the first request on the wire; if it fails for
    /// any reason (including timeout) the connection is torn down and
    /// never handed out.
    pub fn open_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        let stream = WireStream::connect(addr)?;
        let reader_stream = stream.try_clone()?;
        let writer_stream = stream.try_clone()?;

        let shared = Arc::new(Shared {
            writer: Mutex::new(LineWriter::new(writer_stream)),
            pending: Mutex::new(HashMap::new()),
            next_sequence: AtomicU64::new(1),
        });

        let dispatch_shared = Arc::clone(&shared);
        let reader = thread::Builder::new()
            .name("fadelink-dispatch".to_string())
            .spawn(move || dispatch_replies(LineReader::new(reader_stream), dispatch_shared))
            .map_err(WireError::Io)?;

        let mut conn = Self {
            shared,
            devices: Vec::new(),
            stream,
            reader: Some(reader),
        };

        let reply = conn.call_with_timeout(Request::ListConnectedDevices, timeout)?;
        let mut devices = reply.devices.unwrap_or_default();
        devices.sort_by(|a, b| a.serial.cmp(&b.serial));
        conn.devices = devices;
        Ok(conn)
    }

    /// Devices discovered at open time, sorted ascending by serial.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Look up a discovered device by serial.
    pub fn device(&self, serial: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.serial == serial)
    }

    /// Issue `body` and wait for its reply with the default deadline.
    pub fn call(&self, body: Request) -> Result<Reply> {
        self.call_with_timeout(body, DEFAULT_TIMEOUT)
    }

    /// Issue `body` and wait at most `timeout` for the matching reply.
    ///
    /// A fired timeout settles only its own request; the bytes already
    /// sent stay sent and other in-flight requests are untouched.
    pub fn call_with_timeout(&self, body: Request, timeout: Duration) -> Result<Reply> {
        let request = body.type_name();
        let sequence = self.shared.next_sequence.fetch_add(1, Ordering::Relaxed);
        let frame = RequestFrame { sequence, body };
        let payload = serde_json::to_vec(&frame)?;

        let (tx, rx) = mpsc::channel();
        lock(&self.shared.pending).insert(sequence, tx);

        {
            let mut writer = lock(&self.shared.writer);
            if let Err(err) = writer.send(&payload) {
                lock(&self.shared.pending).remove(&sequence);
                return Err(err.into());
            }
        }

        match rx.recv_timeout(timeout) {
            Ok(reply) => check_reply(reply),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if lock(&self.shared.pending).remove(&sequence).is_some() {
                    Err(ClientError::Timeout {
                        request,
                        sequence,
                        after: timeout,
                    })
                } else {
                    // Lost the race: the dispatcher removed the entry
                    // just as the deadline fired, so the reply is in
                    // (or about to be in) the channel.
                    match rx.recv() {
                        Ok(reply) => check_reply(reply),
                        Err(mpsc::RecvError) => Err(ClientError::Closed),
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                lock(&self.shared.pending).remove(&sequence);
                Err(ClientError::Closed)
            }
        }
    }

    /// Shut the connection down and join the reader thread.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let _ = self.stream.shutdown();
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        lock(&self.shared.pending).len()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn check_reply(reply: Reply) -> Result<Reply> {
    match reply.error {
        Some(message) => Err(ClientError::Device { message }),
        None => Ok(reply),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

/// Reader-thread loop: match inbound replies to pending requests.
///
/// Malformed frames are reported and dropped without ending the
/// session; replies whose sequence id has no pending entry (late,
/// duplicate, or never registered) are ignored.
fn dispatch_replies(mut reader: LineReader<WireStream>, shared: Arc<Shared>) {
    loop {
        let frame = match reader.read_line() {
            Ok(frame) => frame,
            Err(WireError::ConnectionClosed) => {
                debug!("connection closed");
                break;
            }
            Err(err) => {
                error!("receive failed: {err}");
                break;
            }
        };

        let reply: Reply = match serde_json::from_slice(&frame) {
            Ok(reply) => reply,
            Err(err) => {
                error!("dropping malformed reply frame: {err}");
                continue;
            }
        };

        let entry = lock(&shared.pending).remove(&reply.sequence);
        match entry {
            Some(tx) => {
                // A send error means the caller already gave up; the
                // request was settled either way.
                let _ = tx.send(reply);
            }
            None => debug!(sequence = reply.sequence, "ignoring unmatched reply"),
        }
    }

    // Wake every in-flight caller with a disconnected channel.
    lock(&shared.pending).clear();
}

#[cfg(test)]
mod tests {
    use std::thread;

    use fadelink_wire::ServerEndpoint;
    use serde_json::{json, Value};

    use super::*;

    /// Spawn a scripted stand-in for the device server and return the
    /// address to dial.
    fn spawn_server<F>(script: F) -> (String, thread::JoinHandle<()>)
    where
        F: FnOnce(LineReader<WireStream>, LineWriter<WireStream>) + Send + 'static,
    {
        let endpoint = ServerEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let stream = endpoint.accept().unwrap();
            let reader = LineReader::new(stream.try_clone().unwrap());
            let writer = LineWriter::new(stream);
            script(reader, writer);
        });
        (addr, handle)
    }

    fn read_request(reader: &mut LineReader<WireStream>) -> Value {
        let frame = reader.read_line().unwrap();
        serde_json::from_slice(&frame).unwrap()
    }

    fn send_json(writer: &mut LineWriter<WireStream>, value: Value) {
        writer.send(value.to_string().as_bytes()).unwrap();
    }

    /// Answer the enumeration request `open` sends first.
    fn answer_enumeration(
        reader: &mut LineReader<WireStream>,
        writer: &mut LineWriter<WireStream>,
        serials: &[&str],
    ) {
        let request = read_request(reader);
        assert_eq!(request["type"], "list_connected_devices");
        let devices: Vec<Value> = serials.iter().map(|s| json!({"serial": s})).collect();
        send_json(
            writer,
            json!({"sequence": request["sequence"], "devices": devices}),
        );
    }

    #[test]
    fn open_sorts_devices_by_serial() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            answer_enumeration(&mut reader, &mut writer, &["B1", "A2"]);
        });

        let conn = Connection::open(&addr).unwrap();
        let serials: Vec<&str> = conn.devices().iter().map(|d| d.serial.as_str()).collect();
        assert_eq!(serials, vec!["A2", "B1"]);

        drop(conn);
        server.join().unwrap();
    }

    #[test]
    fn open_fails_when_enumeration_times_out() {
        let (addr, server) = spawn_server(|mut reader, _writer| {
            // Swallow the request, never answer, and hold the socket
            // open until the client gives up and hangs up.
            let _ = read_request(&mut reader);
            let _ = reader.read_line();
        });

        let result = Connection::open_with_timeout(&addr, Duration::from_millis(100));
        assert!(matches!(result, Err(ClientError::Timeout { .. })));
        server.join().unwrap();
    }

    #[test]
    fn timeout_settles_exactly_once_and_clears_pending() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            answer_enumeration(&mut reader, &mut writer, &["FC1"]);

            // Swallow one request, let it time out, then answer it late
            // and answer the follow-up normally.
            let starved = read_request(&mut reader);
            let follow_up = read_request(&mut reader);
            send_json(&mut writer, json!({"sequence": starved["sequence"]}));
            send_json(&mut writer, json!({"sequence": follow_up["sequence"]}));
        });

        let conn = Connection::open(&addr).unwrap();

        let result =
            conn.call_with_timeout(Request::ListConnectedDevices, Duration::from_millis(100));
        match result {
            Err(ClientError::Timeout {
                request, sequence, ..
            }) => {
                assert_eq!(request, "list_connected_devices");
                assert_eq!(sequence, 2);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(conn.pending_len(), 0);

        // The late reply for the timed-out sequence must not disturb
        // the next request on the session.
        let reply = conn.call(Request::ListConnectedDevices).unwrap();
        assert_eq!(reply.sequence, 3);

        drop(conn);
        server.join().unwrap();
    }

    #[test]
    fn replies_dispatch_out_of_send_order() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            answer_enumeration(&mut reader, &mut writer, &["FC1"]);

            // Read both requests first, then answer in reverse order;
            // the first one gets an error reply so the callers can be
            // told apart.
            let first = read_request(&mut reader);
            let second = read_request(&mut reader);
            send_json(&mut writer, json!({"sequence": second["sequence"]}));
            send_json(
                &mut writer,
                json!({"sequence": first["sequence"], "error": "flash write failed"}),
            );
        });

        let conn = Connection::open(&addr).unwrap();

        let (first, second) = thread::scope(|scope| {
            let first = scope.spawn(|| conn.call(Request::ListConnectedDevices));
            // The server pairs replies by arrival order, so make the
            // send order deterministic.
            thread::sleep(Duration::from_millis(50));
            let second = scope.spawn(|| conn.call(Request::ListConnectedDevices));
            (first.join().unwrap(), second.join().unwrap())
        });

        assert!(matches!(first, Err(ClientError::Device { message }) if message == "flash write failed"));
        assert_eq!(second.unwrap().sequence, 3);

        drop(conn);
        server.join().unwrap();
    }

    #[test]
    fn malformed_and_unmatched_frames_do_not_end_session() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            answer_enumeration(&mut reader, &mut writer, &["FC1"]);

            let request = read_request(&mut reader);
            // Garbage, a reply that was never requested, then the real
            // answer.
            writer.send(b"{not-json").unwrap();
            send_json(&mut writer, json!({"sequence": 9999}));
            send_json(&mut writer, json!({"sequence": request["sequence"]}));
        });

        let conn = Connection::open(&addr).unwrap();
        let reply = conn.call(Request::ListConnectedDevices).unwrap();
        assert_eq!(reply.sequence, 2);
        assert_eq!(conn.pending_len(), 0);

        drop(conn);
        server.join().unwrap();
    }

    #[test]
    fn sequence_ids_start_at_one_and_increase() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            let mut seen = Vec::new();
            for _ in 0..3 {
                let request = read_request(&mut reader);
                seen.push(request["sequence"].as_u64().unwrap());
                send_json(
                    &mut writer,
                    json!({"sequence": request["sequence"], "devices": []}),
                );
            }
            assert_eq!(seen, vec![1, 2, 3]);
        });

        let conn = Connection::open(&addr).unwrap();
        conn.call(Request::ListConnectedDevices).unwrap();
        conn.call(Request::ListConnectedDevices).unwrap();

        drop(conn);
        server.join().unwrap();
    }

    #[test]
    fn server_disconnect_fails_in_flight_call() {
        let (addr, server) = spawn_server(|mut reader, mut writer| {
            answer_enumeration(&mut reader, &mut writer, &[]);
            // Read the next request, then hang up without answering.
            let _ = read_request(&mut reader);
        });

        let conn = Connection::open(&addr).unwrap();
        let result = conn.call_with_timeout(Request::ListConnectedDevices, Duration::from_secs(5));
        assert!(matches!(result, Err(ClientError::Closed)));

        drop(conn);
        server.join().unwrap();
    }
}
