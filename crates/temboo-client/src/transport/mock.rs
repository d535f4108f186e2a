use std::collections::VecDeque;

use super::{Endpoint, Transport};

/// A scripted in-memory transport.
///
/// Every successful connection pops the next scripted response and records
/// the bytes written through it.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: VecDeque<Vec<u8>>,
    refuse: bool,
    hang: bool,
    write_capacity: Option<usize>,
    open: bool,
    rx: VecDeque<u8>,
    pub(crate) endpoints: Vec<Endpoint>,
    pub(crate) requests: Vec<Vec<u8>>,
    pub(crate) stops: usize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, response: &[u8]) -> Self {
        self.responses.push_back(response.to_vec());
        self
    }

    pub(crate) fn refuse(mut self) -> Self {
        self.refuse = true;
        self
    }

    // Keeps the connection open once the response has been read.
    pub(crate) fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    // Accepts at most `capacity` bytes on each connection.
    pub(crate) fn write_capacity(mut self, capacity: usize) -> Self {
        self.write_capacity = Some(capacity);
        self
    }

    pub(crate) fn request(&self, index: usize) -> String {
        String::from_utf8(self.requests[index].clone()).unwrap()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> bool {
        if self.refuse {
            return false;
        }
        self.endpoints.push(endpoint.clone());
        self.requests.push(Vec::new());
        self.rx = self.responses.pop_front().unwrap_or_default().into();
        self.open = true;
        true
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let Some(request) = self.requests.last_mut().filter(|_| self.open) else {
            return 0;
        };
        let accepted = self
            .write_capacity
            .map_or(bytes.len(), |capacity| {
                bytes.len().min(capacity.saturating_sub(request.len()))
            });
        request.extend_from_slice(&bytes[..accepted]);
        accepted
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn peek(&mut self) -> Option<u8> {
        self.rx.front().copied()
    }

    fn connected(&mut self) -> bool {
        self.open && (self.hang || !self.rx.is_empty())
    }

    fn stop(&mut self) {
        self.open = false;
        self.rx.clear();
        self.stops += 1;
    }
}
