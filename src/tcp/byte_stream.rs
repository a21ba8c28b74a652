/// In-order bytes accepted from the peer, waiting for the application.
#[derive(Debug, Default)]
pub struct ByteStream {
    buffer: Vec<u8>,
}

impl ByteStream {
    pub fn new() -> Self {
        ByteStream { buffer: Vec::new() }
    }

    /// Append bytes to the end of the stream
    pub fn write_bytes(&mut self, data: &[u8]) -> usize {
        self.buffer.extend_from_slice(data);
        data.len()
    }

    /// Swap out everything buffered so far, leaving the stream empty
    pub fn take_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// The number of bytes still available in the buffer (not consumed yet)
    pub fn bytes_available(&self) -> usize {
        self.buffer.len()
    }
}
