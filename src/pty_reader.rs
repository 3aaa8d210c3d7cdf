use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use tracing::debug;

/// Spawns a background thread to read from a PTY.
///
/// The receiver yields chunks until the program closes its side.
pub fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = channel();

    thread::spawn(move || {
        let mut buffer = [0u8; 4096];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break, // EOF
                Ok(n) => {
                    if tx.send(buffer[..n].to_vec()).is_err() {
                        break; // Receiver dropped
                    }
                }
                // Linux reports EIO once the program has exited.
                Err(_) => break,
            }
        }
    });

    rx
}

/// Spawns a background thread copying `input` into the PTY.
pub fn forward_input<R, W>(mut input: R, mut writer: W)
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        if let Err(err) = io::copy(&mut input, &mut writer) {
            debug!("stopped forwarding input: {err}");
        }
    });
}
