// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport to the relay.

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use tm2_common::{Reply, REQUEST_BYTE};

/// Longest line accepted before the reply is considered garbage.
const MAX_LINE_LEN: usize = 128;

pub struct Transport {
    port: Box<dyn SerialPort>,
    port_name: String,
}

impl Transport {
    /// Open `port` as 8N1 at `baud`.
    pub fn new(port: &str, baud: u32, timeout: Duration) -> Result<Self> {
        let serial = serialport::new(port, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(timeout)
            .open()
            .with_context(|| format!("Failed to open {}", port))?;

        Ok(Self {
            port: serial,
            port_name: port.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Ask for the latest time mark and return the raw line and its decoding.
    pub fn request(&mut self) -> Result<(String, Reply)> {
        // Drop anything left over from an earlier, abandoned exchange.
        self.port
            .clear(ClearBuffer::Input)
            .context("Failed to clear input buffer")?;
        self.port
            .write_all(&[REQUEST_BYTE])
            .context("Failed to send request")?;
        self.port.flush()?;

        let line = read_line(&mut self.port)?;
        let reply = Reply::parse(&line).with_context(|| format!("Malformed reply {:?}", line))?;
        Ok((line, reply))
    }
}

/// Read bytes up to and including `\n`, returning the line without terminator.
fn read_line<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => bail!("Link closed before end of reply"),
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => {
                if line.len() == MAX_LINE_LEN {
                    bail!("Reply longer than {} bytes", MAX_LINE_LEN);
                }
                line.push(byte[0]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => bail!("Timed out waiting for reply"),
            Err(e) => return Err(e).context("Failed to read reply"),
        }
    }

    let text = String::from_utf8(line).context("Reply is not ASCII")?;
    Ok(text.trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_strips_crlf() {
        let mut input = Cursor::new(b"12 2245 345600123 456789 21\r\nnext".to_vec());
        let line = read_line(&mut input).unwrap();
        assert_eq!(line, "12 2245 345600123 456789 21");
    }

    #[test]
    fn test_read_line_fails_on_eof() {
        let mut input = Cursor::new(b"-1 0 0".to_vec());
        assert!(read_line(&mut input).is_err());
    }

    #[test]
    fn test_read_line_rejects_runaway_input() {
        let mut input = Cursor::new(vec![b'7'; MAX_LINE_LEN + 10]);
        let err = read_line(&mut input).unwrap_err();
        assert!(err.to_string().contains("longer than"));
    }

    #[test]
    fn test_consecutive_lines() {
        let mut input = Cursor::new(b"-1 0 0 0 0\r\n1 2 3 4 5\r\n".to_vec());
        assert_eq!(read_line(&mut input).unwrap(), "-1 0 0 0 0");
        assert_eq!(read_line(&mut input).unwrap(), "1 2 3 4 5");
    }
}
