//! A log line written while the timestep progress bar is drawn would otherwise leave the
//! unoverwritten tail of the bar on screen.

use log::Record;
use log4rs::encode::{Encode, Write};

/// Wraps an encoder and clears the current console line before each record.
#[derive(Debug)]
pub struct PBWrapperEncoder {
    inner: Box<dyn Encode>,
}

impl PBWrapperEncoder {
    pub fn new(inner: Box<dyn Encode>) -> Self {
        Self { inner }
    }
}

impl Encode for PBWrapperEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> Result<(), anyhow::Error> {
        // Erase the whole line and return the cursor to column zero.
        w.write_all(b"\x1B[2K\r")?;
        self.inner.encode(w, record)
    }
}
