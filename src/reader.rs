//! Lazy record reader over a line-oriented source.
//!
//! Each call to [`RecordReader::next_record`] consumes and tokenizes exactly one
//! line. Header handling is left to the caller. Bytes that are not valid UTF-8
//! are replaced with U+FFFD so one badly encoded line never stops a load.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CensusError, Result};
use crate::tokenizer::tokenize;

pub type Record = Vec<String>;

#[derive(Debug)]
pub struct RecordReader<R> {
    source: R,
    line: Vec<u8>,
    line_number: usize,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Returns whether another line is available without consuming it.
    pub fn has_next(&mut self) -> Result<bool> {
        Ok(!self.source.fill_buf()?.is_empty())
    }

    pub fn next_record(&mut self) -> Result<Record> {
        self.line.clear();
        if self.source.read_until(b'\n', &mut self.line)? == 0 {
            return Err(CensusError::EndOfRecords);
        }
        self.line_number += 1;
        let text = String::from_utf8_lossy(&self.line);
        if let Cow::Owned(_) = text {
            tracing::debug!(line = self.line_number, "replaced invalid UTF-8 bytes");
        }
        Ok(tokenize(&text))
    }

    /// 1-based number of the last line returned, 0 before the first read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Err(CensusError::EndOfRecords) => None,
            other => Some(other),
        }
    }
}
