//! Character input for `saphyr_parser` decoded incrementally from any `std::io::Read`.
//!
//! Bytes go through `encoding_rs_io`, which sniffs a BOM and decodes UTF-16 to UTF-8 on the
//! fly, then are handed to the parser one `char` at a time from a reusable chunk. The
//! parser's input API has no error channel, so a failing read ends the character stream
//! and parks the error in a cell shared with [`crate::live_events::LiveEvents`].

use std::cell::RefCell;
use std::io::{self, BufReader, Read};
use std::rc::Rc;

use encoding_rs_io::DecodeReaderBytesBuilder;
use saphyr_parser::BufferedInput;

/// Error raised by the reader, waiting to be reported by the next pull or by `close()`.
pub(crate) type SharedIoError = Rc<RefCell<Option<io::Error>>>;

/// Input type the parser is built over when reading from a reader.
pub(crate) type ReaderInput<'a> = BufferedInput<DecodedChars<BufReader<Box<dyn Read + 'a>>>>;

const CHUNK: usize = 8 * 1024;

/// Consecutive empty reads tolerated before the reader is considered broken.
const MAX_EMPTY_READS: usize = 128;

pub(crate) struct DecodedChars<R: Read> {
    reader: R,
    /// Decoded text of the current chunk.
    chunk: String,
    /// Byte position of the next char in `chunk`.
    pos: usize,
    scratch: Vec<u8>,
    /// Decoded bytes handed out so far, checked against `max_bytes`.
    consumed: usize,
    max_bytes: Option<usize>,
    error: SharedIoError,
}

impl<R: Read> DecodedChars<R> {
    fn new(reader: R, max_bytes: Option<usize>, error: SharedIoError) -> Self {
        Self {
            reader,
            chunk: String::new(),
            pos: 0,
            scratch: vec![0u8; CHUNK],
            consumed: 0,
            max_bytes,
            error,
        }
    }

    /// Load the next chunk. `Ok(false)` is end of input.
    fn refill(&mut self) -> io::Result<bool> {
        for _ in 0..MAX_EMPTY_READS {
            let n = self.reader.read(&mut self.scratch)?;
            if n == 0 {
                return Ok(false);
            }
            let text = std::str::from_utf8(&self.scratch[..n])
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if text.is_empty() {
                continue;
            }
            self.consumed = self.consumed.saturating_add(text.len());
            if let Some(limit) = self.max_bytes {
                if self.consumed > limit {
                    return Err(io::Error::new(
                        io::ErrorKind::FileTooLarge,
                        format!("input size limit of {limit} bytes exceeded"),
                    ));
                }
            }
            self.chunk.clear();
            self.chunk.push_str(text);
            self.pos = 0;
            return Ok(true);
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("reader returned no data {MAX_EMPTY_READS} times without reaching EOF"),
        ))
    }
}

impl<R: Read> Iterator for DecodedChars<R> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.chunk[self.pos..].chars().next() {
                self.pos += ch.len_utf8();
                return Some(ch);
            }
            match self.refill() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(error) => {
                    log::debug!("input read failed: {error}");
                    self.error.replace(Some(error));
                    return None;
                }
            }
        }
    }
}

/// Build parser input over `reader`, optionally capped at `max_bytes` decoded bytes.
///
/// Returns the input and the cell where a read failure will be stored.
pub(crate) fn reader_input<'a, R: Read + 'a>(
    reader: R,
    max_bytes: Option<usize>,
) -> (ReaderInput<'a>, SharedIoError) {
    // `None`: sniff the BOM, UTF-8 otherwise.
    let decoder = DecodeReaderBytesBuilder::new().encoding(None).build(reader);
    let error: SharedIoError = Rc::new(RefCell::new(None));
    let chars = DecodedChars::new(
        BufReader::new(Box::new(decoder) as Box<dyn Read + 'a>),
        max_bytes,
        error.clone(),
    );
    (BufferedInput::new(chars), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saphyr_parser::{Event, Parser};
    use std::io::Cursor;

    fn scalars(bytes: Vec<u8>, max_bytes: Option<usize>) -> (Vec<String>, SharedIoError) {
        let (input, error) = reader_input(Cursor::new(bytes), max_bytes);
        let mut out = Vec::new();
        for item in Parser::new(input) {
            match item {
                Ok((Event::Scalar(value, ..), _)) => out.push(value.to_string()),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        (out, error)
    }

    #[test]
    fn decodes_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "---\n[1, 2]\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (values, error) = scalars(bytes, None);
        assert_eq!(values, ["1", "2"]);
        assert!(error.borrow().is_none());
    }

    #[test]
    fn reads_plain_utf8() {
        let (values, _) = scalars("[foo, bär]\n".as_bytes().to_vec(), None);
        assert_eq!(values, ["foo", "bär"]);
    }

    #[test]
    fn size_cap_parks_an_error() {
        let yaml = format!("[{}]\n", "x".repeat(CHUNK * 2));
        let (_, error) = scalars(yaml.into_bytes(), Some(100));
        let error = error.borrow();
        let error = error.as_ref().unwrap();
        assert_eq!(error.kind(), io::ErrorKind::FileTooLarge);
    }
}
