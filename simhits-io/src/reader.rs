//! JSON-lines event file reader.
//!
//! Each non-blank line holds one serialized [`EventNavigator`]:
//!
//! ```text
//! {"sim_header":{"event":{"event_id":1,"tracks":[...],"hits":[...]}}}
//! ```

use crate::source::{EventNavigator, NavBuffer};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Reader for simulated event files.
pub struct EventFileReader {
    reader: BufReader<File>,
    path: PathBuf,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates over the navigators in file order.
    #[must_use]
    pub fn navigators(self) -> NavigatorLines<BufReader<File>> {
        NavigatorLines::new(self.reader)
    }

    /// Reads every navigator into memory.
    ///
    /// # Errors
    /// Returns the first read or parse error.
    pub fn read_all(self) -> Result<Vec<EventNavigator>> {
        self.navigators().collect()
    }

    /// Reads every navigator into a fresh [`NavBuffer`].
    ///
    /// # Errors
    /// Returns the first read or parse error.
    pub fn into_buffer(self) -> Result<NavBuffer> {
        self.navigators().collect()
    }
}

/// Iterator parsing one navigator per line.
pub struct NavigatorLines<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> NavigatorLines<R> {
    /// Wraps any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for NavigatorLines<R> {
    type Item = Result<EventNavigator>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(serde_json::from_str(trimmed).map_err(|e| {
                Error::InvalidFormat(format!("line {}: {e}", self.line_no))
            }));
        }
    }
}
