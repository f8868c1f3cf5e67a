//! Run-scoped state shared by every field of one conversion

#[cfg(feature = "std")]
use crate::error::CodecError;
#[cfg(feature = "std")]
use std::io::{ErrorKind, Read, Seek, SeekFrom};

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// State that lives exactly as long as one unpack run.
///
/// The starting year is written once, when the walker reaches the sentinel
/// region, and read by every date-dependent annotation after that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    starting_year: Option<i32>,
}

impl RunContext {
    /// Fresh context with nothing captured
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting year, once captured
    pub fn starting_year(&self) -> Option<i32> {
        self.starting_year
    }

    /// Store the starting year; later calls are ignored
    pub fn set_starting_year(&mut self, year: i32) {
        if self.starting_year.is_none() {
            self.starting_year = Some(year);
        }
    }

    /// Peek `jump` bytes ahead for the starting year and come back.
    ///
    /// The cursor ends exactly where it started. A stream too short for the
    /// jump fails with `TruncatedStream`.
    #[cfg(feature = "std")]
    pub fn capture_starting_year<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        region: &str,
        jump: i64,
    ) -> Result<i32, CodecError> {
        if let Some(year) = self.starting_year {
            #[cfg(feature = "logging")]
            debug!("Starting year already captured ({}), skipping jump", year);
            return Ok(year);
        }

        let truncated = || CodecError::TruncatedStream {
            region: region.into(),
            needed: usize::try_from(jump.unsigned_abs().saturating_add(4))
                .unwrap_or(usize::MAX),
        };

        reader.seek(SeekFrom::Current(jump))?;
        let mut word = [0u8; 4];
        if let Err(e) = reader.read_exact(&mut word) {
            return Err(if e.kind() == ErrorKind::UnexpectedEof {
                truncated()
            } else {
                e.into()
            });
        }
        reader.seek(SeekFrom::Current(-jump - 4))?;

        let year = i32::from_le_bytes(word);
        self.starting_year = Some(year);

        #[cfg(feature = "logging")]
        info!("Captured starting year {} after {}", year, region);

        Ok(year)
    }
}
