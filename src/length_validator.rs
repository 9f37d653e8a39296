use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum LengthValidationError {
    /// A single fragment is longer than the original read
    SplitTooLong { split_len: u32, read_len: u32 },
    /// Shortest plus longest fragment does not add up to the original read
    LengthMismatch { specified: u32, computed: u64 },
}

impl fmt::Display for LengthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthValidationError::SplitTooLong {
                split_len,
                read_len,
            } => write!(
                f,
                "Read length validation failed. Split length {} exceeds specified read length {}",
                split_len, read_len
            ),
            LengthValidationError::LengthMismatch {
                specified,
                computed,
            } => write!(
                f,
                "Read length validation failed. Specified length {} doesn't equal computed length {}",
                specified, computed
            ),
        }
    }
}

impl std::error::Error for LengthValidationError {}

/// Tracks the shortest and longest split lengths seen during key discovery
/// and checks them against the configured read length.
#[derive(Debug)]
pub struct ReadLengthValidator {
    read_len: u32,
    min_len: u32,
    max_len: u32,
}

impl ReadLengthValidator {
    pub fn new(read_len: u32) -> Self {
        ReadLengthValidator {
            read_len,
            min_len: read_len,
            max_len: 0,
        }
    }

    pub fn observe(&mut self, split_len: u32) -> Result<(), LengthValidationError> {
        if split_len > self.read_len {
            return Err(LengthValidationError::SplitTooLong {
                split_len,
                read_len: self.read_len,
            });
        }
        self.min_len = self.min_len.min(split_len);
        self.max_len = self.max_len.max(split_len);
        Ok(())
    }

    /// Nothing observed leaves min at the read length and max at zero, which
    /// passes.
    pub fn finalize(&self) -> Result<(), LengthValidationError> {
        let computed = u64::from(self.min_len) + u64::from(self.max_len);
        if computed != u64::from(self.read_len) {
            return Err(LengthValidationError::LengthMismatch {
                specified: self.read_len,
                computed,
            });
        }
        Ok(())
    }
}
