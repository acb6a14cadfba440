use core::fmt;

/// Failure reported by a persistent storage read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The controller is not initialized or not enabled
    NotReady,
    /// `offset..offset + len` lies outside the device
    OutOfRange { offset: u32, len: usize },
    /// Device or controller specific error code
    Device(i32),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StorageError::NotReady => f.write_str("storage controller not ready"),
            StorageError::OutOfRange { offset, len } => {
                write!(f, "read of {} bytes at {:#010x} is out of range", len, offset)
            }
            StorageError::Device(code) => write!(f, "storage device error {}", code),
        }
    }
}

/// Failure of the secondary core bring-up
///
/// Only the image load can fail; the core stays in reset and the primary core carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootError {
    StorageReadFailure(StorageError),
}

impl From<StorageError> for BootError {
    fn from(e: StorageError) -> Self {
        BootError::StorageReadFailure(e)
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BootError::StorageReadFailure(e) => write!(f, "core1 image load failed: {}", e),
        }
    }
}
