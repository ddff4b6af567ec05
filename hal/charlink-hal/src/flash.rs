//! User flash storage
//!
//! The host can park 16 bytes of its own data in the device and read them
//! back later. Board code decides where in flash that lives.

/// Size of the user flash area in bytes
pub const USER_FLASH_SIZE: usize = 16;

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Nothing has been written yet
    NotFound,
    /// Data corrupted or invalid
    Corrupted,
}

/// Persistent 16-byte user data area
pub trait UserFlash {
    /// Read the stored bytes
    fn read(&mut self, buffer: &mut [u8; USER_FLASH_SIZE]) -> Result<(), FlashError>;

    /// Replace the stored bytes
    fn write(&mut self, data: &[u8; USER_FLASH_SIZE]) -> Result<(), FlashError>;
}

/// Read the user area, treating a blank part as all zeros
pub fn read_or_blank<F: UserFlash + ?Sized>(
    flash: &mut F,
) -> Result<[u8; USER_FLASH_SIZE], FlashError> {
    let mut buffer = [0u8; USER_FLASH_SIZE];
    match flash.read(&mut buffer) {
        Ok(()) => Ok(buffer),
        Err(FlashError::NotFound) => Ok([0u8; USER_FLASH_SIZE]),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MemoryFlash {
        data: Option<[u8; USER_FLASH_SIZE]>,
        fail: bool,
    }

    impl UserFlash for MemoryFlash {
        fn read(&mut self, buffer: &mut [u8; USER_FLASH_SIZE]) -> Result<(), FlashError> {
            if self.fail {
                return Err(FlashError::Flash);
            }
            let data = self.data.ok_or(FlashError::NotFound)?;
            buffer.copy_from_slice(&data);
            Ok(())
        }

        fn write(&mut self, data: &[u8; USER_FLASH_SIZE]) -> Result<(), FlashError> {
            self.data = Some(*data);
            Ok(())
        }
    }

    #[test]
    fn test_blank_reads_as_zeros() {
        let mut flash = MemoryFlash {
            data: None,
            fail: false,
        };
        assert_eq!(read_or_blank(&mut flash), Ok([0u8; USER_FLASH_SIZE]));
    }

    #[test]
    fn test_written_data_is_returned() {
        let mut flash = MemoryFlash {
            data: None,
            fail: false,
        };
        flash.write(&[7u8; USER_FLASH_SIZE]).unwrap();
        assert_eq!(read_or_blank(&mut flash), Ok([7u8; USER_FLASH_SIZE]));
    }

    #[test]
    fn test_hardware_error_propagates() {
        let mut flash = MemoryFlash {
            data: Some([1u8; USER_FLASH_SIZE]),
            fail: true,
        };
        assert_eq!(read_or_blank(&mut flash), Err(FlashError::Flash));
    }
}
