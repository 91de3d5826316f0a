use crate::error::{Error, Result};

/// Payload size of a BBOX block.
pub const BBOX_SIZE: usize = 36;

/// Validate a BBOX payload. Only the all-zero form has been observed, so the
/// block carries no data once validated.
pub fn validate(chunk_data: &[u8], data_offset: usize) -> Result<()> {
    if chunk_data.len() != BBOX_SIZE {
        return Err(Error::structural(
            "BBOX",
            format!("payload must be {BBOX_SIZE} bytes, found {}", chunk_data.len()),
        ));
    }
    if let Some(i) = chunk_data.iter().position(|&b| b != 0) {
        return Err(Error::structural(
            "BBOX",
            format!(
                "nonzero byte {:#04x} at offset {:#x}",
                chunk_data[i],
                data_offset + i
            ),
        ));
    }
    Ok(())
}
