use super::SinkError;
use crate::domain::Listing;

pub fn to_bytes(listings: &[Listing]) -> Result<Vec<u8>, SinkError> {
    let mut bytes = serde_json::to_vec_pretty(listings)?;
    bytes.push(b'\n');
    Ok(bytes)
}
