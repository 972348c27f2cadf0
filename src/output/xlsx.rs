use super::SinkError;
use crate::domain::{Listing, LISTING_FIELDS};
use rust_xlsxwriter::{Format, Workbook};

pub fn to_bytes(listings: &[Listing]) -> Result<Vec<u8>, SinkError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Listings")
        .map_err(|e| SinkError::Xlsx(format!("Failed to name worksheet: {}", e)))?;

    // Headers
    let bold = Format::new().set_bold();
    for (col, header) in LISTING_FIELDS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| SinkError::Xlsx(format!("Failed to write header '{}': {}", header, e)))?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, (name, value)) in LISTING_FIELDS.iter().zip(listing.values()).enumerate() {
            worksheet
                .write_string(r, col as u16, value)
                .map_err(|e| SinkError::Xlsx(format!("Failed to write {} in row {}: {}", name, r, e)))?;
        }
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| SinkError::Xlsx(format!("Failed to save workbook: {}", e)))
}
