// output/csv.rs
use crate::domain::{Listing, LISTING_FIELDS};

const SEP: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row(out: &mut String, row: &[&str]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(SEP);
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

/// Header row plus one row per listing, UTF-8.
pub fn to_bytes(listings: &[Listing]) -> Vec<u8> {
    let mut out = String::new();
    write_row(&mut out, &LISTING_FIELDS);
    for listing in listings {
        write_row(&mut out, &listing.values());
    }
    out.into_bytes()
}
