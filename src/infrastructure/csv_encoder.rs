//! Comma-separated export of harvested reviews.
//!
//! Cells are quoted only when they contain a comma, a double quote or a line
//! break; rows are joined with `\n` and the header row always comes first.

use thiserror::Error;

use crate::domain::review::ReviewRecord;

pub const COLUMNS: [&str; 8] = [
    "rating", "date", "user", "verified", "content", "sku", "likes", "images",
];

/// Joins a record's image URLs into a single cell.
pub const IMAGE_SEPARATOR: &str = " | ";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn row(record: &ReviewRecord) -> [String; 8] {
    [
        record.rating.map(|r| r.to_string()).unwrap_or_default(),
        record.date.clone().unwrap_or_default(),
        record.user.clone().unwrap_or_default(),
        record.verified.to_string(),
        record.content.clone(),
        record.sku.clone(),
        record.likes.to_string(),
        record.images.join(IMAGE_SEPARATOR),
    ]
}

/// Header plus one row per record, in accumulation order.
pub fn encode_reviews(records: &[ReviewRecord]) -> Result<String, EncodeError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(row(record))?;
    }

    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    let mut encoded = String::from_utf8(bytes)?;
    if encoded.ends_with('\n') {
        encoded.pop();
    }
    Ok(encoded)
}
