//! Error types of the fleet resolution pipeline

/// Root error type for snapshot loading and view projection
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// A dataset could not be read or is not valid JSON of the expected shape
    #[error("malformed `{dataset}` dataset: {source}")]
    Malformed {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A record's date string could not be parsed
    ///
    /// Raised per record at the boundary that parses the dataset. The
    /// offending record is excluded from its stream and the fetch
    /// continues with the remaining records.
    #[error("invalid date `{raw}` for equipment `{equipment_id}`: {source}")]
    InvalidDate {
        equipment_id: String,
        raw: String,
        #[source]
        source: time::error::Parse,
    },

    /// A display date format description could not be parsed
    #[error("invalid date format description: {0}")]
    InvalidFormat(#[from] time::error::InvalidFormatDescription),

    /// A resolved timestamp could not be rendered with the configured format
    #[error("failed on format the date: {0}")]
    DateFormat(#[from] time::error::Format),

    /// A CSV positions row could not be read
    #[cfg(feature = "csv")]
    #[error("failed on read some row: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV positions row misses a required field
    #[cfg(feature = "csv")]
    #[error("{field} field not found on row {row}")]
    MissingField { field: &'static str, row: u64 },

    /// A CSV positions row carries an unparsable coordinate
    #[cfg(feature = "csv")]
    #[error("invalid {field} format on row {row}: {source}")]
    InvalidCoordinate {
        field: &'static str,
        row: u64,
        #[source]
        source: std::num::ParseFloatError,
    },
}

pub type Result<T> = std::result::Result<T, FleetError>;
