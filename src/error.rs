use thiserror::Error;

/// Why an export could not be turned into records. Every variant is terminal
/// for that parse attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not read headers from the file: the header row is empty.")]
    EmptyHeader,

    #[error(
        "No recognizable ad export columns found. Columns like 'Reporting Starts', \
         'Amount Spent (USD)', 'Country' and 'Campaign Name' might be missing or misnamed."
    )]
    NoRecognizedColumns,

    #[error(
        "No usable rows: data is missing critical fields (date, spend, country or campaign) \
         after parsing."
    )]
    NoValidRecords,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
