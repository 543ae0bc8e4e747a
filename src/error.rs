use thiserror::Error;

/// Raw rows the cleaner cannot normalize. Rows are 1-based data rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanError {
    #[error("row {row}: unknown month token {token:?}")]
    UnknownMonth { row: usize, token: String },

    #[error("row {row}: amount {value:?} does not match \"R$ <int>\"")]
    MalformedAmount { row: usize, value: String },

    #[error("row {row}: call duration {value:?} does not match \"minutes:seconds\"")]
    MalformedDuration { row: usize, value: String },

    #[error("row {row}: unknown payment status {value:?}")]
    UnknownPaymentStatus { row: usize, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("row {row}: month {month} is outside 1..=12")]
    MonthOutOfRange { row: usize, month: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("month selector must be 0 (whole year) or 1..=12, got {0}")]
    MonthOutOfRange(u32),

    #[error("month selector {0:?} is not a number")]
    NotANumber(String),
}
