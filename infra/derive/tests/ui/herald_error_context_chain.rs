use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum SinkError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Closed{}: {message}", format_context(.context))]
    Closed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), SinkError> {
    Err(std::io::Error::other("disk")).context("Reading sink")
}

fn close() -> Result<(), SinkError> {
    Err(SinkError::Closed { message: "sink".into(), context: None }).context("Closing sink")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading sink): disk");

    let err = close().unwrap_err();
    assert_eq!(err.to_string(), "Closed (Closing sink): sink");
}
