use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum SinkError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: SinkError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: SinkError = String::from("owned").into();
    assert!(matches!(err, SinkError::Internal { .. }));

    let io = std::io::Error::other("disk");
    let err = SinkError::from(io);
    assert!(matches!(err, SinkError::Io { context: None, .. }));
}
