use std::borrow::Cow;

/// Errors that can occur when constructing an event bus.
///
/// Registration and dispatch are infallible; only binding a bus to the
/// ambient runtime can fail.
#[herald_derive::herald_error]
pub enum EventBusError {
    /// No Tokio runtime is running on the current thread.
    #[error("Runtime unavailable{}: {source}", format_context(.context))]
    Runtime { source: tokio::runtime::TryCurrentError, context: Option<Cow<'static, str>> },
}
