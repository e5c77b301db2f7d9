/// Describes the application specific error kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Error caused by invalid input on the caller side (e.g., a malformed task schedule).
    ClientError,
    /// Unknown error.
    Unknown,
}
