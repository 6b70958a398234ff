use thiserror::Error;

/// Internal invariant violations of the level builder.
///
/// These indicate a bug in the tree engine, not bad user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FileError {
    /// A parent level was requested for an empty chunk level.
    #[error("cannot derive a parent level from an empty chunk level")]
    EmptyLevel,

    /// The segment maps past the level's chunks but no carrier is in
    /// flight.
    #[error("segment maps to a promoted chunk but no carrier is in flight")]
    MissingCarrier,
}
