use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions for one frame decode. Table errors are raised before any
/// pixel work starts; no partial record is ever emitted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("identity table key {0:?} is not a positive integer pass index")]
    BadPassIndex(String),

    #[error("identity table has no entry for pass index {0}; pass indices must be contiguous from 1")]
    NonContiguousPasses(usize),

    #[error("object {0} is referenced but has no whole-object entry")]
    MissingWholeObject(u32),

    #[error("object {0} has more than one whole-object entry")]
    DuplicateWholeObject(u32),

    #[error("pass {pass_index}: part entry name {name:?} is not of the form \"object.part\"")]
    BadEntryName { pass_index: usize, name: String },

    #[error("pass {pass_index}: object index {object_index} exceeds the {max} encodable object slots")]
    ObjectIndexRange {
        pass_index: usize,
        object_index: u32,
        max: u32,
    },

    #[error("pass {pass_index}: part index {part_index} is outside the encodable range")]
    PartIndexRange { pass_index: usize, part_index: i32 },

    #[error("pixel buffer holds {actual} samples, expected {expected} for {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
