// Error type for tag file decoding and the write-side primitives.
//
// Every variant carries enough context (section tag, byte offset within that
// section's payload, offending value) to locate the problem in the input.
// Variants are grouped into the coarse `ErrorKind` categories callers are
// expected to branch on.

use thiserror::Error;

use crate::tag::section::Tag;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Declared length, magic tag or SDK version does not match.
    FormatMismatch,
    /// A required section is absent.
    MissingSection,
    /// An index is out of range or the byte layout is inconsistent.
    CorruptIndex,
    /// The input uses a format feature this decoder does not handle.
    UnsupportedFeature,
    /// A value cannot be represented by the encoding.
    ValueOutOfRange,
    /// Underlying I/O failure (write helpers only).
    Io,
}

#[derive(Debug, Error)]
pub enum TagError {
    /// Declared container length differs from the input length.
    #[error("container length mismatch: header says {declared} bytes, input has {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    /// The outermost section is not `TAG0`.
    #[error("bad magic: expected {expected}, found {found}")]
    BadMagic { expected: Tag, found: Tag },

    /// SDKV names a version other than the supported one.
    #[error("unsupported SDK version '{found}', expected '{expected}'")]
    SdkVersion {
        expected: &'static str,
        found: String,
    },

    /// A required sub-section is absent from a framed buffer.
    #[error("{parent}: missing required section {tag}")]
    MissingSection { parent: Tag, tag: Tag },

    /// The same tag appeared twice in one framing pass.
    #[error("{parent}: duplicate section {tag} at offset {offset}")]
    DuplicateSection { parent: Tag, tag: Tag, offset: usize },

    /// A section header declares a length shorter than the header itself.
    #[error("{parent}: section {tag} at offset {offset} declares invalid length {length}")]
    SectionLength {
        parent: Tag,
        tag: Tag,
        offset: usize,
        length: u32,
    },

    /// TBOD holds a second body for a type that already has one.
    #[error("{section}+{offset}: second body for type {type_index}")]
    DuplicateBody {
        section: Tag,
        offset: usize,
        type_index: u32,
    },

    /// A type or string index falls outside its table.
    #[error("{section}+{offset}: {what} index {index} out of range (table size {limit})")]
    IndexOutOfRange {
        section: Tag,
        offset: usize,
        what: &'static str,
        index: u32,
        limit: usize,
    },

    /// A read ran past the end of the section payload.
    #[error("{section}+{offset}: truncated, need {needed} bytes but only {available} remain")]
    Truncated {
        section: Tag,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A fixed-size record loop ended with a partial record.
    #[error("{section}+{offset}: {remaining} trailing bytes do not form a whole {record}-byte record")]
    Misaligned {
        section: Tag,
        offset: usize,
        remaining: usize,
        record: usize,
    },

    /// Packed integer lead byte uses the reserved `1111` prefix.
    #[error("{section}+{offset}: reserved packed integer prefix {lead:#04X}")]
    PackedPrefix {
        section: Tag,
        offset: usize,
        lead: u8,
    },

    /// A string table entry is unterminated or not ASCII.
    #[error("{section}+{offset}: malformed string")]
    InvalidString { section: Tag, offset: usize },

    /// A patch record declares a negative offset count.
    #[error("{section}+{offset}: negative record count {count}")]
    NegativeCount {
        section: Tag,
        offset: usize,
        count: i32,
    },

    /// A type uses the flag bit this decoder does not understand.
    #[error("{section}+{offset}: type {type_index} sets unsupported flag bits {flags:#X}")]
    UnsupportedFlags {
        section: Tag,
        offset: usize,
        type_index: u32,
        flags: u32,
    },

    /// A value is too large for the encoding.
    #[error("value {value:#X} exceeds encodable maximum {max:#X}")]
    ValueOutOfRange { value: u64, max: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagError {
    /// Coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. } | Self::BadMagic { .. } | Self::SdkVersion { .. } => {
                ErrorKind::FormatMismatch
            }
            Self::MissingSection { .. } => ErrorKind::MissingSection,
            Self::DuplicateSection { .. }
            | Self::DuplicateBody { .. }
            | Self::SectionLength { .. }
            | Self::IndexOutOfRange { .. }
            | Self::Truncated { .. }
            | Self::Misaligned { .. }
            | Self::PackedPrefix { .. }
            | Self::InvalidString { .. }
            | Self::NegativeCount { .. } => ErrorKind::CorruptIndex,
            Self::UnsupportedFlags { .. } => ErrorKind::UnsupportedFeature,
            Self::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, TagError>;
