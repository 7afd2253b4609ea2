//! Exit code table shared by producers and the display

/// Exit code used when the display itself fails and no domain error
/// supplied a code. No [`ErrorCode`] maps to this value.
pub const DISPLAY_FAILURE_EXIT_CODE: i32 = 70;

/// Domain error categories reported through error events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unclassified failure
    General,
    /// Bad command line or configuration input
    InvalidArgs,
    /// The image could not be pulled, copied or read
    ImageLoad,
    /// The scan stage failed
    Scan,
    /// Policy validation could not be completed
    Validate,
    /// Remote service unreachable
    Network,
    /// Local filesystem failure
    Io,
}

impl ErrorCode {
    /// Process exit code for this category
    pub fn exit_code(self) -> i32 {
        match self {
            Self::General => 1,
            Self::InvalidArgs => 2,
            Self::ImageLoad => 3,
            Self::Scan => 4,
            Self::Validate => 5,
            Self::Network => 6,
            Self::Io => 74,
        }
    }
}
