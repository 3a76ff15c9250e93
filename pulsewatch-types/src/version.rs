//! Report schema versioning.

/// Version stamp carried by every [`StatusReport`](crate::StatusReport).
///
/// Consumers should check [`is_compatible`](Self::is_compatible) before
/// interpreting a report: a major bump means existing fields changed
/// meaning, a minor bump only adds fields that older readers may ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct SchemaVersion {
    /// Incremented when existing report fields change shape or meaning.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub major: u32,

    /// Incremented for additions older readers can safely skip.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub minor: u32,
}

impl SchemaVersion {
    /// The version this library stamps into the reports it builds.
    pub const CURRENT: Self = Self::new(1, 0);

    /// A specific schema version, e.g. parsed from a foreign report.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether a report carrying this version can be read by this library.
    /// Minor drift is tolerated; a different major is not.
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl core::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
