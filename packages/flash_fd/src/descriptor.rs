use std::fmt;

/// Identifier for an open file or directory handle, as handed out by
/// [`Storage`][crate::Storage].
///
/// Descriptors are small integers. The first three values are reserved for
/// the conventional standard streams and never refer to handle table slots;
/// descriptors for storage handles start immediately after them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Descriptor(i32);

impl Descriptor {
    /// The conventional standard input stream.
    pub const STDIN: Self = Self(0);

    /// The conventional standard output stream.
    pub const STDOUT: Self = Self(1);

    /// The conventional standard error stream.
    pub const STDERR: Self = Self(2);

    /// Number of low descriptor values reserved for the standard streams.
    pub(crate) const RESERVED_STREAMS: i32 = 3;

    /// Wraps a raw integer descriptor, typically one received over a C ABI
    /// boundary or parsed from external input.
    ///
    /// No validation happens here; an unknown value is rejected by whatever
    /// operation it is later passed to.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw integer value of this descriptor.
    #[must_use]
    pub const fn into_raw(self) -> i32 {
        self.0
    }

    /// Maps a handle table position to the descriptor that refers to it.
    pub(crate) fn from_position(position: usize) -> Self {
        let base = i32::try_from(position).expect("handle table capacity fits in i32");

        Self(
            base.checked_add(Self::RESERVED_STREAMS)
                .expect("handle table capacity leaves room for the reserved streams"),
        )
    }

    /// The handle table position this descriptor refers to, or `None` for
    /// reserved-stream and negative descriptors.
    pub(crate) fn position(self) -> Option<usize> {
        let offset = self.0.checked_sub(Self::RESERVED_STREAMS)?;
        usize::try_from(offset).ok()
    }

    /// Whether this descriptor names one of the reserved standard streams.
    pub(crate) fn is_reserved_stream(self) -> bool {
        (0..Self::RESERVED_STREAMS).contains(&self.0)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn first_position_maps_past_reserved_streams() {
        let descriptor = Descriptor::from_position(0);

        assert_eq!(descriptor.into_raw(), 3);
        assert_eq!(descriptor.position(), Some(0));
    }

    #[test]
    fn positions_round_trip() {
        for position in 0..16 {
            let descriptor = Descriptor::from_position(position);

            assert_eq!(descriptor.position(), Some(position));
            assert!(!descriptor.is_reserved_stream());
        }
    }

    #[test]
    fn reserved_streams_have_no_position() {
        assert_eq!(Descriptor::STDIN.position(), None);
        assert_eq!(Descriptor::STDOUT.position(), None);
        assert_eq!(Descriptor::STDERR.position(), None);

        assert!(Descriptor::STDIN.is_reserved_stream());
        assert!(Descriptor::STDOUT.is_reserved_stream());
        assert!(Descriptor::STDERR.is_reserved_stream());
    }

    #[test]
    fn negative_descriptors_are_neither_streams_nor_positions() {
        let descriptor = Descriptor::from_raw(-1);

        assert_eq!(descriptor.position(), None);
        assert!(!descriptor.is_reserved_stream());
    }

    #[test]
    fn display_shows_raw_value() {
        assert_eq!(Descriptor::from_raw(7).to_string(), "7");
    }
}
