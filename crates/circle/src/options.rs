/// Bitmask of recognised run options. Unrecognised bits are ignored rather
/// than rejected, matching the historical flags-word convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionFlags(u32);

/// Idle ranks pick a steal target uniformly at random. Default.
pub const SPLIT_RANDOM: OptionFlags = OptionFlags(1 << 0);
/// Idle ranks pick a steal target round-robin, starting at `(self+1) mod N`.
/// Alias for "not `SPLIT_RANDOM`"; setting this bit clears the random bit.
pub const SPLIT_EQUAL: OptionFlags = OptionFlags(1 << 1);
/// Run the creator callback on every rank, not only rank 0.
pub const CREATE_GLOBAL: OptionFlags = OptionFlags(1 << 2);

impl OptionFlags {
    /// The empty flag set.
    pub const NONE: OptionFlags = OptionFlags(0);

    /// Combines two flag sets.
    #[must_use]
    pub fn union(self, other: OptionFlags) -> OptionFlags {
        OptionFlags(self.0 | other.0)
    }

    fn contains(self, bit: OptionFlags) -> bool {
        self.0 & bit.0 == bit.0
    }

    pub fn create_global(self) -> bool {
        self.contains(CREATE_GLOBAL)
    }

    /// Resolves the effective target-selection policy: `SPLIT_EQUAL` wins if
    /// both are somehow set, since it is the one explicit opt-out from the
    /// default.
    pub fn split_equal(self) -> bool {
        self.contains(SPLIT_EQUAL)
    }
}

impl Default for OptionFlags {
    fn default() -> Self {
        SPLIT_RANDOM
    }
}

impl std::ops::BitOr for OptionFlags {
    type Output = OptionFlags;
    fn bitor(self, rhs: OptionFlags) -> OptionFlags {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_split_random() {
        assert!(!OptionFlags::default().split_equal());
        assert!(!OptionFlags::default().create_global());
    }

    #[test]
    fn union_combines_bits() {
        let flags = SPLIT_EQUAL | CREATE_GLOBAL;
        assert!(flags.split_equal());
        assert!(flags.create_global());
    }

    #[test]
    fn unrecognised_bits_are_harmless() {
        let flags = OptionFlags(1 << 31);
        assert!(!flags.split_equal());
        assert!(!flags.create_global());
    }
}
