//! XA transaction identifiers, flags and votes.

use std::fmt;
use uuid::Uuid;

/// Format identifier used by [`Xid::generate`].
pub const KVORM_FORMAT_ID: i32 = 0x6b76_6f72;

/// Global transaction identifier handed to a resource by the transaction manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Xid {
    format_id: i32,
    global_id: Vec<u8>,
    branch_qualifier: Vec<u8>,
}

impl Xid {
    /// Creates an identifier from its three parts.
    #[must_use]
    pub fn new(format_id: i32, global_id: Vec<u8>, branch_qualifier: Vec<u8>) -> Self {
        Self {
            format_id,
            global_id,
            branch_qualifier,
        }
    }

    /// Creates a fresh identifier with a random global id and no branch.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(
            KVORM_FORMAT_ID,
            Uuid::new_v4().as_bytes().to_vec(),
            Vec::new(),
        )
    }

    /// Returns the format identifier.
    #[must_use]
    pub fn format_id(&self) -> i32 {
        self.format_id
    }

    /// Returns the global transaction id.
    #[must_use]
    pub fn global_id(&self) -> &[u8] {
        &self.global_id
    }

    /// Returns the branch qualifier.
    #[must_use]
    pub fn branch_qualifier(&self) -> &[u8] {
        &self.branch_qualifier
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:", self.format_id)?;
        for b in &self.global_id {
            write!(f, "{b:02x}")?;
        }
        f.write_str(":")?;
        for b in &self.branch_qualifier {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Flags passed to `start`, `end` and `recover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XaFlags(pub u32);

impl XaFlags {
    /// No flags.
    pub const NO_FLAGS: Self = Self(0);
    /// Join an existing branch.
    pub const JOIN: Self = Self(0x0020_0000);
    /// End a recovery scan.
    pub const END_RSCAN: Self = Self(0x0080_0000);
    /// Start a recovery scan.
    pub const START_RSCAN: Self = Self(0x0100_0000);
    /// Suspend the association.
    pub const SUSPEND: Self = Self(0x0200_0000);
    /// Work completed successfully.
    pub const SUCCESS: Self = Self(0x0400_0000);
    /// Resume a suspended association.
    pub const RESUME: Self = Self(0x0800_0000);
    /// Work failed; the branch will be rolled back.
    pub const FAIL: Self = Self(0x2000_0000);
    /// Commit in one phase.
    pub const ONE_PHASE: Self = Self(0x4000_0000);

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A resource's answer to `prepare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareVote {
    /// The branch is ready to commit.
    Ok,
    /// The branch did no work; there is nothing to commit.
    ReadOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        let a = Xid::generate();
        let b = Xid::generate();
        assert_ne!(a, b);
        assert_eq!(a.format_id(), KVORM_FORMAT_ID);
        assert_eq!(a.global_id().len(), 16);
        assert!(a.branch_qualifier().is_empty());
    }

    #[test]
    fn display_is_hex() {
        let xid = Xid::new(1, vec![0xab, 0x01], vec![0xff]);
        assert_eq!(format!("{xid}"), "1:ab01:ff");
    }

    #[test]
    fn flags_contains() {
        let flags = XaFlags::SUCCESS.union(XaFlags::ONE_PHASE);
        assert!(flags.contains(XaFlags::SUCCESS));
        assert!(flags.contains(XaFlags::ONE_PHASE));
        assert!(!flags.contains(XaFlags::FAIL));
        assert!(flags.contains(XaFlags::NO_FLAGS));
    }
}
