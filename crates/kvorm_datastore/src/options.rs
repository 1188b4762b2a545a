//! Transaction options.

/// Settings applied when a datastore transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionOptions {
    /// Whether the transaction may span more than one entity group.
    pub xg: bool,
}

impl TransactionOptions {
    /// Creates single-group options.
    #[must_use]
    pub const fn new() -> Self {
        Self { xg: false }
    }

    /// Sets whether cross-group transactions are allowed.
    #[must_use]
    pub const fn xg(mut self, value: bool) -> Self {
        self.xg = value;
        self
    }

    /// Returns true if cross-group transactions are allowed.
    #[must_use]
    pub const fn is_xg(&self) -> bool {
        self.xg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_group() {
        assert!(!TransactionOptions::default().is_xg());
        assert_eq!(TransactionOptions::new(), TransactionOptions::default());
    }

    #[test]
    fn builder_enables_xg() {
        assert!(TransactionOptions::new().xg(true).is_xg());
    }
}
