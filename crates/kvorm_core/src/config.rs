//! Adapter configuration.

use crate::error::{TxnError, TxnResult};
use kvorm_datastore::TransactionOptions;
use std::collections::HashMap;

/// Property enabling cross-group transactions.
pub const ENABLE_XG_TRANSACTIONS: &str = "kvorm.datastore.enable_xg_transactions";

/// Property choosing whether connections begin datastore transactions.
pub const AUTO_CREATE_TRANSACTION: &str = "kvorm.datastore.auto_create_transaction";

/// Configuration for the XA resources handed to the persistence runtime.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Options used for every datastore transaction the adapter begins.
    pub txn_options: TransactionOptions,

    /// Whether resources manage a real datastore transaction. When false,
    /// the runtime gets a resource that only tracks the XA lifecycle.
    pub auto_create_transaction: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            txn_options: TransactionOptions::default(),
            auto_create_transaction: true,
        }
    }
}

impl AdapterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether cross-group transactions are allowed.
    #[must_use]
    pub const fn xg_transactions(mut self, value: bool) -> Self {
        self.txn_options = self.txn_options.xg(value);
        self
    }

    /// Sets whether resources begin datastore transactions.
    #[must_use]
    pub const fn auto_create_transaction(mut self, value: bool) -> Self {
        self.auto_create_transaction = value;
        self
    }

    /// Builds a configuration from persistence properties.
    ///
    /// Unknown properties are ignored. Absent properties keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TxnError::InvalidConfig`] if a known property is not
    /// `true` or `false` (case-insensitive).
    pub fn from_properties(props: &HashMap<String, String>) -> TxnResult<Self> {
        let mut config = Self::default();
        if let Some(xg) = bool_property(props, ENABLE_XG_TRANSACTIONS)? {
            config = config.xg_transactions(xg);
        }
        if let Some(auto) = bool_property(props, AUTO_CREATE_TRANSACTION)? {
            config = config.auto_create_transaction(auto);
        }
        Ok(config)
    }
}

fn bool_property(props: &HashMap<String, String>, key: &str) -> TxnResult<Option<bool>> {
    let Some(raw) = props.get(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(TxnError::invalid_config(key, raw.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_config() {
        let config = AdapterConfig::default();
        assert!(!config.txn_options.is_xg());
        assert!(config.auto_create_transaction);
    }

    #[test]
    fn builder_pattern() {
        let config = AdapterConfig::new()
            .xg_transactions(true)
            .auto_create_transaction(false);

        assert!(config.txn_options.is_xg());
        assert!(!config.auto_create_transaction);
    }

    #[test]
    fn xg_enabled_by_property() {
        let config = AdapterConfig::from_properties(&props(&[(ENABLE_XG_TRANSACTIONS, "true")]))
            .unwrap();
        assert!(config.txn_options.is_xg());
    }

    #[test]
    fn xg_disabled_by_property() {
        let config = AdapterConfig::from_properties(&props(&[(ENABLE_XG_TRANSACTIONS, "FALSE")]))
            .unwrap();
        assert!(!config.txn_options.is_xg());
    }

    #[test]
    fn missing_properties_keep_defaults() {
        let config = AdapterConfig::from_properties(&props(&[("unrelated", "x")])).unwrap();
        assert!(!config.txn_options.is_xg());
        assert!(config.auto_create_transaction);
    }

    #[test]
    fn auto_create_by_property() {
        let config =
            AdapterConfig::from_properties(&props(&[(AUTO_CREATE_TRANSACTION, " false ")]))
                .unwrap();
        assert!(!config.auto_create_transaction);
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        let err = AdapterConfig::from_properties(&props(&[(ENABLE_XG_TRANSACTIONS, "yes")]))
            .unwrap_err();
        assert!(matches!(err, TxnError::InvalidConfig { .. }));
    }
}
