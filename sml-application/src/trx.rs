//! Transaction id generator
//!
//! A transaction id consists of a random decimal prefix and a counter,
//! rendered as `"<prefix>-<counter>"`. The prefix identifies a session, the
//! counter the message within it.

use crate::config::TrxConfig;
use rand::Rng;
use std::fmt;

/// Transaction id generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrxGenerator {
    prefix: String,
    counter: u16,
}

impl TrxGenerator {
    /// Create a generator with the default prefix length
    pub fn new() -> Self {
        Self::from_config(&TrxConfig::default())
    }

    pub fn from_config(config: &TrxConfig) -> Self {
        Self {
            prefix: random_digits(config.prefix_length),
            counter: 0,
        }
    }

    /// Draw a new prefix of `length` digits and restart the counter
    ///
    /// A non-empty prefix of unchanged length is redrawn until it differs
    /// from the previous one.
    pub fn regenerate(&mut self, length: usize) {
        let mut prefix = random_digits(length);
        while length > 0 && prefix == self.prefix {
            prefix = random_digits(length);
        }
        log::trace!("transaction prefix {} -> {}", self.prefix, prefix);
        self.prefix = prefix;
        self.counter = 0;
    }

    /// Advance the counter and return the new id
    pub fn pre_increment(&mut self) -> String {
        self.counter = self.counter.wrapping_add(1);
        self.to_string()
    }

    /// Return the current id and advance the counter
    pub fn post_increment(&mut self) -> String {
        let current = self.to_string();
        self.counter = self.counter.wrapping_add(1);
        current
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }
}

impl Default for TrxGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrxGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.counter)
    }
}

fn random_digits(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.gen_range(b'0'..=b'9')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_format() {
        let mut trx = TrxGenerator::new();
        assert_eq!(trx.prefix().len(), 7);
        assert!(trx.prefix().chars().all(|c| c.is_ascii_digit()));
        assert_eq!(trx.to_string(), format!("{}-0", trx.prefix()));
        assert_eq!(trx.post_increment(), format!("{}-0", trx.prefix()));
        assert_eq!(trx.pre_increment(), format!("{}-2", trx.prefix()));
        assert_eq!(trx.counter(), 2);
    }

    #[test]
    fn test_increments_are_unique() {
        let mut trx = TrxGenerator::new();
        let ids: HashSet<String> = (0..1000).map(|_| trx.pre_increment()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_regenerate() {
        let mut trx = TrxGenerator::new();
        trx.pre_increment();
        let before = trx.prefix().to_string();
        trx.regenerate(7);
        assert_ne!(trx.prefix(), before);
        assert_eq!(trx.counter(), 0);

        trx.regenerate(3);
        assert_eq!(trx.prefix().len(), 3);
    }

    #[test]
    fn test_config_prefix_length() {
        let trx = TrxGenerator::from_config(&TrxConfig::new().with_prefix_length(12));
        assert_eq!(trx.prefix().len(), 12);
    }
}
