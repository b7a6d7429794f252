/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration for the `dirtreectl` concurrency stress driver.
//!
//! Grounded on `diffuzzer::config::Config` (a `serde`-derived struct loaded
//! from a TOML file), cut down to the knobs the stress scenario in spec.md
//! §8 scenario 6 actually needs: thread count, operations per thread, the
//! component alphabet, and the maximum path depth operations are generated
//! against.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StressConfig {
    /// Number of threads concurrently hammering the tree.
    pub threads: u32,
    /// Operations each thread performs before joining.
    pub operations_per_thread: u32,
    /// Component alphabet operations are generated from (spec.md §8 uses
    /// `a`-`d`).
    pub alphabet: String,
    /// Maximum path depth a generated operation may address.
    pub max_depth: u8,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            threads: 100,
            operations_per_thread: 20,
            alphabet: "abcd".to_string(),
            max_depth: 4,
        }
    }
}

impl StressConfig {
    /// Loads a config from a TOML file. `toml`'s flat deserialization has no
    /// partial-merge-with-defaults step, so a missing or unreadable file
    /// falls back to [`Default::default`] wholesale rather than per-field.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_scenario_six() {
        let config = StressConfig::default();
        assert_eq!(100, config.threads);
        assert_eq!(20, config.operations_per_thread);
        assert_eq!("abcd", config.alphabet);
        assert_eq!(4, config.max_depth);
    }
}
