// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User preferences kept in the `settings` table.
//!
//! Payer display labels are loaded once and handed to whoever needs them;
//! nothing in the aggregator or filter reads configuration on its own.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Payer;
use crate::utils::{get_setting, set_setting};

pub const DEFAULT_PERSON_A_LABEL: &str = "Person A";
pub const DEFAULT_PERSON_B_LABEL: &str = "Person B";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayerLabels {
    pub person_a: String,
    pub person_b: String,
}

impl Default for PayerLabels {
    fn default() -> Self {
        Self {
            person_a: DEFAULT_PERSON_A_LABEL.to_string(),
            person_b: DEFAULT_PERSON_B_LABEL.to_string(),
        }
    }
}

impl PayerLabels {
    pub fn load(conn: &Connection) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            person_a: get_setting(conn, &setting_key(Payer::PersonA))?
                .unwrap_or(defaults.person_a),
            person_b: get_setting(conn, &setting_key(Payer::PersonB))?
                .unwrap_or(defaults.person_b),
        })
    }

    pub fn save(conn: &Connection, payer: Payer, label: &str) -> Result<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::EmptyName);
        }
        set_setting(conn, &setting_key(payer), label)?;
        Ok(())
    }
}

fn setting_key(payer: Payer) -> String {
    format!("payer_label.{}", payer.as_str())
}

/// Display label of `payer` under `labels`.
pub fn label(payer: Payer, labels: &PayerLabels) -> &str {
    match payer {
        Payer::PersonA => &labels.person_a,
        Payer::PersonB => &labels.person_b,
    }
}

/// A value/label pair for populating a payer picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayerOption {
    pub value: Payer,
    pub label: String,
}

pub fn payer_options(labels: &PayerLabels) -> Vec<PayerOption> {
    Payer::ALL
        .iter()
        .map(|&payer| PayerOption {
            value: payer,
            label: label(payer, labels).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_reads_from_the_given_labels() {
        let labels = PayerLabels {
            person_a: "Alice".into(),
            person_b: "Bob".into(),
        };
        assert_eq!(label(Payer::PersonA, &labels), "Alice");
        assert_eq!(label(Payer::PersonB, &labels), "Bob");
        assert_eq!(label(Payer::PersonB, &PayerLabels::default()), "Person B");
    }

    #[test]
    fn options_cover_every_payer_in_order() {
        let opts = payer_options(&PayerLabels::default());
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].value, Payer::PersonA);
        assert_eq!(opts[1].label, DEFAULT_PERSON_B_LABEL);
    }
}
