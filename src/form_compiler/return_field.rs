// SPDX-License-Identifier: MIT OR Apache-2.0

//! Return column attribution.
//!
//! A return column is written `<shardAddress>_<column>`. Only the first shard
//! of a source is addressable, so every source scans the return columns once
//! with its first shard address as the key.

use crate::query_api::definition::ShowColumnRange;

/// Separates the shard address from the column name.
pub const FIELD_DELIMITER: char = '_';

/// Column name selecting every column of a source.
pub const WILDCARD_COLUMN: &str = "*";

/// Columns claimed by one source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribution {
    pub columns: Vec<String>,
    pub range: ShowColumnRange,
    /// Positions in the return column list claimed by this source
    pub claimed: Vec<usize>,
}

impl Attribution {
    /// Number of return columns attributed to the source.
    #[inline]
    pub fn count(&self) -> usize {
        self.claimed.len()
    }
}

/// Column name of `entry` if it belongs to the shard at `address`.
pub fn strip_shard_prefix<'a>(entry: &'a str, address: &str) -> Option<&'a str> {
    entry
        .strip_prefix(address)
        .and_then(|rest| rest.strip_prefix(FIELD_DELIMITER))
}

/// Scan `return_fields` for columns of the shard at `first_shard`.
///
/// A wildcard drops the columns collected so far, is claimed once and ends the
/// scan, so later entries for the same shard stay unclaimed.
pub fn attribute_columns(first_shard: &str, return_fields: &[String]) -> Attribution {
    let mut attribution = Attribution::default();

    for (idx, entry) in return_fields.iter().enumerate() {
        let Some(column) = strip_shard_prefix(entry, first_shard) else {
            continue;
        };

        attribution.claimed.push(idx);
        if column == WILDCARD_COLUMN {
            attribution.columns.clear();
            attribution.range = ShowColumnRange::All;
            break;
        }

        attribution.columns.push(column.to_string());
        attribution.range = ShowColumnRange::Select;
    }

    attribution
}

/// Build the return column entry for `column` of the shard at `address`.
pub fn return_field_entry(address: &str, column: &str) -> String {
    let mut entry = String::with_capacity(address.len() + 1 + column.len());
    entry.push_str(address);
    entry.push(FIELD_DELIMITER);
    entry.push_str(column);
    entry
}
