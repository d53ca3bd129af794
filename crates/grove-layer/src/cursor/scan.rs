//! Scan strategies of the group cursor.

use std::sync::Arc;

use grove_common::error::GroveResult;
use grove_common::types::{Key, Value as StoredValue};

use crate::store::{RawScan, StoreAdapter};

use super::stats::ScanStats;

/// How an open cursor walks the group keyspace.
pub(crate) enum GroupScan {
    /// Every row of the group.
    Full(Box<dyn RawScan>),
    /// The anchor row and all of its descendants.
    WithDescendants(Box<dyn RawScan>),
    /// Only the anchor row: one point read, then exhausted.
    WithoutDescendants {
        adapter: Arc<dyn StoreAdapter>,
        key: Key,
        value: Option<StoredValue>,
        advanced: bool,
    },
}

impl GroupScan {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            GroupScan::Full(_) => "full",
            GroupScan::WithDescendants(_) => "hkey with descendants",
            GroupScan::WithoutDescendants { .. } => "hkey without descendants",
        }
    }

    /// Steps to the next entry; false once exhausted.
    pub(crate) fn advance(&mut self, stats: &ScanStats) -> GroveResult<bool> {
        stats.record_traversal();
        match self {
            GroupScan::Full(scan) | GroupScan::WithDescendants(scan) => scan.next_raw_entry(),
            GroupScan::WithoutDescendants {
                adapter,
                key,
                value,
                advanced,
            } => {
                if *advanced {
                    *value = None;
                    return Ok(false);
                }
                *advanced = true;
                *value = adapter.get(key.as_bytes())?;
                Ok(value.is_some())
            }
        }
    }

    /// The raw key and value the scan is positioned on.
    pub(crate) fn current(&self) -> Option<(&[u8], &[u8])> {
        match self {
            GroupScan::Full(scan) | GroupScan::WithDescendants(scan) => scan
                .current()
                .map(|e| (e.key.as_bytes(), e.value.as_bytes())),
            GroupScan::WithoutDescendants { key, value, .. } => {
                value.as_ref().map(|v| (key.as_bytes(), v.as_bytes()))
            }
        }
    }
}
