//! Page status codes and the revision numbering scheme.
//!
//! Every page owns exactly one content row at [`CURRENT_REVISION`] plus a
//! dense, ascending run of backups numbered from `0`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Revision;

/// Sentinel revision number of the live content row.
pub const CURRENT_REVISION: Revision = -1;

/// Value written into every text column of a freshly materialized content row.
pub const PLACEHOLDER: &str = "-";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Access status of a page, persisted as a single character code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    #[default]
    Normal,
    Locked,
    Public,
}

impl PageStatus {
    /// The single-character code stored in `pages.status`.
    pub fn as_code(self) -> &'static str {
        match self {
            PageStatus::Normal => "N",
            PageStatus::Locked => "L",
            PageStatus::Public => "P",
        }
    }

    /// Decode a stored status code (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(PageStatus::Normal),
            "L" => Ok(PageStatus::Locked),
            "P" => Ok(PageStatus::Public),
            other => Err(CoreError::Validation(format!(
                "Invalid page status code '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Backup numbering
// ---------------------------------------------------------------------------

/// Revision number for the next backup: one past the highest existing backup,
/// or `0` when there are none.
///
/// `backups` must be sorted ascending, as returned by the content store.
pub fn next_backup_revision(backups: &[Revision]) -> Revision {
    backups.last().map_or(0, |last| last + 1)
}

/// Resolve the inclusive threshold of a delete-backups request.
///
/// [`CURRENT_REVISION`] means "everything" and resolves to the highest existing
/// backup. Returns `None` when there is nothing to delete.
pub fn resolve_delete_threshold(requested: Revision, backups: &[Revision]) -> Option<Revision> {
    let highest = *backups.last()?;
    if requested == CURRENT_REVISION {
        return Some(highest);
    }
    if requested < 0 || backups.first().is_some_and(|first| requested < *first) {
        return None;
    }
    Some(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- status ---------------------------------------------------------------

    #[test]
    fn status_codes_roundtrip() {
        for status in [PageStatus::Normal, PageStatus::Locked, PageStatus::Public] {
            assert_eq!(PageStatus::from_code(status.as_code()).unwrap(), status);
        }
    }

    #[test]
    fn status_code_is_case_insensitive() {
        assert_eq!(PageStatus::from_code("l").unwrap(), PageStatus::Locked);
    }

    #[test]
    fn status_unknown_code_rejected() {
        assert!(PageStatus::from_code("X").is_err());
        assert!(PageStatus::from_code("").is_err());
    }

    // -- next_backup_revision -----------------------------------------------

    #[test]
    fn first_backup_is_zero() {
        assert_eq!(next_backup_revision(&[]), 0);
    }

    #[test]
    fn next_backup_follows_highest() {
        assert_eq!(next_backup_revision(&[0, 1, 2]), 3);
    }

    // -- resolve_delete_threshold ---------------------------------------------

    #[test]
    fn sentinel_threshold_resolves_to_highest() {
        assert_eq!(resolve_delete_threshold(CURRENT_REVISION, &[0, 1, 2]), Some(2));
    }

    #[test]
    fn threshold_without_backups_is_none() {
        assert_eq!(resolve_delete_threshold(CURRENT_REVISION, &[]), None);
        assert_eq!(resolve_delete_threshold(3, &[]), None);
    }

    #[test]
    fn explicit_threshold_is_kept() {
        assert_eq!(resolve_delete_threshold(0, &[0, 1]), Some(0));
        assert_eq!(resolve_delete_threshold(7, &[0, 1]), Some(7));
    }

    #[test]
    fn negative_threshold_other_than_sentinel_is_none() {
        assert_eq!(resolve_delete_threshold(-5, &[0, 1]), None);
    }
}
