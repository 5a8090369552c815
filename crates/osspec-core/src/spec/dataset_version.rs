//! Effective dataset version resolution.

use super::model::DatasetContractRef;

/// Resolve the dataset version a check effectively reads.
///
/// Precedence: an explicit positive `check.dataset_version`; else the single
/// matching entry in the ruleset's `data_contracts`; else `1`. The semantic
/// validator rejects ambiguous cases before indexing, so the `1` fallback
/// only fires when a dataset has no declared contract at all.
pub fn effective_dataset_version(
    dataset: &str,
    data_contracts: &[DatasetContractRef],
    check_dataset_version: Option<u32>,
) -> u32 {
    if let Some(v) = check_dataset_version {
        if v > 0 {
            return v;
        }
    }
    let mut matches = data_contracts.iter().filter(|dc| dc.dataset == dataset);
    match (matches.next(), matches.next()) {
        (Some(only), None) => only.version,
        _ => 1,
    }
}
