//! Requirements-index derivation.
//!
//! A derived view over the normalized bundle: for each ruleset, what datasets
//! (at which effective versions), check types, and value parameters its rules
//! need, plus a per-rule breakdown with the manual/automated split.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize;
use crate::semantic::Bundle;
use crate::spec::{
    effective_dataset_version, Check, CheckType, DatasetRef, RequirementsIndex, Rule,
    RuleMonitoring, RuleRequirement, Ruleset, RulesetRequirement, KIND_REQUIREMENTS_INDEX,
    SCHEMA_VERSION,
};


/// Build the requirements index. Rulesets are emitted sorted by key; rules
/// inherit the normalizer's by-key order.
pub fn build_requirements(bundle: &Bundle) -> RequirementsIndex {
    let mut rulesets = Vec::with_capacity(bundle.rulesets.len());

    for rs in &bundle.rulesets {
        let ruleset = &rs.doc.ruleset;

        let mut check_types: Vec<CheckType> = Vec::new();
        let mut value_params: BTreeSet<String> = BTreeSet::new();
        let mut datasets: BTreeMap<(String, u32), DatasetRef> = BTreeMap::new();

        let mut rules = Vec::with_capacity(ruleset.rules.len());
        for rule in &ruleset.rules {
            let check_type = rule.check.as_ref().map(|c| c.check_type);
            if let Some(ct) = check_type {
                check_types.push(ct);
            }

            let rule_datasets = rule_check_datasets(ruleset, rule.check.as_ref());
            for d in &rule_datasets {
                datasets.insert((d.dataset.clone(), d.version), d.clone());
            }

            let rule_value_params = rule
                .check
                .as_ref()
                .map(Check::value_params)
                .unwrap_or_default();
            value_params.extend(rule_value_params.iter().cloned());

            rules.push(RuleRequirement {
                rule_key: rule.key.clone(),
                is_manual: is_manual_rule(rule),
                datasets: rule_datasets,
                check_type,
                value_params: rule_value_params,
                monitoring: RuleMonitoring {
                    status: rule.monitoring.status,
                },
            });
        }

        check_types.sort_by_key(|ct| ct.as_str());
        check_types.dedup();
        rulesets.push(RulesetRequirement {
            ruleset_key: ruleset.key.clone(),
            status: ruleset.status.clone(),
            scope: ruleset.scope.clone(),
            datasets: datasets.into_values().collect(),
            check_types,
            value_params: value_params.into_iter().collect(),
            rules,
        });
    }

    rulesets.sort_by(|a, b| a.ruleset_key.cmp(&b.ruleset_key));
    RequirementsIndex {
        schema_version: SCHEMA_VERSION,
        kind: KIND_REQUIREMENTS_INDEX.to_string(),
        rulesets,
    }
}

/// A rule is manual when its monitoring says so, when it has no check, or
/// when its check is a manual attestation.
fn is_manual_rule(rule: &Rule) -> bool {
    if rule.monitoring.status == crate::spec::MonitoringStatus::Manual {
        return true;
    }
    match &rule.check {
        None => true,
        Some(check) => check.check_type == CheckType::ManualAttestation,
    }
}

fn rule_check_datasets(ruleset: &Ruleset, check: Option<&Check>) -> Vec<DatasetRef> {
    let Some(check) = check else {
        return Vec::new();
    };
    let mut out: Vec<DatasetRef> = check
        .referenced_datasets()
        .into_iter()
        .map(|dataset| DatasetRef {
            dataset: dataset.to_string(),
            version: effective_dataset_version(
                dataset,
                &ruleset.data_contracts,
                check.dataset_version,
            ),
        })
        .collect();
    normalize::dataset_refs(&mut out);
    out
}
