//! Canonical normalization of parsed documents.
//!
//! Normalization is what makes two logically equal documents byte-equal once
//! serialized through JCS: optional fields with defined defaults are
//! materialized, and every list with set semantics is rewritten into a total
//! order. The pass is idempotent; `ruleset_doc(&mut d)` applied twice leaves
//! the document unchanged, which the hashing story depends on.

use serde_json::Value;

use crate::spec::{
    Check, CheckType, ConnectorManifestDoc, DatasetContractRef, DatasetRef, DictionaryDoc,
    ErrorPolicy, FieldCompareExpect, FieldCompareMatch, FieldCompareOnEmpty, FrameworkCoverage,
    FrameworkMapping, Lifecycle, OnUnmatchedLeft, Predicate, ProfileDoc, Reference, ReferenceType,
    RulesetDoc, RulesetRequirements,
};


/// Sort a string set lexicographically and drop duplicates.
pub fn strings(v: &mut Vec<String>) {
    v.sort();
    v.dedup();
}

/// Sort references by (url, title, type), defaulting empty types to `other`
/// first so the sort key matches the serialized form.
pub fn references(v: &mut [Reference]) {
    for r in v.iter_mut() {
        if r.reference_type.is_none() {
            r.reference_type = Some(ReferenceType::Other);
        }
    }
    v.sort_by(|a, b| {
        (a.url.as_str(), a.title.as_deref().unwrap_or(""), ref_type_key(a)).cmp(&(
            b.url.as_str(),
            b.title.as_deref().unwrap_or(""),
            ref_type_key(b),
        ))
    });
}

fn ref_type_key(r: &Reference) -> &'static str {
    r.reference_type.map(|t| t.as_str()).unwrap_or("")
}

/// Sort framework mappings by (framework, control, enhancement, coverage,
/// notes), defaulting empty coverage to `supporting` first.
pub fn framework_mappings(v: &mut [FrameworkMapping]) {
    for m in v.iter_mut() {
        if m.coverage.is_none() {
            m.coverage = Some(FrameworkCoverage::Supporting);
        }
    }
    v.sort_by(|a, b| fm_key(a).cmp(&fm_key(b)));
}

fn fm_key(m: &FrameworkMapping) -> (&str, &str, &str, &'static str, &str) {
    (
        &m.framework,
        &m.control,
        m.enhancement.as_deref().unwrap_or(""),
        m.coverage.map(|c| c.as_str()).unwrap_or(""),
        m.notes.as_deref().unwrap_or(""),
    )
}

/// Sort `{dataset, version}` refs by (dataset, version).
pub fn dataset_refs(v: &mut [DatasetRef]) {
    v.sort_by(|a, b| (&a.dataset, a.version).cmp(&(&b.dataset, b.version)));
}

/// Sort data-contract declarations by (dataset, version, description).
pub fn data_contracts(v: &mut [DatasetContractRef]) {
    v.sort_by(|a, b| {
        (&a.dataset, a.version, a.description.as_deref().unwrap_or("")).cmp(&(
            &b.dataset,
            b.version,
            b.description.as_deref().unwrap_or(""),
        ))
    });
}

/// Normalize a ruleset document in place.
pub fn ruleset_doc(doc: &mut RulesetDoc) {
    let rs = &mut doc.ruleset;
    if rs.status.is_empty() {
        rs.status = "active".to_string();
    }
    strings(&mut rs.tags);
    references(&mut rs.references);
    framework_mappings(&mut rs.framework_mappings);
    data_contracts(&mut rs.data_contracts);
    if let Some(req) = rs.requirements.as_mut() {
        ruleset_requirements(req);
    }

    rs.rules.sort_by(|a, b| a.key.cmp(&b.key));
    for rule in &mut rs.rules {
        strings(&mut rule.tags);
        strings(&mut rule.required_data);
        references(&mut rule.references);
        framework_mappings(&mut rule.framework_mappings);
        if let Some(lc) = rule.lifecycle.as_mut() {
            lifecycle(lc);
        }
        if let Some(check) = rule.check.as_mut() {
            check_defaults(check);
        }
    }
}

/// Normalize a connector manifest in place: sort `provides`.
pub fn connector_manifest_doc(doc: &mut ConnectorManifestDoc) {
    dataset_refs(&mut doc.connector.provides);
}

/// Normalize a profile in place: sort ruleset refs by (key, version).
pub fn profile_doc(doc: &mut ProfileDoc) {
    doc.profile.rulesets.sort_by(|a, b| {
        (&a.key, a.version.as_deref().unwrap_or(""))
            .cmp(&(&b.key, b.version.as_deref().unwrap_or("")))
    });
}

/// Normalize the dictionary in place: each enum's values form a string set.
pub fn dictionary_doc(doc: &mut DictionaryDoc) {
    for values in doc.dictionary.enums.values_mut() {
        strings(values);
    }
}

fn ruleset_requirements(req: &mut RulesetRequirements) {
    strings(&mut req.api_scopes);
    strings(&mut req.permissions);
}

fn lifecycle(lc: &mut Lifecycle) {
    if lc.is_active.is_none() {
        lc.is_active = Some(true);
    }
}

/// Materialize check defaults and order its `where` predicates.
pub fn check_defaults(c: &mut Check) {
    if c.on_missing_dataset.is_none() {
        c.on_missing_dataset = Some(ErrorPolicy::Unknown);
    }
    if c.on_permission_denied.is_none() {
        c.on_permission_denied = Some(ErrorPolicy::Unknown);
    }
    if c.on_sync_error.is_none() {
        c.on_sync_error = Some(ErrorPolicy::Error);
    }

    for p in &mut c.r#where {
        predicate(p);
    }
    if let Some(assert) = c.assert.as_mut() {
        predicate(assert);
    }
    sort_predicates(c.check_type, &mut c.r#where);

    match c.check_type {
        CheckType::DatasetFieldCompare => {
            let expect = c.expect.get_or_insert_with(FieldCompareExpect::default);
            if expect.match_mode.is_none() {
                expect.match_mode = Some(FieldCompareMatch::All);
            }
            if expect.on_empty.is_none() {
                expect.on_empty = Some(FieldCompareOnEmpty::Unknown);
            }
        }
        CheckType::DatasetJoinCountCompare => {
            if c.on_unmatched_left.is_none() {
                c.on_unmatched_left = Some(OnUnmatchedLeft::Ignore);
            }
        }
        CheckType::DatasetCountCompare | CheckType::ManualAttestation => {}
    }
}

fn predicate(p: &mut Predicate) {
    // An explicitly-null value means the same as an absent one; scrub it so
    // the canonical form has a single spelling.
    if matches!(p.value, Some(Value::Null)) {
        p.value = None;
    }
}

fn sort_predicates(check_type: CheckType, preds: &mut [Predicate]) {
    preds.sort_by(|a, b| {
        let (ka, kb) = if check_type == CheckType::DatasetJoinCountCompare {
            (
                (a.left_path.as_deref().unwrap_or(""), a.right_path.as_deref().unwrap_or("")),
                (b.left_path.as_deref().unwrap_or(""), b.right_path.as_deref().unwrap_or("")),
            )
        } else {
            ((a.path.as_deref().unwrap_or(""), ""), (b.path.as_deref().unwrap_or(""), ""))
        };
        ka.cmp(&kb)
            .then_with(|| a.op.as_str().cmp(b.op.as_str()))
            .then_with(|| {
                a.value_param
                    .as_deref()
                    .unwrap_or("")
                    .cmp(b.value_param.as_deref().unwrap_or(""))
            })
            .then_with(|| canonical_value(&a.value).cmp(&canonical_value(&b.value)))
    });
}

/// JCS serialization of a predicate value; absent values compare as `null`.
fn canonical_value(v: &Option<Value>) -> String {
    match v {
        None => "null".to_string(),
        // Values came out of a JSON parse, so re-serialization cannot fail.
        Some(v) => serde_jcs::to_string(v).unwrap_or_default(),
    }
}
