use std::collections::BTreeMap;

use crate::model::{MappingSummary, ProductRecord};

/// Compute summary statistics from finalized records.
pub fn compute_summary(records: &[ProductRecord]) -> MappingSummary {
    let mut relation_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut investigation_required = 0;

    for r in records {
        *relation_counts.entry(r.relation_type.to_string()).or_insert(0) += 1;
        if r.investigation_required {
            investigation_required += 1;
        }
    }

    MappingSummary {
        products: records.len(),
        investigation_required,
        relation_counts,
    }
}
