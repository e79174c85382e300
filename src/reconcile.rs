use crate::record::RecordSet;

/// Candidate records split by whether their natural key already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub new: RecordSet,
    pub duplicate: RecordSet,
}

/// Classifies every candidate as `new` or `duplicate` against `current`.
///
/// Only the natural key is compared. A candidate whose fields differ from the
/// current record of the same name is still a duplicate.
pub fn reconcile(current: &RecordSet, candidate: &RecordSet) -> Reconciliation {
    let mut new = RecordSet::new(candidate.kind());
    let mut duplicate = RecordSet::new(candidate.kind());
    for record in candidate {
        if current.contains_key(record.key()) {
            duplicate.insert(record.clone());
        } else {
            new.insert(record.clone());
        }
    }
    Reconciliation { new, duplicate }
}
