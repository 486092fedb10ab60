use crate::host::{Mutation, MutationBatch};

/// Change-detection policy: node additions matter, and so do class changes on
/// elements that were already row-state flagged. Everything else is churn the
/// scan would not see anyway.
pub fn is_relevant(mutation: &Mutation) -> bool {
    match mutation {
        Mutation::ChildList { added, .. } => *added > 0,
        Mutation::Attribute {
            name,
            row_state_target,
        } => name == "class" && *row_state_target,
        Mutation::CharacterData => false,
    }
}

pub fn any_relevant(batch: &MutationBatch) -> bool {
    batch.mutations.iter().any(is_relevant)
}
