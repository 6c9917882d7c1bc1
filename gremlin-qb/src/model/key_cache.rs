use crate::model::{GraphModel, MemberMetadata};
use std::sync::Arc;
use tracing::trace;

/// Memoizes member resolution against a [`GraphModel`].
///
/// Entries are only ever inserted, never invalidated; concurrent misses for the same
/// member may both consult the model, but only the first result is kept.
pub struct MemberCache {
    model: Arc<dyn GraphModel>,
    members: papaya::HashMap<(String, String), Option<MemberMetadata>>,
}

impl MemberCache {
    pub fn new(model: Arc<dyn GraphModel>) -> Self {
        Self {
            model,
            members: papaya::HashMap::new(),
        }
    }

    pub fn model(&self) -> &Arc<dyn GraphModel> {
        &self.model
    }

    pub fn resolve_member(&self, element: &str, member: &str) -> Option<MemberMetadata> {
        let members = self.members.pin();
        members
            .get_or_insert_with((element.to_string(), member.to_string()), || {
                trace!(element, member, "resolving member through model");
                self.model.resolve_member(element, member)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.members.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemberCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberCache")
            .field("model", &self.model)
            .field("cached", &self.len())
            .finish()
    }
}
