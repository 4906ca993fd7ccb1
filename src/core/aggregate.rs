// pbir-filters - core/aggregate.rs
//
// Groups filter definitions by table and renders the aligned text report.
// Core layer: pure logic, no I/O.

use crate::core::model::FilterDefinition;
use std::collections::HashMap;

/// All fields of one table that have a filter definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup {
    pub entity: String,
    /// `(property or level, display name)` in first-seen key order.
    pub fields: Vec<(String, String)>,
}

impl EntityGroup {
    fn upsert(&mut self, key: String, display_name: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, value)) => *value = display_name,
            None => self.fields.push((key, display_name)),
        }
    }
}

/// Group definitions by entity.
///
/// Groups come out in the order their entity is first seen. A key repeated
/// within a group keeps its first position but takes the last display name.
/// Definitions with no resolvable field or no display name are skipped.
pub fn aggregate<'a, I>(definitions: I) -> Vec<EntityGroup>
where
    I: IntoIterator<Item = &'a FilterDefinition>,
{
    let mut groups: Vec<EntityGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (position, definition) in definitions.into_iter().enumerate() {
        let Some(field) = definition.field() else {
            tracing::trace!(position, "Skipped: not a column or hierarchy level");
            continue;
        };
        let Some(display_name) = definition.display_name.clone() else {
            tracing::debug!(position, entity = %field.entity, "Skipped: no displayName");
            continue;
        };

        let slot = *index.entry(field.entity.clone()).or_insert_with(|| {
            groups.push(EntityGroup {
                entity: field.entity.clone(),
                fields: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].upsert(field.key, display_name);
    }

    groups
}

/// Render groups as aligned two-column text.
///
/// Each group is its entity name, one `    <key padded to key_width>: <name>`
/// line per field, then a blank line.
pub fn format_aggregate(groups: &[EntityGroup], key_width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    for group in groups {
        lines.push(group.entity.clone());
        for (key, value) in &group.fields {
            lines.push(format!("    {key:<key_width$}: {value}"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
