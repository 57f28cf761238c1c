//! Note to graph compilation
//!
//! One call to [`GraphCompiler::compile`] emits, in order:
//!
//! 1. five property ops (Title, Content, Created Date, Modified Date, File Path)
//! 2. the "Obsidian Note" type op
//! 3. the note entity op
//! 4. per tag: property, type and entity ops, then relation type and relation
//! 5. per link: the same shape with link names
//!
//! Property and type ops are re-issued for every tag and link and on every
//! call. Consumers count on these op totals, so nothing is interned.

use super::factory::{EntityDraft, OpsFactory, PropertyDraft, RelationDraft, TypeDraft};
use super::models::{
    CompileOptions, CompiledNote, EntityKind, GraphEntity, GraphRelation, IdentityStrategy,
    RelationKind,
};
use super::ops::{DataType, Op, PropertyValue};
use crate::extract::Note;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Characters of content kept in an entity description.
pub const DESCRIPTION_CHARS: usize = 200;

/// Namespace for path-keyed ids.
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6e6f_7465_2d67_7261_7068_2d69_6473_0001);

const NOTE_PROPERTIES: [(&str, DataType); 5] = [
    ("Title", DataType::Text),
    ("Content", DataType::Text),
    ("Created Date", DataType::Time),
    ("Modified Date", DataType::Time),
    ("File Path", DataType::Text),
];
const NOTE_TYPE: &str = "Obsidian Note";

/// Names used for one kind of satellite entity (tag or link).
struct SatelliteSchema {
    entity_kind: EntityKind,
    relation_kind: RelationKind,
    property: &'static str,
    entity_type: &'static str,
    relation_type: &'static str,
}

const TAG_SCHEMA: SatelliteSchema = SatelliteSchema {
    entity_kind: EntityKind::Tag,
    relation_kind: RelationKind::HasTag,
    property: "Tag Name",
    entity_type: "Obsidian Tag",
    relation_type: "Has Tag Relation",
};

const LINK_SCHEMA: SatelliteSchema = SatelliteSchema {
    entity_kind: EntityKind::Link,
    relation_kind: RelationKind::LinksTo,
    property: "Link Target",
    entity_type: "Obsidian Link",
    relation_type: "Links To Relation",
};

/// Compiles notes into entities and relations through an [`OpsFactory`].
pub struct GraphCompiler {
    factory: Arc<dyn OpsFactory>,
}

impl GraphCompiler {
    pub fn new(factory: Arc<dyn OpsFactory>) -> Self {
        Self { factory }
    }

    /// Compile one note.
    ///
    /// Yields `1 + tags + links` entities and `tags + links` relations, tags
    /// and links counted only when included.
    pub fn compile(&self, note: &Note, options: &CompileOptions) -> CompiledNote {
        let mut compiled = CompiledNote::default();

        let note_entity = self.compile_note_entity(note, options);
        let note_id = note_entity.id.clone();
        compiled.entities.push(note_entity);

        if options.include_tags {
            for tag in &note.tags {
                self.compile_satellite(&note_id, tag, &TAG_SCHEMA, options, &mut compiled);
            }
        }

        if options.include_links {
            for link in &note.links {
                self.compile_satellite(&note_id, &link.target, &LINK_SCHEMA, options, &mut compiled);
            }
        }

        tracing::debug!(
            path = %note.path,
            entities = compiled.entities.len(),
            relations = compiled.relations.len(),
            "Compiled note"
        );
        compiled
    }

    fn compile_note_entity(&self, note: &Note, options: &CompileOptions) -> GraphEntity {
        let mut ops = Vec::new();

        let mut property_ids = Vec::with_capacity(NOTE_PROPERTIES.len());
        for (name, data_type) in NOTE_PROPERTIES {
            property_ids.push(self.property(name, data_type, options, &mut ops));
        }
        let type_id = self.entity_type(NOTE_TYPE, property_ids.clone(), options, &mut ops);

        let values = vec![
            PropertyValue::new(&property_ids[0], note.title.clone()),
            PropertyValue::new(&property_ids[1], note.content.clone()),
            PropertyValue::new(&property_ids[2], format_time(&note.created_date)),
            PropertyValue::new(&property_ids[3], format_time(&note.modified_date)),
            PropertyValue::new(&property_ids[4], note.path.clone()),
        ];
        let created = self.factory.create_entity(EntityDraft {
            id: keyed_id(options, || format!("note:{}", note.path)),
            name: note.title.clone(),
            description: Some(description(&note.content)),
            type_ids: vec![type_id],
            values,
        });
        ops.extend(created.ops);

        GraphEntity {
            id: created.id,
            kind: EntityKind::Note,
            name: note.title.clone(),
            ops,
        }
    }

    fn compile_satellite(
        &self,
        note_id: &str,
        name: &str,
        schema: &SatelliteSchema,
        options: &CompileOptions,
        compiled: &mut CompiledNote,
    ) {
        let mut ops = Vec::new();
        let property_id = self.property(schema.property, DataType::Text, options, &mut ops);
        let type_id = self.entity_type(schema.entity_type, vec![property_id.clone()], options, &mut ops);
        let created = self.factory.create_entity(EntityDraft {
            id: keyed_id(options, || format!("{}:{}", schema.entity_type, name)),
            name: name.to_string(),
            description: None,
            type_ids: vec![type_id],
            values: vec![PropertyValue::new(&property_id, name)],
        });
        ops.extend(created.ops);
        let entity_id = created.id;

        let mut relation_ops = Vec::new();
        let relation_type_id = self.entity_type(schema.relation_type, vec![], options, &mut relation_ops);
        let relation_id = keyed_id(options, || {
            format!("{}:{}:{}", schema.relation_type, note_id, entity_id)
        })
        .unwrap_or_else(|| self.factory.generate_id());
        relation_ops.extend(self.factory.create_relation(RelationDraft {
            id: relation_id.clone(),
            from_entity: note_id.to_string(),
            to_entity: entity_id.clone(),
            type_id: relation_type_id,
            target_space: options.target_space.clone(),
            position: None,
        }));

        compiled.entities.push(GraphEntity {
            id: entity_id.clone(),
            kind: schema.entity_kind,
            name: name.to_string(),
            ops,
        });
        compiled.relations.push(GraphRelation {
            id: relation_id,
            kind: schema.relation_kind,
            from_entity: note_id.to_string(),
            to_entity: entity_id,
            ops: relation_ops,
        });
    }

    fn property(
        &self,
        name: &str,
        data_type: DataType,
        options: &CompileOptions,
        ops: &mut Vec<Op>,
    ) -> String {
        let created = self.factory.create_property(PropertyDraft {
            id: keyed_id(options, || format!("property:{}", name)),
            name: name.to_string(),
            data_type,
        });
        ops.extend(created.ops);
        created.id
    }

    fn entity_type(
        &self,
        name: &str,
        property_ids: Vec<String>,
        options: &CompileOptions,
        ops: &mut Vec<Op>,
    ) -> String {
        let created = self.factory.create_type(TypeDraft {
            id: keyed_id(options, || format!("type:{}", name)),
            name: name.to_string(),
            property_ids,
        });
        ops.extend(created.ops);
        created.id
    }
}

/// Deterministic id for `key` under path-keyed identity, `None` otherwise.
fn keyed_id(options: &CompileOptions, key: impl FnOnce() -> String) -> Option<String> {
    match options.identity {
        IdentityStrategy::Fresh => None,
        IdentityStrategy::PathKeyed => {
            Some(Uuid::new_v5(&ID_NAMESPACE, key().as_bytes()).to_string())
        }
    }
}

/// First 200 characters of content, always followed by an ellipsis.
pub fn description(content: &str) -> String {
    let mut text: String = content.chars().take(DESCRIPTION_CHARS).collect();
    text.push_str("...");
    text
}

/// RFC 3339 in UTC with millisecond precision.
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
