//! OpsFactory trait definition and the in-process implementation.
//!
//! The factory is the publication collaborator that turns creation requests
//! into ids and ops. The compiler talks to it only through [`OpsFactory`].

use super::ops::{DataType, Op, PropertyValue};
use uuid::Uuid;

/// Request to create a property. `id` overrides the generated id.
#[derive(Debug, Clone)]
pub struct PropertyDraft {
    pub id: Option<String>,
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone)]
pub struct TypeDraft {
    pub id: Option<String>,
    pub name: String,
    pub property_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EntityDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub type_ids: Vec<String>,
    pub values: Vec<PropertyValue>,
}

/// Request to create a relation. The caller always supplies the id.
#[derive(Debug, Clone)]
pub struct RelationDraft {
    pub id: String,
    pub from_entity: String,
    pub to_entity: String,
    pub type_id: String,
    pub target_space: Option<String>,
    pub position: Option<String>,
}

/// Id of a created object plus the ops that create it.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub id: String,
    pub ops: Vec<Op>,
}

/// Creates ids and creation ops for graph objects.
pub trait OpsFactory: Send + Sync {
    fn create_property(&self, draft: PropertyDraft) -> Created;

    fn create_type(&self, draft: TypeDraft) -> Created;

    fn create_entity(&self, draft: EntityDraft) -> Created;

    fn create_relation(&self, draft: RelationDraft) -> Vec<Op>;

    fn generate_id(&self) -> String;
}

/// Factory producing one op per request, with random v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOpsFactory;

impl LocalOpsFactory {
    pub fn new() -> Self {
        Self
    }

    fn resolve_id(&self, id: Option<String>) -> String {
        id.unwrap_or_else(|| self.generate_id())
    }
}

impl OpsFactory for LocalOpsFactory {
    fn create_property(&self, draft: PropertyDraft) -> Created {
        let id = self.resolve_id(draft.id);
        let ops = vec![Op::CreateProperty {
            id: id.clone(),
            name: draft.name,
            data_type: draft.data_type,
        }];
        Created { id, ops }
    }

    fn create_type(&self, draft: TypeDraft) -> Created {
        let id = self.resolve_id(draft.id);
        let ops = vec![Op::CreateType {
            id: id.clone(),
            name: draft.name,
            property_ids: draft.property_ids,
        }];
        Created { id, ops }
    }

    fn create_entity(&self, draft: EntityDraft) -> Created {
        let id = self.resolve_id(draft.id);
        let ops = vec![Op::CreateEntity {
            id: id.clone(),
            name: draft.name,
            description: draft.description,
            type_ids: draft.type_ids,
            values: draft.values,
        }];
        Created { id, ops }
    }

    fn create_relation(&self, draft: RelationDraft) -> Vec<Op> {
        vec![Op::CreateRelation {
            id: draft.id,
            from_entity: draft.from_entity,
            to_entity: draft.to_entity,
            type_id: draft.type_id,
            target_space: draft.target_space,
            position: draft.position,
        }]
    }

    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_id_is_kept() {
        let factory = LocalOpsFactory::new();
        let created = factory.create_property(PropertyDraft {
            id: Some("fixed".into()),
            name: "Title".into(),
            data_type: DataType::Text,
        });
        assert_eq!(created.id, "fixed");
        assert_eq!(created.ops.len(), 1);
        assert!(matches!(&created.ops[0], Op::CreateProperty { id, .. } if id == "fixed"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let factory = LocalOpsFactory::new();
        let a = factory.create_type(TypeDraft {
            id: None,
            name: "T".into(),
            property_ids: vec![],
        });
        let b = factory.create_type(TypeDraft {
            id: None,
            name: "T".into(),
            property_ids: vec![],
        });
        assert_ne!(a.id, b.id);
    }
}
