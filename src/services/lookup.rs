use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::database::Database;
use crate::entities;
use crate::error::{BookingError, BookingResult, EntityKind};
use crate::services::validation::required;

/// Description of the taxonomy root that genre nodes hang off.
pub const GENRES_ROOT: &str = "Genres";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupNode {
    pub id: i64,
    pub description: String,
    pub parent_id: Option<i64>,
}

/// Flat arena of lookup nodes with id and parent indices.
///
/// Nodes are stored in id order, so children and roots come back in id order too.
#[derive(Debug, Default)]
pub struct LookupTree {
    nodes: Vec<LookupNode>,
    index: HashMap<i64, usize>,
    children: HashMap<i64, Vec<usize>>,
    roots: Vec<usize>,
}

impl LookupTree {
    pub fn build(rows: Vec<entities::lookup::Model>) -> BookingResult<Self> {
        let mut nodes: Vec<LookupNode> = rows
            .into_iter()
            .map(|row| LookupNode {
                id: row.id,
                description: row.description,
                parent_id: row.parent_id,
            })
            .collect();
        nodes.sort_by_key(|node| node.id);

        let index: HashMap<i64, usize> = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id, position))
            .collect();

        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (position, node) in nodes.iter().enumerate() {
            match node.parent_id {
                None => roots.push(position),
                Some(parent_id) if index.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(position);
                }
                Some(parent_id) => {
                    return Err(BookingError::validation(
                        EntityKind::Lookup,
                        "parent_id",
                        format!(
                            "lookup {} references missing parent {}",
                            node.id, parent_id
                        ),
                    ));
                }
            }
        }

        let tree = Self {
            nodes,
            index,
            children,
            roots,
        };
        tree.check_acyclic()?;
        Ok(tree)
    }

    fn check_acyclic(&self) -> BookingResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in 0..self.nodes.len() {
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(position) = current {
                match marks[position] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        return Err(BookingError::validation(
                            EntityKind::Lookup,
                            "parent_id",
                            format!("cycle through lookup {}", self.nodes[position].id),
                        ));
                    }
                    Mark::Unvisited => {
                        marks[position] = Mark::OnPath;
                        path.push(position);
                        current = self.nodes[position]
                            .parent_id
                            .and_then(|parent_id| self.index.get(&parent_id).copied());
                    }
                }
            }
            for position in path {
                marks[position] = Mark::Done;
            }
        }
        Ok(())
    }

    pub fn roots(&self) -> impl Iterator<Item = &LookupNode> {
        self.roots.iter().map(|&position| &self.nodes[position])
    }

    pub fn children(&self, id: i64) -> impl Iterator<Item = &LookupNode> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&position| &self.nodes[position])
    }
}

/// Insert a lookup row on any connection. Lookups are only written while seeding.
pub(crate) async fn insert_lookup<C: ConnectionTrait>(
    conn: &C,
    description: &str,
    parent_id: Option<i64>,
) -> BookingResult<entities::lookup::Model> {
    let description = required(
        EntityKind::Lookup,
        "description",
        description.to_string(),
        Some(120),
    )?;

    if let Some(parent_id) = parent_id {
        entities::lookup::Entity::find_by_id(parent_id)
            .one(conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Lookup, parent_id))?;
    }

    let lookup = entities::lookup::ActiveModel {
        description: Set(description),
        parent_id: Set(parent_id),
        ..Default::default()
    };
    Ok(lookup.insert(conn).await?)
}

/// Resolve genre descriptions to lookup ids, preserving first-seen order and
/// collapsing duplicates.
pub(crate) async fn resolve_genre_ids<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> BookingResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let lookup = entities::lookup::Entity::find()
            .filter(entities::lookup::Column::Description.eq(name.as_str()))
            .order_by_asc(entities::lookup::Column::Id)
            .one(conn)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Genre, format!("'{name}'")))?;

        if !ids.contains(&lookup.id) {
            ids.push(lookup.id);
        }
    }
    Ok(ids)
}

pub struct LookupService {
    db: Arc<Database>,
}

impl LookupService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn tree(&self) -> BookingResult<LookupTree> {
        let rows = entities::lookup::Entity::find()
            .order_by_asc(entities::lookup::Column::Id)
            .all(&self.db.conn)
            .await?;
        LookupTree::build(rows)
    }

    /// Genre descriptions selectable on venue/artist forms, in id order.
    pub async fn genre_choices(&self) -> BookingResult<Vec<String>> {
        let tree = self.tree().await?;
        let Some(root) = tree.roots().find(|node| node.description == GENRES_ROOT) else {
            log::warn!("No '{}' lookup root found; no genre choices", GENRES_ROOT);
            return Ok(Vec::new());
        };

        Ok(tree
            .children(root.id)
            .map(|node| node.description.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seeded_db, test_db};

    fn row(id: i64, description: &str, parent_id: Option<i64>) -> entities::lookup::Model {
        entities::lookup::Model {
            id,
            description: description.to_string(),
            parent_id,
        }
    }

    #[test]
    fn test_build_indexes_children_and_roots() {
        let tree = LookupTree::build(vec![
            row(3, "Blues", Some(1)),
            row(1, "Genres", None),
            row(2, "Alternative", Some(1)),
            row(4, "Delta Blues", Some(3)),
        ])
        .unwrap();

        let roots: Vec<_> = tree.roots().map(|n| n.id).collect();
        assert_eq!(roots, vec![1]);
        let children: Vec<_> = tree.children(1).map(|n| n.description.as_str()).collect();
        assert_eq!(children, vec!["Alternative", "Blues"]);
        assert_eq!(tree.children(2).count(), 0);
        let nested: Vec<_> = tree.children(3).map(|n| n.id).collect();
        assert_eq!(nested, vec![4]);
    }

    #[test]
    fn test_build_rejects_missing_parent() {
        let err = LookupTree::build(vec![row(1, "Genres", None), row(2, "Jazz", Some(9))])
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation {
                entity: EntityKind::Lookup,
                field: "parent_id",
                ..
            }
        ));
    }

    #[test]
    fn test_build_rejects_cycles() {
        let err = LookupTree::build(vec![
            row(1, "Genres", None),
            row(2, "A", Some(3)),
            row(3, "B", Some(4)),
            row(4, "C", Some(2)),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));

        let err = LookupTree::build(vec![row(1, "Self", Some(1))]).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_empty_tree() {
        let tree = LookupTree::build(Vec::new()).unwrap();
        assert_eq!(tree.roots().count(), 0);
        assert_eq!(tree.children(1).count(), 0);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_parent() {
        let db = test_db().await;

        let root = insert_lookup(&db.conn, "Genres", None).await.unwrap();
        let jazz = insert_lookup(&db.conn, "Jazz", Some(root.id)).await.unwrap();
        assert_eq!(jazz.parent_id, Some(root.id));

        let err = insert_lookup(&db.conn, "Orphan", Some(999)).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));

        let err = insert_lookup(&db.conn, "  ", None).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_genre_choices_from_seed() {
        let db = seeded_db().await;
        let service = LookupService::new(db);

        let choices = service.genre_choices().await.unwrap();
        assert_eq!(choices.len(), 19);
        assert_eq!(choices.first().map(String::as_str), Some("Alternative"));
        assert_eq!(choices.last().map(String::as_str), Some("Other"));
        assert!(!choices.iter().any(|c| c == GENRES_ROOT));
    }

    #[tokio::test]
    async fn test_genre_choices_without_root() {
        let db = test_db().await;
        let service = LookupService::new(db);
        assert!(service.genre_choices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_genre_ids_collapses_duplicates() {
        let db = seeded_db().await;
        let names = vec!["Jazz".to_string(), "Folk".to_string(), "Jazz".to_string()];
        let ids = resolve_genre_ids(&db.conn, &names).await.unwrap();
        assert_eq!(ids.len(), 2);

        let err = resolve_genre_ids(&db.conn, &["Polka".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotFound {
                entity: EntityKind::Genre,
                ..
            }
        ));
    }
}
