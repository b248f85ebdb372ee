//! Resources owned by a graph and the node references pointing at them.
//!
//! A resource either points at an external `path` or carries inline
//! `content`. Inline content of svg and markdown resources is written through
//! the gateway's artifact storage and the returned locator becomes the path;
//! `other` resources can only point at a path.

use chrono::Utc;
use log::debug;

use cartograph_core::{
    GraphError,
    identifier::{GraphId, NodeId, ResourceId},
    kind::ResourceKind,
    model::{Graph, Node, Resource},
};

use super::{GraphStore, required_text};
use crate::persistence::PersistenceGateway;

/// Input for [`GraphStore::add_resource`]. Exactly one of `path` and
/// `content` must be set.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub kind: ResourceKind,
    pub path: Option<String>,
    pub content: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NewResource {
    /// A resource pointing at an existing file or URL.
    pub fn with_path(
        name: impl Into<String>,
        kind: ResourceKind,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            path: Some(path.into()),
            content: None,
            title: None,
            description: None,
        }
    }

    /// A resource whose content is stored as an artifact.
    pub fn with_content(
        name: impl Into<String>,
        kind: ResourceKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            path: None,
            content: Some(content.into()),
            title: None,
            description: None,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Changes to a resource. `None` leaves a field unchanged; at most one of
/// `path` and `content` may be set.
#[derive(Debug, Clone, Default)]
pub struct ResourceUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
    pub content: Option<String>,
}

fn ensure_unique_resource_name(
    graph: &Graph,
    name: &str,
    except: Option<ResourceId>,
) -> Result<(), GraphError> {
    match graph.resource_by_name(name) {
        Some(resource) if Some(resource.id) != except => {
            Err(GraphError::DuplicateName(format!(
                "resource `{name}` already exists in graph `{}`",
                graph.id
            )))
        }
        _ => Ok(()),
    }
}

fn ensure_single_source(path: Option<&String>, content: Option<&String>) -> Result<(), GraphError> {
    if path.is_some() && content.is_some() {
        return Err(GraphError::InvalidInput(
            "a resource takes either a path or inline content, not both".to_string(),
        ));
    }
    Ok(())
}

fn ensure_content_storable(kind: ResourceKind) -> Result<(), GraphError> {
    if kind.is_stored_artifact() {
        Ok(())
    } else {
        Err(GraphError::InvalidInput(format!(
            "inline content is not supported for `{kind}` resources"
        )))
    }
}

fn resource_index(graph: &Graph, resource_id: ResourceId) -> Result<usize, GraphError> {
    graph
        .resources
        .iter()
        .position(|resource| resource.id == resource_id)
        .ok_or_else(|| {
            GraphError::NotFound(format!(
                "resource `{resource_id}` does not exist in graph `{}`",
                graph.id
            ))
        })
}

fn node_mut(graph: &mut Graph, node_id: NodeId) -> Result<&mut Node, GraphError> {
    let graph_id = graph.id;
    graph.node_mut(node_id).ok_or_else(|| {
        GraphError::NotFound(format!(
            "node `{node_id}` does not exist in graph `{graph_id}`"
        ))
    })
}

impl<G: PersistenceGateway> GraphStore<G> {
    /// Attaches a resource to a graph.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateName`] if another resource already has the name
    /// - [`GraphError::InvalidInput`] if neither or both of path and content
    ///   are given, or content is given for an `other` resource
    pub fn add_resource(
        &mut self,
        graph_id: GraphId,
        new: NewResource,
    ) -> Result<Resource, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let name = required_text(&new.name, "resource name")?;
        ensure_unique_resource_name(&graph, &name, None)?;
        ensure_single_source(new.path.as_ref(), new.content.as_ref())?;

        let now = Utc::now();
        let mut resource = Resource::new(name, new.kind, String::new(), now);
        resource.title = new.title;
        resource.description = new.description;

        let write = match (new.path, new.content) {
            (Some(path), None) => {
                resource.path = required_text(&path, "resource path")?;
                None
            }
            (None, Some(content)) => {
                ensure_content_storable(new.kind)?;
                let (locator, write) =
                    self.write_artifact(new.kind, &resource.id.to_string(), &content, None)?;
                resource.path = locator;
                resource.stored = true;
                Some(write)
            }
            _ => {
                return Err(GraphError::InvalidInput(
                    "a resource needs either a path or inline content".to_string(),
                ));
            }
        };

        graph.resources.push(resource.clone());
        graph.updated_at = now;
        if let Err(err) = self.commit(graph) {
            if let Some(write) = write {
                self.undo_artifact_write(write);
            }
            return Err(err);
        }

        debug!(
            graph_id:% = graph_id,
            resource_id:% = resource.id,
            kind:% = resource.kind,
            stored = resource.stored;
            "Resource added"
        );
        Ok(resource)
    }

    /// Updates a resource. New inline content rewrites its stored artifact.
    pub fn update_resource(
        &mut self,
        graph_id: GraphId,
        resource_id: ResourceId,
        update: ResourceUpdate,
    ) -> Result<Resource, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let index = resource_index(&graph, resource_id)?;
        let kind = graph.resources[index].kind;

        let name = update
            .name
            .as_deref()
            .map(|name| required_text(name, "resource name"))
            .transpose()?;
        if let Some(name) = &name {
            ensure_unique_resource_name(&graph, name, Some(resource_id))?;
        }
        ensure_single_source(update.path.as_ref(), update.content.as_ref())?;
        let path = update
            .path
            .as_deref()
            .map(|path| required_text(path, "resource path"))
            .transpose()?;

        let previous = graph.resources[index].clone();
        let (path, write) = match update.content {
            Some(content) => {
                ensure_content_storable(kind)?;
                let replaces = previous.stored.then_some(previous.path.as_str());
                let (locator, write) =
                    self.write_artifact(kind, &resource_id.to_string(), &content, replaces)?;
                (Some((locator, true)), Some(write))
            }
            None => (path.map(|path| (path, false)), None),
        };

        let now = Utc::now();
        let resource = &mut graph.resources[index];
        if let Some(name) = name {
            resource.name = name;
        }
        if let Some(title) = update.title {
            resource.title = Some(title);
        }
        if let Some(description) = update.description {
            resource.description = Some(description);
        }
        if let Some((path, stored)) = path {
            resource.path = path;
            resource.stored = stored;
        }
        resource.updated_at = now;
        let resource = resource.clone();

        graph.updated_at = now;
        if let Err(err) = self.commit(graph) {
            if let Some(write) = write {
                self.undo_artifact_write(write);
            }
            return Err(err);
        }

        if previous.path != resource.path {
            self.release_artifact(&previous);
        }

        debug!(graph_id:% = graph_id, resource_id:% = resource_id; "Resource updated");
        Ok(resource)
    }

    /// Removes a resource, every node reference to it and its stored artifact.
    ///
    /// The artifact is only removed once the snapshot without the resource
    /// has been saved, and only if the store wrote it. Caller-supplied paths
    /// are left alone.
    pub fn delete_resource(
        &mut self,
        graph_id: GraphId,
        resource_id: ResourceId,
    ) -> Result<Resource, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        let index = resource_index(&graph, resource_id)?;
        let resource = graph.resources.remove(index);

        let now = Utc::now();
        let mut purged = 0;
        for node in graph.nodes.iter_mut().filter(|node| node.references(resource_id)) {
            node.resource_ids.retain(|id| *id != resource_id);
            node.updated_at = now;
            purged += 1;
        }
        graph.updated_at = now;
        self.commit(graph)?;

        self.release_artifact(&resource);

        debug!(
            graph_id:% = graph_id,
            resource_id:% = resource_id,
            purged_references = purged;
            "Resource deleted"
        );
        Ok(resource)
    }

    /// Adds a reference from a node to a resource of the same graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRelationship`] if the node already
    /// references the resource.
    pub fn link_resource_to_node(
        &mut self,
        graph_id: GraphId,
        node_id: NodeId,
        resource_id: ResourceId,
    ) -> Result<Node, GraphError> {
        let mut graph = self.working_copy(graph_id)?;
        graph.require_resource(resource_id)?;

        let now = Utc::now();
        let node = node_mut(&mut graph, node_id)?;
        if node.references(resource_id) {
            return Err(GraphError::DuplicateRelationship(format!(
                "node `{node_id}` already references resource `{resource_id}`"
            )));
        }
        node.resource_ids.push(resource_id);
        node.updated_at = now;
        let node = node.clone();

        graph.updated_at = now;
        self.commit(graph)?;
        Ok(node)
    }

    /// Removes a reference from a node to a resource. The resource itself stays.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the node does not reference the resource.
    pub fn unlink_resource_from_node(
        &mut self,
        graph_id: GraphId,
        node_id: NodeId,
        resource_id: ResourceId,
    ) -> Result<Node, GraphError> {
        let mut graph = self.working_copy(graph_id)?;

        let now = Utc::now();
        let node = node_mut(&mut graph, node_id)?;
        if !node.references(resource_id) {
            return Err(GraphError::NotFound(format!(
                "node `{node_id}` does not reference resource `{resource_id}`"
            )));
        }
        node.resource_ids.retain(|id| *id != resource_id);
        node.updated_at = now;
        let node = node.clone();

        graph.updated_at = now;
        self.commit(graph)?;
        Ok(node)
    }

    /// Reads back the stored content of an svg or markdown resource.
    pub fn resource_content(
        &self,
        graph_id: GraphId,
        resource_id: ResourceId,
    ) -> Result<String, GraphError> {
        let resource = self.get_graph(graph_id)?.require_resource(resource_id)?;
        ensure_content_storable(resource.kind)?;
        self.gateway.read_artifact(resource.kind, &resource.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, persistence::MemoryGateway, store::NewNode};
    use cartograph_core::{
        ErrorKind,
        kind::{GraphKind, NodeKind},
    };

    fn store_with_graph() -> (GraphStore<MemoryGateway>, GraphId) {
        let mut store = GraphStore::open(MemoryGateway::new(), &AppConfig::default()).unwrap();
        let graph_id = store
            .create_graph("Docs", Some(GraphKind::Requirement), None)
            .unwrap()
            .id;
        (store, graph_id)
    }

    #[test]
    fn test_add_resource_with_content_stores_artifact() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_content("notes", ResourceKind::Markdown, "# Notes")
                    .titled("Notes"),
            )
            .unwrap();

        assert!(store.gateway().has_artifact(&resource.path));
        assert_eq!(
            store.resource_content(graph_id, resource.id).unwrap(),
            "# Notes"
        );
    }

    #[test]
    fn test_add_resource_validations() {
        let (mut store, graph_id) = store_with_graph();
        store
            .add_resource(
                graph_id,
                NewResource::with_path("datasheet", ResourceKind::Other, "docs/datasheet.pdf"),
            )
            .unwrap();

        let mut both = NewResource::with_path("both", ResourceKind::Svg, "a.svg");
        both.content = Some("<svg/>".to_string());
        let mut neither = NewResource::with_path("neither", ResourceKind::Svg, "a.svg");
        neither.path = None;

        let cases = [
            (
                NewResource::with_path("datasheet", ResourceKind::Other, "x"),
                ErrorKind::DuplicateName,
            ),
            (
                NewResource::with_content("blob", ResourceKind::Other, "data"),
                ErrorKind::InvalidInput,
            ),
            (both, ErrorKind::InvalidInput),
            (neither, ErrorKind::InvalidInput),
        ];
        for (new, expected) in cases {
            let err = store.add_resource(graph_id, new).unwrap_err();
            assert_eq!(err.kind(), expected, "{err}");
        }
        assert_eq!(store.get_graph(graph_id).unwrap().resources.len(), 1);
    }

    #[test]
    fn test_failed_save_discards_new_artifact() {
        let (mut store, graph_id) = store_with_graph();
        store.gateway_mut().fail_saves(true);

        let err = store
            .add_resource(
                graph_id,
                NewResource::with_content("diagram", ResourceKind::Svg, "<svg/>"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(store.get_graph(graph_id).unwrap().resources.is_empty());
    }

    #[test]
    fn test_update_resource_rewrites_content() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_content("notes", ResourceKind::Markdown, "v1"),
            )
            .unwrap();

        let updated = store
            .update_resource(
                graph_id,
                resource.id,
                ResourceUpdate {
                    name: Some("release notes".to_string()),
                    content: Some("v2".to_string()),
                    ..ResourceUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "release notes");
        assert_eq!(updated.path, resource.path);
        assert_eq!(store.resource_content(graph_id, resource.id).unwrap(), "v2");
    }

    #[test]
    fn test_failed_update_keeps_previous_content() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_content("notes", ResourceKind::Markdown, "v1"),
            )
            .unwrap();
        store.gateway_mut().fail_saves(true);

        let err = store
            .update_resource(
                graph_id,
                resource.id,
                ResourceUpdate {
                    content: Some("v2".to_string()),
                    ..ResourceUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(store.resource_content(graph_id, resource.id).unwrap(), "v1");
        assert_eq!(
            store.get_graph(graph_id).unwrap().resource(resource.id),
            Some(&resource)
        );
    }

    #[test]
    fn test_failed_first_content_update_removes_artifact() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_path("diagram", ResourceKind::Svg, "docs/diagram.svg"),
            )
            .unwrap();
        store.gateway_mut().fail_saves(true);

        let update = ResourceUpdate {
            content: Some("<svg/>".to_string()),
            ..ResourceUpdate::default()
        };
        assert!(store.update_resource(graph_id, resource.id, update).is_err());
        assert!(!store.gateway().has_artifact(&format!(
            "memory://svg/{}.svg",
            resource.id
        )));
        assert!(!store.get_graph(graph_id).unwrap().resources[0].stored);
    }

    #[test]
    fn test_switching_to_path_releases_stored_artifact() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_content("notes", ResourceKind::Markdown, "# Notes"),
            )
            .unwrap();
        assert!(resource.stored);

        let updated = store
            .update_resource(
                graph_id,
                resource.id,
                ResourceUpdate {
                    path: Some("docs/notes.md".to_string()),
                    ..ResourceUpdate::default()
                },
            )
            .unwrap();
        assert!(!updated.stored);
        assert!(!store.gateway().has_artifact(&resource.path));
    }

    #[test]
    fn test_delete_keeps_artifacts_it_does_not_own() {
        let (mut store, graph_id) = store_with_graph();
        let diagram = store
            .add_resource(
                graph_id,
                NewResource::with_content("diagram", ResourceKind::Svg, "<svg/>"),
            )
            .unwrap();
        let alias = store
            .add_resource(
                graph_id,
                NewResource::with_path("alias", ResourceKind::Svg, diagram.path.clone()),
            )
            .unwrap();
        assert!(!alias.stored);

        store.delete_resource(graph_id, alias.id).unwrap();
        assert_eq!(
            store.resource_content(graph_id, diagram.id).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn test_delete_keeps_artifact_shared_by_another_resource() {
        let (mut store, graph_id) = store_with_graph();
        let diagram = store
            .add_resource(
                graph_id,
                NewResource::with_content("diagram", ResourceKind::Svg, "<svg/>"),
            )
            .unwrap();
        let alias = store
            .add_resource(
                graph_id,
                NewResource::with_path("alias", ResourceKind::Svg, diagram.path.clone()),
            )
            .unwrap();

        store.delete_resource(graph_id, diagram.id).unwrap();
        assert!(store.gateway().has_artifact(&alias.path));

        store.delete_resource(graph_id, alias.id).unwrap();
        assert!(store.gateway().has_artifact(&diagram.path));
    }

    #[test]
    fn test_link_and_unlink() {
        let (mut store, graph_id) = store_with_graph();
        let node = store
            .add_node(graph_id, NewNode::new(NodeKind::Requirement, "R1"))
            .unwrap();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_path("rfc", ResourceKind::Other, "docs/rfc.txt"),
            )
            .unwrap();

        let linked = store
            .link_resource_to_node(graph_id, node.id, resource.id)
            .unwrap();
        assert_eq!(linked.resource_ids, vec![resource.id]);
        assert_eq!(
            store
                .link_resource_to_node(graph_id, node.id, resource.id)
                .unwrap_err()
                .kind(),
            ErrorKind::DuplicateRelationship
        );
        assert_eq!(
            store
                .link_resource_to_node(graph_id, node.id, ResourceId::new())
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );

        let unlinked = store
            .unlink_resource_from_node(graph_id, node.id, resource.id)
            .unwrap();
        assert!(unlinked.resource_ids.is_empty());
        assert_eq!(
            store
                .unlink_resource_from_node(graph_id, node.id, resource.id)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert!(store.get_graph(graph_id).unwrap().resource(resource.id).is_some());
    }

    #[test]
    fn test_delete_resource_purges_references_and_artifact() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_content("diagram", ResourceKind::Svg, "<svg/>"),
            )
            .unwrap();
        let other = store
            .add_resource(
                graph_id,
                NewResource::with_path("other", ResourceKind::Other, "x"),
            )
            .unwrap();
        for name in ["R1", "R2"] {
            store
                .add_node(
                    graph_id,
                    NewNode::new(NodeKind::Requirement, name)
                        .with_resource(resource.id)
                        .with_resource(other.id),
                )
                .unwrap();
        }

        store.delete_resource(graph_id, resource.id).unwrap();

        let graph = store.get_graph(graph_id).unwrap();
        assert!(graph.resource(resource.id).is_none());
        assert!(graph.nodes.iter().all(|node| node.resource_ids == vec![other.id]));
        assert!(!store.gateway().has_artifact(&resource.path));
    }

    #[test]
    fn test_deleting_node_keeps_resource() {
        let (mut store, graph_id) = store_with_graph();
        let resource = store
            .add_resource(
                graph_id,
                NewResource::with_path("rfc", ResourceKind::Other, "docs/rfc.txt"),
            )
            .unwrap();
        let node = store
            .add_node(
                graph_id,
                NewNode::new(NodeKind::Feature, "F").with_resource(resource.id),
            )
            .unwrap();

        store.delete_node(graph_id, node.id).unwrap();
        assert!(store.get_graph(graph_id).unwrap().resource(resource.id).is_some());
    }
}
