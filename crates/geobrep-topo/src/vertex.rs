//! Model-wide vertex identification.

use std::collections::BTreeMap;

use crate::ids::{ComponentId, ComponentKind, ComponentVertex, UniqueVertexId};

/// Two-way table between component vertices and unique vertices.
///
/// Each component vertex maps to at most one unique vertex; each unique
/// vertex lists its component vertices in assignment order.
#[derive(Debug, Clone, Default)]
pub struct VertexIdentifier {
    unique_vertices: Vec<Vec<ComponentVertex>>,
    component_vertices: BTreeMap<ComponentId, Vec<Option<UniqueVertexId>>>,
}

impl VertexIdentifier {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unique vertices.
    pub fn nb_unique_vertices(&self) -> usize {
        self.unique_vertices.len()
    }

    /// Create a unique vertex with no component vertex yet.
    pub fn create_unique_vertex(&mut self) -> UniqueVertexId {
        self.unique_vertices.push(Vec::new());
        UniqueVertexId((self.unique_vertices.len() - 1) as u32)
    }

    /// Create `count` unique vertices, returning the first one. Ids are
    /// contiguous.
    pub fn create_unique_vertices(&mut self, count: usize) -> UniqueVertexId {
        let first = UniqueVertexId(self.unique_vertices.len() as u32);
        self.unique_vertices
            .resize_with(self.unique_vertices.len() + count, Vec::new);
        first
    }

    /// Unique vertex by table index, if it exists.
    pub fn unique_vertex_at(&self, index: usize) -> Option<UniqueVertexId> {
        (index < self.unique_vertices.len()).then_some(UniqueVertexId(index as u32))
    }

    /// Declare a component with `nb_vertices` unassigned vertices.
    pub fn register_component(&mut self, component: ComponentId, nb_vertices: usize) {
        self.component_vertices
            .entry(component)
            .or_default()
            .resize(nb_vertices, None);
    }

    /// Number of vertices declared for a component.
    pub fn nb_component_vertices(&self, component: ComponentId) -> usize {
        self.component_vertices.get(&component).map_or(0, Vec::len)
    }

    /// Assign a component vertex to a unique vertex, returning the previous
    /// assignment.
    ///
    /// # Panics
    ///
    /// Panics if `unique_vertex` was not created by this table.
    pub fn set_unique_vertex(
        &mut self,
        component_vertex: ComponentVertex,
        unique_vertex: UniqueVertexId,
    ) -> Option<UniqueVertexId> {
        let slots = self
            .component_vertices
            .entry(component_vertex.component)
            .or_default();
        let local = component_vertex.vertex as usize;
        if local >= slots.len() {
            slots.resize(local + 1, None);
        }
        let previous = slots[local].replace(unique_vertex);
        if previous == Some(unique_vertex) {
            return previous;
        }
        if let Some(old) = previous {
            self.unique_vertices[old.index()].retain(|cmv| *cmv != component_vertex);
        }
        self.unique_vertices[unique_vertex.index()].push(component_vertex);
        previous
    }

    /// Unique vertex of a component vertex.
    pub fn unique_vertex(&self, component_vertex: ComponentVertex) -> Option<UniqueVertexId> {
        self.component_vertices
            .get(&component_vertex.component)
            .and_then(|slots| slots.get(component_vertex.vertex as usize))
            .copied()
            .flatten()
    }

    /// Every component vertex assigned to a unique vertex.
    pub fn component_vertices(&self, unique_vertex: UniqueVertexId) -> &[ComponentVertex] {
        self.unique_vertices
            .get(unique_vertex.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Component vertices of a given kind assigned to a unique vertex.
    pub fn component_vertices_of_kind(
        &self,
        unique_vertex: UniqueVertexId,
        kind: ComponentKind,
    ) -> impl Iterator<Item = &ComponentVertex> + '_ {
        self.component_vertices(unique_vertex)
            .iter()
            .filter(move |cmv| cmv.component.kind() == kind)
    }

    /// Local vertices of `component` assigned to a unique vertex.
    pub fn component_vertices_in(
        &self,
        unique_vertex: UniqueVertexId,
        component: ComponentId,
    ) -> impl Iterator<Item = u32> + '_ {
        self.component_vertices(unique_vertex)
            .iter()
            .filter(move |cmv| cmv.component == component)
            .map(|cmv| cmv.vertex)
    }

    /// True when some component of `kind` uses the unique vertex.
    pub fn has_component_of_kind(&self, unique_vertex: UniqueVertexId, kind: ComponentKind) -> bool {
        self.component_vertices_of_kind(unique_vertex, kind)
            .next()
            .is_some()
    }

    /// Unique vertices of every local vertex of a component, in local order.
    pub fn unique_vertices_of(&self, component: ComponentId) -> &[Option<UniqueVertexId>] {
        self.component_vertices
            .get(&component)
            .map_or(&[], Vec::as_slice)
    }
}
