//! Typed identifiers.

use std::fmt;

slotmap::new_key_type! {
    /// Identifier of a [`Corner`](crate::Corner).
    pub struct CornerId;
    /// Identifier of a [`Line`](crate::Line).
    pub struct LineId;
    /// Identifier of a [`Surface`](crate::Surface).
    pub struct SurfaceId;
    /// Identifier of a [`Block`](crate::Block).
    pub struct BlockId;
    /// Identifier of a [`Collection`](crate::Collection).
    pub struct CollectionId;
}

/// Model-wide vertex identifier shared by every component vertex located
/// at the same physical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueVertexId(pub(crate) u32);

impl UniqueVertexId {
    /// Position of this vertex in the unique-vertex table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UniqueVertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uv{}", self.0)
    }
}

/// Kind of a model component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Zero-dimensional junction.
    Corner,
    /// Polyline between corners.
    Line,
    /// Triangulated patch.
    Surface,
    /// Volumetric region.
    Block,
}

/// Any model component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentId {
    /// A corner.
    Corner(CornerId),
    /// A line.
    Line(LineId),
    /// A surface.
    Surface(SurfaceId),
    /// A block.
    Block(BlockId),
}

impl ComponentId {
    /// Kind of this component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentId::Corner(_) => ComponentKind::Corner,
            ComponentId::Line(_) => ComponentKind::Line,
            ComponentId::Surface(_) => ComponentKind::Surface,
            ComponentId::Block(_) => ComponentKind::Block,
        }
    }
}

impl From<CornerId> for ComponentId {
    fn from(id: CornerId) -> Self {
        ComponentId::Corner(id)
    }
}

impl From<LineId> for ComponentId {
    fn from(id: LineId) -> Self {
        ComponentId::Line(id)
    }
}

impl From<SurfaceId> for ComponentId {
    fn from(id: SurfaceId) -> Self {
        ComponentId::Surface(id)
    }
}

impl From<BlockId> for ComponentId {
    fn from(id: BlockId) -> Self {
        ComponentId::Block(id)
    }
}

/// A vertex of a component, by local index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentVertex {
    /// Owning component.
    pub component: ComponentId,
    /// Local vertex index in the component's mesh.
    pub vertex: u32,
}

impl ComponentVertex {
    /// Create a component vertex reference.
    pub fn new(component: impl Into<ComponentId>, vertex: u32) -> Self {
        Self {
            component: component.into(),
            vertex,
        }
    }
}
