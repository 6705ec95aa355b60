use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Index of a node in a [`GrapeSkeleton`].
pub type NodeId = u32;

/// The engine-agnostic skeleton of a grape cluster.
///
/// Nodes are stored in creation order. Node 0 is the root; every `F` adds
/// exactly one node, connected to the node the turtle was standing on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrapeSkeleton {
    /// All skeleton points, indexed by [`NodeId`].
    pub nodes: Vec<SkeletonNode>,

    /// Parent → child connections in emission order.
    pub edges: Vec<SkeletonEdge>,

    /// Berry attachment points.
    pub attachments: Vec<BerryAttachment>,
}

/// A single point of the skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub position: Vec3,

    /// Turtle orientation when the node was created.
    pub rotation: Quat,

    /// Stem width at this node, used by skinning downstream.
    pub width: f32,

    /// The node this one grew from. `None` only for the root.
    pub parent: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonEdge {
    pub parent: NodeId,
    pub child: NodeId,
}

/// A berry hung on a skeleton node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BerryAttachment {
    pub node: NodeId,
    pub position: Vec3,
    pub size: f32,
}

impl GrapeSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a skeleton holding only the root node.
    pub fn with_root(position: Vec3, rotation: Quat, width: f32) -> Self {
        let mut skeleton = Self::new();
        skeleton.add_node(SkeletonNode {
            position,
            rotation,
            width,
            parent: None,
        });
        skeleton
    }

    /// Appends a node, and the edge from its parent if it has one.
    pub fn add_node(&mut self, node: SkeletonNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        if let Some(parent) = node.parent {
            self.edges.push(SkeletonEdge { parent, child: id });
        }
        self.nodes.push(node);
        id
    }

    pub fn add_attachment(&mut self, node: NodeId, size: f32) {
        if let Some(n) = self.nodes.get(node as usize) {
            self.attachments.push(BerryAttachment {
                node,
                position: n.position,
                size,
            });
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&SkeletonNode> {
        self.nodes.get(id as usize)
    }

    /// Direct children of `id`, in emission order.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.parent == id)
            .map(|e| e.child)
    }

    /// Nodes without children.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut has_child = vec![false; self.nodes.len()];
        for edge in &self.edges {
            if let Some(flag) = has_child.get_mut(edge.parent as usize) {
                *flag = true;
            }
        }
        has_child
            .iter()
            .enumerate()
            .filter(|(_, c)| !**c)
            .map(|(i, _)| i as NodeId)
            .collect()
    }

    /// Feeds the whole skeleton to a mesh-building collaborator.
    ///
    /// Vertices are created in node order, then edges in emission order, then
    /// attachments, and finally the sink is finalized. Edges and attachments
    /// naming a node that does not exist are skipped.
    pub fn build_with<S: SkeletonSink>(&self, mut sink: S) -> S::Output {
        let vertices: Vec<S::Vertex> = self
            .nodes
            .iter()
            .map(|n| sink.create_vertex(n.position, n.width))
            .collect();

        let vertex = |id: NodeId| vertices.get(id as usize).copied();

        for edge in &self.edges {
            match (vertex(edge.parent), vertex(edge.child)) {
                (Some(parent), Some(child)) => sink.connect(parent, child),
                _ => tracing::warn!(
                    parent = edge.parent,
                    child = edge.child,
                    "edge references a missing node, skipping"
                ),
            }
        }

        for berry in &self.attachments {
            match vertex(berry.node) {
                Some(v) => sink.mark_attachment(v, berry.size),
                None => tracing::warn!(node = berry.node, "attachment on a missing node, skipping"),
            }
        }

        sink.finalize()
    }
}

/// The boundary to whatever turns a skeleton into renderable geometry.
///
/// Implementations own their vertex handles; `finalize` is called exactly once
/// after every vertex, edge and attachment has been delivered.
pub trait SkeletonSink {
    type Vertex: Copy;
    type Output;

    fn create_vertex(&mut self, position: Vec3, width: f32) -> Self::Vertex;

    fn connect(&mut self, parent: Self::Vertex, child: Self::Vertex);

    fn mark_attachment(&mut self, vertex: Self::Vertex, size: f32);

    fn finalize(self) -> Self::Output;
}

/// A sphere standing in for one berry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BerrySphere {
    pub center: Vec3,
    pub diameter: f32,
}

/// Line-list mesh plus berry spheres. No skinning or smoothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireframeMesh {
    pub positions: Vec<Vec3>,
    pub widths: Vec<f32>,
    pub indices: Vec<u32>,
    pub berries: Vec<BerrySphere>,
}

/// Minimal [`SkeletonSink`] producing a [`WireframeMesh`].
#[derive(Clone, Debug)]
pub struct WireframeSink {
    mesh: WireframeMesh,
    diameter_scale: f32,
}

impl Default for WireframeSink {
    fn default() -> Self {
        Self {
            mesh: WireframeMesh::default(),
            diameter_scale: 1.0 / 15.0,
        }
    }
}

impl WireframeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the factor turning a berry size into a sphere diameter.
    pub fn with_diameter_scale(mut self, scale: f32) -> Self {
        self.diameter_scale = scale;
        self
    }
}

impl SkeletonSink for WireframeSink {
    type Vertex = u32;
    type Output = WireframeMesh;

    fn create_vertex(&mut self, position: Vec3, width: f32) -> u32 {
        let idx = self.mesh.positions.len() as u32;
        self.mesh.positions.push(position);
        self.mesh.widths.push(width);
        idx
    }

    fn connect(&mut self, parent: u32, child: u32) {
        self.mesh.indices.push(parent);
        self.mesh.indices.push(child);
    }

    fn mark_attachment(&mut self, vertex: u32, size: f32) {
        let center = self.mesh.positions[vertex as usize];
        self.mesh.berries.push(BerrySphere {
            center,
            diameter: size * self.diameter_scale,
        });
    }

    fn finalize(self) -> WireframeMesh {
        self.mesh
    }
}
