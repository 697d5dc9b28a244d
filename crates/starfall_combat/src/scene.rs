//! # Renderer Facade
//!
//! The pools never talk to a renderer directly. Every scene mutation and
//! GPU resource call goes through [`GuardedRenderer`], which tolerates a
//! missing backend (headless simulation, tests, dedicated server).
//!
//! Handles are allocated here, not by the backend, so pooled objects hold
//! the same handles whether or not anything is drawing them.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use starfall_core::PoolHandle;

// =============================================================================
// HANDLES
// =============================================================================

/// Handle to a geometry resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Handle to a material resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Which part of a pooled object a scene node draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodePart {
    /// The main mesh.
    Body,
    /// Optional additive glow shell.
    Glow,
}

/// Stable scene id of a pooled object's node.
///
/// Derived from the owning pool and slot, so a recycled object reuses the
/// same node id every time it is re-attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Id of the owning pool.
    pub pool: u32,
    /// Slot inside the pool.
    pub slot: u32,
    /// Body or glow.
    pub part: NodePart,
}

impl NodeId {
    /// Node id for the object behind `handle`.
    #[must_use]
    pub const fn for_handle(handle: PoolHandle, part: NodePart) -> Self {
        Self {
            pool: handle.pool_id(),
            slot: handle.index(),
            part,
        }
    }
}

/// A drawable attached to the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneNode {
    /// Scene id.
    pub id: NodeId,
    /// Mesh to draw.
    pub geometry: GeometryHandle,
    /// Material to draw it with.
    pub material: MaterialHandle,
}

// =============================================================================
// RESOURCE DESCRIPTIONS
// =============================================================================

/// Shape of a geometry resource.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryDesc {
    /// UV sphere.
    Sphere {
        /// Radius in world units.
        radius: f32,
    },
    /// Capsule along +Z.
    Capsule {
        /// Radius in world units.
        radius: f32,
        /// Length of the straight section.
        length: f32,
    },
    /// Camera-facing quad.
    Billboard {
        /// Edge length.
        size: f32,
    },
    /// Line strip with room for `max_points` vertices.
    Ribbon {
        /// Vertex capacity.
        max_points: u32,
    },
    /// Single segment.
    Line,
}

/// Material parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDesc {
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Additive blending (glows, flashes).
    pub additive: bool,
}

// =============================================================================
// BACKEND
// =============================================================================

/// Whatever actually draws the scene.
///
/// Resource calls default to no-ops so simple backends only track nodes.
pub trait RenderBackend {
    /// Attaches a node to the scene.
    fn add(&mut self, node: &SceneNode);

    /// Detaches a node from the scene.
    fn remove(&mut self, id: NodeId);

    /// Uploads a geometry resource.
    fn create_geometry(&mut self, _handle: GeometryHandle, _desc: &GeometryDesc) {}

    /// Uploads a material resource.
    fn create_material(&mut self, _handle: MaterialHandle, _desc: &MaterialDesc) {}

    /// Creates `clone` as a copy of `source`.
    fn clone_material(&mut self, _source: MaterialHandle, _clone: MaterialHandle) {}

    /// Frees a geometry resource.
    fn dispose_geometry(&mut self, _handle: GeometryHandle) {}

    /// Frees a material resource.
    fn dispose_material(&mut self, _handle: MaterialHandle) {}
}

/// Renderer facade that works with or without a backend.
pub struct GuardedRenderer {
    backend: Option<Box<dyn RenderBackend>>,
    next_geometry: u32,
    next_material: u32,
    attached: usize,
}

impl GuardedRenderer {
    /// Facade forwarding to `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::headless()
        }
    }

    /// Facade with nothing behind it. Every call still allocates handles
    /// and tracks attachment counts.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            backend: None,
            next_geometry: 0,
            next_material: 0,
            attached: 0,
        }
    }

    /// Whether a backend is present.
    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Nodes currently attached through this facade.
    #[must_use]
    pub const fn attached(&self) -> usize {
        self.attached
    }

    /// Attaches a node.
    pub fn add(&mut self, node: &SceneNode) {
        self.attached += 1;
        if let Some(backend) = self.backend.as_mut() {
            backend.add(node);
        }
    }

    /// Detaches a node.
    pub fn remove(&mut self, id: NodeId) {
        self.attached = self.attached.saturating_sub(1);
        if let Some(backend) = self.backend.as_mut() {
            backend.remove(id);
        }
    }

    /// Creates a geometry resource.
    pub fn create_geometry(&mut self, desc: &GeometryDesc) -> GeometryHandle {
        let handle = GeometryHandle(self.next_geometry);
        self.next_geometry += 1;
        if let Some(backend) = self.backend.as_mut() {
            backend.create_geometry(handle, desc);
        }
        handle
    }

    /// Creates a material resource.
    pub fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle {
        let handle = self.alloc_material();
        if let Some(backend) = self.backend.as_mut() {
            backend.create_material(handle, desc);
        }
        handle
    }

    /// Clones a material so the copy can be tinted or faded on its own.
    pub fn clone_material(&mut self, source: MaterialHandle) -> MaterialHandle {
        let handle = self.alloc_material();
        if let Some(backend) = self.backend.as_mut() {
            backend.clone_material(source, handle);
        }
        handle
    }

    /// Frees a geometry resource.
    pub fn dispose_geometry(&mut self, handle: GeometryHandle) {
        if let Some(backend) = self.backend.as_mut() {
            backend.dispose_geometry(handle);
        }
    }

    /// Frees a material resource.
    pub fn dispose_material(&mut self, handle: MaterialHandle) {
        if let Some(backend) = self.backend.as_mut() {
            backend.dispose_material(handle);
        }
    }

    fn alloc_material(&mut self) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        handle
    }
}

impl Default for GuardedRenderer {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for GuardedRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedRenderer")
            .field("backend", &self.backend.is_some())
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RECORDING BACKEND
// =============================================================================

/// Everything a [`RecordingRenderer`] has seen.
#[derive(Debug, Default)]
pub struct RenderLog {
    /// Nodes currently in the scene.
    pub attached: HashSet<NodeId>,
    /// Total `add` calls.
    pub adds: usize,
    /// Total `remove` calls.
    pub removes: usize,
    /// Geometries created.
    pub geometries_created: Vec<GeometryHandle>,
    /// Materials created (originals only).
    pub materials_created: Vec<MaterialHandle>,
    /// Materials created by cloning.
    pub materials_cloned: Vec<MaterialHandle>,
    /// Geometries disposed, in call order.
    pub geometries_disposed: Vec<GeometryHandle>,
    /// Materials disposed, in call order.
    pub materials_disposed: Vec<MaterialHandle>,
}

impl RenderLog {
    /// Number of times `handle` was disposed.
    #[must_use]
    pub fn material_dispose_count(&self, handle: MaterialHandle) -> usize {
        self.materials_disposed.iter().filter(|&&h| h == handle).count()
    }

    /// Number of times `handle` was disposed.
    #[must_use]
    pub fn geometry_dispose_count(&self, handle: GeometryHandle) -> usize {
        self.geometries_disposed.iter().filter(|&&h| h == handle).count()
    }
}

/// Backend that draws nothing and records every call into a shared
/// [`RenderLog`]. Used by tests and the headless simulation binary.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingRenderer {
    /// Creates a recorder and returns the log it writes to.
    #[must_use]
    pub fn new() -> (Self, Rc<RefCell<RenderLog>>) {
        let log = Rc::new(RefCell::new(RenderLog::default()));
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl RenderBackend for RecordingRenderer {
    fn add(&mut self, node: &SceneNode) {
        let mut log = self.log.borrow_mut();
        log.adds += 1;
        log.attached.insert(node.id);
    }

    fn remove(&mut self, id: NodeId) {
        let mut log = self.log.borrow_mut();
        log.removes += 1;
        log.attached.remove(&id);
    }

    fn create_geometry(&mut self, handle: GeometryHandle, _desc: &GeometryDesc) {
        self.log.borrow_mut().geometries_created.push(handle);
    }

    fn create_material(&mut self, handle: MaterialHandle, _desc: &MaterialDesc) {
        self.log.borrow_mut().materials_created.push(handle);
    }

    fn clone_material(&mut self, _source: MaterialHandle, clone: MaterialHandle) {
        self.log.borrow_mut().materials_cloned.push(clone);
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) {
        self.log.borrow_mut().geometries_disposed.push(handle);
    }

    fn dispose_material(&mut self, handle: MaterialHandle) {
        self.log.borrow_mut().materials_disposed.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(slot: u32) -> SceneNode {
        SceneNode {
            id: NodeId {
                pool: 1,
                slot,
                part: NodePart::Body,
            },
            geometry: GeometryHandle(0),
            material: MaterialHandle(0),
        }
    }

    #[test]
    fn test_headless_tolerates_everything() {
        let mut renderer = GuardedRenderer::headless();
        assert!(!renderer.has_backend());

        let geometry = renderer.create_geometry(&GeometryDesc::Line);
        let material = renderer.create_material(&MaterialDesc {
            color: [1.0; 4],
            additive: false,
        });
        let clone = renderer.clone_material(material);
        assert_ne!(material, clone);

        renderer.add(&node(0));
        assert_eq!(renderer.attached(), 1);
        renderer.remove(node(0).id);
        renderer.remove(node(0).id);
        assert_eq!(renderer.attached(), 0);

        renderer.dispose_material(clone);
        renderer.dispose_geometry(geometry);
    }

    #[test]
    fn test_recording_backend_tracks_scene() {
        let (backend, log) = RecordingRenderer::new();
        let mut renderer = GuardedRenderer::new(Box::new(backend));

        renderer.add(&node(0));
        renderer.add(&node(1));
        renderer.remove(node(0).id);

        let log = log.borrow();
        assert_eq!(log.adds, 2);
        assert_eq!(log.removes, 1);
        assert!(log.attached.contains(&node(1).id));
        assert!(!log.attached.contains(&node(0).id));
    }
}
