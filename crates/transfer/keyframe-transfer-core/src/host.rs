//! Host seam: curve queries/writes and scene context.
//!
//! Adapters (DCC plugins, headless scenes) implement [`CurveStore`] and
//! [`Scene`] and hand them to capture/apply. Nodes are addressed by their
//! full host identifier, attributes by short name.

use std::ops::{Deref, DerefMut};

use crate::data::{KeyframeSample, TangentHandles, TangentShape, TangentType};
use crate::error::HostError;
use crate::range::{FrameRange, RangeProvider};
use crate::value::KeyValue;

/// Opaque node handle (full host identifier).
pub type NodeHandle = String;

/// Tangent payload written onto an existing key.
///
/// Hosts apply fields in declaration order: types, angles, weights (only for
/// [`TangentShape::Weighted`]), handles, then lock flags.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TangentWrite {
    pub in_tangent: TangentType,
    pub out_tangent: TangentType,
    pub shape: TangentShape,
    pub handles: TangentHandles,
    pub tangents_locked: bool,
    pub weight_locked: bool,
}

impl From<&KeyframeSample> for TangentWrite {
    fn from(s: &KeyframeSample) -> Self {
        Self {
            in_tangent: s.in_tangent,
            out_tangent: s.out_tangent,
            shape: s.shape,
            handles: s.handles,
            tangents_locked: s.tangents_locked,
            weight_locked: s.weight_locked,
        }
    }
}

/// Per-attribute keyframe query and write primitives.
pub trait CurveStore {
    fn node_exists(&self, node: &str) -> bool;

    /// Attributes that are keyable and unlocked, in host order. Capture and apply
    /// query this once per node.
    fn list_keyable_unlocked_attributes(&self, node: &str) -> Vec<String>;

    fn attribute_exists(&self, node: &str, attr: &str) -> bool;

    fn get_value(&self, node: &str, attr: &str) -> Result<KeyValue, HostError>;

    /// Key times, ascending. `None` means every key on the curve.
    fn get_keyframe_times(&self, node: &str, attr: &str, range: Option<FrameRange>) -> Vec<f64>;

    fn get_sample(&self, node: &str, attr: &str, time: f64) -> Result<KeyframeSample, HostError>;

    /// Set (creating if needed) the key at `time`.
    fn set_value_at_time(
        &mut self,
        node: &str,
        attr: &str,
        time: f64,
        value: KeyValue,
    ) -> Result<(), HostError>;

    /// Static write at the current time; never creates a curve.
    fn set_current_value(&mut self, node: &str, attr: &str, value: KeyValue)
        -> Result<(), HostError>;

    /// Shape the tangents of the existing key at `time`.
    fn set_tangent(
        &mut self,
        node: &str,
        attr: &str,
        time: f64,
        tangent: &TangentWrite,
    ) -> Result<(), HostError>;
}

/// Scene-level context around the curve store.
pub trait Scene: CurveStore + RangeProvider {
    fn current_selection(&self) -> Vec<NodeHandle>;

    fn current_time(&self) -> f64;

    fn report_progress(&mut self, _label: &str, _current: usize, _total: usize) {}

    fn open_undo_chunk(&mut self) {}

    fn close_undo_chunk(&mut self) {}

    /// Polled between nodes; never mid-attribute.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Open undo chunk on a scene. Closes the chunk on drop, whatever the exit path.
pub struct UndoChunk<'a, S: Scene + ?Sized> {
    scene: &'a mut S,
}

impl<'a, S: Scene + ?Sized> UndoChunk<'a, S> {
    pub fn open(scene: &'a mut S) -> Self {
        scene.open_undo_chunk();
        Self { scene }
    }
}

impl<S: Scene + ?Sized> Deref for UndoChunk<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: Scene + ?Sized> DerefMut for UndoChunk<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: Scene + ?Sized> Drop for UndoChunk<'_, S> {
    fn drop(&mut self) {
        self.scene.close_undo_chunk();
    }
}
