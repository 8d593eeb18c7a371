//! In-memory [`Scene`] for headless use, tests and benches.
//!
//! Nodes hold attributes with a static value, keyable/locked flags and a key
//! map. Every write is journaled so callers can assert on exact host traffic.

use std::cell::Cell;
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::data::KeyframeSample;
use crate::error::HostError;
use crate::host::{CurveStore, NodeHandle, Scene, TangentWrite};
use crate::range::{FrameRange, RangeProvider};
use crate::value::{FrameTime, KeyValue};

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryAttribute {
    pub value: KeyValue,
    pub keyable: bool,
    pub locked: bool,
    pub keys: BTreeMap<FrameTime, KeyframeSample>,
    pub fail_value_writes: bool,
    pub fail_tangent_writes: bool,
}

impl MemoryAttribute {
    pub fn new(value: KeyValue) -> Self {
        Self {
            value,
            keyable: true,
            locked: false,
            keys: BTreeMap::new(),
            fail_value_writes: false,
            fail_tangent_writes: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryNode {
    pub attributes: IndexMap<String, MemoryAttribute>,
}

/// One host write, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneWrite {
    Key {
        node: String,
        attribute: String,
        time: f64,
        value: KeyValue,
    },
    Tangent {
        node: String,
        attribute: String,
        time: f64,
        tangent: TangentWrite,
    },
    Static {
        node: String,
        attribute: String,
        time: f64,
        value: KeyValue,
    },
}

#[derive(Clone, Debug)]
pub struct MemoryScene {
    nodes: IndexMap<String, MemoryNode>,
    selection: Vec<NodeHandle>,
    current_time: f64,
    animation_range: FrameRange,
    playback_range: FrameRange,
    selected_key_range: FrameRange,
    journal: Vec<SceneWrite>,
    progress: Vec<(String, usize, usize)>,
    undo_opened: usize,
    undo_closed: usize,
    cancel_after: Option<usize>,
    attribute_listings: Cell<usize>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            selection: Vec::new(),
            current_time: 1.0,
            animation_range: FrameRange::new(1.0, 120.0),
            playback_range: FrameRange::new(1.0, 120.0),
            selected_key_range: FrameRange::new(1.0, 120.0),
            journal: Vec::new(),
            progress: Vec::new(),
            undo_opened: 0,
            undo_closed: 0,
            cancel_after: None,
            attribute_listings: Cell::new(0),
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- building -----

    pub fn add_node(&mut self, node: &str) -> &mut MemoryNode {
        self.nodes.entry(node.to_string()).or_default()
    }

    /// Add (or reset the value of) a keyable, unlocked attribute.
    pub fn add_attribute(&mut self, node: &str, attr: &str, value: impl Into<KeyValue>) {
        let value = value.into();
        self.add_node(node)
            .attributes
            .entry(attr.to_string())
            .and_modify(|a| a.value = value)
            .or_insert_with(|| MemoryAttribute::new(value));
    }

    /// Insert a key, creating the attribute from the key value if needed.
    pub fn insert_key(&mut self, node: &str, attr: &str, sample: KeyframeSample) {
        let value = sample.value;
        let attribute = self
            .add_node(node)
            .attributes
            .entry(attr.to_string())
            .or_insert_with(|| MemoryAttribute::new(value));
        attribute.keys.insert(FrameTime(sample.time), sample);
    }

    pub fn attribute_mut(&mut self, node: &str, attr: &str) -> Option<&mut MemoryAttribute> {
        self.nodes.get_mut(node)?.attributes.get_mut(attr)
    }

    pub fn set_locked(&mut self, node: &str, attr: &str, locked: bool) {
        if let Some(a) = self.attribute_mut(node, attr) {
            a.locked = locked;
        }
    }

    pub fn set_keyable(&mut self, node: &str, attr: &str, keyable: bool) {
        if let Some(a) = self.attribute_mut(node, attr) {
            a.keyable = keyable;
        }
    }

    pub fn fail_value_writes(&mut self, node: &str, attr: &str) {
        if let Some(a) = self.attribute_mut(node, attr) {
            a.fail_value_writes = true;
        }
    }

    pub fn fail_tangent_writes(&mut self, node: &str, attr: &str) {
        if let Some(a) = self.attribute_mut(node, attr) {
            a.fail_tangent_writes = true;
        }
    }

    pub fn remove_node(&mut self, node: &str) -> Option<MemoryNode> {
        self.nodes.shift_remove(node)
    }

    pub fn select<I, N>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.selection = nodes.into_iter().map(Into::into).collect();
    }

    pub fn set_current_time(&mut self, t: f64) {
        self.current_time = t;
    }

    pub fn set_animation_range(&mut self, range: FrameRange) {
        self.animation_range = range;
    }

    pub fn set_playback_range(&mut self, range: FrameRange) {
        self.playback_range = range;
    }

    pub fn set_selected_key_range(&mut self, range: FrameRange) {
        self.selected_key_range = range;
    }

    /// Request cancellation once `nodes` progress reports have been made.
    pub fn cancel_after_nodes(&mut self, nodes: usize) {
        self.cancel_after = Some(nodes);
    }

    // ----- inspection -----

    pub fn node(&self, node: &str) -> Option<&MemoryNode> {
        self.nodes.get(node)
    }

    pub fn attribute(&self, node: &str, attr: &str) -> Option<&MemoryAttribute> {
        self.nodes.get(node)?.attributes.get(attr)
    }

    pub fn key(&self, node: &str, attr: &str, time: f64) -> Option<&KeyframeSample> {
        self.attribute(node, attr)?.keys.get(&FrameTime(time))
    }

    /// Keys on an attribute, ascending.
    pub fn keys(&self, node: &str, attr: &str) -> Vec<&KeyframeSample> {
        self.attribute(node, attr)
            .map(|a| a.keys.values().collect())
            .unwrap_or_default()
    }

    pub fn static_value(&self, node: &str, attr: &str) -> Option<KeyValue> {
        self.attribute(node, attr).map(|a| a.value)
    }

    pub fn journal(&self) -> &[SceneWrite] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn progress(&self) -> &[(String, usize, usize)] {
        &self.progress
    }

    /// Calls made to `list_keyable_unlocked_attributes`.
    pub fn attribute_listings(&self) -> usize {
        self.attribute_listings.get()
    }

    /// (opened, closed) undo chunk counts.
    pub fn undo_chunks(&self) -> (usize, usize) {
        (self.undo_opened, self.undo_closed)
    }

    fn lookup(&self, node: &str, attr: &str) -> Result<&MemoryAttribute, HostError> {
        self.attribute(node, attr)
            .ok_or_else(|| HostError::new(format!("no attribute '{node}.{attr}'")))
    }

    fn lookup_for_write(&mut self, node: &str, attr: &str) -> Result<&mut MemoryAttribute, HostError> {
        let a = self
            .attribute_mut(node, attr)
            .ok_or_else(|| HostError::new(format!("no attribute '{node}.{attr}'")))?;
        if a.locked {
            return Err(HostError::new(format!("'{node}.{attr}' is locked")));
        }
        Ok(a)
    }
}

impl CurveStore for MemoryScene {
    fn node_exists(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    fn list_keyable_unlocked_attributes(&self, node: &str) -> Vec<String> {
        self.attribute_listings.set(self.attribute_listings.get() + 1);
        self.nodes
            .get(node)
            .map(|n| {
                n.attributes
                    .iter()
                    .filter(|(_, a)| a.keyable && !a.locked)
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute_exists(&self, node: &str, attr: &str) -> bool {
        self.attribute(node, attr).is_some()
    }

    fn get_value(&self, node: &str, attr: &str) -> Result<KeyValue, HostError> {
        self.lookup(node, attr).map(|a| a.value)
    }

    fn get_keyframe_times(&self, node: &str, attr: &str, range: Option<FrameRange>) -> Vec<f64> {
        let Some(a) = self.attribute(node, attr) else {
            return Vec::new();
        };
        a.keys
            .keys()
            .map(|t| t.get())
            .filter(|t| range.map_or(true, |r| r.contains(*t)))
            .collect()
    }

    fn get_sample(&self, node: &str, attr: &str, time: f64) -> Result<KeyframeSample, HostError> {
        self.lookup(node, attr)?
            .keys
            .get(&FrameTime(time))
            .cloned()
            .ok_or_else(|| HostError::new(format!("no key on '{node}.{attr}' at {time}")))
    }

    fn set_value_at_time(
        &mut self,
        node: &str,
        attr: &str,
        time: f64,
        value: KeyValue,
    ) -> Result<(), HostError> {
        let a = self.lookup_for_write(node, attr)?;
        if a.fail_value_writes {
            return Err(HostError::new(format!("cannot key '{node}.{attr}'")));
        }
        a.keys
            .entry(FrameTime(time))
            .and_modify(|k| k.value = value)
            .or_insert_with(|| KeyframeSample::new(time, value));
        self.journal.push(SceneWrite::Key {
            node: node.to_string(),
            attribute: attr.to_string(),
            time,
            value,
        });
        Ok(())
    }

    fn set_current_value(
        &mut self,
        node: &str,
        attr: &str,
        value: KeyValue,
    ) -> Result<(), HostError> {
        let time = self.current_time;
        let a = self.lookup_for_write(node, attr)?;
        if a.fail_value_writes {
            return Err(HostError::new(format!("cannot set '{node}.{attr}'")));
        }
        a.value = value;
        self.journal.push(SceneWrite::Static {
            node: node.to_string(),
            attribute: attr.to_string(),
            time,
            value,
        });
        Ok(())
    }

    fn set_tangent(
        &mut self,
        node: &str,
        attr: &str,
        time: f64,
        tangent: &TangentWrite,
    ) -> Result<(), HostError> {
        let a = self.lookup_for_write(node, attr)?;
        if a.fail_tangent_writes {
            return Err(HostError::new(format!("cannot shape tangents on '{node}.{attr}'")));
        }
        let key = a
            .keys
            .get_mut(&FrameTime(time))
            .ok_or_else(|| HostError::new(format!("no key on '{node}.{attr}' at {time}")))?;
        key.in_tangent = tangent.in_tangent;
        key.out_tangent = tangent.out_tangent;
        key.shape = tangent.shape;
        key.handles = tangent.handles;
        key.tangents_locked = tangent.tangents_locked;
        key.weight_locked = tangent.weight_locked;
        self.journal.push(SceneWrite::Tangent {
            node: node.to_string(),
            attribute: attr.to_string(),
            time,
            tangent: *tangent,
        });
        Ok(())
    }
}

impl RangeProvider for MemoryScene {
    fn animation_range(&self) -> FrameRange {
        self.animation_range
    }

    fn playback_range(&self) -> FrameRange {
        self.playback_range
    }

    fn selected_key_range(&self) -> FrameRange {
        self.selected_key_range
    }
}

impl Scene for MemoryScene {
    fn current_selection(&self) -> Vec<NodeHandle> {
        self.selection.clone()
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn report_progress(&mut self, label: &str, current: usize, total: usize) {
        self.progress.push((label.to_string(), current, total));
    }

    fn open_undo_chunk(&mut self) {
        self.undo_opened += 1;
    }

    fn close_undo_chunk(&mut self) {
        self.undo_closed += 1;
    }

    fn should_cancel(&self) -> bool {
        self.cancel_after
            .is_some_and(|n| self.progress.len() >= n)
    }
}
