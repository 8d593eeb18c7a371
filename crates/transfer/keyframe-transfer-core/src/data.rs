//! Snapshot data model: keyframe samples, attribute and node records.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{FrameTime, KeyValue};

/// Tangent interpolation type on one side of a keyframe.
///
/// Names are the host's lowercase tangent names (`autoease`, `stepnext`, ...);
/// an unknown name fails the whole document.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TangentType {
    Spline,
    Linear,
    Fast,
    Slow,
    Flat,
    Step,
    #[serde(rename = "stepnext")]
    StepNext,
    Fixed,
    Clamped,
    Plateau,
    #[default]
    Auto,
    AutoEase,
    AutoMix,
    AutoCustom,
}

/// Tangent handle end points relative to the key.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TangentHandles {
    pub in_x: f64,
    pub in_y: f64,
    pub out_x: f64,
    pub out_y: f64,
}

impl Default for TangentHandles {
    fn default() -> Self {
        Self {
            in_x: 1.0,
            in_y: 0.0,
            out_x: 1.0,
            out_y: 0.0,
        }
    }
}

/// Angle and (for weighted curves) weight of both tangents.
///
/// Weights only exist on weighted curves; an unweighted shape cannot carry
/// them, so a write can never apply stale weights.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TangentShape {
    Unweighted {
        in_angle: f64,
        out_angle: f64,
    },
    Weighted {
        in_angle: f64,
        out_angle: f64,
        in_weight: f64,
        out_weight: f64,
    },
}

impl TangentShape {
    /// Weight reported for unweighted tangents when a flat record is needed.
    pub const UNWEIGHTED_WEIGHT: f64 = 1.0;

    pub fn flat() -> Self {
        TangentShape::Unweighted {
            in_angle: 0.0,
            out_angle: 0.0,
        }
    }

    #[inline]
    pub fn is_weighted(&self) -> bool {
        matches!(self, TangentShape::Weighted { .. })
    }

    #[inline]
    pub fn angles(&self) -> (f64, f64) {
        match *self {
            TangentShape::Unweighted {
                in_angle,
                out_angle,
            }
            | TangentShape::Weighted {
                in_angle,
                out_angle,
                ..
            } => (in_angle, out_angle),
        }
    }

    #[inline]
    pub fn weights(&self) -> Option<(f64, f64)> {
        match *self {
            TangentShape::Weighted {
                in_weight,
                out_weight,
                ..
            } => Some((in_weight, out_weight)),
            TangentShape::Unweighted { .. } => None,
        }
    }
}

impl Default for TangentShape {
    fn default() -> Self {
        Self::flat()
    }
}

/// One keyframe on one attribute curve, with everything needed to rebuild its tangents.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyframeSample {
    /// Frame time of the key.
    pub time: f64,
    pub value: KeyValue,
    pub in_tangent: TangentType,
    pub out_tangent: TangentType,
    pub shape: TangentShape,
    pub handles: TangentHandles,
    pub tangents_locked: bool,
    pub weight_locked: bool,
}

impl KeyframeSample {
    /// A key with auto tangents, as hosts create when a value is keyed without tangent data.
    pub fn new(time: f64, value: KeyValue) -> Self {
        Self {
            time,
            value,
            in_tangent: TangentType::Auto,
            out_tangent: TangentType::Auto,
            shape: TangentShape::flat(),
            handles: TangentHandles::default(),
            tangents_locked: true,
            weight_locked: false,
        }
    }

    pub fn with_tangents(mut self, in_tangent: TangentType, out_tangent: TangentType) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }

    pub fn with_shape(mut self, shape: TangentShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_handles(mut self, handles: TangentHandles) -> Self {
        self.handles = handles;
        self
    }

    /// Same payload placed at another time.
    pub fn at_time(&self, time: f64) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }

    #[inline]
    pub fn weighted_tangents(&self) -> bool {
        self.shape.is_weighted()
    }
}

/// One animated attribute on one node.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRecord {
    /// Short attribute name (no node prefix).
    pub attribute_name: String,
    /// Value written when the record has no samples.
    pub current_value: KeyValue,
    pub samples: BTreeMap<FrameTime, KeyframeSample>,
}

impl AttributeRecord {
    pub fn new(attribute_name: impl Into<String>, current_value: KeyValue) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            current_value,
            samples: BTreeMap::new(),
        }
    }

    /// Insert a sample keyed by its own time, replacing any sample at that time.
    pub fn insert_sample(&mut self, sample: KeyframeSample) {
        self.samples.insert(FrameTime(sample.time), sample);
    }

    pub fn with_sample(mut self, sample: KeyframeSample) -> Self {
        self.insert_sample(sample);
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.keys().map(|t| t.get())
    }
}

/// One captured node and its attributes, in capture order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
    /// Full node identifier at capture time.
    pub node_id: String,
    pub attributes: IndexMap<String, AttributeRecord>,
}

impl NodeRecord {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn insert_attribute(&mut self, record: AttributeRecord) {
        self.attributes.insert(record.attribute_name.clone(), record);
    }

    pub fn with_attribute(mut self, record: AttributeRecord) -> Self {
        self.insert_attribute(record);
        self
    }

    pub fn key_count(&self) -> usize {
        self.attributes.values().map(|a| a.samples.len()).sum()
    }
}

/// The transferable unit produced by capture and consumed by apply.
///
/// Persisted through [`crate::stored_snapshot`], which owns the document schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Node ids in capture order; index-based remapping reads this.
    pub node_order: Vec<String>,
    /// Sorted, deduplicated union of every sample time in the snapshot.
    pub global_keyframe_times: Vec<f64>,
    pub nodes: IndexMap<String, NodeRecord>,
}

impl Snapshot {
    /// Build a snapshot from node records, deriving order and keyframe times.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeRecord>) -> Self {
        let mut snapshot = Snapshot::default();
        for node in nodes {
            snapshot.node_order.push(node.node_id.clone());
            snapshot.nodes.insert(node.node_id.clone(), node);
        }
        snapshot.rebuild_keyframe_times();
        snapshot
    }

    /// Recompute `global_keyframe_times` from the samples.
    pub fn rebuild_keyframe_times(&mut self) {
        self.global_keyframe_times = self.collect_keyframe_times();
    }

    fn collect_keyframe_times(&self) -> Vec<f64> {
        let mut times: BTreeSet<FrameTime> = BTreeSet::new();
        for node in self.nodes.values() {
            for attr in node.attributes.values() {
                times.extend(attr.samples.keys().copied());
            }
        }
        times.into_iter().map(FrameTime::get).collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Earliest keyed frame, if any sample exists.
    pub fn first_keyframe_time(&self) -> Option<f64> {
        self.global_keyframe_times.first().copied()
    }

    pub fn attribute_count(&self) -> usize {
        self.nodes.values().map(|n| n.attributes.len()).sum()
    }

    pub fn key_count(&self) -> usize {
        self.nodes.values().map(NodeRecord::key_count).sum()
    }

    /// Validate structural invariants: non-empty, order matches nodes, keyframe
    /// times are the sorted union of samples, sample keys match sample times.
    pub fn validate_basic(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("snapshot must contain at least one node".into());
        }
        if self.node_order.len() != self.nodes.len() {
            return Err(format!(
                "node order lists {} nodes but {} node records are present",
                self.node_order.len(),
                self.nodes.len()
            ));
        }
        for id in &self.node_order {
            let Some(node) = self.nodes.get(id) else {
                return Err(format!("node '{id}' is listed in node order but has no record"));
            };
            if &node.node_id != id {
                return Err(format!(
                    "node record keyed '{id}' reports id '{}'",
                    node.node_id
                ));
            }
            for (name, attr) in &node.attributes {
                if &attr.attribute_name != name {
                    return Err(format!(
                        "attribute record keyed '{id}.{name}' reports name '{}'",
                        attr.attribute_name
                    ));
                }
                for (key, sample) in &attr.samples {
                    if !sample.time.is_finite() || *key != FrameTime(sample.time) {
                        return Err(format!(
                            "sample on '{id}.{name}' keyed at {key} reports time {}",
                            sample.time
                        ));
                    }
                }
            }
        }
        let expected = self.collect_keyframe_times();
        let matches = expected.len() == self.global_keyframe_times.len()
            && expected
                .iter()
                .zip(&self.global_keyframe_times)
                .all(|(a, b)| FrameTime(*a) == FrameTime(*b));
        if !matches {
            return Err(format!(
                "keyframe range {:?} is not the sorted union of sample times {:?}",
                self.global_keyframe_times, expected
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, v: f64) -> KeyframeSample {
        KeyframeSample::new(t, KeyValue::Number(v))
    }

    #[test]
    fn keyframe_times_are_sorted_union() {
        let a = NodeRecord::new("a").with_attribute(
            AttributeRecord::new("tx", KeyValue::Number(0.0))
                .with_sample(sample(20.0, 1.0))
                .with_sample(sample(10.0, 0.0)),
        );
        let b = NodeRecord::new("b")
            .with_attribute(AttributeRecord::new("ry", KeyValue::Number(0.0)).with_sample(sample(14.0, 3.0)))
            .with_attribute(AttributeRecord::new("rz", KeyValue::Number(0.0)).with_sample(sample(10.0, 3.0)));
        let snap = Snapshot::from_nodes([a, b]);
        assert_eq!(snap.global_keyframe_times, vec![10.0, 14.0, 20.0]);
        assert_eq!(snap.node_order, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(snap.key_count(), 4);
        assert!(snap.validate_basic().is_ok());
    }

    #[test]
    fn validate_rejects_empty_and_stale_ranges() {
        assert!(Snapshot::default().validate_basic().is_err());

        let mut snap = Snapshot::from_nodes([NodeRecord::new("a").with_attribute(
            AttributeRecord::new("tx", KeyValue::Number(0.0)).with_sample(sample(1.0, 1.0)),
        )]);
        snap.global_keyframe_times = vec![1.0, 2.0];
        let err = snap.validate_basic().unwrap_err();
        assert!(err.contains("sorted union"), "{err}");
    }

    #[test]
    fn validate_rejects_order_mismatch() {
        let mut snap = Snapshot::from_nodes([NodeRecord::new("a")]);
        snap.node_order.push("ghost".into());
        assert!(snap.validate_basic().is_err());
    }

    #[test]
    fn shape_exposes_weights_only_when_weighted() {
        let w = TangentShape::Weighted {
            in_angle: 10.0,
            out_angle: 20.0,
            in_weight: 2.0,
            out_weight: 3.0,
        };
        assert_eq!(w.angles(), (10.0, 20.0));
        assert_eq!(w.weights(), Some((2.0, 3.0)));
        assert_eq!(TangentShape::flat().weights(), None);
    }
}
