use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{
    AttributeRecord, KeyframeSample, NodeRecord, Snapshot, TangentHandles, TangentShape,
    TangentType,
};
use crate::error::{Result, TransferError};
use crate::value::{FrameTime, KeyValue};

/// Public API: parse a persisted keyframe document into a [`Snapshot`].
///
/// Notes:
/// - `nodes` becomes the node order; `keyframe_range` the global keyframe times.
/// - Time keys are strings ("10.0" or "10"); both parse to the same frame.
/// - `weighted_tangents: false` drops the stored weights: they are not part of
///   an unweighted tangent shape.
/// - The result must satisfy [`Snapshot::validate_basic`].
pub fn parse_snapshot_json(s: &str) -> Result<Snapshot> {
    let doc: StoredSnapshot = serde_json::from_str(s)?;

    let mut nodes: IndexMap<String, NodeRecord> = IndexMap::with_capacity(doc.animation_data.len());
    for (node_id, attrs) in doc.animation_data {
        let mut node = NodeRecord::new(node_id.as_str());
        for (attr_name, stored) in attrs {
            node.insert_attribute(to_attribute_record(&node_id, attr_name, stored)?);
        }
        nodes.insert(node_id, node);
    }

    let snapshot = Snapshot {
        node_order: doc.nodes,
        global_keyframe_times: doc.keyframe_range,
        nodes,
    };
    snapshot
        .validate_basic()
        .map_err(TransferError::invalid_snapshot)?;
    Ok(snapshot)
}

/// Public API: render a [`Snapshot`] as a pretty-printed document (4-space indent).
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String> {
    let doc = StoredSnapshot::from(snapshot);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| TransferError::Serialization {
        reason: e.to_string(),
    })
}

fn to_attribute_record(
    node_id: &str,
    attr_name: String,
    stored: StoredAttribute,
) -> Result<AttributeRecord> {
    let mut record = AttributeRecord::new(attr_name, stored.current_value);
    for (key, k) in stored.key_frame_data {
        let time = FrameTime::parse_key(&key).map_err(|e| {
            TransferError::invalid_snapshot(format!(
                "{node_id}.{}: {e}",
                record.attribute_name
            ))
        })?;
        if record.samples.contains_key(&time) {
            return Err(TransferError::invalid_snapshot(format!(
                "{node_id}.{}: duplicate keyframe at {time}",
                record.attribute_name
            )));
        }
        record.insert_sample(k.into_sample(time.get()));
    }
    Ok(record)
}

// ----- JSON schema (serde) -----

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    nodes: Vec<String>,
    #[serde(default)]
    keyframe_range: Vec<f64>,
    animation_data: IndexMap<String, IndexMap<String, StoredAttribute>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAttribute {
    current_value: KeyValue,
    #[serde(default)]
    key_frame_data: IndexMap<String, StoredKey>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredKey {
    value: KeyValue,
    in_tangent: TangentType,
    out_tangent: TangentType,
    in_angle: f64,
    out_angle: f64,
    in_weight: f64,
    out_weight: f64,
    ix: f64,
    iy: f64,
    ox: f64,
    oy: f64,
    lock: bool,
    weight_lock: bool,
    weighted_tangents: bool,
}

impl StoredKey {
    fn into_sample(self, time: f64) -> KeyframeSample {
        let shape = if self.weighted_tangents {
            TangentShape::Weighted {
                in_angle: self.in_angle,
                out_angle: self.out_angle,
                in_weight: self.in_weight,
                out_weight: self.out_weight,
            }
        } else {
            TangentShape::Unweighted {
                in_angle: self.in_angle,
                out_angle: self.out_angle,
            }
        };
        KeyframeSample {
            time,
            value: self.value,
            in_tangent: self.in_tangent,
            out_tangent: self.out_tangent,
            shape,
            handles: TangentHandles {
                in_x: self.ix,
                in_y: self.iy,
                out_x: self.ox,
                out_y: self.oy,
            },
            tangents_locked: self.lock,
            weight_locked: self.weight_lock,
        }
    }
}

impl From<&KeyframeSample> for StoredKey {
    fn from(s: &KeyframeSample) -> Self {
        let (in_angle, out_angle) = s.shape.angles();
        let (in_weight, out_weight) = s.shape.weights().unwrap_or((
            TangentShape::UNWEIGHTED_WEIGHT,
            TangentShape::UNWEIGHTED_WEIGHT,
        ));
        Self {
            value: s.value,
            in_tangent: s.in_tangent,
            out_tangent: s.out_tangent,
            in_angle,
            out_angle,
            in_weight,
            out_weight,
            ix: s.handles.in_x,
            iy: s.handles.in_y,
            ox: s.handles.out_x,
            oy: s.handles.out_y,
            lock: s.tangents_locked,
            weight_lock: s.weight_locked,
            weighted_tangents: s.shape.is_weighted(),
        }
    }
}

impl From<&Snapshot> for StoredSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let animation_data = snapshot
            .nodes
            .iter()
            .map(|(id, node)| {
                let attrs = node
                    .attributes
                    .iter()
                    .map(|(name, attr)| {
                        let key_frame_data = attr
                            .samples
                            .iter()
                            .map(|(t, s)| (t.to_key_string(), StoredKey::from(s)))
                            .collect();
                        (
                            name.clone(),
                            StoredAttribute {
                                current_value: attr.current_value,
                                key_frame_data,
                            },
                        )
                    })
                    .collect();
                (id.clone(), attrs)
            })
            .collect();
        Self {
            nodes: snapshot.node_order.clone(),
            keyframe_range: snapshot.global_keyframe_times.clone(),
            animation_data,
        }
    }
}
