//! Snapshot application: remap stored nodes onto targets, offset key times
//! and rebuild each curve key by key.
//!
//! Fatal checks all run before the first write. Once writing starts, per-node,
//! per-attribute and per-key problems are recorded in [`ApplyReport`] and the
//! run continues.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{AttributeRecord, KeyframeSample, NodeRecord, Snapshot};
use crate::error::{Result, TransferError};
use crate::host::{Scene, TangentWrite, UndoChunk};

pub const APPLY_PROGRESS_LABEL: &str = "Pasting keyframes";

/// Paste behaviour.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApplyOptions {
    /// Shift keys so the earliest captured key lands on the current frame.
    pub use_current_time: bool,
    /// Assign sample payloads to the key times in reverse order. Key times
    /// themselves are not mirrored.
    pub payload_reversal: bool,
    /// Reserved: clearing existing keys in the pasted range is not implemented
    /// yet, so this currently has no effect and pasted keys merge with existing ones.
    pub replace: bool,
}

/// Why an item was skipped during apply.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NodeMissing,
    AttributeMissing,
    /// Present but locked or not keyable on the target.
    AttributeNotWritable,
    ValueWriteFailed(String),
    TangentWriteFailed(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppliedNode {
    pub target: String,
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkippedNode {
    pub target: String,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkippedAttribute {
    pub node: String,
    pub attribute: String,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkippedSample {
    pub node: String,
    pub attribute: String,
    /// Target time the write was aimed at (after offset).
    pub time: f64,
    pub reason: SkipReason,
}

/// Outcome of one apply run.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplyReport {
    /// Subtracted from every captured time to get the written time.
    pub offset: f64,
    pub applied_nodes: Vec<AppliedNode>,
    pub skipped_nodes: Vec<SkippedNode>,
    pub skipped_attributes: Vec<SkippedAttribute>,
    pub skipped_samples: Vec<SkippedSample>,
    /// Keys whose value and tangents were both written.
    pub keys_written: usize,
    pub static_values_written: usize,
    /// Stopped early at a node boundary.
    pub cancelled: bool,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_nodes.is_empty()
            && self.skipped_attributes.is_empty()
            && self.skipped_samples.is_empty()
            && !self.cancelled
    }

    fn skip_attribute(&mut self, node: &str, attribute: &str, reason: SkipReason) {
        warn!("paste: skipping '{node}.{attribute}': {reason:?}");
        self.skipped_attributes.push(SkippedAttribute {
            node: node.to_string(),
            attribute: attribute.to_string(),
            reason,
        });
    }

    fn skip_sample(&mut self, node: &str, attribute: &str, time: f64, reason: SkipReason) {
        warn!("paste: key '{node}.{attribute}' @ {time} not written: {reason:?}");
        self.skipped_samples.push(SkippedSample {
            node: node.to_string(),
            attribute: attribute.to_string(),
            time,
            reason,
        });
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ApplyPhase {
    Idle,
    Validating,
    Offsetting,
    Writing,
    Done,
}

impl ApplyPhase {
    fn advance(self, next: ApplyPhase) -> ApplyPhase {
        debug!("paste: {self:?} -> {next:?}");
        next
    }
}

/// Source slot used for target `target_index` when `source_len` nodes were captured.
///
/// Cyclic: with 2 sources and 5 targets, targets 0, 2, 4 read source 0 and
/// targets 1, 3 read source 1. `None` when nothing was captured.
#[inline]
pub fn source_index(target_index: usize, source_len: usize) -> Option<usize> {
    if source_len == 0 {
        None
    } else {
        Some(target_index % source_len)
    }
}

/// Offset subtracted from captured times. With `use_current_time`, the earliest
/// captured key lands on `current_time`; otherwise keys keep absolute times.
pub fn time_offset(snapshot: &Snapshot, current_time: f64, use_current_time: bool) -> f64 {
    match (use_current_time, snapshot.first_keyframe_time()) {
        (true, Some(first)) => first - current_time,
        _ => 0.0,
    }
}

/// Pair each ascending key time with the payload written there.
pub fn key_assignments(
    record: &AttributeRecord,
    payload_reversal: bool,
) -> Vec<(f64, &KeyframeSample)> {
    let times = record.times();
    if payload_reversal {
        times.zip(record.samples.values().rev()).collect()
    } else {
        times.zip(record.samples.values()).collect()
    }
}

/// Apply `snapshot` onto `targets` (or back onto its own nodes when `targets` is empty).
pub fn apply<S: Scene + ?Sized>(
    scene: &mut S,
    snapshot: &Snapshot,
    targets: &[String],
    opts: &ApplyOptions,
) -> Result<ApplyReport> {
    let mut phase = ApplyPhase::Idle.advance(ApplyPhase::Validating);

    let targets: &[String] = if targets.is_empty() {
        &snapshot.node_order
    } else {
        targets
    };
    if targets.is_empty() {
        return Err(TransferError::EmptyTargetSelection);
    }
    let sources = resolve_sources(snapshot)?;
    if opts.replace {
        warn!("paste: replace is not implemented yet; pasted keys merge with existing keys");
    }

    phase = phase.advance(ApplyPhase::Offsetting);
    let current_time = scene.current_time();
    let offset = time_offset(snapshot, current_time, opts.use_current_time);
    debug!("paste: offset={offset} (current time {current_time})");

    phase = phase.advance(ApplyPhase::Writing);
    let mut report = ApplyReport {
        offset,
        ..ApplyReport::default()
    };
    {
        let mut scene = UndoChunk::open(scene);
        let total = targets.len();
        for (i, target) in targets.iter().enumerate() {
            if scene.should_cancel() {
                warn!("paste cancelled after {i}/{total} node(s)");
                report.cancelled = true;
                break;
            }
            let Some(slot) = source_index(i, sources.len()) else {
                break;
            };
            let source = sources[slot];
            write_node(&mut *scene, target, source, offset, opts, &mut report);
            scene.report_progress(APPLY_PROGRESS_LABEL, i + 1, total);
        }
    }

    phase.advance(ApplyPhase::Done);
    info!(
        "pasted {} key(s) and {} static value(s) onto {} node(s); skipped {} node(s), {} attribute(s), {} key(s)",
        report.keys_written,
        report.static_values_written,
        report.applied_nodes.len(),
        report.skipped_nodes.len(),
        report.skipped_attributes.len(),
        report.skipped_samples.len()
    );
    Ok(report)
}

fn resolve_sources(snapshot: &Snapshot) -> Result<Vec<&NodeRecord>> {
    if snapshot.node_order.is_empty() {
        return Err(TransferError::invalid_snapshot("snapshot has no nodes"));
    }
    snapshot
        .node_order
        .iter()
        .map(|id| {
            snapshot.nodes.get(id).ok_or_else(|| {
                TransferError::invalid_snapshot(format!("node '{id}' has no record"))
            })
        })
        .collect()
}

fn write_node<S: Scene + ?Sized>(
    scene: &mut S,
    target: &str,
    source: &NodeRecord,
    offset: f64,
    opts: &ApplyOptions,
    report: &mut ApplyReport,
) {
    if !scene.node_exists(target) {
        warn!("paste: target '{target}' does not exist; skipping");
        report.skipped_nodes.push(SkippedNode {
            target: target.to_string(),
            reason: SkipReason::NodeMissing,
        });
        return;
    }
    debug!("paste: '{}' -> '{target}'", source.node_id);

    // One listing per target, not per attribute.
    let writable = scene.list_keyable_unlocked_attributes(target);
    for (name, record) in &source.attributes {
        if !scene.attribute_exists(target, name) {
            report.skip_attribute(target, name, SkipReason::AttributeMissing);
            continue;
        }
        if !writable.iter().any(|a| a == name) {
            report.skip_attribute(target, name, SkipReason::AttributeNotWritable);
            continue;
        }
        write_attribute(scene, target, record, offset, opts, report);
    }
    report.applied_nodes.push(AppliedNode {
        target: target.to_string(),
        source: source.node_id.clone(),
    });
}

fn write_attribute<S: Scene + ?Sized>(
    scene: &mut S,
    node: &str,
    record: &AttributeRecord,
    offset: f64,
    opts: &ApplyOptions,
    report: &mut ApplyReport,
) {
    let attr = record.attribute_name.as_str();
    if record.is_static() {
        match scene.set_current_value(node, attr, record.current_value) {
            Ok(()) => report.static_values_written += 1,
            Err(e) => report.skip_attribute(node, attr, SkipReason::ValueWriteFailed(e.message)),
        }
        return;
    }

    for (time, payload) in key_assignments(record, opts.payload_reversal) {
        let at = time - offset;
        if let Err(e) = scene.set_value_at_time(node, attr, at, payload.value) {
            report.skip_sample(node, attr, at, SkipReason::ValueWriteFailed(e.message));
            continue;
        }
        match scene.set_tangent(node, attr, at, &TangentWrite::from(payload)) {
            Ok(()) => report.keys_written += 1,
            Err(e) => report.skip_sample(node, attr, at, SkipReason::TangentWriteFailed(e.message)),
        }
    }
}
