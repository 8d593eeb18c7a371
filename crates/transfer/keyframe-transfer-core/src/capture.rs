//! Snapshot capture: walk nodes, their keyable attributes and the resolved
//! range, and record every key with its full tangent shape.
//!
//! Capture never writes to the scene.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{AttributeRecord, NodeRecord, Snapshot};
use crate::error::{Result, TransferError};
use crate::host::Scene;
use crate::range::{self, FrameRange, RangeSelector};

pub const CAPTURE_PROGRESS_LABEL: &str = "Copying keyframes";

/// How a capture chooses attributes and key times.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureOptions {
    /// Explicit attribute short names; `None` captures every keyable, unlocked attribute.
    pub attribute_filter: Option<Vec<String>>,
    pub range_selector: RangeSelector,
    /// Take every key on each curve, ignoring range and frequency.
    pub all_keyframes: bool,
    /// Keep at most one key per this many frames of the range.
    pub frequency: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            attribute_filter: None,
            range_selector: RangeSelector::default(),
            all_keyframes: false,
            frequency: 1,
        }
    }
}

impl CaptureOptions {
    pub fn all_keyframes() -> Self {
        Self {
            all_keyframes: true,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, selector: RangeSelector) -> Self {
        self.range_selector = selector;
        self.all_keyframes = false;
        self
    }

    pub fn with_attributes<I, A>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.attribute_filter = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    fn admits(&self, attr: &str) -> bool {
        match &self.attribute_filter {
            Some(filter) => filter.iter().any(|a| a == attr),
            None => true,
        }
    }
}

/// Capture `nodes` into a fresh snapshot.
///
/// Nodes with no capturable attribute are left out; the call fails with
/// [`TransferError::NoCapturableData`] only when every node was left out.
pub fn capture<S: Scene + ?Sized>(
    scene: &mut S,
    nodes: &[String],
    opts: &CaptureOptions,
) -> Result<Snapshot> {
    if nodes.is_empty() {
        return Err(TransferError::EmptySelection);
    }

    let range = if opts.all_keyframes {
        None
    } else {
        if opts.frequency == 0 {
            return Err(TransferError::InvalidFrequency {
                frequency: opts.frequency,
            });
        }
        Some(range::resolve(opts.range_selector, &*scene))
    };
    debug!(
        "capture: {} node(s), range={:?}, frequency={}",
        nodes.len(),
        range,
        opts.frequency
    );

    let mut snapshot = Snapshot::default();
    let total = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        if scene.should_cancel() {
            warn!("capture cancelled after {i}/{total} node(s)");
            return Err(TransferError::Cancelled);
        }
        if snapshot.nodes.contains_key(node) {
            debug!("capture: '{node}' listed twice; keeping first");
        } else if let Some(record) = capture_node(&*scene, node, range, opts)? {
            snapshot.node_order.push(node.clone());
            snapshot.nodes.insert(node.clone(), record);
        }
        scene.report_progress(CAPTURE_PROGRESS_LABEL, i + 1, total);
    }

    if snapshot.nodes.is_empty() {
        return Err(TransferError::NoCapturableData);
    }
    snapshot.rebuild_keyframe_times();
    info!(
        "captured {} node(s), {} attribute(s), {} key(s)",
        snapshot.nodes.len(),
        snapshot.attribute_count(),
        snapshot.key_count()
    );
    Ok(snapshot)
}

fn capture_node<S: Scene + ?Sized>(
    scene: &S,
    node: &str,
    range: Option<FrameRange>,
    opts: &CaptureOptions,
) -> Result<Option<NodeRecord>> {
    if !scene.node_exists(node) {
        warn!("capture: node '{node}' does not exist; skipping");
        return Ok(None);
    }
    let attrs: Vec<String> = scene
        .list_keyable_unlocked_attributes(node)
        .into_iter()
        .filter(|a| opts.admits(a))
        .collect();
    if attrs.is_empty() {
        debug!("capture: '{node}' has no keyable, unlocked attributes; skipping");
        return Ok(None);
    }

    let mut record = NodeRecord::new(node);
    for attr in attrs {
        record.insert_attribute(capture_attribute(scene, node, &attr, range, opts.frequency)?);
    }
    Ok(Some(record))
}

fn capture_attribute<S: Scene + ?Sized>(
    scene: &S,
    node: &str,
    attr: &str,
    range: Option<FrameRange>,
    frequency: u32,
) -> Result<AttributeRecord> {
    // Static attributes still round-trip through current_value.
    let mut record = AttributeRecord::new(attr, scene.get_value(node, attr)?);

    let mut times = scene.get_keyframe_times(node, attr, range);
    times.sort_by(f64::total_cmp);
    let times = match range {
        Some(r) => range::thin_to_frequency(&times, r, frequency)?,
        None => times,
    };
    for t in times {
        let mut sample = scene.get_sample(node, attr, t)?;
        sample.time = t;
        record.insert_sample(sample);
    }
    Ok(record)
}
