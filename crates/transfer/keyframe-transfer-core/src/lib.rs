//! Keyframe Transfer Core (host-agnostic)
//!
//! Captures animated attributes (values, key times and full tangent shape) into a
//! [`Snapshot`], persists it as a single JSON document, and rebuilds the curves
//! later, possibly on other nodes, shifted to the current frame, or with payloads
//! reversed. The host scene is reached only through the [`CurveStore`] and
//! [`Scene`] traits.

pub mod apply;
pub mod capture;
pub mod config;
pub mod data;
pub mod error;
pub mod host;
pub mod memory_scene;
pub mod range;
pub mod store;
pub mod stored_snapshot;
pub mod transfer;
pub mod value;

// Re-exports for consumers (host adapters)
pub use apply::{apply, source_index, time_offset, ApplyOptions, ApplyReport, SkipReason};
pub use capture::{capture, CaptureOptions};
pub use config::{CaptureDefaults, PasteDefaults, TransferConfig};
pub use data::{
    AttributeRecord, KeyframeSample, NodeRecord, Snapshot, TangentHandles, TangentShape,
    TangentType,
};
pub use error::{HostError, Result, TransferError};
pub use host::{CurveStore, NodeHandle, Scene, TangentWrite, UndoChunk};
pub use memory_scene::{MemoryScene, SceneWrite};
pub use range::{FrameRange, RangeProvider, RangeSelector};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use stored_snapshot::{parse_snapshot_json, snapshot_to_json};
pub use transfer::{CopySummary, KeyframeTransfer};
pub use value::{FrameTime, KeyValue};
