//! Transfer configuration: document location and copy/paste defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::apply::ApplyOptions;
use crate::capture::CaptureOptions;
use crate::error::Result;
use crate::range::RangeSelector;

pub const DEFAULT_SNAPSHOT_DIR: &str = "keyframe_transfer_user_data";
pub const DEFAULT_SNAPSHOT_NAME: &str = "copied_keyframes";

/// Configuration consumed by [`crate::KeyframeTransfer`].
/// Every field has a default, so partial documents are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferConfig {
    pub snapshot_dir: PathBuf,
    /// File stem; the document is `<snapshot_dir>/<snapshot_name>.json`.
    pub snapshot_name: String,
    pub capture: CaptureDefaults,
    pub paste: PasteDefaults,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            snapshot_name: DEFAULT_SNAPSHOT_NAME.to_string(),
            capture: CaptureDefaults::default(),
            paste: PasteDefaults::default(),
        }
    }
}

impl TransferConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_dir.join(format!("{}.json", self.snapshot_name))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureDefaults {
    pub all_keyframes: bool,
    pub range_selector: RangeSelector,
    pub frequency: u32,
    pub attribute_filter: Option<Vec<String>>,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            all_keyframes: false,
            range_selector: RangeSelector::SelectedKeyRange,
            frequency: 1,
            attribute_filter: None,
        }
    }
}

impl CaptureDefaults {
    pub fn to_options(&self) -> CaptureOptions {
        CaptureOptions {
            attribute_filter: self.attribute_filter.clone(),
            range_selector: self.range_selector,
            all_keyframes: self.all_keyframes,
            frequency: self.frequency,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PasteDefaults {
    /// Paste onto the live selection instead of the stored node names.
    pub use_selection: bool,
    pub use_current_time: bool,
    pub reverse: bool,
    /// Accepted, currently without effect.
    pub replace: bool,
    /// Rewrite stored node names before pasting onto them.
    pub search_replace: bool,
    pub search_string: String,
    pub replace_string: String,
}

impl Default for PasteDefaults {
    fn default() -> Self {
        Self {
            use_selection: true,
            use_current_time: true,
            reverse: false,
            replace: false,
            search_replace: false,
            search_string: String::new(),
            replace_string: String::new(),
        }
    }
}

impl PasteDefaults {
    pub fn to_options(&self) -> ApplyOptions {
        ApplyOptions {
            use_current_time: self.use_current_time,
            payload_reversal: self.reverse,
            replace: self.replace,
        }
    }

    /// Substitution applied to stored node names, when enabled and non-empty.
    pub fn substitution(&self) -> Option<(&str, &str)> {
        (self.search_replace && !self.search_string.is_empty())
            .then(|| (self.search_string.as_str(), self.replace_string.as_str()))
    }
}
