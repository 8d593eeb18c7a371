//! Copy/paste façade: capture into the store, load from the store and apply.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::apply::{apply, ApplyOptions, ApplyReport};
use crate::capture::{capture, CaptureOptions};
use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::host::Scene;
use crate::store::{JsonFileStore, SnapshotStore};

/// What a copy put into the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CopySummary {
    pub nodes: Vec<String>,
    pub attributes: usize,
    pub keys: usize,
    /// First and last keyed frame, when any key was captured.
    pub keyframe_span: Option<(f64, f64)>,
}

/// Replace every occurrence of `search` in each name.
pub fn substitute_node_names(names: &[String], search: &str, replace: &str) -> Vec<String> {
    if search.is_empty() {
        return names.to_vec();
    }
    names.iter().map(|n| n.replace(search, replace)).collect()
}

/// Coordinates capture, persistence and apply for one clipboard document.
#[derive(Debug)]
pub struct KeyframeTransfer<St: SnapshotStore> {
    store: St,
    config: TransferConfig,
}

impl KeyframeTransfer<JsonFileStore> {
    /// File-backed transfer at `config.snapshot_path()`.
    pub fn from_config(config: TransferConfig) -> Self {
        let store = JsonFileStore::new(config.snapshot_path());
        Self::new(store, config)
    }
}

impl<St: SnapshotStore> KeyframeTransfer<St> {
    pub fn new(store: St, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TransferConfig {
        &mut self.config
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn into_store(self) -> St {
        self.store
    }

    /// Copy `nodes` (or the current selection) with the configured capture defaults.
    pub fn copy<H: Scene + ?Sized>(
        &mut self,
        scene: &mut H,
        nodes: Option<&[String]>,
    ) -> Result<CopySummary> {
        let opts = self.config.capture.to_options();
        self.copy_with(scene, nodes, &opts)
    }

    pub fn copy_with<H: Scene + ?Sized>(
        &mut self,
        scene: &mut H,
        nodes: Option<&[String]>,
        opts: &CaptureOptions,
    ) -> Result<CopySummary> {
        let selection;
        let nodes = match nodes {
            Some(nodes) => nodes,
            None => {
                selection = scene.current_selection();
                selection.as_slice()
            }
        };
        let snapshot = capture(scene, nodes, opts)?;
        self.store.save(&snapshot)?;

        let summary = CopySummary {
            nodes: snapshot.node_order.clone(),
            attributes: snapshot.attribute_count(),
            keys: snapshot.key_count(),
            keyframe_span: snapshot
                .global_keyframe_times
                .first()
                .zip(snapshot.global_keyframe_times.last())
                .map(|(a, b)| (*a, *b)),
        };
        info!("copied keyframes from {} node(s)", summary.nodes.len());
        Ok(summary)
    }

    /// Paste the stored snapshot with the configured paste defaults.
    ///
    /// Targets: `targets` when given and non-empty; otherwise the live
    /// selection when `use_selection` is on and something is selected;
    /// otherwise the stored node names, rewritten by the configured substitution.
    pub fn paste<H: Scene + ?Sized>(
        &self,
        scene: &mut H,
        targets: Option<&[String]>,
    ) -> Result<ApplyReport> {
        let opts = self.config.paste.to_options();
        self.paste_with(scene, targets, &opts)
    }

    pub fn paste_with<H: Scene + ?Sized>(
        &self,
        scene: &mut H,
        targets: Option<&[String]>,
        opts: &ApplyOptions,
    ) -> Result<ApplyReport> {
        let snapshot = self
            .store
            .load()?
            .ok_or(TransferError::NoSnapshotAvailable)?;

        let targets: Vec<String> = match targets.filter(|t| !t.is_empty()) {
            Some(explicit) => explicit.to_vec(),
            None => {
                let selection = if self.config.paste.use_selection {
                    scene.current_selection()
                } else {
                    Vec::new()
                };
                if selection.is_empty() {
                    match self.config.paste.substitution() {
                        Some((search, replace)) => {
                            debug!("paste: renaming stored nodes '{search}' -> '{replace}'");
                            substitute_node_names(&snapshot.node_order, search, replace)
                        }
                        None => snapshot.node_order.clone(),
                    }
                } else {
                    selection
                }
            }
        };
        if targets.is_empty() {
            return Err(TransferError::EmptyTargetSelection);
        }
        apply(scene, &snapshot, &targets, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_replaces_every_occurrence() {
        let names = vec!["rig:L_arm_L_ctrl".to_string(), "spine".to_string()];
        assert_eq!(
            substitute_node_names(&names, "L_", "R_"),
            vec!["rig:R_arm_R_ctrl".to_string(), "spine".to_string()]
        );
        assert_eq!(substitute_node_names(&names, "", "R_"), names);
    }
}
