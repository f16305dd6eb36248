//! Ledger of stage model availability with per-node fallbacks.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use grove_core::{GrowthStage, SprintId};

use crate::NodeVisual;

/// Tracks which stage models loaded and what each node last showed.
///
/// A node whose stage model is missing keeps showing the last stage that
/// rendered for it, or a placeholder if none ever did. Failures never reach
/// the simulation.
#[derive(Clone, Debug, Default)]
pub struct StageAssets {
    loaded: BTreeSet<GrowthStage>,
    failed: BTreeMap<GrowthStage, String>,
    last_good: HashMap<SprintId, GrowthStage>,
}

impl StageAssets {
    /// Creates a ledger with no loaded stages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger where every stage model is available.
    #[must_use]
    pub fn all_loaded() -> Self {
        let mut assets = Self::new();
        for stage in GrowthStage::ALL {
            assets.record_loaded(stage);
        }
        assets
    }

    /// Marks a stage model as loaded, clearing an earlier failure.
    pub fn record_loaded(&mut self, stage: GrowthStage) {
        let _ = self.loaded.insert(stage);
        if self.failed.remove(&stage).is_some() {
            log::info!("stage {} model recovered", stage.get());
        }
    }

    /// Marks a stage model as failed.
    pub fn record_failure(&mut self, stage: GrowthStage, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("stage {} model unavailable: {reason}", stage.get());
        let _ = self.loaded.remove(&stage);
        let _ = self.failed.insert(stage, reason);
    }

    /// Reports whether the stage model is available.
    #[must_use]
    pub fn is_loaded(&self, stage: GrowthStage) -> bool {
        self.loaded.contains(&stage)
    }

    /// Failure reason recorded for a stage, if any.
    #[must_use]
    pub fn failure(&self, stage: GrowthStage) -> Option<&str> {
        self.failed.get(&stage).map(String::as_str)
    }

    /// Chooses the visual for a node at `stage`.
    pub fn resolve(&mut self, node: &SprintId, stage: GrowthStage) -> NodeVisual {
        if self.is_loaded(stage) {
            let _ = self.last_good.insert(node.clone(), stage);
            return NodeVisual::Stage(stage);
        }
        match self.last_good.get(node) {
            Some(previous) if self.is_loaded(*previous) => NodeVisual::Stage(*previous),
            _ => NodeVisual::Placeholder,
        }
    }

    /// Forgets nodes that are no longer drawn.
    pub fn retain_nodes<'a>(&mut self, live: impl IntoIterator<Item = &'a SprintId>) {
        let live: BTreeSet<&SprintId> = live.into_iter().collect();
        self.last_good.retain(|node, _| live.contains(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stage_keeps_last_good_visual() {
        let mut assets = StageAssets::new();
        assets.record_loaded(GrowthStage::Seedling);
        assets.record_failure(GrowthStage::Sapling, "file not found");
        let id = SprintId::new("S1");

        assert_eq!(
            assets.resolve(&id, GrowthStage::Seedling),
            NodeVisual::Stage(GrowthStage::Seedling)
        );
        assert_eq!(
            assets.resolve(&id, GrowthStage::Sapling),
            NodeVisual::Stage(GrowthStage::Seedling)
        );
        assert_eq!(assets.failure(GrowthStage::Sapling), Some("file not found"));
    }

    #[test]
    fn node_without_history_gets_placeholder() {
        let mut assets = StageAssets::new();
        assert_eq!(
            assets.resolve(&SprintId::new("S1"), GrowthStage::Mature),
            NodeVisual::Placeholder
        );
    }

    #[test]
    fn recovered_stage_is_used_again() {
        let mut assets = StageAssets::new();
        let id = SprintId::new("S1");
        assets.record_failure(GrowthStage::Young, "decode error");
        assert_eq!(assets.resolve(&id, GrowthStage::Young), NodeVisual::Placeholder);

        assets.record_loaded(GrowthStage::Young);

        assert_eq!(
            assets.resolve(&id, GrowthStage::Young),
            NodeVisual::Stage(GrowthStage::Young)
        );
        assert!(assets.failure(GrowthStage::Young).is_none());
    }

    #[test]
    fn retained_nodes_forget_removed_history() {
        let mut assets = StageAssets::all_loaded();
        let kept = SprintId::new("S1");
        let gone = SprintId::new("S2");
        let _ = assets.resolve(&kept, GrowthStage::Seedling);
        let _ = assets.resolve(&gone, GrowthStage::Seedling);

        assets.retain_nodes([&kept]);
        assets.record_failure(GrowthStage::Sapling, "lost");

        assert_eq!(
            assets.resolve(&kept, GrowthStage::Sapling),
            NodeVisual::Stage(GrowthStage::Seedling)
        );
        assert_eq!(assets.resolve(&gone, GrowthStage::Sapling), NodeVisual::Placeholder);
    }
}
