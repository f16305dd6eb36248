//! Arena of growth nodes keyed by sprint id.

use std::collections::{HashMap, HashSet};

use grove_core::{
    Event, GrowthStage, MotionState, NodeSnapshot, SlotPosition, SprintId, SprintSummary,
};

#[derive(Clone, Debug)]
pub(crate) struct GrowthNode {
    pub(crate) id: SprintId,
    pub(crate) slot: SlotPosition,
    pub(crate) stage: GrowthStage,
    pub(crate) state: MotionState,
    pub(crate) summary: SprintSummary,
    pub(crate) pending_removal: bool,
    sequence: u64,
}

impl GrowthNode {
    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id.clone(),
            slot: self.slot,
            stage: self.stage,
            state: self.state,
            pending_removal: self.pending_removal,
        }
    }
}

/// Outcome of a sync that the world needs beyond the emitted events.
#[derive(Debug, Default)]
pub(crate) struct SyncOutcome {
    pub(crate) removed: Vec<SprintId>,
    pub(crate) refreshed: Vec<SprintId>,
}

/// Dense node storage with recycled entries and an id index.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Vec<Option<GrowthNode>>,
    free: Vec<usize>,
    index: HashMap<SprintId, usize>,
    next_sequence: u64,
}

impl Registry {
    pub(crate) fn get(&self, id: &SprintId) -> Option<&GrowthNode> {
        let entry = *self.index.get(id)?;
        self.entries.get(entry)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: &SprintId) -> Option<&mut GrowthNode> {
        let entry = *self.index.get(id)?;
        self.entries.get_mut(entry)?.as_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Snapshots of every live node in planting order.
    pub(crate) fn snapshots(&self) -> Vec<NodeSnapshot> {
        let mut nodes: Vec<&GrowthNode> = self.entries.iter().flatten().collect();
        nodes.sort_by_key(|node| node.sequence);
        nodes.into_iter().map(GrowthNode::snapshot).collect()
    }

    /// Diffs the registry against a full summary list.
    ///
    /// New ids are planted at `palette[index % palette.len()]` where `index`
    /// is the summary's position in the list. Ids missing from the list are
    /// removed when idle and flagged for deferred removal otherwise.
    pub(crate) fn sync(
        &mut self,
        summaries: &[SprintSummary],
        palette: &[SlotPosition],
        baseline: f32,
        out_events: &mut Vec<Event>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let mut seen: HashSet<SprintId> = HashSet::with_capacity(summaries.len());

        for (index, summary) in summaries.iter().enumerate() {
            if !seen.insert(summary.id.clone()) {
                log::warn!("ignoring duplicate summary for sprint {}", summary.id);
                continue;
            }

            if let Some(node) = self.get_mut(&summary.id) {
                refresh_node(node, summary, &mut outcome, out_events);
                continue;
            }

            let Some(slot) = palette.get(index % palette.len().max(1)).copied() else {
                continue;
            };
            self.plant(summary, slot, baseline, out_events);
        }

        let missing: Vec<SprintId> = self
            .entries
            .iter()
            .flatten()
            .filter(|node| !node.pending_removal && !seen.contains(&node.id))
            .map(|node| node.id.clone())
            .collect();

        for id in missing {
            let idle = self
                .get(&id)
                .is_some_and(|node| node.state.motion.is_idle());
            if idle {
                self.remove(&id);
                out_events.push(Event::NodeRemoved { node: id.clone() });
                outcome.removed.push(id);
            } else if let Some(node) = self.get_mut(&id) {
                node.pending_removal = true;
                log::debug!("deferring removal of sprint {id} until its animation settles");
                out_events.push(Event::NodeRemovalDeferred { node: id });
            }
        }

        outcome
    }

    /// Removes the node if its summary vanished and it came to rest.
    pub(crate) fn reap_if_settled(&mut self, id: &SprintId) -> bool {
        let settled = self
            .get(id)
            .is_some_and(|node| node.pending_removal && node.state.motion.is_idle());
        if settled {
            self.remove(id);
        }
        settled
    }

    fn plant(
        &mut self,
        summary: &SprintSummary,
        slot: SlotPosition,
        baseline: f32,
        out_events: &mut Vec<Event>,
    ) {
        let stage = summary.stage();
        let node = GrowthNode {
            id: summary.id.clone(),
            slot,
            stage,
            state: MotionState::resting_at(baseline),
            summary: summary.clone(),
            pending_removal: false,
            sequence: self.next_sequence,
        };
        self.next_sequence = self.next_sequence.saturating_add(1);

        let entry = match self.free.pop() {
            Some(entry) => {
                self.entries[entry] = Some(node);
                entry
            }
            None => {
                self.entries.push(Some(node));
                self.entries.len() - 1
            }
        };
        let _ = self.index.insert(summary.id.clone(), entry);

        log::debug!(
            "planted sprint {} at ({}, {}) with stage {}",
            summary.id,
            slot.x,
            slot.z,
            stage.get()
        );
        out_events.push(Event::NodePlanted {
            node: summary.id.clone(),
            slot,
            stage,
        });
    }

    fn remove(&mut self, id: &SprintId) {
        if let Some(entry) = self.index.remove(id) {
            if let Some(slot) = self.entries.get_mut(entry) {
                *slot = None;
                self.free.push(entry);
            }
            log::debug!("removed sprint {id}");
        }
    }
}

fn refresh_node(
    node: &mut GrowthNode,
    summary: &SprintSummary,
    outcome: &mut SyncOutcome,
    out_events: &mut Vec<Event>,
) {
    if node.pending_removal {
        node.pending_removal = false;
        out_events.push(Event::NodeRestored {
            node: node.id.clone(),
        });
    }

    let stage = summary.stage();
    if stage != node.stage {
        out_events.push(Event::NodeStageChanged {
            node: node.id.clone(),
            from: node.stage,
            to: stage,
        });
        node.stage = stage;
    }

    if node.summary != *summary {
        node.summary = summary.clone();
        outcome.refreshed.push(node.id.clone());
        out_events.push(Event::NodeSummaryRefreshed {
            node: node.id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{Motion, DEFAULT_SLOT_PALETTE};

    fn sync(registry: &mut Registry, summaries: &[SprintSummary]) -> (SyncOutcome, Vec<Event>) {
        let mut events = Vec::new();
        let outcome = registry.sync(summaries, &DEFAULT_SLOT_PALETTE, 0.2, &mut events);
        (outcome, events)
    }

    #[test]
    fn removed_entries_are_recycled() {
        let mut registry = Registry::default();
        let _ = sync(
            &mut registry,
            &[
                SprintSummary::new("A", "A", 0.0),
                SprintSummary::new("B", "B", 0.0),
            ],
        );
        let _ = sync(&mut registry, &[SprintSummary::new("B", "B", 0.0)]);
        let _ = sync(
            &mut registry,
            &[
                SprintSummary::new("B", "B", 0.0),
                SprintSummary::new("C", "C", 0.0),
            ],
        );

        assert_eq!(registry.entries.len(), 2, "entry of A is reused by C");
        let order: Vec<_> = registry
            .snapshots()
            .into_iter()
            .map(|snapshot| snapshot.id)
            .collect();
        assert_eq!(order, vec![SprintId::new("B"), SprintId::new("C")]);
    }

    #[test]
    fn duplicate_ids_keep_first_summary() {
        let mut registry = Registry::default();
        let (_, events) = sync(
            &mut registry,
            &[
                SprintSummary::new("A", "first", 10.0),
                SprintSummary::new("A", "second", 90.0),
            ],
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(events.len(), 1);
        let node = registry.get(&SprintId::new("A")).expect("planted");
        assert_eq!(node.summary.name, "first");
    }

    #[test]
    fn moving_node_is_reaped_only_once_idle() {
        let mut registry = Registry::default();
        let id = SprintId::new("A");
        let _ = sync(&mut registry, &[SprintSummary::new("A", "A", 0.0)]);
        registry.get_mut(&id).expect("planted").state.motion = Motion::Falling;

        let (outcome, _) = sync(&mut registry, &[]);
        assert!(outcome.removed.is_empty());
        assert!(!registry.reap_if_settled(&id));

        registry.get_mut(&id).expect("still present").state.motion = Motion::Idle;
        assert!(registry.reap_if_settled(&id));
        assert!(registry.get(&id).is_none());
    }
}
