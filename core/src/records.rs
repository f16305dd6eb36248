//! Raw sprint board records and the reports aggregated from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{SprintId, SprintSummary};

/// Title of the board column whose tickets count as closed.
pub const CLOSE_COLUMN: &str = "Close";

/// Member name used for tickets without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// Single ticket on a sprint board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketRecord {
    /// Creation day in `YYYY-MM-DD` form; tickets without one are left out of
    /// the ticket series.
    pub created_on: Option<String>,
    /// Day the ticket was closed, if it was.
    pub closed_on: Option<String>,
    /// Member the ticket is assigned to.
    pub assignee: Option<String>,
}

/// Board column grouping tickets under a title such as `Open` or `Close`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskColumn {
    /// Column title.
    pub title: String,
    /// Tickets currently in the column.
    pub tickets: Vec<TicketRecord>,
}

/// Raw board contents of one sprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintRecord {
    /// Identifier of the sprint.
    pub id: SprintId,
    /// Display name; the id is shown when absent or empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Board columns of the sprint.
    #[serde(default)]
    pub columns: Vec<TaskColumn>,
}

/// Ticket counts attributed to one member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    /// Tickets assigned to the member.
    pub received: u32,
    /// Assigned tickets carrying a close date.
    pub closed: u32,
}

/// Aggregated view of one sprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintReport {
    /// Summary handed to the growth registry.
    pub summary: SprintSummary,
    /// Total number of tickets on the board.
    pub total_tickets: u32,
    /// Tickets sitting in the close column.
    pub closed_tickets: u32,
    /// Per-member statistics keyed by member name.
    pub member_stats: BTreeMap<String, MemberStats>,
}
