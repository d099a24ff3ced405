use crate::hierarchy::HierarchyPath;
use crate::selection::HierarchySelection;
use opg_model::{FactRow, FactTable, HierarchyLevels, MAX_DEPTH};

/// Select the materialized roll-up rows for `selection`.
///
/// Rows are copied out in input order; the source table is never modified. A selection with no
/// level, or one that points past [`MAX_DEPTH`], yields an empty table.
pub fn filter_hierarchy(table: &FactTable, selection: &HierarchySelection) -> FactTable {
    let out = table.filter(|row| selects_rollup(selection, &row.hierarchy));
    log::debug!(
        "hierarchy filter {selection:?} kept {} of {} rows",
        out.row_count(),
        table.row_count()
    );
    out
}

/// Whether `levels` is exactly the roll-up row selected by `selection`.
pub fn selects_rollup(selection: &HierarchySelection, levels: &HierarchyLevels) -> bool {
    match selection {
        HierarchySelection::LevelFilter { level: None } => false,
        HierarchySelection::LevelFilter { level: Some(level) } => {
            *level < MAX_DEPTH && levels.is_rollup_at(*level)
        }
        HierarchySelection::SpecificItem {
            path,
            include_children: false,
        } => levels.starts_with(path.segments()) && levels.depth() == path.depth(),
        HierarchySelection::SpecificItem {
            path,
            include_children: true,
        } => {
            path.depth() < MAX_DEPTH
                && levels.starts_with(path.segments())
                && levels.is_rollup_at(path.depth())
        }
    }
}

/// Rows under `selection` at any depth, paired with the node they roll up into.
///
/// Used when a dataset stores unaggregated events: the target of a row is the selected level's
/// prefix of its path (level filter), the selected node itself (exact item), or the selected
/// node's child on the row's path (children). Rows that cannot reach a target are skipped.
pub fn candidate_rows<'a>(
    table: &'a FactTable,
    selection: &HierarchySelection,
) -> Vec<(HierarchyPath, &'a FactRow)> {
    let target_depth = match selection {
        HierarchySelection::LevelFilter { level: None } => return Vec::new(),
        HierarchySelection::LevelFilter { level: Some(level) } if *level < MAX_DEPTH => level + 1,
        HierarchySelection::LevelFilter { level: Some(_) } => return Vec::new(),
        HierarchySelection::SpecificItem {
            path,
            include_children: false,
        } => {
            if path.is_root() {
                return Vec::new();
            }
            path.depth()
        }
        HierarchySelection::SpecificItem {
            path,
            include_children: true,
        } => {
            if path.depth() >= MAX_DEPTH {
                return Vec::new();
            }
            path.depth() + 1
        }
    };
    let prefix: &[String] = selection.path().map(HierarchyPath::segments).unwrap_or(&[]);
    let candidates: Vec<_> = table
        .iter()
        .filter(|row| row.hierarchy.depth() >= target_depth && row.hierarchy.starts_with(prefix))
        .map(|row| {
            let target = HierarchyPath::from_levels(&row.hierarchy.truncated(target_depth));
            (target, row)
        })
        .collect();
    log::debug!(
        "{} candidate rows for {selection:?} at depth {target_depth}",
        candidates.len()
    );
    candidates
}
