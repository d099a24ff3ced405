use crate::selection::VariableSelection;
use opg_model::FactTable;

/// Keep rows of the selected measure type whose variable is selected.
///
/// The output is the concatenation of one subset per selected variable, in the selection's
/// sorted order; within a subset rows keep their input order. An empty variable set selects
/// nothing.
pub fn filter_measures(table: &FactTable, selection: &VariableSelection) -> FactTable {
    let mut out = FactTable::new();
    for variable in &selection.variables {
        out.extend(
            table
                .iter()
                .filter(|row| {
                    row.measure_type == selection.measure_type && row.variable_name == *variable
                })
                .cloned(),
        );
    }
    out
}
