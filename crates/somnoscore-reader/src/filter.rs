use crate::errors::ReadError;
use crate::model::RawTable;

/// Filters rows by the string form of their first column. A row is kept
/// iff it matches the select set (or the set is empty) and is absent from
/// the ignore set. Runs once, before any column extraction, so column
/// indices downstream refer to the filtered table. Order preserved.
pub(crate) fn filter_rows(
    table: RawTable,
    ignore: &[String],
    select: &[String],
) -> Result<RawTable, ReadError> {
    if ignore.is_empty() && select.is_empty() {
        return Ok(table);
    }

    let mut kept = Vec::new();
    for (row_idx, row) in table.into_rows().into_iter().enumerate() {
        let key = match row.first() {
            Some(cell) => cell.as_key(row_idx, 1)?,
            None => String::new(),
        };
        let selected = select.is_empty() || select.iter().any(|entry| *entry == key);
        if selected && !ignore.iter().any(|entry| *entry == key) {
            kept.push(row);
        }
    }
    Ok(RawTable::new(kept))
}
