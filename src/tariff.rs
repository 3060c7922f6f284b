use crate::table::Table;

/// Shown in place of the tariff when none could be read
pub const TARIFF_PLACEHOLDER: &str = "À confirmer (lecture CRE)";

const SURPLUS_MARKER: &str = "surplus";
const TARIFF_UNIT: &str = "c€/kWh";

/// First strictly positive surplus tariff in the table, formatted with its unit
///
/// Columns whose name contains "surplus" (any case) are tried in order. In
/// each, non-numeric cells are dropped and only the first remaining value is
/// considered; it qualifies if it is greater than zero.
pub fn pick_surplus_tariff(table: Option<&Table>) -> Option<String> {
    let table = table.filter(|t| !t.is_empty())?;

    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains(SURPLUS_MARKER))
        .find_map(|(index, name)| {
            let first = table.column(index).find_map(|cell| cell.as_number())?;
            tracing::debug!(column = %name, value = first, "Surplus column candidate");
            (first > 0.0).then(|| format_tariff(first))
        })
}

/// Round to two decimals, keeping at least one (`7.5`, `13.0`, `12.35`)
///
/// Exact ties round to even, so `6.125` gives `6.12`.
pub fn format_tariff(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0 {}", trimmed, TARIFF_UNIT)
    } else {
        format!("{} {}", trimmed, TARIFF_UNIT)
    }
}
