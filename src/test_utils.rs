//! Shared proptest strategies for unit tests.

use proptest::prelude::*;

/// Distinct, valid column names in a stable order.
pub(crate) fn arb_columns() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,8}", 1..6)
        .prop_filter("ascribee is appended by enrichment", |set| !set.contains("ascribee"))
        .prop_map(|set| set.into_iter().collect())
}

/// Rows of `width` non-empty cells, some holding separators or quotes.
pub(crate) fn arb_rows(width: usize) -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[A-Za-z0-9._\",-][A-Za-z0-9 ._\",-]{0,9}", width),
        0..8,
    )
}

/// Tenant labels as the identity provider issues them.
pub(crate) fn arb_tenant_label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,30}"
}

/// Renders a header and rows as `\n` terminated CSV, quoting cells that
/// hold a separator or a quote.
pub(crate) fn csv_text(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut text = csv_line(columns);
    text.push('\n');
    for row in rows {
        text.push_str(&csv_line(row));
        text.push('\n');
    }
    text
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| {
            if cell.contains(|c: char| matches!(c, ',' | '"')) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
