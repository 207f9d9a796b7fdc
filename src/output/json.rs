use anyhow::Result;
use serde::Serialize;

/// Render any serializable value as pretty JSON.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grid::ResultGrid;
    use crate::search::SearchOutput;

    #[test]
    fn empty_search_output_shape() {
        let grid = ResultGrid::new(Vec::new(), 25);
        let page = grid.page(1);
        let out = SearchOutput {
            explanation: "where sent between '2020-03-19' and '2020-03-20'",
            total: page.total,
            page: page.page,
            page_count: page.page_count,
            emails: page.rows,
        };
        let v: serde_json::Value = serde_json::from_str(&render_json(&out).unwrap()).unwrap();
        assert_eq!(v["total"], 0);
        assert_eq!(v["page_count"], 1);
        assert_eq!(v["emails"], serde_json::json!([]));
    }
}
