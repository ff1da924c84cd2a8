//! PostgREST query strings.
//!
//! Only the operations the presentation layer needs are modelled: equality and
//! membership filters, a single ordering column, and an offset window.

use std::fmt::Display;

use super::PageRange;

#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: &'static str,
    select: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    range: Option<PageRange>,
}

impl TableQuery {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            range: None,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn eq_opt<T: Display>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    pub fn in_list<I, T>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filters
            .push((column.to_string(), format!("in.({})", joined)));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.desc", column));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.asc", column));
        self
    }

    pub fn range(mut self, range: Option<PageRange>) -> Self {
        self.range = range;
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select.clone())];
        pairs.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(range) = self.range {
            pairs.push(("offset".to_string(), range.offset.max(0).to_string()));
            pairs.push(("limit".to_string(), range.limit.max(0).to_string()));
        }
        pairs
    }
}

/// Total from a `Content-Range` header such as `0-5/42` or `*/42`.
pub fn total_from_content_range(header: &str) -> Option<i64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn builds_paged_descending_select() {
        let query = TableQuery::table("jobs")
            .eq("status", "active")
            .order_desc("created_at")
            .range(Some(PageRange { offset: 6, limit: 6 }));

        assert_eq!(
            query.to_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("status".to_string(), "eq.active".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("offset".to_string(), "6".to_string()),
                ("limit".to_string(), "6".to_string()),
            ]
        );
    }

    #[test]
    fn membership_filter_joins_values() {
        let a = Uuid::nil();
        let query = TableQuery::table("applications").in_list("job_id", [a, a]);
        assert_eq!(
            query.to_pairs()[1],
            ("job_id".to_string(), format!("in.({},{})", a, a))
        );
    }

    #[test]
    fn optional_filters_are_skipped() {
        let query = TableQuery::table("jobs")
            .select("id")
            .eq_opt::<&str>("type", None)
            .eq_opt("is_remote", Some(true));
        assert_eq!(
            query.to_pairs(),
            vec![
                ("select".to_string(), "id".to_string()),
                ("is_remote".to_string(), "eq.true".to_string()),
            ]
        );
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(total_from_content_range("0-5/42"), Some(42));
        assert_eq!(total_from_content_range("*/0"), Some(0));
        assert_eq!(total_from_content_range("*/*"), None);
    }
}
