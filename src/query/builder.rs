//! WHERE / ORDER BY / LIMIT construction.

use super::sanitize_identifier;
use crate::models::{PaginationInfo, SortDirection};

/// A positional SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Text value (search patterns).
    Text(String),
    /// Integer value (limit, offset).
    Integer(i64),
}

/// SQL text plus its positional parameters, in binding order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundQuery {
    /// SQL with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders.
    pub params: Vec<SqlParam>,
}

/// The search predicate for a grid query.
///
/// Empty `sql` means no filter; `params` then is empty too.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchClause {
    /// `WHERE ...` fragment, or empty.
    pub sql: String,
    /// One LIKE pattern per searchable column.
    pub params: Vec<String>,
}

impl SearchClause {
    /// Returns true when no filter applies.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Escapes SQL LIKE wildcards so they match literally.
///
/// `%`, `_` and the escape character `\` are prefixed with `\`; the
/// predicate must declare `ESCAPE '\'`.
///
/// # Examples
///
/// ```
/// use tablegrid::query::escape_like_wildcards;
///
/// assert_eq!(escape_like_wildcards("100%"), "100\\%");
/// assert_eq!(escape_like_wildcards("user_name"), "user\\_name");
/// ```
#[must_use]
pub fn escape_like_wildcards(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Builds an OR-combined LIKE filter over the searchable columns.
///
/// Returns an empty clause when `term` is empty or no column survives
/// sanitization. Otherwise every column gets one `LIKE ?` predicate and one
/// parameter, the term wrapped as `%term%` with its own wildcards escaped.
#[must_use]
pub fn build_search_clause<S: AsRef<str>>(searchable_columns: &[S], term: &str) -> SearchClause {
    if term.is_empty() {
        return SearchClause::default();
    }

    let pattern = format!("%{}%", escape_like_wildcards(term));
    let predicates: Vec<String> = searchable_columns
        .iter()
        .map(|col| sanitize_identifier(col.as_ref()))
        .filter(|col| !col.is_empty())
        .map(|col| format!("{col} LIKE ? ESCAPE '\\'"))
        .collect();

    if predicates.is_empty() {
        return SearchClause::default();
    }

    SearchClause {
        params: vec![pattern; predicates.len()],
        sql: format!("WHERE {}", predicates.join(" OR ")),
    }
}

/// Builds `ORDER BY <field> <ASC|DESC>` for a whitelisted field.
///
/// Returns an empty string unless `sort_field` is non-empty and an exact,
/// case-sensitive member of `sortable_fields`. Fields outside the
/// whitelist are ignored rather than rejected.
#[must_use]
pub fn build_order_clause<S: AsRef<str>>(
    sort_field: &str,
    sort_dir: &str,
    sortable_fields: &[S],
) -> String {
    if sort_field.is_empty() || !sortable_fields.iter().any(|f| f.as_ref() == sort_field) {
        return String::new();
    }

    let field = sanitize_identifier(sort_field);
    if field.is_empty() {
        return String::new();
    }

    format!("ORDER BY {field} {}", SortDirection::parse(sort_dir).as_str())
}

/// Builds the `COUNT(*)` query over the filtered table.
#[must_use]
pub fn build_count_query(table_name: &str, search: &SearchClause) -> BoundQuery {
    let table = sanitize_identifier(table_name);
    BoundQuery {
        sql: join_sql(&[format!("SELECT COUNT(*) FROM {table}").as_str(), search.sql.as_str()]),
        params: search.params.iter().cloned().map(SqlParam::Text).collect(),
    }
}

/// Builds the bounded page query.
///
/// Projects exactly `columns` (never `*`) and binds the search patterns
/// followed by the page size and offset.
#[must_use]
pub fn build_select_query<S: AsRef<str>>(
    table_name: &str,
    columns: &[S],
    search: &SearchClause,
    order: &str,
    pagination: &PaginationInfo,
) -> BoundQuery {
    let table = sanitize_identifier(table_name);
    let projection = columns
        .iter()
        .map(|col| sanitize_identifier(col.as_ref()))
        .filter(|col| !col.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let mut params: Vec<SqlParam> = search.params.iter().cloned().map(SqlParam::Text).collect();
    params.push(SqlParam::Integer(pagination.sql_limit()));
    params.push(SqlParam::Integer(pagination.sql_offset()));

    BoundQuery {
        sql: join_sql(&[
            format!("SELECT {projection} FROM {table}").as_str(),
            search.sql.as_str(),
            order,
            "LIMIT ? OFFSET ?",
        ]),
        params,
    }
}

fn join_sql(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_clause_empty_term() {
        let clause = build_search_clause(&["name", "email"], "");
        assert!(clause.is_empty());
        assert!(clause.params.is_empty());
    }

    #[test]
    fn test_search_clause_no_columns() {
        let columns: [&str; 0] = [];
        let clause = build_search_clause(&columns, "ann");
        assert!(clause.is_empty());
    }

    #[test]
    fn test_search_clause_or_joins_every_column() {
        let clause = build_search_clause(&["name", "email", "city"], "ann");
        assert_eq!(
            clause.sql,
            "WHERE name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\' OR city LIKE ? ESCAPE '\\'"
        );
        assert_eq!(clause.params, vec!["%ann%"; 3]);
    }

    #[test]
    fn test_search_clause_sanitizes_columns() {
        let clause = build_search_clause(&["na;me", "--"], "x");
        assert_eq!(clause.sql, "WHERE name LIKE ? ESCAPE '\\'");
        assert_eq!(clause.params.len(), 1);
    }

    #[test]
    fn test_search_term_is_never_interpolated() {
        let term = "' OR 1=1; --";
        let clause = build_search_clause(&["name"], term);
        assert!(!clause.sql.contains(term));
        assert_eq!(clause.params, vec!["%' OR 1=1; --%".to_string()]);
    }

    #[test]
    fn test_search_term_wildcards_are_escaped() {
        let clause = build_search_clause(&["name"], "50%_off\\");
        assert_eq!(clause.params, vec!["%50\\%\\_off\\\\%".to_string()]);
    }

    #[test]
    fn test_order_clause_whitelisted() {
        assert_eq!(
            build_order_clause("name", "DESC", &["id", "name"]),
            "ORDER BY name DESC"
        );
        assert_eq!(build_order_clause("id", "asc", &["id"]), "ORDER BY id ASC");
        assert_eq!(
            build_order_clause("id", "random", &["id"]),
            "ORDER BY id ASC"
        );
    }

    #[test]
    fn test_order_clause_rejects_unlisted_fields() {
        assert_eq!(build_order_clause("", "ASC", &["id"]), "");
        assert_eq!(build_order_clause("email", "ASC", &["id"]), "");
        assert_eq!(build_order_clause("ID", "ASC", &["id"]), "");
        assert_eq!(build_order_clause("id; DROP TABLE t", "ASC", &["id"]), "");
    }

    #[test]
    fn test_order_clause_sanitizes_whitelisted_field() {
        assert_eq!(
            build_order_clause("first-name", "DESC", &["first-name"]),
            "ORDER BY firstname DESC"
        );
        assert_eq!(build_order_clause("--", "DESC", &["--"]), "");
    }

    #[test]
    fn test_count_query_without_search() {
        let query = build_count_query("users", &SearchClause::default());
        assert_eq!(query.sql, "SELECT COUNT(*) FROM users");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_count_query_with_search() {
        let search = build_search_clause(&["name"], "ann");
        let query = build_count_query("users", &search);
        assert_eq!(
            query.sql,
            "SELECT COUNT(*) FROM users WHERE name LIKE ? ESCAPE '\\'"
        );
        assert_eq!(query.params, vec![SqlParam::Text("%ann%".to_string())]);
    }

    #[test]
    fn test_select_query_bare() {
        let pagination = PaginationInfo::calculate(0, 1, 10);
        let query = build_select_query(
            "users",
            &["id", "name"],
            &SearchClause::default(),
            "",
            &pagination,
        );
        assert_eq!(query.sql, "SELECT id, name FROM users LIMIT ? OFFSET ?");
        assert_eq!(
            query.params,
            vec![SqlParam::Integer(10), SqlParam::Integer(0)]
        );
    }

    #[test]
    fn test_select_query_binds_search_then_limit_offset() {
        let search = build_search_clause(&["name", "email"], "ann");
        let order = build_order_clause("name", "DESC", &["name"]);
        let pagination = PaginationInfo::calculate(23, 3, 10);
        let query = build_select_query("us`ers", &["id", "name", "email"], &search, &order, &pagination);

        assert_eq!(
            query.sql,
            "SELECT id, name, email FROM users WHERE name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\' ORDER BY name DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            query.params,
            vec![
                SqlParam::Text("%ann%".to_string()),
                SqlParam::Text("%ann%".to_string()),
                SqlParam::Integer(10),
                SqlParam::Integer(20),
            ]
        );
    }
}
