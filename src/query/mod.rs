//! Injection-safe SQL construction for grid queries.
//!
//! Identifiers (table and column names) cannot be bound as parameters, so
//! they are only ever interpolated after passing through
//! [`sanitize_identifier`], and sort columns additionally through a
//! whitelist in [`build_order_clause`]. Values (search terms, limit,
//! offset) are always bound parameters.

mod builder;
mod sanitize;

pub use builder::{
    BoundQuery, SearchClause, SqlParam, build_count_query, build_order_clause,
    build_search_clause, build_select_query, escape_like_wildcards,
};
pub use sanitize::sanitize_identifier;
