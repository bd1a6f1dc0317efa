//! Grid wire types.
//!
//! These types are shared by the server endpoint and the client controller:
//! a [`GridRequest`] goes out as query-string parameters, a [`GridResponse`]
//! comes back as JSON, and both sides derive the same [`PaginationInfo`].

mod pagination;
mod request;
mod response;

pub use pagination::{MAX_PER_PAGE, MIN_PER_PAGE, PaginationInfo};
pub use request::{GridQueryParams, GridRequest, SortDirection};
pub use response::{GridResponse, Row};
