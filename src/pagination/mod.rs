//! Pagination module
//!
//! Supports: Skip (metadata offsets), continuation tokens, single responses
//!
//! # Overview
//!
//! Each paged operation declares a [`Pagination`] descriptor. A strategy
//! built from it reads the cursor out of each response and says how to
//! merge it into the next request, either into the query string or into
//! the JSON body. Fetching the pages is left to the client.

mod strategies;
mod types;

pub use strategies::{NoPaginator, SkipPaginator, TokenPaginator};
pub use types::{records_count, NextPage, Pagination, PaginationState, Paginator, SkipTarget};
