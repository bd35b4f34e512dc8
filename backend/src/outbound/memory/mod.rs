//! In-memory storage adapters.
//!
//! These implement the same repository ports as the Diesel adapters and
//! follow the same uniqueness, reference and all-or-nothing rules. The server
//! falls back to them when no database URL is configured.

mod book_repository;
mod order_repository;
mod store;
mod user_repository;

use pagination::{Page, PageRequest};

pub use book_repository::InMemoryBookRepository;
pub use order_repository::InMemoryOrderRepository;
pub use store::{InMemoryStore, StorePoisoned};
pub use user_repository::InMemoryUserRepository;

/// Slice `rows`, already in stable order, into the requested page.
fn page_of<T>(rows: Vec<T>, request: PageRequest) -> Page<T> {
    let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
    let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(request.page_size()).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(skip).take(take).collect();
    Page::new(items, total, request)
}
