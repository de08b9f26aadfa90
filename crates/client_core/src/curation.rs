//! Filter, sort and paginate the fetched collection into the visible page.

use std::{fmt, num::NonZeroUsize, str::FromStr};

use shared::protocol::User;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Name,
    Age,
}

#[derive(Debug, Error)]
#[error("unknown sort key '{0}', expected one of: none, name, age")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortKey::None),
            "name" => Ok(SortKey::Name),
            "age" => Ok(SortKey::Age),
            _ => Err(UnknownSortKey(value.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::None => f.write_str("none"),
            SortKey::Name => f.write_str("name"),
            SortKey::Age => f.write_str("age"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_PAGE_SIZE - 1))
    }
}

/// Result of one derivation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedPage {
    pub users: Vec<User>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

pub fn filter_by_name<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|user| needle.is_empty() || user.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_users(users: &mut [&User], key: SortKey) {
    match key {
        SortKey::None => {}
        SortKey::Name => users.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Age => users.sort_by_key(|user| user.age),
    }
}

pub fn total_pages(filtered_count: usize, page_size: PageSize) -> usize {
    filtered_count.div_ceil(page_size.get())
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn page_slice<T>(items: &[T], page: usize, page_size: PageSize) -> &[T] {
    let size = page_size.get();
    let start = page.saturating_sub(1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

pub fn derive_view(
    users: &[User],
    search_term: &str,
    sort_key: SortKey,
    page: usize,
    page_size: PageSize,
) -> CuratedPage {
    let mut filtered = filter_by_name(users, search_term);
    sort_users(&mut filtered, sort_key);

    let total_pages = total_pages(filtered.len(), page_size);
    let current_page = clamp_page(page, total_pages);
    let visible = page_slice(&filtered, current_page, page_size)
        .iter()
        .map(|user| (*user).clone())
        .collect();

    CuratedPage {
        users: visible,
        filtered_count: filtered.len(),
        total_pages,
        current_page,
    }
}

#[cfg(test)]
#[path = "tests/curation_tests.rs"]
mod tests;
