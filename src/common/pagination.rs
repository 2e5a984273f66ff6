// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::common::error::AppError;

/// Itens por página nas listagens de pessoas e pets.
pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Página pedida, começando em 1
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Valida o número da página contra o total e devolve o OFFSET.
///
/// A página 1 sempre existe, mesmo com a lista vazia.
pub fn offset_for(page: Option<i64>, total: i64) -> Result<(i64, i64), AppError> {
    let page = page.unwrap_or(1);
    let total_pages = total_pages(total);

    if page < 1 || page > total_pages {
        return Err(AppError::PageNotFound);
    }

    Ok((page, (page - 1) * PAGE_SIZE))
}

pub fn total_pages(total: i64) -> i64 {
    ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, total: i64) -> Self {
        Self {
            items,
            page,
            per_page: PAGE_SIZE,
            total,
            total_pages: total_pages(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_empty_list_exists() {
        assert_eq!(offset_for(None, 0).unwrap(), (1, 0));
    }

    #[test]
    fn offsets_follow_page_size() {
        assert_eq!(offset_for(Some(2), 30).unwrap(), (2, 12));
        assert_eq!(offset_for(Some(3), 30).unwrap(), (3, 24));
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        assert!(matches!(offset_for(Some(3), 24), Err(AppError::PageNotFound)));
        assert!(matches!(offset_for(Some(0), 5), Err(AppError::PageNotFound)));
        assert!(matches!(offset_for(Some(-1), 5), Err(AppError::PageNotFound)));
    }

    #[test]
    fn page_metadata() {
        let page = Page::new(vec![1, 2, 3], 2, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.per_page, 12);
    }
}
