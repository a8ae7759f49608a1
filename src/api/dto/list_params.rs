//! Ordering and pagination query parameters for entity listings.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{ListOrder, ListQuery, Page};

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Query string of `GET /api/{Project,Blog}`.
///
/// Uses `serde_with` to parse numbers from query strings. Without `page` the
/// whole listing is returned.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub order: Option<ListOrder>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl ListParams {
    /// Validates the parameters and converts them to a repository query.
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Page size must be between 1 and 100 (default 25)
    /// - `page_size` alone pages from the first page
    pub fn into_query(self) -> Result<ListQuery, String> {
        let order = self.order.unwrap_or_default();

        if self.page.is_none() && self.page_size.is_none() {
            return Ok(ListQuery { order, page: None });
        }

        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(format!("Page size must be between 1 and {MAX_PAGE_SIZE}"));
        }

        Ok(ListQuery {
            order,
            page: Some(Page {
                offset: (page as i64 - 1) * page_size as i64,
                limit: page_size as i64,
            }),
        })
    }
}
