use super::types::Limits;

pub const DEFAULT_PAGE_SIZE: usize = 100;

pub fn effective_page_size(requested: Option<usize>, max_page_size: usize) -> Limits {
    let page_size = requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(max_page_size)
        .max(1);
    Limits { page_size }
}
