//! Route Paths
//!
//! Paths of every page, in the order the router checks them. The server
//! side route table answers navigations to the same paths.

pub const MAIN_MENU: &str = "/";
pub const METAL_CALCULATE: &str = "/calculate";
pub const UPLOAD_ITEMS: &str = "/upload-items";
pub const ITEM_LIST: &str = "/item-list";
pub const ITEM_DETAIL: &str = "/items/:id";
pub const LOGIN: &str = "/login";
pub const CSV_EDITOR: &str = "/csv";

/// Path of one item's detail page
pub fn item_detail(id: u64) -> String {
    ITEM_DETAIL.replace(":id", &id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_detail_path() {
        assert_eq!(item_detail(42), "/items/42");
    }
}
