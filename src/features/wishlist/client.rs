use crate::api::{path_id, ApiClient, ApiError};
use crate::features::wishlist::types::WishlistItem;

const WISHLIST_PATH: &str = "/api/wishlist";

pub async fn fetch_wishlist(api: &ApiClient) -> Result<Vec<WishlistItem>, ApiError> {
    api.get_json(WISHLIST_PATH).await
}

pub async fn add(api: &ApiClient, course_id: &str) -> Result<(), ApiError> {
    let course_id = path_id(course_id, "Course")?;
    api.post_empty(&format!("{WISHLIST_PATH}/{course_id}")).await
}

pub async fn remove(api: &ApiClient, course_id: &str) -> Result<(), ApiError> {
    let course_id = path_id(course_id, "Course")?;
    api.delete(&format!("{WISHLIST_PATH}/{course_id}")).await
}
