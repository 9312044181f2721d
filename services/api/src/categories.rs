//! Category directory

use auth::SessionHandle;
use common::config::ClientConfig;
use common::error::{ClientError, ClientResult};
use common::http::BackendClient;
use tracing::{error, info};

use crate::models::Category;

/// Notice shown when the backend refuses the category listing
pub const FETCH_FAILED_NOTICE: &str = "Failed to fetch categories";

/// Icon shown for categories without a dedicated one
pub const DEFAULT_CATEGORY_ICON: &str = "📂";

/// Result of one listing attempt
///
/// A failed fetch yields no categories and the error to surface; nothing is
/// cached between attempts.
#[derive(Debug, Default)]
pub struct CategoryListing {
    pub categories: Vec<Category>,
    pub error: Option<ClientError>,
}

impl CategoryListing {
    /// Notice to show for a failed listing
    pub fn notice(&self) -> Option<String> {
        self.error.as_ref().map(|err| {
            if err.is_server_error() {
                FETCH_FAILED_NOTICE.to_string()
            } else {
                err.user_message()
            }
        })
    }
}

#[derive(Clone)]
pub struct CategoryDirectory {
    client: BackendClient,
    session: SessionHandle,
    path: String,
}

impl CategoryDirectory {
    pub fn new(client: BackendClient, session: SessionHandle, config: &ClientConfig) -> Self {
        Self {
            client,
            session,
            path: config.categories_path.clone(),
        }
    }

    /// Fetch the full listing and keep the published categories in rank order
    pub async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        let token = self.session.require_token().await?;

        let all: Vec<Category> = self
            .client
            .send_json(self.client.get(&self.path, Some(&token)))
            .await?;

        let total = all.len();
        let categories = published_in_rank_order(all);
        info!("Fetched {} categories ({} published)", total, categories.len());
        Ok(categories)
    }

    pub async fn list_categories(&self) -> CategoryListing {
        match self.fetch_categories().await {
            Ok(categories) => CategoryListing {
                categories,
                error: None,
            },
            Err(e) => {
                error!("Failed to fetch categories: {}", e);
                CategoryListing {
                    categories: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }
}

/// Published categories, ascending by rank; equal ranks keep server order
pub fn published_in_rank_order(categories: Vec<Category>) -> Vec<Category> {
    let mut published: Vec<Category> = categories.into_iter().filter(|c| c.published).collect();
    published.sort_by_key(|c| c.rank);
    published
}

pub fn category_icon(name: &str) -> &'static str {
    match name {
        "fables" => "📚",
        "events" => "🎉",
        "music" => "🎵",
        "places" => "🏛️",
        "food" => "🍽️",
        "people" => "👥",
        "literature" => "📖",
        "architecture" => "🏗️",
        "skills" => "⚡",
        "images" => "🖼️",
        "culture" => "🎭",
        "flora_&_fauna" => "🌿",
        "education" => "🎓",
        "vegetation" => "🌱",
        "folk_songs" => "🎶",
        "traditional_skills" => "🛠️",
        "local_cultural_history" => "🏛️",
        "local_history" => "📜",
        "food_agriculture" => "🌾",
        "old_newspapers" => "📰",
        "folk tales" => "📓",
        _ => DEFAULT_CATEGORY_ICON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(id: &str, rank: i64, published: bool) -> Category {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("cat-{}", id),
            "published": published,
            "rank": rank
        }))
        .unwrap()
    }

    #[test]
    fn test_published_in_rank_order_is_stable() {
        let ordered = published_in_rank_order(vec![
            category("a", 3, true),
            category("b", 1, true),
            category("c", 3, true),
            category("d", 0, false),
            category("e", 1, true),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "a", "c"]);
    }

    #[test]
    fn test_category_icon() {
        assert_eq!(category_icon("music"), "🎵");
        assert_eq!(category_icon("folk tales"), "📓");
        assert_eq!(category_icon("Music"), DEFAULT_CATEGORY_ICON);
        assert_eq!(category_icon(""), DEFAULT_CATEGORY_ICON);
    }

    #[test]
    fn test_listing_notice() {
        let refused = CategoryListing {
            categories: Vec::new(),
            error: Some(ClientError::UnknownServer { status: 503 }),
        };
        assert_eq!(refused.notice().as_deref(), Some(FETCH_FAILED_NOTICE));

        assert_eq!(CategoryListing::default().notice(), None);
    }
}
