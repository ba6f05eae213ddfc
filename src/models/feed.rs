//! Feed item models.

use std::collections::BTreeMap;

/// An item to insert into an account's feed.
///
/// # Example
///
/// ```
/// use mondo_rs::models::FeedItem;
///
/// let item = FeedItem::basic("Saved £5 today", "https://example.com/piggy.png")
///     .url("https://example.com/savings")
///     .body("Nice one.")
///     .background_color("#FCF1EE");
/// assert_eq!(item.item_type, "basic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Feed item type; only `basic` is currently supported by the API
    pub item_type: String,
    /// URL opened when the item is tapped
    pub url: Option<String>,
    /// Type-specific parameters
    pub params: BTreeMap<String, String>,
}

impl FeedItem {
    /// A basic feed item with a title and an image.
    pub fn basic(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert("title".to_string(), title.into());
        params.insert("image_url".to_string(), image_url.into());
        Self {
            item_type: "basic".to_string(),
            url: None,
            params,
        }
    }

    /// Open `url` when the item is tapped.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the body text.
    pub fn body(self, body: impl Into<String>) -> Self {
        self.param("body", body)
    }

    /// Set the background color, e.g. `#FCF1EE`.
    pub fn background_color(self, color: impl Into<String>) -> Self {
        self.param("background_color", color)
    }

    /// Set the title color.
    pub fn title_color(self, color: impl Into<String>) -> Self {
        self.param("title_color", color)
    }

    /// Set the body color.
    pub fn body_color(self, color: impl Into<String>) -> Self {
        self.param("body_color", color)
    }

    /// Set an arbitrary parameter. Empty values are ignored.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.params.insert(key.into(), value);
        }
        self
    }
}
