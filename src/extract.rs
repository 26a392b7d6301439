use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::models::ImageTag;

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("static selector is valid"));

/// First `<img>` in document order, if any. No ranking, no filtering.
pub fn locate_first_image(html: &str) -> Option<ImageTag> {
    let document = Html::parse_document(html);
    let img = document.select(&IMG_SELECTOR).next()?;
    let src = img.value().attr("src").map(|s| s.to_string());
    tracing::debug!(has_src = src.is_some(), "located first <img>");
    Some(ImageTag { src })
}
