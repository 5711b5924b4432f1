//! Marker popup markup. Every interpolated field is escaped by `maud`.

use maud::{html, Markup, Render};

use crate::display::CardSummary;
use crate::models::Location;

pub struct InfoWindow<'a> {
    location: &'a Location,
}

impl<'a> InfoWindow<'a> {
    pub fn new(location: &'a Location) -> Self {
        Self { location }
    }
}

impl Render for InfoWindow<'_> {
    fn render(&self) -> Markup {
        let location = self.location;
        let summary = CardSummary::from(location);
        html! {
            div class="info-window" {
                @if let Some(image) = &summary.cover_image {
                    img class="info-window-image" src=(image) alt=(location.title);
                }
                div class="info-window-body" {
                    h3 class="info-window-title" { (location.title) }
                    p class="info-window-address" { (location.address) }
                    p class="info-window-meta" { (summary.category) " · " (summary.price_label) }
                    @if location.instant_booking {
                        span class="info-window-badge" { "Instant Book" }
                    }
                    a class="info-window-link" href=(format!("/locations/{}", location.id)) { "View details" }
                }
            }
        }
    }
}

pub fn render_info_window(location: &Location) -> String {
    InfoWindow::new(location).render().into_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use scraper::{Html, Selector};

    use super::*;

    fn location(title: &str) -> Location {
        Location {
            id: "loc-1\"><script>".to_string(),
            title: title.to_string(),
            address: "1 Main St, Los Angeles, CA".to_string(),
            price: 80.0,
            images: vec!["https://img.example/a.jpg\" onerror=\"alert(1)".to_string()],
            amenities: vec![],
            property_type: Some("Studio - Photo Studio".to_string()),
            instant_booking: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn title_is_rendered_as_text() {
        let html = render_info_window(&location("<script>alert(1)</script>"));
        assert!(!html.contains("<script>"));

        let fragment = Html::parse_fragment(&html);
        assert_eq!(fragment.select(&Selector::parse("script").unwrap()).count(), 0);

        let title = fragment
            .select(&Selector::parse("h3.info-window-title").unwrap())
            .next()
            .unwrap();
        assert_eq!(title.text().collect::<String>(), "<script>alert(1)</script>");
    }

    #[test]
    fn attributes_are_escaped() {
        let html = render_info_window(&location("Loft"));
        let fragment = Html::parse_fragment(&html);

        let image = fragment.select(&Selector::parse("img").unwrap()).next().unwrap();
        assert_eq!(image.value().attr("onerror"), None);
        assert_eq!(
            image.value().attr("src"),
            Some("https://img.example/a.jpg\" onerror=\"alert(1)"),
        );

        let link = fragment.select(&Selector::parse("a").unwrap()).next().unwrap();
        assert_eq!(link.value().attr("href"), Some("/locations/loc-1\"><script>"));
    }

    #[test]
    fn shows_card_fields() {
        let html = render_info_window(&location("Loft"));
        assert!(html.contains("Photo Studio · $80/hr"));
        assert!(html.contains("Instant Book"));
    }
}
