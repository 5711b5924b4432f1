//! Canonical property taxonomy.
//!
//! One table maps every subcategory to its main category and icon. The
//! display formatter and the icon resolver both read from it.

use crate::models::PropertyCategory;

/// Label used when a location carries no category at all
pub const DEFAULT_CATEGORY_LABEL: &str = "Studio";

/// Icon used when nothing in the table matches
pub const DEFAULT_ICON: &str = "map-pin";

/// Separator of composite "Main - Sub" category strings
pub const COMPOSITE_DELIMITER: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainCategory {
    pub name: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub main: &'static str,
    pub sub: &'static str,
    pub icon: &'static str,
}

pub static MAIN_CATEGORIES: &[MainCategory] = &[
    MainCategory { name: "Residential", icon: "home" },
    MainCategory { name: "Commercial", icon: "building" },
    MainCategory { name: "Studio", icon: "camera" },
    MainCategory { name: "Event Space", icon: "party-popper" },
    MainCategory { name: "Outdoor", icon: "trees" },
    MainCategory { name: "Industrial", icon: "factory" },
];

pub static TAXONOMY: &[TaxonomyEntry] = &[
    TaxonomyEntry { main: "Residential", sub: "House", icon: "home" },
    TaxonomyEntry { main: "Residential", sub: "Apartment", icon: "building-2" },
    TaxonomyEntry { main: "Residential", sub: "Loft", icon: "warehouse" },
    TaxonomyEntry { main: "Residential", sub: "Mansion", icon: "castle" },
    TaxonomyEntry { main: "Residential", sub: "Cabin", icon: "tent" },
    TaxonomyEntry { main: "Residential", sub: "Penthouse", icon: "building" },
    TaxonomyEntry { main: "Commercial", sub: "Warehouse", icon: "warehouse" },
    TaxonomyEntry { main: "Commercial", sub: "Office", icon: "briefcase" },
    TaxonomyEntry { main: "Commercial", sub: "Restaurant", icon: "utensils" },
    TaxonomyEntry { main: "Commercial", sub: "Bar", icon: "wine" },
    TaxonomyEntry { main: "Commercial", sub: "Retail Store", icon: "shopping-bag" },
    TaxonomyEntry { main: "Commercial", sub: "Gym", icon: "dumbbell" },
    TaxonomyEntry { main: "Studio", sub: "Photo Studio", icon: "camera" },
    TaxonomyEntry { main: "Studio", sub: "Film Studio", icon: "clapperboard" },
    TaxonomyEntry { main: "Studio", sub: "Sound Stage", icon: "film" },
    TaxonomyEntry { main: "Studio", sub: "Recording Studio", icon: "mic" },
    TaxonomyEntry { main: "Studio", sub: "Dance Studio", icon: "music" },
    TaxonomyEntry { main: "Studio", sub: "Podcast Studio", icon: "radio" },
    TaxonomyEntry { main: "Event Space", sub: "Ballroom", icon: "sparkles" },
    TaxonomyEntry { main: "Event Space", sub: "Rooftop", icon: "sun" },
    TaxonomyEntry { main: "Event Space", sub: "Gallery", icon: "image" },
    TaxonomyEntry { main: "Event Space", sub: "Banquet Hall", icon: "party-popper" },
    TaxonomyEntry { main: "Event Space", sub: "Conference Room", icon: "presentation" },
    TaxonomyEntry { main: "Outdoor", sub: "Garden", icon: "flower" },
    TaxonomyEntry { main: "Outdoor", sub: "Beach", icon: "waves" },
    TaxonomyEntry { main: "Outdoor", sub: "Farm", icon: "tractor" },
    TaxonomyEntry { main: "Outdoor", sub: "Ranch", icon: "fence" },
    TaxonomyEntry { main: "Outdoor", sub: "Park", icon: "trees" },
    TaxonomyEntry { main: "Industrial", sub: "Factory", icon: "factory" },
    TaxonomyEntry { main: "Industrial", sub: "Garage", icon: "car" },
    TaxonomyEntry { main: "Industrial", sub: "Parking Lot", icon: "square-parking" },
    TaxonomyEntry { main: "Industrial", sub: "Hangar", icon: "plane" },
];

impl TaxonomyEntry {
    pub fn slug(&self) -> String {
        slugify(self.sub)
    }

    pub fn to_category(&self) -> PropertyCategory {
        PropertyCategory {
            id: self.slug(),
            name: self.sub.to_string(),
            main_category: self.main.to_string(),
            subcategory: self.sub.to_string(),
            icon: self.icon.to_string(),
        }
    }
}

/// Lowercase, hyphen-separated form of a display name.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Find an entry by slug or by case-insensitive subcategory name.
pub fn lookup(key: &str) -> Option<&'static TaxonomyEntry> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let slug = slugify(key);
    TAXONOMY
        .iter()
        .find(|entry| entry.sub.eq_ignore_ascii_case(key) || entry.slug() == slug)
}

pub fn main_category(name: &str) -> Option<&'static MainCategory> {
    let name = name.trim();
    MAIN_CATEGORIES
        .iter()
        .find(|main| main.name.eq_ignore_ascii_case(name) || slugify(main.name) == slugify(name))
}

/// Every category of the taxonomy, in table order
pub fn categories() -> Vec<PropertyCategory> {
    TAXONOMY.iter().map(TaxonomyEntry::to_category).collect()
}

/// Subcategory names of one main category; empty for an unknown main category
pub fn subcategories(main: &str) -> Vec<&'static str> {
    match main_category(main) {
        Some(main) => TAXONOMY
            .iter()
            .filter(|entry| entry.main == main.name)
            .map(|entry| entry.sub)
            .collect(),
        None => Vec::new(),
    }
}

/// Split a composite "Main - Sub" string into its trimmed halves.
///
/// Segments after the sub part are ignored.
pub fn split_composite(value: &str) -> Option<(&str, &str)> {
    let (main, rest) = value.split_once(COMPOSITE_DELIMITER)?;
    let sub = rest.split(COMPOSITE_DELIMITER).next().unwrap_or_default();
    Some((main.trim(), sub.trim()))
}

/// Main category a stored property type belongs to, if it can be resolved
pub fn main_category_of(value: &str) -> Option<&'static str> {
    if let Some((main, sub)) = split_composite(value) {
        return main_category(main)
            .map(|main| main.name)
            .or_else(|| lookup(sub).map(|entry| entry.main));
    }
    lookup(value)
        .map(|entry| entry.main)
        .or_else(|| main_category(value).map(|main| main.name))
}

/// Human-readable label for a stored property type.
///
/// Composite strings yield their sub part (or the main part when the sub part
/// is empty). Known keys yield their table name, anything else is title-cased
/// word by word.
pub fn format_category_name(value: Option<&str>) -> String {
    let value = match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => return DEFAULT_CATEGORY_LABEL.to_string(),
    };

    if let Some((main, sub)) = split_composite(value) {
        let label = match (main, sub) {
            ("", "") => DEFAULT_CATEGORY_LABEL,
            (main, "") => main,
            (_, sub) => sub,
        };
        return label.to_string();
    }
    let value = value.trim();

    if let Some(entry) = lookup(value) {
        return entry.sub.to_string();
    }

    value
        .split('-')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Icon for a stored property type, falling back to [`DEFAULT_ICON`].
pub fn icon_for(value: Option<&str>) -> &'static str {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return DEFAULT_ICON;
    };

    if let Some((main, sub)) = split_composite(value) {
        return lookup(sub)
            .map(|entry| entry.icon)
            .or_else(|| main_category(main).map(|main| main.icon))
            .unwrap_or(DEFAULT_ICON);
    }

    lookup(value)
        .map(|entry| entry.icon)
        .or_else(|| main_category(value).map(|main| main.icon))
        .unwrap_or(DEFAULT_ICON)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_category_name_ok() {
        assert_eq!(format_category_name(Some("Commercial - Warehouse")), "Warehouse");
        assert_eq!(format_category_name(None), "Studio");
        assert_eq!(format_category_name(Some("")), "Studio");
        assert_eq!(format_category_name(Some("photo-studio")), "Photo Studio");
        assert_eq!(format_category_name(Some("rooftop-bar")), "Rooftop Bar");
    }

    #[test]
    fn format_category_name_empty_sub_falls_back_to_main() {
        assert_eq!(format_category_name(Some("Outdoor - ")), "Outdoor");
        assert_eq!(format_category_name(Some("Outdoor -")), "Outdoor");
    }

    #[test]
    fn format_category_name_degenerate_composites() {
        assert_eq!(format_category_name(Some(" - ")), DEFAULT_CATEGORY_LABEL);
        assert_eq!(format_category_name(Some("Studio - Photo Studio - Daylight")), "Photo Studio");
        assert_eq!(split_composite("A - B - C"), Some(("A", "B")));
    }

    #[test]
    fn icon_for_ok() {
        assert_eq!(icon_for(Some("Commercial - Warehouse")), "warehouse");
        assert_eq!(icon_for(Some("photo-studio")), "camera");
        assert_eq!(icon_for(Some("Outdoor")), "trees");
        assert_eq!(icon_for(Some("Outdoor - Volcano")), "trees");
        assert_eq!(icon_for(Some("spaceship")), DEFAULT_ICON);
        assert_eq!(icon_for(None), DEFAULT_ICON);
    }

    #[test]
    fn every_entry_has_a_known_main_category() {
        for entry in TAXONOMY {
            assert!(main_category(entry.main).is_some(), "{}", entry.main);
        }
    }

    #[test]
    fn subcategories_ok() {
        assert_eq!(
            subcategories("industrial"),
            vec!["Factory", "Garage", "Parking Lot", "Hangar"],
        );
        assert!(subcategories("Underwater").is_empty());
    }

    #[test]
    fn main_category_of_ok() {
        assert_eq!(main_category_of("Commercial - Warehouse"), Some("Commercial"));
        assert_eq!(main_category_of("sound-stage"), Some("Studio"));
        assert_eq!(main_category_of("Event Space"), Some("Event Space"));
        assert_eq!(main_category_of("unknown"), None);
    }

    #[test]
    fn categories_use_slug_ids() {
        let categories = categories();
        assert_eq!(categories.len(), TAXONOMY.len());
        assert!(categories.iter().any(|category| category.id == "retail-store"));
    }
}
