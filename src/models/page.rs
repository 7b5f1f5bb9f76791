//! Paginated listing and recommendation views.

use serde::Serialize;

use super::Place;

/// Number of places per listing page
pub const PAGE_SIZE: usize = 10;

/// One page of the places listing
#[derive(Debug, Clone, Serialize)]
pub struct PlacesPage {
    pub name: String,
    pub total: u64,
    pub places: Vec<Place>,
    pub page: usize,
    pub last_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
}

impl PlacesPage {
    /// Build the page view for a 1-based `page` out of `total` documents.
    pub fn new(name: &str, places: Vec<Place>, total: u64, page: usize) -> Self {
        let last_page = last_page(total);

        Self {
            name: name.to_string(),
            total,
            places,
            page,
            last_page,
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < last_page).then(|| page + 1),
        }
    }
}

/// `ceil(total / PAGE_SIZE)`
pub fn last_page(total: u64) -> usize {
    total.div_ceil(PAGE_SIZE as u64) as usize
}

/// Store offset of the first item on a 1-based page, `None` on overflow
pub fn page_offset(page: usize) -> Option<usize> {
    page.saturating_sub(1).checked_mul(PAGE_SIZE)
}

/// Nearest-neighbour response body
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub places: Vec<Place>,
}

impl Recommendation {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            name: "Recommendation".to_string(),
            places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_25() {
        let page = PlacesPage::new("Places", Vec::new(), 25, 1);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.prev_page, None);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page_offset(1), Some(0));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = PlacesPage::new("Places", Vec::new(), 25, 3);
        assert_eq!(page.prev_page, Some(2));
        assert_eq!(page.next_page, None);
        assert_eq!(page_offset(3), Some(20));
    }

    #[test]
    fn test_huge_page_offset_overflows_to_none() {
        assert_eq!(page_offset(usize::MAX), None);

        let page = PlacesPage::new("Places", Vec::new(), 25, usize::MAX);
        assert_eq!(page.prev_page, Some(usize::MAX - 1));
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_empty_index() {
        let page = PlacesPage::new("Places", Vec::new(), 0, 1);
        assert_eq!(page.last_page, 0);
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, None);
    }

    #[test]
    fn test_last_page_matches_ceil_division() {
        for total in 0..200u64 {
            let expected = ((total as f64) / PAGE_SIZE as f64).ceil() as usize;
            assert_eq!(last_page(total), expected, "total = {}", total);

            for page in 1..=expected.max(1) {
                let view = PlacesPage::new("Places", Vec::new(), total, page);
                assert_eq!(view.next_page.is_none(), page >= expected);
            }
        }
    }

    #[test]
    fn test_absent_links_are_not_serialized() {
        let value = serde_json::to_value(PlacesPage::new("Places", Vec::new(), 5, 1)).unwrap();
        assert!(value.get("prev_page").is_none());
        assert!(value.get("next_page").is_none());
        assert_eq!(value["last_page"], 1);
    }

    #[test]
    fn test_recommendation_name() {
        let rec = Recommendation::new(Vec::new());
        let value = serde_json::to_value(rec).unwrap();
        assert_eq!(value["name"], "Recommendation");
        assert!(value["places"].as_array().unwrap().is_empty());
    }
}
