//! Next/previous link handling.

use tracing::debug;
use url::Url;

/// Extracts the `page` query parameter from a pagination link.
///
/// Returns `None` when the link is not a valid URL or carries no usable page
/// number; callers treat that as "no further page".
#[must_use]
pub fn page_from_link(link: &str) -> Option<u32> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            debug!(link, error = %e, "unparsable pagination link");
            return None;
        }
    };

    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_first_in_query() {
        assert_eq!(
            page_from_link("https://rickandmortyapi.com/api/character?page=2"),
            Some(2)
        );
    }

    #[test]
    fn test_page_among_filters() {
        assert_eq!(
            page_from_link("https://rickandmortyapi.com/api/character?name=rick&page=7&status=alive"),
            Some(7)
        );
    }

    #[test]
    fn test_missing_or_invalid_page() {
        assert_eq!(page_from_link("https://rickandmortyapi.com/api/episode"), None);
        assert_eq!(page_from_link("https://rickandmortyapi.com/api/episode?page=abc"), None);
        assert_eq!(page_from_link("https://rickandmortyapi.com/api/episode?page=0"), None);
        assert_eq!(page_from_link("not a url"), None);
    }
}
