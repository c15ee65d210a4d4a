use crate::db::document::Document;
use serde::Serialize;

///
/// PageLinks
///
/// 1-based page numbers for the JSON:API pagination links.
/// `last` is only known when the total count was computed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct PageLinks {
    pub first: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub last: Option<u32>,
}

impl PageLinks {
    /// Compute links for page `number` of size `size`.
    ///
    /// Without a total, `next` is offered whenever the current page came back
    /// full. An unpaged result is a single page.
    #[must_use]
    pub fn new(number: u32, size: Option<u32>, total: Option<u64>, returned: usize) -> Self {
        let number = number.max(1);
        let Some(size) = size.filter(|size| *size > 0) else {
            return Self {
                first: 1,
                prev: None,
                next: None,
                last: Some(1),
            };
        };

        let last = total.map(|total| last_page(total, size));
        let next = match last {
            Some(last) => (number < last).then(|| number + 1),
            None => (returned >= size as usize).then(|| number.saturating_add(1)),
        };

        Self {
            first: 1,
            prev: (number > 1).then(|| number - 1),
            next,
            last,
        }
    }
}

fn last_page(total: u64, size: u32) -> u32 {
    let pages = total.div_ceil(u64::from(size)).max(1);

    u32::try_from(pages).unwrap_or(u32::MAX)
}

///
/// Page
///
/// One page of `find_all` results plus the metadata a JSON:API serializer
/// needs for `meta.total` and the pagination links.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub documents: Vec<Document>,
    pub number: u32,
    pub size: Option<u32>,
    pub total_count: Option<u64>,
    pub links: PageLinks,
}

impl Page {
    #[must_use]
    pub fn new(
        documents: Vec<Document>,
        number: u32,
        size: Option<u32>,
        total: Option<u64>,
    ) -> Self {
        let links = PageLinks::new(number, size, total, documents.len());

        Self {
            documents,
            number: number.max(1),
            size,
            total_count: total,
            links,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_of_two_single_pages() {
        let links = PageLinks::new(2, Some(1), Some(2), 1);

        assert_eq!(
            links,
            PageLinks {
                first: 1,
                prev: Some(1),
                next: None,
                last: Some(2),
            }
        );
    }

    #[test]
    fn partial_last_page_rounds_up() {
        let links = PageLinks::new(1, Some(10), Some(21), 10);

        assert_eq!(links.last, Some(3));
        assert_eq!(links.next, Some(2));
        assert_eq!(links.prev, None);
    }

    #[test]
    fn empty_result_has_one_page() {
        let links = PageLinks::new(1, Some(10), Some(0), 0);

        assert_eq!(links.last, Some(1));
        assert_eq!(links.next, None);
    }

    #[test]
    fn unknown_total_guesses_next_from_full_page() {
        assert_eq!(PageLinks::new(3, Some(5), None, 5).next, Some(4));
        assert_eq!(PageLinks::new(3, Some(5), None, 4).next, None);
        assert_eq!(PageLinks::new(3, Some(5), None, 4).last, None);
    }

    #[test]
    fn unpaged_result_is_single_page() {
        let page = Page::new(vec![Document::new(), Document::new()], 1, None, Some(2));

        assert_eq!(page.len(), 2);
        assert_eq!(page.links.last, Some(1));
        assert_eq!(page.links.next, None);
    }
}
