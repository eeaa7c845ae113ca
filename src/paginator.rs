//! Issue window and page-link strip for paginated reports.

use serde_json::Value;

use crate::error::Result;
use crate::template::{extend_context, RenderContext, Template, TemplateRenderer};

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_CURRENT_PAGE: usize = 1;
pub const DEFAULT_NUM_PAGES: usize = 10;
/// Upper bounds applied to caller-supplied pagination values.
pub const MAX_PAGE_SIZE: usize = 500;
pub const MAX_CURRENT_PAGE: usize = 100_000;
pub const MAX_NUM_PAGES: usize = 100;
/// Request parameter carrying the 1-based page index.
pub const PAGINATION_PARAM: &str = "ytPage";

const CURRENT_STYLE: &str = "font-weight:bold;";
const OTHER_STYLE: &str = "font-weight:normal;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
}

impl PageLink {
    pub fn style(&self) -> &'static str {
        if self.current {
            CURRENT_STYLE
        } else {
            OTHER_STYLE
        }
    }
}

/// `num_pages` is a display cap for the link strip; it is not derived from
/// the size of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
    num_pages: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_CURRENT_PAGE, DEFAULT_NUM_PAGES)
    }
}

impl Paginator {
    /// Page size and current page are clamped to at least 1; every value is
    /// capped by its `MAX_*` bound.
    pub fn new(page_size: usize, current_page: usize, num_pages: usize) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            current_page: current_page.clamp(1, MAX_CURRENT_PAGE),
            num_pages: num_pages.min(MAX_NUM_PAGES),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// 0-based index of the first issue on the current page.
    ///
    /// Page 1 starts at 0, page `p > 1` at `(p - 1) * page_size + 1`. The
    /// extra `+ 1` skips one issue between pages 1 and 2; downstream
    /// consumers rely on the exact numbers, so it stays.
    pub fn start_index(&self) -> usize {
        if self.current_page == 1 {
            0
        } else {
            (self.current_page - 1)
                .saturating_mul(self.page_size)
                .saturating_add(1)
        }
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.num_pages)
            .map(|number| PageLink {
                number,
                current: number == self.current_page,
            })
            .collect()
    }

    /// Renders the link strip, or nothing when the host page has no
    /// addressable URL.
    pub fn render_strip(
        &self,
        page_url: Option<&str>,
        renderer: &dyn TemplateRenderer,
        base: &RenderContext,
    ) -> Result<String> {
        let Some(url) = page_url.filter(|url| !url.trim().is_empty()) else {
            return Ok(String::new());
        };
        let mut strip = String::new();
        for link in self.links() {
            let context = extend_context(
                base,
                [
                    ("num", Value::String(link.number.to_string())),
                    ("param", Value::String(PAGINATION_PARAM.to_string())),
                    ("url", Value::String(url.to_string())),
                    ("style", Value::String(link.style().to_string())),
                ],
            );
            strip.push_str(&renderer.render(Template::PaginationLink, &context)?);
        }
        Ok(strip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::HtmlTemplates;

    #[test]
    fn first_page_starts_at_zero_for_any_size() {
        for size in [1, 10, 25, 100] {
            assert_eq!(Paginator::new(size, 1, 10).start_index(), 0);
        }
    }

    #[test]
    fn later_pages_keep_the_one_issue_offset() {
        assert_eq!(Paginator::new(25, 2, 10).start_index(), 26);
        assert_eq!(Paginator::new(25, 3, 10).start_index(), 51);
        assert_eq!(Paginator::new(10, 5, 10).start_index(), 41);
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        let paginator = Paginator::new(0, 0, 3);
        assert_eq!(paginator.page_size(), 1);
        assert_eq!(paginator.current_page(), 1);
        assert_eq!(paginator.start_index(), 0);
    }

    #[test]
    fn oversized_inputs_are_capped() {
        let paginator = Paginator::new(usize::MAX, usize::MAX, usize::MAX);
        assert_eq!(paginator.page_size(), MAX_PAGE_SIZE);
        assert_eq!(paginator.current_page(), MAX_CURRENT_PAGE);
        assert_eq!(
            paginator.start_index(),
            (MAX_CURRENT_PAGE - 1) * MAX_PAGE_SIZE + 1
        );
        assert_eq!(paginator.links().len(), MAX_NUM_PAGES);
    }

    #[test]
    fn links_mark_only_the_current_page() {
        let links = Paginator::new(25, 3, 5).links();
        assert_eq!(links.len(), 5);
        let bold: Vec<usize> = links
            .iter()
            .filter(|link| link.style() == "font-weight:bold;")
            .map(|link| link.number)
            .collect();
        assert_eq!(bold, vec![3]);
    }

    #[test]
    fn current_page_beyond_cap_marks_nothing() {
        let links = Paginator::new(25, 12, 10).links();
        assert!(links.iter().all(|link| !link.current));
    }

    #[test]
    fn strip_is_empty_without_page_url() {
        let paginator = Paginator::default();
        let base = RenderContext::new();
        assert_eq!(
            paginator
                .render_strip(None, &HtmlTemplates, &base)
                .expect("renders"),
            ""
        );
        assert_eq!(
            paginator
                .render_strip(Some("  "), &HtmlTemplates, &base)
                .expect("renders"),
            ""
        );
    }

    #[test]
    fn strip_renders_one_link_per_page() {
        let paginator = Paginator::new(25, 2, 3);
        let base = RenderContext::new();
        let strip = paginator
            .render_strip(Some("/display/DOC/Report"), &HtmlTemplates, &base)
            .expect("renders");

        assert_eq!(strip.matches("<a ").count(), 3);
        assert!(strip.contains(
            r#"<a class="yt yt-page" style="font-weight:bold;" href="/display/DOC/Report?ytPage=2">2</a>"#
        ));
        assert_eq!(strip.matches("font-weight:normal;").count(), 2);
    }
}
