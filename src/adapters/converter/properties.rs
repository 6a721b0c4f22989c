//! Page-properties report analysis

use crate::domain::{ChildRecord, PageId};
use scraper::{Html, Selector};

/// Child pages listed in a page-properties report
///
/// Links carrying `data-linked-resource-id` inside the report table, in
/// document order, de-duplicated by id. Links to non-page resources and ids
/// that are not numeric are ignored.
///
/// # Example
///
/// ```
/// use confluence_dump::adapters::converter::page_properties_children;
///
/// let html = r#"<table><tr><td class="title">
///     <a href="/wiki/spaces/OPS/pages/100" data-linked-resource-id="100"
///        data-linked-resource-type="page">Server A</a>
/// </td></tr></table>"#;
///
/// let children = page_properties_children(html);
/// assert_eq!(children.len(), 1);
/// assert_eq!(children[0].name, "Server A");
/// ```
pub fn page_properties_children(html: &str) -> Vec<ChildRecord> {
    let document = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("table a[data-linked-resource-id]") else {
        return Vec::new();
    };

    let mut children: Vec<ChildRecord> = Vec::new();
    for link in document.select(&selector) {
        let element = link.value();

        if let Some(kind) = element.attr("data-linked-resource-type") {
            if kind != "page" {
                continue;
            }
        }

        let Some(id) = element
            .attr("data-linked-resource-id")
            .and_then(|id| PageId::new(id.trim()).ok())
        else {
            continue;
        };

        if children.iter().any(|c| c.id == id) {
            continue;
        }

        let name = link.text().collect::<String>();
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        // Image-only links carry no text
        let name = if name.is_empty() { id.to_string() } else { name };
        children.push(ChildRecord::new(name, id));
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"
<div class="plugin-tabmeta-details">
  <a href="/wiki/spaces/OPS/pages/1" data-linked-resource-id="1">Outside table</a>
  <table class="aui">
    <thead><tr><th>Title</th><th>Owner</th></tr></thead>
    <tbody>
      <tr>
        <td class="title"><a href="/wiki/spaces/OPS/pages/100" data-linked-resource-id="100"
            data-linked-resource-type="page">Server   A</a></td>
        <td><a href="/wiki/people/abc" data-linked-resource-id="abc"
            data-linked-resource-type="userinfo">Jane</a></td>
      </tr>
      <tr>
        <td class="title"><a href="/wiki/spaces/OPS/pages/200" data-linked-resource-id="200"
            data-linked-resource-type="page">Server B: Backup</a></td>
        <td>-</td>
      </tr>
      <tr>
        <td class="title"><a href="/wiki/spaces/OPS/pages/100" data-linked-resource-id="100"
            data-linked-resource-type="page">Server A</a></td>
        <td>-</td>
      </tr>
    </tbody>
  </table>
</div>"#;

    #[test]
    fn test_children_in_document_order() {
        let children = page_properties_children(REPORT);

        let ids: Vec<_> = children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["100", "200"]);
        assert_eq!(children[0].name, "Server A");
        assert_eq!(children[1].name, "Server B: Backup");
        assert!(children.iter().all(|c| c.filename.is_none()));
    }

    #[test]
    fn test_link_without_text_is_named_by_id() {
        let html = r#"<table><tr><td>
            <a href="/wiki/spaces/OPS/pages/300" data-linked-resource-id="300"
               data-linked-resource-type="page"><img src="/wiki/images/icon.png"> </a>
        </td></tr></table>"#;

        let children = page_properties_children(html);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "300");
    }

    #[test]
    fn test_no_report_table() {
        assert!(page_properties_children("<p>No report here</p>").is_empty());
        assert!(page_properties_children("").is_empty());
    }
}
