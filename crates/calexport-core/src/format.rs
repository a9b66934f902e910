//! HTML rendering of calendar links.
//!
//! [`render_links_html`] turns [`RenderedLinks`] into the display fragment
//! placed in a table cell, and [`LinkTable`] lays out a list of records with
//! one links cell per row.

use crate::links::RenderedLinks;

/// CSS class of the fragment wrapper.
pub const LINKS_CLASS: &str = "calendar-export-links";

/// Renders zero, one or two links as an HTML fragment.
///
/// Disabled links, and enabled links without a URL, are left out. Returns
/// an empty string when nothing would be shown.
pub fn render_links_html(links: &RenderedLinks) -> String {
    if links.is_empty() {
        return String::new();
    }

    let mut anchors = Vec::with_capacity(2);

    if links.show_ics
        && let Some(ref url) = links.ics_url
    {
        anchors.push(format!(
            r#"  <a class="{LINKS_CLASS}__ics" href="{}" download>{}</a>"#,
            html_escape(url),
            html_escape(&links.ics_text)
        ));
    }

    if links.show_google
        && let Some(ref url) = links.google_url
    {
        anchors.push(format!(
            r#"  <a class="{LINKS_CLASS}__google" href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(url),
            html_escape(&links.google_text)
        ));
    }

    format!(
        "<div class=\"{LINKS_CLASS}\">\n{}\n</div>",
        anchors.join("\n")
    )
}

/// Escapes text for HTML display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// One table row: plain-text cells followed by the links cell.
#[derive(Debug, Clone, Default)]
pub struct LinkRow {
    /// Column values, escaped on render.
    pub cells: Vec<String>,
    /// Links shown in the last column.
    pub links: RenderedLinks,
}

/// A table of records with a trailing calendar links column.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    /// Table caption.
    pub caption: Option<String>,
    /// Column headers, excluding the links column.
    pub headers: Vec<String>,
    /// Header of the links column.
    pub links_header: String,
    /// Table rows.
    pub rows: Vec<LinkRow>,
}

impl LinkTable {
    /// Creates an empty table with the given headers.
    pub fn new(headers: Vec<String>, links_header: impl Into<String>) -> Self {
        Self {
            caption: None,
            headers,
            links_header: links_header.into(),
            rows: Vec::new(),
        }
    }

    /// Builder method to set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Appends a row.
    pub fn push(&mut self, cells: Vec<String>, links: RenderedLinks) {
        self.rows.push(LinkRow { cells, links });
    }

    /// Renders the table as HTML.
    pub fn render(&self) -> String {
        let mut out = String::from("<table>\n");

        if let Some(ref caption) = self.caption {
            out.push_str(&format!("<caption>{}</caption>\n", html_escape(caption)));
        }

        out.push_str("<thead><tr>");
        for header in self.headers.iter().chain(std::iter::once(&self.links_header)) {
            out.push_str(&format!("<th>{}</th>", html_escape(header)));
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        for row in &self.rows {
            out.push_str("<tr>");
            for cell in &row.cells {
                out.push_str(&format!("<td>{}</td>", html_escape(cell)));
            }
            out.push_str(&format!("<td>{}</td>", render_links_html(&row.links)));
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both_links() -> RenderedLinks {
        RenderedLinks {
            ics_url: Some("/calendar-export/ics/node/1?start=s&end=e".to_string()),
            google_url: Some(
                "https://calendar.google.com/calendar/render?action=TEMPLATE&text=A".to_string(),
            ),
            show_ics: true,
            show_google: true,
            ics_text: "Download ICS".to_string(),
            google_text: "Add to Google Calendar".to_string(),
        }
    }

    #[test]
    fn renders_both_links() {
        insta::assert_snapshot!(render_links_html(&both_links()), @r#"
        <div class="calendar-export-links">
          <a class="calendar-export-links__ics" href="/calendar-export/ics/node/1?start=s&amp;end=e" download>Download ICS</a>
          <a class="calendar-export-links__google" href="https://calendar.google.com/calendar/render?action=TEMPLATE&amp;text=A" target="_blank" rel="noopener">Add to Google Calendar</a>
        </div>
        "#);
    }

    #[test]
    fn hidden_link_is_not_rendered() {
        let links = RenderedLinks {
            show_google: false,
            ..both_links()
        };
        let html = render_links_html(&links);
        assert!(html.contains("__ics"));
        assert!(!html.contains("__google"));
    }

    #[test]
    fn enabled_link_without_url_is_skipped() {
        let links = RenderedLinks {
            google_url: None,
            ..both_links()
        };
        assert!(!render_links_html(&links).contains("__google"));
    }

    #[test]
    fn nothing_to_show_is_empty() {
        assert_eq!(render_links_html(&RenderedLinks::default()), "");
    }

    #[test]
    fn enabled_links_without_urls_render_nothing() {
        let links = RenderedLinks {
            ics_url: None,
            google_url: None,
            ..both_links()
        };
        assert!(links.is_empty());
        assert_eq!(render_links_html(&links), "");
    }

    #[test]
    fn link_text_is_escaped() {
        let links = RenderedLinks {
            ics_text: "<b>ICS</b>".to_string(),
            show_google: false,
            ..both_links()
        };
        assert!(render_links_html(&links).contains("&lt;b&gt;ICS&lt;/b&gt;"));
    }

    #[test]
    fn html_escape_specials() {
        assert_eq!(html_escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn table_layout() {
        let mut table = LinkTable::new(vec!["Title".into(), "Start".into()], "Calendar")
            .with_caption("Events");
        table.push(
            vec!["Team <Sync>".into(), "2024-06-01 10:00".into()],
            RenderedLinks::default(),
        );

        insta::assert_snapshot!(table.render(), @r"
        <table>
        <caption>Events</caption>
        <thead><tr><th>Title</th><th>Start</th><th>Calendar</th></tr></thead>
        <tbody>
        <tr><td>Team &lt;Sync&gt;</td><td>2024-06-01 10:00</td><td></td></tr>
        </tbody>
        </table>
        ");
    }

    #[test]
    fn table_rows_embed_links() {
        let mut table = LinkTable::new(vec!["Title".into()], "Calendar");
        table.push(vec!["A".into()], both_links());
        let html = table.render();
        assert!(html.contains("<td><div class=\"calendar-export-links\">"));
        assert_eq!(table.rows.len(), 1);
    }
}
