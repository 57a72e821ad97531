//! Server-side HTML for the listing page.

use std::fmt::Write;

use mediafiler_core::FileEntry;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn listing_page(files: &[FileEntry], archive_enabled: bool) -> String {
    let mut page = String::from(concat!(
        "<!doctype html>\n",
        "<html lang=\"en\">\n<head>\n",
        "<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>mediafiler</title>\n",
        "<link rel=\"stylesheet\" href=\"/asset/index.css\">\n",
        "</head>\n<body>\n",
    ));

    if files.is_empty() {
        page.push_str("<p class=\"empty\">No media files found.</p>\n");
    } else {
        page.push_str("<ul id=\"files\">\n");
        for entry in files {
            push_row(&mut page, entry, archive_enabled);
        }
        page.push_str("</ul>\n");
    }

    page.push_str("<script src=\"/asset/index.js\"></script>\n</body>\n</html>\n");
    page
}

fn push_row(page: &mut String, entry: &FileEntry, archive_enabled: bool) {
    let id = escape_html(&entry.id);
    // Writing into a String cannot fail.
    let _ = write!(
        page,
        "<li data-id=\"{id}\"><a href=\"/f/{id}\">{title}</a> \
         <time datetime=\"{iso}\">{shown}</time> \
         <button class=\"copy\">copy link</button> \
         <button data-action=\"delete\">delete</button>",
        title = escape_html(&entry.title()),
        iso = entry.modified_at.to_rfc3339(),
        shown = entry.modified_at.format("%Y-%m-%d %H:%M"),
    );
    if archive_enabled {
        page.push_str(" <button data-action=\"archive\">archive</button>");
    }
    page.push_str("</li>\n");
}
