//! Accessibility decoration of rendered SVG charts.

use crate::error::{ReportError, Result};
use quick_xml::escape::escape;

/// Add `role="img"`, `aria-labelledby`, `<title>` and `<desc>` to the root
/// `<svg>` element. Applying it to already decorated output returns it unchanged.
///
/// `id` prefixes the element ids (`{id}-title`, `{id}-desc`).
pub fn decorate_svg(svg: &str, id: &str, title: &str, description: &str) -> Result<String> {
    let start = svg
        .find("<svg")
        .ok_or_else(|| ReportError::Export("no <svg> element in chart output".into()))?;
    let open_end = svg[start..]
        .find('>')
        .map(|i| start + i)
        .ok_or_else(|| ReportError::Export("unterminated <svg> start tag".into()))?;
    let open_tag = &svg[start..open_end];
    if open_tag.contains("role=\"img\"") {
        return Ok(svg.to_string());
    }

    // Self-closing `<svg/>` keeps its slash at the end of the tag.
    let (attrs_end, self_closing) = if open_tag.ends_with('/') {
        (open_end - 1, true)
    } else {
        (open_end, false)
    };
    let title_id = format!("{id}-title");
    let desc_id = format!("{id}-desc");
    let children = format!(
        "<title id=\"{title_id}\">{}</title><desc id=\"{desc_id}\">{}</desc>",
        escape(title),
        escape(description)
    );

    let mut out = String::with_capacity(svg.len() + children.len() + 64);
    out.push_str(&svg[..attrs_end]);
    out.push_str(&format!(
        " role=\"img\" aria-labelledby=\"{title_id} {desc_id}\">"
    ));
    out.push_str(&children);
    if self_closing {
        out.push_str("</svg>");
        out.push_str(&svg[open_end + 1..]);
    } else {
        out.push_str(&svg[open_end + 1..]);
    }
    Ok(out)
}
