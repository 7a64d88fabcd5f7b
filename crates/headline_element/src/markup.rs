//! Markup rendering
//!
//! Produces the stylesheet and heading structure a document host mounts
//! for one element. Text content is escaped; style values are passed
//! through as given.

use std::fmt::Write;

use headline_core::Configuration;

/// Escape text for use as HTML content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the element's style block and heading structure
pub fn render_markup(config: &Configuration) -> String {
    let style = config.style();
    let tag = style.heading_level.tag();
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write!(
        out,
        r#"<style>
  :host {{
    width: 100vw;
    height: 100vh;
    margin: 0;
    display: flex;
    align-items: center;
    background: {background};
    overflow: hidden;
  }}

  {tag} {{
    position: relative;
    font-size: {font_size}vw;
    font-family: {font_family}, sans-serif;
    font-weight: bold;
    padding-left: 15vw;
    color: {text_color};
    display: inline-block;
    overflow-wrap: break-word;
    white-space: normal;
    line-height: 1.2;
  }}

  .box {{
    position: absolute;
    bottom: 0;
    left: 15vw;
    display: inline-block;
    background: {fill_color};
    height: 1vw;
    width: 0;
    z-index: -1;
  }}

  .before, .static, .after, .text {{
    display: inline-block;
  }}

  .cursor {{
    display: inline-block;
    color: {cursor_color};
    font-size: {font_size}vw;
  }}
</style>
"#,
        background = style.background_color,
        font_size = style.font_size_vw,
        font_family = style.font_family,
        text_color = style.text_color,
        fill_color = style.fill_color,
        cursor_color = style.cursor_color,
    );

    let _ = write!(
        out,
        r#"<{tag}>
  <span class="before">{before}</span>
  <span class="box"></span>
  <span class="static">{lead}</span>
  <span class="text"></span>
  <span class="after">{after}</span>
  <span class="cursor">{cursor}</span>
</{tag}>
"#,
        before = escape_html(&style.before_text),
        lead = escape_html(config.lead_text()),
        after = escape_html(&style.after_text),
        cursor = escape_html(config.cursor_symbol()),
    );
    out
}
