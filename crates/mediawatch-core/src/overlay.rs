//! Overlay markup shown by the player while an error is displayed.

/// CSS class on the overlay's root element.
pub const DISPLAY_CLASS: &str = "vjs-watchdog-display";

/// Render the overlay body for `headline`. The headline is HTML-escaped.
pub fn render(headline: &str) -> String {
    format!(
        "<div class='{}'><h4>{}</h4></div>",
        DISPLAY_CLASS,
        escape_html(headline)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_wraps_headline() {
        assert_eq!(
            render("The video connection was lost"),
            "<div class='vjs-watchdog-display'><h4>The video connection was lost</h4></div>"
        );
    }

    #[test]
    fn render_escapes_markup() {
        let html = render("<b>Tom & Jerry's \"show\"</b>");
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&#39;s &quot;show&quot;&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
