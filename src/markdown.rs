//! Guideline Markdown
//!
//! pulldown-cmark with tables, strikethrough and task lists. On top of the stock
//! renderer:
//! - raw HTML in the source is shown as text
//! - images are constrained to the card width and videos get a `<video>` tag

use pulldown_cmark::{html::push_html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Render a guideline body to HTML
pub fn parse_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, get_options());
    let events = transform_events(parser);
    let mut html_output = String::new();
    push_html(&mut html_output, events.into_iter());
    html_output
}

/// First paragraph as plain text, for collapsed cards
pub fn summary(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(text, get_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_)) if !out.is_empty() => break,
            _ => {}
        }
    }
    if out.chars().count() > max_chars {
        let cut: String = out.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    } else {
        out
    }
}

fn get_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

enum State {
    Normal,
    /// Inside an image whose alt text is dropped
    InMedia { dropped_depth: usize },
}

fn transform_events<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut state = State::Normal;

    for event in parser {
        match state {
            State::Normal => match event {
                Event::Start(Tag::Image { dest_url, .. }) => {
                    let url = escape_html(&dest_url);
                    let html = if is_video_url(&dest_url) {
                        format!(r#"<video class="guideline-media" controls src="{}"></video>"#, url)
                    } else {
                        format!(r#"<img class="guideline-media" src="{}" />"#, url)
                    };
                    events.push(Event::Html(CowStr::from(html)));
                    state = State::InMedia { dropped_depth: 0 };
                }
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                other => events.push(other),
            },
            State::InMedia { ref mut dropped_depth } => match event {
                Event::Start(_) => *dropped_depth += 1,
                Event::End(_) => {
                    if *dropped_depth == 0 {
                        state = State::Normal;
                    } else {
                        *dropped_depth -= 1;
                    }
                }
                _ => {}
            },
        }
    }

    events
}

fn is_video_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.ends_with(".mp4") || lower.ends_with(".webm") || lower.ends_with(".mov")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = parse_markdown("# Agua\n\nBebe **2 litros** al día");
        assert!(html.contains("<h1>Agua</h1>"));
        assert!(html.contains("<strong>2 litros</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = parse_markdown("hola <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_images_and_videos() {
        let img = parse_markdown("![plato](https://x.co/plato.jpg)");
        assert!(img.contains(r#"<img class="guideline-media" src="https://x.co/plato.jpg" />"#));
        assert!(!img.contains("plato</"));

        let video = parse_markdown("![tecnica](https://x.co/sentadilla.MP4)");
        assert!(video.contains("<video"));
    }

    #[test]
    fn test_summary_takes_first_paragraph() {
        let text = "Primera *frase* aquí.\n\nSegunda parte.";
        assert_eq!(summary(text, 100), "Primera frase aquí.");
        assert_eq!(summary("abcdefghij", 4), "abcd…");
    }
}
