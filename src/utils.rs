use chrono::{DateTime, FixedOffset};
use lazy_regex::regex;
use reqwest::Url;
use scraper::ElementRef;

pub(crate) fn get_now() -> DateTime<FixedOffset> {
    DateTime::<FixedOffset>::from(chrono::offset::Local::now())
}

/// Collapses runs of whitespace (including nbsp) into one space and trims.
pub(crate) fn squash(s: &str) -> String {
    regex!(r"\s+").replace_all(s, " ").trim().to_string()
}

/// All text below `el`, whitespace collapsed.
pub(crate) fn text_of(el: ElementRef) -> String {
    squash(&el.text().collect::<String>())
}

/// First non-blank text node that is a direct child of `el`.
pub(crate) fn own_text(el: ElementRef) -> Option<String> {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| squash(t))
        .find(|t| !t.is_empty())
}

/// Non-blank text nodes below `el`, one entry per node.
pub(crate) fn text_lines(el: ElementRef) -> Vec<String> {
    el.text()
        .map(squash)
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn squash_collapses_whitespace() {
        assert_eq!(squash("  Jan \n\t Kowalski\u{a0} "), "Jan Kowalski");
        assert_eq!(squash(" \n "), "");
    }

    #[test]
    fn own_text_skips_children_and_blanks() {
        let html = Html::parse_fragment("<h1>\n  <span>x</span> Anna Nowak <b>y</b></h1>");
        let h1 = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .unwrap();
        assert_eq!(own_text(h1), Some("Anna Nowak".to_string()));
        assert_eq!(text_lines(h1), vec!["x", "Anna Nowak", "y"]);
    }

    #[test]
    fn resolve_relative_hrefs() {
        let base = Url::parse("https://www.sejm.gov.pl/sejm9.nsf/").unwrap();
        assert_eq!(
            resolve(&base, "posel.xsp?id=001&type=A").as_deref(),
            Some("https://www.sejm.gov.pl/sejm9.nsf/posel.xsp?id=001&type=A")
        );
        assert_eq!(
            resolve(&base, "/Sejm9.nsf/photo/001.jpg").as_deref(),
            Some("https://www.sejm.gov.pl/Sejm9.nsf/photo/001.jpg")
        );
        assert_eq!(resolve(&base, "#top"), None);
        assert_eq!(resolve(&base, "  "), None);
    }
}
