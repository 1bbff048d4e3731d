use super::{panels, Representative};
use crate::interaction::Panel;
use crate::utils::{self, own_text, resolve, text_of};
use crate::{Crawler, CrawlerError, CrawlerResult};
use itertools::Itertools;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

pub const START_URL: &str = "https://www.sejm.gov.pl/Sejm9.nsf/poslowie.xsp?type=A";
pub const BASE_URL: &str = "https://www.sejm.gov.pl/sejm9.nsf/";

const E: &str = "Invalid selector";
lazy_static! {
    static ref DEPUTIES: Selector = Selector::parse("ul.deputies > li > div > a").expect(E);
    static ref INFO: Selector = Selector::parse("#title_content").expect(E);
    static ref NAME: Selector = Selector::parse("#title_content > h1").expect(E);
    static ref IMG: Selector = Selector::parse("img").expect(E);
    static ref DATA: Selector = Selector::parse("ul.data").expect(E);
    static ref LI: Selector = Selector::parse("li").expect(E);
    static ref LEFT: Selector = Selector::parse("p.left").expect(E);
    static ref RIGHT: Selector = Selector::parse("p.right").expect(E);
    static ref EU_OPINIONS: Selector =
        Selector::parse(r#"a[id$=":opinieue"]"#).expect(E);
    static ref ETHICS_BREACH: Selector =
        Selector::parse(r#"a[id$=":naruszenie"]"#).expect(E);
    static ref HOMEPAGE: Selector =
        Selector::parse(r#"[id="view:_id1:_id2:facetMain:_id189:_id274"]"#).expect(E);
    static ref HOMEPAGE_LABEL: Selector = Selector::parse("#poselWWW").expect(E);
}

#[derive(Debug)]
pub struct SejmCrawler {
    base_url: Url,
}

impl SejmCrawler {
    pub fn new(base_url: &str) -> Result<Self, CrawlerError> {
        let base_url = Url::parse(base_url).map_err(|source| CrawlerError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(SejmCrawler { base_url })
    }

    fn extract_fields(&self, info: ElementRef) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for ul in info.select(&DATA).take(2) {
            for li in ul.select(&LI) {
                let Some(key) = li.select(&LEFT).next().and_then(own_text) else {
                    continue;
                };
                let key = key.trim_end_matches(':').trim_end().to_string();
                if key.is_empty() {
                    continue;
                }
                let value = li
                    .select(&RIGHT)
                    .next()
                    .map(|right| own_text(right).unwrap_or_else(|| text_of(right)))
                    .unwrap_or_default();
                fields.insert(key, value);
            }
        }
        fields
    }

    /// Anchors that sit among the dynamic tabs but are rendered with the
    /// initial page: label -> href. Unless a separate label element is
    /// given, the anchor's own text is the label.
    fn extract_static_links(&self, info: ElementRef) -> BTreeMap<String, String> {
        let mut links = BTreeMap::new();
        for (selector, label) in [
            (&*EU_OPINIONS, None),
            (&*ETHICS_BREACH, None),
            (&*HOMEPAGE, Some(&*HOMEPAGE_LABEL)),
        ] {
            let Some(anchor) = info.select(selector).next() else {
                continue;
            };
            let label = match label {
                Some(label) => info.select(label).next().and_then(own_text),
                None => own_text(anchor),
            };
            if let (Some(label), Some(href)) = (label, anchor.value().attr("href")) {
                links.insert(label, href.trim().to_string());
            }
        }
        links
    }
}

impl Crawler for SejmCrawler {
    type Document = Representative;

    fn can_be_scrapped(&self, doc: &Html) -> bool {
        doc.select(&INFO).next().is_some()
    }

    fn extract_links(&self, doc: &Html) -> Vec<String> {
        doc.select(&DEPUTIES)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve(&self.base_url, href))
            .unique()
            .collect()
    }

    fn script(&self) -> &[Panel] {
        &panels::SCRIPT
    }

    fn crawl(&self, url: &str, doc: &Html) -> CrawlerResult<Self::Document> {
        if !self.can_be_scrapped(doc) {
            return CrawlerResult::Links(self.extract_links(doc));
        }
        let Some(info) = doc.select(&INFO).next() else {
            return CrawlerResult::Links(vec![]);
        };
        let base = Url::parse(url).unwrap_or_else(|_| self.base_url.clone());

        let name = doc.select(&NAME).next().and_then(own_text);

        let picture = info
            .select(&IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| resolve(&base, src));

        CrawlerResult::Document(Representative {
            url: url.to_string(),
            scraped_at: utils::get_now(),
            name,
            picture,
            fields: self.extract_fields(info),
            links: self.extract_static_links(info),
            activity: panels::extract_activity(doc, &base),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn listing_links_are_absolute_and_unique() {
        let c = SejmCrawler::new(BASE_URL).unwrap();
        let html = fs::read_to_string("tests/htmls/listing.html").expect("Invalid file path");
        let doc = Html::parse_document(&html);

        assert!(!c.can_be_scrapped(&doc));
        let CrawlerResult::Links(links) = c.crawl(START_URL, &doc) else {
            panic!("listing must not be scraped as a profile");
        };
        assert_eq!(
            links,
            vec![
                "https://www.sejm.gov.pl/sejm9.nsf/posel.xsp?id=001&type=A",
                "https://www.sejm.gov.pl/sejm9.nsf/posel.xsp?id=002&type=A",
                "https://www.sejm.gov.pl/sejm9.nsf/posel.xsp?id=003&type=A",
            ]
        );
    }

    #[test]
    fn empty_listing_has_no_links() {
        let c = SejmCrawler::new(BASE_URL).unwrap();
        let doc = Html::parse_document("<html><body><ul class=\"other\"></ul></body></html>");
        assert!(c.extract_links(&doc).is_empty());
    }

    #[test]
    fn static_only_profile_has_empty_activity() {
        let c = SejmCrawler::new(BASE_URL).unwrap();
        let html = fs::read_to_string("tests/htmls/profile_static.html").expect("Invalid file path");
        let doc = Html::parse_document(&html);
        let url = "https://www.sejm.gov.pl/Sejm9.nsf/posel.xsp?id=002&type=A";

        assert!(c.can_be_scrapped(&doc));
        let CrawlerResult::Document(rep) = c.crawl(url, &doc) else {
            panic!("profile must be scraped");
        };

        assert_eq!(rep.name.as_deref(), Some("Barbara Bartuś"));
        assert_eq!(rep.picture, None);
        assert_eq!(
            rep.fields,
            BTreeMap::from([
                ("Lista".to_string(), "Prawo i Sprawiedliwość".to_string()),
                ("Wybrana dnia".to_string(), "13-10-2019".to_string()),
                ("Zawód".to_string(), "".to_string()),
            ])
        );
        assert!(rep.links.is_empty());
        assert_eq!(rep.activity, crate::sejm::Activity::default());
    }

    #[test]
    fn only_scrapable_pages_become_documents() {
        let c = SejmCrawler::new(BASE_URL).unwrap();
        for file in [
            "tests/htmls/listing.html",
            "tests/htmls/profile.html",
            "tests/htmls/profile_static.html",
        ] {
            let html = fs::read_to_string(file).expect("Invalid file path");
            let doc = Html::parse_document(&html);
            let is_document = matches!(c.crawl(START_URL, &doc), CrawlerResult::Document(_));
            assert_eq!(is_document, c.can_be_scrapped(&doc), "{}", file);
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            SejmCrawler::new("not a url"),
            Err(CrawlerError::InvalidUrl { .. })
        ));
    }
}
