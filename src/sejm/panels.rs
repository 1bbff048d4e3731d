use super::{Activity, Link, Row};
use crate::interaction::Panel;
use crate::panel;
use crate::utils::{resolve, squash, text_lines, text_of};
use lazy_regex::regex;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

pub const SPEECHES: Panel = panel!("speeches", "wystapienia");
pub const INTERPELLATIONS: Panel = panel!("interpellations", "interpelacje");
pub const VOTES: Panel = panel!("votes", "glosowania");
pub const COMMITTEES: Panel = panel!("committees", "komisje");
pub const DELEGATIONS: Panel = panel!("delegations", "delegacje");
pub const TEAMS: Panel = panel!("teams", "zespoly");
pub const OFFICES: Panel = panel!("offices", "biura");
pub const COLLABORATORS: Panel = panel!("collaborators", "wspolpracownicy");
pub const FINANCIAL_DECLARATIONS: Panel = panel!("financial declarations", "oswiadczenia");
pub const BENEFIT_RECORD: Panel = panel!("benefit record", "korzysci");
pub const EMAIL: Panel = panel!("email", "email");

/// Tabs of a profile page, in the order they are clicked.
pub const SCRIPT: [Panel; 11] = [
    SPEECHES,
    INTERPELLATIONS,
    VOTES,
    COMMITTEES,
    DELEGATIONS,
    TEAMS,
    OFFICES,
    COLLABORATORS,
    FINANCIAL_DECLARATIONS,
    BENEFIT_RECORD,
    EMAIL,
];

const E: &str = "Invalid selector";
lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").expect(E);
    static ref TR: Selector = Selector::parse("tr").expect(E);
    static ref TH: Selector = Selector::parse("th").expect(E);
    static ref CELL: Selector = Selector::parse("th, td").expect(E);
    static ref A_HREF: Selector = Selector::parse("a[href]").expect(E);
    static ref MAILTO: Selector = Selector::parse(r#"a[href^="mailto:"]"#).expect(E);
}

pub(crate) fn extract_activity(doc: &Html, base: &Url) -> Activity {
    Activity {
        speeches: rows(doc, &SPEECHES, base),
        interpellations: rows(doc, &INTERPELLATIONS, base),
        votes: rows(doc, &VOTES, base),
        committees: rows(doc, &COMMITTEES, base),
        delegations: rows(doc, &DELEGATIONS, base),
        teams: rows(doc, &TEAMS, base),
        offices: blocks(doc, &OFFICES),
        collaborators: rows(doc, &COLLABORATORS, base),
        financial_declarations: links(doc, &FINANCIAL_DECLARATIONS, base),
        benefit_record: links(doc, &BENEFIT_RECORD, base),
        email: email(doc, &EMAIL),
    }
}

fn container<'a>(doc: &'a Html, panel: &Panel) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(panel.container).ok()?;
    doc.select(&selector).next()
}

/// Header cells of the first row that has any name the columns; every later
/// row becomes a record. Rows above the header are captions, not data.
/// The first link of a row is kept under `link`.
fn rows(doc: &Html, panel: &Panel, base: &Url) -> Vec<Row> {
    let Some(table) = container(doc, panel).and_then(|c| c.select(&TABLE).next()) else {
        return vec![];
    };

    let trs = table.select(&TR).collect::<Vec<_>>();
    let header_at = trs.iter().position(|tr| tr.select(&TH).next().is_some());
    let (headers, data) = match header_at {
        Some(i) => (
            trs[i].select(&TH).map(text_of).collect::<Vec<_>>(),
            &trs[i + 1..],
        ),
        None => (vec![], &trs[..]),
    };

    let mut rows = vec![];
    for tr in data {
        let cells = tr.select(&CELL).map(text_of).collect::<Vec<_>>();
        if cells.iter().all(String::is_empty) {
            continue;
        }

        let mut row = Row::new();
        for (i, cell) in cells.into_iter().enumerate() {
            let key = headers
                .get(i)
                .filter(|h| !h.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("column {}", i + 1));
            row.insert(key, cell);
        }
        if let Some(link) = tr
            .select(&A_HREF)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| resolve(base, href))
        {
            row.insert("link".to_string(), link);
        }
        rows.push(row);
    }
    rows
}

fn blocks(doc: &Html, panel: &Panel) -> Vec<Vec<String>> {
    let Some(container) = container(doc, panel) else {
        return vec![];
    };
    container
        .children()
        .filter_map(ElementRef::wrap)
        .map(text_lines)
        .filter(|lines| !lines.is_empty())
        .collect()
}

fn links(doc: &Html, panel: &Panel, base: &Url) -> Vec<Link> {
    let Some(container) = container(doc, panel) else {
        return vec![];
    };
    container
        .select(&A_HREF)
        .filter_map(|a| {
            let url = resolve(base, a.value().attr("href")?)?;
            let title = text_of(a);
            Some(Link {
                title: if title.is_empty() { url.clone() } else { title },
                url,
            })
        })
        .collect()
}

fn email(doc: &Html, panel: &Panel) -> Option<String> {
    let container = container(doc, panel)?;

    let from_href = container
        .select(&MAILTO)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| {
            let address = href.trim().trim_start_matches("mailto:");
            let address = address.split('?').next().unwrap_or_default();
            let address = urlencoding::decode(address).ok()?;
            Some(deobfuscate(&address))
        })
        .find(|a| !a.is_empty());
    if from_href.is_some() {
        return from_href;
    }

    let text = deobfuscate(&text_of(container));
    regex!(r"[\w.+-]+@[\w-]+(\.[\w-]+)+")
        .find(&text)
        .map(|m| m.as_str().to_string())
}

/// Turns `jan.kowalski(at)sejm(dot)pl` and friends back into an address.
fn deobfuscate(s: &str) -> String {
    let s = regex!(r"\s*[(\[]at[)\]]\s*|\s+at\s+").replace_all(s, "@");
    let s = regex!(r"\s*[(\[]dot[)\]]\s*").replace_all(&s, ".");
    squash(&s)
}
