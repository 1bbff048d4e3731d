mod crawler;
pub mod panels;

pub use crawler::{SejmCrawler, BASE_URL, START_URL};

use crate::Record;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// One line of a tabular panel, keyed by column header.
pub type Row = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

/// Everything that only shows up once the profile tabs have been clicked.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub speeches: Vec<Row>,
    pub interpellations: Vec<Row>,
    pub votes: Vec<Row>,
    pub committees: Vec<Row>,
    pub delegations: Vec<Row>,
    pub teams: Vec<Row>,
    pub offices: Vec<Vec<String>>,
    pub collaborators: Vec<Row>,
    pub financial_declarations: Vec<Link>,
    pub benefit_record: Vec<Link>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub url: String,
    pub scraped_at: DateTime<FixedOffset>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    pub activity: Activity,
}

impl Record for Representative {
    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, label: &str, rows: &[Row]) -> fmt::Result {
    writeln!(f, "{:<24}: {}", label, rows.len())?;
    for row in rows {
        let cells = row
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>();
        writeln!(f, "> {}", cells.join(" | "))?;
    }
    Ok(())
}

fn write_links(f: &mut fmt::Formatter<'_>, label: &str, links: &[Link]) -> fmt::Result {
    writeln!(f, "{:<24}: {}", label, links.len())?;
    for link in links {
        writeln!(f, "> {} <{}>", link.title, link.url)?;
    }
    Ok(())
}

impl fmt::Display for Representative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24}: {}", "Url", self.url)?;
        writeln!(
            f,
            "{:<24}: {}",
            "Name",
            self.name.as_deref().unwrap_or("None")
        )?;
        writeln!(
            f,
            "{:<24}: {}",
            "Picture",
            self.picture.as_deref().unwrap_or("None")
        )?;
        for (k, v) in self.fields.iter().chain(self.links.iter()) {
            writeln!(f, "{:<24}: {}", k, v)?;
        }

        let a = &self.activity;
        write_rows(f, "Speeches", &a.speeches)?;
        write_rows(f, "Interpellations", &a.interpellations)?;
        write_rows(f, "Votes", &a.votes)?;
        write_rows(f, "Committees", &a.committees)?;
        write_rows(f, "Delegations", &a.delegations)?;
        write_rows(f, "Teams", &a.teams)?;
        writeln!(f, "{:<24}: {}", "Offices", a.offices.len())?;
        for office in &a.offices {
            writeln!(f, "> {}", office.join(", "))?;
        }
        write_rows(f, "Collaborators", &a.collaborators)?;
        write_links(f, "Financial declarations", &a.financial_declarations)?;
        write_links(f, "Benefit record", &a.benefit_record)?;
        writeln!(
            f,
            "{:<24}: {}",
            "Email",
            a.email.as_deref().unwrap_or("None")
        )?;

        Ok(())
    }
}
