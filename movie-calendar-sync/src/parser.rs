//! Structural parser for yearly release schedule pages.
//!
//! A schedule page is a flat run of date headers followed by schedule
//! paragraphs:
//! ```text
//! <h4><strong>January 24</strong> (Friday)</h4>
//! <p class="sched">
//!   <a href="//…"><strong>Title One</strong></a> [Limited]<br />
//!   <a href="//…"><strong><s>Moved Title</s></strong></a><br />
//!   <a href="//…"><strong>Old Classic</strong></a> re-release<br />
//! </p>
//! …
//! <h4><a href="/schedule2023">« 2023</a> | <a href="/schedule2025">2025 »</a></h4>
//! ```
//!
//! Each line of a paragraph (a run of nodes ending at a `<br>`) is an anchor
//! group. Only the first anchor of a group names the release.

use std::sync::LazyLock;

use chrono::NaiveDate;
use movie_calendar_catalog::types::ScheduleEntry;
use scraper::{ElementRef, Html, Node, Selector};

static TAGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4, p").expect("static selector"));
static EMPHASIS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong, b").expect("static selector"));
static STRIKE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("s, strike, del").expect("static selector"));

/// Markers for lines that are not new theatrical releases.
const ANNOTATIONS: &[&str] = &["expands", "re-release"];

/// Turns one year's raw markup into schedule entries.
pub trait ScheduleParser {
    fn parse(&self, markup: &str, year: i32) -> Vec<ScheduleEntry>;
}

/// Parser for the firstshowing.net schedule layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstShowingParser;

impl ScheduleParser for FirstShowingParser {
    fn parse(&self, markup: &str, year: i32) -> Vec<ScheduleEntry> {
        let doc = Html::parse_document(markup);
        let mut entries = Vec::new();
        let mut current_date: Option<NaiveDate> = None;

        for tag in doc.select(&TAGS) {
            match tag.value().name() {
                "h4" if is_navigation_header(tag) => {
                    log::debug!("Reached year navigation for {}", year);
                    current_date = None;
                }
                "h4" => {
                    current_date = header_date(tag, year);
                }
                "p" if is_schedule_paragraph(tag) => {
                    let Some(date) = current_date else {
                        continue;
                    };
                    entries.extend(
                        anchor_groups(tag)
                            .into_iter()
                            .filter_map(|group| group.into_entry(date)),
                    );
                }
                _ => {}
            }
        }

        entries
    }
}

fn is_schedule_paragraph(tag: ElementRef<'_>) -> bool {
    tag.value().classes().any(|c| c == "sched")
}

/// The next/previous year header starts with a link instead of a date.
fn is_navigation_header(tag: ElementRef<'_>) -> bool {
    let first = tag.children().find(|node| match node.value() {
        Node::Text(text) => !text.trim().is_empty(),
        Node::Comment(_) => false,
        _ => true,
    });
    first
        .and_then(ElementRef::wrap)
        .is_some_and(|el| el.value().name() == "a")
}

/// Release date from a header's emphasized `Month Day` text.
fn header_date(tag: ElementRef<'_>, year: i32) -> Option<NaiveDate> {
    let Some(strong) = tag.select(&EMPHASIS).next() else {
        log::debug!("Date header without emphasis: {:?}", collapse_text(tag));
        return None;
    };
    let text = collapse_text(strong);
    match NaiveDate::parse_from_str(&format!("{} {}", text, year), "%B %d %Y") {
        Ok(date) => Some(date),
        Err(_) => {
            log::debug!("Failed to parse date: {}", text);
            None
        }
    }
}

/// One line of a schedule paragraph.
#[derive(Default)]
struct AnchorGroup<'a> {
    anchors: Vec<ElementRef<'a>>,
    annotated: bool,
}

impl AnchorGroup<'_> {
    fn into_entry(self, release_date: NaiveDate) -> Option<ScheduleEntry> {
        if self.annotated {
            return None;
        }
        let anchor = self.anchors.into_iter().next()?;
        if is_struck_through(anchor) {
            log::debug!("Skipping struck-through entry: {}", collapse_text(anchor));
            return None;
        }

        let raw_title = collapse_text(anchor);
        if raw_title.is_empty() {
            return None;
        }
        Some(ScheduleEntry {
            raw_title,
            link: normalize_link(anchor.value().attr("href").unwrap_or_default()),
            release_date,
        })
    }
}

/// Split a paragraph into groups terminated by `<br>`.
fn anchor_groups(paragraph: ElementRef<'_>) -> Vec<AnchorGroup<'_>> {
    let mut groups = Vec::new();
    let mut current = AnchorGroup::default();

    for node in paragraph.children() {
        match node.value() {
            Node::Element(el) if el.name() == "br" => {
                groups.push(std::mem::take(&mut current));
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(node) {
                    if el.value().name() == "a" {
                        current.anchors.push(el);
                    }
                    if is_annotation(&el.inner_html()) {
                        current.annotated = true;
                    }
                }
            }
            Node::Text(text) => {
                if is_annotation(text) {
                    current.annotated = true;
                }
            }
            _ => {}
        }
    }
    groups.push(current);

    groups.retain(|g| !g.anchors.is_empty());
    groups
}

fn is_annotation(text: &str) -> bool {
    let lower = text.to_lowercase();
    ANNOTATIONS.iter().any(|marker| lower.contains(marker))
}

/// Entries without an emphasis wrapper, or with a strike inside it, were
/// cancelled or moved.
fn is_struck_through(anchor: ElementRef<'_>) -> bool {
    match anchor.select(&EMPHASIS).next() {
        Some(emphasis) => emphasis.select(&STRIKE).next().is_some(),
        None => true,
    }
}

fn normalize_link(href: &str) -> String {
    let href = href.trim();
    match href.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => href.to_string(),
    }
}

fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
