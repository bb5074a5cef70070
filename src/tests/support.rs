//! Shared fixtures: a small style catalog and a page tree exercising every relationship rule.

use crate::section::Section;
use crate::style::{Style, StyleCatalog};
use crate::tree::SectionTree;

pub const GROUP: i64 = 1;
pub const TEXT: i64 = 2;
pub const TABS: i64 = 3;
pub const TAB: i64 = 4;
pub const ACCORDION: i64 = 5;

pub const PAGE_ID: i64 = 1;

pub fn catalog() -> StyleCatalog {
    StyleCatalog::new([
        Style::new(GROUP, "Group", true),
        Style::new(TEXT, "Text", false),
        Style::new(TABS, "Tabs", true).allow_children([TAB]),
        Style::new(TAB, "Tab", true).allow_parents([TABS]),
        Style::new(ACCORDION, "Accordion", true).allow_children([TEXT]),
    ])
    .unwrap()
}

fn text(id: i64, position: i64) -> Section {
    Section::new(id, format!("Text {id}"), TEXT, false, position)
}

fn container(id: i64, style: i64, position: i64, children: Vec<Section>) -> Section {
    Section::new(id, format!("Section {id}"), style, true, position).with_children(children)
}

/// ```text
/// 10 Text
/// 20 Group
/// ├── 21 Text
/// └── 22 Group
///     └── 23 Text
/// 30 Tabs
/// ├── 31 Tab
/// │   └── 32 Text
/// └── 33 Tab
/// 40 Accordion
/// └── 41 Text
/// ```
pub fn sections() -> Vec<Section> {
    vec![
        text(10, 5),
        container(
            20,
            GROUP,
            15,
            vec![text(21, 5), container(22, GROUP, 15, vec![text(23, 5)])],
        ),
        container(
            30,
            TABS,
            25,
            vec![
                container(31, TAB, 5, vec![text(32, 5)]),
                container(33, TAB, 15, vec![]),
            ],
        ),
        container(40, ACCORDION, 35, vec![text(41, 5)]),
    ]
}

pub fn tree() -> SectionTree {
    SectionTree::new(PAGE_ID, sections()).unwrap()
}
