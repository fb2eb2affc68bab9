//! Fallback chains for the four page views.
//!
//! Each view is an ordered list of rules; the first rule that matches decides
//! what the slot shows. Anything unmatched falls through to an empty page.

use crate::model::{Chapter, Page};

/// Inputs every rule sees
pub(crate) struct Lookup<'a> {
    pub message: Option<&'a str>,
    pub cursor: Option<usize>,
    pub current: Option<&'a Chapter>,
    pub next: Option<&'a Chapter>,
    pub prev: Option<&'a Chapter>,
}

/// What a slot resolves to, before it is turned into an owned page
#[derive(Debug, PartialEq)]
pub(crate) enum Resolution<'a> {
    Message(&'a str),
    Page(&'a Page),
    Title(&'a Chapter),
    SwipeTip,
    Empty,
}

pub(crate) type Rule = for<'a> fn(&Lookup<'a>) -> Option<Resolution<'a>>;

pub(crate) const CURRENT: &[Rule] = &[pending_message, page_at_cursor];

pub(crate) const NEXT: &[Rule] = &[
    pending_message,
    next_in_chapter,
    hold_on_incomplete_chapter,
    first_of_next_chapter,
];

pub(crate) const PREV: &[Rule] = &[
    pending_message,
    prev_in_chapter,
    hold_on_incomplete_chapter,
    last_of_prev_chapter,
];

pub(crate) const NEXT_PLUS: &[Rule] = &[
    pending_message,
    two_ahead_in_chapter,
    hold_on_incomplete_chapter,
    lookahead_into_next_chapter,
];

pub(crate) fn resolve<'a>(rules: &[Rule], lookup: &Lookup<'a>) -> Resolution<'a> {
    rules
        .iter()
        .find_map(|rule| rule(lookup))
        .unwrap_or(Resolution::Empty)
}

fn page_or_title(chapter: &Chapter, index: usize) -> Resolution<'_> {
    chapter
        .page(index)
        .map_or(Resolution::Title(chapter), Resolution::Page)
}

fn pending_message<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    l.message.map(Resolution::Message)
}

fn page_at_cursor<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let chapter = l.current?;
    Some(match l.cursor {
        Some(index) => page_or_title(chapter, index),
        None => Resolution::Title(chapter),
    })
}

fn next_in_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let chapter = l.current?;
    let target = l.cursor.map_or(0, |i| i + 1);
    (target < chapter.page_count()).then(|| page_or_title(chapter, target))
}

fn prev_in_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let chapter = l.current?;
    let index = l.cursor.filter(|&i| i > 0)?;
    Some(page_or_title(chapter, index - 1))
}

fn two_ahead_in_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let chapter = l.current?;
    let target = l.cursor.map_or(1, |i| i + 2);
    (target < chapter.page_count()).then(|| page_or_title(chapter, target))
}

fn hold_on_incomplete_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    l.current
        .filter(|chapter| !chapter.is_completed())
        .map(Resolution::Title)
}

fn first_of_next_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    l.next.map(|chapter| page_or_title(chapter, 0))
}

fn last_of_prev_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let chapter = l.prev?;
    Some(
        chapter
            .last_page()
            .map_or(Resolution::Title(chapter), Resolution::Page),
    )
}

// Two pages ahead straddles the chapter boundary: either the next chapter's
// first page (one page left here) or its second page.
fn lookahead_into_next_chapter<'a>(l: &Lookup<'a>) -> Option<Resolution<'a>> {
    let current = l.current?;
    let next = l.next?;
    let one_left = l.cursor.map_or(true, |i| i + 1 < current.page_count());
    Some(if one_left {
        page_or_title(next, 0)
    } else {
        next.page(1).map_or(Resolution::SwipeTip, Resolution::Page)
    })
}
