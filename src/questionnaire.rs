//! Questionnaire page routing
//!
//! The interview UI shows one page per [`Dialogue`](crate::dialogue::Dialogue)
//! step, in the dialogue's own order. Which page follows which is a fixed
//! lookup table keyed by `(page, answer)`; a few targets depend on the
//! asset's completeness or on the result snapshot so far.
//!
//! ```text
//! [0a] [0b] ──▶ 1 ──private──────────────────────▶ result-note-private
//!               1 ──print|online|other──▶ 2
//! 2 ──yes──▶ 3 ──▶ 4 ──▶ 5 ──▶ 6          2 ──no──▶ 6
//! 6 ──(print)──▶ 7 ──adjacent──▶ result-success
//!                  7 ──separate──▶ result-note-print-credits
//! 6 ──(other uses)──────────────▶ result-success
//! ```
//!
//! Corrective pages `0a`/`0b` (author, title) are shown only for facts the
//! asset lacks. Page 7 only picks a result note and has no dialogue step.
//! The graph has no cycles; going back is the caller's job via
//! [`Dialogue::set_step`](crate::dialogue::Dialogue::set_step).

use crate::asset::Asset;
use crate::dialogue::{
    DialogueResult, UseCase, STEP_AUTHOR, STEP_CHANGE, STEP_COMPILATION, STEP_CREATOR,
    STEP_EDITING, STEP_LICENCE, STEP_TITLE, STEP_TYPE_OF_USE,
};
use crate::licence::{GROUP_CC0, GROUP_PD, GROUP_UNSUPPORTED};
use crate::{AttributionError, AttributionResult};

// ─── Pages ──────────────────────────────────────────────────────────

pub const PAGE_AUTHOR: &str = "0a";
pub const PAGE_TITLE: &str = "0b";
pub const PAGE_TYPE_OF_USE: &str = "1";
pub const PAGE_EDITING: &str = "2";
pub const PAGE_CHANGE: &str = "3";
pub const PAGE_CREATOR: &str = "4";
pub const PAGE_EDIT_LICENCE: &str = "5";
pub const PAGE_COMPILATION: &str = "6";
pub const PAGE_PRINT_PLACEMENT: &str = "7";

pub const RESULT_SUCCESS: &str = "result-success";
pub const RESULT_NOTE_PRIVATE: &str = "result-note-private";
pub const RESULT_NOTE_PD: &str = "result-note-pd";
pub const RESULT_NOTE_UNSUPPORTED: &str = "result-note-unsupported";
pub const RESULT_NOTE_PRINT_CREDITS: &str = "result-note-print-credits";

/// Every page in display order; routes only ever move forward in this list
pub const PAGES: &[&str] = &[
    PAGE_AUTHOR,
    PAGE_TITLE,
    PAGE_TYPE_OF_USE,
    PAGE_EDITING,
    PAGE_CHANGE,
    PAGE_CREATOR,
    PAGE_EDIT_LICENCE,
    PAGE_COMPILATION,
    PAGE_PRINT_PLACEMENT,
    RESULT_SUCCESS,
    RESULT_NOTE_PRIVATE,
    RESULT_NOTE_PD,
    RESULT_NOTE_UNSUPPORTED,
    RESULT_NOTE_PRINT_CREDITS,
];

/// Page → dialogue step it collects
const PAGE_STEPS: &[(&str, &str)] = &[
    (PAGE_AUTHOR, STEP_AUTHOR),
    (PAGE_TITLE, STEP_TITLE),
    (PAGE_TYPE_OF_USE, STEP_TYPE_OF_USE),
    (PAGE_EDITING, STEP_EDITING),
    (PAGE_CHANGE, STEP_CHANGE),
    (PAGE_CREATOR, STEP_CREATOR),
    (PAGE_EDIT_LICENCE, STEP_LICENCE),
    (PAGE_COMPILATION, STEP_COMPILATION),
];

/// Answer id used by pages that only collect free text
pub const ANSWER_NEXT: &str = "next";

// ─── Routing table ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Target {
    Page(&'static str),
    /// First corrective page after `after` whose fact is missing, else page 1
    Corrective { after: usize },
    /// Page 7 for print use, success otherwise
    ByUseCase,
}

struct Route {
    page: &'static str,
    answer: &'static str,
    to: Target,
}

const fn route(page: &'static str, answer: &'static str, to: Target) -> Route {
    Route { page, answer, to }
}

/// Corrective pages in order; `Target::Corrective` skips the first `after`
const CORRECTIVE_PAGES: [&str; 2] = [PAGE_AUTHOR, PAGE_TITLE];

const ROUTES: &[Route] = &[
    route(PAGE_AUTHOR, ANSWER_NEXT, Target::Corrective { after: 1 }),
    route(PAGE_TITLE, ANSWER_NEXT, Target::Corrective { after: 2 }),
    route(PAGE_TYPE_OF_USE, "print", Target::Page(PAGE_EDITING)),
    route(PAGE_TYPE_OF_USE, "online", Target::Page(PAGE_EDITING)),
    route(PAGE_TYPE_OF_USE, "other", Target::Page(PAGE_EDITING)),
    route(PAGE_TYPE_OF_USE, "private", Target::Page(RESULT_NOTE_PRIVATE)),
    route(PAGE_EDITING, "yes", Target::Page(PAGE_CHANGE)),
    route(PAGE_EDITING, "no", Target::Page(PAGE_COMPILATION)),
    route(PAGE_CHANGE, ANSWER_NEXT, Target::Page(PAGE_CREATOR)),
    route(PAGE_CREATOR, ANSWER_NEXT, Target::Page(PAGE_EDIT_LICENCE)),
    route(PAGE_EDIT_LICENCE, ANSWER_NEXT, Target::Page(PAGE_COMPILATION)),
    route(PAGE_COMPILATION, "yes", Target::ByUseCase),
    route(PAGE_COMPILATION, "no", Target::ByUseCase),
    route(PAGE_PRINT_PLACEMENT, "adjacent", Target::Page(RESULT_SUCCESS)),
    route(PAGE_PRINT_PLACEMENT, "separate", Target::Page(RESULT_NOTE_PRINT_CREDITS)),
];

fn corrective_missing(page: &str, asset: &Asset) -> bool {
    match page {
        PAGE_AUTHOR => !asset.has_author(),
        _ => !asset.has_title(),
    }
}

fn corrective_from(after: usize, asset: &Asset) -> &'static str {
    CORRECTIVE_PAGES
        .iter()
        .skip(after)
        .find(|p| corrective_missing(p, asset))
        .copied()
        .unwrap_or(PAGE_TYPE_OF_USE)
}

// ─── Navigation ─────────────────────────────────────────────────────

/// Page the interview opens on. Licences that need no attribution, and
/// ones the engine cannot advise on, go straight to their note.
pub fn first_page_id(asset: &Asset) -> &'static str {
    let licence = asset.licence();
    if licence.is_unknown() || licence.is_in_group(GROUP_UNSUPPORTED) {
        RESULT_NOTE_UNSUPPORTED
    } else if licence.is_in_group(GROUP_PD) || licence.is_in_group(GROUP_CC0) {
        RESULT_NOTE_PD
    } else {
        corrective_from(0, asset)
    }
}

/// Page that follows `page` when `answer` was picked
pub fn next_page_id(
    page: &str,
    answer: &str,
    asset: &Asset,
    result: &DialogueResult,
) -> AttributionResult<&'static str> {
    let route = ROUTES
        .iter()
        .find(|r| r.page == page && r.answer == answer)
        .ok_or_else(|| {
            AttributionError::InvalidAnswer(format!("no route from page {} on '{}'", page, answer))
        })?;

    let next = match route.to {
        Target::Page(p) => p,
        Target::Corrective { after } => corrective_from(after, asset),
        Target::ByUseCase if result.use_case == UseCase::Print => PAGE_PRINT_PLACEMENT,
        Target::ByUseCase => RESULT_SUCCESS,
    };
    tracing::debug!("Page {} --{}--> {}", page, answer, next);
    Ok(next)
}

/// Dialogue step answered on `page`; `None` for routing-only and result pages
pub fn step_for_page(page: &str) -> Option<&'static str> {
    PAGE_STEPS
        .iter()
        .find(|(p, _)| *p == page)
        .map(|(_, step)| *step)
}

/// Result pages end the interview
pub fn is_terminal(page: &str) -> bool {
    page.starts_with("result-")
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetRecord, Author};
    use crate::dialogue::{
        answer, AnswerData, Dialogue, KEY_AUTHOR, KEY_CHANGE, KEY_COMPILATION, KEY_CREATOR,
        KEY_EDITED, KEY_FULL_LICENCE, KEY_LICENCE, KEY_TYPE,
    };
    use crate::licence::{Licence, LicenceStore};
    use std::sync::Arc;

    fn store() -> LicenceStore {
        LicenceStore::with_defaults().unwrap()
    }

    fn complete_asset(store: &LicenceStore) -> Asset {
        Asset::generic(
            AssetRecord::new(store.get_licence("cc-by-4.0").unwrap().clone())
                .title("Sunset")
                .author(Author::new("Jane Doe"))
                .url("https://example.org/sunset"),
        )
    }

    fn result_for(asset: &Asset, use_case: &str) -> DialogueResult {
        let answers = answer([(KEY_TYPE, use_case.into()), (KEY_FULL_LICENCE, false.into())]);
        DialogueResult::from_answers(asset, &store(), &answers)
    }

    /// Answer every page along the route and the matching dialogue step
    /// together; returns the page reached after the last answer
    fn walk(d: &mut Dialogue, plan: Vec<(&str, AnswerData)>) -> &'static str {
        let mut page = first_page_id(d.asset());
        for (choice, data) in plan {
            assert_eq!(
                d.current_step().map(|s| s.name()),
                step_for_page(page),
                "page {} out of step with the dialogue",
                page
            );
            let index = d.cursor();
            d.complete_step(index, data).unwrap();
            let result = d.get_result();
            page = next_page_id(page, choice, d.asset(), &result).unwrap();
        }
        page
    }

    #[test]
    fn test_first_page_by_licence() {
        let s = store();
        assert_eq!(first_page_id(&complete_asset(&s)), PAGE_TYPE_OF_USE);

        let pd = Asset::generic(AssetRecord::new(s.detect_licence_str("PD-old").unwrap()));
        assert_eq!(first_page_id(&pd), RESULT_NOTE_PD);

        let unknown = Asset::generic(AssetRecord::new(Licence::unknown()));
        assert_eq!(first_page_id(&unknown), RESULT_NOTE_UNSUPPORTED);

        let untitled = Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-4.0").unwrap().clone()).author(Author::new("Jane")),
        );
        assert_eq!(first_page_id(&untitled), PAGE_TITLE);
    }

    #[test]
    fn test_pages_follow_dialogue_through_edited_print_use() {
        let s = Arc::new(store());
        let asset = Asset::generic(
            AssetRecord::new(s.get_licence("cc-by-sa-3.0").unwrap().clone()).title("Sunset"),
        );
        let mut d = Dialogue::new(Arc::new(asset), s);

        let page = walk(
            &mut d,
            vec![
                (ANSWER_NEXT, answer([(KEY_AUTHOR, "Jane Doe".into())])),
                ("print", answer([(KEY_TYPE, "print".into()), (KEY_FULL_LICENCE, true.into())])),
                ("yes", answer([(KEY_EDITED, true.into())])),
                (ANSWER_NEXT, answer([(KEY_CHANGE, "cropped".into())])),
                (ANSWER_NEXT, answer([(KEY_CREATOR, "Bob".into())])),
                (ANSWER_NEXT, answer([(KEY_LICENCE, "cc-by-sa-4.0".into())])),
                ("no", answer([(KEY_COMPILATION, false.into())])),
            ],
        );

        assert_eq!(page, PAGE_PRINT_PLACEMENT);
        assert_eq!(step_for_page(page), None);
        assert!(d.is_done());
        let result = d.get_result();
        assert_eq!(
            next_page_id(page, "adjacent", d.asset(), &result).unwrap(),
            RESULT_SUCCESS
        );
    }

    #[test]
    fn test_pages_follow_dialogue_without_editing() {
        let s = Arc::new(store());
        let asset = Arc::new(complete_asset(&s));
        let mut d = Dialogue::new(asset, s);

        let page = walk(
            &mut d,
            vec![
                ("online", answer([(KEY_TYPE, "online".into()), (KEY_FULL_LICENCE, false.into())])),
                ("no", answer([(KEY_EDITED, false.into())])),
                ("yes", answer([(KEY_COMPILATION, true.into())])),
            ],
        );

        assert_eq!(page, RESULT_SUCCESS);
        assert!(d.is_done());
    }

    #[test]
    fn test_print_placement_only_for_print() {
        let s = store();
        let asset = complete_asset(&s);
        let print = result_for(&asset, "print");
        let online = result_for(&asset, "online");

        assert_eq!(
            next_page_id(PAGE_COMPILATION, "no", &asset, &print).unwrap(),
            PAGE_PRINT_PLACEMENT
        );
        assert_eq!(
            next_page_id(PAGE_COMPILATION, "no", &asset, &online).unwrap(),
            RESULT_SUCCESS
        );
        assert_eq!(
            next_page_id(PAGE_PRINT_PLACEMENT, "separate", &asset, &print).unwrap(),
            RESULT_NOTE_PRINT_CREDITS
        );
    }

    #[test]
    fn test_private_use_ends_immediately() {
        let s = store();
        let asset = complete_asset(&s);
        let result = result_for(&asset, "private");
        let next = next_page_id(PAGE_TYPE_OF_USE, "private", &asset, &result).unwrap();
        assert_eq!(next, RESULT_NOTE_PRIVATE);
        assert!(is_terminal(next));
    }

    #[test]
    fn test_unknown_answer_rejected() {
        let s = store();
        let asset = complete_asset(&s);
        let result = result_for(&asset, "online");
        assert!(matches!(
            next_page_id(PAGE_EDITING, "maybe", &asset, &result),
            Err(AttributionError::InvalidAnswer(_))
        ));
        assert!(next_page_id(RESULT_SUCCESS, ANSWER_NEXT, &asset, &result).is_err());
    }

    #[test]
    fn test_routes_only_move_forward() {
        let position = |p: &str| PAGES.iter().position(|q| *q == p).unwrap();
        for r in ROUTES {
            let targets: Vec<&str> = match r.to {
                Target::Page(p) => vec![p],
                Target::Corrective { after } => CORRECTIVE_PAGES
                    .iter()
                    .skip(after)
                    .copied()
                    .chain([PAGE_TYPE_OF_USE])
                    .collect(),
                Target::ByUseCase => vec![PAGE_PRINT_PLACEMENT, RESULT_SUCCESS],
            };
            for t in targets {
                assert!(
                    position(t) > position(r.page),
                    "route {} --{}--> {} goes backwards",
                    r.page,
                    r.answer,
                    t
                );
            }
        }
    }

    #[test]
    fn test_every_non_terminal_page_has_a_route() {
        for page in PAGES.iter().filter(|p| !is_terminal(p)) {
            assert!(ROUTES.iter().any(|r| r.page == *page), "page {} is a dead end", page);
        }
    }
}
