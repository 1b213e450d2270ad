//! Global search broadcaster and the two search strategies views reuse.

use regex::RegexBuilder;

use crate::constants::{DIMMED_OPACITY, FULL_OPACITY, ORIGINAL_TEXT_ATTR};
use crate::router::CurrentViewSlot;
use crate::surface::{ViewSurface, escape};

/// Owns the binding to the single global search input and forwards each edit
/// to whatever callback the CurrentView record holds.
#[derive(Debug, Clone)]
pub struct SearchBroadcaster {
    input_id: String,
    bound: bool,
    term: String,
}

impl SearchBroadcaster {
    pub fn new(input_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
            bound: false,
            term: String::new(),
        }
    }

    /// Binds to the search input. Repeated calls after a successful bind are
    /// no-ops, so at most one binding exists per session. Returns whether the
    /// broadcaster is bound.
    pub fn init(&mut self, surface: &dyn ViewSurface) -> bool {
        if self.bound {
            return true;
        }
        if surface.by_id(&self.input_id).is_none() {
            tracing::debug!(input = %self.input_id, "search input not mounted");
            return false;
        }
        self.bound = true;
        tracing::debug!(input = %self.input_id, "search input bound");
        true
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    /// Last normalized term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Handles an input edit. Returns `true` when a view callback ran.
    pub fn on_input(
        &mut self,
        raw: &str,
        slot: &CurrentViewSlot,
        surface: &mut dyn ViewSurface,
    ) -> bool {
        if !self.bound {
            return false;
        }
        self.term = normalize_term(raw);
        tracing::trace!(term = %self.term, "search input");
        slot.dispatch(surface, &self.term)
    }
}

pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Wraps case-insensitive occurrences of `term` in `<mark>` inside every
/// element matching `selector`. The first call snapshots each element's text;
/// later calls always start from that snapshot, and an empty term restores it.
pub fn highlight(surface: &mut dyn ViewSurface, selector: &str, term: &str) {
    for node in surface.query(selector) {
        let original = match surface.attribute(node, ORIGINAL_TEXT_ATTR) {
            Some(snapshot) => snapshot,
            None => {
                let text = surface.text(node);
                surface.set_attribute(node, ORIGINAL_TEXT_ATTR, &text);
                text
            }
        };
        if term.is_empty() {
            surface.set_text(node, &original);
        } else {
            surface.set_markup(node, &highlight_markup(&original, term));
        }
    }
}

fn highlight_markup(original: &str, term: &str) -> String {
    let pattern = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(err) => {
            tracing::warn!(term, error = %err, "unusable highlight term");
            return escape(original);
        }
    };
    let mut out = String::with_capacity(original.len() + 32);
    let mut last = 0;
    for found in pattern.find_iter(original) {
        out.push_str(&escape(&original[last..found.start()]));
        out.push_str("<mark class='bg-yellow-300'>");
        out.push_str(&escape(found.as_str()));
        out.push_str("</mark>");
        last = found.end();
    }
    out.push_str(&escape(&original[last..]));
    out
}

/// Dims every element matching `selector` whose text does not contain `term`
/// and shows the rest at full opacity.
pub fn filter_list(surface: &mut dyn ViewSurface, selector: &str, term: &str) {
    let needle = term.to_lowercase();
    for node in surface.query(selector) {
        let visible = needle.is_empty() || surface.text(node).to_lowercase().contains(&needle);
        let opacity = if visible { FULL_OPACITY } else { DIMMED_OPACITY };
        surface.set_style(node, "opacity", opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Document;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn list_doc() -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        let app = doc.create_element(root, "div");
        doc.set_markup(
            app,
            "<ul class=\"divide-y\"><li>alpha.example</li><li>Beta &amp; co</li><li>gamma</li></ul>",
        );
        doc
    }

    fn markup_of(doc: &Document, selector: &str) -> Vec<(String, usize)> {
        doc.query(selector)
            .into_iter()
            .map(|node| (doc.text(node), doc.query_within(node, "mark").len()))
            .collect()
    }

    #[test]
    fn normalize_trims_and_folds_case() {
        assert_eq!(normalize_term("  AlPha "), "alpha");
        assert_eq!(normalize_term("   "), "");
    }

    #[test]
    fn init_is_guarded_and_idempotent() {
        let mut doc = Document::new();
        let mut search = SearchBroadcaster::new("globalSearch");
        assert!(!search.init(&doc));
        let root = doc.root();
        let input = doc.create_element(root, "input");
        doc.set_attribute(input, "id", "globalSearch");
        assert!(search.init(&doc));
        assert!(search.init(&doc));
        assert!(search.is_bound());
    }

    #[test]
    fn on_input_delegates_normalized_term() {
        let mut doc = list_doc();
        let root = doc.root();
        let input = doc.create_element(root, "input");
        doc.set_attribute(input, "id", "globalSearch");

        let mut slot = CurrentViewSlot::new();
        let mut search = SearchBroadcaster::new("globalSearch");
        search.init(&doc);
        assert!(!search.on_input("x", &slot, &mut doc));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        slot.replace()
            .install(move |_, term| sink.borrow_mut().push(term.to_string()));
        assert!(search.on_input("  ALPHA ", &slot, &mut doc));
        assert_eq!(seen.borrow().as_slice(), ["alpha"]);
        assert_eq!(search.term(), "alpha");
    }

    #[test]
    fn highlight_is_idempotent_and_round_trips() {
        let mut doc = list_doc();
        let before: Vec<String> = doc.query("li").iter().map(|n| doc.text(*n)).collect();

        highlight(&mut doc, ".divide-y li", "a");
        let once = markup_of(&doc, ".divide-y li");
        highlight(&mut doc, ".divide-y li", "a");
        let twice = markup_of(&doc, ".divide-y li");
        assert_eq!(once, twice);
        assert_eq!(once[0].1, 3);
        assert!(doc.query("mark mark").is_empty());

        highlight(&mut doc, ".divide-y li", "");
        let after: Vec<String> = doc.query("li").iter().map(|n| doc.text(*n)).collect();
        assert_eq!(before, after);
        assert!(doc.query("mark").is_empty());
    }

    #[test]
    fn highlight_treats_term_literally_and_keeps_entities() {
        let mut doc = list_doc();
        highlight(&mut doc, "li", ".");
        let marks = doc.query("mark");
        assert_eq!(marks.len(), 1);
        assert_eq!(doc.text(marks[0]), ".");

        highlight(&mut doc, "li", "&");
        let beta = doc.query("li")[1];
        assert_eq!(doc.text(beta), "Beta & co");
        assert_eq!(doc.query_within(beta, "mark").len(), 1);
    }

    #[test]
    fn filter_list_dims_non_matches_and_resets() {
        let mut doc = list_doc();
        filter_list(&mut doc, "li", "BETA");
        let opacity: Vec<Option<String>> = doc
            .query("li")
            .iter()
            .map(|n| doc.style(*n, "opacity"))
            .collect();
        assert_eq!(
            opacity,
            vec![Some("0.4".into()), Some("1".into()), Some("0.4".into())]
        );

        filter_list(&mut doc, "li", "");
        assert!(
            doc.query("li")
                .iter()
                .all(|n| doc.style(*n, "opacity").as_deref() == Some("1"))
        );
    }
}
