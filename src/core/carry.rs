//! Three-way carry of source-language changes into a translation
//!
//! Given the previous source container (`base`), the new source container
//! (`updated`) and the current translation, the engine decides for every
//! identifier of `updated` whether the translation must take the new text.
//! Unchanged identifiers keep whatever a translator put there.
//!
//! An identifier is carried when it is absent from `base`, or when its base
//! and updated texts differ. Values in the "empty" class (missing, sentinel,
//! `""`, and configured markers such as `[ERROR]`) compare equal, so a base
//! identifier that is blank on both sides is never carried.

use crate::config::CarryConfig;
use crate::container::{is_blank, Container, Lookup};
use crate::notation::{Marker, Overrides, ReportRecord};
use tracing::debug;

/// What happens to one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    /// Source text did not change; translation is left alone
    Unchanged,
    /// Translation takes the updated source text
    ReplacedFromUpdate,
    /// Translation takes a manual override
    ReplacedFromOverride,
    /// Identifier does not exist in the translation yet and is added
    NewlyAppended,
}

/// Per-identifier outcome; `None` values are missing or sentinel entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub id: u32,
    pub kind: DecisionKind,
    pub old_source: Option<String>,
    pub new_source: Option<String>,
    pub old_translation: Option<String>,
    /// Value the translation ends up with
    pub chosen: Option<String>,
}

impl Decision {
    pub fn is_change(&self) -> bool {
        self.kind != DecisionKind::Unchanged
    }
}

/// Decisions for one file, in ascending identifier order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarryPlan {
    pub decisions: Vec<Decision>,
    /// The updated source holds more entries than the translation
    pub grew: bool,
    /// Arena size the translation is grown to on merge
    pub target_slots: usize,
}

impl CarryPlan {
    pub fn changes(&self) -> impl Iterator<Item = &Decision> + '_ {
        self.decisions.iter().filter(|d| d.is_change())
    }

    pub fn change_count(&self) -> usize {
        self.changes().count()
    }

    /// Nothing to write: no identifier changes and no growth
    pub fn is_noop(&self) -> bool {
        !self.grew && self.change_count() == 0
    }
}

/// Carry engine configured with the empty-marker set and override policy
#[derive(Debug, Clone)]
pub struct CarryEngine {
    empty_markers: Vec<String>,
    apply_stray_overrides: bool,
}

impl Default for CarryEngine {
    fn default() -> Self {
        Self::new(&CarryConfig::default())
    }
}

impl CarryEngine {
    pub fn new(config: &CarryConfig) -> Self {
        CarryEngine {
            empty_markers: config.empty_markers.clone(),
            apply_stray_overrides: config.apply_stray_overrides,
        }
    }

    fn blank(&self, value: Lookup<'_>) -> bool {
        is_blank(value, &self.empty_markers)
    }

    fn blank_text(&self, value: Option<&str>) -> bool {
        self.blank(value.map_or(Lookup::Null, Lookup::Text))
    }

    /// Whether the source text of `id` changed between `base` and `updated`
    pub fn source_changed(&self, base: &Container, updated: &Container, id: u32) -> bool {
        let old = base.lookup(id);
        if old.is_missing() {
            return true;
        }
        let new = updated.lookup(id);
        if self.blank(old) && self.blank(new) {
            return false;
        }
        old.as_str() != new.as_str()
    }

    /// Decide every identifier of `updated`
    ///
    /// A non-empty override always wins over the updated source text; an
    /// empty override counts as no override.
    pub fn plan(
        &self,
        base: &Container,
        updated: &Container,
        translation: &Container,
        overrides: Option<&Overrides>,
    ) -> CarryPlan {
        let override_for = |id: u32| {
            overrides
                .and_then(|o| o.get(&id))
                .filter(|text| !text.is_empty())
        };

        let mut decisions = Vec::with_capacity(updated.len());
        for (id, new_source) in updated.iter() {
            let old_translation = to_owned(translation.lookup(id));
            let old_source = to_owned(base.lookup(id));

            if !self.source_changed(base, updated, id) {
                decisions.push(Decision {
                    id,
                    kind: DecisionKind::Unchanged,
                    old_source,
                    new_source: new_source.map(str::to_string),
                    chosen: old_translation.clone(),
                    old_translation,
                });
                continue;
            }

            let (kind, chosen) = match override_for(id) {
                Some(text) => (DecisionKind::ReplacedFromOverride, Some(text.clone())),
                None if !translation.contains(id) => {
                    (DecisionKind::NewlyAppended, new_source.map(str::to_string))
                }
                None => (
                    DecisionKind::ReplacedFromUpdate,
                    new_source.map(str::to_string),
                ),
            };

            debug!("Carry id {}: {:?}", id, kind);
            decisions.push(Decision {
                id,
                kind,
                old_source,
                new_source: new_source.map(str::to_string),
                old_translation,
                chosen,
            });
        }

        if self.apply_stray_overrides {
            self.plan_stray_overrides(updated, translation, overrides, &mut decisions);
        }

        CarryPlan {
            decisions,
            grew: translation.slot_count() < updated.slot_count(),
            target_slots: updated.slot_count(),
        }
    }

    /// Overrides for identifiers the source change did not touch
    fn plan_stray_overrides(
        &self,
        updated: &Container,
        translation: &Container,
        overrides: Option<&Overrides>,
        decisions: &mut Vec<Decision>,
    ) {
        let Some(overrides) = overrides else {
            return;
        };

        let mut appended = Vec::new();
        for (&id, text) in overrides {
            if text.is_empty() {
                continue;
            }
            let current = translation.lookup(id);
            if current == Lookup::Text(text) {
                continue;
            }

            match decisions.binary_search_by_key(&id, |d| d.id) {
                Ok(at) if decisions[at].is_change() => continue,
                Ok(at) => {
                    decisions[at].kind = DecisionKind::ReplacedFromOverride;
                    decisions[at].chosen = Some(text.clone());
                }
                Err(_) => appended.push(Decision {
                    id,
                    kind: DecisionKind::ReplacedFromOverride,
                    old_source: None,
                    new_source: to_owned(updated.lookup(id)),
                    old_translation: to_owned(current),
                    chosen: Some(text.clone()),
                }),
            }
            debug!("Stray override for id {}", id);
        }

        if !appended.is_empty() {
            decisions.extend(appended);
            decisions.sort_by_key(|d| d.id);
        }
    }

    /// Merge mode: write every change into `translation`
    ///
    /// Returns the number of identifiers written.
    pub fn apply(&self, plan: &CarryPlan, translation: &mut Container) -> usize {
        translation.extend_to(plan.target_slots);

        let mut written = 0;
        for decision in plan.changes() {
            match &decision.chosen {
                Some(text) => translation.set(decision.id, text.clone()),
                None => translation.set_null(decision.id),
            }
            written += 1;
        }
        written
    }

    /// Report mode: review records for every changed identifier
    ///
    /// `<` is omitted when the old source is blank, `-` when the translation
    /// is blank. `>` and the `=` fill line are emitted only when the new
    /// source has text to translate.
    pub fn report(&self, plan: &CarryPlan) -> Vec<ReportRecord> {
        let mut records = Vec::new();

        for decision in plan.changes() {
            let id = decision.id;
            if !self.blank_text(decision.old_source.as_deref()) {
                records.push(ReportRecord::new(
                    Marker::OldSource,
                    id,
                    decision.old_source.as_deref().unwrap_or_default(),
                ));
            }

            let has_new = !self.blank_text(decision.new_source.as_deref());
            if has_new {
                records.push(ReportRecord::new(
                    Marker::NewSource,
                    id,
                    decision.new_source.as_deref().unwrap_or_default(),
                ));
            }

            if !self.blank_text(decision.old_translation.as_deref()) {
                records.push(ReportRecord::new(
                    Marker::Translation,
                    id,
                    decision.old_translation.as_deref().unwrap_or_default(),
                ));
            }

            if has_new {
                records.push(ReportRecord::new(Marker::Fill, id, ""));
            }
        }

        records
    }
}

fn to_owned(value: Lookup<'_>) -> Option<String> {
    match value {
        Lookup::Text(text) => Some(text.to_string()),
        Lookup::Missing | Lookup::Null => None,
    }
}
