//! Reference resolution.
//!
//! Replaces the catalog indices a model emitted with the caller's own activity
//! records. Indices that are not integers in `0..catalog.len()` are dropped
//! from their section; every other field of the section is carried through
//! unchanged.

use crate::schema::{ActivityRef, ItineraryDraft, SectionDraft};
use crate::types::{ActivityRecord, ItineraryResponse, ItinerarySection};
use tracing::debug;

/// Resolve every section of `draft` against `catalog`. Total: never fails.
pub fn resolve_itinerary(draft: ItineraryDraft, catalog: &[ActivityRecord]) -> ItineraryResponse {
    let sections = draft
        .sections
        .into_iter()
        .map(|section| resolve_section(section, catalog))
        .collect();
    ItineraryResponse { sections }
}

fn resolve_section(section: SectionDraft, catalog: &[ActivityRecord]) -> ItinerarySection {
    let SectionDraft {
        trip_id,
        name,
        description,
        start_date,
        end_date,
        budget,
        activity_refs,
    } = section;

    let activities = activity_refs
        .iter()
        .filter_map(|reference| {
            let record = lookup(reference, catalog);
            if record.is_none() {
                debug!(
                    section = %name,
                    activity_index = %reference.activity_index,
                    catalog_len = catalog.len(),
                    "Dropping out-of-range activity reference"
                );
            }
            record.cloned()
        })
        .collect();

    ItinerarySection {
        trip_id,
        name,
        description,
        start_date,
        end_date,
        budget,
        activities,
    }
}

fn lookup<'a>(reference: &ActivityRef, catalog: &'a [ActivityRecord]) -> Option<&'a ActivityRecord> {
    reference.position().and_then(|index| catalog.get(index))
}
