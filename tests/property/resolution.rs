//! Property-based tests for catalog reference resolution

use itinera::resolve::resolve_itinerary;
use itinera::schema::{ActivityRef, ItineraryDraft, SectionDraft};
use itinera::types::ActivityRecord;
use proptest::prelude::*;

fn catalog(size: usize) -> Vec<ActivityRecord> {
    (0..size)
        .map(|i| ActivityRecord::new(format!("Activity {}", i), "city-1").with_id(format!("id-{}", i)))
        .collect()
}

fn section(indices: &[i64]) -> SectionDraft {
    SectionDraft {
        trip_id: "trip-1".to_string(),
        name: "Day".to_string(),
        description: "A day".to_string(),
        start_date: "2024-05-01".to_string(),
        end_date: "2024-05-01".to_string(),
        budget: Some(10.0),
        activity_refs: indices
            .iter()
            .map(|&activity_index| ActivityRef::new(activity_index))
            .collect(),
    }
}

proptest! {
    /// In-range references resolve to exactly the referenced entries, in order.
    #[test]
    fn test_index_round_trip(
        (size, indices) in (1usize..20).prop_flat_map(|n| {
            (Just(n), proptest::collection::vec(0..n as i64, 0..30))
        })
    ) {
        let catalog = catalog(size);
        let draft = ItineraryDraft { sections: vec![section(&indices)] };

        let response = resolve_itinerary(draft, &catalog);

        let expected: Vec<ActivityRecord> =
            indices.iter().map(|&i| catalog[i as usize].clone()).collect();
        prop_assert_eq!(&response.sections[0].activities, &expected);
    }

    /// Out-of-range references vanish; everything else survives in order.
    #[test]
    fn test_out_of_range_references_are_dropped(
        size in 0usize..10,
        indices in proptest::collection::vec(-5i64..15, 0..30),
    ) {
        let catalog = catalog(size);
        let draft = ItineraryDraft { sections: vec![section(&indices)] };

        let response = resolve_itinerary(draft, &catalog);

        let expected: Vec<ActivityRecord> = indices
            .iter()
            .filter(|&&i| i >= 0 && (i as usize) < size)
            .map(|&i| catalog[i as usize].clone())
            .collect();
        prop_assert_eq!(response.sections.len(), 1);
        prop_assert_eq!(&response.sections[0].activities, &expected);
        prop_assert_eq!(response.sections[0].budget, Some(10.0));
        prop_assert_eq!(&response.sections[0].name, "Day");
    }
}
