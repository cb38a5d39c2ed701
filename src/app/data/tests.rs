use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;

fn hour(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
}

fn selected_id(data: &Data) -> Option<&str> {
    data.selected_record().map(|x| x.connection_id())
}

/// One record per hour from 05:00 to 09:00 with ids "r5" to "r9"
#[fixture]
fn data() -> Data {
    let input: Vec<String> = (5..10)
        .map(|h| {
            format!(
                "{}\tr{h}\t10.0.0.1\t1000\t10.0.0.2\t80\t-\tGET\t10.0.0.2\t/\t-\t-\t0\t0\t200",
                hour(h).timestamp()
            )
        })
        .collect();
    let collection = LogCollection::from_reader(input.join("\n").as_bytes()).unwrap();
    Data::from(collection)
}

#[rstest]
fn filter_changes_visible_rows(mut data: Data) {
    data.apply_filter(TimeRange::new(Some(hour(6)), Some(hour(8))));
    assert!(data.is_filtered());
    assert_eq!(data.len(), 3);
    assert_eq!(data.total_len_unfiltered(), 5);
    assert_eq!(data.row(0).map(|x| x.connection_id()), Some("r6"));
    assert_eq!(data.row(3), None);

    data.unfilter();
    assert!(!data.is_filtered());
    assert_eq!(data.len(), 5);
}

#[rstest]
fn unbounded_filter_is_not_a_filter(mut data: Data) {
    data.apply_filter(TimeRange::default());
    assert!(!data.is_filtered());
    assert_eq!(data.applied_range(), None);
}

#[rstest]
fn selected_maintenance_with_filtering(mut data: Data) {
    data.selected_row = Some(2);
    assert_eq!(selected_id(&data), Some("r7"));

    data.apply_filter(TimeRange::new(Some(hour(7)), None));
    assert_eq!(data.selected_row, Some(0));
    assert_eq!(selected_id(&data), Some("r7"));

    data.unfilter();
    assert_eq!(data.selected_row, Some(2));
    assert_eq!(selected_id(&data), Some("r7"));
}

#[rstest]
fn selected_unselected_when_not_present(mut data: Data) {
    data.selected_row = Some(2);
    data.apply_filter(TimeRange::new(None, Some(hour(6))));
    assert_eq!(data.selected_row, None);
    assert_eq!(selected_id(&data), None);
}

#[rstest]
fn navigation_stops_at_the_ends(mut data: Data) {
    assert!(!data.has_prev());
    assert!(data.has_next());

    data.move_selected_to_next();
    assert_eq!(selected_id(&data), Some("r5"));
    data.move_selected_to_prev();
    assert_eq!(selected_id(&data), Some("r5"));

    data.move_selected_to_last();
    assert_eq!(selected_id(&data), Some("r9"));
    assert!(!data.has_next());
    data.move_selected_to_next();
    assert_eq!(selected_id(&data), Some("r9"));

    data.move_selected_to_prev();
    assert_eq!(selected_id(&data), Some("r8"));
    data.move_selected_to_first();
    assert_eq!(selected_id(&data), Some("r5"));
}

#[rstest]
fn navigation_within_filtered_rows(mut data: Data) {
    data.apply_filter(TimeRange::new(Some(hour(8)), None));
    data.move_selected_to_first();
    assert_eq!(selected_id(&data), Some("r8"));
    data.move_selected_to_next();
    assert_eq!(selected_id(&data), Some("r9"));
    assert!(!data.has_next());
}

#[test]
fn navigation_on_empty_data() {
    let mut data = Data::default();
    assert!(!data.has_next());
    data.move_selected_to_next();
    data.move_selected_to_last();
    data.move_selected_to_first();
    assert_eq!(data.selected_row, None);
}
