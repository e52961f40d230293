use super::*;

fn info(current_page: Option<u32>, total: Option<u64>, per_page: Option<u32>) -> PageInfo {
    PageInfo { current_page, total, per_page }
}

#[test]
fn defaults() {
    let state = PaginationState::new();
    assert_eq!(state.current_page(), 1);
    assert_eq!(state.total_pages(), 1);
    assert_eq!(state.total_items(), 0);
    assert_eq!(state.items_per_page(), 10);
    assert!(!state.has_next());
    assert!(!state.has_prev());
}

#[test]
fn update_computes_page_count() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(2), Some(95), Some(10)));

    assert_eq!(state.current_page(), 2);
    assert_eq!(state.total_pages(), 10);
    assert_eq!(state.total_items(), 95);
    assert!(state.has_next());
    assert!(state.has_prev());
}

#[test]
fn zero_total_still_has_one_page() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(None, Some(0), None));
    assert_eq!(state.total_pages(), 1);
    assert_eq!(state.current_page(), 1);
}

#[test]
fn missing_fields_use_defaults() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(3), Some(100), Some(20)));
    state.update_pagination(&PageInfo::default());
    assert_eq!(state, PaginationState::new());
}

#[test]
fn zero_per_page_is_treated_as_missing() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(1), Some(25), Some(0)));
    assert_eq!(state.items_per_page(), 10);
    assert_eq!(state.total_pages(), 3);
}

#[test]
fn reported_page_beyond_total_is_clamped() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(5), Some(20), Some(10)));
    assert_eq!(state.current_page(), 2);
    assert_eq!(state.total_pages(), 2);
}

#[test]
fn page_without_total_is_kept() {
    let mut state = PaginationState::starting_at(3);
    state.update_pagination(&info(Some(3), None, Some(10)));

    assert_eq!(state.current_page(), 3);
    assert_eq!(state.total_pages(), 3);
    assert_eq!(state.total_items(), 0);
    assert!(!state.total_known());
    assert!(state.has_prev());
    assert_eq!(state.position_label(), "page 3");

    assert!(state.prev_page());
    assert_eq!(state.current_page(), 2);
}

#[test]
fn position_label_includes_known_total() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(2), Some(95), Some(10)));
    assert!(state.total_known());
    assert_eq!(state.position_label(), "page 2 of 10 (95 items)");
}

#[test]
fn go_to_page_in_range_changes_only_current_page() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(1), Some(50), Some(10)));
    let before = state;

    assert!(state.go_to_page(4));
    assert_eq!(state.current_page(), 4);
    assert_eq!(state.total_pages(), before.total_pages());
    assert_eq!(state.total_items(), before.total_items());
    assert_eq!(state.items_per_page(), before.items_per_page());
}

#[test]
fn go_to_page_out_of_range_changes_nothing() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(3), Some(50), Some(10)));
    let before = state;

    assert!(!state.go_to_page(0));
    assert!(!state.go_to_page(6));
    assert_eq!(state, before);
}

#[test]
fn next_and_prev_stop_at_bounds() {
    let mut state = PaginationState::new();
    state.update_pagination(&info(Some(1), Some(20), Some(10)));

    assert!(!state.prev_page());
    assert!(state.next_page());
    assert_eq!(state.current_page(), 2);
    assert!(!state.next_page());
    assert!(state.prev_page());
    assert_eq!(state.current_page(), 1);
}

#[test]
fn starting_at_allows_requested_page() {
    let state = PaginationState::starting_at(3);
    assert_eq!(state.current_page(), 3);
    assert!(state.has_prev());
    assert_eq!(PaginationState::starting_at(0).current_page(), 1);
}
