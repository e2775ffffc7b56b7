use super::*;

#[test]
fn ticket_filenames_sort_in_timestamp_order() {
    let a = ticket_file_name(1_000, 42);
    let b = ticket_file_name(2_000, 1);
    assert!(a < b, "{a} should sort before {b}");
}

#[test]
fn ticket_filenames_break_ties_on_pid() {
    let a = ticket_file_name(5_000, 10);
    let b = ticket_file_name(5_000, 20);
    assert!(a < b);
}

#[test]
fn ticket_filename_is_twenty_digits_then_pid() {
    let name = ticket_file_name(123, 99);
    let (ts, rest) = name.split_once('-').unwrap();
    assert_eq!(ts.len(), 20);
    assert_eq!(rest, "99.ticket");
}

#[test]
fn registry_filename_roundtrips_fields() {
    let name = registry_file_name(123, 456);
    assert_eq!(name, "123-456.json");
}
