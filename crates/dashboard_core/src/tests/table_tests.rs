use super::*;

fn single_column(cells: &[&str]) -> TableModel {
    TableModel::new(
        vec![ColumnHeader::sortable("value")],
        cells.iter().map(|cell| vec![cell.to_string()]).collect(),
    )
}

fn student_table() -> TableModel {
    let rows = [
        ("Lan", "CNTT1", "8.5"),
        ("An", "CNTT2", "7.0"),
        ("Bình", "CNTT1", "8.5"),
        ("Đức", "KT1", "6.25"),
        ("Châu", "CNTT2", "7.0"),
    ];
    TableModel::new(
        vec![
            ColumnHeader::sortable("Họ tên"),
            ColumnHeader::sortable("Lớp"),
            ColumnHeader::sortable("Điểm"),
            ColumnHeader::fixed("Ghi chú"),
        ],
        rows.iter()
            .map(|(name, class, score)| {
                vec![
                    name.to_string(),
                    class.to_string(),
                    score.to_string(),
                    String::new(),
                ]
            })
            .collect(),
    )
}

fn names(table: &TableModel) -> Vec<&str> {
    table.column(0)
}

#[test]
fn numeric_column_sorts_by_value_not_text() {
    let mut table = single_column(&["10", "2", "33"]);
    assert_eq!(table.sort_by(0), Ok(SortDirection::Ascending));
    assert_eq!(table.column(0), vec!["2", "10", "33"]);
}

#[test]
fn text_column_sorts_case_insensitively() {
    let mut table = single_column(&["Banana", "apple", "Cherry"]);
    table.sort_by(0).expect("sort");
    assert_eq!(table.column(0), vec!["apple", "Banana", "Cherry"]);
}

#[test]
fn mixed_column_falls_back_to_text_for_every_cell() {
    let mut table = single_column(&["10", "9", "n/a", "100"]);
    table.sort_by(0).expect("sort");
    assert_eq!(table.column(0), vec!["10", "100", "9", "n/a"]);
}

#[test]
fn numeric_prefix_is_used_for_decorated_cells() {
    let mut table = single_column(&["85.5%", "9%", "100%"]);
    table.sort_by(0).expect("sort");
    assert_eq!(table.column(0), vec!["9%", "85.5%", "100%"]);
}

#[test]
fn vietnamese_names_follow_the_vietnamese_alphabet() {
    let mut table = single_column(&["Đức", "Dũng", "Ánh", "Bảo"]);
    table.sort_by(0).expect("sort");
    assert_eq!(table.column(0), vec!["Ánh", "Bảo", "Dũng", "Đức"]);
}

#[test]
fn modified_letters_sort_after_their_base_letter() {
    let mut table = single_column(&["Đức", "Dũng", "ăn", "az", "á", "ả"]);
    table.sort_by(0).expect("sort");
    assert_eq!(
        table.column(0),
        vec!["ả", "á", "az", "ăn", "Dũng", "Đức"]
    );
}

#[test]
fn tones_break_ties_in_vietnamese_order() {
    let mut table = single_column(&["mạ", "má", "mã", "mả", "mà", "ma"]);
    table.sort_by(0).expect("sort");
    assert_eq!(
        table.column(0),
        vec!["ma", "mà", "mả", "mã", "má", "mạ"]
    );
}

#[test]
fn repeated_click_toggles_and_reverses_keeping_ties_stable() {
    let mut table = student_table();

    assert_eq!(table.sort_by(2), Ok(SortDirection::Ascending));
    assert_eq!(names(&table), vec!["Đức", "An", "Châu", "Lan", "Bình"]);

    assert_eq!(table.sort_by(2), Ok(SortDirection::Descending));
    assert_eq!(names(&table), vec!["Lan", "Bình", "An", "Châu", "Đức"]);

    assert_eq!(table.sort_by(2), Ok(SortDirection::Ascending));
    assert_eq!(names(&table), vec!["Đức", "An", "Châu", "Lan", "Bình"]);
}

#[test]
fn sorting_another_column_clears_the_previous_indicator() {
    let mut table = student_table();
    table.sort_by(0).expect("sort names");
    table.sort_by(2).expect("sort scores");

    assert_eq!(table.headers()[0].direction(), SortDirection::None);
    assert_eq!(table.headers()[2].direction(), SortDirection::Ascending);
    assert_eq!(table.active_sort(), Some((2, SortDirection::Ascending)));
}

#[test]
fn first_click_on_a_new_column_is_ascending_even_after_descending_elsewhere() {
    let mut table = student_table();
    table.sort_by(1).expect("asc");
    table.sort_by(1).expect("desc");
    assert_eq!(table.sort_by(0), Ok(SortDirection::Ascending));
    assert_eq!(table.headers()[1].direction(), SortDirection::None);
}

#[test]
fn rows_are_reordered_not_rewritten() {
    let mut table = student_table();
    let mut before = table.rows().to_vec();
    table.sort_by(1).expect("sort");
    let mut after = table.rows().to_vec();
    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn out_of_range_column_is_rejected_without_state_change() {
    let mut table = student_table();
    table.sort_by(0).expect("sort");
    let snapshot = table.clone();

    assert_eq!(
        table.sort_by(7),
        Err(TableError::ColumnOutOfRange {
            column: 7,
            columns: 4
        })
    );
    assert_eq!(table, snapshot);
}

#[test]
fn non_sortable_header_is_rejected() {
    let mut table = student_table();
    assert_eq!(table.sort_by(3), Err(TableError::NotSortable { column: 3 }));
    assert_eq!(table.active_sort(), None);
}

#[test]
fn empty_table_is_a_no_op() {
    let mut table = TableModel::new(vec![ColumnHeader::sortable("x")], Vec::new());
    assert_eq!(table.sort_by(0), Ok(SortDirection::None));
    assert_eq!(table.active_sort(), None);
}

#[test]
fn short_rows_sort_as_empty_text() {
    let mut table = TableModel::new(
        vec![ColumnHeader::sortable("a"), ColumnHeader::sortable("b")],
        vec![
            vec!["1".into(), "beta".into()],
            vec!["2".into()],
            vec!["3".into(), "alpha".into()],
        ],
    );
    table.sort_by(1).expect("sort");
    assert_eq!(table.column(0), vec!["2", "3", "1"]);
}

#[test]
fn leading_number_parsing_matches_browser_semantics() {
    assert_eq!(parse_leading_number("  42 "), Some(42.0));
    assert_eq!(parse_leading_number("-3.5kg"), Some(-3.5));
    assert_eq!(parse_leading_number(".5"), Some(0.5));
    assert_eq!(parse_leading_number("1e3x"), Some(1000.0));
    assert_eq!(parse_leading_number("7e"), Some(7.0));
    assert_eq!(parse_leading_number("abc"), None);
    assert_eq!(parse_leading_number("-"), None);
    assert_eq!(parse_leading_number(""), None);
}

#[test]
fn locale_ordering_puts_lowercase_before_uppercase_on_ties() {
    assert_eq!(locale_cmp("apple", "Apple"), Ordering::Less);
    assert_eq!(locale_cmp("an", "Án"), Ordering::Less);
    assert_eq!(locale_cmp("Zebra", "ant"), Ordering::Greater);
    assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    assert_eq!(locale_cmp("ơn", "ôm"), Ordering::Greater);
    assert_eq!(locale_cmp("ưa", "uz"), Ordering::Greater);
}
