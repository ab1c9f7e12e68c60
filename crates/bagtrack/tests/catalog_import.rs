use bagtrack::kit::{CatalogImportError, ItemCategory, RecommendationCatalog, WeightUnit};

const SHEET: &str = "\
Name,Category,Description,Average Weight,Weight Unit,Essential,Popularity
Water Purifier,Water,Pump filter for untreated water,0.4,kg,yes,9
Compass,Tools,Baseplate compass with lanyard,30,g,yes,6
Trail Mix,Food,Sealed pouch of nuts and dried fruit,200,stone,no,5
Spare Socks,Clothing,Wool blend pair,80,,no,4
";

#[test]
fn spreadsheet_replaces_the_builtin_catalog() {
    let import = RecommendationCatalog::from_reader(SHEET.as_bytes()).expect("sheet loads");

    assert_eq!(
        import.assumed_gram_units, 1,
        "the stone row falls back to grams and is counted"
    );

    let entries = import.catalog.entries();
    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Water Purifier", "Compass", "Trail Mix", "Spare Socks"],
        "entries should rank by popularity"
    );

    let trail_mix = entries
        .iter()
        .find(|entry| entry.name == "Trail Mix")
        .expect("trail mix imported");
    assert_eq!(trail_mix.weight_unit, WeightUnit::Grams);

    let socks = entries
        .iter()
        .find(|entry| entry.name == "Spare Socks")
        .expect("socks imported");
    assert_eq!(
        socks.weight_unit,
        WeightUnit::Grams,
        "a blank unit column reads as grams without being counted as assumed"
    );

    let tools = import.catalog.by_category(ItemCategory::Tools);
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "Compass");

    let essentials = import.catalog.essentials();
    assert!(essentials.iter().all(|entry| entry.is_essential));
    assert_eq!(essentials.len(), 2);
}

#[test]
fn malformed_sheets_are_rejected_with_row_context() {
    let sheet = "\
Name,Category,Description,Average Weight,Weight Unit,Essential,Popularity
Compass,Tools,Baseplate compass,30,g,yes,6
Mystery Box,Surprises,Unknown contents,500,g,no,3
";

    let error = RecommendationCatalog::from_reader(sheet.as_bytes())
        .expect_err("unknown category fails the load");
    match error {
        CatalogImportError::UnknownCategory { row, value } => {
            assert_eq!(row, 3);
            assert_eq!(value, "Surprises");
        }
        other => panic!("unexpected error: {other}"),
    }
}
