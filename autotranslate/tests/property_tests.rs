use autotranslate::{
    MergeOptions, StringRecord, StringTable, StringTableFormat, escape, merge_tables,
    traits::Parser, unescape,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][A-Z0-9_.]{0,10}").expect("valid name regex")
}

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ,.!?'-]{0,12}").expect("valid text regex")
}

/// Text interleaved with `{NAME}` tokens.
fn templated_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((text_strategy(), prop::option::of(name_strategy())), 0..6).prop_map(
        |parts| {
            parts
                .into_iter()
                .map(|(text, name)| match name {
                    Some(name) => format!("{}{{{}}}", text, name),
                    None => text,
                })
                .collect()
        },
    )
}

fn id_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,8}").expect("valid id regex")
}

fn records_strategy() -> impl Strategy<Value = BTreeMap<String, (String, String)>> {
    prop::collection::btree_map(id_strategy(), (text_strategy(), text_strategy()), 0..8)
}

fn build_table(values: &BTreeMap<String, (String, String)>) -> StringTable {
    let mut table = StringTable::new("Deutsch");
    table.records = values
        .iter()
        .map(|(id, (text, original))| StringRecord::new(id, text).with_original(original))
        .collect();
    table
}

fn to_xml(table: &StringTable) -> Vec<u8> {
    let mut out = Vec::new();
    StringTableFormat::from(table.clone())
        .to_writer(&mut out)
        .expect("serialize table");
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placeholder_escape_round_trips(s in templated_strategy()) {
        let (escaped, set) = escape(&s);
        prop_assert_eq!(unescape(&escaped, &set), s);
    }

    #[test]
    fn placeholder_escape_hides_names(s in templated_strategy()) {
        let (escaped, set) = escape(&s);
        for name in set.iter() {
            if name.parse::<usize>().is_err() {
                let token = format!("{{{}}}", name);
                prop_assert!(!escaped.contains(&token));
            }
        }
    }

    #[test]
    fn default_merge_never_changes_existing_text(
        source in records_strategy(),
        target in records_strategy(),
    ) {
        let source = build_table(&source);
        let mut merged = build_table(&target);
        let before = merged.clone();

        merge_tables(&source, &mut merged, &MergeOptions::new());

        for record in &before.records {
            let after = merged.find_record(&record.id).expect("target record kept");
            prop_assert_eq!(&after.text, &record.text);
        }
    }

    #[test]
    fn merge_keeps_target_order_and_appends_new_ids(
        source in records_strategy(),
        target in records_strategy(),
    ) {
        let source = build_table(&source);
        let mut merged = build_table(&target);
        let before: Vec<String> = merged.records.iter().map(|r| r.id.clone()).collect();

        merge_tables(&source, &mut merged, &MergeOptions::new());

        let ids: Vec<String> = merged.records.iter().map(|r| r.id.clone()).collect();
        prop_assert_eq!(&ids[..before.len()], &before[..]);
        let appended: Vec<String> = source
            .records
            .iter()
            .filter(|r| !before.contains(&r.id))
            .map(|r| r.id.clone())
            .collect();
        prop_assert_eq!(&ids[before.len()..], &appended[..]);
    }

    #[test]
    fn merge_is_idempotent(
        source in records_strategy(),
        target in records_strategy(),
        update_original in any::<bool>(),
        update_changed in any::<bool>(),
    ) {
        let options = MergeOptions::new()
            .with_update_original(update_original)
            .with_update_changed(update_changed);
        let source = build_table(&source);
        let mut merged = build_table(&target);

        merge_tables(&source, &mut merged, &options);
        let first = to_xml(&merged);

        let report = merge_tables(&source, &mut merged, &options);
        prop_assert!(report.events.is_empty());
        prop_assert_eq!(to_xml(&merged), first);
    }
}
