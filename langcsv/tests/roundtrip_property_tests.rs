use langcsv::{ExportOptions, FormatType, ImportOptions, TranslationTree, export, import};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::TempDir;

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _\\-\\.,!\\?'\"\\\\é]{0,30}").expect("valid value regex")
}

/// Two-level trees: `section.key => value`.
fn tree_strategy() -> impl Strategy<Value = TranslationTree> {
    prop::collection::btree_map(
        key_strategy(),
        prop::collection::btree_map(key_strategy(), value_strategy(), 1..5),
        1..5,
    )
    .prop_map(|sections: BTreeMap<String, BTreeMap<String, String>>| {
        let mut tree = TranslationTree::new();
        for (section, entries) in sections {
            for (key, value) in entries {
                tree.set_dotted(&format!("{}.{}", section, key), value);
            }
        }
        tree
    })
}

fn export_then_import(tree: &TranslationTree, format: FormatType) -> TranslationTree {
    let tmp = TempDir::new().unwrap();
    let lang = tmp.path().join("lang");
    let csv = tmp.path().join("translations.csv");
    let source = lang.join(format!("en/messages.{}", format.extension()));
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    format.save_tree(&source, tree.clone()).unwrap();

    export(&ExportOptions::new(&lang, &csv).with_formats(vec![format])).unwrap();
    let out = tmp.path().join("out");
    import(&ImportOptions::new(&csv, &out).with_format(format)).unwrap();

    format
        .load_tree(&out.join(format!("en/messages.{}", format.extension())))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_php_round_trip(tree in tree_strategy()) {
        prop_assert_eq!(export_then_import(&tree, FormatType::Php), tree);
    }

    #[test]
    fn prop_json_round_trip(tree in tree_strategy()) {
        prop_assert_eq!(export_then_import(&tree, FormatType::Json), tree);
    }
}
