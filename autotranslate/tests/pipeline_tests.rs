use autotranslate::{
    Error, MergeEvent, MergeOptions, MergeOutcome, Progress, StringTable, TranslateOptions,
    target_path_for, translate_file,
};
use indoc::indoc;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <base xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" type="string">
      <tags>
        <tag language="English" />
      </tags>
      <strings>
        <string id="s1" text="Hello {PLAYER}" />
        <string id="s2" text="Goodbye" />
        <string id="blank" text="" />
      </strings>
    </base>
"#};

/// Canned translations keyed by escaped input.
fn canned(texts: &[String], _: &str, _: &str) -> Result<Vec<String>, Error> {
    Ok(texts
        .iter()
        .map(|t| match t.as_str() {
            "Hello {0}" => "Bonjour {0}".to_string(),
            "Goodbye" => "Au revoir".to_string(),
            other => format!("fr:{}", other),
        })
        .collect())
}

fn offline(_: &[String], _: &str, _: &str) -> Result<Vec<String>, Error> {
    Err(Error::gateway_error("network unreachable", None))
}

fn setup(source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("std_strings.xml");
    fs::write(&path, source).unwrap();
    (dir, path)
}

fn french() -> TranslateOptions {
    TranslateOptions::new("Français", "fr")
}

fn run(path: &Path, options: &TranslateOptions) -> Result<autotranslate::FileReport, Error> {
    translate_file(path, options, &canned, |_| {})
}

#[test]
fn test_translates_into_new_target() {
    let (dir, source) = setup(SOURCE);

    let report = run(&source, &french()).unwrap();

    let target = dir.path().join("FR").join("std_strings-FR.xml");
    assert_eq!(report.target, target);
    assert_eq!(report.translated, 2);
    assert_eq!(report.merge.outcome, MergeOutcome::Created);

    let table = StringTable::read_from(&target).unwrap();
    assert_eq!(table.metadata.language, "Français");
    assert_eq!(
        table.metadata.root_attributes.get("type").map(String::as_str),
        Some("string")
    );
    let ids: Vec<&str> = table.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "blank"]);
    let s1 = table.find_record("s1").unwrap();
    assert_eq!(s1.text, "Bonjour {PLAYER}");
    assert_eq!(s1.original.as_deref(), Some("Hello {PLAYER}"));
    let blank = table.find_record("blank").unwrap();
    assert_eq!(blank.text, "");
    assert_eq!(blank.original, None);
}

#[test]
fn test_existing_target_without_flags_is_skipped() {
    let (_dir, source) = setup(SOURCE);
    run(&source, &french()).unwrap();

    let calls = RefCell::new(0);
    let counting = |texts: &[String], s: &str, t: &str| {
        *calls.borrow_mut() += 1;
        canned(texts, s, t)
    };
    let err = translate_file(&source, &french(), &counting, |_| {}).unwrap_err();

    assert!(matches!(err, Error::AlreadyExists(_)));
    assert!(err.is_skip());
    assert_eq!(*calls.borrow(), 0, "no translation before the existence check");
}

#[test]
fn test_manual_edits_survive_default_merge() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(
        &target,
        indoc! {r#"
            <base type="string">
              <tags><tag language="Français" /></tags>
              <strings>
                <string id="legacy" text="Ancien" original="Old" />
                <string id="s1" text="Salut {PLAYER} !" original="Hello {PLAYER}" />
              </strings>
            </base>
        "#},
    )
    .unwrap();

    let options = french().with_merge(MergeOptions::new().with_update_original(true));
    let report = run(&source, &options).unwrap();

    assert_eq!(report.merge.outcome, MergeOutcome::Merged);
    assert_eq!(
        report.merge.events,
        vec![
            MergeEvent::Added {
                id: "s2".to_string(),
                text: "Au revoir".to_string(),
                original: Some("Goodbye".to_string()),
            },
            MergeEvent::Added {
                id: "blank".to_string(),
                text: String::new(),
                original: None,
            },
        ]
    );

    let table = StringTable::read_from(&target).unwrap();
    let ids: Vec<&str> = table.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["legacy", "s1", "s2", "blank"]);
    assert_eq!(table.find_record("s1").unwrap().text, "Salut {PLAYER} !");
}

#[test]
fn test_changed_source_detected_with_update_original() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(
        &target,
        r#"<base><tags><tag language="Français"/></tags><strings><string id="s2" text="Adieu" original="Bye"/></strings></base>"#,
    )
    .unwrap();

    let options = french().with_merge(MergeOptions::new().with_update_original(true));
    let report = run(&source, &options).unwrap();

    assert!(report.merge.events.contains(&MergeEvent::UpdatedOriginal {
        id: "s2".to_string(),
        old: Some("Bye".to_string()),
        new: Some("Goodbye".to_string()),
    }));
    let table = StringTable::read_from(&target).unwrap();
    let s2 = table.find_record("s2").unwrap();
    assert_eq!(s2.text, "Adieu");
    assert_eq!(s2.original.as_deref(), Some("Goodbye"));
}

#[test]
fn test_replace_discards_manual_edits() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(
        &target,
        r#"<base><tags><tag language="Français"/></tags><strings><string id="s1" text="Manual" original="Hello {PLAYER}"/><string id="legacy" text="x"/></strings></base>"#,
    )
    .unwrap();

    let options = french().with_merge(MergeOptions::new().with_replace(true));
    let report = run(&source, &options).unwrap();
    assert_eq!(report.merge.outcome, MergeOutcome::Replaced);

    let table = StringTable::read_from(&target).unwrap();
    let ids: Vec<&str> = table.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "blank"]);
    assert_eq!(table.find_record("s1").unwrap().text, "Bonjour {PLAYER}");
}

#[test]
fn test_target_without_strings_section_is_overwritten() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, r#"<base><tags><tag language="Français"/></tags></base>"#).unwrap();

    let options = french().with_merge(MergeOptions::new().with_update_original(true));
    let report = run(&source, &options).unwrap();

    assert_eq!(report.merge.outcome, MergeOutcome::ReplacedUnrecognized);
    assert_eq!(StringTable::read_from(&target).unwrap().records.len(), 3);
}

#[test]
fn test_malformed_target_is_not_overwritten() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    let broken = "<base><strings><string id=\"a\" text=\"x\"></base>";
    fs::write(&target, broken).unwrap();

    let options = french().with_merge(MergeOptions::new().with_update_changed(true));
    assert!(run(&source, &options).is_err());
    assert_eq!(fs::read_to_string(&target).unwrap(), broken);
}

#[test]
fn test_gateway_failure_writes_nothing() {
    let (dir, source) = setup(SOURCE);

    let err = translate_file(&source, &french(), &offline, |_| {}).unwrap_err();

    assert!(matches!(err, Error::Gateway { .. }));
    assert!(!err.is_skip());
    assert!(!dir.path().join("FR").exists());
}

#[test]
fn test_gateway_failure_leaves_existing_target_untouched() {
    let (_dir, source) = setup(SOURCE);
    let target = target_path_for(&source, "FR");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    let before = r#"<base><tags><tag language="Français"/></tags><strings><string id="s1" text="Manual"/></strings></base>"#;
    fs::write(&target, before).unwrap();

    let options = french().with_merge(MergeOptions::new().with_replace(true));
    assert!(translate_file(&source, &options, &offline, |_| {}).is_err());
    assert_eq!(fs::read_to_string(&target).unwrap(), before);
}

#[test]
fn test_empty_input_is_skipped() {
    let (_dir, source) = setup(indoc! {r#"
        <base>
          <tags><tag language="English" /></tags>
          <strings>
            <string id="a" text="   " />
          </strings>
        </base>
    "#});

    let err = run(&source, &french()).unwrap_err();
    assert!(matches!(err, Error::EmptyInput(_)));
    assert!(err.is_skip());
}

#[test]
fn test_source_missing_sections_is_fatal() {
    let (_dir, source) = setup(r#"<base><strings><string id="a" text="A"/></strings></base>"#);
    let err = run(&source, &french()).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
    assert!(!err.is_skip());
}

#[test]
fn test_subdir_override_and_dry_run() {
    let (dir, source) = setup(SOURCE);
    let options = french()
        .with_subdir(Some("FRA".to_string()))
        .with_dry_run(true);

    let report = run(&source, &options).unwrap();

    assert_eq!(report.target, dir.path().join("FRA").join("std_strings-FRA.xml"));
    assert!(!report.written);
    assert!(!report.target.exists());
}

#[test]
fn test_second_run_changes_nothing() {
    let (_dir, source) = setup(SOURCE);
    let options = french().with_merge(MergeOptions::new().with_update_original(true));

    run(&source, &options).unwrap();
    let target = target_path_for(&source, "FR");
    let first = fs::read_to_string(&target).unwrap();

    let report = run(&source, &options).unwrap();
    assert!(report.merge.events.is_empty());
    assert_eq!(fs::read_to_string(&target).unwrap(), first);
}

#[test]
fn test_progress_is_reported() {
    let (_dir, source) = setup(SOURCE);
    let mut seen = Vec::new();
    let options = french().with_chunk_size(1);

    translate_file(&source, &options, &canned, |p| {
        seen.push(match p {
            Progress::Started { strings, .. } => format!("start:{}", strings),
            Progress::Chunk { done, total } => format!("{}/{}", done, total),
            Progress::Finished => "done".to_string(),
        })
    })
    .unwrap();

    assert_eq!(seen, vec!["start:2", "0/2", "1/2", "done"]);
}
