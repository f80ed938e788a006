//! Integration tests for the timesheet formatter

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use ts_format::config::{Dirs, RawConfig, Settings};
use ts_format::diagnostics::{DiagnosticContext, RunState};
use ts_format::layout::RedactionRegion;
use ts_format::pdf::{page_texts, redact};
use ts_format::pipeline::run;
use ts_format::Error;

const CONFIG: &str = r#"{
    "searchfile": {"namekeyword": "Timesheet", "type": ".pdf", "path": "Downloads"},
    "mergefile": {"path": "scriptpath", "name": "signature_lines.pdf"},
    "outfile": {"name": "TS-", "path": "Documents"},
    "excludednames": {"path": "scriptpath", "name": "excluded_names.txt"},
    "debug": {"active": false, "locals": true, "scope": true, "globals": true, "kwargs": {}}
}"#;

/// Build a PDF with one page per entry, each entry being the page's lines
fn write_pdf(path: &Path, pages: &[&[&str]]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// Program and home directories laid out like a real install
struct Workspace {
    _root: TempDir,
    dirs: Dirs,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let dirs = Dirs {
            program_dir: root.path().join("program"),
            home_dir: root.path().join("home"),
        };
        fs::create_dir_all(&dirs.program_dir).unwrap();
        fs::create_dir_all(dirs.home_dir.join("Downloads")).unwrap();
        fs::create_dir_all(dirs.home_dir.join("Documents")).unwrap();

        write_pdf(
            &dirs.program_dir.join("signature_lines.pdf"),
            &[&["Supervisor Signature ____________"]],
        );

        Self { _root: root, dirs }
    }

    fn settings(&self) -> Settings {
        RawConfig::from_json(CONFIG).unwrap().resolve(&self.dirs)
    }

    fn write_names(&self, names: &str) {
        fs::write(self.dirs.program_dir.join("excluded_names.txt"), names).unwrap();
    }

    fn write_source(&self, name: &str, pages: &[&[&str]]) -> PathBuf {
        let path = self.dirs.home_dir.join("Downloads").join(name);
        write_pdf(&path, pages);
        path
    }

    /// Leftover intermediate directories in the program directory
    fn leftover_intermediates(&self) -> usize {
        fs::read_dir(&self.dirs.program_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("ts-format-"))
            .count()
    }
}

fn started() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(16, 30, 0)
        .unwrap()
}

const SMITH_AND_JONES: &[&[&str]] = &[
    &["Employee: Smith", "Week 1"],
    &["Week 2"],
    &["Employee: Jones", "Week 1"],
    &["Total Hours 40"],
];

#[test]
fn test_excluded_record_removed_end_to_end() {
    let ws = Workspace::new();
    ws.write_names("Smith\n");
    ws.write_source("Timesheet.pdf", SMITH_AND_JONES);

    let mut ctx = DiagnosticContext::new();
    let outcome = run(&ws.settings(), &started(), &mut ctx).expect("Run failed");

    assert_eq!(ctx.state(), RunState::Done);
    assert_eq!(outcome.excluded.iter().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(outcome.summary.source_pages, 4);
    assert_eq!(outcome.summary.written_pages, 2);

    assert!(outcome.output.exists(), "Output PDF was not created");
    assert_eq!(page_count(&outcome.output), 2);

    let output = Document::load(&outcome.output).unwrap();
    let texts = page_texts(&output);
    assert!(texts[0].contains("Employee: Jones"));
    assert!(texts[1].contains("Total Hours 40"));
    assert!(texts.iter().all(|text| !text.contains("Smith")));

    // Every remaining page carries the signature lines
    for (_, page_id) in output.get_pages() {
        let page = output.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Watermark"));
    }

    assert_eq!(ws.leftover_intermediates(), 0, "Intermediate was not removed");
}

#[test]
fn test_output_name_uses_timestamp_and_source_name() {
    let ws = Workspace::new();
    ws.write_names("Nobody\n");
    ws.write_source("Timesheet (2).pdf", SMITH_AND_JONES);

    let mut ctx = DiagnosticContext::new();
    let outcome = run(&ws.settings(), &started(), &mut ctx).unwrap();

    assert_eq!(
        outcome.output,
        ws.dirs.home_dir.join("Documents").join("TS-2024-03-01_16-30-00-Timesheet2.pdf")
    );
    assert_eq!(outcome.summary.written_pages, 4);
}

#[test]
fn test_content_is_stable_across_runs() {
    let ws = Workspace::new();
    ws.write_names("Smith\n");
    ws.write_source("Timesheet.pdf", SMITH_AND_JONES);

    let first = run(&ws.settings(), &started(), &mut DiagnosticContext::new()).unwrap();
    let later = started() + chrono::Duration::seconds(5);
    let second = run(&ws.settings(), &later, &mut DiagnosticContext::new()).unwrap();

    assert_ne!(first.output, second.output);
    assert_eq!(fs::read(&first.output).unwrap(), fs::read(&second.output).unwrap());
}

#[test]
fn test_missing_source_file() {
    let ws = Workspace::new();
    ws.write_names("Smith\n");

    let mut ctx = DiagnosticContext::new();
    let result = run(&ws.settings(), &started(), &mut ctx);

    let err = result.unwrap_err();
    assert!(matches!(err, Error::FileNotFoundInSearch { .. }));
    assert!(err.is_expected());
    assert_eq!(ctx.state(), RunState::Failed);
    assert_eq!(ctx.failed_after(), Some(RunState::Start));
}

#[test]
fn test_missing_name_list() {
    let ws = Workspace::new();
    ws.write_source("Timesheet.pdf", SMITH_AND_JONES);

    let mut ctx = DiagnosticContext::new();
    let err = run(&ws.settings(), &started(), &mut ctx).unwrap_err();

    match err {
        Error::ExcludedNameFileMissing { name, .. } => assert_eq!(name, "excluded_names.txt"),
        other => panic!("expected ExcludedNameFileMissing, got {:?}", other),
    }
    assert_eq!(ctx.failed_after(), Some(RunState::Located));
    assert!(ctx.get("source").unwrap().ends_with("Timesheet.pdf"));
}

#[test]
fn test_missing_watermark_cleans_up_intermediate() {
    let ws = Workspace::new();
    ws.write_names("Smith\n");
    ws.write_source("Timesheet.pdf", SMITH_AND_JONES);
    fs::remove_file(ws.dirs.program_dir.join("signature_lines.pdf")).unwrap();

    let mut ctx = DiagnosticContext::new();
    let err = run(&ws.settings(), &started(), &mut ctx).unwrap_err();

    assert!(matches!(err, Error::MergeIo { .. }));
    assert!(!err.is_expected());
    assert_eq!(ctx.failed_after(), Some(RunState::Redacted));
    assert_eq!(ws.leftover_intermediates(), 0);
}

#[test]
fn test_redact_file_preserves_pages_and_text() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.pdf");
    let output = dir.path().join("redacted.pdf");
    write_pdf(&source, SMITH_AND_JONES);

    let region = RedactionRegion { x0: 0.0, y0: 760.0, x1: 612.0, y1: 792.0, width: 1.0 };
    let pages = redact(&source, &region, &output).unwrap();

    assert_eq!(pages, 4);
    assert_eq!(page_count(&output), 4);
    assert_eq!(
        page_texts(&Document::load(&source).unwrap()),
        page_texts(&Document::load(&output).unwrap())
    );
}
