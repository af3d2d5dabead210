//! Integration tests for the résumé pipeline.
//!
//! Everything here runs offline and deterministically: configs are seeded
//! and artifacts are decoded with small readers defined below rather than
//! trusted from the writer's own bookkeeping.

use resume_ats::codec::crc32::Crc32;
use resume_ats::pipeline::{inject, parse, text};
use resume_ats::{
    export, export_formats, match_score, normalize, optimize, optimize_to_dir, run_pipeline,
    validate, AtsError, Document, ExportFormat, KeywordGroups, OptimizerConfig,
};
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

const SCENARIO_A: &str = "JOHN SMITH\njohn@x.com\nEXPERIENCE\nAcme Co | Engineer | 2020-Present\n- Built systems.\nSKILLS\nPython, Go\nEDUCATION\nBSc CS";

const FULL_RESUME: &str = "\
Jane Doe
Austin, TX | jane.doe@example.com | (512) 555-0199
linkedin.com/in/janedoe | github.com/janedoe

PROFESSIONAL SUMMARY
Platform engineer focused on reliable delivery.

EXPERIENCE
Globex | Senior SRE | Jan 2021 - Present
• Migrated the fleet to containers.
• Cut paging volume in half.
Initech | Systems Engineer | 2017 - 2020
• Automated nightly backups.

SKILLS
Technical: Python, SQL; Linux
Soft: Mentoring

EDUCATION
BSc Computer Science, UT Austin

CERTIFICATIONS
- AWS Solutions Architect
";

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route the crate's `tracing` output through the test harness; run with
/// `RUST_LOG=resume_ats=trace cargo test -- --nocapture` to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resume_ats=debug")),
        )
        .with_test_writer()
        .try_init();
}

fn seeded() -> OptimizerConfig {
    init_tracing();
    OptimizerConfig::builder().seed(42).build().unwrap()
}

fn scenario_b_groups() -> KeywordGroups {
    KeywordGroups::from_json(
        r#"{"highROI": ["Kubernetes", "Terraform", "Docker", "Ansible", "Rust", "Go"]}"#,
    )
    .unwrap()
}

fn le16(b: &[u8], at: usize) -> usize {
    u16::from_le_bytes([b[at], b[at + 1]]) as usize
}

fn le32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Read a stored ZIP through its central directory, verifying every CRC.
fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let eocd = bytes.len() - 22;
    assert_eq!(le32(bytes, eocd), 0x0605_4b50, "end of central directory");
    let count = le16(bytes, eocd + 10);
    let cd_size = le32(bytes, eocd + 12) as usize;
    let cd_offset = le32(bytes, eocd + 16) as usize;
    assert_eq!(cd_offset + cd_size, eocd);

    let mut entries = Vec::new();
    let mut at = cd_offset;
    for _ in 0..count {
        assert_eq!(le32(bytes, at), 0x0201_4b50, "central record");
        assert_eq!(le16(bytes, at + 10), 0, "stored");
        let crc = le32(bytes, at + 16);
        let size = le32(bytes, at + 20) as usize;
        let name_len = le16(bytes, at + 28);
        let local = le32(bytes, at + 42) as usize;
        let name = String::from_utf8(bytes[at + 46..at + 46 + name_len].to_vec()).unwrap();

        assert_eq!(le32(bytes, local), 0x0403_4b50, "local header");
        assert_eq!(le16(bytes, local + 26), name_len);
        let data_at = local + 30 + name_len;
        let data = bytes[data_at..data_at + size].to_vec();
        assert_eq!(Crc32::compute(&data), crc, "crc of {name}");

        entries.push((name, data));
        at += 46 + name_len;
    }
    assert_eq!(at, eocd);
    entries
}

fn part(entries: &[(String, Vec<u8>)], name: &str) -> String {
    let (_, data) = entries.iter().find(|(n, _)| n == name).unwrap();
    String::from_utf8(data.clone()).unwrap()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn scenario_a_parses_structure() {
    let doc = parse::parse(SCENARIO_A).unwrap();
    assert_eq!(doc.personal.name, "JOHN SMITH");
    assert_eq!(doc.personal.email, "john@x.com");
    assert_eq!(doc.experience.len(), 1);
    assert_eq!(doc.experience[0].company, "Acme Co");
    assert_eq!(doc.experience[0].bullets, ["Built systems."]);
    assert_eq!(doc.skills.hard.as_slice(), ["Python", "Go"]);
    assert_eq!(doc.education.len(), 1);
    assert_eq!(doc.education[0].degree, "BSc CS");
}

#[test]
fn scenario_b_injection_through_pipeline() {
    let out = run_pipeline(SCENARIO_A, &scenario_b_groups(), &seeded()).unwrap();

    // "Go" is already a skill, so the five new ones are the rest.
    assert_eq!(out.stats.skills_added, 5);
    assert!(out.stats.bullets_modified <= 1);
    assert!(out.stats.total_injections <= 15);

    let mut seen = HashSet::new();
    for kw in &out.stats.keywords_covered {
        assert!(seen.insert(kw.to_lowercase()), "{kw} covered twice");
    }
    let skills: HashSet<String> = out.document.skills.hard.iter().map(|s| s.to_lowercase()).collect();
    assert_eq!(skills.len(), out.document.skills.hard.len());
}

#[test]
fn scenario_c_match_score_bounds() {
    let present = normalize(&KeywordGroups {
        high: vec!["python".into(), "SYSTEMS".into()],
        ..Default::default()
    });
    let absent = normalize(&KeywordGroups {
        medium: vec!["Haskell".into(), "COBOL".into()],
        ..Default::default()
    });
    let rendered = text::render(&parse::parse(SCENARIO_A).unwrap());

    assert_eq!(match_score(&rendered, &present).score, 100);
    let report = match_score(&rendered, &absent);
    assert_eq!(report.score, 0);
    assert_eq!(report.missing, ["Haskell", "COBOL"]);
}

#[test]
fn scenario_d_missing_education_is_invalid() {
    let report = validate("JANE\nEXPERIENCE\nAcme | Dev\n• Built it.\nSKILLS\nRust, Go\n");
    assert!(!report.checks.standard_sections);
    assert!(!report.is_valid);
    assert!(report.issues.iter().any(|i| i.contains("EDUCATION")));
}

// ── Pipeline behaviour ───────────────────────────────────────────────────────

#[test]
fn empty_input_fails_before_any_artifact() {
    let err = run_pipeline(" \n\t\n", &scenario_b_groups(), &seeded()).unwrap_err();
    assert!(matches!(err, AtsError::EmptyInput));
}

#[test]
fn full_resume_round_trip() {
    let groups = KeywordGroups::from_json(
        r#"{"high": ["Kubernetes", "Terraform"], "medium": ["Grafana"], "low": ["Agile"]}"#,
    )
    .unwrap();
    let out = run_pipeline(FULL_RESUME, &groups, &seeded()).unwrap();
    let doc = &out.document;

    assert_eq!(doc.personal.name, "Jane Doe");
    assert_eq!(doc.personal.location, "Austin, TX");
    assert_eq!(doc.personal.linkedin, "linkedin.com/in/janedoe");
    assert_eq!(doc.experience.len(), 2);
    assert_eq!(doc.experience[1].company, "Initech");
    assert_eq!(doc.certifications, ["AWS Solutions Architect"]);

    assert!(out.text.starts_with("JANE DOE\n"));
    assert!(out.text.ends_with('\n') && !out.text.ends_with("\n\n"));
    assert!(out.validation.is_valid, "{:?}", out.validation.issues);
    assert!(out.match_report.score > out.original_score);
    assert!(out.score_delta() > 0);
    // Low-priority keywords are never injected.
    assert!(out.match_report.missing.contains(&"Agile".to_string()));
}

#[test]
fn input_document_is_not_mutated_by_injection() {
    let parsed = parse::parse(FULL_RESUME).unwrap();
    let before = parsed.clone();
    let keywords = normalize(&scenario_b_groups());
    let config = seeded();
    let (injected, stats) = inject::inject(&parsed, &keywords, &config.policy, &mut config.rng());

    assert_eq!(parsed, before);
    assert_ne!(injected, parsed);
    assert!(stats.skills_added > 0);
}

#[test]
fn seeded_runs_are_reproducible() {
    let a = run_pipeline(FULL_RESUME, &scenario_b_groups(), &seeded()).unwrap();
    let b = run_pipeline(FULL_RESUME, &scenario_b_groups(), &seeded()).unwrap();
    assert_eq!(a.text, b.text);
    assert_eq!(a.docx, b.docx);
    assert_eq!(a.pdf, b.pdf);
}

#[test]
fn export_matches_pipeline_artifacts() {
    let out = run_pipeline(FULL_RESUME, &scenario_b_groups(), &seeded()).unwrap();
    assert_eq!(export(&out.document, ExportFormat::Text).unwrap(), out.text.as_bytes());
    assert_eq!(export(&out.document, ExportFormat::Docx).unwrap(), out.docx);
    assert_eq!(export(&out.document, ExportFormat::Pdf).unwrap(), out.pdf);
}

#[test]
fn export_formats_names_files_after_candidate() {
    init_tracing();
    let doc = parse::parse(FULL_RESUME).unwrap();
    let report = export_formats(&doc, &[ExportFormat::Pdf, ExportFormat::Text]);
    assert!(report.is_complete());
    assert_eq!(report.formats(), [ExportFormat::Pdf, ExportFormat::Text]);
    assert_eq!(report.artifacts[0].file_name, "Jane_Doe_Resume.pdf");
    assert_eq!(report.artifacts[1].file_name, "Jane_Doe_Resume.txt");
}

// ── Artifact structure ───────────────────────────────────────────────────────

#[test]
fn docx_is_a_valid_stored_archive() {
    let out = run_pipeline(FULL_RESUME, &scenario_b_groups(), &seeded()).unwrap();
    let entries = read_zip(&out.docx);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ]
    );

    let document = part(&entries, "word/document.xml");
    assert!(document.contains("Jane Doe"));
    assert!(document.contains("Globex | Senior SRE"));
    assert!(document.contains("• Automated nightly backups"));
}

#[test]
fn docx_escapes_markup_in_content() {
    init_tracing();
    let mut doc = Document::default();
    doc.personal.name = "A <B> & C".into();
    let bytes = export(&doc, ExportFormat::Docx).unwrap();
    let document = part(&read_zip(&bytes), "word/document.xml");
    assert!(document.contains("A &lt;B&gt; &amp; C"));
    assert!(!document.contains("<B>"));
}

#[test]
fn control_characters_in_input_yield_well_formed_docx() {
    let raw = "Jane Doe\x1b\njane@x.io\nEXPERIENCE\nAcme | Engineer | 2020 - Present\n\
               - Built\x0csystems\x1b fast.\x07\n\x0cSKILLS\nPython\x00, Go\nEDUCATION\nBSc";
    let out = run_pipeline(raw, &KeywordGroups::default(), &seeded()).unwrap();
    assert_eq!(out.document.experience[0].bullets, ["Built systems fast."]);
    assert_eq!(out.document.personal.name, "Jane Doe");
    assert_eq!(out.document.skills.hard.as_slice(), ["Python", "Go"]);

    let document = part(&read_zip(&out.docx), "word/document.xml");
    let xml = roxmltree::Document::parse(&document).unwrap();
    assert_eq!(xml.root_element().tag_name().name(), "document");
    for part_name in ["[Content_Types].xml", "_rels/.rels", "word/_rels/document.xml.rels", "word/styles.xml"] {
        roxmltree::Document::parse(&part(&read_zip(&out.docx), part_name)).unwrap();
    }
}

#[test]
fn location_heading_flag_reaches_the_parser() {
    let raw = "Jane Doe\nSKILLS\nAustin, TX\nEXPERIENCE\nAcme | Engineer | 2020\n- Shipped.\nEDUCATION\nBSc";
    let default = run_pipeline(raw, &KeywordGroups::default(), &seeded()).unwrap();
    assert_eq!(default.document.personal.location, "Austin, TX");

    let config = OptimizerConfig::builder().seed(42).location_stops_at_heading(true).build().unwrap();
    let strict = run_pipeline(raw, &KeywordGroups::default(), &config).unwrap();
    assert_eq!(strict.document.personal.location, "");
    assert_eq!(strict.document.skills.hard.as_slice(), ["Austin", "TX"]);
}

#[test]
fn pdf_xref_points_at_objects() {
    let out = run_pipeline(SCENARIO_A, &scenario_b_groups(), &seeded()).unwrap();
    let pdf = out.pdf.as_slice();

    assert!(pdf.starts_with(b"%PDF-1.4\n"));
    assert!(pdf.ends_with(b"%%EOF\n"));
    assert!(find(pdf, b"/BaseFont /Helvetica ").is_some());
    assert!(find(pdf, b"/BaseFont /Helvetica-Bold ").is_some());
    assert!(find(pdf, b"(JOHN SMITH) Tj").is_some());
    assert!(find(pdf, b"/Root 1 0 R /Info 7 0 R").is_some());

    let marker = rfind(pdf, b"startxref\n").unwrap() + b"startxref\n".len();
    let tail = std::str::from_utf8(&pdf[marker..]).unwrap();
    let xref: usize = tail.lines().next().unwrap().parse().unwrap();

    let table = std::str::from_utf8(&pdf[xref..marker]).unwrap();
    assert!(table.starts_with("xref\n0 8\n0000000000 65535 f \n"));
    for (i, line) in table.lines().skip(3).take(7).enumerate() {
        let offset: usize = line[..10].parse().unwrap();
        let header = format!("{} 0 obj", i + 1);
        assert!(pdf[offset..].starts_with(header.as_bytes()), "object {} at {}", i + 1, offset);
    }
}

// ── Async entry points ───────────────────────────────────────────────────────

#[tokio::test]
async fn optimize_runs_off_the_executor() {
    let out = optimize(SCENARIO_A, &scenario_b_groups(), &seeded()).await.unwrap();
    assert_eq!(out.document.personal.name, "JOHN SMITH");
    assert!(out.match_report.score > out.original_score);
}

#[tokio::test]
async fn optimize_to_dir_writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested");
    let out = optimize_to_dir(FULL_RESUME, &scenario_b_groups(), &target, "cv", &seeded())
        .await
        .unwrap();

    for format in ExportFormat::ALL {
        let path = target.join(format!("cv.{}", format.extension()));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, out.bytes(format), "{}", path.display());
    }
    let leftovers: Vec<_> = std::fs::read_dir(&target)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn optimize_to_dir_reports_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = optimize_to_dir("", &KeywordGroups::default(), dir.path(), "cv", &seeded())
        .await
        .unwrap_err();
    assert!(matches!(err, AtsError::EmptyInput));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn output_serialises_artifacts_as_base64() {
    let out = run_pipeline(SCENARIO_A, &KeywordGroups::default(), &seeded()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert!(json["docx_base64"].as_str().unwrap().starts_with("UEsDB"));
    assert!(json["pdf_base64"].as_str().unwrap().starts_with("JVBERi"));
    assert_eq!(json["match_report"]["score"], 0);
}
