use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("pdftitle").unwrap()
}

/// Single-page PDF with `/F1` Helvetica and an optional Info title.
fn create_pdf(content: &str, info_title: Option<&str>) -> Vec<u8> {
    use lopdf::{Object, Stream, StringFormat, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    if let Some(title) = info_title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn write_pdf(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, create_pdf(content, None)).unwrap();
    path
}

const PAPER: &str = "BT /F1 24 Tf 72 700 Td (Title Text) Tj ET \
                     BT /F1 10 Tf 72 650 Td (A paragraph of body text.) Tj ET";

#[test]
fn help_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pdf"))
        .stdout(predicate::str::contains("--algo"))
        .stdout(predicate::str::contains("--eliot-tfs"))
        .stdout(predicate::str::contains("--change-name"));
}

#[test]
fn prints_title() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf", PAPER);
    cmd()
        .arg("-p")
        .arg(&pdf)
        .assert()
        .success()
        .stdout("Title Text\n");
}

#[test]
fn title_case_option() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(
        dir.path(),
        "paper.pdf",
        "BT /F1 24 Tf 72 700 Td (deep LEARNING for all) Tj ET",
    );
    cmd()
        .arg("-p")
        .arg(&pdf)
        .arg("-t")
        .assert()
        .success()
        .stdout("Deep Learning For All\n");
}

#[test]
fn ligatures_converted_unless_disabled() {
    let dir = tempfile::tempdir().unwrap();
    // 0xAE is the fi ligature in StandardEncoding
    let pdf = write_pdf(
        dir.path(),
        "paper.pdf",
        "BT /F1 24 Tf 72 700 Td <AE6E616C> Tj ET",
    );
    cmd()
        .arg("-p")
        .arg(&pdf)
        .assert()
        .success()
        .stdout("final\n");
    cmd()
        .arg("-p")
        .arg(&pdf)
        .arg("--do-not-convert-ligatures")
        .assert()
        .success()
        .stdout("\u{FB01}nal\n");
}

#[test]
fn change_name_renames_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf", PAPER);
    cmd()
        .arg("-p")
        .arg(&pdf)
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains("title_text.pdf"));
    assert!(!pdf.exists());
    assert!(dir.path().join("title_text.pdf").exists());
}

#[test]
fn eliot_with_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(
        dir.path(),
        "paper.pdf",
        "BT /F1 24 Tf 72 700 Td (Deep) Tj ET \
         BT /F1 18 Tf 72 670 Td (Learning) Tj ET \
         BT /F1 10 Tf 72 600 Td (Body text here) Tj ET",
    );
    cmd()
        .arg("-p")
        .arg(&pdf)
        .args(["-a", "eliot", "--eliot-tfs", "0,1"])
        .assert()
        .success()
        .stdout("Deep Learning\n");
    cmd()
        .arg("-p")
        .arg(&pdf)
        .args(["-a", "eliot", "--eliot-tfs", "7"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn list_blocks_prints_one_line_per_block() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf", PAPER);
    cmd()
        .arg("-p")
        .arg(&pdf)
        .arg("--list-blocks")
        .assert()
        .success()
        .stdout(predicate::str::contains("24\t72.00\t700.00\tHelvetica\tTitle Text"))
        .stdout(predicate::str::contains("10\t72.00\t650.00\tHelvetica\tA paragraph"));
}

#[test]
fn metadata_title_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.pdf");
    std::fs::write(&path, create_pdf(PAPER, Some("Stored Title"))).unwrap();
    cmd()
        .arg("-p")
        .arg(&path)
        .arg("--use-metadata")
        .assert()
        .success()
        .stdout("Stored Title\n");
    cmd()
        .arg("-p")
        .arg(&path)
        .assert()
        .success()
        .stdout("Title Text\n");
}

#[test]
fn missing_char_replacement() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf", "BT /F1 20 Tf 72 700 Td <410142> Tj ET");
    cmd()
        .arg("-p")
        .arg(&pdf)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--replace-missing-char"));
    cmd()
        .arg("-p")
        .arg(&pdf)
        .args(["--replace-missing-char", "_"])
        .assert()
        .success()
        .stdout("A_B\n");
}

#[test]
fn xobject_hint_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "scan.pdf", "q 612 0 0 792 0 0 cm /Im1 Do Q");
    cmd()
        .arg("-p")
        .arg(&pdf)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no text was drawn"))
        .stderr(predicate::str::contains("XObjects"));
}

#[test]
fn missing_file() {
    cmd()
        .args(["-p", "/nonexistent/paper.pdf"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: file not found"));
}

#[test]
fn page_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf", PAPER);
    cmd()
        .arg("-p")
        .arg(&pdf)
        .args(["--page-number", "3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("specified page does not exist"));
}
