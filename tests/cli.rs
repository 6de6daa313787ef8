mod common;

use std::fs;
use std::process::Command;

use tempfile::tempdir;

use common::{text_rows, write_workbook};

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tok-annotate"))
}

#[test]
fn cli_reports_counts_on_stdout() {
    let dir = tempdir().unwrap();
    let tagged = dir.path().join("tagged.xlsx");
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");

    write_workbook(
        &tagged,
        &[("Draft", text_rows(&[&["id", "lemma", "tag"], &["t1", "run", "V"]]))],
    );
    fs::write(&input, r#"<doc><tok id="t1"/><tok id="t2"/></doc>"#).unwrap();

    let result = binary()
        .arg(&tagged)
        .arg(&input)
        .arg(&output)
        .args(["--sheet", "Draft"])
        .output()
        .expect("run binary");

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert_eq!(
        stdout,
        format!(
            "Loaded 1 token annotations from {}#Draft\nUpdated 1 tokens; wrote {}\n",
            tagged.display(),
            output.display()
        )
    );
    assert!(fs::read_to_string(&output)
        .unwrap()
        .contains(r#"<tok id="t1" lemma="run" mfs="V"/>"#));
}

#[test]
fn cli_fails_on_missing_sheet() {
    let dir = tempdir().unwrap();
    let tagged = dir.path().join("tagged.xlsx");
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");

    write_workbook(&tagged, &[("Sheet1", text_rows(&[&["id", "lemma", "tag"]]))]);
    fs::write(&input, "<doc/>").unwrap();

    let result = binary()
        .arg(&tagged)
        .arg(&input)
        .arg(&output)
        .output()
        .expect("run binary");

    assert!(!result.status.success());
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(
        stderr.contains(&format!("error: Sheet 'Revised' not found in {}", tagged.display())),
        "stderr: {}",
        stderr
    );
    assert!(result.stdout.is_empty());
    assert!(!output.exists());
}

#[test]
fn cli_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    let tagged = dir.path().join("tagged.xlsx");
    write_workbook(&tagged, &[("Revised", text_rows(&[&["id", "lemma", "tag"]]))]);

    let result = binary()
        .arg(&tagged)
        .arg(dir.path().join("missing.xml"))
        .arg(dir.path().join("out.xml"))
        .output()
        .expect("run binary");

    assert!(!result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.starts_with("Loaded 0 token annotations"), "stdout: {}", stdout);
    assert!(String::from_utf8_lossy(&result.stderr).starts_with("error: "));
}
