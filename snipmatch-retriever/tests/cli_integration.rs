mod common;

use anyhow::Result;
use common::SAMPLE_CORPUS;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run the CLI binary offline against the corpus in `temp_dir`
fn run_cli(temp_dir: &TempDir, args: &[&str]) -> Result<std::process::Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snipmatch"));
    cmd.arg("--corpus")
        .arg(temp_dir.path().join("code_base.json"))
        .arg("--offline")
        .args(args)
        .env("RUST_LOG", "error"); // Reduce log noise

    let output = cmd.output()?;
    Ok(output)
}

fn write_corpus(contents: &str) -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("code_base.json"), contents)?;
    Ok(temp_dir)
}

#[test]
fn test_cli_query_summary() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;
    let output = run_cli(&temp_dir, &["query", "How do I drop rows with missing values?", "-m", "1"])?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout)?;
    let first = stdout.lines().next().unwrap_or_default();
    assert!(first.starts_with("1. "), "unexpected output: {stdout}");
    assert!(first.contains("dropna"), "unexpected output: {stdout}");
    Ok(())
}

#[test]
fn test_cli_query_json() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;
    let output = run_cli(
        &temp_dir,
        &["query", "load a csv file", "-k", "2", "-m", "1", "-f", "json"],
    )?;

    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let results = results.as_array().expect("array of results");
    assert!(!results.is_empty() && results.len() <= 2);
    assert_eq!(results[0]["title"], "read_csv");
    assert_eq!(results[0]["code"], "df = pd.read_csv('data.csv')");
    let score = results[0]["score"].as_u64().unwrap();
    assert!((1..=5).contains(&score));
    Ok(())
}

#[test]
fn test_cli_empty_query_matches_nothing() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;
    let output = run_cli(&temp_dir, &["query", "the of and", "-f", "json"])?;

    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(results, serde_json::json!([]));
    Ok(())
}

#[test]
fn test_cli_list_and_show() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;

    let output = run_cli(&temp_dir, &["list"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Found 4 snippets"));
    assert!(stdout.contains("histogram"));

    let output = run_cli(&temp_dir, &["show", "fillna"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Title: fillna"));
    assert!(stdout.contains("df = df.fillna(0)"));
    assert!(stdout.contains("Tags: pandas, cleaning"));

    let output = run_cli(&temp_dir, &["show", "merge"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No snippet titled 'merge'"));
    Ok(())
}

#[test]
fn test_cli_normalize() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = run_cli(
        &temp_dir,
        &["normalize", "How do I drop the rows with missing values in a DataFrame?"],
    )?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?.trim(),
        "drop row missing value in dataframe"
    );
    Ok(())
}

#[test]
fn test_cli_rejects_bad_corpus() -> Result<()> {
    let temp_dir = write_corpus(
        r#"[{"title": "dropna", "summary": "a", "body": "x"},
            {"title": "dropna", "summary": "b", "body": "y"}]"#,
    )?;
    let output = run_cli(&temp_dir, &["query", "drop rows"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate snippet title 'dropna'"));

    let empty_dir = TempDir::new()?;
    let output = run_cli(&empty_dir, &["list"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("code_base.json"));
    Ok(())
}

#[test]
fn test_cli_invalid_format() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;
    let output = run_cli(&temp_dir, &["list", "-f", "yaml"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid format"));
    Ok(())
}

#[test]
fn test_cli_timeout_override() -> Result<()> {
    let temp_dir = write_corpus(SAMPLE_CORPUS)?;
    let output = run_cli(&temp_dir, &["--timeout-ms", "2000", "query", "load a csv file", "-m", "1"])?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8(output.stdout)?.contains("read_csv"));

    let output = run_cli(&temp_dir, &["--timeout-ms", "0", "list"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("query_timeout_ms must be at least 1"));
    Ok(())
}
