//! End-to-end runs: scripted engine, real files.
//!
//! Each test drives [`Agent::run`] with a provider that replays canned
//! replies, while operations go through the real [`FileAdapter`] against
//! temporary `.xlsx` and `.docx` files. No network.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use quire_agent::{Agent, AgentConfig, ExitReason};
use quire_doc::FileAdapter;
use quire_ops::OperationRegistry;
use quire_session::SessionStore;
use quire_turn::provider::{Provider, ProviderError};
use quire_turn::types::*;
use quire_types::{OperationCall, SessionId, Turn, find_unanswered_call};
use serde_json::json;
use tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScriptedProvider: replays replies, records requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<ProviderResponse>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ProviderResponse>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Provider for ScriptedProvider {
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::InvalidResponse("script exhausted".into()));
        async move { reply }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn calls(calls: Vec<(&str, serde_json::Value)>) -> ProviderResponse {
    let calls = calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, args))| OperationCall::new(format!("call_{i}"), name, args))
        .collect();
    ProviderResponse::with_calls(calls, "scripted")
}

fn answer(text: &str) -> ProviderResponse {
    ProviderResponse::final_answer(text, "scripted")
}

fn agent(
    script: Vec<ProviderResponse>,
    config: AgentConfig,
) -> (Agent<ScriptedProvider>, ScriptedProvider) {
    let provider = ScriptedProvider::new(script);
    let agent = Agent::new(
        provider.clone(),
        Arc::new(OperationRegistry::standard()),
        Arc::new(FileAdapter::new()),
        Arc::new(SessionStore::new()),
        config,
    );
    (agent, provider)
}

/// A workbook with one `Data` sheet holding `rows`.
fn workbook(dir: &TempDir, rows: &[&[&str]]) -> PathBuf {
    let path = dir.path().join("people.xlsx");
    let mut book = umya_spreadsheet::new_file();
    book.get_sheet_by_name_mut("Sheet1").unwrap().set_name("Data");
    let sheet = book.get_sheet_by_name_mut("Data").unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet
                .get_cell_mut((c as u32 + 1, r as u32 + 1))
                .set_value(*value);
        }
    }
    umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
    path
}

fn rows(path: &Path) -> Vec<Vec<String>> {
    let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
    let sheet = book.get_sheet_by_name("Data").unwrap();
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    (1..=max_row)
        .map(|r| {
            (1..=max_col)
                .map(|c| {
                    sheet
                        .get_cell((c, r))
                        .map(|cell| cell.get_value().to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

fn docx(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("memo.docx");
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

fn document_xml(path: &Path) -> String {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut out = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut out)
        .unwrap();
    out
}

fn results(history: &[Turn]) -> Vec<(String, bool)> {
    history
        .iter()
        .filter_map(|t| match t {
            Turn::OperationResult { text, is_error, .. } => Some((text.clone(), *is_error)),
            _ => None,
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Spreadsheets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn adds_a_row_after_reading_structure() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Name", "Age"], &["Bob", "41"]]);
    let (agent, provider) = agent(
        vec![
            calls(vec![("read_excel_structure", json!({}))]),
            calls(vec![(
                "add_excel_row",
                json!({"sheet_name": "Data", "data": ["Alice", 30]}),
            )]),
            answer("Added Alice, 30 to Data."),
        ],
        AgentConfig::default(),
    );

    let id = SessionId::new("alice");
    let out = agent
        .run("Add a row for Alice, age 30", &path, &id)
        .await
        .unwrap();

    assert_eq!(out.response, "Added Alice, 30 to Data.");
    assert_eq!(out.exit_reason, ExitReason::Complete);
    assert_eq!(out.iterations, 3);
    assert_eq!(
        rows(&path),
        vec![
            vec!["Name".to_string(), "Age".to_string()],
            vec!["Bob".to_string(), "41".to_string()],
            vec!["Alice".to_string(), "30".to_string()],
        ]
    );

    let history = agent.sessions().history(&id).await.unwrap();
    assert_eq!(
        results(&history),
        vec![
            (r#"Sheet: Data, Columns: ["Name","Age"]"#.to_string(), false),
            ("Row added successfully.".to_string(), false),
        ]
    );
    assert_eq!(find_unanswered_call(&history), None);

    // The engine saw the structure result before deciding to add the row.
    let requests = provider.requests.lock().unwrap();
    assert!(matches!(
        requests[1].turns.last(),
        Some(Turn::OperationResult { text, .. }) if text.contains("Columns")
    ));
}

#[tokio::test]
async fn missing_sheet_is_reported_and_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Name"], &["Bob"]]);
    let before = std::fs::read(&path).unwrap();

    let (agent, _) = agent(
        vec![
            calls(vec![(
                "delete_excel_row",
                json!({"sheet_name": "Ghost", "row_idx": 2}),
            )]),
            answer("There is no sheet named Ghost."),
        ],
        AgentConfig::default(),
    );
    let id = SessionId::new("ghost");
    let out = agent.run("Delete row 2 of Ghost", &path, &id).await.unwrap();

    assert_eq!(out.response, "There is no sheet named Ghost.");
    assert!(!out.operations[0].success);
    let history = agent.sessions().history(&id).await.unwrap();
    assert_eq!(
        results(&history),
        vec![("Error: Sheet Ghost not found.".to_string(), true)]
    );
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(!dir.path().join("people.xlsx.tmp").exists());
}

#[tokio::test]
async fn deleting_column_b_shifts_c_left() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(
        &dir,
        &[&["Name", "Age", "City"], &["Bob", "41", "Oslo"]],
    );
    let before = rows(&path);

    let (agent, _) = agent(
        vec![
            calls(vec![(
                "delete_excel_column",
                json!({"sheet_name": "Data", "col_idx": "B"}),
            )]),
            answer("Removed the Age column."),
        ],
        AgentConfig::default(),
    );
    agent
        .run("Drop column B", &path, &SessionId::new("col"))
        .await
        .unwrap();

    let after = rows(&path);
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(new[0], old[0]);
        assert_eq!(new[1], old[2]);
    }
}

#[tokio::test]
async fn bold_keeps_earlier_italic() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Total", "99"]]);

    let (agent, _) = agent(
        vec![
            calls(vec![(
                "apply_excel_style",
                json!({"sheet_name": "Data", "target_range": "A1", "italic": true}),
            )]),
            answer("Italicized."),
            calls(vec![(
                "apply_excel_style",
                json!({"sheet_name": "Data", "target_range": "A1", "bold": true}),
            )]),
            answer("Bolded."),
        ],
        AgentConfig::default(),
    );
    let id = SessionId::new("style");
    agent.run("Make A1 italic", &path, &id).await.unwrap();
    agent.run("Now make it bold too", &path, &id).await.unwrap();

    let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
    let sheet = book.get_sheet_by_name("Data").unwrap();
    let font = sheet
        .get_cell((1, 1))
        .unwrap()
        .get_style()
        .get_font()
        .unwrap();
    assert!(matches!(font.get_bold(), true));
    assert!(matches!(font.get_italic(), true));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Loop behavior
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn endless_tool_use_hits_iteration_guard() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Name"]]);
    let script = (0..5)
        .map(|_| calls(vec![("read_excel_structure", json!({}))]))
        .collect();
    let (agent, provider) = agent(
        script,
        AgentConfig {
            max_iterations: 4,
            ..AgentConfig::default()
        },
    );

    let id = SessionId::new("guard");
    let out = agent.run("Keep looking", &path, &id).await.unwrap();

    assert_eq!(out.exit_reason, ExitReason::MaxIterations);
    assert_eq!(
        out.response,
        "Stopped: max iterations exceeded (4) before the request was completed."
    );
    assert_eq!(provider.requests.lock().unwrap().len(), 4);
    assert_eq!(out.operations.len(), 4);

    let history = agent.sessions().history(&id).await.unwrap();
    assert_eq!(find_unanswered_call(&history), None);
    assert_eq!(history.last(), Some(&Turn::agent(out.response)));
}

#[tokio::test]
async fn results_follow_call_order_within_one_turn() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Name", "Age"]]);
    let (agent, _) = agent(
        vec![
            calls(vec![
                ("write_excel_cell", json!({"sheet_name": "Data", "cell": "A2", "value": "Eve"})),
                ("no_such_operation", json!({})),
                ("read_excel_values", json!({"sheet_name": "Data", "range_string": "A2"})),
            ]),
            answer("Wrote Eve."),
        ],
        AgentConfig::default(),
    );

    let id = SessionId::new("order");
    let out = agent.run("Put Eve in A2", &path, &id).await.unwrap();
    let names: Vec<&str> = out.operations.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["write_excel_cell", "no_such_operation", "read_excel_values"]
    );

    let history = agent.sessions().history(&id).await.unwrap();
    assert_eq!(
        results(&history),
        vec![
            ("Wrote 'Eve' to A2 successfully.".to_string(), false),
            ("Error: unknown operation 'no_such_operation'".to_string(), true),
            ("Eve".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn second_message_sees_first_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(&dir, &[&["Name"]]);
    let (agent, provider) = agent(
        vec![answer("The sheet is called Data."), answer("It has one column.")],
        AgentConfig::default(),
    );

    let id = SessionId::new("continuity");
    agent.run("What is the sheet called?", &path, &id).await.unwrap();
    agent.run("How many columns?", &path, &id).await.unwrap();

    let requests = provider.requests.lock().unwrap();
    assert_eq!(
        requests[1].turns,
        vec![
            Turn::user("What is the sheet called?"),
            Turn::agent("The sheet is called Data."),
            Turn::user("How many columns?"),
        ]
    );

    // Other sessions start clean.
    drop(requests);
    let other = SessionId::new("someone-else");
    assert!(agent.sessions().history(&other).await.is_none());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Documents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn word_replace_and_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = docx(
        &dir,
        r#"<w:p><w:r><w:t>Draft v1</w:t></w:r></w:p><w:p><w:r><w:t>Owner: TBD</w:t></w:r></w:p>"#,
    );

    let (agent, provider) = agent(
        vec![
            calls(vec![("read_word_text", json!({}))]),
            calls(vec![
                ("replace_word_text", json!({"old_text": "TBD", "new_text": "Dana"})),
                ("append_word_text", json!({"text": "Reviewed."})),
            ]),
            answer("Set the owner and added a note."),
        ],
        AgentConfig::default(),
    );

    let id = SessionId::new("memo");
    agent.run("Make Dana the owner", &path, &id).await.unwrap();

    let system = provider.requests.lock().unwrap()[0].system.clone().unwrap();
    assert!(system.contains("File Type: Word"));

    let history = agent.sessions().history(&id).await.unwrap();
    assert_eq!(
        results(&history),
        vec![
            ("Draft v1\nOwner: TBD".to_string(), false),
            ("Replaced 1 occurrences.".to_string(), false),
            ("Text appended successfully.".to_string(), false),
        ]
    );

    let xml = document_xml(&path);
    assert!(xml.contains("Owner: Dana"));
    let reviewed = xml.find("Reviewed.").unwrap();
    assert!(reviewed < xml.find("<w:sectPr").unwrap());
}
