mod common;

use chrono::Duration;
use tempfile::TempDir;

use codesage_lib::problems::problem::Difficulty;
use codesage_lib::sessions::store::{load_sessions_newest_first, FileSessionStore, SessionStore, SESSIONS_FILE};
use codesage_lib::sessions::{ChatMessage, InterviewResult, InterviewSession};

use common::{good_report, problem};

fn store_in(dir: &TempDir) -> FileSessionStore {
    FileSessionStore::new(dir.path().join(SESSIONS_FILE))
}

fn finished_session() -> InterviewSession {
    InterviewSession::finalize(vec![InterviewResult {
        problem: problem("Two Sum", Difficulty::Easy),
        code: "def two_sum(nums, target):\n    return []\n".to_string(),
        report: good_report(),
        chat_history: vec![ChatMessage::ai("Hello!"), ChatMessage::user("hint please")],
    }])
}

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    assert!(store_in(&dir).load_all().await.is_empty());
}

#[tokio::test]
async fn test_blank_and_corrupt_files_read_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    std::fs::write(store.path(), "   \n").unwrap();
    assert!(store.load_all().await.is_empty());

    std::fs::write(store.path(), "[{\"id\": \"trunc").unwrap();
    assert!(store.load_all().await.is_empty());
}

#[tokio::test]
async fn test_append_keeps_insertion_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let first = finished_session();
    let second = finished_session();
    store.append(first.clone()).await.unwrap();
    store.append(second.clone()).await.unwrap();

    assert_eq!(store.load_all().await, vec![first, second]);
    assert!(!dir.path().join("interview_sessions.json.tmp").exists());
}

#[tokio::test]
async fn test_append_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested").join(SESSIONS_FILE));

    store.append(finished_session()).await.unwrap();
    assert_eq!(store.load_all().await.len(), 1);
}

#[tokio::test]
async fn test_corrupt_store_is_moved_aside_on_append() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "not json at all").unwrap();

    let session = finished_session();
    store.append(session.clone()).await.unwrap();

    let backup = dir.path().join("interview_sessions.json.corrupt");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "not json at all");
    assert_eq!(store.load_all().await, vec![session]);
}

#[tokio::test]
async fn test_dashboard_order_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut oldest = finished_session();
    oldest.timestamp = oldest.timestamp - Duration::hours(5);
    let mut middle = finished_session();
    middle.timestamp = middle.timestamp - Duration::hours(1);
    let newest = finished_session();

    store.append(middle.clone()).await.unwrap();
    store.append(oldest.clone()).await.unwrap();
    store.append(newest.clone()).await.unwrap();

    let ids: Vec<String> = load_sessions_newest_first(&store)
        .await
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
}

#[tokio::test]
async fn test_stored_json_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.append(finished_session()).await.unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let session = &raw[0];
    assert!(session["candidateName"].is_string());
    assert!(session["timestamp"].is_string());

    let result = &session["results"][0];
    assert!(result["chatHistory"].is_array());
    assert_eq!(result["chatHistory"][0]["role"], "ai");
    assert_eq!(result["problem"]["initialCode"], "def two_sum():\n    pass\n");
    assert_eq!(result["problem"]["difficulty"], "easy");
    assert_eq!(result["report"]["problemSolving"], "very effective");
}
