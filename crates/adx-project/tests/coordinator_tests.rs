//! Coordinator behavior: activation, cross-file re-lint cascades,
//! deletion teardown, debounce supersession, and stale-pass discard.

use adx_linter::{FileStat, Linter};
use adx_project::{
    CollectingSink, Coordinator, Document, DocumentProvider, FileSystem,
};
use adx_template::{codes, FileId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ROOT: &str = "/ws/MyTemplate";

/// In-memory host: a path → text map doubling as the filesystem oracle.
/// Reads capture the text at call time, then optionally sleep, modelling
/// a slow cross-file fetch that completes after newer changes landed.
#[derive(Clone, Default)]
struct MemoryHost {
    inner: Arc<Mutex<HostState>>,
}

#[derive(Default)]
struct HostState {
    files: HashMap<String, String>,
    read_delays: HashMap<String, Duration>,
    version: i64,
}

impl MemoryHost {
    fn insert(&self, path: &str, text: &str) {
        let mut state = self.inner.lock().unwrap();
        state.files.insert(path.to_string(), text.to_string());
        state.version += 1;
    }

    fn remove(&self, path: &str) {
        self.inner.lock().unwrap().files.remove(path);
    }

    /// Delay the next read of `path` (one-shot).
    fn delay_next_read(&self, path: &str, delay: Duration) {
        self.inner
            .lock()
            .unwrap()
            .read_delays
            .insert(path.to_string(), delay);
    }
}

impl DocumentProvider for MemoryHost {
    async fn read(&self, file: &FileId) -> Option<Document> {
        let (text, version, delay) = {
            let mut state = self.inner.lock().unwrap();
            let text = state.files.get(file.as_str()).cloned()?;
            let delay = state.read_delays.remove(file.as_str());
            (text, state.version, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Some(Document { text, version })
    }
}

impl FileSystem for MemoryHost {
    fn stat(&self, path: &std::path::Path) -> FileStat {
        let state = self.inner.lock().unwrap();
        let path = path.to_string_lossy();
        if state.files.contains_key(path.as_ref()) {
            FileStat {
                exists: true,
                is_file: true,
                is_dir: false,
            }
        } else if state
            .files
            .keys()
            .any(|file| file.starts_with(&format!("{path}/")))
        {
            FileStat {
                exists: true,
                is_file: false,
                is_dir: true,
            }
        } else {
            FileStat::default()
        }
    }
}

fn abs(rel: &str) -> FileId {
    FileId::new(format!("{ROOT}/{rel}"))
}

fn coordinator(
    host: &MemoryHost,
) -> (Coordinator<MemoryHost, MemoryHost, Arc<CollectingSink>>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let coordinator = Coordinator::new(
        host.clone(),
        host.clone(),
        Arc::clone(&sink),
        Linter::default(),
    )
    .with_debounce(Duration::ZERO);
    (coordinator, sink)
}

fn seed_template(host: &MemoryHost) {
    host.insert(
        &format!("{ROOT}/template-info.json"),
        r#"{
  "templateType": "app",
  "name": "MyTemplate",
  "variableDefinition": "variables.json",
  "uiDefinition": "ui.json",
  "dashboards": [{"file": "dash.json", "label": "Dash"}]
}"#,
    );
    host.insert(
        &format!("{ROOT}/variables.json"),
        r#"{"var1": {"variableType": {"type": "StringType"}}}"#,
    );
    host.insert(
        &format!("{ROOT}/ui.json"),
        r#"{"pages": [{"variables": [{"name": "var1"}]}]}"#,
    );
    host.insert(&format!("{ROOT}/dash.json"), "{}");
}

#[tokio::test]
async fn test_opening_manifest_lints_whole_template() {
    let host = MemoryHost::default();
    seed_template(&host);
    let (coordinator, sink) = coordinator(&host);

    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;

    assert_eq!(coordinator.active_roots(), vec![std::path::PathBuf::from(ROOT)]);
    assert_eq!(sink.get(&abs("template-info.json")), Some(Vec::new()));
    assert_eq!(sink.get(&abs("variables.json")), Some(Vec::new()));
    assert_eq!(sink.get(&abs("ui.json")), Some(Vec::new()));
    // dash.json is referenced but not a linted role.
    assert_eq!(sink.get(&abs("dash.json")), None);
}

#[tokio::test]
async fn test_opening_related_file_activates_via_ancestor_manifest() {
    let host = MemoryHost::default();
    seed_template(&host);
    let (coordinator, sink) = coordinator(&host);

    coordinator.on_document_opened(abs("ui.json")).await;

    assert_eq!(coordinator.active_roots().len(), 1);
    assert!(sink.get(&abs("ui.json")).is_some());
}

#[tokio::test]
async fn test_variables_change_relints_ui() {
    let host = MemoryHost::default();
    seed_template(&host);
    let (coordinator, sink) = coordinator(&host);
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;
    assert_eq!(sink.get(&abs("ui.json")), Some(Vec::new()));

    // Renaming the variable breaks the ui.json reference.
    host.insert(
        &format!("{ROOT}/variables.json"),
        r#"{"var2": {"variableType": {"type": "StringType"}}}"#,
    );
    coordinator.on_document_changed(abs("variables.json")).await;

    let ui_diags = sink.get(&abs("ui.json")).unwrap();
    assert_eq!(ui_diags.len(), 1);
    assert_eq!(ui_diags[0].code, codes::PAGE_UNKNOWN_VARIABLE);
    assert_eq!(
        ui_diags[0].message,
        "Cannot find variable 'var1', did you mean 'var2'?"
    );

    // Restoring the variable clears the diagnostic again.
    host.insert(
        &format!("{ROOT}/variables.json"),
        r#"{"var1": {"variableType": {"type": "StringType"}}}"#,
    );
    coordinator.on_document_changed(abs("variables.json")).await;
    assert_eq!(sink.get(&abs("ui.json")), Some(Vec::new()));
}

#[tokio::test]
async fn test_syntax_errors_published_for_broken_file() {
    let host = MemoryHost::default();
    seed_template(&host);
    host.insert(&format!("{ROOT}/ui.json"), r#"{"pages": ["#);
    let (coordinator, sink) = coordinator(&host);

    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;

    let ui_diags = sink.get(&abs("ui.json")).unwrap();
    assert!(!ui_diags.is_empty());
    assert!(ui_diags.iter().all(|d| d.code == codes::SYNTAX));
}

#[tokio::test]
async fn test_deleting_related_file_flags_manifest_and_clears_file() {
    let host = MemoryHost::default();
    seed_template(&host);
    let (coordinator, sink) = coordinator(&host);
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;

    host.remove(&format!("{ROOT}/dash.json"));
    coordinator.on_file_deleted(abs("dash.json")).await;

    // Template stays active; the manifest now warns about the path.
    assert_eq!(coordinator.active_roots().len(), 1);
    let manifest_diags = sink.get(&abs("template-info.json")).unwrap();
    assert_eq!(manifest_diags.len(), 1);
    assert_eq!(manifest_diags[0].code, codes::REL_PATH_NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_root_directory_clears_every_file() {
    let host = MemoryHost::default();
    seed_template(&host);
    // Give the template something to complain about so the published
    // sets are non-empty before the deletion.
    host.insert(
        &format!("{ROOT}/ui.json"),
        r#"{"pages": [{"variables": [{"name": "ghost"}]}]}"#,
    );
    let (coordinator, sink) = coordinator(&host);
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;
    assert!(!sink.get(&abs("ui.json")).unwrap().is_empty());

    coordinator.on_file_deleted(FileId::new(ROOT)).await;

    assert!(coordinator.active_roots().is_empty());
    assert_eq!(sink.get(&abs("template-info.json")), None);
    assert_eq!(sink.get(&abs("variables.json")), None);
    assert_eq!(sink.get(&abs("ui.json")), None);
}

#[tokio::test]
async fn test_deleting_manifest_deactivates_template() {
    let host = MemoryHost::default();
    seed_template(&host);
    let (coordinator, sink) = coordinator(&host);
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;

    host.remove(&format!("{ROOT}/template-info.json"));
    coordinator
        .on_file_deleted(abs("template-info.json"))
        .await;

    assert!(coordinator.active_roots().is_empty());
    assert_eq!(sink.get(&abs("variables.json")), None);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_change_is_superseded() {
    let host = MemoryHost::default();
    seed_template(&host);
    let sink = Arc::new(CollectingSink::default());
    let coordinator = Arc::new(
        Coordinator::new(
            host.clone(),
            host.clone(),
            Arc::clone(&sink),
            Linter::default(),
        )
        .with_debounce(Duration::from_millis(50)),
    );
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;
    let baseline = sink.publish_count(&abs("ui.json"));

    // Two rapid changes to the same file: the first pass must observe the
    // newer generation during its debounce window and yield.
    let first = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.on_document_changed(abs("ui.json")).await }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.on_document_changed(abs("ui.json")).await }
    });
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(sink.publish_count(&abs("ui.json")), baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_pass_is_discarded() {
    let host = MemoryHost::default();
    seed_template(&host);
    let sink = Arc::new(CollectingSink::default());
    let coordinator = Arc::new(
        Coordinator::new(
            host.clone(),
            host.clone(),
            Arc::clone(&sink),
            Linter::default(),
        )
        .with_debounce(Duration::ZERO),
    );
    coordinator
        .on_document_opened(abs("template-info.json"))
        .await;

    // Break the variables file, and make the in-flight pass slow to read
    // it so a newer change lands first.
    host.insert(&format!("{ROOT}/variables.json"), r#"{"broken": {}}"#);
    host.delay_next_read(
        &format!("{ROOT}/variables.json"),
        Duration::from_millis(100),
    );
    let slow = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.on_document_changed(abs("variables.json")).await }
    });

    tokio::time::sleep(Duration::from_millis(5)).await;
    host.insert(
        &format!("{ROOT}/variables.json"),
        r#"{"var1": {"variableType": {"type": "StringType"}}}"#,
    );
    let fast = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.on_document_changed(abs("variables.json")).await }
    });

    slow.await.unwrap();
    fast.await.unwrap();

    // The slow pass read the broken content but finished last; its result
    // must have been discarded, leaving ui.json clean.
    assert_eq!(sink.get(&abs("ui.json")), Some(Vec::new()));
}
