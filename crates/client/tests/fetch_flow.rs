use async_trait::async_trait;
use codelore_client::{
    AnalysisBundle, AnalysisSession, AnalysisSource, FetchError, FetchOrchestrator, RefreshScope,
    Result, SessionState,
};
use codelore_protocol::{
    ArchitectureResponse, DependenciesResponse, Endpoint, EvolutionResponse, FileRolesResponse,
    HealthResponse,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory service: every endpoint answers from a JSON document or with an
/// error, after a per-endpoint delay.
#[derive(Default)]
struct FakeService {
    replies: HashMap<Endpoint, std::result::Result<serde_json::Value, FetchError>>,
    delays: HashMap<Endpoint, Duration>,
    calls: Mutex<Vec<(Endpoint, String)>>,
}

impl FakeService {
    fn reply(mut self, endpoint: Endpoint, body: serde_json::Value) -> Self {
        self.replies.insert(endpoint, Ok(body));
        self
    }

    fn fail(mut self, endpoint: Endpoint, err: FetchError) -> Self {
        self.replies.insert(endpoint, Err(err));
        self
    }

    fn delay(mut self, endpoint: Endpoint, millis: u64) -> Self {
        self.delays.insert(endpoint, Duration::from_millis(millis));
        self
    }

    fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }

    async fn answer<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        repository: &str,
    ) -> Result<T> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint, repository.to_string()));
        if let Some(delay) = self.delays.get(&endpoint) {
            tokio::time::sleep(*delay).await;
        }
        let body = match self.replies.get(&endpoint) {
            Some(Ok(body)) => body.clone(),
            Some(Err(err)) => return Err(err.clone()),
            None => serde_json::json!({}),
        };
        codelore_protocol::ApiReply::<T>::from_value(body)
            .map_err(|err| FetchError::Decode {
                endpoint,
                detail: err.to_string(),
            })?
            .into_result()
            .map_err(FetchError::Source)
    }
}

#[async_trait]
impl AnalysisSource for FakeService {
    async fn architecture(&self, repository: &str) -> Result<ArchitectureResponse> {
        self.answer(Endpoint::Architecture, repository).await
    }

    async fn file_roles(&self, repository: &str) -> Result<FileRolesResponse> {
        self.answer(Endpoint::FileRoles, repository).await
    }

    async fn evolution(&self, repository: &str) -> Result<EvolutionResponse> {
        self.answer(Endpoint::Evolution, repository).await
    }

    async fn dependencies(&self, repository: &str) -> Result<DependenciesResponse> {
        self.answer(Endpoint::Dependencies, repository).await
    }

    async fn ping(&self) -> Result<HealthResponse> {
        self.answer(Endpoint::Health, "").await
    }
}

fn roles_body() -> serde_json::Value {
    serde_json::json!({
        "repo": "https://github.com/o/r",
        "total_files_analyzed": 2,
        "file_roles": {
            "src/App.tsx": {"role": "Root component", "category": "UI Component", "complexity": "medium"},
            "api/main.py": {"role": "HTTP entry point", "category": "API Endpoint", "complexity": "high"}
        }
    })
}

fn evolution_body() -> serde_json::Value {
    serde_json::json!({
        "repo": "https://github.com/o/r",
        "file_evolution": {
            "src/App.tsx": [
                {"commit_sha": "bbbbbbbbbbbb", "timestamp": "2024-02-01T10:00:00+00:00", "author": "B",
                 "summary": "Tweak layout", "change_type": "modified", "additions": 3, "deletions": 1},
                {"commit_sha": "aaaaaaaaaaaa", "timestamp": "2024-01-01T10:00:00+00:00", "author": "A",
                 "summary": "Initial", "change_type": "added", "additions": 40, "deletions": 0}
            ],
            "README.md": [
                {"commit_sha": "cccccccccccc", "timestamp": "2024-01-02T10:00:00+00:00", "author": "A",
                 "summary": "Docs", "change_type": "added", "additions": 5, "deletions": 0}
            ]
        }
    })
}

fn dependencies_body() -> serde_json::Value {
    serde_json::json!({
        "dependencies": {
            "src/App.tsx": {
                "imports": [
                    {"module": "src/api.ts", "type": "internal"},
                    {"module": "react", "type": "external"}
                ],
                "exports": ["App"],
                "imported_by": ["src/main.tsx"]
            }
        },
        "mermaid_diagram": "graph TD\n  A[App] --> B[api]"
    })
}

fn explorer_service() -> FakeService {
    FakeService::default()
        .reply(Endpoint::FileRoles, roles_body())
        .reply(Endpoint::Evolution, evolution_body())
        .reply(Endpoint::Dependencies, dependencies_body())
}

#[tokio::test]
async fn explorer_scope_merges_three_sources() {
    let service = Arc::new(explorer_service());
    let orchestrator = FetchOrchestrator::new(service.clone());

    let bundle = orchestrator
        .fetch("  https://github.com/o/r  ", RefreshScope::Explorer)
        .await
        .expect("fetch");
    assert_eq!(bundle.repository, "https://github.com/o/r");
    assert!(bundle.architecture.is_none());

    let insights = bundle.assemble();
    let paths: Vec<&str> = insights.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/App.tsx", "api/main.py", "README.md"]);

    let app = &insights[0];
    assert_eq!(app.history.len(), 2);
    assert_eq!(app.history[0].commit_id, "bbbbbbbbbbbb");
    assert_eq!(
        app.connections.imports_internal.iter().collect::<Vec<_>>(),
        vec!["src/api.ts"]
    );
    assert_eq!(app.lifecycle.as_ref().map(|l| l.total_commits), Some(2));

    let readme = &insights[2];
    assert_eq!(readme.category().label(), "Other");
    assert!(readme.connections.is_empty());

    let mut called = service.calls();
    called.sort_by_key(|e| e.as_str());
    assert_eq!(
        called,
        vec![Endpoint::Dependencies, Endpoint::Evolution, Endpoint::FileRoles]
    );
}

#[tokio::test]
async fn source_error_discards_the_whole_run() {
    let service = FakeService::default()
        .reply(Endpoint::FileRoles, roles_body())
        .reply(Endpoint::Evolution, serde_json::json!({"error": "not found"}))
        .reply(Endpoint::Dependencies, dependencies_body());
    let orchestrator = FetchOrchestrator::new(Arc::new(service));

    let err = orchestrator
        .fetch("https://github.com/o/missing", RefreshScope::Explorer)
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Source("not found".to_string()));
    assert_eq!(err.to_string(), "not found");
}

#[tokio::test(start_paused = true)]
async fn first_error_follows_query_order_not_arrival() {
    let service = FakeService::default()
        .reply(Endpoint::Architecture, serde_json::json!({}))
        .fail(Endpoint::FileRoles, FetchError::Source("roles failed".to_string()))
        .delay(Endpoint::FileRoles, 500)
        .fail(Endpoint::Dependencies, FetchError::Source("deps failed".to_string()))
        .delay(Endpoint::Dependencies, 10);
    let orchestrator = FetchOrchestrator::new(Arc::new(service));

    let err = orchestrator
        .fetch("r", RefreshScope::Dashboard)
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Source("roles failed".to_string()));
}

#[tokio::test(start_paused = true)]
async fn queries_run_concurrently() {
    let service = explorer_service()
        .delay(Endpoint::FileRoles, 300)
        .delay(Endpoint::Evolution, 300)
        .delay(Endpoint::Dependencies, 300);
    let orchestrator = FetchOrchestrator::new(Arc::new(service));

    let started = tokio::time::Instant::now();
    orchestrator
        .fetch("r", RefreshScope::Explorer)
        .await
        .expect("fetch");
    assert!(started.elapsed() < Duration::from_millis(600));
}

#[tokio::test]
async fn blank_repository_is_rejected_before_any_query() {
    let service = Arc::new(explorer_service());
    let orchestrator = FetchOrchestrator::new(service.clone());

    let err = orchestrator
        .fetch("   ", RefreshScope::Dashboard)
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::EmptyRepository);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn timeline_scope_only_queries_evolution() {
    let service = Arc::new(explorer_service());
    let orchestrator = FetchOrchestrator::new(service.clone());

    let bundle = orchestrator
        .fetch("r", RefreshScope::Timeline)
        .await
        .expect("fetch");
    assert_eq!(service.calls(), vec![Endpoint::Evolution]);
    assert!(bundle.roles.is_none());

    let insights = bundle.assemble();
    assert_eq!(insights.len(), 2);
    assert!(insights.iter().all(|f| f.category().label() == "Other"));
}

#[tokio::test]
async fn session_publishes_only_successful_runs() {
    let orchestrator = FetchOrchestrator::new(Arc::new(explorer_service()));
    let mut session = AnalysisSession::new();

    let state = session
        .analyze(&orchestrator, "https://github.com/o/r", RefreshScope::Explorer)
        .await;
    assert!(matches!(state, SessionState::Loaded(_)));
    assert_eq!(session.insights().len(), 3);

    let failing = FetchOrchestrator::new(Arc::new(
        FakeService::default().reply(Endpoint::Evolution, serde_json::json!({"error": "not found"})),
    ));
    let state = session
        .analyze(&failing, "https://github.com/o/r", RefreshScope::Timeline)
        .await;
    assert_eq!(
        state,
        &SessionState::Failed(FetchError::Source("not found".to_string()))
    );
    assert!(session.insights().is_empty());
}

#[tokio::test]
async fn late_result_of_abandoned_run_is_ignored() {
    let orchestrator = FetchOrchestrator::new(Arc::new(explorer_service()));
    let mut session = AnalysisSession::new();

    let abandoned = session.begin("https://github.com/o/old");
    let current = session.begin("https://github.com/o/r");

    let current_result = orchestrator
        .fetch(current.repository(), RefreshScope::Explorer)
        .await;
    assert!(session.complete(current, current_result));

    let stale: Result<AnalysisBundle> = Err(FetchError::Source("late".to_string()));
    assert!(!session.complete(abandoned, stale));
    assert_eq!(
        session.snapshot().map(|s| s.repository.as_str()),
        Some("https://github.com/o/r")
    );
}

#[tokio::test]
async fn ping_passes_through() {
    let service = FakeService::default().reply(
        Endpoint::Health,
        serde_json::json!({"message": "CodeLore API is running"}),
    );
    let orchestrator = FetchOrchestrator::new(Arc::new(service));
    let health = orchestrator.ping().await.expect("ping");
    assert_eq!(health.message, "CodeLore API is running");
}
