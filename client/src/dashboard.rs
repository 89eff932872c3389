use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    api::RelayApi,
    debounce::Debouncer,
    error::{ClientError, NavigationError},
    models::FileEntry,
    navigation::{FolderStackEntry, ListScope, Navigation},
    session::{Credential, Session},
};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load files. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub folder_stack: Vec<FolderStackEntry>,
    pub search_query: String,
    pub files: Vec<FileEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn current_folder(&self) -> Option<&FolderStackEntry> {
        self.folder_stack.last()
    }
}

struct DashboardState {
    navigation: Navigation,
    generation: u64,
    files: Vec<FileEntry>,
    loading: bool,
    error: Option<String>,
    debouncer: Debouncer,
}

pub struct Dashboard {
    state: Arc<Mutex<DashboardState>>,
    relay: Arc<dyn RelayApi>,
    credential: Option<Credential>,
    delay: Duration,
}

impl Dashboard {
    pub fn new(relay: Arc<dyn RelayApi>, session: Option<&Session>, delay: Duration) -> Self {
        Self::with_credential(relay, session.and_then(Session::drive_credential), delay)
    }

    pub fn with_credential(
        relay: Arc<dyn RelayApi>,
        credential: Option<Credential>,
        delay: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(DashboardState {
                navigation: Navigation::new(),
                generation: 0,
                files: Vec::new(),
                loading: false,
                error: None,
                debouncer: Debouncer::new(),
            })),
            relay,
            credential,
            delay,
        }
    }

    pub async fn load(&self) {
        let mut state = self.state.lock().await;
        self.schedule_fetch(&mut state, self.delay);
    }

    pub async fn open_folder(&self, entry: &FileEntry) -> Result<(), NavigationError> {
        let mut state = self.state.lock().await;
        state.navigation.open_folder(entry)?;
        self.schedule_fetch(&mut state, self.delay);
        Ok(())
    }

    pub async fn go_back(&self) -> Result<(), NavigationError> {
        let mut state = self.state.lock().await;
        state.navigation.go_back()?;
        self.schedule_fetch(&mut state, self.delay);
        Ok(())
    }

    pub async fn set_search(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.navigation.set_search(text);
        self.schedule_fetch(&mut state, self.delay);
    }

    /// Re-fetches the current scope without waiting out the debounce delay.
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;
        self.schedule_fetch(&mut state, Duration::ZERO);
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<(), ClientError> {
        let message = self
            .relay
            .delete_file(self.credential.as_ref(), file_id)
            .await?;
        debug!(%file_id, %message, "deleted file");
        self.refresh().await;
        Ok(())
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        DashboardView {
            folder_stack: state.navigation.stack(),
            search_query: state.navigation.search_query().to_string(),
            files: state.files.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    fn schedule_fetch(&self, state: &mut DashboardState, delay: Duration) {
        state.generation += 1;
        state.loading = true;

        let generation = state.generation;
        let scope = state.navigation.scope();
        let relay = Arc::clone(&self.relay);
        let credential = self.credential.clone();
        let shared = Arc::clone(&self.state);

        state.debouncer.schedule(delay, async move {
            let result = relay.list_files(credential.as_ref(), &scope).await;
            apply_listing(&shared, generation, &scope, result).await;
        });
    }
}

async fn apply_listing(
    shared: &Mutex<DashboardState>,
    generation: u64,
    scope: &ListScope,
    result: Result<Vec<FileEntry>, ClientError>,
) {
    let mut state = shared.lock().await;
    // a newer navigation change owns the view
    if state.generation != generation {
        debug!(
            generation,
            current = state.generation,
            folder_id = %scope.folder_id,
            "discarding stale listing"
        );
        return;
    }

    state.loading = false;
    match result {
        Ok(files) => {
            state.files = files;
            state.error = None;
        }
        Err(err) => {
            warn!(error = %err, folder_id = %scope.folder_id, "listing failed");
            state.error = Some(LOAD_FAILED_MESSAGE.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;
    use crate::{
        api::testing::{FakeRelay, folder, text_file},
        session::Provider,
    };

    const DELAY: Duration = Duration::from_millis(500);

    fn drive_tree() -> FakeRelay {
        FakeRelay::new()
            .with_listing(
                "root",
                vec![folder("a", "Projects"), text_file("r1", "readme.txt")],
            )
            .with_listing("a", vec![text_file("a1", "plan.txt")])
    }

    fn google_session() -> Session {
        Session {
            access_token: "jwt".into(),
            provider: Provider::Google,
            provider_token: Some("ya29.token".into()),
        }
    }

    async fn loaded(relay: Arc<FakeRelay>) -> Dashboard {
        let dashboard = Dashboard::new(relay, Some(&google_session()), DELAY);
        dashboard.load().await;
        sleep(DELAY + Duration::from_millis(10)).await;
        dashboard
    }

    #[tokio::test(start_paused = true)]
    async fn initial_load_lists_root() {
        let relay = Arc::new(drive_tree());
        let dashboard = Dashboard::new(relay.clone(), Some(&google_session()), DELAY);
        dashboard.load().await;
        assert!(dashboard.view().await.loading);

        sleep(DELAY + Duration::from_millis(10)).await;
        let view = dashboard.view().await;
        assert!(!view.loading);
        assert_eq!(view.files.len(), 2);
        assert_eq!(view.current_folder().map(|f| f.name.as_str()), Some("My Drive"));
        assert_eq!(relay.listed_folders(), vec!["root"]);
    }

    #[tokio::test(start_paused = true)]
    async fn going_back_before_delay_never_fetches_left_folder() {
        let relay = Arc::new(drive_tree());
        let dashboard = loaded(relay.clone()).await;

        dashboard.open_folder(&folder("a", "Projects")).await.unwrap();
        sleep(Duration::from_millis(200)).await;
        dashboard.go_back().await.unwrap();
        sleep(DELAY * 2).await;

        let view = dashboard.view().await;
        assert_eq!(view.folder_stack.len(), 1);
        assert_eq!(view.files[0].id, "a");
        assert_eq!(relay.listed_folders(), vec!["root", "root"]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_for_left_folder_is_discarded() {
        let relay = Arc::new(drive_tree().with_latency("a", Duration::from_secs(2)));
        let dashboard = loaded(relay.clone()).await;

        dashboard.open_folder(&folder("a", "Projects")).await.unwrap();
        // timer fired, listing for "a" is in flight
        sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(relay.listed_folders(), vec!["root", "a"]);

        dashboard.go_back().await.unwrap();
        sleep(Duration::from_secs(5)).await;

        let view = dashboard.view().await;
        let ids: Vec<_> = view.files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "r1"]);
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_collapses_into_one_fetch() {
        let relay = Arc::new(drive_tree());
        let dashboard = loaded(relay.clone()).await;

        for text in ["p", "pl", "pla", "plan"] {
            dashboard.set_search(text).await;
            sleep(Duration::from_millis(100)).await;
        }
        sleep(DELAY).await;

        let calls = relay.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].search_query, "plan");
        assert_eq!(dashboard.view().await.search_query, "plan");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_list_and_navigation() {
        let relay = Arc::new(drive_tree());
        let dashboard = loaded(relay.clone()).await;
        let before = dashboard.view().await.files;

        relay.fail_folder("a");
        dashboard.open_folder(&folder("a", "Projects")).await.unwrap();
        sleep(DELAY * 2).await;

        let view = dashboard.view().await;
        assert_eq!(view.files, before);
        assert_eq!(view.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(view.current_folder().map(|f| f.id.as_str()), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn opening_a_file_is_refused_without_fetching() {
        let relay = Arc::new(drive_tree());
        let dashboard = loaded(relay.clone()).await;

        let err = dashboard
            .open_folder(&text_file("r1", "readme.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationError::NotAFolder(_)));
        assert_eq!(dashboard.go_back().await, Err(NavigationError::AtRoot));

        sleep(DELAY * 2).await;
        assert_eq!(relay.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_refreshes_current_scope_immediately() {
        let relay = Arc::new(drive_tree());
        let dashboard = loaded(relay.clone()).await;

        dashboard.delete_file("r1").await.unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(relay.listed_folders(), vec!["root", "root"]);
    }

    #[tokio::test]
    async fn stale_generation_is_not_applied() {
        let dashboard = Dashboard::with_credential(Arc::new(drive_tree()), None, DELAY);
        {
            let mut state = dashboard.state.lock().await;
            state.generation = 5;
            state.loading = true;
        }

        let scope = ListScope {
            folder_id: "a".into(),
            search_query: String::new(),
        };
        apply_listing(&dashboard.state, 4, &scope, Ok(vec![text_file("a1", "plan.txt")])).await;

        let view = dashboard.view().await;
        assert!(view.files.is_empty());
        assert!(view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn non_google_session_sends_no_credential() {
        let relay = Arc::new(drive_tree());
        let session = Session {
            access_token: "jwt".into(),
            provider: Provider::Github,
            provider_token: Some("gho_token".into()),
        };
        let dashboard = Dashboard::new(relay, Some(&session), DELAY);
        assert!(dashboard.credential.is_none());
    }
}
