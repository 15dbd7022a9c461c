//! Application state management for the DigiTrack TUI.
//!
//! This module contains the core `App` struct that manages all
//! application state: the authentication guard, form state for every
//! data-entry tab, fetched/cached data, and background task
//! coordination.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveTime};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use digitrack_core::api::{ApiClient, ApiError};
use digitrack_core::auth::{CredentialStore, SessionStore};
use digitrack_core::cache::{CacheAges, CacheManager};
use digitrack_core::config::Config;
use digitrack_core::models::{
    DailyReport, MonthlyReport, NewSortedWaste, NewWasteIntake, NewWasteSale, PanchayatReport,
    Role, SalesSummary, SortedWaste, User, UserCreate, WasteCategory, WasteIntake, WasteSale,
};

use crate::forms::{Field, Form};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 covers a full refresh (a handful of list fetches plus per-intake
/// sorted-waste results) with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum concurrent API requests for per-intake sorted-waste fetches.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Authentication guard state, checked on every rendered frame.
///
/// `Loading` exists so no protected view can render against a session
/// that has not been read from disk yet; it is entered exactly once, at
/// startup, and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Which screen the unauthenticated side shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
}

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Intake,
    Sorting,
    Sales,
    Reports,
    Users,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Intake => "Intake",
            Tab::Sorting => "Sorting",
            Tab::Sales => "Sales",
            Tab::Reports => "Reports",
            Tab::Users => "Users",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Intake,
            Tab::Intake => Tab::Sorting,
            Tab::Sorting => Tab::Sales,
            Tab::Sales => Tab::Reports,
            Tab::Reports => Tab::Users,
            Tab::Users => Tab::Dashboard,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Users,
            Tab::Intake => Tab::Dashboard,
            Tab::Sorting => Tab::Intake,
            Tab::Sales => Tab::Sorting,
            Tab::Reports => Tab::Sales,
            Tab::Users => Tab::Reports,
        }
    }
}

/// Current UI focus area (entry form or record list)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// Overall application state (overlays on top of the authenticated shell)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// The report the Reports tab is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    Daily,
    Monthly,
    Panchayat,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background tasks back to the main loop.
enum TaskResult {
    Intakes(Vec<WasteIntake>),
    Sorted(String, Vec<SortedWaste>),
    Sales(Vec<WasteSale>),
    SalesSummary(SalesSummary),
    Users(Vec<User>),
    Categories(Vec<WasteCategory>),
    Daily(DailyReport),
    Monthly(MonthlyReport),
    Panchayat(PanchayatReport),
    /// A form submission was accepted; carries the created record.
    Submitted(Submitted),
    /// A submission or fetch failed for a user-visible reason.
    Failed(String),
    /// The server stopped accepting our token.
    SessionExpired,
    /// All refresh tasks have completed.
    RefreshComplete,
}

/// Which form's submission completed, so the right form resets and the
/// right list refetches.
enum Submitted {
    Intake(WasteIntake),
    Sorted(SortedWaste),
    Sale(WasteSale),
    User(User),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub cache: CacheManager,

    // Guard + UI state
    pub auth_state: AuthState,
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,

    // Unauthenticated screens
    pub auth_screen: AuthScreen,
    pub login_form: Form,
    pub register_form: Form,
    pub login_error: Option<String>,
    pub auth_notice: Option<String>,

    // Per-tab entry forms
    pub intake_form: Form,
    pub sorting_form: Form,
    pub sale_form: Form,
    pub user_form: Form,
    pub report_form: Form,

    // Fetched data
    pub intakes: Vec<WasteIntake>,
    pub sorted: HashMap<String, Vec<SortedWaste>>,
    pub sales: Vec<WasteSale>,
    pub sales_summary: Option<SalesSummary>,
    pub users: Vec<User>,
    pub categories: Vec<WasteCategory>,
    pub daily_report: Option<DailyReport>,
    pub monthly_report: Option<MonthlyReport>,
    pub panchayat_report: Option<PanchayatReport>,

    // Selection indices
    pub intake_selection: usize,
    pub sorting_selection: usize,
    pub sale_selection: usize,
    pub user_selection: usize,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // One in-flight submission per form instance
    pub submitting: bool,

    // Status message + cache freshness for the status bar
    pub status_message: Option<String>,
    pub cache_ages: CacheAges,
}

impl App {
    pub fn new(
        config: Config,
        session: Arc<SessionStore>,
        api: ApiClient,
        cache: CacheManager,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let role_options: Vec<String> = Role::ALL.iter().map(|r| r.to_string()).collect();

        Self {
            config,
            session,
            api,
            cache,

            auth_state: AuthState::Loading,
            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::Form,

            auth_screen: AuthScreen::Login,
            login_form: Form::new(vec![
                Field::text("Email", true),
                Field::password("Password", true),
                Field::select("Remember password", vec!["no".into(), "yes".into()]),
            ]),
            register_form: Form::new(vec![
                Field::text("Email", true),
                Field::text("Full name", true),
                Field::password("Password", true),
                Field::select("Role", role_options.clone()),
                Field::text("MRF ID", false),
            ]),
            login_error: None,
            auth_notice: None,

            intake_form: Form::new(vec![
                Field::date("Date", true),
                Field::text("Vehicle ID", true),
                Field::number("Weight (kg)", true),
                Field::text("Notes", false),
            ]),
            sorting_form: Form::new(vec![
                Field::select("Category", Vec::new()),
                Field::number("Weight (kg)", true),
                Field::date("Date", true),
                Field::text("Notes", false),
            ]),
            sale_form: Form::new(vec![
                Field::select("Category", Vec::new()),
                Field::number("Weight (kg)", true),
                Field::number("Unit price", true),
                Field::text("Buyer name", true),
                Field::text("Buyer contact", false),
                Field::date("Date", true),
                Field::text("Notes", false),
            ]),
            user_form: Form::new(vec![
                Field::text("Email", true),
                Field::text("Full name", true),
                Field::password("Password", true),
                Field::select("Role", role_options),
                Field::text("MRF ID", false),
            ]),
            report_form: Form::new(vec![
                Field::select(
                    "Report",
                    vec!["daily".into(), "monthly".into(), "panchayat".into()],
                ),
                Field::date("From", true),
                Field::date("To", false),
            ]),

            intakes: Vec::new(),
            sorted: HashMap::new(),
            sales: Vec::new(),
            sales_summary: None,
            users: Vec::new(),
            categories: Vec::new(),
            daily_report: None,
            monthly_report: None,
            panchayat_report: None,

            intake_selection: 0,
            sorting_selection: 0,
            sale_selection: 0,
            user_selection: 0,

            task_rx,
            task_tx,

            submitting: false,

            status_message: None,
            cache_ages: Default::default(),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Resolve the startup session exactly once: rehydrate from disk and
    /// leave the `Loading` state for good. Also pre-fills the login form
    /// from config/keychain and warms the UI from cache.
    pub fn bootstrap(&mut self) {
        let session = self.session.initialize();
        self.auth_state = if session.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };

        if let Some(email) = self.config.last_email.clone() {
            self.login_form.set_value("Email", email.clone());
            if CredentialStore::is_remembered(&email) {
                if let Ok(password) = CredentialStore::recall(&email) {
                    self.login_form.set_value("Password", password);
                    self.login_form.set_value("Remember password", "yes");
                }
            }
        }

        if let Err(e) = self.load_from_cache() {
            warn!(error = %e, "Failed to load cache at startup");
        }

        if self.auth_state == AuthState::Authenticated && self.is_cache_stale() {
            info!("Session rehydrated, refreshing stale data");
            self.refresh_all_background();
        }
    }

    /// Attempt login with the credentials from the login form.
    pub async fn attempt_login(&mut self) {
        self.auth_notice = None;
        if !self.login_form.validate() {
            return;
        }

        let email = self.login_form.value("Email").to_string();
        let password = self.login_form.value("Password").to_string();
        let remember = self.login_form.value("Remember password") == "yes";

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(session) => {
                // The identity shown from here on is the server's user
                // record, never the submitted credentials.
                info!(user = %session.user.email, "Login successful");

                if remember {
                    if let Err(e) = CredentialStore::remember(&email, &password) {
                        warn!(error = %e, "Failed to store password in keychain");
                    }
                } else if CredentialStore::is_remembered(&email) {
                    let _ = CredentialStore::forget(&email);
                }

                self.config.last_email = Some(email);
                if self.config.mrf_id.is_none() {
                    self.config.mrf_id = session.user.mrf_id.clone();
                }
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_form.set_value("Password", "");
                self.login_error = None;
                self.auth_state = AuthState::Authenticated;
                self.current_tab = Tab::Dashboard;
                self.refresh_all_background();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(match e {
                    ApiError::InvalidCredentials => "Invalid email or password".to_string(),
                    ApiError::NetworkError(_) => {
                        "Unable to connect to server. Check your connection and retry.".to_string()
                    }
                    ApiError::ServerError(_) => {
                        "The server had a problem. Please try again.".to_string()
                    }
                    other => format!("Login failed: {}", other),
                });
            }
        }
    }

    /// Submit the registration form; on success flips back to the login
    /// screen with the new email pre-filled.
    pub async fn attempt_register(&mut self) {
        if !self.register_form.validate() {
            return;
        }

        let payload = UserCreate {
            email: self.register_form.value("Email").to_string(),
            full_name: self.register_form.value("Full name").to_string(),
            role: parse_role(self.register_form.value("Role")),
            mrf_id: self.register_form.optional("MRF ID"),
            password: self.register_form.value("Password").to_string(),
        };

        match self.api.register(&payload).await {
            Ok(user) => {
                info!(user = %user.email, "Account created");
                self.login_form.set_value("Email", user.email);
                self.login_form.set_value("Password", "");
                self.register_form.reset();
                self.auth_screen = AuthScreen::Login;
                self.auth_notice = Some("Account created. Log in to continue.".to_string());
                self.login_error = None;
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.login_error = Some(match e {
                    ApiError::Validation(detail) => detail,
                    ApiError::NetworkError(_) => {
                        "Unable to connect to server. Check your connection and retry.".to_string()
                    }
                    other => format!("Registration failed: {}", other),
                });
            }
        }
    }

    /// Clear the session and drop to the login screen. Idempotent; any
    /// protected view currently shown is abandoned.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear_session() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.auth_state = AuthState::Unauthenticated;
        self.auth_screen = AuthScreen::Login;
        self.state = AppState::Normal;
        self.current_tab = Tab::Dashboard;
        self.focus = Focus::Form;
        self.login_form.set_value("Password", "");
        self.login_error = None;
        self.status_message = None;
        self.submitting = false;

        // Nothing fetched under the old session stays on screen
        self.intakes.clear();
        self.sorted.clear();
        self.sales.clear();
        self.sales_summary = None;
        self.users.clear();
        self.daily_report = None;
        self.monthly_report = None;
        self.panchayat_report = None;

        info!("Logged out");
    }

    /// The facility this client works against: the logged-in user's MRF
    /// if the account has one, otherwise the configured value.
    pub fn mrf_id(&self) -> Option<String> {
        self.session
            .user()
            .and_then(|u| u.mrf_id)
            .or_else(|| self.config.mrf_id.clone())
    }

    fn operator_id(&self) -> String {
        // The server overwrites this with the authenticated user anyway.
        self.session.user().map(|u| u.id).unwrap_or_default()
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// Load all data from cache so the UI has content before (or without)
    /// a refresh.
    pub fn load_from_cache(&mut self) -> anyhow::Result<()> {
        if let Ok(Some(cached)) = self.cache.load_intakes() {
            self.intakes = cached.data;
        }
        if let Ok(Some(cached)) = self.cache.load_sales() {
            self.sales = cached.data;
        }
        if let Ok(Some(cached)) = self.cache.load_users() {
            self.users = cached.data;
        }
        if let Ok(Some(cached)) = self.cache.load_categories() {
            self.categories = cached.data;
            self.apply_category_options();
        }

        for intake in &self.intakes {
            if let Ok(Some(cached)) = self.cache.load_sorted(&intake.id) {
                self.sorted.insert(intake.id.clone(), cached.data);
            }
        }

        self.cache_ages = self.cache.get_cache_ages();
        Ok(())
    }

    pub fn is_cache_stale(&self) -> bool {
        self.cache.any_stale()
    }

    fn apply_category_options(&mut self) {
        let options: Vec<String> = self.categories.iter().map(|c| c.name.clone()).collect();
        self.sorting_form.set_options("Category", options.clone());
        self.sale_form.set_options("Category", options);
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all lists.
    pub fn refresh_all_background(&mut self) {
        let Some(mrf_id) = self.mrf_id() else {
            warn!("No MRF configured, skipping refresh");
            self.status_message =
                Some("No MRF configured - set mrf_id in config.json".to_string());
            return;
        };

        info!(mrf = %mrf_id, "Starting background refresh");
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api, mrf_id).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    async fn execute_background_refresh(tx: mpsc::Sender<TaskResult>, api: ApiClient, mrf_id: String) {
        let (intakes_res, sales_res, users_res, categories_res, summary_res) = tokio::join!(
            api.fetch_intakes(&mrf_id, None),
            api.fetch_sales(&mrf_id, None, None),
            api.fetch_users(Some(&mrf_id)),
            api.fetch_categories(),
            api.sales_summary(&mrf_id, None),
        );

        // Intake ids drive the per-intake sorted fetch below
        let intake_ids: Vec<String> = intakes_res
            .as_ref()
            .map(|list| list.iter().map(|i| i.id.clone()).collect())
            .unwrap_or_default();

        Self::send_fetch_result(&tx, "Intakes", intakes_res, TaskResult::Intakes).await;
        Self::send_fetch_result(&tx, "Sales", sales_res, TaskResult::Sales).await;
        Self::send_fetch_result(&tx, "Categories", categories_res, TaskResult::Categories).await;
        Self::send_fetch_result(&tx, "Summary", summary_res, TaskResult::SalesSummary).await;

        // The user list is manager-only; a 403 is normal for operators
        match users_res {
            Ok(users) => Self::send(&tx, TaskResult::Users(users)).await,
            Err(ApiError::AccessDenied(_)) => {
                debug!("User list not available for this role");
            }
            Err(e) if e.is_auth_failure() => Self::send(&tx, TaskResult::SessionExpired).await,
            Err(e) => {
                debug!(error = %e, "Users fetch failed");
            }
        }

        // Per-intake sorted records, bounded concurrency
        stream::iter(intake_ids)
            .map(|id| {
                let api = api.clone();
                async move {
                    let result = api.fetch_sorted(&id).await;
                    (id, result)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .for_each(|(id, result)| {
                let tx = tx.clone();
                async move {
                    match result {
                        Ok(list) => Self::send(&tx, TaskResult::Sorted(id, list)).await,
                        Err(e) => debug!(intake = %id, error = %e, "Sorted fetch failed"),
                    }
                }
            })
            .await;

        info!("Background refresh complete");
        Self::send(&tx, TaskResult::RefreshComplete).await;
    }

    /// Helper to send task results, logging any channel errors
    async fn send(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Send a successful fetch, a session-expiry marker, or an error.
    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<TaskResult>,
        name: &str,
        result: Result<T, ApiError>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> TaskResult,
    {
        match result {
            Ok(data) => {
                debug!("{} fetched successfully", name);
                Self::send(tx, wrapper(data)).await;
            }
            Err(e) if e.is_auth_failure() => {
                warn!("{} fetch rejected - session expired", name);
                Self::send(tx, TaskResult::SessionExpired).await;
            }
            Err(e) => {
                error!(error = %e, "{} fetch failed", name);
                Self::send(tx, TaskResult::Failed(format!("{}: {}", name, e))).await;
            }
        }
    }

    /// Check for completed background tasks and process results.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Intakes(data) => {
                if let Err(e) = self.cache.save_intakes(&data) {
                    warn!(error = %e, "Failed to cache intakes");
                }
                self.intakes = data;
                self.intake_selection = self.intake_selection.min(self.intakes.len().saturating_sub(1));
                self.cache_ages = self.cache.get_cache_ages();
            }
            TaskResult::Sorted(intake_id, data) => {
                if let Err(e) = self.cache.save_sorted(&intake_id, &data) {
                    warn!(error = %e, "Failed to cache sorted waste");
                }
                self.sorted.insert(intake_id, data);
            }
            TaskResult::Sales(data) => {
                if let Err(e) = self.cache.save_sales(&data) {
                    warn!(error = %e, "Failed to cache sales");
                }
                self.sales = data;
                self.sale_selection = self.sale_selection.min(self.sales.len().saturating_sub(1));
                self.cache_ages = self.cache.get_cache_ages();
            }
            TaskResult::SalesSummary(data) => {
                self.sales_summary = Some(data);
            }
            TaskResult::Users(data) => {
                if let Err(e) = self.cache.save_users(&data) {
                    warn!(error = %e, "Failed to cache users");
                }
                self.users = data;
                self.user_selection = self.user_selection.min(self.users.len().saturating_sub(1));
            }
            TaskResult::Categories(data) => {
                if let Err(e) = self.cache.save_categories(&data) {
                    warn!(error = %e, "Failed to cache categories");
                }
                self.categories = data;
                self.apply_category_options();
            }
            TaskResult::Daily(report) => {
                self.daily_report = Some(report);
                self.status_message = None;
            }
            TaskResult::Monthly(report) => {
                self.monthly_report = Some(report);
                self.status_message = None;
            }
            TaskResult::Panchayat(report) => {
                self.panchayat_report = Some(report);
                self.status_message = None;
            }
            TaskResult::Submitted(which) => {
                self.submitting = false;
                match which {
                    Submitted::Intake(intake) => {
                        self.status_message =
                            Some(format!("Intake from {} recorded", intake.vehicle_id));
                        self.intake_form.reset();
                        self.refetch_intakes();
                    }
                    Submitted::Sorted(sorted) => {
                        self.status_message = Some(format!(
                            "Sorted {} kg of {}",
                            sorted.weight, sorted.category
                        ));
                        self.sorting_form.reset();
                        self.refetch_sorted(sorted.intake_id);
                    }
                    Submitted::Sale(sale) => {
                        self.status_message =
                            Some(format!("Sale to {} recorded", sale.buyer_name));
                        self.sale_form.reset();
                        self.refetch_sales();
                    }
                    Submitted::User(user) => {
                        self.status_message = Some(format!("User {} created", user.email));
                        self.user_form.reset();
                        self.refetch_users();
                    }
                }
            }
            TaskResult::Failed(msg) => {
                self.submitting = false;
                error!(error = %msg, "Background task error");
                self.status_message = Some(format!("Error: {}", msg));
            }
            TaskResult::SessionExpired => {
                // The server no longer accepts the token; back to login.
                warn!("Session rejected by server, logging out");
                self.logout();
                self.login_error = Some("Session expired. Please log in again.".to_string());
            }
            TaskResult::RefreshComplete => {
                // Keep error messages visible, clear progress ones
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error:") {
                        self.status_message = None;
                    }
                }
            }
        }
    }

    fn refetch_intakes(&self) {
        let Some(mrf_id) = self.mrf_id() else { return };
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_intakes(&mrf_id, None).await;
            Self::send_fetch_result(&tx, "Intakes", result, TaskResult::Intakes).await;
        });
    }

    fn refetch_sorted(&self, intake_id: String) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            match api.fetch_sorted(&intake_id).await {
                Ok(list) => Self::send(&tx, TaskResult::Sorted(intake_id, list)).await,
                Err(e) => debug!(error = %e, "Sorted refetch failed"),
            }
        });
    }

    fn refetch_sales(&self) {
        let Some(mrf_id) = self.mrf_id() else { return };
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let (sales, summary) = tokio::join!(
                api.fetch_sales(&mrf_id, None, None),
                api.sales_summary(&mrf_id, None),
            );
            Self::send_fetch_result(&tx, "Sales", sales, TaskResult::Sales).await;
            Self::send_fetch_result(&tx, "Summary", summary, TaskResult::SalesSummary).await;
        });
    }

    fn refetch_users(&self) {
        let api = self.api.clone();
        let mrf_id = self.mrf_id();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_users(mrf_id.as_deref()).await;
            Self::send_fetch_result(&tx, "Users", result, TaskResult::Users).await;
        });
    }

    // =========================================================================
    // Form submissions
    // =========================================================================

    /// Submit the form belonging to the current tab, if it validates.
    /// One submission in flight at a time.
    pub fn submit_current_form(&mut self) {
        if self.submitting {
            return;
        }
        match self.current_tab {
            Tab::Intake => self.submit_intake(),
            Tab::Sorting => self.submit_sorted(),
            Tab::Sales => self.submit_sale(),
            Tab::Users => self.submit_user(),
            Tab::Reports => self.run_report(),
            Tab::Dashboard => {}
        }
    }

    fn submit_intake(&mut self) {
        if !self.intake_form.validate() {
            return;
        }
        let Some(mrf_id) = self.mrf_id() else {
            self.status_message = Some("No MRF configured".to_string());
            return;
        };
        let Some(date) = self.intake_form.parsed_date("Date") else {
            return;
        };

        let payload = NewWasteIntake {
            mrf_id,
            vehicle_id: self.intake_form.value("Vehicle ID").to_string(),
            weight: self.intake_form.number("Weight (kg)"),
            date: date.and_time(NaiveTime::MIN).and_utc(),
            operator_id: self.operator_id(),
            notes: self.intake_form.optional("Notes"),
        };

        self.submitting = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            match api.create_intake(&payload).await {
                Ok(created) => {
                    Self::send(&tx, TaskResult::Submitted(Submitted::Intake(created))).await
                }
                Err(e) => Self::report_submit_error(&tx, e).await,
            }
        });
    }

    fn submit_sorted(&mut self) {
        let intake_id = match self.sorting_intake() {
            Some(intake) => intake.id.clone(),
            None => {
                self.status_message = Some("Select an intake to sort against".to_string());
                return;
            }
        };

        if !self.sorting_form.validate() {
            return;
        }
        let Some(date) = self.sorting_form.parsed_date("Date") else {
            return;
        };

        let payload = NewSortedWaste {
            intake_id,
            category: self.sorting_form.value("Category").to_string(),
            weight: self.sorting_form.number("Weight (kg)"),
            date: date.and_time(NaiveTime::MIN).and_utc(),
            operator_id: self.operator_id(),
            notes: self.sorting_form.optional("Notes"),
        };

        self.submitting = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            match api.create_sorted(&payload).await {
                Ok(created) => {
                    Self::send(&tx, TaskResult::Submitted(Submitted::Sorted(created))).await
                }
                Err(e) => Self::report_submit_error(&tx, e).await,
            }
        });
    }

    fn submit_sale(&mut self) {
        if !self.sale_form.validate() {
            return;
        }
        let Some(mrf_id) = self.mrf_id() else {
            self.status_message = Some("No MRF configured".to_string());
            return;
        };
        let Some(date) = self.sale_form.parsed_date("Date") else {
            return;
        };

        let weight = self.sale_form.number("Weight (kg)");
        let unit_price = self.sale_form.number("Unit price");

        let payload = NewWasteSale {
            mrf_id,
            category: self.sale_form.value("Category").to_string(),
            weight,
            unit_price,
            // Server recomputes; sent so the preview matches
            total_amount: weight * unit_price,
            buyer_name: self.sale_form.value("Buyer name").to_string(),
            buyer_contact: self.sale_form.optional("Buyer contact"),
            date: date.and_time(NaiveTime::MIN).and_utc(),
            operator_id: self.operator_id(),
            notes: self.sale_form.optional("Notes"),
        };

        self.submitting = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            match api.create_sale(&payload).await {
                Ok(created) => {
                    Self::send(&tx, TaskResult::Submitted(Submitted::Sale(created))).await
                }
                Err(e) => Self::report_submit_error(&tx, e).await,
            }
        });
    }

    fn submit_user(&mut self) {
        if !self.user_form.validate() {
            return;
        }

        let payload = UserCreate {
            email: self.user_form.value("Email").to_string(),
            full_name: self.user_form.value("Full name").to_string(),
            role: parse_role(self.user_form.value("Role")),
            mrf_id: self
                .user_form
                .optional("MRF ID")
                .or_else(|| self.mrf_id()),
            password: self.user_form.value("Password").to_string(),
        };

        self.submitting = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            match api.create_user(&payload).await {
                Ok(created) => {
                    Self::send(&tx, TaskResult::Submitted(Submitted::User(created))).await
                }
                Err(e) => Self::report_submit_error(&tx, e).await,
            }
        });
    }

    fn run_report(&mut self) {
        if !self.report_form.validate() {
            return;
        }
        let Some(mrf_id) = self.mrf_id() else {
            self.status_message = Some("No MRF configured".to_string());
            return;
        };
        let Some(from) = self.report_form.parsed_date("From") else {
            return;
        };

        let view = self.report_view();
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        self.status_message = Some("Running report...".to_string());

        match view {
            ReportView::Daily => {
                tokio::spawn(async move {
                    let result = api.daily_report(&mrf_id, from).await;
                    Self::send_fetch_result(&tx, "Daily report", result, TaskResult::Daily).await;
                });
            }
            ReportView::Monthly => {
                let (year, month) = (from.year(), from.month());
                tokio::spawn(async move {
                    let result = api.monthly_report(&mrf_id, year, month).await;
                    Self::send_fetch_result(&tx, "Monthly report", result, TaskResult::Monthly)
                        .await;
                });
            }
            ReportView::Panchayat => {
                let to = self.report_form.parsed_date("To").unwrap_or(from);
                let range = (
                    from.and_time(NaiveTime::MIN).and_utc(),
                    to.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::days(1),
                );
                tokio::spawn(async move {
                    let result = api.panchayat_report(range).await;
                    Self::send_fetch_result(&tx, "Panchayat report", result, TaskResult::Panchayat)
                        .await;
                });
            }
        }
    }

    async fn report_submit_error(tx: &mpsc::Sender<TaskResult>, e: ApiError) {
        if e.is_auth_failure() {
            Self::send(tx, TaskResult::SessionExpired).await;
        } else {
            Self::send(tx, TaskResult::Failed(e.to_string())).await;
        }
    }

    // =========================================================================
    // Accessors for rendering and input
    // =========================================================================

    pub fn report_view(&self) -> ReportView {
        match self.report_form.value("Report") {
            "monthly" => ReportView::Monthly,
            "panchayat" => ReportView::Panchayat,
            _ => ReportView::Daily,
        }
    }

    /// The intake the Sorting tab is working against.
    pub fn sorting_intake(&self) -> Option<&WasteIntake> {
        self.intakes.get(self.sorting_selection)
    }

    /// Sorted records for the Sorting tab's selected intake.
    pub fn sorted_for_selection(&self) -> &[SortedWaste] {
        self.sorting_intake()
            .and_then(|intake| self.sorted.get(&intake.id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fetch sorted records for the selected intake if not yet loaded.
    pub fn ensure_sorted_loaded(&mut self) {
        let Some(intake) = self.sorting_intake() else { return };
        if self.sorted.contains_key(&intake.id) {
            return;
        }
        self.refetch_sorted(intake.id.clone());
    }

    /// Facility totals for the dashboard: (received, processed, sold) kg.
    pub fn dashboard_totals(&self) -> (f64, f64, f64) {
        let received: f64 = self.intakes.iter().map(|i| i.weight).sum();
        let processed: f64 = self.sorted.values().flatten().map(|s| s.weight).sum();
        let sold: f64 = match self.sales_summary {
            Some(ref summary) => summary.overall.total_weight,
            None => self.sales.iter().map(|s| s.weight).sum(),
        };
        (received, processed, sold)
    }

    /// The form belonging to the current tab, if it has one.
    pub fn current_form_mut(&mut self) -> Option<&mut Form> {
        match self.current_tab {
            Tab::Dashboard => None,
            Tab::Intake => Some(&mut self.intake_form),
            Tab::Sorting => Some(&mut self.sorting_form),
            Tab::Sales => Some(&mut self.sale_form),
            Tab::Reports => Some(&mut self.report_form),
            Tab::Users => Some(&mut self.user_form),
        }
    }

    /// Length of the list shown on the current tab.
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Dashboard | Tab::Reports => 0,
            Tab::Intake => self.intakes.len(),
            Tab::Sorting => self.intakes.len(),
            Tab::Sales => self.sales.len(),
            Tab::Users => self.users.len(),
        }
    }

    pub fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Dashboard | Tab::Reports => None,
            Tab::Intake => Some(&mut self.intake_selection),
            Tab::Sorting => Some(&mut self.sorting_selection),
            Tab::Sales => Some(&mut self.sale_selection),
            Tab::Users => Some(&mut self.user_selection),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        if len == 0 {
            return;
        }
        if let Some(selection) = self.current_selection_mut() {
            let current = *selection as isize;
            *selection = (current + delta).clamp(0, len as isize - 1) as usize;
        }
        if self.current_tab == Tab::Sorting {
            self.ensure_sorted_loaded();
        }
    }
}

fn parse_role(value: &str) -> Role {
    match value {
        "manager" => Role::Manager,
        "panchayat" => Role::Panchayat,
        _ => Role::Operator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(dir: &std::path::Path) -> App {
        let config = Config::default();
        let session = Arc::new(SessionStore::new(dir.to_path_buf()));
        let api = ApiClient::new("http://127.0.0.1:9", Arc::clone(&session)).unwrap();
        let cache = CacheManager::new(dir.join("cache")).unwrap();
        App::new(config, session, api, cache)
    }

    fn seed_session(dir: &std::path::Path) {
        let store = SessionStore::new(dir.to_path_buf());
        let user: User = serde_json::from_str(
            r#"{"_id": "u1", "email": "asha@mrf.example", "full_name": "Asha Nair",
                "role": "operator", "mrf_id": "MRF-KL-014"}"#,
        )
        .unwrap();
        store.set_session("tok-seed".into(), user).unwrap();
    }

    #[tokio::test]
    async fn starts_in_loading_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());
        assert_eq!(app.auth_state, AuthState::Loading);
    }

    #[tokio::test]
    async fn bootstrap_without_session_lands_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.bootstrap();
        assert_eq!(app.auth_state, AuthState::Unauthenticated);
        assert_eq!(app.auth_screen, AuthScreen::Login);
    }

    #[tokio::test]
    async fn bootstrap_with_persisted_session_is_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        seed_session(dir.path());
        let mut app = test_app(dir.path());
        app.bootstrap();
        assert_eq!(app.auth_state, AuthState::Authenticated);
        assert_eq!(app.mrf_id().as_deref(), Some("MRF-KL-014"));
    }

    #[tokio::test]
    async fn bootstrap_with_corrupt_session_lands_on_login() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session.json"), "{broken").unwrap();
        let mut app = test_app(dir.path());
        app.bootstrap();
        assert_eq!(app.auth_state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_leaves_authenticated_state_and_clears_data() {
        let dir = tempfile::tempdir().unwrap();
        seed_session(dir.path());
        let mut app = test_app(dir.path());
        app.bootstrap();
        app.current_tab = Tab::Sales;
        app.sales_summary = Some(Default::default());

        app.logout();
        assert_eq!(app.auth_state, AuthState::Unauthenticated);
        assert_eq!(app.current_tab, Tab::Dashboard);
        assert!(app.sales_summary.is_none());
        assert!(app.session.current().is_none());

        // A second logout changes nothing
        app.logout();
        assert_eq!(app.auth_state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn logged_out_session_does_not_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        seed_session(dir.path());
        let mut app = test_app(dir.path());
        app.bootstrap();
        app.logout();

        let mut next = test_app(dir.path());
        next.bootstrap();
        assert_eq!(next.auth_state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn dashboard_totals_sum_fetched_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.intakes = serde_json::from_str(
            r#"[{"_id": "i1", "mrf_id": "M", "vehicle_id": "V", "weight": 100.0,
                 "date": "2026-02-03T00:00:00Z", "operator_id": "u1"},
                {"_id": "i2", "mrf_id": "M", "vehicle_id": "V", "weight": 50.0,
                 "date": "2026-02-04T00:00:00Z", "operator_id": "u1"}]"#,
        )
        .unwrap();
        app.sorted.insert(
            "i1".into(),
            serde_json::from_str(
                r#"[{"_id": "s1", "intake_id": "i1", "category": "PET", "weight": 40.0,
                     "operator_id": "u1", "date": "2026-02-03T00:00:00Z"}]"#,
            )
            .unwrap(),
        );

        let (received, processed, sold) = app.dashboard_totals();
        assert_eq!(received, 150.0);
        assert_eq!(processed, 40.0);
        assert_eq!(sold, 0.0);
    }

    #[tokio::test]
    async fn report_view_follows_select_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        assert_eq!(app.report_view(), ReportView::Daily);
        app.report_form.set_value("Report", "panchayat");
        assert_eq!(app.report_view(), ReportView::Panchayat);
    }
}
