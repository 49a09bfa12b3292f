//! CoolWatch Iced application.

use iced::{Element, Subscription, Task, Theme};

use coolwatch_api::model::User;
use coolwatch_api::{AlertQuery, AlertStatusFilter, ApiClient, ClientConfig, PushEvent};

use crate::demo;
use crate::message::{AlertTiles, Message};
use crate::prefs::Preferences;
use crate::snapshot::{Applied, Snapshot};
use crate::subscription::{
    ConnectionState, PushConfig, badge_subscription, push_subscription, refresh_subscription,
    tick_subscription,
};
use crate::view::alerts::{AlertsState, alerts_view};
use crate::view::dashboard::{DashboardState, dashboard_view};
use crate::view::detail::{DetailState, detail_view};
use crate::view::form::{ExchangerFormState, form_view};
use crate::view::login::{LoginState, login_view};
use crate::view::programs::{ProgramsState, programs_view};
use crate::view::settings::{SettingsState, settings_view};
use crate::view::users::{UsersState, users_view};

/// Seconds an inline notice stays visible.
const NOTICE_SECS: u8 = 5;

/// The page currently shown. Page state lives and dies with navigation.
#[derive(Debug)]
pub enum Page {
    Dashboard,
    Detail(DetailState),
    Alerts(AlertsState),
    Users(UsersState),
    Settings(SettingsState),
    Programs(ProgramsState),
    ExchangerForm(ExchangerFormState),
    Login(LoginState),
}

/// Kind of an inline notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// An auto-dismissing inline message for write outcomes.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    age_secs: u8,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Success,
            age_secs: 0,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
            age_secs: 0,
        }
    }
}

/// The main CoolWatch application.
pub struct CoolWatch {
    config: ClientConfig,
    client: ApiClient,
    /// Demo mode: synthetic data, no backend.
    demo: bool,

    page: Page,
    snapshot: Snapshot,
    dashboard: DashboardState,
    connection: ConnectionState,
    current_user: Option<User>,
    notice: Option<Notice>,

    prefs: Preferences,
    /// Persisted location filter awaiting validation against the first
    /// fetched entity set.
    pending_location: Option<String>,

    /// Generation of the most recently issued full refresh. Completions
    /// carrying an older generation are discarded.
    refresh_generation: u64,
}

impl CoolWatch {
    /// Boot the application.
    pub fn boot(config: ClientConfig, client: ApiClient, demo: bool) -> (Self, Task<Message>) {
        let prefs = Preferences::load();
        let pending_location = prefs.location_filter.clone();

        let mut app = Self {
            config,
            client,
            demo,
            page: Page::Dashboard,
            snapshot: Snapshot::default(),
            dashboard: DashboardState::default(),
            connection: ConnectionState::default(),
            current_user: None,
            notice: None,
            prefs,
            pending_location,
            refresh_generation: 0,
        };

        let boot_task = if demo {
            Task::none()
        } else {
            let whoami = {
                let client = app.client.clone();
                Task::perform(
                    async move { client.me().await.ok() },
                    Message::CurrentUserLoaded,
                )
            };
            Task::batch([app.issue_refresh(), app.fetch_alert_status(), whoami])
        };

        (app, boot_task)
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        let count = self.snapshot.exchangers().len();
        if count > 0 {
            format!("CoolWatch - {} exchangers", count)
        } else {
            "CoolWatch".to_string()
        }
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Create subscriptions for the push channel and the periodic timers.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.demo {
            return Subscription::batch([demo::demo_subscription(), tick_subscription()]);
        }

        Subscription::batch([
            push_subscription(PushConfig {
                server: self.config.server.clone(),
                reconnect_delay_secs: self.config.refresh.reconnect_delay_secs,
            }),
            refresh_subscription(self.config.refresh.full_refresh_secs),
            badge_subscription(self.config.refresh.alert_badge_secs),
            tick_subscription(),
        ])
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        let page: Element<'_, Message> = match &self.page {
            Page::Dashboard => dashboard_view(
                &self.dashboard,
                &self.snapshot,
                self.connection,
                self.current_user.as_ref(),
            ),
            Page::Detail(state) => detail_view(state, &self.snapshot),
            Page::Alerts(state) => alerts_view(state, &self.snapshot),
            Page::Users(state) => users_view(state),
            Page::Settings(state) => settings_view(state),
            Page::Programs(state) => programs_view(state),
            Page::ExchangerForm(state) => form_view(state),
            Page::Login(state) => login_view(state),
        };

        match &self.notice {
            None => page,
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Success => iced::Color::from_rgb(0.3, 0.8, 0.3),
                    NoticeKind::Error => iced::Color::from_rgb(0.9, 0.3, 0.3),
                };
                let bar = iced::widget::text(notice.text.clone())
                    .size(13)
                    .style(move |_theme: &Theme| iced::widget::text::Style { color: Some(color) });
                iced::widget::column![bar, page].spacing(4).padding(4).into()
            }
        }
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // --- Live data ---
            Message::ConnectionChanged(state) => {
                if state != self.connection {
                    tracing::info!(state = state.label(), "Push channel state changed");
                }
                self.connection = state;
                Task::none()
            }

            Message::PushEventReceived(event) => self.handle_push_event(event),

            Message::RefreshTick => self.issue_refresh(),

            Message::RefreshLoaded { generation, result } => {
                self.handle_refresh_loaded(generation, result)
            }

            Message::AlertBadgeTick => self.fetch_alert_status(),

            Message::AlertStatusLoaded(result) => {
                match result {
                    Ok((count, active)) => self.snapshot.set_alert_status(count, &active),
                    Err(e) => tracing::warn!(error = %e, "Alert status refresh failed"),
                }
                Task::none()
            }

            Message::Tick => {
                if let Some(notice) = &mut self.notice {
                    notice.age_secs += 1;
                    if notice.age_secs >= NOTICE_SECS {
                        self.notice = None;
                    }
                }
                Task::none()
            }

            // --- Navigation ---
            Message::OpenDashboard => {
                self.page = Page::Dashboard;
                Task::none()
            }

            Message::OpenDetail(id) => {
                self.page = Page::Detail(DetailState::new(id));
                self.fetch_detail(id)
            }

            Message::OpenAlerts => {
                let state = AlertsState::default();
                let query = state.query();
                self.page = Page::Alerts(state);
                self.fetch_alerts_page(query)
            }

            Message::OpenUsers => {
                self.page = Page::Users(UsersState::default());
                self.fetch_users()
            }

            Message::OpenSettings => {
                self.page = Page::Settings(SettingsState::default());
                let client = self.client.clone();
                Task::perform(
                    async move { client.monitoring_settings().await.map_err(|e| e.to_string()) },
                    Message::MonitoringSettingsLoaded,
                )
            }

            Message::OpenPrograms => {
                self.page = Page::Programs(ProgramsState::default());
                self.fetch_programs(false)
            }

            Message::OpenExchangerForm(id) => {
                let state = match id.and_then(|id| self.snapshot.get(id)) {
                    Some(he) => ExchangerFormState::edit(he),
                    None => ExchangerFormState::create(),
                };
                self.page = Page::ExchangerForm(state);
                self.fetch_programs(true)
            }

            Message::OpenLogin => {
                self.page = Page::Login(LoginState::default());
                Task::none()
            }

            // --- Dashboard ---
            Message::SetTypeFilter(filter) => {
                self.dashboard.type_filter = filter;
                Task::none()
            }

            Message::SetLocationFilter(filter) => {
                self.prefs.location_filter = filter.city().map(str::to_string);
                self.prefs.store();
                self.dashboard.location_filter = filter;
                Task::none()
            }

            Message::DeleteExchanger(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move {
                        client
                            .delete_heat_exchanger(id)
                            .await
                            .map(|_| id)
                            .map_err(|e| e.to_string())
                    },
                    Message::ExchangerDeleted,
                )
            }

            Message::ExchangerDeleted(result) => match result {
                Ok(id) => {
                    tracing::info!(id, "Heat exchanger deleted");
                    self.notice = Some(Notice::success("Heat exchanger deleted"));
                    self.issue_refresh()
                }
                Err(e) => {
                    self.notice = Some(Notice::error(format!("Delete failed: {}", e)));
                    Task::none()
                }
            },

            // --- Detail ---
            Message::DetailStatsLoaded(result) => {
                if let Page::Detail(state) = &mut self.page {
                    match result {
                        Ok(stats) => state.stats = Some(stats),
                        Err(e) => tracing::warn!(error = %e, "Statistics fetch failed"),
                    }
                }
                Task::none()
            }

            Message::DetailHistoryLoaded(result) => {
                if let Page::Detail(state) = &mut self.page {
                    match result {
                        Ok(history) => state.set_history(history),
                        Err(e) => tracing::warn!(error = %e, "History fetch failed"),
                    }
                }
                Task::none()
            }

            // --- Alerts page ---
            Message::SetAlertStatusFilter(filter) => {
                if let Page::Alerts(state) = &mut self.page {
                    state.status_filter = filter;
                    let query = state.query();
                    return self.fetch_alerts_page(query);
                }
                Task::none()
            }

            Message::SetAlertSeverityFilter(filter) => {
                if let Page::Alerts(state) = &mut self.page {
                    state.severity_filter = filter;
                    let query = state.query();
                    return self.fetch_alerts_page(query);
                }
                Task::none()
            }

            Message::SetAlertExchangerFilter(filter) => {
                if let Page::Alerts(state) = &mut self.page {
                    state.exchanger_filter = filter;
                    let query = state.query();
                    return self.fetch_alerts_page(query);
                }
                Task::none()
            }

            Message::AlertsLoaded(result) => {
                if let Page::Alerts(state) = &mut self.page {
                    match result {
                        Ok(alerts) => state.alerts = alerts,
                        Err(e) => tracing::warn!(error = %e, "Alert list fetch failed"),
                    }
                }
                Task::none()
            }

            Message::AlertTilesLoaded(result) => {
                if let Page::Alerts(state) = &mut self.page {
                    match result {
                        Ok(tiles) => state.tiles = tiles,
                        Err(e) => tracing::warn!(error = %e, "Alert counts fetch failed"),
                    }
                }
                Task::none()
            }

            Message::AcknowledgeAlert(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move {
                        client
                            .acknowledge_alert(id)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::AlertActionDone,
                )
            }

            Message::ResolveAlert(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.resolve_alert(id).await.map_err(|e| e.to_string()) },
                    Message::AlertActionDone,
                )
            }

            Message::ToggleCommentForm(id) => {
                if let Page::Alerts(state) = &mut self.page {
                    state.toggle_comment_form(id);
                }
                Task::none()
            }

            Message::SetCommentText(text) => {
                if let Page::Alerts(state) = &mut self.page {
                    if let Some(form) = &mut state.comment_form {
                        form.text = text;
                    }
                }
                Task::none()
            }

            Message::SubmitComment(id) => {
                let comment = match &mut self.page {
                    Page::Alerts(state) => match state.comment_form.take() {
                        Some(form) if !form.text.trim().is_empty() => form.text,
                        _ => return Task::none(),
                    },
                    _ => return Task::none(),
                };

                let client = self.client.clone();
                Task::perform(
                    async move {
                        client
                            .comment_alert(id, comment.trim())
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::AlertActionDone,
                )
            }

            Message::AlertActionDone(result) => match result {
                Ok(()) => {
                    let reload = match &self.page {
                        Page::Alerts(state) => self.fetch_alerts_page(state.query()),
                        _ => Task::none(),
                    };
                    Task::batch([reload, self.fetch_alert_status()])
                }
                Err(e) => {
                    self.notice = Some(Notice::error(format!("Alert action failed: {}", e)));
                    Task::none()
                }
            },

            // --- Users page ---
            Message::UsersLoaded(result) => {
                if let Page::Users(state) = &mut self.page {
                    match result {
                        Ok(users) => state.users = users,
                        Err(e) => state.error = Some(e),
                    }
                }
                Task::none()
            }

            Message::OpenUserForm(id) => {
                if let Page::Users(state) = &mut self.page {
                    let user = id.and_then(|id| state.users.iter().find(|u| u.id == id).cloned());
                    state.open_form(user.as_ref());
                }
                Task::none()
            }

            Message::CloseUserForm => {
                if let Page::Users(state) = &mut self.page {
                    state.close_form();
                }
                Task::none()
            }

            Message::SetUserFormUsername(value) => {
                self.with_user_form(|form| form.username = value);
                Task::none()
            }

            Message::SetUserFormEmail(value) => {
                self.with_user_form(|form| form.email = value);
                Task::none()
            }

            Message::SetUserFormPassword(value) => {
                self.with_user_form(|form| form.password = value);
                Task::none()
            }

            Message::SetUserFormAdmin(value) => {
                self.with_user_form(|form| form.is_admin = value);
                Task::none()
            }

            Message::SubmitUserForm => {
                let Page::Users(state) = &mut self.page else {
                    return Task::none();
                };

                match state.payload() {
                    Err(e) => {
                        state.error = Some(e);
                        Task::none()
                    }
                    Ok(payload) => {
                        let editing = state.form.as_ref().and_then(|f| f.editing);
                        let client = self.client.clone();
                        Task::perform(
                            async move {
                                let result = match editing {
                                    Some(id) => client.update_user(id, &payload).await.map(|_| ()),
                                    None => client.create_user(&payload).await.map(|_| ()),
                                };
                                result.map_err(|e| e.to_string())
                            },
                            Message::UserActionDone,
                        )
                    }
                }
            }

            Message::DeleteUser(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.delete_user(id).await.map_err(|e| e.to_string()) },
                    Message::UserActionDone,
                )
            }

            Message::ApproveUser(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.approve_user(id).await.map_err(|e| e.to_string()) },
                    Message::UserActionDone,
                )
            }

            Message::DenyUser(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.deny_user(id).await.map_err(|e| e.to_string()) },
                    Message::UserActionDone,
                )
            }

            Message::UserActionDone(result) => match result {
                Ok(()) => {
                    if let Page::Users(state) = &mut self.page {
                        state.close_form();
                    }
                    self.fetch_users()
                }
                Err(e) => {
                    if let Page::Users(state) = &mut self.page {
                        state.error = Some(e);
                    }
                    Task::none()
                }
            },

            // --- Settings page ---
            Message::MonitoringSettingsLoaded(result) => {
                if let Page::Settings(state) = &mut self.page {
                    match result {
                        Ok(settings) => *state = SettingsState::from_settings(settings),
                        Err(e) => state.set_error(e),
                    }
                }
                Task::none()
            }

            Message::SetMonitoringEnabled(enabled) => {
                if let Page::Settings(state) = &mut self.page {
                    state.set_enabled(enabled);
                }
                Task::none()
            }

            Message::SetPollingInterval(interval) => {
                if let Page::Settings(state) = &mut self.page {
                    state.set_polling_interval(interval);
                }
                Task::none()
            }

            Message::SaveMonitoringSettings => {
                let Page::Settings(state) = &mut self.page else {
                    return Task::none();
                };

                match state.validate() {
                    Err(e) => {
                        state.set_error(e);
                        Task::none()
                    }
                    Ok(payload) => {
                        let client = self.client.clone();
                        Task::perform(
                            async move {
                                client
                                    .set_monitoring_settings(payload)
                                    .await
                                    .map_err(|e| e.to_string())
                            },
                            Message::MonitoringSettingsSaved,
                        )
                    }
                }
            }

            Message::MonitoringSettingsSaved(result) => {
                if let Page::Settings(state) = &mut self.page {
                    match result {
                        Ok(()) => state.mark_saved(),
                        Err(e) => state.set_error(e),
                    }
                }
                Task::none()
            }

            // --- Programs page ---
            Message::ProgramsLoaded(result) => {
                if let Page::Programs(state) = &mut self.page {
                    match result {
                        Ok(programs) => state.programs = programs,
                        Err(e) => tracing::warn!(error = %e, "Program list fetch failed"),
                    }
                }
                Task::none()
            }

            Message::SetNewProgramName(value) => {
                if let Page::Programs(state) = &mut self.page {
                    state.new_name = value;
                }
                Task::none()
            }

            Message::SetNewProgramDescription(value) => {
                if let Page::Programs(state) = &mut self.page {
                    state.new_description = value;
                }
                Task::none()
            }

            Message::AddProgram => {
                let Page::Programs(state) = &mut self.page else {
                    return Task::none();
                };

                match state.validate() {
                    Err(e) => {
                        self.notice = Some(Notice::error(e));
                        Task::none()
                    }
                    Ok((name, description)) => {
                        let client = self.client.clone();
                        Task::perform(
                            async move {
                                client
                                    .create_program(&name, description.as_deref())
                                    .await
                                    .map(|_| ())
                                    .map_err(|e| e.to_string())
                            },
                            Message::ProgramActionDone,
                        )
                    }
                }
            }

            Message::DeleteProgram(id) => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.delete_program(id).await.map_err(|e| e.to_string()) },
                    Message::ProgramActionDone,
                )
            }

            Message::ProgramActionDone(result) => match result {
                Ok(()) => {
                    if let Page::Programs(state) = &mut self.page {
                        state.clear_form();
                    }
                    self.fetch_programs(false)
                }
                Err(e) => {
                    self.notice = Some(Notice::error(format!("Program action failed: {}", e)));
                    Task::none()
                }
            },

            // --- Exchanger form ---
            Message::SetFormName(value) => {
                self.with_exchanger_form(|form| form.name = value);
                Task::none()
            }
            Message::SetFormKind(value) => {
                self.with_exchanger_form(|form| form.kind = value);
                Task::none()
            }
            Message::SetFormRscmIp(value) => {
                self.with_exchanger_form(|form| form.rscm_ip = value);
                Task::none()
            }
            Message::SetFormCity(value) => {
                self.with_exchanger_form(|form| form.city = value);
                Task::none()
            }
            Message::SetFormBuilding(value) => {
                self.with_exchanger_form(|form| form.building = value);
                Task::none()
            }
            Message::SetFormRoom(value) => {
                self.with_exchanger_form(|form| form.room = value);
                Task::none()
            }
            Message::SetFormTile(value) => {
                self.with_exchanger_form(|form| form.tile = value);
                Task::none()
            }
            Message::SetFormActive(value) => {
                self.with_exchanger_form(|form| form.is_active = value);
                Task::none()
            }
            Message::SetFormProgram(value) => {
                self.with_exchanger_form(|form| form.program = value);
                Task::none()
            }

            Message::FormProgramsLoaded(result) => {
                if let Page::ExchangerForm(state) = &mut self.page {
                    match result {
                        Ok(programs) => state.programs = programs,
                        Err(e) => tracing::warn!(error = %e, "Program list fetch failed"),
                    }
                }
                Task::none()
            }

            Message::SubmitExchangerForm => {
                let Page::ExchangerForm(state) = &mut self.page else {
                    return Task::none();
                };

                match state.payload() {
                    Err(e) => {
                        state.error = Some(e);
                        Task::none()
                    }
                    Ok(payload) => {
                        let editing = state.editing;
                        let client = self.client.clone();
                        Task::perform(
                            async move {
                                let result = match editing {
                                    Some(id) => client.update_heat_exchanger(id, &payload).await,
                                    None => client.create_heat_exchanger(&payload).await,
                                };
                                result.map_err(|e| e.to_string())
                            },
                            Message::ExchangerSaved,
                        )
                    }
                }
            }

            Message::ExchangerSaved(result) => match result {
                Ok(he) => {
                    self.notice = Some(Notice::success(format!("Saved \"{}\"", he.name)));
                    self.page = Page::Dashboard;
                    self.issue_refresh()
                }
                Err(e) => {
                    if let Page::ExchangerForm(state) = &mut self.page {
                        state.error = Some(e);
                    }
                    Task::none()
                }
            },

            // --- Authentication ---
            Message::SetLoginUsername(value) => {
                if let Page::Login(state) = &mut self.page {
                    state.username = value;
                    state.error = None;
                }
                Task::none()
            }

            Message::SetLoginPassword(value) => {
                if let Page::Login(state) = &mut self.page {
                    state.password = value;
                    state.error = None;
                }
                Task::none()
            }

            Message::SubmitLogin => {
                let Page::Login(state) = &mut self.page else {
                    return Task::none();
                };
                if !state.can_submit() {
                    return Task::none();
                }
                state.pending = true;

                let username = state.username.trim().to_string();
                let password = state.password.clone();
                let client = self.client.clone();
                Task::perform(
                    async move {
                        client
                            .login(&username, &password)
                            .await
                            .map_err(|e| e.to_string())?;
                        client.me().await.map_err(|e| e.to_string())
                    },
                    Message::LoginResult,
                )
            }

            Message::LoginResult(result) => match result {
                Ok(user) => {
                    tracing::info!(username = %user.username, "Logged in");
                    self.current_user = Some(user);
                    self.page = Page::Dashboard;
                    self.issue_refresh()
                }
                Err(e) => {
                    if let Page::Login(state) = &mut self.page {
                        state.pending = false;
                        state.error = Some(e);
                    }
                    Task::none()
                }
            },

            Message::CurrentUserLoaded(user) => {
                self.current_user = user;
                Task::none()
            }

            Message::Logout => {
                let client = self.client.clone();
                Task::perform(
                    async move {
                        if let Err(e) = client.logout().await {
                            tracing::warn!(error = %e, "Logout request failed");
                        }
                    },
                    |_| Message::LoggedOut,
                )
            }

            Message::LoggedOut => {
                self.current_user = None;
                self.page = Page::Dashboard;
                Task::none()
            }
        }
    }

    /// Apply a decoded push event.
    fn handle_push_event(&mut self, event: PushEvent) -> Task<Message> {
        match event {
            PushEvent::MonitoringUpdate {
                heat_exchanger_id,
                data,
            } => {
                match self.snapshot.apply_telemetry(heat_exchanger_id, data) {
                    Applied::Updated => {
                        // Feed the detail history when this entity is open.
                        if let Page::Detail(state) = &mut self.page {
                            if state.id == heat_exchanger_id {
                                if let Some(held) = self.snapshot.telemetry(heat_exchanger_id) {
                                    state.push_reading(held.clone());
                                }
                            }
                        }
                    }
                    Applied::Stale => {
                        tracing::debug!(heat_exchanger_id, "Dropped stale monitoring update");
                    }
                    Applied::UnknownEntity => {
                        tracing::debug!(
                            heat_exchanger_id,
                            "Dropped monitoring update for unknown exchanger"
                        );
                    }
                }
                Task::none()
            }

            PushEvent::NewAlert { title, .. } => {
                tracing::info!(title = title.as_deref().unwrap_or("(untitled)"), "New alert");

                let reload = match &self.page {
                    Page::Alerts(state) => self.fetch_alerts_page(state.query()),
                    _ => Task::none(),
                };
                Task::batch([self.fetch_alert_status(), reload])
            }

            PushEvent::Unknown => Task::none(),
        }
    }

    /// Issue a new full refresh carrying the next generation number.
    fn issue_refresh(&mut self) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        self.refresh_generation += 1;
        let generation = self.refresh_generation;
        let client = self.client.clone();

        Task::perform(
            async move {
                let exchangers = client
                    .list_heat_exchangers()
                    .await
                    .map_err(|e| e.to_string())?;
                let telemetry = client.latest_telemetry().await.map_err(|e| e.to_string())?;
                Ok((exchangers, telemetry))
            },
            move |result| Message::RefreshLoaded { generation, result },
        )
    }

    fn handle_refresh_loaded(
        &mut self,
        generation: u64,
        result: Result<
            (
                Vec<coolwatch_api::model::HeatExchanger>,
                Vec<coolwatch_api::model::Telemetry>,
            ),
            String,
        >,
    ) -> Task<Message> {
        if generation != self.refresh_generation {
            tracing::debug!(
                generation,
                latest = self.refresh_generation,
                "Dropped superseded refresh"
            );
            return Task::none();
        }

        match result {
            Ok((exchangers, telemetry)) => {
                self.snapshot.apply_full_refresh(exchangers, telemetry);

                let cities = self.snapshot.cities();
                match self.pending_location.take() {
                    Some(saved) => self.dashboard.restore_location(Some(&saved), &cities),
                    None => self.dashboard.validate_location(&cities),
                }
            }
            Err(e) => {
                // The stale snapshot stays; the next tick tries again.
                tracing::warn!(error = %e, "Full refresh failed");
            }
        }
        Task::none()
    }

    /// Re-fetch the active-alert count (badge) and list (card indicators).
    fn fetch_alert_status(&self) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        let client = self.client.clone();
        Task::perform(
            async move {
                let count = client
                    .alert_count(AlertQuery::active())
                    .await
                    .map_err(|e| e.to_string())?;
                let active = client
                    .list_alerts(AlertQuery::active())
                    .await
                    .map_err(|e| e.to_string())?;
                Ok((count.count, active))
            },
            Message::AlertStatusLoaded,
        )
    }

    /// Fetch the alert list and stat tiles for the alerts page.
    fn fetch_alerts_page(&self, query: AlertQuery) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        let list = {
            let client = self.client.clone();
            Task::perform(
                async move { client.list_alerts(query).await.map_err(|e| e.to_string()) },
                Message::AlertsLoaded,
            )
        };

        let tiles = {
            let client = self.client.clone();
            Task::perform(
                async move {
                    let count_for = |status| {
                        let client = client.clone();
                        async move {
                            client
                                .alert_count(AlertQuery {
                                    status,
                                    ..AlertQuery::default()
                                })
                                .await
                                .map(|c| c.count)
                                .map_err(|e| e.to_string())
                        }
                    };

                    Ok(AlertTiles {
                        total: count_for(AlertStatusFilter::All).await?,
                        active: count_for(AlertStatusFilter::Active).await?,
                        acknowledged: count_for(AlertStatusFilter::Acknowledged).await?,
                        resolved: count_for(AlertStatusFilter::Resolved).await?,
                    })
                },
                Message::AlertTilesLoaded,
            )
        };

        Task::batch([list, tiles])
    }

    fn fetch_detail(&self, id: i64) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        let stats = {
            let client = self.client.clone();
            Task::perform(
                async move {
                    client
                        .statistics(id, DetailState::stats_hours())
                        .await
                        .map_err(|e| e.to_string())
                },
                Message::DetailStatsLoaded,
            )
        };

        let history = {
            let client = self.client.clone();
            Task::perform(
                async move {
                    client
                        .telemetry_history(id, DetailState::history_limit())
                        .await
                        .map_err(|e| e.to_string())
                },
                Message::DetailHistoryLoaded,
            )
        };

        Task::batch([stats, history])
    }

    fn fetch_users(&self) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        let client = self.client.clone();
        Task::perform(
            async move { client.list_users().await.map_err(|e| e.to_string()) },
            Message::UsersLoaded,
        )
    }

    /// Fetch programs for the programs page or the exchanger form.
    fn fetch_programs(&self, for_form: bool) -> Task<Message> {
        if self.demo {
            return Task::none();
        }

        let client = self.client.clone();
        Task::perform(
            async move { client.list_programs().await.map_err(|e| e.to_string()) },
            move |result| {
                if for_form {
                    Message::FormProgramsLoaded(result)
                } else {
                    Message::ProgramsLoaded(result)
                }
            },
        )
    }

    fn with_user_form(&mut self, edit: impl FnOnce(&mut crate::view::users::UserForm)) {
        if let Page::Users(state) = &mut self.page {
            if let Some(form) = &mut state.form {
                edit(form);
            }
        }
    }

    fn with_exchanger_form(&mut self, edit: impl FnOnce(&mut ExchangerFormState)) {
        if let Page::ExchangerForm(state) = &mut self.page {
            edit(state);
        }
    }

    // Accessors for tests.

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use coolwatch_api::model::{HeatExchanger, Location, Status, Telemetry};

    fn test_app() -> CoolWatch {
        let config = ClientConfig::default();
        let client = ApiClient::new(&config.server).unwrap();
        // Demo mode keeps update() from spawning real fetches.
        let (app, _task) = CoolWatch::boot(config, client, true);
        app
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn exchanger(id: i64, name: &str) -> HeatExchanger {
        HeatExchanger {
            id,
            name: name.to_string(),
            kind: None,
            rscm_ip: format!("10.0.0.{}", id),
            location: Location {
                city: "Dublin".to_string(),
                building: "B1".to_string(),
                room: "101".to_string(),
                tile: "A1".to_string(),
            },
            is_active: true,
            program_id: None,
            program_name: None,
            created_at: ts("2024-01-01T00:00:00"),
            updated_at: ts("2024-01-01T00:00:00"),
            model: None,
            firmware_version: None,
            hostname: None,
            status_state: None,
            status_health: None,
            time_since_boot: None,
            pump_status: None,
            fan_status: None,
            urgent_alarms: None,
        }
    }

    fn telemetry(id: i64, when: &str, temperature: f64) -> Telemetry {
        Telemetry {
            heat_exchanger_id: id,
            timestamp: ts(when),
            temperature,
            fan_speed: 1000,
            power_consumption: 2.0,
            humidity: None,
            status: Status::Normal,
            ambient_temperature: None,
            ambient_humidity: None,
        }
    }

    #[test]
    fn test_connection_state_is_tracked() {
        let mut app = test_app();
        assert_eq!(app.connection(), ConnectionState::Connecting);

        let _ = app.update(Message::ConnectionChanged(ConnectionState::Open));
        assert_eq!(app.connection(), ConnectionState::Open);

        let _ = app.update(Message::ConnectionChanged(
            ConnectionState::ClosedPendingRetry,
        ));
        assert!(!app.connection().is_open());
    }

    #[test]
    fn test_refresh_loaded_applies_current_generation() {
        let mut app = test_app();

        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((
                vec![exchanger(1, "HX-01")],
                vec![telemetry(1, "2024-01-01T10:00:00", 20.0)],
            )),
        });

        assert_eq!(app.snapshot().exchangers().len(), 1);
        assert_eq!(app.snapshot().telemetry(1).unwrap().temperature, 20.0);
    }

    #[test]
    fn test_superseded_refresh_is_dropped() {
        let mut app = test_app();
        app.refresh_generation = 2;

        // A slow generation-1 fetch resolving after generation 2 was
        // issued must not overwrite anything.
        let _ = app.update(Message::RefreshLoaded {
            generation: 1,
            result: Ok((vec![exchanger(9, "HX-09")], vec![])),
        });
        assert!(app.snapshot().is_empty());

        let _ = app.update(Message::RefreshLoaded {
            generation: 2,
            result: Ok((vec![exchanger(1, "HX-01")], vec![])),
        });
        assert_eq!(app.snapshot().exchangers().len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_stale_snapshot() {
        let mut app = test_app();
        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((vec![exchanger(1, "HX-01")], vec![])),
        });

        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Err("connection refused".to_string()),
        });
        assert_eq!(app.snapshot().exchangers().len(), 1);
    }

    #[test]
    fn test_push_event_patches_snapshot() {
        let mut app = test_app();
        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((
                vec![exchanger(7, "HX-07"), exchanger(8, "HX-08")],
                vec![telemetry(7, "2024-01-01T10:00:00", 20.0)],
            )),
        });

        let _ = app.update(Message::PushEventReceived(PushEvent::MonitoringUpdate {
            heat_exchanger_id: 7,
            data: telemetry(7, "2024-01-01T10:00:10", 22.5),
        }));

        assert_eq!(app.snapshot().telemetry(7).unwrap().temperature, 22.5);
        assert!(app.snapshot().telemetry(8).is_none());
    }

    #[test]
    fn test_stale_push_event_leaves_snapshot_untouched() {
        let mut app = test_app();
        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((
                vec![exchanger(7, "HX-07")],
                vec![telemetry(7, "2024-01-01T10:00:00", 20.0)],
            )),
        });

        let _ = app.update(Message::PushEventReceived(PushEvent::MonitoringUpdate {
            heat_exchanger_id: 7,
            data: telemetry(7, "2024-01-01T09:00:00", 99.0),
        }));

        assert_eq!(app.snapshot().telemetry(7).unwrap().temperature, 20.0);
    }

    #[test]
    fn test_refresh_is_authoritative_over_late_push() {
        let mut app = test_app();
        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((
                vec![exchanger(7, "HX-07")],
                vec![telemetry(7, "2024-01-01T10:00:00", 20.0)],
            )),
        });

        // Refresh without id 7: deleted server-side.
        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((vec![exchanger(8, "HX-08")], vec![])),
        });

        // Straggler push for the deleted exchanger is ignored.
        let _ = app.update(Message::PushEventReceived(PushEvent::MonitoringUpdate {
            heat_exchanger_id: 7,
            data: telemetry(7, "2024-01-01T10:05:00", 23.0),
        }));

        assert!(app.snapshot().get(7).is_none());
        assert!(app.snapshot().telemetry(7).is_none());
    }

    #[test]
    fn test_unknown_push_event_is_ignored() {
        let mut app = test_app();
        let _ = app.update(Message::PushEventReceived(PushEvent::Unknown));
        assert!(app.snapshot().is_empty());
    }

    #[test]
    fn test_notice_auto_dismisses() {
        let mut app = test_app();
        app.notice = Some(Notice::error("boom"));

        for _ in 0..NOTICE_SECS {
            let _ = app.update(Message::Tick);
        }
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_location_restore_waits_for_first_refresh() {
        let mut app = test_app();
        app.pending_location = Some("Dublin".to_string());

        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((vec![exchanger(1, "HX-01")], vec![])),
        });

        assert_eq!(app.dashboard.location_filter.city(), Some("Dublin"));
        assert!(app.pending_location.is_none());
    }

    #[test]
    fn test_unknown_saved_location_is_discarded() {
        let mut app = test_app();
        app.pending_location = Some("Atlantis".to_string());

        let _ = app.update(Message::RefreshLoaded {
            generation: 0,
            result: Ok((vec![exchanger(1, "HX-01")], vec![])),
        });

        assert_eq!(app.dashboard.location_filter.city(), None);
    }
}
