use coolwatch_api::model::{
    Alert, HeatExchanger, MonitoringSettings, Program, Severity, Stats, Telemetry, User,
};
use coolwatch_api::{AlertStatusFilter, PushEvent};

use crate::subscription::ConnectionState;
use crate::view::dashboard::{LocationFilter, TypeFilter};

/// Messages for the CoolWatch application.
///
/// Fetch results carry `Result<_, String>` so the enum stays `Clone`;
/// the error text is what ends up in the inline notice or the log.
#[derive(Debug, Clone)]
pub enum Message {
    // --- Live data ---
    /// Push-channel lifecycle transition.
    ConnectionChanged(ConnectionState),

    /// Decoded event from the push channel.
    PushEventReceived(PushEvent),

    /// Periodic trigger for the authoritative full refresh.
    RefreshTick,

    /// A full refresh completed. Stale generations are discarded.
    RefreshLoaded {
        generation: u64,
        result: Result<(Vec<HeatExchanger>, Vec<Telemetry>), String>,
    },

    /// Periodic trigger for the alert badge refresh.
    AlertBadgeTick,

    /// Active-alert count and list for the badge and card indicators.
    AlertStatusLoaded(Result<(u64, Vec<Alert>), String>),

    /// One-second tick for relative timestamps and notice dismissal.
    Tick,

    // --- Navigation ---
    OpenDashboard,
    OpenDetail(i64),
    OpenAlerts,
    OpenUsers,
    OpenSettings,
    OpenPrograms,
    OpenLogin,
    /// Open the exchanger form, editing the given id or creating anew.
    OpenExchangerForm(Option<i64>),

    // --- Dashboard ---
    SetTypeFilter(TypeFilter),
    SetLocationFilter(LocationFilter),
    DeleteExchanger(i64),
    ExchangerDeleted(Result<i64, String>),

    // --- Detail ---
    DetailStatsLoaded(Result<Stats, String>),
    DetailHistoryLoaded(Result<Vec<Telemetry>, String>),

    // --- Alerts page ---
    SetAlertStatusFilter(AlertStatusFilter),
    SetAlertSeverityFilter(SeverityFilter),
    SetAlertExchangerFilter(ExchangerFilter),
    AlertsLoaded(Result<Vec<Alert>, String>),
    AlertTilesLoaded(Result<AlertTiles, String>),
    AcknowledgeAlert(i64),
    ResolveAlert(i64),
    ToggleCommentForm(i64),
    SetCommentText(String),
    SubmitComment(i64),
    AlertActionDone(Result<(), String>),

    // --- Users page ---
    UsersLoaded(Result<Vec<User>, String>),
    OpenUserForm(Option<i64>),
    CloseUserForm,
    SetUserFormUsername(String),
    SetUserFormEmail(String),
    SetUserFormPassword(String),
    SetUserFormAdmin(bool),
    SubmitUserForm,
    DeleteUser(i64),
    ApproveUser(i64),
    DenyUser(i64),
    UserActionDone(Result<(), String>),

    // --- Settings page ---
    MonitoringSettingsLoaded(Result<MonitoringSettings, String>),
    SetMonitoringEnabled(bool),
    SetPollingInterval(String),
    SaveMonitoringSettings,
    MonitoringSettingsSaved(Result<(), String>),

    // --- Programs page ---
    ProgramsLoaded(Result<Vec<Program>, String>),
    SetNewProgramName(String),
    SetNewProgramDescription(String),
    AddProgram,
    DeleteProgram(i64),
    ProgramActionDone(Result<(), String>),

    // --- Exchanger form ---
    SetFormName(String),
    SetFormKind(KindChoice),
    SetFormRscmIp(String),
    SetFormCity(String),
    SetFormBuilding(String),
    SetFormRoom(String),
    SetFormTile(String),
    SetFormActive(bool),
    SetFormProgram(ProgramChoice),
    FormProgramsLoaded(Result<Vec<Program>, String>),
    SubmitExchangerForm,
    ExchangerSaved(Result<HeatExchanger, String>),

    // --- Authentication ---
    SetLoginUsername(String),
    SetLoginPassword(String),
    SubmitLogin,
    LoginResult(Result<User, String>),
    CurrentUserLoaded(Option<User>),
    Logout,
    LoggedOut,
}

/// Stat-tile counts on the alerts page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertTiles {
    pub total: u64,
    pub active: u64,
    pub acknowledged: u64,
    pub resolved: u64,
}

/// Severity filter on the alerts page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    Severity(Severity),
}

impl SeverityFilter {
    pub const ALL: &'static [SeverityFilter] = &[
        SeverityFilter::All,
        SeverityFilter::Severity(Severity::Critical),
        SeverityFilter::Severity(Severity::Warning),
        SeverityFilter::Severity(Severity::Info),
    ];

    pub fn severity(&self) -> Option<Severity> {
        match self {
            SeverityFilter::All => None,
            SeverityFilter::Severity(s) => Some(*s),
        }
    }
}

impl std::fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityFilter::All => write!(f, "All severities"),
            SeverityFilter::Severity(s) => write!(f, "{}", s),
        }
    }
}

/// Heat-exchanger filter on the alerts page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExchangerFilter {
    #[default]
    All,
    Exchanger {
        id: i64,
        name: String,
    },
}

impl ExchangerFilter {
    pub fn id(&self) -> Option<i64> {
        match self {
            ExchangerFilter::All => None,
            ExchangerFilter::Exchanger { id, .. } => Some(*id),
        }
    }
}

impl std::fmt::Display for ExchangerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangerFilter::All => write!(f, "All exchangers"),
            ExchangerFilter::Exchanger { name, .. } => write!(f, "{}", name),
        }
    }
}

/// Equipment-type choice in the exchanger form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindChoice {
    #[default]
    Unspecified,
    Callan,
    Atlas,
}

impl KindChoice {
    pub const ALL: &'static [KindChoice] =
        &[KindChoice::Unspecified, KindChoice::Callan, KindChoice::Atlas];

    pub fn as_kind(&self) -> Option<String> {
        match self {
            KindChoice::Unspecified => None,
            KindChoice::Callan => Some("Callan".to_string()),
            KindChoice::Atlas => Some("Atlas".to_string()),
        }
    }

    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("Callan") => KindChoice::Callan,
            Some("Atlas") => KindChoice::Atlas,
            _ => KindChoice::Unspecified,
        }
    }
}

impl std::fmt::Display for KindChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KindChoice::Unspecified => write!(f, "Unspecified"),
            KindChoice::Callan => write!(f, "Callan"),
            KindChoice::Atlas => write!(f, "Atlas"),
        }
    }
}

/// Program choice in the exchanger form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgramChoice {
    #[default]
    None,
    Program {
        id: i64,
        name: String,
    },
}

impl ProgramChoice {
    pub fn id(&self) -> Option<i64> {
        match self {
            ProgramChoice::None => None,
            ProgramChoice::Program { id, .. } => Some(*id),
        }
    }
}

impl std::fmt::Display for ProgramChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramChoice::None => write!(f, "No program"),
            ProgramChoice::Program { name, .. } => write!(f, "{}", name),
        }
    }
}
