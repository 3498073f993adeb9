//! Subcommand dispatch.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use plate_console::api::{Api, Record};
use plate_console::cli::{
    AppealsCommand, Command, OwnersCommand, PaymentsCommand, SidebarCommand, UsersCommand,
    VehiclesCommand, ViolationsCommand,
};
use plate_console::config::AppConfig;
use plate_console::detect::{
    CameraDevice, DetectionWorkflow, ImageFile, InputMode, StillImageCamera,
};
use plate_console::http::HttpClient;
use plate_console::navigation::{DEFAULT_LANDING_PAGE, History, Navigator, UNAUTHORIZED_PAGE};
use plate_console::session::{AuthService, Role, SessionStore};
use plate_console::storage::{FileStore, KeyValueStore};
use plate_console::ui::{
    DashboardChrome, Feedback, LoginController, LoginOutcome, NavLink, submit_with_feedback,
};

/// Wired services for one invocation.
#[derive(Debug)]
pub struct Console {
    config: AppConfig,
    storage: Arc<dyn KeyValueStore>,
    history: Arc<History>,
    api: Api,
    auth: AuthService,
}

impl Console {
    pub fn connect(config: AppConfig) -> Result<Self> {
        let store = FileStore::open(&config.storage.state_file)
            .with_context(|| format!("Failed to open state file {}", config.storage.state_file))?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(store);
        let history = Arc::new(History::new());
        let navigator: Arc<dyn Navigator> = Arc::<History>::clone(&history);

        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let client = HttpClient::with_client(
            &config.server.base_url,
            http,
            SessionStore::new(Arc::clone(&storage)),
            navigator,
        )?;

        Ok(Self {
            config,
            storage,
            history,
            api: Api::new(client.clone()),
            auth: AuthService::new(client),
        })
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login {
                username,
                password,
                remember,
            } => self.login(username, password, remember).await,
            Command::Logout => {
                self.auth.logout().await;
                println!("Signed out");
                Ok(())
            }
            Command::Whoami => {
                self.guard(&[]).await?;
                let profile = self.auth.session().profile().context("No stored profile")?;
                print_json(&serde_json::to_value(profile)?)
            }
            Command::Detect {
                file,
                camera,
                manual,
            } => self.detect(file, camera, manual).await,
            Command::Violations(cmd) => self.violations(cmd).await,
            Command::Payments(cmd) => self.payments(cmd).await,
            Command::Users(cmd) => self.users(cmd).await,
            Command::Appeals(cmd) => self.appeals(cmd).await,
            Command::Owners(cmd) => self.owners(cmd).await,
            Command::Vehicles(cmd) => self.vehicles(cmd).await,
            Command::ViolationTypes => {
                self.guard(&[]).await?;
                print_json(&self.api.violation_types().list().await?)
            }
            Command::Stats => {
                self.guard(&[]).await?;
                print_json(&self.api.dashboard().stats().await?)
            }
            Command::DetectionLogs { skip, limit } => {
                self.guard(&[]).await?;
                print_json(&self.api.detection_logs().list(skip, limit).await?)
            }
            Command::Sidebar(cmd) => self.sidebar(cmd),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    async fn login(&self, username: Option<String>, password: String, remember: bool) -> Result<()> {
        let mut page = LoginController::new(self.auth.clone())
            .with_redirect_delay(self.config.ui.redirect_delay());
        if page.init() {
            println!("Already signed in, landing page {}", self.auth.redirect_target());
            return Ok(());
        }

        if let Some(username) = username {
            page.form.username = username;
        }
        page.form.password = password;
        page.form.remember_me = remember;

        match page.submit().await {
            LoginOutcome::LoggedIn { profile, landing } => {
                let name = profile.display_name().unwrap_or("user").to_string();
                println!("Signed in as {name} ({}), landing page {landing}", profile.role);
                Ok(())
            }
            LoginOutcome::Rejected(message) => bail!(message),
            LoginOutcome::Invalid => bail!("Please enter both username and password"),
            LoginOutcome::Busy => bail!("A login request is already in progress"),
        }
    }

    /// Page guard; turns a refusal into an error naming where it redirected.
    async fn guard(&self, roles: &[Role]) -> Result<()> {
        if self.auth.require_auth(roles).await {
            return Ok(());
        }
        if self.history.current().as_deref() == Some(UNAUTHORIZED_PAGE) {
            bail!("Your role is not allowed to do that");
        }
        bail!("Not signed in, run `plate-console login` first")
    }

    async fn mutate<F>(&self, success_message: &str, action: F) -> Result<()>
    where
        F: Future<Output = plate_console::Result<Record>>,
    {
        let mut feedback = Feedback::new(self.config.ui.toast_duration());
        let outcome = submit_with_feedback(&mut feedback, success_message, action).await;
        for toast in feedback.toasts.drain() {
            eprintln!("[{:?}] {}", toast.kind, toast.message);
        }
        print_json(&outcome?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Detection
    // ─────────────────────────────────────────────────────────────────────────

    async fn detect(
        &self,
        file: Option<std::path::PathBuf>,
        camera: Option<std::path::PathBuf>,
        manual: Option<String>,
    ) -> Result<()> {
        let device: Arc<dyn CameraDevice> = Arc::new(
            camera
                .clone()
                .map_or_else(StillImageCamera::unavailable, StillImageCamera::new),
        );
        let mut page = DetectionWorkflow::new(self.api.clone(), device);

        if let Some(path) = file {
            page.switch_mode(InputMode::Upload);
            let image = ImageFile::read(&path).await?;
            page.drop_file(image)?;
        } else if camera.is_some() {
            page.switch_mode(InputMode::Camera);
            if let Err(e) = page.start_camera().await {
                return Err(alerted(&page, e));
            }
            if let Err(e) = page.capture().await {
                return Err(alerted(&page, e));
            }
        } else if let Some(text) = manual {
            page.switch_mode(InputMode::Manual);
            page.set_manual_text(text);
        }

        let outcome = page.submit().await.map(ToString::to_string);
        match outcome {
            Ok(rendered) => {
                println!("{rendered}");
                Ok(())
            }
            Err(e) => Err(alerted(&page, e)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────────

    async fn violations(&self, cmd: ViolationsCommand) -> Result<()> {
        self.guard(&[]).await?;
        let violations = self.api.violations();
        match cmd {
            ViolationsCommand::List { filters } => {
                print_json(&violations.list(&pairs(&filters)).await?)
            }
            ViolationsCommand::Ticket { ticket_number } => {
                print_json(&violations.by_ticket(&ticket_number).await?)
            }
            ViolationsCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("Violation recorded", violations.create(&data))
                    .await
            }
            ViolationsCommand::SetStatus { id, status } => {
                self.mutate("Violation updated", violations.update_status(&id, &status))
                    .await
            }
        }
    }

    async fn payments(&self, cmd: PaymentsCommand) -> Result<()> {
        self.guard(&[]).await?;
        let payments = self.api.payments();
        match cmd {
            PaymentsCommand::List { filters } => print_json(&payments.list(&pairs(&filters)).await?),
            PaymentsCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("Payment recorded", payments.create(&data)).await
            }
        }
    }

    async fn users(&self, cmd: UsersCommand) -> Result<()> {
        self.guard(&[Role::SuperAdmin]).await?;
        let users = self.api.users();
        match cmd {
            UsersCommand::List => print_json(&users.list().await?),
            UsersCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("User created", users.create(&data)).await
            }
            UsersCommand::Update { id, data } => {
                let data = parse_data(&data)?;
                self.mutate("User updated", users.update(&id, &data)).await
            }
            UsersCommand::Delete { id } => self.mutate("User deleted", users.delete(&id)).await,
            UsersCommand::ChangePassword { id, data } => {
                let data = parse_data(&data)?;
                self.mutate("Password changed", users.change_password(&id, &data))
                    .await
            }
        }
    }

    async fn appeals(&self, cmd: AppealsCommand) -> Result<()> {
        self.guard(&[]).await?;
        let appeals = self.api.appeals();
        match cmd {
            AppealsCommand::List { filters } => print_json(&appeals.list(&pairs(&filters)).await?),
            AppealsCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("Appeal submitted", appeals.create(&data)).await
            }
            AppealsCommand::Review { id, status, notes } => {
                self.mutate(
                    "Appeal updated",
                    appeals.update_status(&id, &status, notes.as_deref()),
                )
                .await
            }
        }
    }

    async fn owners(&self, cmd: OwnersCommand) -> Result<()> {
        self.guard(&[]).await?;
        let owners = self.api.owners();
        match cmd {
            OwnersCommand::List => print_json(&owners.list().await?),
            OwnersCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("Owner created", owners.create(&data)).await
            }
        }
    }

    async fn vehicles(&self, cmd: VehiclesCommand) -> Result<()> {
        self.guard(&[]).await?;
        let vehicles = self.api.vehicles();
        match cmd {
            VehiclesCommand::List => print_json(&vehicles.list().await?),
            VehiclesCommand::Create { data } => {
                let data = parse_data(&data)?;
                self.mutate("Vehicle registered", vehicles.create(&data)).await
            }
            VehiclesCommand::Plate { plate_number } => {
                print_json(&vehicles.by_plate(&plate_number).await?)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────────

    fn sidebar(&self, cmd: SidebarCommand) -> Result<()> {
        let landing = self.auth.redirect_target();
        let nav = vec![
            NavLink::new("Dashboard", landing),
            NavLink::new("Plate detection", DEFAULT_LANDING_PAGE),
        ];
        let mut chrome = DashboardChrome::load(
            Arc::clone(&self.storage),
            landing,
            nav,
            self.config.ui.viewport_width,
        );

        if let SidebarCommand::Toggle = cmd {
            chrome.toggle_sidebar()?;
        }

        let state = if chrome.is_sidebar_collapsed() {
            "collapsed"
        } else {
            "expanded"
        };
        println!("Sidebar {state}");
        for link in chrome.nav_links() {
            let marker = if chrome.is_active(link) { "*" } else { " " };
            println!("{marker} {:<16} {}", link.label, link.href);
        }
        Ok(())
    }
}

/// Print the page's alert, if any, before handing the error on.
fn alerted(page: &DetectionWorkflow, err: plate_console::Error) -> anyhow::Error {
    if let Some(alert) = page.alert() {
        eprintln!("{alert}");
    }
    err.into()
}

fn pairs(filters: &[(String, String)]) -> Vec<(&str, &str)> {
    filters
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

fn parse_data(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--data must be JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
