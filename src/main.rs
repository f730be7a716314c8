//!
//! Console client for the cantieri TLC work-tracking backend.
//! Reads configuration from TOML file (~/.config/cantieri-console/config.toml).

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use telcoia_cantieri::client::ApiClient;
use telcoia_cantieri::config::{default_config_path, AppConfig, LoggingConfig};
use telcoia_cantieri::domain::{CableFamily, DeclarationForm, DeclarationPayload, Period};
use telcoia_cantieri::import::{collect_issues, normalize_sheet, read_sheet, ImportBatch};
use telcoia_cantieri::reporting::index::projects_by_id;
use telcoia_cantieri::reporting::scope::{project_display_name, work_title};
use telcoia_cantieri::reporting::{
    admin_overview, approved_report, assigned_works, default_export_filename, operator_overview,
    write_csv, AdminFilters, AdminOverview, ApprovedReport, AssignedWork, OperatorOverview,
    ReportFilters,
};
use telcoia_cantieri::session::{FsSessionStore, RouteDecision, SessionManager, SessionStore, View};
use telcoia_cantieri::shared::errors::ConfigError;

#[derive(Parser)]
#[command(
    name = "cantieri",
    version,
    about = "Console operatore/admin per il tracciamento lavori TLC"
)]
struct Cli {
    /// Config file path (default ~/.config/cantieri-console/config.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate against the backend.
    Login {
        #[arg(long)]
        email: String,
        /// Prompted from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the cached session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Operator dashboard.
    Operator,
    /// Assigned works still open.
    Works {
        #[arg(long)]
        search: Option<String>,
    },
    /// Declare completed work on an assignment.
    Declare(DeclareArgs),
    /// Administration commands.
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Approved-works report (impresa accounts).
    Report(ReportArgs),
}

#[derive(Args)]
struct DeclareArgs {
    #[arg(long)]
    work_log: i64,
    #[arg(long)]
    cable_code: String,
    /// Metres of cable laid in duct.
    #[arg(long, default_value_t = 0.0)]
    cable_in_duct: f64,
    /// Cable family for duct-laid metres: cpr, microcavo, multifibra.
    #[arg(long)]
    cable_family: Option<String>,
    /// Metres strapped onto an existing bundle.
    #[arg(long, default_value_t = 0.0)]
    cable_strapped: f64,
    #[arg(long)]
    pte_installed: bool,
    #[arg(long)]
    pte_spliced: bool,
    #[arg(long, default_value_t = 0.0)]
    pvc_duct: f64,
    #[arg(long, default_value_t = 0.0)]
    vtr_conduit: f64,
    #[arg(long, default_value_t = 0.0)]
    microduct: f64,
    #[arg(long, default_value_t = 0.0)]
    asphalt_dig: f64,
    #[arg(long, default_value_t = 0.0)]
    soil_dig: f64,
    #[arg(long, default_value_t = 0.0)]
    premium_restore: f64,
    #[arg(long, default_value_t = 0.0)]
    chamber_search: f64,
    #[arg(long, default_value_t = 0.0)]
    duct_restore: f64,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Company-wide dashboard.
    Dashboard(AdminDashboardArgs),
    /// Declarations waiting for a decision.
    Queue,
    /// Approve a declaration.
    Approve { id: i64 },
    /// Reject a declaration.
    Reject { id: i64 },
    /// Import target candidates.
    Technicians,
    /// Bulk-import work logs from a spreadsheet.
    Import {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        technician: i64,
        /// Validate and show the batch without sending it.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct AdminDashboardArgs {
    /// Month scope, YYYY-MM. Defaults to the current month.
    #[arg(long, conflicts_with = "all")]
    month: Option<String>,
    /// All-time scope.
    #[arg(long)]
    all: bool,
    /// Day for the daily figures, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    day: Option<String>,
    #[arg(long)]
    project: Option<i64>,
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
struct ReportArgs {
    /// Single-day scope, YYYY-MM-DD.
    #[arg(long, conflicts_with_all = ["month", "all"])]
    day: Option<String>,
    /// Month scope, YYYY-MM.
    #[arg(long, conflicts_with = "all")]
    month: Option<String>,
    /// All-time scope (the default).
    #[arg(long)]
    all: bool,
    #[arg(long)]
    project: Option<i64>,
    #[arg(long)]
    search: Option<String>,
    /// Write the CSV export; optional path, dated filename by default.
    #[arg(long)]
    export: Option<Option<String>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CANTIERI_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(default_config_path);
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_logging(&cfg.logging);
            info!("configuration loaded from {}", config_path.display());
            cfg
        }
        Err(ConfigError::Io { .. }) => {
            let mut cfg = AppConfig::default();
            cfg.apply_env();
            init_logging(&cfg.logging);
            warn!("no config file at {}, using defaults", config_path.display());
            cfg
        }
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!("cannot load {}: {e}", config_path.display());
            return Err(e.into());
        }
    };
    config.validate()?;

    let store: Arc<dyn SessionStore> = Arc::new(FsSessionStore::new(config.session_cache_dir()));
    let auth = ApiClient::new(&config.backend, store.clone())?;
    let client = ApiClient::new(&config.backend, store.clone())?;
    let mut session = SessionManager::new(store, auth);
    session.boot().await;

    run(cli.command, &config, &client, &mut session).await
}

async fn run(
    command: Command,
    config: &AppConfig,
    client: &ApiClient,
    session: &mut SessionManager<ApiClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Login { email, password } => {
            if session.user().is_some() {
                println!("Sessione già attiva. Eseguire `cantieri logout` per cambiare utente.");
                return Ok(());
            }
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let user = session.login(&email, &password).await?;
            println!("Autenticato come {} [{}]", user.display_name(), user.role_kind());
        }
        Command::Logout => {
            session.logout().await;
            println!("Sessione chiusa.");
        }
        Command::Whoami => match session.user() {
            Some(user) => println!(
                "{} <{}> [{}]",
                user.display_name(),
                user.email.as_deref().unwrap_or("-"),
                user.role_kind()
            ),
            None => println!("Nessuna sessione attiva."),
        },
        Command::Operator => {
            ensure(session, View::OperatorDashboard)?;
            let data = client.operator_dashboard().await?;
            print_operator(&operator_overview(&data, &config.targets, &Local, Utc::now()));
        }
        Command::Works { search } => {
            ensure(session, View::AssignedWorks)?;
            let logs = client.assigned_works().await?;
            print_works(&assigned_works(&logs, search.as_deref().unwrap_or(""), &Local));
        }
        Command::Declare(args) => {
            ensure(session, View::AssignedWorks)?;
            let payload = build_declaration(&args)?;
            client.declare_work(&payload).await?;
            info!(work_log_id = args.work_log, "declaration submitted");
            println!("Dichiarazione inviata per il lavoro #{}.", args.work_log);
        }
        Command::Admin(admin) => run_admin(admin, config, client, session).await?,
        Command::Report(args) => {
            ensure(session, View::ApprovedReport)?;
            let filters = ReportFilters {
                period: report_period(&args)?,
                project_id: args.project,
                search: args.search.clone().unwrap_or_default(),
            };
            let payload = client.approved_logs().await?;
            let report = approved_report(payload, &filters, &Local);
            print_report(&report);
            if let Some(target) = &args.export {
                let path = match target.as_deref() {
                    Some(p) if !p.trim().is_empty() => PathBuf::from(p),
                    _ => PathBuf::from(default_export_filename(Local::now().date_naive())),
                };
                let file = std::fs::File::create(&path)?;
                write_csv(&report, file)?;
                println!("Esportato in {}", path.display());
            }
        }
    }
    Ok(())
}

async fn run_admin(
    command: AdminCommand,
    config: &AppConfig,
    client: &ApiClient,
    session: &SessionManager<ApiClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        AdminCommand::Dashboard(args) => {
            ensure(session, View::AdminDashboard)?;
            let filters = admin_filters(&args)?;
            let data = client.admin_dashboard().await?;
            print_admin(&admin_overview(&data, &filters, &config.targets, &Local));
        }
        AdminCommand::Queue => {
            ensure(session, View::ApprovalQueue)?;
            let queue = client.approval_queue().await?;
            if queue.logs.is_empty() {
                println!("Nessuna dichiarazione in attesa.");
                return Ok(());
            }
            let projects = projects_by_id(&queue.projects);
            for log in &queue.logs {
                println!(
                    "#{}  {}  {}  [{}]",
                    log.id,
                    work_title(log),
                    project_display_name(log, &projects),
                    log.status_label()
                );
            }
        }
        AdminCommand::Approve { id } => {
            ensure(session, View::ApprovalQueue)?;
            client.approve_work(id).await?;
            info!(work_log_id = id, "work approved");
            println!("Lavoro #{id} approvato.");
        }
        AdminCommand::Reject { id } => {
            ensure(session, View::ApprovalQueue)?;
            client.reject_work(id).await?;
            info!(work_log_id = id, "work rejected");
            println!("Lavoro #{id} rifiutato.");
        }
        AdminCommand::Technicians => {
            ensure(session, View::ImportTool)?;
            let technicians = client.technicians().await?;
            if technicians.is_empty() {
                println!("Nessun tecnico disponibile.");
                return Ok(());
            }
            for t in &technicians {
                println!(
                    "{:>6}  {}  <{}>",
                    t.id,
                    t.display_name(),
                    t.email.as_deref().unwrap_or("-")
                );
            }
        }
        AdminCommand::Import { file, technician, dry_run } => {
            ensure(session, View::ImportTool)?;
            let sheet = read_sheet(&file)?;
            let rows = normalize_sheet(&sheet)?;
            for issue in collect_issues(&rows) {
                println!("Riga {}: {}", issue.row, issue.problems.join(", "));
            }
            let batch = ImportBatch::build(technician, rows)?;
            if dry_run {
                println!(
                    "{} righe pronte per l'import, tecnico {}. Nessun invio (--dry-run).",
                    batch.rows_json.len(),
                    batch.users_id
                );
                return Ok(());
            }
            let outcome = client.import_work_logs(&batch).await?;
            info!(created = ?outcome.created, skipped = ?outcome.skipped, "import done");
            println!(
                "Import completato: creati {}, saltati {}, errori {}",
                outcome.created.unwrap_or(0),
                outcome.skipped.unwrap_or(0),
                outcome.errors.unwrap_or(0)
            );
        }
    }
    Ok(())
}

/// Route-gate check shared by every data command. A denial becomes a
/// message naming where the session would be redirected instead.
fn ensure(
    session: &SessionManager<ApiClient>,
    view: View,
) -> Result<(), Box<dyn std::error::Error>> {
    match session.route(view) {
        RouteDecision::Render => Ok(()),
        RouteDecision::Loading => Err("sessione ancora in caricamento, riprovare".into()),
        RouteDecision::RedirectTo(View::Login) => {
            Err("nessuna sessione attiva: eseguire `cantieri login`".into())
        }
        RouteDecision::RedirectTo(target) => Err(format!(
            "vista non permessa per questo ruolo; destinazione: {}",
            view_slug(target)
        )
        .into()),
    }
}

fn view_slug(view: View) -> &'static str {
    match view {
        View::Login => "login",
        View::OperatorDashboard => "dashboard operatore",
        View::AssignedWorks => "lavori assegnati",
        View::AdminDashboard => "dashboard admin",
        View::ApprovalQueue => "coda approvazioni",
        View::ImportTool => "import",
        View::ApprovedReport => "report lavori approvati",
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));
    // Logs go to stderr so command output stays clean on stdout.
    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn prompt_password() -> std::io::Result<String> {
    use std::io::Write;
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn build_declaration(args: &DeclareArgs) -> Result<DeclarationPayload, Box<dyn std::error::Error>> {
    let cable_family = match &args.cable_family {
        Some(raw) => Some(
            CableFamily::from_raw(raw)
                .ok_or("famiglia cavo non valida: usare cpr, microcavo o multifibra")?,
        ),
        None => None,
    };
    let form = DeclarationForm {
        cable_in_duct_m: args.cable_in_duct,
        cable_family,
        cable_strapped_m: args.cable_strapped,
        pte_installed: args.pte_installed,
        pte_spliced: args.pte_spliced,
        pvc_duct_m: args.pvc_duct,
        vtr_conduit_m: args.vtr_conduit,
        microduct_m: args.microduct,
        asphalt_dig_m: args.asphalt_dig,
        soil_dig_m: args.soil_dig,
        premium_restore_m: args.premium_restore,
        chamber_search: args.chamber_search,
        duct_restore_m: args.duct_restore,
    };
    Ok(DeclarationPayload::build(args.work_log, &args.cable_code, &form)?)
}

fn admin_filters(args: &AdminDashboardArgs) -> Result<AdminFilters, Box<dyn std::error::Error>> {
    let period = if args.all {
        Period::All
    } else if let Some(m) = &args.month {
        Period::parse_month(m).ok_or("mese non valido, usare YYYY-MM")?
    } else {
        Period::month_of(Local::now().date_naive())
    };
    let day = match &args.day {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| "giorno non valido, usare YYYY-MM-DD")?,
        None => Local::now().date_naive(),
    };
    Ok(AdminFilters {
        period,
        day,
        project_id: args.project,
        search: args.search.clone().unwrap_or_default(),
    })
}

fn report_period(args: &ReportArgs) -> Result<Period, Box<dyn std::error::Error>> {
    if let Some(d) = &args.day {
        let period = Period::parse_day(d).ok_or("giorno non valido, usare YYYY-MM-DD")?;
        return Ok(period);
    }
    if let Some(m) = &args.month {
        let period = Period::parse_month(m).ok_or("mese non valido, usare YYYY-MM")?;
        return Ok(period);
    }
    Ok(Period::All)
}

fn print_operator(view: &OperatorOverview) {
    println!(
        "Mese corrente: € {:.2}   (€/h {:.2})",
        view.monthly_total, view.monthly_hourly
    );
    println!(
        "Oggi:          € {:.2}   (€/h {:.2})",
        view.daily_total, view.daily_hourly
    );
    println!(
        "Obiettivo mensile € {:.0}: {}%",
        view.monthly_target_eur, view.progress_pct
    );
    println!(
        "Completamento: {}/{} ({}%)",
        view.completion_worked, view.completion_assigned, view.completion_pct
    );
    println!("Bonus da {:.0}€/h", view.bonus_threshold_eur_hour);
    if view.recent.is_empty() {
        println!("Nessuna dichiarazione recente.");
        return;
    }
    println!("Ultime dichiarazioni:");
    for r in &view.recent {
        println!("  #{}  {}  {}  {}", r.id, r.title, r.status_label, r.date_label);
    }
}

fn print_works(works: &[AssignedWork]) {
    if works.is_empty() {
        println!("Nessun lavoro da mostrare.");
        return;
    }
    for w in works {
        println!("#{}  {}  [{}]", w.id, w.code, w.status_label);
        println!("    cantiere: {}   indirizzo: {}", w.site, w.address);
        println!(
            "    tipo: {}   riferimenti: {}   lunghezza: {} m   assegnato: {}",
            w.cable_type, w.references, w.calculated_length, w.date_label
        );
    }
    println!("{} lavori.", works.len());
}

fn print_admin(view: &AdminOverview) {
    println!(
        "Totale periodo: € {:.2}   (€/h {:.2})",
        view.period_total, view.period_hourly
    );
    println!(
        "Giornata: € {:.2}   (€/h {:.2})   lavori approvati: {}",
        view.daily_total, view.daily_hourly, view.daily_count
    );
    println!(
        "Completamento: {}/{} ({}%)",
        view.completion_worked, view.completion_assigned, view.completion_pct
    );
    if !view.project_options.is_empty() {
        let names: Vec<String> = view
            .project_options
            .iter()
            .map(|o| format!("{} (#{})", o.name, o.id))
            .collect();
        println!("Cantieri: {}", names.join(", "));
    }
    if view.rows.is_empty() {
        println!("Nessun lavoro approvato nel periodo selezionato.");
        return;
    }
    for row in &view.rows {
        println!(
            "#{}  {}  {}  {}  € {:.2}",
            row.id, row.approved_label, row.title, row.site, row.total
        );
        println!("    tecnico: {}", row.technician);
        if let Some(address) = &row.address {
            println!("    indirizzo: {address}");
        }
        for item in &row.items {
            println!(
                "    {}  {} {} × € {:.2} = € {:.2}",
                item.label, item.quantity, item.unit, item.unit_price, item.total
            );
        }
    }
}

fn print_report(report: &ApprovedReport) {
    if report.rows.is_empty() {
        println!("Nessun lavoro approvato nel periodo.");
        return;
    }
    for row in &report.rows {
        println!(
            "#{}  {}  {}  {}",
            row.id,
            row.approved_label,
            row.project,
            row.cable_code.as_deref().unwrap_or("-")
        );
        for item in &row.items {
            println!("    {} × {}", item.code, item.quantity);
        }
        println!("    foto: {}", row.photos.len());
    }
    println!("{} lavori.", report.rows.len());
}
