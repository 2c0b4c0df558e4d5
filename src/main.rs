//! Inventory Guardian CLI - Command-line interface for inventory audits
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands and flag overrides to domain operations
//! - Handles external concerns like file discovery, process exit codes, and terminal output
//! - Keeps logs on stderr so machine-readable reports on stdout stay clean

use clap::{Args, Parser, Subcommand, ValueEnum};
use inventory_guardian::analyzer::overrides::DUPLICATE_LIMIT;
use inventory_guardian::config::DEFAULT_CONFIG_FILES;
use inventory_guardian::patterns::prefix_token;
use inventory_guardian::{
    instantiate_layers, layers_from_paths, Concern, GuardianConfig, GuardianError, GuardianResult, InventoryGuardian,
    LayeredResolver, ListInput, OutputFormat, ReportFormatter, ReportOptions, NAMESPACE_REMARK,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Inventory Guardian - Quality audits for layered configuration inventories
#[derive(Parser)]
#[command(name = "inventory-guardian")]
#[command(version)]
#[command(about = "Audit variable overrides, namespacing and definitions in layered inventories")]
#[command(
    long_about = "Inventory Guardian scans layered variable files, flags variables overridden too often, names without a usable namespace prefix, and variables that do not resolve to a value. Designed for CI/CD integration."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit an inventory
    Check(CheckArgs),

    /// List the variables selected for definition checking
    Variables {
        /// Layer files or directories, lowest precedence first
        paths: Vec<PathBuf>,

        /// Directory the configured layers are relative to
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Only list names matching this regex
        #[arg(long)]
        from_pattern: Option<String>,

        /// Only list these names (comma or whitespace separated)
        #[arg(long)]
        from_list: Option<String>,
    },

    /// Explain what a concern checks
    Explain {
        /// Concern name, e.g. `namespace-avguse`
        concern: String,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Watch layer files and re-run the audit on changes
    Watch {
        /// Directory the configured layers are relative to
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Debounce delay in milliseconds
        #[arg(long, default_value = "500")]
        delay: u64,
    },
}

/// Host whose layer chain is audited
#[derive(Args, Clone, Default)]
struct TargetArgs {
    /// Audit the layers of this host (fills `{host}` in layer paths)
    #[arg(long)]
    host: Option<String>,

    /// Group of the host, lowest precedence first (fills `{group}`; repeatable)
    #[arg(long = "group")]
    groups: Vec<String>,
}

#[derive(Args, Clone, Default)]
struct CheckArgs {
    /// Layer files or directories, lowest precedence first (overrides configured layers)
    paths: Vec<PathBuf>,

    /// Directory the configured layers are relative to
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(flatten)]
    target: TargetArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Undefined names matching this regex are tolerated
    #[arg(long)]
    error_filter: Option<String>,

    /// Number of undefined variables tolerated
    #[arg(long)]
    error_assume: Option<usize>,

    /// Minimum average number of names per prefix
    #[arg(long)]
    pfx_min_uses: Option<usize>,

    /// Maximum number and percentage of names without prefix
    #[arg(long)]
    pfx_max_none: Option<usize>,

    /// Maximum number and percentage of prefixes used once
    #[arg(long)]
    pfx_max_once: Option<usize>,

    /// Only check names matching this regex
    #[arg(long)]
    from_pattern: Option<String>,

    /// Only check these names (comma or whitespace separated)
    #[arg(long)]
    from_list: Option<String>,

    /// Resolve with host facts
    #[arg(long)]
    remote_facts: bool,

    /// Facts file (JSON or YAML) used with --remote-facts
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Worker threads for resolution
    #[arg(long)]
    threads: Option<usize>,

    /// Fail the run when the override audit fails
    #[arg(long)]
    fatal_overrides: bool,

    /// Fail the run when the namespace audit fails
    #[arg(long)]
    fatal_namespace: bool,

    /// Do not fail the run on undefined variables
    #[arg(long)]
    no_fatal_definitions: bool,
}

#[derive(Copy, Clone, Default, ValueEnum, PartialEq)]
enum OutputFormatArg {
    #[default]
    Human,
    Json,
    Junit,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> GuardianResult<i32> {
    let use_colors = !cli.no_color;

    match cli.command {
        Commands::Check(args) => run_check(cli.config.as_deref(), &args, use_colors),
        Commands::Variables {
            paths,
            base_dir,
            target,
            from_pattern,
            from_list,
        } => run_variables(
            cli.config.as_deref(),
            &paths,
            &base_dir,
            &target,
            from_pattern,
            from_list,
        ),
        Commands::Explain { concern } => run_explain(cli.config.as_deref(), &concern),
        Commands::ValidateConfig { config_file } => {
            run_validate_config(config_file.or(cli.config))
        }
        Commands::Watch {
            base_dir,
            target,
            delay,
        } => run_watch(cli.config, base_dir, target, delay, use_colors).await,
    }
}

/// Explicit config file, or the one discovered in `base_dir`, or defaults
fn load_config(config_path: Option<&Path>, base_dir: &Path) -> GuardianResult<GuardianConfig> {
    match config_path {
        Some(path) => GuardianConfig::load_from_file(path),
        None => GuardianConfig::load_or_default(base_dir),
    }
}

fn apply_target(config: &mut GuardianConfig, target: &TargetArgs) {
    if let Some(host) = &target.host {
        config.target.host = Some(host.clone());
    }
    if !target.groups.is_empty() {
        config.target.groups = target.groups.clone();
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut GuardianConfig, args: &CheckArgs) -> GuardianResult<()> {
    apply_target(config, &args.target);
    let audit = &mut config.audit;

    if let Some(filter) = &args.error_filter {
        audit.error_filter = filter.clone();
    }
    if let Some(assume) = args.error_assume {
        audit.error_assume = assume;
    }
    if let Some(min_uses) = args.pfx_min_uses {
        audit.pfx_min_uses = min_uses;
    }
    if let Some(max_none) = args.pfx_max_none {
        audit.pfx_max_none = max_none;
    }
    if let Some(max_once) = args.pfx_max_once {
        audit.pfx_max_once = max_once;
    }
    if let Some(pattern) = &args.from_pattern {
        audit.from_pattern = pattern.clone();
    }
    if let Some(list) = &args.from_list {
        audit.from_list = ListInput::Text(list.clone());
    }
    if args.remote_facts {
        audit.remote_facts = true;
    }
    if args.threads.is_some() {
        audit.resolver_threads = args.threads;
    }

    if args.fatal_overrides {
        config.escalation.overrides = true;
    }
    if args.fatal_namespace {
        config.escalation.namespace = true;
    }
    if args.no_fatal_definitions {
        config.escalation.definitions = false;
    }

    config.validate()
}

fn run_check(config_path: Option<&Path>, args: &CheckArgs, use_colors: bool) -> GuardianResult<i32> {
    let mut config = load_config(config_path, &args.base_dir)?;
    apply_overrides(&mut config, args)?;

    let escalation = config.escalation;
    let remote_facts = config.audit.remote_facts;
    let format: OutputFormat = args.format.into();

    let mut guardian = InventoryGuardian::new(config)?.with_report_formatter(ReportFormatter::new(
        ReportOptions {
            use_colors: use_colors && format == OutputFormat::Human,
            escalation,
            ..Default::default()
        },
    ));

    match (&args.facts, remote_facts) {
        (Some(path), true) => guardian = guardian.with_facts(LayeredResolver::load_facts(path)?),
        (Some(path), false) => {
            tracing::warn!("Ignoring {} without --remote-facts", path.display())
        }
        (None, true) => tracing::warn!("remote_facts enabled but no facts file given"),
        (None, false) => {}
    }

    let sources = if args.paths.is_empty() {
        guardian.sources(&args.base_dir)?
    } else {
        layers_from_paths(&args.paths)
    };

    let report = guardian.audit_sources(&sources);

    let formatted = guardian.format_report(&report, format)?;
    println!("{}", formatted.trim_end());

    if report.has_fatal_failures(&escalation) {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn run_variables(
    config_path: Option<&Path>,
    paths: &[PathBuf],
    base_dir: &Path,
    target: &TargetArgs,
    from_pattern: Option<String>,
    from_list: Option<String>,
) -> GuardianResult<i32> {
    let mut config = load_config(config_path, base_dir)?;
    apply_target(&mut config, target);
    if let Some(pattern) = from_pattern {
        config.audit.from_pattern = pattern;
    }
    if let Some(list) = from_list {
        config.audit.from_list = ListInput::Text(list);
    }

    let guardian = InventoryGuardian::new(config)?;
    let sources = if paths.is_empty() {
        guardian.sources(base_dir)?
    } else {
        layers_from_paths(paths)
    };

    let (occurrences, variables) = guardian.inventory(&sources);
    let width = variables.names().iter().map(|n| n.len()).max().unwrap_or(0);

    for name in variables.names() {
        println!(
            "{:<width$}  {:>3}  {}",
            name,
            occurrences.count(name),
            prefix_token(name)
        );
    }

    Ok(0)
}

fn run_explain(config_path: Option<&Path>, concern: &str) -> GuardianResult<i32> {
    let Some(concern) = Concern::parse(concern) else {
        eprintln!("Unknown concern '{concern}'");
        println!();
        println!("Available concerns:");
        for concern in Concern::ALL {
            println!("  - {concern}");
        }
        return Ok(1);
    };

    let config = load_config(config_path, Path::new("."))?;
    let audit = &config.audit;

    println!("Concern: {concern}");
    match concern {
        Concern::Override => {
            println!("Counts how many layers declare each variable.");
            println!("Fails when any variable is declared three or more times, or when");
            println!(
                "more than {DUPLICATE_LIMIT} variables (and more than {DUPLICATE_LIMIT}% of all) are overridden."
            );
        }
        Concern::NamespaceOnewords => {
            println!("Counts variables without a namespace prefix (no `_` separator).");
            println!(
                "Fails above {} names and above {}% of all names.",
                audit.pfx_max_none, audit.pfx_max_none
            );
        }
        Concern::NamespacePrefixonce => {
            println!("Counts prefixes shared by no other variable.");
            println!(
                "Fails above {} prefixes and above {}% of all names.",
                audit.pfx_max_once, audit.pfx_max_once
            );
        }
        Concern::NamespaceAvguse => {
            println!("Averages the number of variables per prefix.");
            println!("Fails below {} variables per prefix.", audit.pfx_min_uses);
        }
        Concern::Definitions => {
            println!("Resolves every selected variable through the layered values.");
            println!(
                "Fails when more than {} variables stay undefined.",
                audit.error_assume
            );
            if !audit.error_filter.is_empty() {
                println!("Names matching `{}` are tolerated.", audit.error_filter);
            }
        }
    }

    if concern.is_namespace() {
        println!();
        println!("{NAMESPACE_REMARK}");
    }

    let fatal = match concern {
        Concern::Override => config.escalation.overrides,
        Concern::Definitions => config.escalation.definitions,
        _ => config.escalation.namespace,
    };
    println!();
    println!("Fatal: {}", if fatal { "yes" } else { "no" });

    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>) -> GuardianResult<i32> {
    let config_path = config_path
        .or_else(|| GuardianConfig::discover(Path::new(".")))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));

    println!("Validating configuration: {}", config_path.display());

    match GuardianConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Layers: {}", config.layers.len());
            for layer in &config.layers {
                println!("    {} ({} paths)", layer.id, layer.paths.len());
            }
            println!(
                "  Fatal concerns: overrides={} namespace={} definitions={}",
                config.escalation.overrides,
                config.escalation.namespace,
                config.escalation.definitions
            );
            println!("  Fingerprint: {}", config.fingerprint());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

async fn run_watch(
    config_path: Option<PathBuf>,
    base_dir: PathBuf,
    target: TargetArgs,
    delay_ms: u64,
    use_colors: bool,
) -> GuardianResult<i32> {
    use notify::{Event, RecursiveMode, Result as NotifyResult, Watcher};

    let base_dir = base_dir.canonicalize()?;
    println!("Watching: {}", base_dir.display());
    println!("Debounce delay: {delay_ms}ms");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: NotifyResult<Event>| match res {
        Ok(event) => {
            // receiver gone means the loop has exited
            let _ = tx.send(event);
        }
        Err(e) => tracing::warn!("Watch error: {}", e),
    })
    .map_err(|e| GuardianError::config(format!("Failed to create file watcher: {e}")))?;

    watcher
        .watch(&base_dir, RecursiveMode::Recursive)
        .map_err(|e| {
            GuardianError::config(format!("Failed to watch '{}': {}", base_dir.display(), e))
        })?;

    let args = CheckArgs {
        base_dir: base_dir.clone(),
        target,
        ..Default::default()
    };
    let mut patterns = watch_patterns(config_path.as_deref(), &args.target, &base_dir);
    run_watch_cycle(config_path.as_deref(), &args, use_colors);

    while let Some(event) = rx.recv().await {
        let config_changed = is_config_change(&event, config_path.as_deref());
        if !config_changed && !should_trigger_check(&event, &patterns) {
            continue;
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        while rx.try_recv().is_ok() {}

        if config_changed {
            println!("Configuration changed, reloading");
            patterns = watch_patterns(config_path.as_deref(), &args.target, &base_dir);
        }
        run_watch_cycle(config_path.as_deref(), &args, use_colors);
    }

    Ok(0)
}

fn run_watch_cycle(config_path: Option<&Path>, args: &CheckArgs, use_colors: bool) {
    match run_check(config_path, args, use_colors) {
        Ok(0) => println!("Audit passed; watching for changes"),
        Ok(_) => println!("Audit failed; watching for changes"),
        Err(e) => eprintln!("Audit error: {e}"),
    }
}

/// Glob patterns covering every layer path of the audited host
fn watch_patterns(
    config_path: Option<&Path>,
    target: &TargetArgs,
    base_dir: &Path,
) -> Vec<glob::Pattern> {
    let mut config = match load_config(config_path, base_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default layers: {}", e);
            GuardianConfig::default()
        }
    };
    apply_target(&mut config, target);

    let mut patterns = Vec::new();
    for layer in &instantiate_layers(&config.layers, &config.target) {
        for path in &layer.paths {
            let joined = base_dir.join(path);
            let text = joined.to_string_lossy();
            // a directory layer covers everything below it
            for candidate in [text.to_string(), format!("{text}/**/*")] {
                match glob::Pattern::new(&candidate) {
                    Ok(pattern) => patterns.push(pattern),
                    Err(e) => tracing::debug!("Skipping watch pattern '{}': {}", candidate, e),
                }
            }
        }
    }
    patterns
}

fn is_relevant_kind(event: &notify::Event) -> bool {
    use notify::EventKind;

    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Check if an event touches a layer file
fn should_trigger_check(event: &notify::Event, patterns: &[glob::Pattern]) -> bool {
    is_relevant_kind(event)
        && event
            .paths
            .iter()
            .any(|path| patterns.iter().any(|p| p.matches_path(path)))
}

/// Check if an event indicates a config file change
fn is_config_change(event: &notify::Event, config_path: Option<&Path>) -> bool {
    if !is_relevant_kind(event) {
        return false;
    }

    event.paths.iter().any(|path| {
        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| DEFAULT_CONFIG_FILES.contains(&n));
        let explicit = config_path
            .and_then(|c| c.canonicalize().ok())
            .is_some_and(|c| &c == path);
        by_name || explicit
    })
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind};
    use std::fs;
    use tempfile::TempDir;

    fn inventory(all: &str, host: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("group_vars")).unwrap();
        fs::create_dir_all(temp_dir.path().join("host_vars")).unwrap();
        fs::write(temp_dir.path().join("group_vars/all.yml"), all).unwrap();
        fs::write(temp_dir.path().join("host_vars/web1.yml"), host).unwrap();
        temp_dir
    }

    fn web1() -> TargetArgs {
        TargetArgs {
            host: Some("web1".to_string()),
            groups: Vec::new(),
        }
    }

    fn check_args(dir: &TempDir) -> CheckArgs {
        CheckArgs {
            base_dir: dir.path().to_path_buf(),
            target: web1(),
            format: OutputFormatArg::Json,
            ..Default::default()
        }
    }

    #[test]
    fn test_check_command() {
        let dir = inventory("web_port: \"80\"\n", "web_port: \"{{ web_port }}\"\n");

        assert_eq!(run_check(None, &check_args(&dir), false).unwrap(), 1);

        let args = CheckArgs {
            no_fatal_definitions: true,
            ..check_args(&dir)
        };
        assert_eq!(run_check(None, &args, false).unwrap(), 0);

        let args = CheckArgs {
            error_assume: Some(1),
            ..check_args(&dir)
        };
        assert_eq!(run_check(None, &args, false).unwrap(), 0);
    }

    #[test]
    fn test_check_explicit_paths() {
        let dir = inventory("app_port: 80\n", "app_port: 8080\n");
        let args = CheckArgs {
            paths: vec![
                dir.path().join("group_vars/all.yml"),
                dir.path().join("host_vars"),
            ],
            ..check_args(&dir)
        };

        assert_eq!(run_check(None, &args, false).unwrap(), 0);
    }

    #[test]
    fn test_fatal_overrides_flag() {
        let all = "app_port: 80\n";
        let dir = inventory(all, all);
        fs::write(dir.path().join("group_vars/web.yml"), all).unwrap();

        let mut target = web1();
        target.groups = vec!["web".to_string()];
        let args = CheckArgs {
            target: target.clone(),
            ..check_args(&dir)
        };
        assert_eq!(run_check(None, &args, false).unwrap(), 0);

        let args = CheckArgs {
            target,
            fatal_overrides: true,
            ..check_args(&dir)
        };
        assert_eq!(run_check(None, &args, false).unwrap(), 1);
    }

    #[test]
    fn test_other_hosts_do_not_count_as_overrides() {
        let all = "app_port: 80\n";
        let dir = inventory(all, all);
        fs::write(dir.path().join("host_vars/web2.yml"), all).unwrap();

        let args = CheckArgs {
            fatal_overrides: true,
            ..check_args(&dir)
        };
        assert_eq!(run_check(None, &args, false).unwrap(), 0);
    }

    #[test]
    fn test_invalid_override_is_error() {
        let dir = inventory("a: 1\n", "b: 2\n");
        let args = CheckArgs {
            from_list: Some("ok, not-valid".to_string()),
            ..check_args(&dir)
        };

        assert!(run_check(None, &args, false).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = GuardianConfig::default();
        let args = CheckArgs {
            error_filter: Some("^vault_".to_string()),
            pfx_min_uses: Some(2),
            from_list: Some("a b".to_string()),
            threads: Some(2),
            fatal_namespace: true,
            target: TargetArgs {
                host: Some("db1".to_string()),
                groups: vec!["db".to_string()],
            },
            ..Default::default()
        };

        apply_overrides(&mut config, &args).unwrap();

        assert_eq!(config.target.host.as_deref(), Some("db1"));
        assert_eq!(config.target.groups, vec!["db"]);

        assert_eq!(config.audit.error_filter, "^vault_");
        assert_eq!(config.audit.pfx_min_uses, 2);
        assert_eq!(config.audit.from_list, ListInput::Text("a b".to_string()));
        assert_eq!(config.audit.resolver_threads, Some(2));
        assert!(config.escalation.namespace);
        assert!(config.escalation.definitions);
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("inventory_guardian.yaml");

        let yaml = serde_yaml::to_string(&GuardianConfig::default()).unwrap();
        fs::write(&config_file, yaml).unwrap();
        assert_eq!(run_validate_config(Some(config_file.clone())).unwrap(), 0);

        fs::write(&config_file, "version: \"1.0\"\naudit:\n  error_filter: \"(\"\n").unwrap();
        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 1);
    }

    #[test]
    fn test_explain_concern() {
        assert_eq!(run_explain(None, "namespace-avguse").unwrap(), 0);
        assert_eq!(run_explain(None, "definitions").unwrap(), 0);
        assert_eq!(run_explain(None, "nonexistent").unwrap(), 1);
    }

    #[test]
    fn test_variables_command() {
        let dir = inventory("app_port: 80\n", "app_port: 8080\n");
        let result = run_variables(
            None,
            &[],
            dir.path(),
            &web1(),
            None,
            Some("app_port".to_string()),
        );
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_watch_event_filtering() {
        let base = Path::new("/inventory");
        let patterns = watch_patterns(None, &web1(), base);

        let layer_event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/inventory/host_vars/web1.yml"));
        assert!(should_trigger_check(&layer_event, &patterns));

        let other_host = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/inventory/host_vars/web2.yml"));
        assert!(!should_trigger_check(&other_host, &patterns));

        let other_event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/inventory/roles/web/tasks/main.yml"));
        assert!(!should_trigger_check(&other_event, &patterns));

        let config_event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/inventory/inventory_guardian.yaml"));
        assert!(is_config_change(&config_event, None));
        assert!(!is_config_change(&layer_event, None));
    }
}
