use canteen_menu::utils::{logger, validation::Validate};
use canteen_menu::{CliConfig, Command, MenuConfig, MenuError, PeriodIndex, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli) {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

fn load_config(cli: &CliConfig) -> Result<MenuConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            MenuConfig::from_file(path)?
        }
        None => MenuConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }

    config.validate()?;
    Ok(config)
}

fn resolve_now(cli: &CliConfig, tz: Tz) -> Result<DateTime<Tz>> {
    match &cli.at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .map(|t| t.with_timezone(&tz))
            .map_err(|e| MenuError::InvalidConfigValueError {
                field: "--at".to_string(),
                value: at.clone(),
                reason: format!("Invalid RFC 3339 timestamp: {}", e),
            }),
        None => Ok(Utc::now().with_timezone(&tz)),
    }
}

fn run(cli: &CliConfig) -> Result<()> {
    let config = load_config(cli)?;
    let tz = config.timezone()?;
    let now = resolve_now(cli, tz)?;

    let service = config.menu_service()?;
    let index = service.load_index(&now)?;

    match cli.command {
        Command::Weeks => print_weeks(&index, &now),
        Command::Week => {
            let week = index.require_nearest(&now)?;
            week.fetch_days_if_needed()?;
            println!("{}", serde_json::to_string_pretty(week)?);
            Ok(())
        }
        Command::Day => {
            let week = index.require_nearest(&now)?;
            match week.nearest(&now)? {
                Some(day) => {
                    let output = serde_json::json!({
                        "today": day.contains(&now),
                        "day": day,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                None => {
                    tracing::warn!("Week {} has no days", week.locator());
                    println!("null");
                }
            }
            Ok(())
        }
        Command::Link => {
            println!("{}", index.require_nearest(&now)?.locator());
            Ok(())
        }
    }
}

fn print_weeks(index: &PeriodIndex, now: &DateTime<Tz>) -> Result<()> {
    let current = index.current(now).map(|p| p.locator());
    let weeks: Vec<_> = index
        .periods()
        .iter()
        .map(|p| {
            serde_json::json!({
                "link": p.locator(),
                "start": p.start(),
                "end": p.end(),
                "current": Some(p.locator()) == current,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&weeks)?);
    Ok(())
}
