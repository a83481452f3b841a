use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use winget_bridge::winget::details;
use winget_bridge::winget::streaming::clean_line;
use winget_bridge::winget::table::TableParser;
use winget_bridge::winget::{Package, SourceClassification, TableShape};
use winget_bridge::{Config, WinGet};

#[derive(Debug, Parser)]
#[command(name = "winget-bridge")]
#[command(about = "Query winget and print typed package records")]
struct Cli {
    /// 跳过 PowerShell 模块，直接解析 winget 表格输出
    #[arg(long, global = true)]
    legacy: bool,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 搜索软件源
    Search { query: String },
    /// 列出已安装的包
    List,
    /// 列出可更新的包
    Updates,
    /// 显示包详情
    Show {
        id: String,
        #[arg(long, default_value = "winget")]
        source: String,
    },
    /// 列出可安装的版本
    Versions { id: String },
    /// 列出已配置的软件源
    Sources,
    /// 解析保存下来的 winget 输出，不启动任何进程
    Parse { kind: CapturedKind, file: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CapturedKind {
    Search,
    Installed,
    Updates,
    Details,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load_or_default()?;
    if cli.legacy {
        config.force_legacy = true;
    }
    let winget = WinGet::new(config);

    match cli.command {
        Command::Search { query } => print_packages(&winget.search(&query)?, cli.json)?,
        Command::List => print_packages(&winget.installed_packages()?, cli.json)?,
        Command::Updates => print_packages(&winget.available_updates()?, cli.json)?,
        Command::Show { id, source } => {
            let source = winget.registry().get_or_default(&source);
            let details = winget.package_details(&id, &source)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("{:#?}", details);
            }
        }
        Command::Versions { id } => {
            for version in winget.installable_versions(&id)? {
                println!("{}", version);
            }
        }
        Command::Sources => {
            let sources = winget.sources()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                for source in sources {
                    println!("{:<12} {}", source.name, source.url);
                }
            }
        }
        Command::Parse { kind, file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("无法读取 {}", file.display()))?;
            let lines = content.lines().map(clean_line);
            let shape = match kind {
                CapturedKind::Search => TableShape::Search,
                CapturedKind::Installed => TableShape::Installed,
                CapturedKind::Updates => TableShape::Updates,
                CapturedKind::Details => {
                    let details = details::parse_all(lines);
                    println!("{}", serde_json::to_string_pretty(&details)?);
                    return Ok(());
                }
            };
            let packages: Vec<Package> = TableParser::new(lines, shape)
                .map(|record| winget.registry().package(record, shape))
                .collect();
            print_packages(&packages, cli.json)?;
        }
    }

    Ok(())
}

fn print_packages(packages: &[Package], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(packages)?);
        return Ok(());
    }
    for package in packages {
        let version = match &package.new_version {
            Some(new_version) => format!("{} -> {}", package.version, new_version),
            None => package.version.clone(),
        };
        let source = match &package.source {
            SourceClassification::Registry(name) => name.clone(),
            local => format!("{} (local)", local),
        };
        println!("{:<40} {:<40} {:<24} {}", package.name, package.id, version, source);
    }
    eprintln!("共 {} 个包", packages.len());
    Ok(())
}
