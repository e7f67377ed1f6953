//! LesNote 命令行客户端
//!
//! 非交互式，每个子命令执行一次请求后退出。登录状态保存在本地 SQLite 中。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use lesnote_sdk_core::lesnote::chat::{ChatListener, ChatMessage, ClearOutcome, EmptyChatListener, MessageKind};
use lesnote_sdk_core::lesnote::listing::{ListQuery, PageSource, PaginatedList, DEFAULT_PAGE_SIZE};
use lesnote_sdk_core::lesnote::notes::{ExportFormat, NoteExporter, SearchScope};
use lesnote_sdk_core::lesnote::structure::{LessonNoteStructure, StructureResource};
use lesnote_sdk_core::lesnote::taxonomy::TaxonomySource;
use lesnote_sdk_core::{ClientConfig, ClientError, LesNoteClient};
use tracing::{error, info};

/// LesNote 命令行客户端
#[derive(Parser, Debug)]
#[command(name = "lesnote-cli")]
#[command(about = "LesNote CLI - 课程分类、教案结构、AI 助手和教案搜索", long_about = None)]
struct Args {
    /// API 地址，覆盖 LESNOTE_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// 本地数据库 URL，覆盖 LESNOTE_DB_URL
    #[arg(long)]
    db_url: Option<String>,

    /// 日志级别（默认: warn,lesnote_sdk_core=info）
    #[arg(long, default_value = "warn,lesnote_sdk_core=info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 邮箱密码登录
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// 持久化登录状态（否则进程退出即失效）
        #[arg(long)]
        remember: bool,
    },
    Logout,
    /// 显示当前登录用户
    Whoami,
    Classes,
    Subjects {
        #[arg(long = "class")]
        class_id: i64,
    },
    Themes {
        #[arg(long = "subject")]
        subject_id: i64,
    },
    Topics {
        #[arg(long = "subject")]
        subject_id: i64,
        #[arg(long = "theme")]
        theme_id: Option<i64>,
    },
    /// 教案结构分页列表
    Structures {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "class")]
        class_id: Option<i64>,
        #[arg(long = "subject")]
        subject_id: Option<i64>,
    },
    /// 向 AI 助手发送一条消息
    Chat { message: String },
    /// 清空 AI 聊天记录
    ChatClear,
    /// 搜索教案，可选导出第一条结果（命令行只支持 document）
    Search {
        term: String,
        #[arg(long, value_parser = parse_cli_export)]
        export: Option<ExportFormat>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// 仪表盘统计
    Stats,
}

/// PDF / PNG 需要调用方提供 `SnapshotRenderer`，命令行没有渲染器
fn parse_cli_export(s: &str) -> Result<ExportFormat, String> {
    match s.parse::<ExportFormat>()? {
        ExportFormat::Document => Ok(ExportFormat::Document),
        other => Err(format!(
            "{} export needs a snapshot renderer; the CLI only exports `document`",
            other
        )),
    }
}

/// 初始化日志（同时输出到 stderr 和文件，stdout 留给命令输出）
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("lesnote.log")?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// 会话过期时打印提示
struct CliChatListener;

#[async_trait]
impl ChatListener for CliChatListener {
    async fn on_messages_changed(&self, messages: Vec<ChatMessage>) {
        info!("[CLI/Chat] 消息数: {}", messages.len());
    }

    async fn on_session_expired(&self) {
        error!("[CLI/Chat] ⏰ 会话已过期，请重新登录");
    }
}

fn print_structure(s: &LessonNoteStructure) {
    let scope = [
        s.class_name.as_deref(),
        s.subject_name.as_deref(),
        s.theme_name.as_deref(),
        s.topic_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" / ");
    println!(
        "#{:<5} {:<40} objectives={} content={}",
        s.id,
        scope,
        s.sections.objectives.len(),
        s.sections.content.len()
    );
}

async fn run(args: Args) -> Result<()> {
    let mut config = ClientConfig::from_env_with_api_url(args.api_url);
    if let Some(db_url) = args.db_url {
        config = config.with_db_url(db_url);
    }
    let client = LesNoteClient::connect(config).await?;

    match args.command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let profile = client.login(&email, &password, remember).await?;
            println!("Signed in as {} ({})", profile.display_name(), profile.email);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Signed out.");
        }
        Command::Whoami => match client.session().current_user().await? {
            Some(user) => println!(
                "{} <{}> role={:?} plan={}",
                user.display_name(),
                user.email,
                user.role(),
                user.plan.as_deref().unwrap_or("-")
            ),
            None => println!("Not signed in."),
        },
        Command::Classes => {
            for class in client.taxonomy().await?.classes().await? {
                println!("{:<5} {}", class.id, class.name);
            }
        }
        Command::Subjects { class_id } => {
            for subject in client.taxonomy().await?.subjects_by_class(class_id).await? {
                println!("{:<5} {}", subject.id, subject.name);
            }
        }
        Command::Themes { subject_id } => {
            for theme in client.taxonomy().await?.themes_by_subject(subject_id).await? {
                println!("{:<5} {}", theme.id, theme.label());
            }
        }
        Command::Topics {
            subject_id,
            theme_id,
        } => {
            let topics = client
                .taxonomy()
                .await?
                .topics_by_subject(subject_id, theme_id)
                .await?;
            for topic in topics {
                println!("{:<5} {}", topic.id, topic.name);
            }
        }
        Command::Structures {
            page,
            page_size,
            search,
            class_id,
            subject_id,
        } => {
            let mut query = ListQuery {
                page,
                page_size,
                search_term: search.unwrap_or_default(),
                ..Default::default()
            };
            if let Some(id) = class_id {
                query.filters.insert("classId".into(), id.to_string());
            }
            if let Some(id) = subject_id {
                query.filters.insert("subjectId".into(), id.to_string());
            }
            let source: Arc<dyn PageSource<LessonNoteStructure>> =
                Arc::new(StructureResource::new(client.structures().await?));
            let mut list = PaginatedList::new(source).with_query(query);
            list.refresh().await?;
            for s in list.items() {
                print_structure(s);
            }
            println!(
                "page {}/{} ({} total)",
                list.page(),
                list.total_pages(),
                list.total_count()
            );
        }
        Command::Chat { message } => {
            let listener = Arc::new(CliChatListener);
            let _watcher = client.watch_session(listener.clone());
            let mut panel = client.chat_panel(listener).await?;
            panel.open().await?;
            panel.send(&message).await?;
            if let Some(reply) = panel
                .messages()
                .iter()
                .rev()
                .find(|m| m.kind == MessageKind::Ai)
            {
                println!("{}", reply.text);
            }
        }
        Command::ChatClear => {
            let mut panel = client.chat_panel(Arc::new(EmptyChatListener)).await?;
            panel.open().await?;
            // 命令行本身就是显式确认，连续点两次
            if panel.click_clear().await? == ClearOutcome::Armed {
                panel.click_clear().await?;
            }
            println!("Chat history cleared.");
        }
        Command::Search { term, export, out } => {
            let mut list = client.note_search(SearchScope::Own).await?;
            list.set_search(term).await?;
            for note in list.items() {
                println!("#{:<5} {} [{} / {}]", note.id, note.title, note.class_name, note.subject_name);
            }
            println!("{} result(s)", list.total_count());

            if let Some(format) = export {
                let Some(note) = list.items().first() else {
                    println!("Nothing to export.");
                    return Ok(());
                };
                let exporter = NoteExporter::new();
                let file = exporter.export(note, format)?;
                let path = exporter.write_to(&out, &file).await?;
                println!("Exported to {}", path.display());
            }
        }
        Command::Stats => {
            let stats = client.dashboard().await?.stats().await?;
            println!("classes:      {}", stats.total_classes);
            println!("subjects:     {}", stats.total_subjects);
            println!("themes:       {}", stats.total_themes);
            println!("topics:       {}", stats.total_topics);
            println!("lesson notes: {}", stats.total_lesson_notes);
            if let Some(users) = stats.total_users {
                println!("users:        {}", users);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = init_logger(&args.log_level) {
        eprintln!("无法初始化日志: {}", e);
    }

    if let Err(e) = run(args).await {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) => {
                error!("[CLI] 命令失败: {}", client_error);
                eprintln!("{}", client_error.user_message());
            }
            None => {
                error!("[CLI] 命令失败: {:#}", e);
                eprintln!("{:#}", e);
            }
        }
        std::process::exit(1);
    }
}
