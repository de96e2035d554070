//! NovelBox - 小说草稿命令行
//!
//! 组装存储、仓储、章节服务与 LLM 服务，并把子命令映射到应用服务

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use novelbox::application::ports::{
    DirectoryPickerPort, GenerationRequest, LocalizerPort, NovelStoragePort,
};
use novelbox::application::{
    ChapterService, CreateNovel, DraftRepository, LlmService, NovelPatch, NovelService,
    ReorderChapters,
};
use novelbox::config::{load_config, load_config_from_path, print_config, AppConfig};
use novelbox::domain::novel::{ChapterId, NovelId};
use novelbox::domain::DropPosition;
use novelbox::infrastructure::adapters::{
    build_text_generators, FixedDirectoryPicker, StdinDirectoryPicker,
};
use novelbox::infrastructure::{JsonFileStorage, NotificationPublisher, StaticLocalizer, StorageContext};

#[derive(Debug, Parser)]
#[command(name = "novelbox", version, about = "Local novel drafts with autosave")]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 打印生效的配置
    #[arg(long, global = true)]
    show_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 列出所有小说
    List,
    /// 创建小说
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// 修改小说信息
    Update {
        novel_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// 清空简介
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },
    /// 删除小说
    Delete { novel_id: String },
    /// 列出章节
    Chapters { novel_id: String },
    /// 追加章节
    AddChapter { novel_id: String },
    /// 重命名章节
    RenameChapter {
        novel_id: String,
        chapter_id: String,
        title: String,
    },
    /// 删除章节
    DeleteChapter { novel_id: String, chapter_id: String },
    /// 移动章节到目标章节之前/之后
    MoveChapter {
        novel_id: String,
        dragged: String,
        target: String,
        #[arg(long, default_value = "before")]
        position: DropPosition,
    },
    /// 用文件内容替换章节正文
    Write {
        novel_id: String,
        chapter_id: String,
        file: PathBuf,
    },
    /// 存储目录
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
    /// 调用文本生成
    Generate {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        #[arg(long, default_value_t = 1000)]
        max_tokens: u32,
        prompt: String,
    },
}

#[derive(Debug, Subcommand)]
enum StorageAction {
    /// 显示当前存储位置
    Show,
    /// 选择存储目录（不给路径时从终端读取）
    Select { path: Option<PathBuf> },
    /// 恢复默认目录
    Reset,
}

struct App {
    storage: Arc<JsonFileStorage>,
    novels: NovelService,
    chapters: Arc<ChapterService>,
}

impl App {
    async fn build(config: &AppConfig, picker: Arc<dyn DirectoryPickerPort>) -> anyhow::Result<Self> {
        let context = StorageContext::new(
            config.storage.resolve_default_dir(),
            config.storage.file_name.clone(),
        )
        .with_custom_dir(config.storage.custom_dir.clone());
        let storage = Arc::new(JsonFileStorage::new(context, picker));

        let localizer: Arc<dyn LocalizerPort> = Arc::new(StaticLocalizer::new(&config.i18n.locale));
        let repo = DraftRepository::new(storage.clone(), localizer).arc();
        repo.load()
            .await
            .with_context(|| format!("Failed to load {}", storage.data_file_path().display()))?;

        let publisher = NotificationPublisher::new().arc();
        let chapters =
            ChapterService::new(repo, publisher.clone(), config.autosave.policy()).arc();
        let novels = NovelService::new(chapters.clone(), publisher);

        Ok(Self {
            storage,
            novels,
            chapters,
        })
    }

    async fn open_novel(&self, novel_id: &str) -> anyhow::Result<()> {
        if !self.chapters.open_novel(&NovelId::from(novel_id)).await? {
            bail!("Novel not found: {novel_id}");
        }
        Ok(())
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},novelbox={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path.as_path())),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    if cli.show_config {
        print_config(&config);
    }

    let picker: Arc<dyn DirectoryPickerPort> = match &cli.command {
        Command::Storage {
            action: StorageAction::Select { path: Some(path) },
        } => Arc::new(FixedDirectoryPicker::new(Some(path.clone()))),
        Command::Storage {
            action: StorageAction::Select { path: None },
        } => Arc::new(StdinDirectoryPicker::default()),
        _ => Arc::new(FixedDirectoryPicker::cancelled()),
    };

    let app = App::build(&config, picker).await?;
    let result = run(&app, &config, cli.command).await;
    app.chapters.close_novel().await;
    result
}

async fn run(app: &App, config: &AppConfig, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for novel in app.novels.list().await {
                println!(
                    "{}\t{}\t{}\t{} chapters\t{} chars",
                    novel.id(),
                    novel.name(),
                    novel.author(),
                    novel.chapter_count(),
                    novel.total_word_count()
                );
            }
        }
        Command::Create {
            name,
            author,
            description,
        } => {
            let mut command = CreateNovel::new(name, author);
            command.description = description;
            let novel = app.novels.create(command).await?;
            println!("{}", novel.id());
        }
        Command::Update {
            novel_id,
            name,
            author,
            description,
            clear_description,
        } => {
            let patch = NovelPatch {
                name,
                author,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                cover: None,
            };
            if !app.novels.update(&NovelId::from(novel_id.as_str()), patch).await? {
                bail!("Novel not found: {novel_id}");
            }
        }
        Command::Delete { novel_id } => {
            if !app.novels.delete(&NovelId::from(novel_id.as_str())).await? {
                bail!("Novel not found: {novel_id}");
            }
        }
        Command::Chapters { novel_id } => {
            app.open_novel(&novel_id).await?;
            for (index, chapter) in app.chapters.chapters().await.iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{} chars",
                    index + 1,
                    chapter.id(),
                    chapter.title(),
                    chapter.word_count()
                );
            }
        }
        Command::AddChapter { novel_id } => {
            app.open_novel(&novel_id).await?;
            if let Some(chapter) = app.chapters.add_chapter().await? {
                println!("{}\t{}", chapter.id(), chapter.title());
            }
        }
        Command::RenameChapter {
            novel_id,
            chapter_id,
            title,
        } => {
            app.open_novel(&novel_id).await?;
            if !app
                .chapters
                .rename_chapter(&ChapterId::from(chapter_id.as_str()), &title)
                .await?
            {
                bail!("Chapter not found: {chapter_id}");
            }
        }
        Command::DeleteChapter {
            novel_id,
            chapter_id,
        } => {
            app.open_novel(&novel_id).await?;
            if !app
                .chapters
                .delete_chapter(&ChapterId::from(chapter_id.as_str()))
                .await?
            {
                bail!("Chapter not found: {chapter_id}");
            }
        }
        Command::MoveChapter {
            novel_id,
            dragged,
            target,
            position,
        } => {
            app.open_novel(&novel_id).await?;
            let moved = app
                .chapters
                .reorder_chapters(ReorderChapters::new(dragged, target, position))
                .await?;
            if !moved {
                println!("Nothing to move");
            }
        }
        Command::Write {
            novel_id,
            chapter_id,
            file,
        } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            app.open_novel(&novel_id).await?;
            if !app
                .chapters
                .open_chapter(&ChapterId::from(chapter_id.as_str()))
                .await?
            {
                bail!("Chapter not found: {chapter_id}");
            }
            app.chapters.update_chapter_content(content).await?;
            let words = app
                .chapters
                .current_chapter()
                .await
                .map_or(0, |c| c.word_count());
            app.chapters.flush().await?;
            println!("{words} chars saved");
        }
        Command::Storage { action } => match action {
            StorageAction::Show => {
                let location = app.storage.location();
                let kind = if location.is_custom() { "custom" } else { "default" };
                println!("{kind}\t{}", app.storage.data_file_path().display());
            }
            StorageAction::Reset => {
                let dir = app.storage.reset_to_default().await;
                println!("Storage directory: {}", dir.display());
            }
            StorageAction::Select { .. } => match app.storage.select_directory().await? {
                Some(dir) => {
                    println!("Storage directory: {}", dir.display());
                    println!("Set NOVELBOX_STORAGE__CUSTOM_DIR to keep using it.");
                }
                None => println!("Cancelled"),
            },
        },
        Command::Generate {
            provider,
            model,
            max_tokens,
            prompt,
        } => generate(config, &provider, &model, max_tokens, prompt).await?,
    }

    Ok(())
}

async fn generate(
    config: &AppConfig,
    provider: &str,
    model: &str,
    max_tokens: u32,
    prompt: String,
) -> anyhow::Result<()> {
    let service = LlmService::new();
    for generator in build_text_generators(&config.llm) {
        service.register(generator);
    }

    let request = GenerationRequest {
        max_tokens,
        ..GenerationRequest::new(prompt)
    };
    let response = service.generate(provider, model, &request).await?;
    println!("{}", response.content);
    tracing::info!(tokens_used = response.tokens_used, "Generation finished");
    Ok(())
}
