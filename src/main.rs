//! CommentGuard 命令行入口
//!
//! 对一个观看页（URL 或本地HTML快照）运行完整检测管道，
//! 打印报告并可选写出带标记的页面副本

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use regex::Regex;
use tracing_subscriber::EnvFilter;
use url::Url;

use commentguard::coordinator::Coordinator;
use commentguard::detection::classifier::ClassifierClient;
use commentguard::detection::error::{DetectionError, DetectionResult};
use commentguard::env::{classifier_config_from_env, core::LogLevel, EnvVar};
use commentguard::panel::{
    render_report, CategoryFilter, PanelConfig, PanelController, PanelState,
};
use commentguard::{print_error_message, print_info_message};

#[derive(Parser)]
#[command(
    name = "commentguard",
    version,
    about = "Detect cyberbullying in video watch-page comments"
)]
struct Cli {
    /// Watch page to analyze: http(s) URL or local HTML file
    target: String,

    /// Base URL of the classification API
    #[arg(short = 'a', long)]
    api_url: Option<String>,

    /// Write the annotated page to this file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Classify only, do not mark comments in the output page
    #[arg(long)]
    no_highlight: bool,

    /// Which verdicts to list in the details section
    #[arg(short = 'f', long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,

    /// Classification request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Suppress the report, only set the exit code
    #[arg(short = 's', long)]
    silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    All,
    Harassment,
    Safe,
}

impl std::fmt::Display for FilterArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no skipped variants")
            .get_name()
            .fmt(f)
    }
}

impl From<FilterArg> for CategoryFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => CategoryFilter::All,
            FilterArg::Harassment => CategoryFilter::Harassment,
            FilterArg::Safe => CategoryFilter::Safe,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = LogLevel::get_or_default("info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.silent { "error".to_string() } else { default_level }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // RcDom 不是 Send，整个管道跑在单线程协作式运行时上
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            print_error_message(&format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error_message(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> DetectionResult<()> {
    let mut config = classifier_config_from_env()
        .map_err(|e| DetectionError::Transport(e.to_string()))?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout {
        config.classify_timeout = std::time::Duration::from_secs(secs);
    }

    let classifier = ClassifierClient::new(config)?;
    let (url, data) = load_target(&cli.target).await?;

    let mut coordinator = Coordinator::new(classifier.clone());
    coordinator.register_tab(1, url, &data);

    // 本地快照视为已打开的观看页，不做地址校验
    let panel_config = if remote_target(&cli.target).is_some() {
        PanelConfig::default()
    } else {
        PanelConfig {
            watch_page_pattern: Regex::new("").unwrap(),
        }
    };

    let mut controller = PanelController::new(coordinator, classifier, panel_config);
    controller.start_analysis().await;

    match controller.state().clone() {
        PanelState::Results => {}
        PanelState::Error { message } => return Err(DetectionError::Transport(message)),
        // start_analysis 只以 Results 或 Error 收尾
        other => {
            return Err(DetectionError::Transport(format!(
                "Unexpected panel state: {:?}",
                other
            )))
        }
    }

    controller.set_filter(cli.filter.into());

    if !cli.silent {
        print_report(&controller);
    }

    if !cli.no_highlight {
        controller.highlight_on_page().await?;
    }

    if let Some(path) = &cli.output {
        let coordinator = controller.into_host();
        let html = coordinator
            .context(1)
            .map(|ctx| ctx.to_html())
            .unwrap_or_default();
        fs::write(path, html)
            .map_err(|e| DetectionError::Injection(format!("Failed to write output: {}", e)))?;
        if !cli.silent {
            print_info_message(&format!("Annotated page written to {}", path.display()));
        }
    }

    Ok(())
}

/// 目标是可抓取的远程页面时返回解析后的地址
fn remote_target(target: &str) -> Option<Url> {
    Url::parse(target)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

async fn load_target(target: &str) -> DetectionResult<(String, Vec<u8>)> {
    if let Some(url) = remote_target(target) {
        tracing::info!("抓取页面: {}", url);
        let response = reqwest::get(url.clone())
            .await
            .map_err(|e| DetectionError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DetectionError::Transport(format!(
                "Failed to fetch page: status {}",
                response.status().as_u16()
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| DetectionError::Transport(e.to_string()))?;
        Ok((String::from(url), body.to_vec()))
    } else {
        let data = fs::read(target)
            .map_err(|e| DetectionError::NoContent(format!("Failed to read {}: {}", target, e)))?;
        Ok((format!("file://{}", target), data))
    }
}

fn print_report(controller: &PanelController<Coordinator>) {
    if let Some(result) = controller.analysis() {
        print_info_message(&render_report(result));
    }

    if controller.filter() != CategoryFilter::All {
        let visible = controller.visible_predictions();
        let counts = controller.counts();
        print_info_message(&format!(
            "Filter matched {} of {} comments",
            visible.len(),
            counts.all
        ));
    }

    if let Some(summary) = controller.summary() {
        if summary.total() > 0 {
            print_info_message(&format!(
                "[{}] {} flagged / {} safe",
                summary.render_bar(30),
                summary.flagged,
                summary.clear
            ));
        }
    }
}
