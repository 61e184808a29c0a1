//! Tutor - 课程资料问答 CLI
//!
//! 入口：初始化日志、加载配置与课程文档；argv 带问题时单发回答，
//! 否则进入交互式问答循环。

use std::io::{BufRead, Write};

use anyhow::Context;
use tutor::config::{load_config, AppConfig};
use tutor::runtime::{create_model_from_config, QaRuntime};
use tutor::tools::Source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tutor::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let client = create_model_from_config(&cfg);
    let runtime =
        QaRuntime::from_docs_folder(&cfg, client).context("Failed to load course documents")?;

    let analytics = runtime.analytics();
    tracing::info!(total_courses = analytics.total_courses, "Course library ready");

    let session_id = runtime.create_session().await;

    // argv 提问：单发模式
    let question: Vec<String> = std::env::args().skip(1).collect();
    if !question.is_empty() {
        let (answer, sources) = runtime.ask(&question.join(" "), &session_id).await;
        print_answer(&answer, &sources);
        return Ok(());
    }

    // 交互模式
    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }
        let (answer, sources) = runtime.ask(input, &session_id).await;
        print_answer(&answer, &sources);
    }

    Ok(())
}

fn print_answer(answer: &str, sources: &[Source]) {
    println!("\n{}\n", answer);
    if !sources.is_empty() {
        println!("Sources:");
        for source in sources {
            match &source.url {
                Some(url) => println!("  - {} ({})", source.text, url),
                None => println!("  - {}", source.text),
            }
        }
        println!();
    }
}
