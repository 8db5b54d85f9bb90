pub mod action;
pub mod arbiter;
pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod input_sim;
pub mod matcher;
pub mod processor;
pub mod session;
pub mod similarity;

use arbiter::ActionSink;
use config::load_config;
use cooldown::Clock;
use error::ConfigError;
use input_sim::{DryRunSink, EnigoKeyboard};
use processor::TranscriptProcessor;
use session::{decode_line, Flow, SpellSession};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// 从标准输入读取转写事件并施法，直到会话结束、输入关闭或 Ctrl+C
pub async fn run() -> Result<(), ConfigError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let catalog = Arc::new(config.catalog()?);

    let names: BTreeSet<&str> = catalog.phrases().collect();
    log::info!(
        "已加载 {} 条咒语: {}",
        catalog.len(),
        names.into_iter().collect::<Vec<_>>().join(", ")
    );

    let sink: Box<dyn ActionSink> = if config.input.dry_run {
        log::info!("dry-run 模式，不会模拟按键");
        Box::new(DryRunSink)
    } else {
        Box::new(EnigoKeyboard::new())
    };

    let processor = TranscriptProcessor::new(catalog, sink, config.matching.clone());
    let mut session = SpellSession::new(processor, &config.session);

    // 读取放在单独任务里，施法只在当前任务中进行
    let (tx, mut rx) = mpsc::channel::<String>(64);
    tokio::spawn(forward_stdin(tx));

    log::info!("等待转写事件...");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("监听 Ctrl+C 失败: {e}");
        }
    };
    pump(&mut session, &mut rx, shutdown).await;

    let stats = session.stats();
    log::info!("共识别 {} 次", stats.recognized);
    Ok(())
}

/// 逐行处理转写事件，直到会话结束、输入关闭或 `shutdown` 完成
async fn pump<S: ActionSink, C: Clock>(
    session: &mut SpellSession<S, C>,
    rx: &mut mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else {
                    log::info!("输入已关闭");
                    break;
                };
                match decode_line(&line) {
                    Ok(Some(event)) => {
                        if session.handle(event) == Flow::Stop {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("{e}"),
                }
            }
            _ = &mut shutdown => {
                log::info!("停止施法");
                break;
            }
        }
    }
}

async fn forward_stdin(tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("读取标准输入失败: {e}");
                break;
            }
        }
    }
}
