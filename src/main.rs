#[tokio::main]
async fn main() {
    let code = match spellcast_lib::run().await {
        Ok(()) => 0,
        Err(e) => {
            log::error!("启动失败: {e}");
            1
        }
    };
    // 标准输入的阻塞读取不会随运行时退出，直接结束进程
    std::process::exit(code);
}
