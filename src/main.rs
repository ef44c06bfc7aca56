use anyhow::Result;
use job_batch_scan::orchestrator::App;
use job_batch_scan::utils::logging;
use job_batch_scan::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（指定了 CONFIG_FILE 时走配置文件，否则走环境变量）
    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env(),
    };

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
