use anyhow::Result;
use flyer_harvest::utils::logging;
use flyer_harvest::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let result = App::initialize(config).await?.run().await?;

    if let Some(e) = result.error {
        anyhow::bail!("采集失败: {}", e);
    }
    Ok(())
}
