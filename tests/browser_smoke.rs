use std::sync::Arc;

use flyer_harvest::browser::launch_headless_browser;
use flyer_harvest::utils::logging;
use flyer_harvest::{
    BrowserPageSource, Config, ContentStyle, FsStorage, Harvester, JsExecutor, PageSource,
    ReqwestDownloader,
};

#[tokio::test]
#[ignore] // 需要本机 Chromium 和网络，手动运行：cargo test -- --ignored
async fn test_locate_first_flyer_page() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env().expect("加载配置失败");

    let (_browser, page) = launch_headless_browser(config.chrome_executable.as_deref())
        .await
        .expect("启动浏览器失败");

    let mut source = BrowserPageSource::new(
        JsExecutor::new(page),
        config.landing_url.clone(),
        config.selectors.clone(),
        ContentStyle::Labels,
        config.navigation,
    )
    .with_wait(config.timeout(), config.poll_interval());

    let anchor = source.anchor().await.expect("定位海报首页失败");
    println!("首页: {} 日期: {:?}", anchor.start, anchor.date_label);

    let identity = source.current_identity().await.expect("读取页面标识失败");
    assert!(!identity.as_str().is_empty(), "页面标识不应为空");
}

#[tokio::test]
#[ignore]
async fn test_harvest_first_pages_to_tempdir() {
    logging::init(true);

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env().expect("加载配置失败");
    config.max_pages = 3;
    config.content = ContentStyle::Images;
    config.base_path = dir.path().to_path_buf();

    let (_browser, page) = launch_headless_browser(config.chrome_executable.as_deref())
        .await
        .expect("启动浏览器失败");

    let mut source = BrowserPageSource::new(
        JsExecutor::new(page),
        config.landing_url.clone(),
        config.selectors.clone(),
        config.content,
        config.navigation,
    )
    .with_wait(config.timeout(), config.poll_interval());
    let harvester = Harvester::new(
        config.harvest_settings(),
        Arc::new(FsStorage::new()),
        Arc::new(ReqwestDownloader::new(config.timeout()).expect("创建下载器失败")),
    );

    let result = harvester.run(&mut source).await;

    assert!(result.is_success(), "采集应该成功: {:?}", result.error);
    assert!(result.pages_visited <= 3);
    println!("{} 页, {} 个文件", result.pages_visited, result.artifacts_written());
}
