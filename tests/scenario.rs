//! End-to-end: document events drive the monitor, which drives the page view.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use idle_monitor::{
    Activity, Config, Document, EventKind, IdleMonitor, InputSurface, Page, PageView,
};
use tokio::time::{Instant, sleep};

const ACTIVE_HTML: &str = "<div class=\"content active\"><h1 class=\"active\">Ehila!</h1></div>";
const PROMPT_HTML: &str =
    "<div class=\"content inactive\"><h1 class=\"inactive\">Are you still here?</h1></div>";

struct Harness {
    document: Arc<Document>,
    monitor: IdleMonitor,
    view: Arc<Mutex<PageView>>,
    renders: Arc<Mutex<Vec<(Activity, Instant)>>>,
}

impl Harness {
    fn start(config: &Config) -> Self {
        let mut view =
            PageView::new(Page::greeting(&config.view.active_message), &config.view).unwrap();
        view.render(Activity::Active);
        let view = Arc::new(Mutex::new(view));
        let renders = Arc::new(Mutex::new(Vec::new()));

        let document = Arc::new(Document::new());
        let surface: Arc<dyn InputSurface> = document.clone();

        let observer_view = Arc::clone(&view);
        let observer_renders = Arc::clone(&renders);
        let monitor = IdleMonitor::start(
            config.monitor_config().unwrap(),
            surface,
            move |activity: Activity| {
                observer_view.lock().unwrap().render(activity);
                observer_renders
                    .lock()
                    .unwrap()
                    .push((activity, Instant::now()));
            },
        );

        Self {
            document,
            monitor,
            view,
            renders,
        }
    }

    fn html(&self) -> String {
        self.view.lock().unwrap().page().to_html()
    }

    fn renders(&self) -> Vec<(Activity, Instant)> {
        self.renders.lock().unwrap().clone()
    }
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_click_idle_then_keypress() {
    let harness = Harness::start(&Config::default());
    let t0 = Instant::now();

    harness.document.dispatch(EventKind::Click);
    settle().await;
    assert!(harness.monitor.is_active());
    assert_eq!(harness.html(), ACTIVE_HTML);

    sleep(Duration::from_millis(3001)).await;
    assert!(!harness.monitor.is_active());
    assert_eq!(harness.html(), PROMPT_HTML);

    sleep(Duration::from_millis(499)).await;
    harness.document.dispatch(EventKind::KeyPress);
    settle().await;
    assert!(harness.monitor.is_active());
    assert_eq!(harness.html(), ACTIVE_HTML);

    sleep(Duration::from_millis(2999)).await;
    assert!(harness.monitor.is_active());
    sleep(Duration::from_millis(1)).await;
    settle().await;
    assert!(!harness.monitor.is_active());
    assert_eq!(harness.html(), PROMPT_HTML);

    assert_eq!(
        harness.renders(),
        vec![
            (Activity::Inactive, t0 + Duration::from_millis(3000)),
            (Activity::Active, t0 + Duration::from_millis(3500)),
            (Activity::Inactive, t0 + Duration::from_millis(6500)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_freezes_view() {
    let mut harness = Harness::start(&Config::default());

    harness.document.dispatch(EventKind::Scroll);
    sleep(Duration::from_secs(4)).await;
    assert_eq!(harness.html(), PROMPT_HTML);

    harness.monitor.stop();
    harness.monitor.stop();

    for kind in EventKind::ALL {
        assert_eq!(harness.document.dispatch(kind), 0);
    }
    sleep(Duration::from_secs(10)).await;

    assert_eq!(harness.html(), PROMPT_HTML);
    assert_eq!(harness.renders().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_view_and_targets() {
    let config: Config = toml::from_str(
        r#"
            timeout_ms = 200
            events = ["touchmove"]

            [view]
            active_message = "here"
            prompt_message = "gone"
            class_targets = [".content"]
            active_class = "lit"
            inactive_class = "dim"
        "#,
    )
    .unwrap();
    let harness = Harness::start(&config);

    harness.document.dispatch(EventKind::TouchMove);
    sleep(Duration::from_millis(150)).await;

    // Not a monitored kind, so the window is not extended
    assert_eq!(harness.document.dispatch(EventKind::Click), 0);
    sleep(Duration::from_millis(100)).await;

    assert!(!harness.monitor.is_active());
    assert_eq!(harness.html(), "<div class=\"content dim\"><h1>gone</h1></div>");
}
