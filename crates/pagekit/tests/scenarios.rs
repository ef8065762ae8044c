//! End-to-end workbench scenarios against the mock driver.

use std::sync::{Arc, Mutex};

use pagekit::mock::{MockDom, MockDriver, MockNode, NodeId};
use pagekit::prelude::*;
use pagekit::FrameSwitcher;

const WINDOW: usize = 4;

fn render_rows(dom: &mut MockDom, rows: NodeId, labels: &[String], offset: usize) {
    dom.clear_children(rows);
    let end = (offset + WINDOW).min(labels.len());
    for (index, label) in labels.iter().enumerate().take(end).skip(offset) {
        let mut node =
            MockNode::matching(".monaco-list-row").with_attr("data-index", &index.to_string());
        if index == 0 {
            node = node.also(".monaco-list-row[data-index=\"0\"]");
        }
        if index + 1 == labels.len() {
            node = node.with_attr("data-last-element", "true");
        }
        let row = dom.add(rows, node);
        let _ = dom.add(row, MockNode::matching(".label-name").with_text(label));
    }
}

/// Suggest widget opened mid-scroll with nothing rendered. The first row
/// shows up after `blank_presses` Page Up presses.
fn content_assist(
    labels: &[String],
    blank_presses: usize,
) -> (Arc<Session<MockDriver>>, ContentAssist<MockDriver>) {
    let labels = labels.to_vec();
    let driver = MockDriver::new();
    let (list, rows) = driver.with_dom(|dom| {
        let editor = dom.add(dom.root(), MockNode::matching(".editor-instance"));
        let widget = dom.add(editor, MockNode::matching(".suggest-widget"));
        let list = dom.add(widget, MockNode::matching(".monaco-list"));
        let rows = dom.add(list, MockNode::matching(".monaco-list-rows"));
        (list, rows)
    });
    let state = Arc::new(Mutex::new((0usize, 0usize)));
    driver.on_keys(move |dom, target, keys| {
        if target != Some(list) {
            return;
        }
        let mut state = state.lock().unwrap();
        let (ups, offset) = &mut *state;
        match keys {
            [Key::PageUp] => {
                *ups += 1;
                if *ups < blank_presses {
                    return;
                }
                *offset = 0;
            }
            [Key::PageDown] => *offset = (*offset + WINDOW).min(labels.len() - 1),
            _ => return,
        }
        render_rows(dom, rows, &labels, *offset);
    });
    let session = Session::new(driver).unwrap();
    let editor = ElementRef::new(Locator::new(".editor-instance"));
    let assist = ContentAssist::new(Arc::clone(&session), &editor).unwrap();
    (session, assist)
}

fn key_presses(session: &Session<MockDriver>, key: &str) -> usize {
    session
        .driver()
        .history()
        .iter()
        .filter(|call| call.starts_with("send_keys_to") && call.ends_with(key))
        .count()
}

fn context_menu(driver: &MockDriver, items: &[(&str, bool)]) -> NodeId {
    driver.with_dom(|dom| {
        let menu = dom.add(dom.root(), MockNode::matching(".monaco-menu-container"));
        for (label, disabled) in items {
            let class = if *disabled {
                "action-item disabled"
            } else {
                "action-item"
            };
            let item = dom.add(menu, MockNode::matching(".action-item").with_attr("class", class));
            let _ = dom.add(
                item,
                MockNode::matching(".action-label").with_attr("aria-label", label),
            );
        }
        menu
    })
}

mod content_assist_scenarios {
    use super::*;

    fn labels() -> Vec<String> {
        let mut labels: Vec<String> = (0..12).map(|i| format!("item{i}")).collect();
        labels[9] = "foo".to_string();
        labels
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_list_rewinds_then_pages_to_target() {
        let (session, assist) = content_assist(&labels(), 3);

        let item = assist.item("foo").await.unwrap().unwrap();
        assert_eq!(item.cached_label(), Some("foo"));
        assert_eq!(key_presses(&session, "PageUp"), 3);
        assert_eq!(key_presses(&session, "PageDown"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_seek_returns_same_item() {
        let (_, assist) = content_assist(&labels(), 3);

        let first = assist.item("foo").await.unwrap().unwrap();
        let second = assist.item("foo").await.unwrap().unwrap();
        assert_eq!(first.cached_label(), second.cached_label());
        assert_eq!(first.elem(), second.elem());
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_suggestion_is_none() {
        let (_, assist) = content_assist(&labels(), 1);
        assert!(assist.item("bar").await.unwrap().is_none());
    }
}

mod context_menu_scenarios {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_disabled_items_skipped_in_dom_order() {
        let driver = MockDriver::new();
        let _ = context_menu(
            &driver,
            &[
                ("Cut", false),
                ("Copy", true),
                ("Paste", false),
                ("Rename", true),
                ("Delete", false),
            ],
        );
        let menu = ContextMenu::new(Session::new(driver).unwrap())
            .unwrap()
            .wait()
            .await
            .unwrap();

        let items = menu.items().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(menu.labels().await.unwrap(), ["Cut", "Paste", "Delete"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_select_returns_loaded_submenu() {
        let driver = MockDriver::new();
        let container = context_menu(&driver, &[("Refactor", false)]);
        let parent = driver.with_dom(|dom| {
            let item = dom.children(container)[0];
            let _ = dom.add(item, MockNode::matching(".submenu-indicator"));
            item
        });
        driver.on_click(move |dom, clicked| {
            if clicked != parent {
                return;
            }
            for label in ["Extract", "Inline"] {
                let item = dom.add(
                    parent,
                    MockNode::matching(".action-item").with_attr("class", "action-item"),
                );
                let _ = dom.add(
                    item,
                    MockNode::matching(".action-label").with_attr("aria-label", label),
                );
            }
        });
        let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();

        let item = menu.item("Refactor").await.unwrap().unwrap();
        let submenu = item.select().await.unwrap().unwrap();
        let first = submenu.items().await.unwrap().len();
        let second = submenu.items().await.unwrap().len();
        assert_eq!((first, second), (2, 2));
        assert_eq!(submenu.labels().await.unwrap(), ["Extract", "Inline"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_item_is_none() {
        let driver = MockDriver::new();
        let _ = context_menu(&driver, &[("Cut", false), ("Copy", true)]);
        let menu = ContextMenu::new(Session::new(driver).unwrap()).unwrap();
        assert!(menu.item("Copy").await.unwrap().is_none());
        assert!(menu.item("Format Document").await.unwrap().is_none());
    }
}

mod frame_scenarios {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_keeps_anchor() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| {
            let editor = dom.add(dom.root(), MockNode::matching(".editor-instance"));
            let _ = dom.add(
                editor,
                MockNode::matching("div[aria-flowto]").with_attr("aria-flowto", "webview-7"),
            );
            let container = dom.add(dom.root(), MockNode::matching("#webview-7"));
            let (_, outer) =
                dom.add_frame(container, MockNode::matching("iframe[class='webview ready']"));
            let (_, inner) = dom.add_frame(outer, MockNode::matching("#active-frame"));
            let _ = dom.add(inner, MockNode::matching("p").with_text("Rendered"));
        });
        let session = Session::new(driver).unwrap();
        let editor = ElementRef::new(Locator::new(".editor-instance"));
        let mut switcher = FrameSwitcher::new(Arc::clone(&session), editor.clone());

        for _ in 0..2 {
            switcher.switch_to_frame().await.unwrap();
            let text = ElementRef::new(Locator::new("p"))
                .text(session.driver())
                .await
                .unwrap();
            assert_eq!(text, "Rendered");
            switcher.switch_back().await.unwrap();
            assert_eq!(session.anchor().map(|h| h.as_str()), Some("window-0"));
            assert!(editor.exists(session.driver()).await.unwrap());
        }
        assert_eq!(
            session
                .driver()
                .history()
                .iter()
                .filter(|c| c.as_str() == "window_handle")
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_webview_search_follows_focus() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| {
            let editor = dom.add(dom.root(), MockNode::matching(".editor-instance"));
            let _ = dom.add(
                editor,
                MockNode::matching("div[aria-flowto]").with_attr("aria-flowto", "wv"),
            );
            let container = dom.add(dom.root(), MockNode::matching("#wv"));
            let (_, outer) =
                dom.add_frame(container, MockNode::matching("iframe[class='webview ready']"));
            let (_, inner) = dom.add_frame(outer, MockNode::matching("#active-frame"));
            let _ = dom.add(inner, MockNode::matching("input"));
        });
        let session = Session::new(driver).unwrap();
        let mut view = WebView::new(
            Arc::clone(&session),
            ElementRef::new(Locator::new(".editor-instance")),
        );

        let input = view.find_web_element(Locator::new("input"));
        assert!(!input.exists(session.driver()).await.unwrap());
        view.switch_to_frame().await.unwrap();
        let input = view.find_web_element(Locator::new("input"));
        assert!(input.exists(session.driver()).await.unwrap());
        view.switch_back().await.unwrap();
        assert_eq!(view.frame_state(), FrameState::Outside);
    }
}

mod config_scenarios {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_session_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagekit.yaml");
        std::fs::write(
            &path,
            "locator_version: \"1.61.0\"\nwait_timeout_ms: 250\nmenu_stabilize_ms: 200\n",
        )
        .unwrap();
        let config = SessionConfig::from_path(&path).unwrap();
        assert_eq!(config.wait_timeout_ms, 250);

        let session = Session::with_config(MockDriver::new(), config).unwrap();
        let err = ContextMenu::new(session).unwrap().wait().await.unwrap_err();
        assert!(err.is_timeout());
    }
}
