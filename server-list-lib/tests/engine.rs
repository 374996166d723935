//! Engine behaviour with in-process fetchers.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use common::FnFetcher;
use common::ScriptedFetcher;
use common::User;
use common::page;
use common::param;
use common::user;
use common::user_key;
use server_list_lib::Column;
use server_list_lib::FetchOutcome;
use server_list_lib::FilterConfig;
use server_list_lib::FilterEdit;
use server_list_lib::FilterValue;
use server_list_lib::LayoutMode;
use server_list_lib::ListOptions;
use server_list_lib::PaginationMode;
use server_list_lib::QueryState;
use server_list_lib::RowKey;
use server_list_lib::SelectionProps;
use server_list_lib::ServerList;
use server_list_lib::ServerListHandle;
use server_list_lib::SortDir;
use server_list_lib::Viewport;
use server_list_lib::error::ApiError;
use server_list_lib::error::ConfigError;
use server_list_lib::error::FilterError;
use server_list_lib::render::Body;
use server_list_lib::render::Footer;

fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("name", "Nombre")
            .sortable()
            .filter(FilterConfig::text()),
        Column::new("active", "Activo").filter(FilterConfig::Boolean),
    ]
}

fn infinite() -> ListOptions {
    ListOptions {
        pagination: PaginationMode::Infinite,
        ..ListOptions::default()
    }
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_infinite_scroll_merges_by_key() {
    let list = ServerList::builder(
        FnFetcher(|params: &[(String, String)]| match param(params, "page") {
            Some("1") => Ok(page(&[1, 2], 1, 2, 3)),
            _ => Ok(page(&[2, 3], 2, 2, 3)),
        }),
        "/users",
        user_key,
    )
    .options(infinite())
    .build()
    .unwrap();

    list.settle().await;
    assert!(list.has_more());

    assert!(list.end_reached());
    assert!(list.merge_pending());
    assert_eq!(list.settle().await, Some(FetchOutcome::Appended { added: 1 }));

    let ids: Vec<i64> = list.rows().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(!list.merge_pending());
    assert!(!list.has_more());
    assert!(!list.end_reached());

    let keys = HashSet::new();
    let view = list.view(Viewport::new(400.0, 600.0), &SelectionProps::read_only(&keys));
    assert_eq!(view.footer, Footer::None);
}

#[tokio::test]
async fn test_append_failure_keeps_loaded_rows() {
    let list = ServerList::builder(
        FnFetcher(|params: &[(String, String)]| match param(params, "page") {
            Some("1") => Ok(page(&[1, 2], 1, 3, 6)),
            _ => Err(ApiError::http(500, r#"{"message":"boom"}"#)),
        }),
        "/users",
        user_key,
    )
    .options(infinite())
    .build()
    .unwrap();

    list.settle().await;
    list.end_reached();
    list.settle().await;

    assert_eq!(list.len(), 2);
    assert_eq!(list.error(), "boom");
    assert_eq!(list.meta().last_page, 3);
    assert_eq!(list.query().page, 1);
    assert!(!list.merge_pending());
    // Going back to the loaded page must not refetch it as a replacement.
    assert_eq!(list.settle().await, None);

    let keys = HashSet::new();
    let view = list.view(Viewport::new(400.0, 600.0), &SelectionProps::read_only(&keys));
    assert_eq!(view.error.as_deref(), Some("boom"));
    assert!(matches!(view.body, Body::Cards(ref cards) if cards.len() == 2));
    assert_eq!(view.footer, Footer::LoadingMore("Cargando más…"));
}

#[tokio::test]
async fn test_failed_append_is_retried_on_next_scroll() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher.expect().send(Ok(page(&[1, 2], 1, 3, 6))).unwrap();
    fetcher
        .expect()
        .send(Err(ApiError::http(503, "")))
        .unwrap();
    fetcher.expect().send(Ok(page(&[3, 4], 2, 3, 6))).unwrap();
    fetcher.expect().send(Ok(page(&[5, 6], 3, 3, 6))).unwrap();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .options(infinite())
        .build()
        .unwrap();

    list.settle().await;
    assert!(list.end_reached());
    assert!(matches!(list.settle().await, Some(FetchOutcome::Failed { .. })));

    assert!(list.end_reached());
    assert_eq!(list.settle().await, Some(FetchOutcome::Appended { added: 2 }));
    assert!(list.error().is_empty());
    assert!(list.end_reached());
    assert_eq!(list.settle().await, Some(FetchOutcome::Appended { added: 2 }));

    let ids: Vec<i64> = list.rows().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert!(!list.has_more());

    let pages: Vec<_> = fetcher
        .calls()
        .iter()
        .map(|c| param(c, "page").unwrap_or_default().to_string())
        .collect();
    assert_eq!(pages, vec!["1", "2", "2", "3"]);
}

#[tokio::test]
async fn test_end_reached_ignored_in_pager_mode() {
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1, 2], 1, 5, 50))),
        "/users",
        user_key,
    )
    .build()
    .unwrap();

    list.settle().await;
    assert!(!list.end_reached());
    assert!(!list.prev_page());
    assert!(list.next_page());
    assert_eq!(list.query().page, 2);
    assert!(!list.merge_pending());
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_query_change_notified_once_per_distinct_state() {
    let seen: Arc<Mutex<Vec<QueryState>>> = Arc::default();
    let sink = seen.clone();
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1], 1, 1, 1))),
        "/users",
        user_key,
    )
    .on_query_change(move |q| sink.lock().unwrap().push(q.clone()))
    .build()
    .unwrap();

    list.settle().await;
    list.set_search("a");
    list.settle().await;
    list.set_search("a");
    list.settle().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].search, "");
    assert_eq!(seen[1].search, "a");
    assert_eq!(seen[1].page, 1);
}

#[tokio::test]
async fn test_non_finite_number_filter_settles_once() {
    let count: Arc<Mutex<usize>> = Arc::default();
    let sink = count.clone();
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1], 1, 1, 1))),
        "/users",
        user_key,
    )
    .columns(vec![Column::new("age", "Edad").filter(FilterConfig::number())])
    .on_query_change(move |_| *sink.lock().unwrap() += 1)
    .build()
    .unwrap();

    list.settle().await;
    assert!(matches!(
        list.edit_filter("age", FilterEdit::Input("NaN".to_string())),
        Err(FilterError::InvalidNumber(_))
    ));
    list.set_filter("age", Some(FilterValue::Number(f64::INFINITY)));
    assert!(list.settle().await.is_some());
    assert_eq!(list.settle().await, None);
    assert_eq!(list.settle().await, None);
    assert_eq!(*count.lock().unwrap(), 2);
    assert_eq!(list.query(), list.query());
}

#[tokio::test]
async fn test_query_change_callback_may_read_the_list() {
    let slot: Arc<std::sync::OnceLock<ServerList<User>>> = Arc::default();
    let seen: Arc<Mutex<Vec<u32>>> = Arc::default();
    let (reader, sink) = (slot.clone(), seen.clone());
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1], 1, 1, 1))),
        "/users",
        user_key,
    )
    .on_query_change(move |_| {
        if let Some(list) = reader.get() {
            sink.lock().unwrap().push(list.query().page);
        }
    })
    .build()
    .unwrap();
    slot.set(list.clone()).unwrap();

    list.settle().await;
    assert_eq!(*seen.lock().unwrap(), vec![1]);
}

// =============================================================================
// Overlapping fetches
// =============================================================================

#[tokio::test]
async fn test_late_response_of_superseded_query_is_discarded() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let reply_a = fetcher.expect();
    let reply_b = fetcher.expect();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .build()
        .unwrap();

    let (outcome_a, outcome_b, ()) = futures::join!(
        list.settle(),
        async {
            list.set_search("b");
            list.settle().await
        },
        async {
            reply_a.send(Ok(page(&[1], 1, 1, 1))).unwrap();
            tokio::task::yield_now().await;
            // A landed first but B is still in flight.
            assert!(list.is_loading());
            assert!(list.is_empty());
            reply_b.send(Ok(page(&[7, 8], 1, 1, 2))).unwrap();
        }
    );

    assert_eq!(outcome_a, Some(FetchOutcome::Stale));
    assert_eq!(outcome_b, Some(FetchOutcome::Replaced { rows: 2 }));
    assert_eq!(list.row_keys(), vec![RowKey::Int(7), RowKey::Int(8)]);
    assert!(!list.is_loading());

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[1], "search"), Some("b"));
}

#[tokio::test]
async fn test_reload_replaces_current_page() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher.expect().send(Ok(page(&[1, 2], 1, 1, 2))).unwrap();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .build()
        .unwrap();
    list.settle().await;

    fetcher.expect().send(Ok(page(&[3], 1, 1, 1))).unwrap();
    let handle: Arc<dyn ServerListHandle> = Arc::new(list.clone());
    assert_eq!(handle.reload().await, FetchOutcome::Replaced { rows: 1 });
    assert_eq!(handle.get_query(), list.query());
    assert_eq!(list.row_keys(), vec![RowKey::Int(3)]);

    // Reload does not count as a query change.
    assert_eq!(list.settle().await, None);
}

#[tokio::test]
async fn test_refresh_flag() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher.expect().send(Ok(page(&[1], 1, 1, 1))).unwrap();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .build()
        .unwrap();
    list.settle().await;

    let reply = fetcher.expect();
    let (outcome, ()) = futures::join!(list.refresh(), async {
        assert!(list.is_refreshing());
        reply.send(Ok(page(&[1, 2], 1, 1, 2))).unwrap();
    });
    assert_eq!(outcome, FetchOutcome::Replaced { rows: 2 });
    assert!(!list.is_refreshing());
}

#[tokio::test]
async fn test_overlapping_refreshes_keep_flag_until_latest() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher.expect().send(Ok(page(&[1], 1, 1, 1))).unwrap();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .build()
        .unwrap();
    list.settle().await;

    let first = fetcher.expect();
    let second = fetcher.expect();
    let (outcome_a, outcome_b, ()) = futures::join!(list.refresh(), list.refresh(), async {
        first.send(Ok(page(&[1], 1, 1, 1))).unwrap();
        tokio::task::yield_now().await;
        assert!(list.is_refreshing());
        assert!(list.is_loading());
        second.send(Ok(page(&[1, 2], 1, 1, 2))).unwrap();
    });

    assert_eq!(outcome_a, FetchOutcome::Stale);
    assert_eq!(outcome_b, FetchOutcome::Replaced { rows: 2 });
    assert!(!list.is_refreshing());
}

// =============================================================================
// Query controls
// =============================================================================

#[tokio::test]
async fn test_sort_and_filters_reach_request() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .columns(columns())
        .build()
        .unwrap();

    assert!(list.request_sort("name"));
    assert!(list.request_sort("name"));
    assert!(!list.request_sort("active"));
    assert!(!list.request_sort("missing"));
    list.edit_filter("active", FilterEdit::Input("true".to_string()))
        .unwrap();
    list.edit_filter("name", FilterEdit::Input("ana".to_string()))
        .unwrap();

    fetcher.expect().send(Ok(page(&[], 1, 1, 0))).unwrap();
    list.settle().await;

    let calls = fetcher.calls();
    assert_eq!(param(&calls[0], "sortBy"), Some("name"));
    assert_eq!(param(&calls[0], "sortDir"), Some("desc"));
    assert_eq!(param(&calls[0], "filters[active]"), Some("true"));
    assert_eq!(param(&calls[0], "filters[name]"), Some("ana"));

    assert_eq!(
        list.edit_filter("id", FilterEdit::Input("1".to_string())),
        Err(FilterError::UnknownFilter("id".to_string()))
    );

    list.clear_all();
    let query = list.query();
    assert_eq!(query.sort_by, "");
    assert_eq!(query.sort_dir, SortDir::Asc);
    assert!(query.filters.is_empty());
}

#[tokio::test]
async fn test_restore_query_from_deep_link() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .columns(columns())
        .build()
        .unwrap();

    let link = vec![
        ("page".to_string(), "3".to_string()),
        ("sortBy".to_string(), "name".to_string()),
        ("sortDir".to_string(), "desc".to_string()),
        ("filters[active]".to_string(), "false".to_string()),
    ];
    let restored = QueryState::from_params(
        &link,
        list.columns(),
        &list.options().query_defaults(),
    );
    list.restore_query(restored.clone());
    assert_eq!(list.query(), restored);
    assert_eq!(list.query().filter("active"), Some(&FilterValue::Bool(false)));

    fetcher.expect().send(Ok(page(&[], 1, 1, 0))).unwrap();
    list.settle().await;
    assert_eq!(fetcher.calls()[0], restored.to_params(&list.extra_params()));
}

#[test]
fn test_duplicate_columns_rejected() {
    let err = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[], 1, 1, 0))),
        "/users",
        user_key,
    )
    .columns(vec![Column::new("id", "ID"), Column::new("id", "Otra")])
    .build()
    .unwrap_err();
    assert_eq!(err.to_string(), ConfigError::DuplicateColumn("id".into()).to_string());
}

// =============================================================================
// Selection and view
// =============================================================================

#[tokio::test]
async fn test_selection_is_page_scoped() {
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1, 2, 3], 1, 2, 6))),
        "/users",
        user_key,
    )
    .options(ListOptions {
        selectable: true,
        layout: LayoutMode::Cards,
        ..ListOptions::default()
    })
    .bulk_actions(|ctx| vec![format!("Eliminar ({})", ctx.selected_count)])
    .build()
    .unwrap();
    list.settle().await;

    let mut selected: HashSet<RowKey> = [RowKey::Int(99)].into_iter().collect();
    let keys = selected.clone();
    let mut next = None;
    let mut setter = |s: HashSet<RowKey>| next = Some(s);
    assert!(list.toggle_all(&mut SelectionProps::new(&keys, &mut setter)));
    selected = next.take().unwrap();
    assert_eq!(selected.len(), 3);
    assert!(list.all_selected(&selected));

    let view = list.view(Viewport::new(400.0, 600.0), &SelectionProps::read_only(&selected));
    let bar = view.select_all.unwrap();
    assert_eq!(bar.label, "Seleccionar página");
    assert!(bar.checked);
    assert_eq!(view.toolbar.bulk_actions, vec!["Eliminar (3)".to_string()]);

    let keys = selected.clone();
    let mut setter = |s: HashSet<RowKey>| next = Some(s);
    assert!(list.toggle_all(&mut SelectionProps::new(&keys, &mut setter)));
    assert!(next.unwrap().is_empty());
}

#[tokio::test]
async fn test_selection_ignored_when_not_selectable() {
    let list = ServerList::builder(
        FnFetcher(|_: &[(String, String)]| Ok(page(&[1], 1, 1, 1))),
        "/users",
        user_key,
    )
    .build()
    .unwrap();
    list.settle().await;

    let keys = HashSet::new();
    let mut called = false;
    let mut setter = |_: HashSet<RowKey>| called = true;
    assert!(!list.toggle_one(&RowKey::Int(1), &mut SelectionProps::new(&keys, &mut setter)));
    assert!(!called);
    assert!(!list.all_selected(&[RowKey::Int(1)].into_iter().collect()));
}

#[tokio::test]
async fn test_table_view() {
    let ids: Vec<i64> = (1..=40).collect();
    let list = ServerList::builder(
        FnFetcher(move |_: &[(String, String)]| Ok(page(&ids, 1, 1, 40))),
        "/users",
        user_key,
    )
    .columns(columns())
    .options(ListOptions {
        selectable: true,
        ..ListOptions::default()
    })
    .row_actions(|u: &User| vec![format!("Editar {}", u.id)])
    .build()
    .unwrap();
    list.request_sort("id");
    list.settle().await;

    let keys: HashSet<RowKey> = [RowKey::Int(2)].into_iter().collect();
    let viewport = Viewport::new(1000.0, 440.0).row_height(44.0).scrolled(44.0);
    let view = list.view(viewport, &SelectionProps::read_only(&keys));
    let Body::Table(table) = view.body else {
        panic!("expected table body");
    };

    assert!(table.sticky_header);
    assert_eq!(table.header[0].sort, Some(SortDir::Asc));
    assert_eq!(table.header[1].sort, None);
    assert_eq!(table.header_checked, Some(false));
    assert_eq!(table.widths.total, 140.0 * 3.0 + 52.0 + 120.0);
    assert_eq!(table.total_rows, 40);
    assert_eq!(table.rows.len(), 11);

    let first = &table.rows[0];
    assert_eq!(first.index, 1);
    assert_eq!(first.key, RowKey::Int(2));
    assert_eq!(first.selected, Some(true));
    assert!(first.striped);
    assert_eq!(first.cells[1].text, user(2).name);
    assert_eq!(first.cells[2].text, "");
    assert_eq!(first.actions, vec!["Editar 2".to_string()]);
    assert!(!table.rows[1].striped);
    assert!(!table.near_end);
}

#[tokio::test]
async fn test_loading_body_before_first_page() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let reply = fetcher.expect();
    let list = ServerList::builder(fetcher.clone(), "/users", user_key)
        .columns(columns())
        .build()
        .unwrap();

    let (_, ()) = futures::join!(list.settle(), async {
        let keys = HashSet::new();
        let view = list.view(Viewport::new(400.0, 600.0), &SelectionProps::read_only(&keys));
        assert_eq!(view.body, Body::Loading("Cargando…"));
        assert_eq!(view.toolbar.filter_toggle, Some("Filtros"));
        assert!(view.filters.is_empty());
        reply.send(Ok(page(&[], 1, 1, 0))).unwrap();
    });

    assert!(list.toggle_filters());
    let keys = HashSet::new();
    let view = list.view(Viewport::new(400.0, 600.0), &SelectionProps::read_only(&keys));
    assert_eq!(view.toolbar.filter_toggle, Some("Ocultar filtros"));
    assert_eq!(view.filters.len(), 2);
    assert_eq!(view.sort_chips.len(), 2);
}
