//! End-to-end routing tests over file-backed SQLite pools.
//!
//! Each pool gets its own database file with a distinct marker row, so a
//! routed acquisition can prove which physical database it landed on.

use datasource_router::db::DbConnection;
use datasource_router::{
    DataSourceInterceptor, DataSourceRegistrar, DEFAULT_POOL_NAME, RoutingConfig,
    RoutingDataSource, RoutingDirective,
};
use std::collections::HashMap;
use tempfile::TempDir;

struct Fixture {
    datasource: RoutingDataSource,
    interceptor: DataSourceInterceptor,
    // Held for the lifetime of the pools; dropping it deletes the db files.
    _dir: TempDir,
}

fn properties(dir: &TempDir, names: &[&str]) -> HashMap<String, String> {
    let mut props = HashMap::new();
    let file = dir.path().join("default.db");
    props.insert("datasource.driver".into(), "sqlite".into());
    props.insert(
        "datasource.url".into(),
        format!("sqlite://{}", file.display()),
    );
    props.insert("datasource.username".into(), "app".into());
    props.insert("datasource.password".into(), "secret".into());
    props.insert("datasource.type".into(), "sqlx".into());

    if !names.is_empty() {
        props.insert("datasource.names".into(), names.join(","));
        for name in names {
            let file = dir.path().join(format!("{name}.db"));
            props.insert(format!("datasource.{name}.driver"), "sqlite".into());
            props.insert(
                format!("datasource.{name}.url"),
                format!("sqlite://{}", file.display()),
            );
            props.insert(format!("datasource.{name}.username"), "app".into());
            props.insert(format!("datasource.{name}.password"), "secret".into());
            props.insert(format!("datasource.{name}.type"), "sqlx".into());
        }
    }
    props
}

/// Bootstrap pools for the default datasource plus `names`, writing a marker
/// row into each so tests can tell the databases apart.
async fn fixture(names: &[&str]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let config = RoutingConfig::from_properties(&properties(&dir, names)).unwrap();
    let datasource = DataSourceRegistrar::new().bootstrap(&config).await.unwrap();

    let mut all = vec![DEFAULT_POOL_NAME];
    all.extend_from_slice(names);
    for name in all {
        let pool = datasource.registry().get(name).await.unwrap();
        let datasource_router::DbPool::Sqlite(pool) = pool else {
            panic!("expected sqlite pool");
        };
        sqlx::query("CREATE TABLE marker (name TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO marker (name) VALUES (?)")
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
    }

    let interceptor = DataSourceInterceptor::new(datasource.registry().clone());
    Fixture {
        datasource,
        interceptor,
        _dir: dir,
    }
}

/// Which database did this connection come from?
async fn marker(conn: &mut DbConnection) -> String {
    match conn {
        DbConnection::Sqlite(conn) => {
            let row: (String,) = sqlx::query_as("SELECT name FROM marker")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            row.0
        }
        _ => panic!("expected sqlite connection"),
    }
}

#[tokio::test]
async fn routed_acquisition_lands_on_the_directive_target() {
    let fx = fixture(&["report_db"]).await;
    let directive = RoutingDirective::new("report_db");

    let name = fx
        .interceptor
        .invoke(&directive, async {
            let mut conn = fx.datasource.acquire().await.unwrap();
            marker(&mut conn).await
        })
        .await;
    assert_eq!(name, "report_db");

    // After the routed call the key is gone; acquisition reverts to default.
    let mut conn = fx.datasource.acquire().await.unwrap();
    assert_eq!(marker(&mut conn).await, DEFAULT_POOL_NAME);
}

#[tokio::test]
async fn unrouted_acquisition_uses_the_default_pool() {
    let fx = fixture(&["report_db"]).await;
    let mut conn = fx.datasource.acquire().await.unwrap();
    assert_eq!(marker(&mut conn).await, DEFAULT_POOL_NAME);
}

#[tokio::test]
async fn missing_directive_target_degrades_to_default_routing() {
    let fx = fixture(&["report_db"]).await;
    let directive = RoutingDirective::new("missing_db");

    // The operation still runs, against the default pool.
    let name = fx
        .interceptor
        .invoke(&directive, async {
            let mut conn = fx.datasource.acquire().await.unwrap();
            marker(&mut conn).await
        })
        .await;
    assert_eq!(name, DEFAULT_POOL_NAME);
}

#[tokio::test]
async fn failing_operation_reverts_routing_for_the_next_call() {
    let fx = fixture(&["report_db"]).await;
    let directive = RoutingDirective::new("report_db");

    let result: Result<(), sqlx::Error> = fx
        .interceptor
        .invoke(&directive, async {
            Err(sqlx::Error::RowNotFound)
        })
        .await;
    assert!(result.is_err());

    let mut conn = fx.datasource.acquire().await.unwrap();
    assert_eq!(marker(&mut conn).await, DEFAULT_POOL_NAME);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_units_of_work_route_independently() {
    let fx = fixture(&["slave1", "slave2"]).await;

    let mut handles = Vec::new();
    for target in ["slave1", "slave2", "slave1", "slave2"] {
        let interceptor = fx.interceptor.clone();
        let datasource = fx.datasource.clone();
        handles.push(tokio::spawn(async move {
            let directive = RoutingDirective::new(target);
            interceptor
                .invoke(&directive, async {
                    let mut conn = datasource.acquire().await.unwrap();
                    tokio::task::yield_now().await;
                    assert_eq!(marker(&mut conn).await, target);
                })
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn nested_directives_route_inner_then_restore_outer() {
    let fx = fixture(&["slave1", "slave2"]).await;
    let outer = RoutingDirective::new("slave1");
    let inner = RoutingDirective::new("slave2");

    fx.interceptor
        .invoke(&outer, async {
            let mut conn = fx.datasource.acquire().await.unwrap();
            assert_eq!(marker(&mut conn).await, "slave1");
            drop(conn);

            fx.interceptor
                .invoke(&inner, async {
                    let mut conn = fx.datasource.acquire().await.unwrap();
                    assert_eq!(marker(&mut conn).await, "slave2");
                })
                .await;

            // Resolution is fresh per acquisition: outer key applies again.
            let mut conn = fx.datasource.acquire().await.unwrap();
            assert_eq!(marker(&mut conn).await, "slave1");
        })
        .await;
}
