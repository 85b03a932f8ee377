//! Whole-cluster integration tests: an in-process rendezvous server plus a
//! handful of `stratad::Node`s talking real TCP on loopback, ephemeral
//! ports. No subprocesses, no network namespaces — every node here is just
//! a different `ByteStore` sharing the same test binary's address space.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use strata_core::config::StrataConfig;
use strata_core::key::Key;
use strata_frame::value::Value;
use strata_frame::{dataframe, description::DataFrameDescription, ingest, schema::Schema};
use strata_net::ClusterDirectory;
use strata_rendezvousd::RendezvousServer;
use stratad::Node;

/// A running in-process cluster: the rendezvous server plus every node that
/// joined it, in join order (a node's index here is its node id).
struct Cluster {
    rendezvous_shutdown: broadcast::Sender<()>,
    rendezvous_task: tokio::task::JoinHandle<Result<(), strata_net::NetError>>,
    nodes: Vec<Node>,
}

impl Cluster {
    async fn spawn(n: usize) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let rendezvous_addr = listener.local_addr()?;
        let (rendezvous_shutdown, shutdown_rx) = broadcast::channel(1);
        let server = Arc::new(RendezvousServer::new());
        let rendezvous_task = tokio::spawn(server.run(listener, shutdown_rx));

        let mut nodes = Vec::with_capacity(n);
        for _ in 0..n {
            let config = node_config(rendezvous_addr);
            let node = Node::bootstrap(&config).await?;
            nodes.push(node);
        }

        for node in &nodes {
            wait_for_directory_len(&node.directory, n).await?;
        }

        Ok(Self { rendezvous_shutdown, rendezvous_task, nodes })
    }

    async fn shutdown(self) {
        for node in &self.nodes {
            node.shutdown();
        }
        for node in self.nodes {
            node.join().await;
        }
        let _ = self.rendezvous_shutdown.send(());
        let _ = self.rendezvous_task.await;
    }
}

fn node_config(rendezvous_addr: SocketAddr) -> StrataConfig {
    let mut config = StrataConfig::default();
    config.node.bind_addr = "127.0.0.1".to_string();
    config.node.bind_port = 0;
    config.rendezvous.addr = rendezvous_addr.ip().to_string();
    config.rendezvous.port = rendezvous_addr.port();
    config
}

async fn wait_for_directory_len(directory: &ClusterDirectory, n: usize) -> Result<()> {
    for _ in 0..100 {
        if directory.len().await >= n {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("directory never reached {n} members")
}

#[tokio::test]
async fn scalar_round_trip_across_nodes() -> Result<()> {
    let cluster = Cluster::spawn(3).await?;

    ingest::from_scalar(&cluster.nodes[0].store, "v", Value::Double(42.0)).await?;
    let df = dataframe::load(&cluster.nodes[2].store, &Key::new("v", 0)).await?.unwrap();

    assert_eq!(df.schema().kind_string(), "D");
    assert_eq!(df.nrows(), 1);
    assert_eq!(df.get_double(&cluster.nodes[2].store, 0, 0).await?, 42.0);

    cluster.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn array_round_trip_is_exact_for_every_cell() -> Result<()> {
    let cluster = Cluster::spawn(3).await?;

    let mut schema = Schema::new();
    schema.add_column(strata_core::ColumnKind::Int, None);
    schema.add_column(strata_core::ColumnKind::String, None);
    let rows = vec![
        vec![Value::Int(10), Value::String("a".to_string())],
        vec![Value::Int(20), Value::String("b".to_string())],
        vec![Value::Int(30), Value::String("c".to_string())],
    ];
    ingest::from_array(&cluster.nodes[0].store, &schema, "t", rows).await?;

    let df = dataframe::load(&cluster.nodes[1].store, &Key::new("t", 0)).await?.unwrap();
    assert_eq!(df.nrows(), 3);
    for (r, (expect_int, expect_str)) in [(10, "a"), (20, "b"), (30, "c")].into_iter().enumerate() {
        assert_eq!(df.get_int(&cluster.nodes[1].store, 0, r).await?, expect_int);
        assert_eq!(df.get_string(&cluster.nodes[1].store, 1, r).await?, expect_str);
    }

    cluster.shutdown().await;
    Ok(())
}

/// Drives a column past one `CHUNK_SIZE` boundary and checks that the
/// resulting description places its two chunks round-robin by cluster size,
/// and that every value is still reachable by sum.
#[tokio::test]
async fn column_past_chunk_boundary_splits_and_places_round_robin() -> Result<()> {
    let cluster = Cluster::spawn(3).await?;

    let sz: usize = strata_frame::CHUNK_SIZE + 1;
    let mut schema = Schema::new();
    schema.add_column(strata_core::ColumnKind::Double, None);
    ingest::from_lambda(&cluster.nodes[0].store, &schema, "m", sz, |row, i| {
        row.set_double(0, i as f64);
    })
    .await?;

    let raw = cluster.nodes[0].store.get(&Key::new("m", 0)).await?.unwrap();
    let description = DataFrameDescription::decode(raw.as_bytes().clone())?;
    assert_eq!(description.schema_string, "D");
    assert_eq!(description.columns.len(), 1);
    assert_eq!(description.columns[0].chunk_count(), 2);
    assert_eq!(description.columns[0].total_length, sz as u64);
    assert_eq!(description.columns[0].chunk_keys[0].node, 0);
    assert_eq!(description.columns[0].chunk_keys[1].node, 1);

    let df = dataframe::load(&cluster.nodes[2].store, &Key::new("m", 0)).await?.unwrap();
    let mut sum = 0.0f64;
    for r in 0..df.nrows() {
        sum += df.get_double(&cluster.nodes[2].store, 0, r).await?;
    }
    let expected: f64 = (0..sz).map(|i| i as f64).sum();
    assert_eq!(sum, expected);

    cluster.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn producer_consumer_verifier_agree_on_three_nodes() -> Result<()> {
    let cluster = Cluster::spawn(3).await?;

    let mut schema = Schema::new();
    schema.add_column(strata_core::ColumnKind::Int, None);
    let n = 10_000usize;
    ingest::from_lambda(&cluster.nodes[0].store, &schema, "m", n, |row, i| {
        row.set_int(0, i as i64);
    })
    .await?;
    let expected_sum: i64 = (0..n as i64).sum();
    ingest::from_scalar(&cluster.nodes[0].store, "ck", Value::Int(expected_sum)).await?;

    let consumer = cluster.nodes[1].store.clone();
    let consumer_task = tokio::spawn(async move {
        let df = dataframe::load_blocking(&consumer, &Key::new("m", 0)).await?;
        let mut sum = 0i64;
        for r in 0..df.nrows() {
            sum += df.get_int(&consumer, 0, r).await?;
        }
        ingest::from_scalar(&consumer, "verif", Value::Int(sum)).await?;
        Ok::<_, anyhow::Error>(())
    });
    consumer_task.await??;

    let observed_df = dataframe::load_blocking(&cluster.nodes[2].store, &Key::new("verif", 1)).await?;
    let checksum_df = dataframe::load_blocking(&cluster.nodes[2].store, &Key::new("ck", 0)).await?;
    let observed_sum = observed_df.get_int(&cluster.nodes[2].store, 0, 0).await?;
    let checksum_sum = checksum_df.get_int(&cluster.nodes[2].store, 0, 0).await?;
    assert_eq!(observed_sum, checksum_sum);
    assert_eq!(observed_sum, expected_sum);

    cluster.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn sor_file_ingest_infers_schema_and_values() -> Result<()> {
    let cluster = Cluster::spawn(2).await?;

    let tmp = std::env::temp_dir().join(format!("strata-sor-test-{}.txt", std::process::id()));
    let projects = [0, 0, 2, 2, 3, 3, 1, 1];
    let authors = [0, 1, 0, 4967, 2, 0, 2, 3];
    let ratings = [0, 1, 0, 4967, 2, 0, 2, 3];
    let mut text = String::new();
    for i in 0..8 {
        text.push_str(&format!("<{}><{}><{}>\n", projects[i], authors[i], ratings[i]));
    }
    std::fs::write(&tmp, text)?;

    ingest::from_file(&cluster.nodes[0].store, "sor", &tmp).await?;
    let df = dataframe::load(&cluster.nodes[1].store, &Key::new("sor", 0)).await?.unwrap();

    assert_eq!(df.ncols(), 3);
    assert_eq!(df.nrows(), 8);
    assert_eq!(df.schema().kind_string(), "III");
    for i in 0..8 {
        assert_eq!(df.get_int(&cluster.nodes[1].store, 0, i).await?, projects[i]);
        assert_eq!(df.get_int(&cluster.nodes[1].store, 1, i).await?, authors[i]);
        assert_eq!(df.get_int(&cluster.nodes[1].store, 2, i).await?, ratings[i]);
    }

    std::fs::remove_file(&tmp).ok();
    cluster.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn rendezvous_directory_propagates_to_every_joined_node() -> Result<()> {
    let cluster = Cluster::spawn(4).await?;
    for node in &cluster.nodes {
        assert_eq!(node.directory.len().await, 4);
    }
    cluster.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn concurrent_waiters_on_one_node_all_observe_the_put() -> Result<()> {
    let cluster = Cluster::spawn(1).await?;
    let store = cluster.nodes[0].store.clone();
    let key_name = "late";

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            dataframe::load_blocking(&store, &Key::new("late", 0)).await
        }));
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    ingest::from_scalar(&store, key_name, Value::String("X".to_string())).await?;

    for h in handles {
        let df = h.await??;
        assert_eq!(df.get_string(&store, 0, 0).await?, "X");
    }

    cluster.shutdown().await;
    Ok(())
}
