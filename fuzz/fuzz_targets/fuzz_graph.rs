#![no_main]

//! Fuzz target for resolution of arbitrary dependency graphs
//!
//! Builds a random graph over a fixed set of node types, resolves one root
//! and checks the outcome against a depth-first reachability check: the
//! resolve must terminate, and succeed exactly when every node reachable from
//! the root is registered and the reachable subgraph has no cycle.

use arbitrary::Arbitrary;
use ioc_container::{Container, Resolver, Result};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const NODES: usize = 6;
const MAX_DEPS: usize = 4;

struct Node<const I: usize>;

#[derive(Debug, Arbitrary)]
struct NodeSpec {
    registered: bool,
    lazy: bool,
    deps: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct Graph {
    nodes: [NodeSpec; NODES],
    root: u8,
    // Resolve twice to exercise the lazy singleton fast path
    repeat: bool,
}

impl NodeSpec {
    fn edges(&self) -> Vec<usize> {
        self.deps
            .iter()
            .take(MAX_DEPS)
            .map(|d| *d as usize % NODES)
            .collect()
    }
}

fn resolve_node(r: &mut Resolver<'_>, index: usize) -> Result<()> {
    match index {
        0 => r.resolve::<Node<0>>().map(drop),
        1 => r.resolve::<Node<1>>().map(drop),
        2 => r.resolve::<Node<2>>().map(drop),
        3 => r.resolve::<Node<3>>().map(drop),
        4 => r.resolve::<Node<4>>().map(drop),
        5 => r.resolve::<Node<5>>().map(drop),
        _ => unreachable!("node index out of range"),
    }
}

fn factory<const I: usize>(
    deps: Vec<usize>,
) -> impl Fn(&mut Resolver<'_>) -> Result<Arc<Node<I>>> + Send + Sync + 'static {
    move |r| {
        for &dep in &deps {
            resolve_node(r, dep)?;
        }
        Ok(Arc::new(Node::<I>))
    }
}

fn register<const I: usize>(container: &Container, spec: &NodeSpec) {
    if !spec.registered {
        return;
    }
    if spec.lazy {
        container.lazy(factory::<I>(spec.edges()));
    } else {
        container.transient(factory::<I>(spec.edges()));
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn expected(graph: &Graph, node: usize, marks: &mut [Mark; NODES]) -> bool {
    match marks[node] {
        Mark::Done => return true,
        Mark::InProgress => return false,
        Mark::Unvisited => {}
    }
    if !graph.nodes[node].registered {
        return false;
    }
    marks[node] = Mark::InProgress;
    for dep in graph.nodes[node].edges() {
        if !expected(graph, dep, marks) {
            return false;
        }
    }
    marks[node] = Mark::Done;
    true
}

fuzz_target!(|graph: Graph| {
    let container = Container::new();
    register::<0>(&container, &graph.nodes[0]);
    register::<1>(&container, &graph.nodes[1]);
    register::<2>(&container, &graph.nodes[2]);
    register::<3>(&container, &graph.nodes[3]);
    register::<4>(&container, &graph.nodes[4]);
    register::<5>(&container, &graph.nodes[5]);

    let root = graph.root as usize % NODES;
    let should_resolve = expected(&graph, root, &mut [Mark::Unvisited; NODES]);

    let rounds = if graph.repeat { 2 } else { 1 };
    for _ in 0..rounds {
        let resolved = container.construct(|r| resolve_node(r, root)).is_ok();
        assert_eq!(resolved, should_resolve);
    }

    container.reset();
    assert!(container.is_empty());
});
