use crate::topo::{
    CoreWiring, FatTreeOpts, HOSTS_PER_EDGE, IdAllocator, Layer, LinkKind, NodeRef, Topology,
    TopologyError, build_fat_tree,
};
use std::collections::HashSet;

fn build(k: usize, wiring: CoreWiring) -> Topology {
    let opts = FatTreeOpts {
        core_wiring: wiring,
        ..FatTreeOpts::with_k(k)
    };
    build_fat_tree(&opts, &mut IdAllocator::default()).expect("valid k")
}

/// 与 `node` 相连、且对端属于 `layer` 的链路数；`None` 表示主机
fn degree_towards(topo: &Topology, node: NodeRef, layer: Option<Layer>) -> usize {
    topo.links_of(node)
        .filter_map(|l| l.peer_of(node))
        .filter(|peer| topo.switch(*peer).map(|s| s.layer) == layer)
        .count()
}

#[test]
fn fat_tree_rejects_odd_or_tiny_k() {
    for k in [0, 1, 3, 5, 7] {
        let err = build_fat_tree(&FatTreeOpts::with_k(k), &mut IdAllocator::default())
            .expect_err("k must be rejected");
        assert_eq!(err, TopologyError::InvalidParameter { k });
    }
}

#[test]
fn fat_tree_layer_sizes_follow_k() {
    for k in [2, 4, 6, 8] {
        let topo = build(k, CoreWiring::Strided);
        let half = k / 2;
        assert_eq!(topo.layer(Layer::Core).len(), half * half, "k={k}");
        assert_eq!(topo.layer(Layer::Aggregation).len(), k * half, "k={k}");
        assert_eq!(topo.layer(Layer::Edge).len(), k * half, "k={k}");
        assert_eq!(topo.hosts.len(), 2 * k * half, "k={k}");
        assert!(topo.layer(Layer::Core).iter().all(|s| s.layer == Layer::Core));
        assert!(topo.layer(Layer::Edge).iter().all(|s| s.layer == Layer::Edge));
    }
}

#[test]
fn fat_tree_k4_matches_reference_counts() {
    let topo = build(4, CoreWiring::Strided);
    assert_eq!(topo.layer(Layer::Core).len(), 4);
    assert_eq!(topo.layer(Layer::Aggregation).len(), 8);
    assert_eq!(topo.layer(Layer::Edge).len(), 8);
    assert_eq!(topo.hosts.len(), 16);
    assert_eq!(topo.links_of_kind(LinkKind::CoreAggregation).count(), 16);
    assert_eq!(topo.links_of_kind(LinkKind::AggregationEdge).count(), 32);
    assert_eq!(topo.links_of_kind(LinkKind::EdgeHost).count(), 16);
    assert_eq!(topo.links.len(), 64);
    assert!(topo.links.iter().all(|l| l.bandwidth_mbps == 10));
}

#[test]
fn fat_tree_degree_invariants_hold_for_both_wirings() {
    for wiring in [CoreWiring::Strided, CoreWiring::Grouped] {
        for k in [2, 4, 6, 8] {
            let topo = build(k, wiring);
            let half = k / 2;

            for i in 0..topo.core_count() {
                let core = topo.core(i);
                assert_eq!(topo.degree(core), k, "core {i} k={k} {wiring:?}");
                let pods: HashSet<_> = topo
                    .links_of(core)
                    .filter_map(|l| l.peer_of(core))
                    .filter_map(|p| topo.switch(p).and_then(|s| s.pod))
                    .collect();
                assert_eq!(pods.len(), k, "core {i} must reach every pod once");
            }

            for pod in 0..k {
                for slot in 0..half {
                    let agg = topo.agg(pod, slot);
                    assert_eq!(degree_towards(&topo, agg, Some(Layer::Edge)), half);
                    assert_eq!(degree_towards(&topo, agg, Some(Layer::Core)), half);

                    let edge = topo.edge(pod, slot);
                    assert_eq!(degree_towards(&topo, edge, Some(Layer::Aggregation)), half);
                    assert_eq!(degree_towards(&topo, edge, None), HOSTS_PER_EDGE);
                    assert_eq!(topo.degree(edge), half + HOSTS_PER_EDGE);
                }
            }

            for (i, _) in topo.hosts.iter().enumerate() {
                assert_eq!(topo.degree(NodeRef::Host(i)), 1);
            }
        }
    }
}

#[test]
fn fat_tree_aggregation_edge_links_stay_inside_pod() {
    let topo = build(6, CoreWiring::Strided);
    for link in topo.links_of_kind(LinkKind::AggregationEdge) {
        let a = topo.switch(link.a).expect("agg endpoint");
        let b = topo.switch(link.b).expect("edge endpoint");
        assert_eq!(a.layer, Layer::Aggregation);
        assert_eq!(b.layer, Layer::Edge);
        assert_eq!(a.pod, b.pod, "link {link:?} crosses pods");
    }
}

#[test]
fn fat_tree_core_links_land_on_matching_slot() {
    for wiring in [CoreWiring::Strided, CoreWiring::Grouped] {
        let topo = build(6, wiring);
        let half = 3;
        for link in topo.links_of_kind(LinkKind::CoreAggregation) {
            let core = topo.switch(link.a).expect("core endpoint");
            let agg = topo.switch(link.b).expect("agg endpoint");
            assert_eq!(core.layer, Layer::Core);
            assert_eq!(agg.layer, Layer::Aggregation);
            assert_eq!(core.slot, wiring.slot(core.index, half));
            assert_eq!(agg.slot, core.slot, "{wiring:?}: {} -> {}", core.name, agg.name);
        }
    }
}

#[test]
fn core_wiring_conventions_build_different_fabrics() {
    let strided = build(4, CoreWiring::Strided);
    let grouped = build(4, CoreWiring::Grouped);

    let peers = |topo: &Topology, core: usize| -> Vec<String> {
        topo.links_of(topo.core(core))
            .filter_map(|l| l.peer_of(topo.core(core)))
            .filter_map(|p| topo.name(p))
            .map(str::to_string)
            .collect()
    };

    // k=4：a5..a12，strided 下 c2 落在槽位 1，grouped 下 c2 落在槽位 0
    assert_eq!(peers(&strided, 0), ["a5", "a7", "a9", "a11"]);
    assert_eq!(peers(&strided, 1), ["a6", "a8", "a10", "a12"]);
    assert_eq!(peers(&grouped, 1), ["a5", "a7", "a9", "a11"]);
    assert_eq!(peers(&grouped, 2), ["a6", "a8", "a10", "a12"]);
}

#[test]
fn fat_tree_names_and_dpids_are_unique_and_layered() {
    let topo = build(4, CoreWiring::Strided);

    let mut names = HashSet::new();
    for sw in &topo.switches {
        assert!(names.insert(sw.name.clone()), "duplicate name {}", sw.name);
    }
    for host in &topo.hosts {
        assert!(names.insert(host.name.clone()), "duplicate name {}", host.name);
    }
    assert_eq!(names.len(), 20 + 16);

    let dpids: Vec<u64> = topo.switches.iter().map(|s| s.dpid.0).collect();
    let expected: Vec<u64> = (0x101..0x101 + 20).collect();
    assert_eq!(dpids, expected, "core, then aggregation, then edge, contiguous");

    assert_eq!(topo.switches[0].name, "c1");
    assert_eq!(topo.switches[4].name, "a5");
    assert_eq!(topo.switches[12].name, "e13");
    assert_eq!(topo.switches[0].dpid.to_string(), "0000000000000101");
    assert_eq!(topo.hosts[0].name, "h1");
    assert_eq!(topo.hosts[15].name, "h16");
}

#[test]
fn id_allocator_continues_across_builds() {
    let mut ids = IdAllocator::default();
    let first = build_fat_tree(&FatTreeOpts::with_k(4), &mut ids).expect("k=4");
    let second = build_fat_tree(&FatTreeOpts::with_k(2), &mut ids).expect("k=2");

    assert_eq!(first.switches.last().map(|s| s.dpid.0), Some(0x100 + 20));
    assert_eq!(second.switches[0].dpid.0, 0x100 + 21);
    assert_eq!(ids.last(), 0x100 + 20 + 5);
}

#[test]
fn hosts_attach_two_per_edge_in_creation_order() {
    let topo = build(4, CoreWiring::Strided);
    let edges = topo.layer(Layer::Edge);
    for (i, host) in topo.hosts.iter().enumerate() {
        let edge = topo.switch(NodeRef::Switch(host.edge)).expect("edge switch");
        assert_eq!(edge.layer, Layer::Edge);
        assert_eq!(edge.name, edges[i / HOSTS_PER_EDGE].name);
    }
    // h16 落在最后一个 edge 交换机上
    assert_eq!(topo.name(NodeRef::Switch(topo.hosts[15].edge)), Some("e20"));
}

#[test]
fn interfaces_are_numbered_per_node_in_link_order() {
    let topo = build(4, CoreWiring::Strided);

    let first = &topo.links[0];
    assert_eq!(first.kind, LinkKind::CoreAggregation);
    assert_eq!(topo.interface(first, first.a).as_deref(), Some("c1-eth1"));
    assert_eq!(topo.interface(first, first.b).as_deref(), Some("a5-eth1"));

    let mut seen = HashSet::new();
    for link in &topo.links {
        for end in link.endpoints() {
            let intf = topo.interface(link, end).expect("endpoint interface");
            assert!(seen.insert(intf.clone()), "duplicate interface {intf}");
        }
    }

    // aggregation 交换机：两个上行口在前，两个下行口在后
    let a5 = topo.agg(0, 0);
    let mut ports: Vec<(u32, LinkKind)> = topo
        .links_of(a5)
        .map(|l| (l.port_of(a5).expect("port"), l.kind))
        .collect();
    ports.sort_by_key(|(p, _)| *p);
    assert_eq!(
        ports,
        [
            (1, LinkKind::CoreAggregation),
            (2, LinkKind::CoreAggregation),
            (3, LinkKind::AggregationEdge),
            (4, LinkKind::AggregationEdge),
        ]
    );
}

#[test]
fn topology_lookup_and_json_roundtrip() {
    let topo = build(2, CoreWiring::Strided);
    assert_eq!(topo.lookup("c1"), Some(NodeRef::Switch(0)));
    assert_eq!(topo.lookup("h4"), Some(NodeRef::Host(3)));
    assert_eq!(topo.lookup("x9"), None);

    let raw = serde_json::to_string(&topo).expect("serialize topology");
    let decoded: Topology = serde_json::from_str(&raw).expect("deserialize topology");
    assert_eq!(decoded.switches, topo.switches);
    assert_eq!(decoded.links, topo.links);
    assert!(raw.contains("\"core_aggregation\""));
}

#[test]
fn deserialized_topology_with_missing_nodes_is_queried_safely() {
    let topo = build(4, CoreWiring::Strided);
    let mut raw: serde_json::Value = serde_json::to_value(&topo).expect("serialize topology");
    raw["switches"] = serde_json::json!([]);
    raw["hosts"] = serde_json::json!([]);
    let broken: Topology = serde_json::from_value(raw).expect("deserialize topology");

    assert!(broken.layer(Layer::Core).is_empty());
    assert!(broken.layer(Layer::Edge).is_empty());
    assert_eq!(broken.name(NodeRef::Switch(0)), None);
    assert_eq!(broken.name(NodeRef::Host(3)), None);
    let first = &broken.links[0];
    assert_eq!(broken.interface(first, first.a), None);
}
