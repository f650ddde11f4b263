use crate::net::{Emulator, Fabric, LinkId, NodeId, NodeKind, deploy};
use crate::topo::{
    FatTreeOpts, HOSTS_PER_EDGE, HostSpec, IdAllocator, Layer, LinkSpec, SwitchSpec, Topology,
    build_fat_tree,
};

fn k4() -> Topology {
    build_fat_tree(&FatTreeOpts::default(), &mut IdAllocator::default()).expect("k=4")
}

/// 只记录调用顺序的仿真器
#[derive(Default)]
struct CallLog {
    calls: Vec<String>,
}

impl Emulator for CallLog {
    fn add_switch(&mut self, spec: &SwitchSpec) -> NodeId {
        self.calls.push(spec.name.clone());
        NodeId(self.calls.len() - 1)
    }

    fn add_host(&mut self, spec: &HostSpec) -> NodeId {
        self.calls.push(spec.name.clone());
        NodeId(self.calls.len() - 1)
    }

    fn add_link(&mut self, a: NodeId, b: NodeId, _spec: &LinkSpec) -> LinkId {
        self.calls.push(format!("{a}-{b}"));
        LinkId(self.calls.len() - 1)
    }
}

#[test]
fn deploy_creates_switches_then_hosts_then_links() {
    let topo = k4();
    let mut emu = CallLog::default();
    let out = deploy(&topo, &mut emu);

    assert_eq!(out.switches.len(), 20);
    assert_eq!(out.hosts.len(), 16);
    assert_eq!(out.links.len(), 64);
    assert_eq!(emu.calls[0], "c1");
    assert_eq!(emu.calls[19], "e20");
    assert_eq!(emu.calls[20], "h1");
    assert_eq!(emu.calls[35], "h16");
    // 第一条链路：c1 <-> a5
    assert_eq!(emu.calls[36], "n0-n4");
}

#[test]
fn fabric_mirrors_topology_degrees() {
    let topo = k4();
    let mut fabric = Fabric::default();
    let out = deploy(&topo, &mut fabric);

    assert_eq!(fabric.nodes().len(), 36);
    assert_eq!(fabric.links().len(), 64);
    assert_eq!(fabric.switches_in(Layer::Core).count(), 4);
    assert_eq!(fabric.switches_in(Layer::Aggregation).count(), 8);
    assert_eq!(fabric.switches_in(Layer::Edge).count(), 8);
    assert_eq!(fabric.host_count(), 16);

    for (i, sw) in topo.switches.iter().enumerate() {
        let id = out.switches[i];
        assert_eq!(fabric.node(id).name, sw.name);
        assert_eq!(
            fabric.node(id).kind,
            NodeKind::Switch {
                layer: sw.layer,
                dpid: sw.dpid
            }
        );
        assert_eq!(fabric.degree(id), topo.degree(crate::topo::NodeRef::Switch(i)));
    }

    let edge = fabric.find("e13").expect("e13");
    assert_eq!(fabric.neighbors_in(edge, None), HOSTS_PER_EDGE);
    assert_eq!(fabric.neighbors_in(edge, Some(Layer::Aggregation)), 2);
    assert_eq!(fabric.neighbors_in(edge, Some(Layer::Core)), 0);

    let core = fabric.find("c1").expect("c1");
    assert_eq!(fabric.neighbors_in(core, Some(Layer::Aggregation)), 4);

    let h1 = fabric.find("h1").expect("h1");
    assert!(fabric.node(h1).is_host());
    let neighbors: Vec<NodeId> = fabric.neighbors(h1).collect();
    assert_eq!(neighbors, [edge]);
}

#[test]
fn fabric_links_carry_bandwidth() {
    let opts = FatTreeOpts {
        link_mbps: 100,
        link_delay_us: Some(250),
        ..FatTreeOpts::with_k(2)
    };
    let topo = build_fat_tree(&opts, &mut IdAllocator::default()).expect("k=2");
    let mut fabric = Fabric::default();
    let out = deploy(&topo, &mut fabric);

    assert_eq!(out.links.len(), fabric.links().len());
    for link in fabric.links() {
        assert_eq!(link.bandwidth_mbps, 100);
        assert_eq!(link.delay_us, Some(250));
        assert_eq!(link.peer(link.a), Some(link.b));
    }
    assert!(fabric.find("h9").is_none());
}
