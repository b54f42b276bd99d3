//! Joint depth-first ordering.

use tessera_network::{LogicNetwork, VertexId};

/// Computes a joint DFS ordering of the network's vertices.
///
/// Like a depth-first search from each fan-in-free vertex, except that a
/// vertex is only visited once *all* of its predecessors have been visited.
/// The result is a topological order that interleaves the traversals of the
/// individual primary inputs.
pub(crate) fn jdfs_order(network: &LogicNetwork, io_ports: bool) -> Vec<VertexId> {
    let mut ordering = Vec::new();
    let mut discovered = std::collections::HashSet::new();

    fn visit(
        network: &LogicNetwork,
        io_ports: bool,
        v: VertexId,
        discovered: &mut std::collections::HashSet<VertexId>,
        ordering: &mut Vec<VertexId>,
    ) {
        if discovered.contains(&v) {
            return;
        }
        // refuse to visit until every predecessor is discovered
        if !network
            .inv_adjacent(v, io_ports, false)
            .all(|p| discovered.contains(&p))
        {
            return;
        }
        discovered.insert(v);
        ordering.push(v);
        let successors: Vec<VertexId> = network.adjacent(v, io_ports, false).collect();
        for s in successors {
            visit(network, io_ports, s, discovered, ordering);
        }
    }

    let roots: Vec<VertexId> = network
        .vertices(io_ports, false)
        .filter(|&v| network.in_degree(v, io_ports, false) == 0)
        .collect();
    for root in roots {
        visit(network, io_ports, root, &mut discovered, &mut ordering);
    }

    ordering
}
