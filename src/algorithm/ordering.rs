//! 边排序

use crate::error::Result;
use crate::graph::Edge;

/// 按权重升序排序边（稳定排序，NaN 排在最后）
pub fn sort_edges_by_weight(edges: &mut [Edge]) -> Result<()> {
    let mut keyed = edges
        .iter()
        .map(|e| Ok((e.weight()?, e.clone())))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (slot, (_, edge)) in edges.iter_mut().zip(keyed) {
        *slot = edge;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::Graph;

    #[test]
    fn test_sort_by_weight() {
        let graph = Graph::undirected();
        let v: Vec<_> = (0..4).map(|_| graph.add_vertex(None)).collect();
        let e1 = graph.add_edge(&v[0], &v[1]).unwrap();
        let e2 = graph.add_edge(&v[1], &v[2]).unwrap();
        let e3 = graph.add_edge(&v[2], &v[3]).unwrap();
        e1.set_weight(3.0).unwrap();
        e2.set_weight(-1.0).unwrap();
        e3.set_weight(3.0).unwrap();

        let mut edges = graph.edges();
        sort_edges_by_weight(&mut edges).unwrap();
        assert_eq!(edges, vec![e2, e1, e3]);
    }

    #[test]
    fn test_detached_edge_fails() {
        let graph = Graph::undirected();
        let a = graph.add_vertex(None);
        let b = graph.add_vertex(None);
        let e = graph.add_edge(&a, &b).unwrap();
        let mut edges = vec![e.clone()];
        graph.remove_edge(&e);

        assert!(matches!(
            sort_edges_by_weight(&mut edges),
            Err(Error::EdgeDetached(_))
        ));
    }
}
