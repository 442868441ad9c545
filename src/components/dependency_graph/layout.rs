//! Layered (rank-based) layout.
//!
//! Each call builds its own graph and discards it, so the result depends only
//! on the nodes, edges and configuration passed in:
//!
//! 1. Ranking: longest path from the source nodes. Cycles are broken first by
//!    reversing a greedy feedback arc set.
//! 2. Ordering: edges spanning several ranks get virtual nodes, then
//!    barycenter sweeps reorder each rank to reduce crossings.
//! 3. Coordinates: ranks are stacked along the layout direction, nodes are
//!    spread along the other axis and pulled toward their neighbors.

use std::collections::{HashMap, HashSet};

use petgraph::Direction::Incoming;
use petgraph::algo::{greedy_feedback_arc_set, is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Deserialize;

use super::types::{AttachSide, GraphEdge, GraphNode, Point, ReducedGraph};

/// Spacing between edges that share both endpoints.
const LANE_GAP: f64 = 8.0;
/// How far a self-loop reaches outside its node.
const LOOP_REACH: f64 = 16.0;

/// Axis along which ranks are stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Direction {
	/// Ranks grow downward.
	#[default]
	#[serde(rename = "TB")]
	TopToBottom,
	/// Ranks grow to the right.
	#[serde(rename = "LR")]
	LeftToRight,
}

impl Direction {
	/// `(target side, source side)`: where incoming edges attach and outgoing
	/// edges depart.
	pub fn attach_sides(self) -> (AttachSide, AttachSide) {
		match self {
			Direction::TopToBottom => (AttachSide::Top, AttachSide::Bottom),
			Direction::LeftToRight => (AttachSide::Left, AttachSide::Right),
		}
	}
}

/// Geometry of the layered layout. Read from the `layout` object of the model
/// document with camelCase keys (`rankGap`, `nodeWidth`, ...).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	/// Direction ranks grow in.
	pub direction: Direction,
	/// Width of every node box.
	pub node_width: f64,
	/// Height of every node box.
	pub node_height: f64,
	/// Gap between neighboring nodes of the same rank.
	pub node_gap: f64,
	/// Gap between consecutive ranks.
	pub rank_gap: f64,
	/// Gap reserved around the virtual nodes of long edges.
	pub edge_gap: f64,
	/// Offset of the leftmost box from the origin.
	pub margin_x: f64,
	/// Offset of the topmost box from the origin.
	pub margin_y: f64,
	/// Upper bound on barycenter sweeps.
	pub max_sweeps: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			direction: Direction::TopToBottom,
			node_width: 180.0,
			node_height: 40.0,
			node_gap: 50.0,
			rank_gap: 80.0,
			edge_gap: 10.0,
			margin_x: 20.0,
			margin_y: 20.0,
			max_sweeps: 24,
		}
	}
}

impl LayoutConfig {
	/// Node size along the rank axis.
	fn depth(&self) -> f64 {
		match self.direction {
			Direction::TopToBottom => self.node_height,
			Direction::LeftToRight => self.node_width,
		}
	}

	/// Node size across the rank axis.
	fn breadth(&self) -> f64 {
		match self.direction {
			Direction::TopToBottom => self.node_width,
			Direction::LeftToRight => self.node_height,
		}
	}
}

/// Lay out a reduced graph, returning it with positioned nodes.
pub fn layout_graph(graph: ReducedGraph, config: &LayoutConfig) -> ReducedGraph {
	let nodes = layout(&graph.nodes, &graph.edges, config);
	ReducedGraph {
		nodes,
		edges: graph.edges,
	}
}

/// Position every node. The output has one entry per input node, in input
/// order, stamped with the attach sides of `config.direction`.
pub fn layout(nodes: &[GraphNode], edges: &[GraphEdge], config: &LayoutConfig) -> Vec<GraphNode> {
	let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let centers = compute_centers(&ids, edges, config);
	let mut positioned = nodes.to_vec();
	apply_positions(&mut positioned, &centers, config);
	positioned
}

/// Move each node so its box is centered on its computed center. Nodes with
/// no center are placed at the origin.
pub fn apply_positions(
	nodes: &mut [GraphNode],
	centers: &HashMap<String, Point>,
	config: &LayoutConfig,
) {
	let (target_side, source_side) = config.direction.attach_sides();
	for node in nodes {
		node.position = match centers.get(&node.id) {
			Some(center) => Point::new(
				center.x - config.node_width / 2.0,
				center.y - config.node_height / 2.0,
			),
			None => {
				log::warn!("no layout position for {:?}, placing at origin", node.id);
				Point::ORIGIN
			}
		};
		node.target_side = target_side;
		node.source_side = source_side;
	}
}

/// Box centers keyed by node id.
pub fn compute_centers(
	ids: &[&str],
	edges: &[GraphEdge],
	config: &LayoutConfig,
) -> HashMap<String, Point> {
	let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
	let links: Vec<(usize, usize)> = edges
		.iter()
		.filter_map(|e| match (index.get(e.source.as_str()), index.get(e.target.as_str())) {
			(Some(&s), Some(&t)) => Some((s, t)),
			_ => {
				log::warn!("edge {} references a node outside the layout, ignoring", e.id);
				None
			}
		})
		.collect();

	let (ranks, oriented) = rank_nodes(ids.len(), &links);
	let mut layers = Layers::build(&ranks, &oriented);
	layers.minimize_crossings(config.max_sweeps);
	let offsets = layers.assign_breadth(config);

	let depth = config.depth();
	let breadth = config.breadth();
	let left = (0..ids.len())
		.map(|i| offsets[i] - breadth / 2.0)
		.fold(f64::INFINITY, f64::min);

	let centers: HashMap<String, Point> = ids
		.iter()
		.enumerate()
		.map(|(i, id)| {
			let along = ranks[i] as f64 * (depth + config.rank_gap) + depth / 2.0;
			let across = offsets[i] - left;
			let center = match config.direction {
				Direction::TopToBottom => {
					Point::new(config.margin_x + across, config.margin_y + along)
				}
				Direction::LeftToRight => {
					Point::new(config.margin_x + along, config.margin_y + across)
				}
			};
			(id.to_string(), center)
		})
		.collect();
	log::debug!(
		"layout: {} nodes over {} ranks",
		centers.len(),
		layers.order.len()
	);
	centers
}

/// Longest-path rank of every node, plus the edges oriented so every one of
/// them points to a higher rank. Self-loops are dropped.
pub fn rank_nodes(node_count: usize, links: &[(usize, usize)]) -> (Vec<usize>, Vec<(usize, usize)>) {
	let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(node_count, links.len());
	for _ in 0..node_count {
		graph.add_node(());
	}
	for &(s, t) in links {
		if s != t {
			graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
		}
	}

	let reversed: HashSet<EdgeIndex> = if is_cyclic_directed(&graph) {
		let fas: HashSet<EdgeIndex> = greedy_feedback_arc_set(&graph).map(|e| e.id()).collect();
		log::warn!("dependency cycle detected, reversing {} edge(s) for ranking", fas.len());
		fas
	} else {
		HashSet::new()
	};

	let mut dag: DiGraph<(), ()> = DiGraph::with_capacity(node_count, graph.edge_count());
	for _ in 0..node_count {
		dag.add_node(());
	}
	let mut oriented = Vec::with_capacity(graph.edge_count());
	for edge in graph.edge_references() {
		let (s, t) = if reversed.contains(&edge.id()) {
			(edge.target(), edge.source())
		} else {
			(edge.source(), edge.target())
		};
		dag.add_edge(s, t, ());
		oriented.push((s.index(), t.index()));
	}

	let sequence = match toposort(&dag, None) {
		Ok(sequence) => sequence,
		Err(cycle) => {
			log::warn!(
				"cycle through node {} survived reversal, ranking in input order",
				cycle.node_id().index()
			);
			dag.node_indices().collect()
		}
	};

	let mut ranks = vec![0usize; node_count];
	for v in sequence {
		let rank = dag
			.neighbors_directed(v, Incoming)
			.map(|u| ranks[u.index()] + 1)
			.max()
			.unwrap_or(0);
		ranks[v.index()] = ranks[v.index()].max(rank);
	}
	(ranks, oriented)
}

/// Ranked slots: real nodes first (`0..real`), then virtual nodes standing in
/// for long edges where they cross a rank.
struct Layers {
	real: usize,
	order: Vec<Vec<usize>>,
	up: Vec<Vec<usize>>,
	down: Vec<Vec<usize>>,
}

impl Layers {
	fn build(ranks: &[usize], oriented: &[(usize, usize)]) -> Self {
		let real = ranks.len();
		let rank_count = ranks.iter().copied().max().map_or(0, |r| r + 1);
		let mut slot_rank = ranks.to_vec();
		let mut up = vec![Vec::new(); real];
		let mut down = vec![Vec::new(); real];

		for &(s, t) in oriented {
			if ranks[t] <= ranks[s] {
				continue;
			}
			let mut prev = s;
			for rank in ranks[s] + 1..ranks[t] {
				let slot = slot_rank.len();
				slot_rank.push(rank);
				up.push(Vec::new());
				down.push(Vec::new());
				down[prev].push(slot);
				up[slot].push(prev);
				prev = slot;
			}
			down[prev].push(t);
			up[t].push(prev);
		}

		let mut order = vec![Vec::new(); rank_count];
		for (slot, &rank) in slot_rank.iter().enumerate() {
			order[rank].push(slot);
		}
		Self {
			real,
			order,
			up,
			down,
		}
	}

	fn is_virtual(&self, slot: usize) -> bool {
		slot >= self.real
	}

	fn positions(&self) -> HashMap<usize, f64> {
		self.order
			.iter()
			.flat_map(|layer| layer.iter().enumerate().map(|(i, &s)| (s, i as f64)))
			.collect()
	}

	fn crossings(&self) -> usize {
		let pos = self.positions();
		let mut total = 0;
		for layer in &self.order {
			let pairs: Vec<(f64, f64)> = layer
				.iter()
				.flat_map(|&s| self.down[s].iter().map(move |t| (s, *t)))
				.map(|(s, t)| (pos[&s], pos[&t]))
				.collect();
			for (i, a) in pairs.iter().enumerate() {
				for b in &pairs[i + 1..] {
					if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
						total += 1;
					}
				}
			}
		}
		total
	}

	fn sort_layer(&mut self, layer: usize, neighbors_of_down: bool) {
		let pos = self.positions();
		let adjacency = if neighbors_of_down { &self.up } else { &self.down };
		let mut keyed: Vec<(f64, usize)> = self.order[layer]
			.iter()
			.map(|&s| {
				let adj = &adjacency[s];
				let key = if adj.is_empty() {
					pos[&s]
				} else {
					adj.iter().map(|n| pos[n]).sum::<f64>() / adj.len() as f64
				};
				(key, s)
			})
			.collect();
		keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
		self.order[layer] = keyed.into_iter().map(|(_, s)| s).collect();
	}

	fn minimize_crossings(&mut self, max_sweeps: usize) {
		let mut best = self.crossings();
		let mut best_order = self.order.clone();
		for _ in 0..max_sweeps {
			if best == 0 {
				break;
			}
			for layer in 1..self.order.len() {
				self.sort_layer(layer, true);
			}
			for layer in (0..self.order.len().saturating_sub(1)).rev() {
				self.sort_layer(layer, false);
			}
			let crossings = self.crossings();
			if crossings >= best {
				break;
			}
			best = crossings;
			best_order = self.order.clone();
		}
		self.order = best_order;
	}

	fn half_sep(&self, slot: usize, config: &LayoutConfig) -> f64 {
		if self.is_virtual(slot) {
			config.edge_gap / 2.0
		} else {
			(config.node_gap + config.breadth()) / 2.0
		}
	}

	/// Minimum center distance between two neighbors of a layer.
	fn sep(&self, a: usize, b: usize, config: &LayoutConfig) -> f64 {
		self.half_sep(a, config) + self.half_sep(b, config)
	}

	/// Center offset of every slot across the rank axis.
	fn assign_breadth(&self, config: &LayoutConfig) -> Vec<f64> {
		let mut x = vec![0.0; self.up.len()];
		let widths: Vec<f64> = self
			.order
			.iter()
			.map(|layer| {
				layer
					.windows(2)
					.map(|w| self.sep(w[0], w[1], config))
					.sum::<f64>()
			})
			.collect();
		let widest = widths.iter().copied().fold(0.0, f64::max);
		for (layer, width) in self.order.iter().zip(&widths) {
			let mut cursor = (widest - width) / 2.0;
			for (i, &slot) in layer.iter().enumerate() {
				if i > 0 {
					cursor += self.sep(layer[i - 1], slot, config);
				}
				x[slot] = cursor;
			}
		}

		for layer in 1..self.order.len() {
			self.pull_toward(&mut x, layer, &self.up, config);
		}
		for layer in (0..self.order.len().saturating_sub(1)).rev() {
			self.pull_toward(&mut x, layer, &self.down, config);
		}
		x
	}

	/// Move each slot of `layer` toward the mean of its neighbors, keeping the
	/// order and minimum separation. The left-packed and right-packed
	/// placements are averaged so the layer does not drift to one side.
	fn pull_toward(&self, x: &mut [f64], layer: usize, adjacency: &[Vec<usize>], config: &LayoutConfig) {
		let slots = &self.order[layer];
		if slots.is_empty() {
			return;
		}
		let desired: Vec<f64> = slots
			.iter()
			.map(|&s| {
				let adj = &adjacency[s];
				if adj.is_empty() {
					x[s]
				} else {
					adj.iter().map(|n| x[*n]).sum::<f64>() / adj.len() as f64
				}
			})
			.collect();

		let mut from_left = desired.clone();
		for i in 1..slots.len() {
			let min = from_left[i - 1] + self.sep(slots[i - 1], slots[i], config);
			from_left[i] = from_left[i].max(min);
		}
		let mut from_right = desired;
		for i in (0..slots.len() - 1).rev() {
			let max = from_right[i + 1] - self.sep(slots[i], slots[i + 1], config);
			from_right[i] = from_right[i].min(max);
		}
		for (i, &slot) in slots.iter().enumerate() {
			x[slot] = (from_left[i] + from_right[i]) / 2.0;
		}
	}
}

/// Point where an edge meets `side` of a node box.
pub fn attach_point(node: &GraphNode, side: AttachSide, config: &LayoutConfig) -> Point {
	let Point { x, y } = node.position;
	let (w, h) = (config.node_width, config.node_height);
	match side {
		AttachSide::Top => Point::new(x + w / 2.0, y),
		AttachSide::Bottom => Point::new(x + w / 2.0, y + h),
		AttachSide::Left => Point::new(x, y + h / 2.0),
		AttachSide::Right => Point::new(x + w, y + h / 2.0),
	}
}

/// Position of an edge among the edges with the same source and target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lane {
	pub index: usize,
	pub count: usize,
}

impl Lane {
	/// Sideways offset; a bundle is centered on the attach point.
	fn offset(self) -> f64 {
		(self.index as f64 - self.count.saturating_sub(1) as f64 / 2.0) * LANE_GAP
	}
}

/// Lane of every edge, in edge order. Edges `a -> b` and `b -> a` leave from
/// different sides and do not share a bundle.
pub fn lanes(edges: &[GraphEdge]) -> Vec<Lane> {
	let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
	let indices: Vec<usize> = edges
		.iter()
		.map(|e| {
			let count = counts.entry((e.source.as_str(), e.target.as_str())).or_insert(0);
			*count += 1;
			*count - 1
		})
		.collect();
	edges
		.iter()
		.zip(indices)
		.map(|(e, index)| Lane {
			index,
			count: counts[&(e.source.as_str(), e.target.as_str())],
		})
		.collect()
}

/// Orthogonal route from `source`'s departure side to `target`'s attach side,
/// bending once halfway between them. Parallel edges are shifted sideways by
/// their lane; a self-loop goes around the node's far side.
pub fn edge_route(
	source: &GraphNode,
	target: &GraphNode,
	config: &LayoutConfig,
	lane: Lane,
) -> Vec<Point> {
	if source.id == target.id {
		return self_loop_route(source, config, lane);
	}
	let offset = lane.offset();
	let (from, to) = (source.source_side, target.target_side);
	let start = shift_across(attach_point(source, from, config), from, offset);
	let end = shift_across(attach_point(target, to, config), to, offset);
	match source.source_side {
		AttachSide::Top | AttachSide::Bottom => {
			let mid = (start.y + end.y) / 2.0 + offset;
			vec![start, Point::new(start.x, mid), Point::new(end.x, mid), end]
		}
		AttachSide::Left | AttachSide::Right => {
			let mid = (start.x + end.x) / 2.0 + offset;
			vec![start, Point::new(mid, start.y), Point::new(mid, end.y), end]
		}
	}
}

fn self_loop_route(node: &GraphNode, config: &LayoutConfig, lane: Lane) -> Vec<Point> {
	let reach = LOOP_REACH + lane.index as f64 * LANE_GAP;
	let start = attach_point(node, node.source_side, config);
	let end = attach_point(node, node.target_side, config);
	let (out, back) = (
		step_out(start, node.source_side, reach),
		step_out(end, node.target_side, reach),
	);
	let Point { x, y } = node.position;
	match node.source_side {
		AttachSide::Top | AttachSide::Bottom => {
			let side = x + config.node_width + reach;
			vec![start, out, Point::new(side, out.y), Point::new(side, back.y), back, end]
		}
		AttachSide::Left | AttachSide::Right => {
			let side = y + config.node_height + reach;
			vec![start, out, Point::new(out.x, side), Point::new(back.x, side), back, end]
		}
	}
}

/// Move `p` along the side it sits on.
fn shift_across(p: Point, side: AttachSide, d: f64) -> Point {
	match side {
		AttachSide::Top | AttachSide::Bottom => Point::new(p.x + d, p.y),
		AttachSide::Left | AttachSide::Right => Point::new(p.x, p.y + d),
	}
}

/// Move `p` away from the node, perpendicular to `side`.
fn step_out(p: Point, side: AttachSide, d: f64) -> Point {
	match side {
		AttachSide::Top => Point::new(p.x, p.y - d),
		AttachSide::Bottom => Point::new(p.x, p.y + d),
		AttachSide::Left => Point::new(p.x - d, p.y),
		AttachSide::Right => Point::new(p.x + d, p.y),
	}
}

/// Top-left and bottom-right corners enclosing every node box.
pub fn bounds(nodes: &[GraphNode], config: &LayoutConfig) -> Option<(Point, Point)> {
	let size = Point::new(config.node_width, config.node_height);
	nodes.iter().map(|n| n.position).fold(None, |acc, p| {
		let far = Point::new(p.x + size.x, p.y + size.y);
		Some(match acc {
			None => (p, far),
			Some((min, max)) => (
				Point::new(min.x.min(p.x), min.y.min(p.y)),
				Point::new(max.x.max(far.x), max.y.max(far.y)),
			),
		})
	})
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use rstest::rstest;

	use super::*;
	use crate::components::dependency_graph::model::{Dependency, DependencyModel};
	use crate::components::dependency_graph::reduce::reduce;

	fn graph(pairs: &[(&str, &str)]) -> ReducedGraph {
		let edges: Vec<Dependency> = pairs.iter().map(|(s, t)| Dependency::new(*s, *t)).collect();
		reduce(&edges, &DependencyModel::default())
	}

	fn laid_out(pairs: &[(&str, &str)], config: &LayoutConfig) -> ReducedGraph {
		layout_graph(graph(pairs), config)
	}

	const SINGLE: Lane = Lane { index: 0, count: 1 };

	fn pos(graph: &ReducedGraph, id: &str) -> Point {
		graph.node(id).unwrap().position
	}

	#[rstest]
	#[case::chain(&[(0, 1), (1, 2)], vec![0, 1, 2])]
	#[case::longest_path_wins(&[(0, 1), (1, 2), (0, 2)], vec![0, 1, 2])]
	#[case::two_sources(&[(0, 2), (1, 2)], vec![0, 0, 1])]
	#[case::diamond(&[(0, 1), (0, 2), (1, 3), (2, 3)], vec![0, 1, 1, 2])]
	#[case::self_loop(&[(0, 0), (0, 1)], vec![0, 1])]
	fn ranks_are_longest_paths(#[case] links: &[(usize, usize)], #[case] expected: Vec<usize>) {
		let (ranks, _) = rank_nodes(expected.len(), links);
		assert_eq!(ranks, expected);
	}

	#[test]
	fn cycles_still_rank() {
		let (ranks, oriented) = rank_nodes(3, &[(0, 1), (1, 2), (2, 0)]);
		assert_eq!(ranks.len(), 3);
		assert_eq!(oriented.len(), 3);
		for (s, t) in oriented {
			assert!(ranks[t] > ranks[s]);
		}
	}

	#[test]
	fn two_node_cycle_terminates() {
		let g = laid_out(&[("a", "b"), ("b", "a")], &LayoutConfig::default());
		assert_ne!(pos(&g, "a").y, pos(&g, "b").y);
	}

	#[test]
	fn top_to_bottom_stacks_ranks() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("X", "Y"), ("Y", "Z")], &config);
		let (x, y, z) = (pos(&g, "X"), pos(&g, "Y"), pos(&g, "Z"));
		assert_eq!(x.y, config.margin_y);
		assert_eq!(y.y - x.y, config.node_height + config.rank_gap);
		assert_eq!(z.y - y.y, config.node_height + config.rank_gap);
		assert_eq!(x.x, y.x);
		assert_eq!(x.x, config.margin_x);
	}

	#[test]
	fn siblings_are_separated() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("p", "a"), ("p", "b")], &config);
		let (a, b, p) = (pos(&g, "a"), pos(&g, "b"), pos(&g, "p"));
		assert_eq!(a.y, b.y);
		assert!((a.x - b.x).abs() >= config.node_width + config.node_gap - 1e-9);
		// parent sits centered over its children
		assert!((p.x - (a.x + b.x) / 2.0).abs() < 1e-9);
	}

	#[test]
	fn left_to_right_swaps_axes() {
		let config = LayoutConfig {
			direction: Direction::LeftToRight,
			..LayoutConfig::default()
		};
		let g = laid_out(&[("a", "b")], &config);
		let (a, b) = (pos(&g, "a"), pos(&g, "b"));
		assert_eq!(a.y, b.y);
		assert_eq!(b.x - a.x, config.node_width + config.rank_gap);
		let node = g.node("a").unwrap();
		assert_eq!(node.target_side, AttachSide::Left);
		assert_eq!(node.source_side, AttachSide::Right);
	}

	#[test]
	fn attach_sides_follow_direction() {
		let g = laid_out(&[("a", "b")], &LayoutConfig::default());
		for node in &g.nodes {
			assert_eq!(node.target_side, AttachSide::Top);
			assert_eq!(node.source_side, AttachSide::Bottom);
		}
	}

	#[test]
	fn barycenter_removes_avoidable_crossing() {
		// a->d and b->c drawn in input order would cross.
		let g = laid_out(&[("a", "d"), ("b", "c"), ("a", "x"), ("b", "y")], &LayoutConfig::default());
		let a_left = pos(&g, "a").x < pos(&g, "b").x;
		let d_left = pos(&g, "d").x < pos(&g, "c").x;
		assert_eq!(a_left, d_left);
	}

	#[test]
	fn long_edges_do_not_collapse_nodes() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("a", "b"), ("b", "c"), ("a", "c"), ("a", "d")], &config);
		let same_rank: Vec<_> = g
			.nodes
			.iter()
			.filter(|n| n.position.y == pos(&g, "b").y)
			.collect();
		for (i, m) in same_rank.iter().enumerate() {
			for n in &same_rank[i + 1..] {
				assert!((m.position.x - n.position.x).abs() >= config.node_width);
			}
		}
	}

	#[test]
	fn missing_center_falls_back_to_origin() {
		let mut nodes = graph(&[("a", "b")]).nodes;
		let centers = HashMap::from([("a".to_string(), Point::new(110.0, 40.0))]);
		apply_positions(&mut nodes, &centers, &LayoutConfig::default());
		assert_eq!(nodes[0].position, Point::new(20.0, 20.0));
		assert_eq!(nodes[1].position, Point::ORIGIN);
		assert_eq!(nodes[1].target_side, AttachSide::Top);
	}

	#[test]
	fn edges_outside_node_set_are_ignored() {
		let g = graph(&[("a", "b")]);
		let mut edges = g.edges.clone();
		edges.push(GraphEdge {
			id: "edge-9".into(),
			source: "a".into(),
			target: "ghost".into(),
			..g.edges[0].clone()
		});
		let nodes = layout(&g.nodes, &edges, &LayoutConfig::default());
		assert_eq!(nodes.len(), 2);
	}

	#[test]
	fn isolated_node_is_placed() {
		let nodes = graph(&[("a", "b")]).nodes;
		let lonely = GraphNode {
			id: "lonely".into(),
			label: "lonely".into(),
			..nodes[0].clone()
		};
		let positioned = layout(&[lonely], &[], &LayoutConfig::default());
		assert_eq!(positioned[0].position, Point::new(20.0, 20.0));
	}

	#[test]
	fn vertical_route_bends_halfway() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("p", "a"), ("p", "b")], &config);
		let route = edge_route(g.node("p").unwrap(), g.node("b").unwrap(), &config, SINGLE);
		let p = pos(&g, "p");
		let b = pos(&g, "b");
		assert_eq!(route.len(), 4);
		assert_eq!(route[0], Point::new(p.x + 90.0, p.y + 40.0));
		assert_eq!(route[3], Point::new(b.x + 90.0, b.y));
		assert_eq!(route[1].y, route[2].y);
		assert_eq!(route[1].y, (p.y + 40.0 + b.y) / 2.0);
	}

	#[test]
	fn lanes_number_edges_sharing_endpoints() {
		let g = graph(&[("a", "b"), ("b", "c"), ("a", "b"), ("b", "a"), ("a", "a")]);
		let got: Vec<(usize, usize)> = lanes(&g.edges).iter().map(|l| (l.index, l.count)).collect();
		assert_eq!(got, vec![(0, 2), (0, 1), (1, 2), (0, 1), (0, 1)]);
	}

	#[test]
	fn parallel_edges_do_not_overlap() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("a", "b"), ("a", "b")], &config);
		let (a, b) = (g.node("a").unwrap(), g.node("b").unwrap());
		let l = lanes(&g.edges);
		let first = edge_route(a, b, &config, l[0]);
		let second = edge_route(a, b, &config, l[1]);
		assert_ne!(first, second);
		assert_eq!(second[0].x - first[0].x, LANE_GAP);
		assert_eq!(first[0].y, second[0].y);
		assert_ne!(first[1].y, second[1].y);
		let center = a.position.x + config.node_width / 2.0;
		assert_eq!((first[0].x + second[0].x) / 2.0, center);
	}

	#[rstest]
	#[case::top_to_bottom(Direction::TopToBottom)]
	#[case::left_to_right(Direction::LeftToRight)]
	fn self_loop_goes_around_the_node(#[case] direction: Direction) {
		let config = LayoutConfig {
			direction,
			..LayoutConfig::default()
		};
		let g = laid_out(&[("a", "a"), ("a", "b")], &config);
		let a = g.node("a").unwrap();
		let route = edge_route(a, a, &config, SINGLE);
		assert_eq!(route.len(), 6);
		assert_eq!(route[0], attach_point(a, a.source_side, &config));
		assert_eq!(route[5], attach_point(a, a.target_side, &config));
		let Point { x, y } = a.position;
		for p in &route[1..5] {
			let inside = p.x > x && p.x < x + config.node_width && p.y > y && p.y < y + config.node_height;
			assert!(!inside, "{p:?} lies inside the node");
		}
		let nested = edge_route(a, a, &config, Lane { index: 1, count: 2 });
		assert_ne!(route, nested);
	}

	#[test]
	fn bounds_cover_all_boxes() {
		let config = LayoutConfig::default();
		let g = laid_out(&[("p", "a"), ("p", "b")], &config);
		let (min, max) = bounds(&g.nodes, &config).unwrap();
		for n in &g.nodes {
			assert!(n.position.x >= min.x && n.position.y >= min.y);
			assert!(n.position.x + config.node_width <= max.x);
			assert!(n.position.y + config.node_height <= max.y);
		}
		assert_eq!(bounds(&[], &config), None);
	}

	proptest! {
		#[test]
		fn layout_is_deterministic_and_total(
			pairs in prop::collection::vec(("[a-g]", "[a-g]"), 0..20)
		) {
			let pairs: Vec<(&str, &str)> = pairs.iter().map(|(s, t)| (s.as_str(), t.as_str())).collect();
			let config = LayoutConfig::default();
			let first = laid_out(&pairs, &config);
			let second = laid_out(&pairs, &config);
			prop_assert_eq!(&first, &second);
			prop_assert_eq!(first.nodes.len(), graph(&pairs).nodes.len());
			for n in &first.nodes {
				prop_assert!(n.position.x.is_finite() && n.position.y.is_finite());
			}
		}
	}
}
