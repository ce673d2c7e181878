use std::collections::HashMap;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, trace};

use crate::common::{EnvironmentOptions, Point, SearchResult, TieBreak};
use crate::map::{GridMap, MapError};
use crate::solver::{path, theta};
use crate::stat::Stats;

pub(crate) const SQRT_TWO: f64 = std::f64::consts::SQRT_2;

/// One search state. `parent` is an index into the closed-set arena of the
/// run that produced this node; arena entries are append-only for the whole
/// run, so the index stays valid for every later successor.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub i: i32,
    pub j: i32,
    pub f: f64,
    pub g: f64,
    pub h: f64,
    pub parent: Option<usize>,
}

impl Node {
    pub fn pos(&self) -> Point {
        (self.i, self.j)
    }
}

/// Parent assignment applied to fresh successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentStrategy {
    /// Successor keeps the expanded node as its parent.
    Baseline,
    /// Successor is re-parented to its grandparent when line of sight holds.
    AnyAngle,
}

/// Expanded nodes, keyed by coordinate. Append-only during a run.
#[derive(Debug, Default)]
pub(crate) struct ClosedList {
    arena: Vec<Node>,
    index: HashMap<Point, usize>,
}

impl ClosedList {
    pub(crate) fn insert(&mut self, node: Node) -> usize {
        let idx = self.arena.len();
        self.index.insert(node.pos(), idx);
        self.arena.push(node);
        idx
    }

    pub(crate) fn contains(&self, pos: Point) -> bool {
        self.index.contains_key(&pos)
    }

    pub(crate) fn get(&self, idx: usize) -> &Node {
        &self.arena[idx]
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.arena
    }
}

/// Frontier of discovered, not-yet-expanded nodes, bucketed by row. Each
/// bucket is kept sorted by F (tie-break as secondary order), so the global
/// minimum is always among the bucket heads.
#[derive(Debug)]
pub(crate) struct OpenList {
    rows: Vec<Vec<Node>>,
    size: usize,
    tie_break: TieBreak,
}

impl OpenList {
    pub(crate) fn new(height: i32, tie_break: TieBreak) -> Self {
        OpenList {
            rows: vec![Vec::new(); height.max(0) as usize],
            size: 0,
            tie_break,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    fn beats(&self, challenger: &Node, best: &Node) -> bool {
        if challenger.f < best.f {
            return true;
        }
        if challenger.f > best.f {
            return false;
        }
        match self.tie_break {
            TieBreak::GMax => challenger.g >= best.g,
            TieBreak::GMin => challenger.g < best.g,
        }
    }

    /// Minimum-F entry over all bucket heads under the configured tie-break.
    pub(crate) fn find_min(&self) -> Option<Node> {
        let mut min: Option<&Node> = None;
        for row in &self.rows {
            let Some(head) = row.first() else { continue };
            min = match min {
                Some(best) if !self.beats(head, best) => Some(best),
                _ => Some(head),
            };
        }
        min.cloned()
    }

    /// Removes the entry matching `target` by coordinate *and* F/g, so a
    /// stale duplicate is never removed in its place.
    pub(crate) fn remove_exact(&mut self, target: &Node) -> bool {
        let row = &mut self.rows[target.i as usize];
        match row.iter().position(|n| {
            n.i == target.i && n.j == target.j && n.f == target.f && n.g == target.g
        }) {
            Some(at) => {
                row.remove(at);
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Open-set update rule: closed coordinates are rejected outright, a
    /// same-coordinate entry survives only with the smaller g, and the
    /// insert keeps the bucket sorted by F then tie-break.
    pub(crate) fn push(&mut self, node: Node, closed: &ClosedList) {
        if closed.contains(node.pos()) {
            return;
        }

        let tie_break = self.tie_break;
        let row = &mut self.rows[node.i as usize];

        if let Some(existing) = row.iter().position(|n| n.j == node.j) {
            if row[existing].g <= node.g {
                return;
            }
            row.remove(existing);
            self.size -= 1;
        }

        let mut at = row.len();
        for (idx, other) in row.iter().enumerate() {
            let wins_tie = match tie_break {
                TieBreak::GMax => node.g >= other.g,
                TieBreak::GMin => node.g < other.g,
            };
            if node.f < other.f || (node.f == other.f && wins_tie) {
                at = idx;
                break;
            }
        }
        row.insert(at, node);
        self.size += 1;
    }

    fn iter(&self) -> impl Iterator<Item = &Node> {
        self.rows.iter().flatten()
    }
}

/// Open/closed view handed to a `SearchObserver`.
pub struct SearchSnapshot<'a> {
    pub open: Vec<&'a Node>,
    pub closed: &'a [Node],
    pub finished: bool,
}

/// Optional sink notified after every expansion and once at termination.
/// Absence never changes search behavior or outcome.
pub trait SearchObserver {
    fn on_open_closed(&mut self, snapshot: &SearchSnapshot);
}

/// Observer that mirrors expansion snapshots into the tracing stream.
#[derive(Debug, Default)]
pub struct TraceLogger;

impl SearchObserver for TraceLogger {
    fn on_open_closed(&mut self, snapshot: &SearchSnapshot) {
        debug!(
            open = snapshot.open.len(),
            closed = snapshot.closed.len(),
            finished = snapshot.finished,
            "search step"
        );
        trace!("open list {:#?}", snapshot.open);
    }
}

/// Shared expansion loop behind both solvers. Owns all mutable search state
/// for exactly one invocation.
pub(crate) struct SearchRunner<'a> {
    map: &'a GridMap,
    options: &'a EnvironmentOptions,
    hweight: f64,
    strategy: ParentStrategy,
    open: OpenList,
    closed: ClosedList,
}

impl<'a> SearchRunner<'a> {
    pub(crate) fn new(
        map: &'a GridMap,
        options: &'a EnvironmentOptions,
        hweight: f64,
        tie_break: TieBreak,
        strategy: ParentStrategy,
    ) -> Self {
        SearchRunner {
            map,
            options,
            hweight,
            strategy,
            open: OpenList::new(map.height(), tie_break),
            closed: ClosedList::default(),
        }
    }

    pub(crate) fn run(
        mut self,
        mut observer: Option<&mut dyn SearchObserver>,
    ) -> Result<SearchResult> {
        let started = Instant::now();
        let goal = self.map.goal();

        let start = self.map.start();
        let start_h = self.options.metric.distance(start, goal);
        self.open.push(
            Node {
                i: start.0,
                j: start.1,
                g: 0.0,
                h: start_h,
                f: self.hweight * start_h,
                parent: None,
            },
            &self.closed,
        );

        let mut stats = Stats::default();
        let mut goal_idx = None;

        while let Some(current) = self.open.find_min() {
            if !self.open.remove_exact(&current) && self.closed.contains(current.pos()) {
                // Stale entry left over from a replaced duplicate; skip it.
                continue;
            }

            debug!("expand node: {current:?}");
            let current_idx = self.closed.insert(current.clone());
            stats.expansions += 1;

            if current.pos() == goal {
                goal_idx = Some(current_idx);
                break;
            }

            for mut successor in self.successors(&current)? {
                successor.parent = Some(current_idx);
                if self.strategy == ParentStrategy::AnyAngle {
                    successor = theta::reset_parent(
                        successor,
                        current_idx,
                        &self.closed,
                        self.map,
                        self.options,
                    )?;
                }
                successor.h = self.options.metric.distance(successor.pos(), goal);
                successor.f = successor.g + self.hweight * successor.h;
                self.open.push(successor, &self.closed);
            }

            if let Some(obs) = observer.as_mut() {
                obs.on_open_closed(&SearchSnapshot {
                    open: self.open.iter().collect(),
                    closed: self.closed.nodes(),
                    finished: false,
                });
            }
        }

        if let Some(obs) = observer.as_mut() {
            obs.on_open_closed(&SearchSnapshot {
                open: self.open.iter().collect(),
                closed: self.closed.nodes(),
                finished: true,
            });
        }

        stats.nodes_created = self.closed.len() + self.open.len();

        let mut result = SearchResult {
            found: false,
            cost: 0.0,
            stats,
            waypoints: Vec::new(),
            cells: Vec::new(),
        };
        if let Some(goal_idx) = goal_idx {
            result.found = true;
            result.cost = self.closed.get(goal_idx).g;
            result.waypoints = path::waypoint_path(self.closed.nodes(), goal_idx);
            result.cells = path::cell_path(&result.waypoints);
        }
        result.stats.time_us = started.elapsed().as_micros() as u64;
        Ok(result)
    }

    /// 8-neighborhood successor generation under the diagonal and
    /// corner-cutting policies. Closed coordinates never come back.
    fn successors(&self, current: &Node) -> Result<Vec<Node>, MapError> {
        let mut successors = Vec::new();
        for di in -1..=1 {
            for dj in -1..=1 {
                if di == 0 && dj == 0 {
                    continue;
                }
                let (ni, nj) = (current.i + di, current.j + dj);
                if !self.map.in_bounds(ni, nj) || self.map.is_obstacle(ni, nj)? {
                    continue;
                }

                let diagonal = di != 0 && dj != 0;
                if diagonal {
                    if !self.options.allow_diagonal {
                        continue;
                    }
                    if !self.options.cut_corners
                        && (self.map.is_obstacle(current.i, nj)?
                            || self.map.is_obstacle(ni, current.j)?)
                    {
                        continue;
                    }
                }

                if self.closed.contains((ni, nj)) {
                    continue;
                }

                successors.push(Node {
                    i: ni,
                    j: nj,
                    g: current.g + if diagonal { SQRT_TWO } else { 1.0 },
                    h: 0.0,
                    f: 0.0,
                    parent: None,
                });
            }
        }
        Ok(successors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: i32, j: i32, f: f64, g: f64) -> Node {
        Node {
            i,
            j,
            f,
            g,
            h: 0.0,
            parent: None,
        }
    }

    #[test]
    fn test_push_keeps_cheaper_duplicate() {
        let closed = ClosedList::default();
        let mut open = OpenList::new(4, TieBreak::GMax);

        open.push(node(1, 1, 10.0, 4.0), &closed);
        open.push(node(1, 1, 12.0, 6.0), &closed);
        assert_eq!(open.len(), 1);
        assert_eq!(open.find_min().unwrap().g, 4.0);

        open.push(node(1, 1, 8.0, 2.0), &closed);
        assert_eq!(open.len(), 1);
        assert_eq!(open.find_min().unwrap().g, 2.0);
    }

    #[test]
    fn test_push_rejects_closed_coordinate() {
        let mut closed = ClosedList::default();
        closed.insert(node(2, 3, 5.0, 5.0));

        let mut open = OpenList::new(4, TieBreak::GMax);
        open.push(node(2, 3, 1.0, 1.0), &closed);
        assert_eq!(open.len(), 0);
        assert!(open.find_min().is_none());
    }

    #[test]
    fn test_tie_break_prefers_larger_g_under_gmax() {
        let closed = ClosedList::default();
        let mut open = OpenList::new(4, TieBreak::GMax);
        open.push(node(0, 0, 10.0, 2.0), &closed);
        open.push(node(0, 1, 10.0, 7.0), &closed);
        assert_eq!(open.find_min().unwrap().pos(), (0, 1));

        let mut open = OpenList::new(4, TieBreak::GMin);
        open.push(node(0, 0, 10.0, 2.0), &closed);
        open.push(node(0, 1, 10.0, 7.0), &closed);
        assert_eq!(open.find_min().unwrap().pos(), (0, 0));
    }

    #[test]
    fn test_remove_exact_ignores_mismatched_costs() {
        let closed = ClosedList::default();
        let mut open = OpenList::new(4, TieBreak::GMax);
        open.push(node(1, 1, 10.0, 4.0), &closed);

        assert!(!open.remove_exact(&node(1, 1, 9.0, 4.0)));
        assert_eq!(open.len(), 1);
        assert!(open.remove_exact(&node(1, 1, 10.0, 4.0)));
        assert_eq!(open.len(), 0);
    }

    #[test]
    fn test_min_scans_across_row_buckets() {
        let closed = ClosedList::default();
        let mut open = OpenList::new(4, TieBreak::GMax);
        open.push(node(3, 0, 9.0, 1.0), &closed);
        open.push(node(0, 0, 7.0, 1.0), &closed);
        open.push(node(2, 0, 8.0, 1.0), &closed);
        assert_eq!(open.find_min().unwrap().pos(), (0, 0));
    }
}
