//! Exhaustive search phase implementation.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planforge_config::NodeExplorationType;
use planforge_core::{PlanForgeError, PlanningSolution, Result, Score};
use planforge_scoring::ScoreDirector;

use super::comparator::comparator_for;
use super::node::{ExhaustiveSearchNode, ExpandableNodeQueue};
use super::ScoreBounder;
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::EntityReference;
use crate::phase::construction::EntityPlacer;
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// The explored tree of one phase run.
struct SearchTree<M, Sc: Score> {
    nodes: Vec<ExhaustiveSearchNode<M, Sc>>,
    queue: ExpandableNodeQueue<Sc>,
    /// The node the working solution currently represents.
    current: usize,
}

impl<M, Sc: Score> SearchTree<M, Sc> {
    fn depth(&self, index: usize) -> usize {
        self.nodes[index].depth()
    }

    fn parent(&self, index: usize) -> usize {
        self.nodes[index].parent_index().unwrap_or(0)
    }
}

/// Outcome of expanding one node.
#[derive(Debug, Default)]
struct Expansion {
    selected: u64,
    accepted: u64,
    node_limit_reached: bool,
}

/// Exhaustive search phase that explores every assignment of the
/// uninitialized entities.
///
/// The tree has one layer per entity of the placer's queue. Nodes are
/// expanded in the order of a [`NodeComparator`](super::NodeComparator);
/// with a [`ScoreBounder`] every subtree whose optimistic bound cannot beat
/// the best pessimistic bound is pruned. Complete assignments are offered
/// to the best solution recaller, and the phase leaves the best solution
/// as the working solution.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
/// * `M` - The move type
/// * `P` - The entity placer type
pub struct ExhaustiveSearchPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
{
    placer: P,
    bounder: Option<Box<dyn ScoreBounder<S>>>,
    exploration: NodeExplorationType,
    node_limit: Option<usize>,
    termination: Option<Box<dyn Termination<S, D>>>,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, D, M, P> ExhaustiveSearchPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    P: EntityPlacer<S, M>,
{
    /// Branch and bound: prunes with `bounder`, explores depth first.
    pub fn branch_and_bound(placer: P, bounder: Box<dyn ScoreBounder<S>>) -> Self {
        Self {
            placer,
            bounder: Some(bounder),
            exploration: NodeExplorationType::DepthFirst,
            node_limit: None,
            termination: None,
            _phantom: PhantomData,
        }
    }

    /// Brute force: visits every node, breadth first.
    pub fn brute_force(placer: P) -> Self {
        Self {
            placer,
            bounder: None,
            exploration: NodeExplorationType::BreadthFirst,
            node_limit: None,
            termination: None,
            _phantom: PhantomData,
        }
    }

    pub fn with_exploration(mut self, exploration: NodeExplorationType) -> Self {
        self.exploration = exploration;
        self
    }

    /// Caps the number of created nodes.
    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    /// Sets a termination that ends this phase only.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S, D>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn exploration(&self) -> NodeExplorationType {
        self.exploration
    }

    /// Moves the working solution from the current node to `target`: undo
    /// moves up to the common ancestor, then moves down.
    fn walk_to(
        tree: &mut SearchTree<M, S::Score>,
        target: usize,
        score_director: &mut dyn ScoreDirector<S>,
    ) {
        let mut up = tree.current;
        let mut down = target;
        let mut descent = Vec::new();
        while tree.depth(up) > tree.depth(down) {
            if let Some(undo) = tree.nodes[up].undo_move() {
                undo.do_move(score_director);
            }
            up = tree.parent(up);
        }
        while tree.depth(down) > tree.depth(up) {
            descent.push(down);
            down = tree.parent(down);
        }
        while up != down {
            if let Some(undo) = tree.nodes[up].undo_move() {
                undo.do_move(score_director);
            }
            up = tree.parent(up);
            descent.push(down);
            down = tree.parent(down);
        }
        for index in descent.into_iter().rev() {
            if let Some(step) = tree.nodes[index].step_move() {
                step.do_move(score_director);
            }
        }
        tree.current = target;
    }

    /// Creates the children of the node the working solution is at.
    fn expand(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        layers: &[EntityReference],
        tree: &mut SearchTree<M, S::Score>,
        node_index: usize,
    ) -> Result<Expansion> {
        let mut expansion = Expansion::default();
        let parent_depth = tree.depth(node_index);
        let Some(&entity) = layers.get(parent_depth) else {
            return Ok(expansion);
        };
        let Some(placement) = self.placer.placement(step_scope.score_director(), entity) else {
            return Ok(expansion);
        };
        let last_layer = parent_depth + 1 == layers.len();

        for m in placement.moves {
            if !m.is_doable(step_scope.score_director()) {
                continue;
            }
            if !last_layer && self.node_limit.is_some_and(|limit| tree.nodes.len() >= limit) {
                expansion.node_limit_reached = true;
                break;
            }
            expansion.selected += 1;

            let undo = m.undo_move(step_scope.score_director());
            m.do_move(step_scope.score_director_mut());
            let score = step_scope.calculate_score();
            step_scope
                .phase_scope_mut()
                .assert_step_score(score, "exhaustive search node")?;

            let mut child_bound = None;
            let mut keep = false;
            if last_layer {
                tree.queue.register_pessimistic_bound(score);
                if step_scope
                    .phase_scope_mut()
                    .update_best_solution_during_move(score)
                {
                    expansion.accepted += 1;
                }
            } else {
                keep = true;
                if let Some(bounder) = &self.bounder {
                    let optimistic =
                        bounder.calculate_optimistic_bound(step_scope.score_director(), score);
                    if tree.queue.pessimistic_bound().is_some_and(|p| optimistic <= p) {
                        keep = false;
                    } else {
                        let pessimistic = bounder
                            .calculate_pessimistic_bound(step_scope.score_director(), score);
                        if pessimistic < optimistic {
                            tree.queue.register_pessimistic_bound(pessimistic);
                        }
                        child_bound = Some(optimistic);
                    }
                }
            }
            undo.do_move(step_scope.score_director_mut());
            step_scope
                .phase_scope_mut()
                .solver_scope_mut()
                .statistics_mut()
                .record_move(keep || last_layer);

            if keep {
                expansion.accepted += 1;
                let breadth_index = tree.nodes.len() as u64;
                let mut child = ExhaustiveSearchNode::child(
                    node_index,
                    parent_depth,
                    breadth_index,
                    entity,
                    m,
                    undo,
                    score,
                );
                if let Some(bound) = child_bound {
                    child.set_optimistic_bound(bound);
                }
                let rank = child.rank();
                tree.nodes.push(child);
                tree.queue.push(rank, tree.nodes.len() - 1);
            }
        }
        step_scope.calculate_score();
        Ok(expansion)
    }

    fn explore(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
        layers: &[EntityReference],
        tree: &mut SearchTree<M, S::Score>,
    ) -> Result<()> {
        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            if phase_scope.process_problem_changes()? {
                // The explored tree no longer matches the problem.
                tracing::info!(
                    event = "exhaustive_search_interrupted",
                    nodes = tree.nodes.len(),
                );
                break;
            }
            let Some(node_index) = tree.queue.pop() else {
                break;
            };
            if tree
                .queue
                .pessimistic_bound()
                .is_some_and(|bound| tree.nodes[node_index].can_prune(&bound))
            {
                continue;
            }
            {
                let (score_director, rng) = phase_scope.director_and_rng();
                self.placer.step_started(score_director, rng)?;
            }

            let mut step_scope = StepScope::new(phase_scope);
            Self::walk_to(tree, node_index, step_scope.score_director_mut());
            let expansion = self.expand(&mut step_scope, layers, tree, node_index)?;
            step_scope.set_move_counts(expansion.selected, expansion.accepted);
            step_scope.complete();

            self.placer.step_ended(phase_scope.score_director_mut())?;
            if expansion.node_limit_reached {
                tracing::warn!(
                    event = "node_limit",
                    node_limit = ?self.node_limit,
                    queued = tree.queue.len(),
                );
                break;
            }
        }
        Ok(())
    }
}

impl<S, D, M, P> Debug for ExhaustiveSearchPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    P: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveSearchPhase")
            .field("placer", &self.placer)
            .field("bounder", &self.bounder)
            .field("exploration", &self.exploration)
            .field("node_limit", &self.node_limit)
            .field("termination", &self.termination)
            .finish()
    }
}

impl<S, D, M, P> Phase<S, D> for ExhaustiveSearchPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    P: EntityPlacer<S, M>,
{
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let (score_director, rng) = solver_scope.director_and_rng();
        self.placer.solving_started(score_director, rng)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        if self.placer.is_never_ending() {
            return Err(PlanForgeError::Config(
                "exhaustive search needs finite entity and value selection".to_string(),
            ));
        }
        let mut phase_scope = PhaseScope::new(solver_scope, self.phase_type_name());
        {
            let (score_director, rng) = phase_scope.director_and_rng();
            self.placer.phase_started(score_director, rng)?;
        }

        let layers = self.placer.entity_queue(phase_scope.score_director());
        if !layers.is_empty() {
            let root_score = phase_scope.calculate_score();
            let mut root = ExhaustiveSearchNode::root(root_score);
            let mut queue = ExpandableNodeQueue::new(comparator_for(self.exploration));
            if let Some(bounder) = &self.bounder {
                let director = phase_scope.score_director();
                let optimistic = bounder.calculate_optimistic_bound(director, root_score);
                let pessimistic = bounder.calculate_pessimistic_bound(director, root_score);
                root.set_optimistic_bound(optimistic);
                if pessimistic < optimistic {
                    queue.register_pessimistic_bound(pessimistic);
                }
            }
            queue.push(root.rank(), 0);
            let mut tree = SearchTree {
                nodes: vec![root],
                queue,
                current: 0,
            };

            let explored = self.explore(&mut phase_scope, &layers, &mut tree);
            tracing::debug!(
                event = "exhaustive_search_tree",
                layers = layers.len(),
                nodes = tree.nodes.len(),
                unexplored = tree.queue.len(),
            );
            explored?;
            phase_scope.solver_scope_mut().restore_best_solution();
        }

        self.placer.phase_ended(phase_scope.score_director_mut())?;
        phase_scope.phase_ended();
        Ok(())
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        self.placer.solving_ended(solver_scope.score_director_mut())
    }

    fn phase_type_name(&self) -> &'static str {
        "ExhaustiveSearch"
    }
}
