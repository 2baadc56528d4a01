//! Problem changes and early termination from another thread.

use std::thread;
use std::time::{Duration, Instant};

use planforge_config::ConstructionPickEarlyType;
use planforge_core::HardSoftScore;
use planforge_scoring::{IncrementalScoreDirector, ScoreDirector};
use planforge_solver::realtime::ProblemChangeResult;
use planforge_solver::{
    AcceptedForager, ChangeMove, ChangeMoveSelector, ClosureProblemChange,
    ConstructionHeuristicPhase, FromSolutionEntitySelector, FromSolutionValueSelector,
    LateAcceptanceAcceptor, LocalSearchPhase, QueuedEntityPlacer, Solver, SolverHandle,
    TimeTermination,
};
use planforge_test::task::{
    employee_range, get_task_employee, set_task_employee, small_assignment, task_director,
    task_score, TaskAssignmentCalculator,
};
use planforge_test::TaskAssignment;

type TaskDirector = IncrementalScoreDirector<TaskAssignment, TaskAssignmentCalculator>;
type TaskMove = ChangeMove<TaskAssignment, usize>;

/// Construction followed by a random late acceptance search that only a
/// time limit or early termination ends.
fn endless_solver() -> Solver<TaskAssignment, TaskDirector> {
    let placer: QueuedEntityPlacer<TaskAssignment, usize, _, _, TaskMove> = QueuedEntityPlacer::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(employee_range),
        get_task_employee,
        set_task_employee,
        0,
        "employee",
    );
    let construction: ConstructionHeuristicPhase<TaskAssignment, TaskDirector, TaskMove, _> =
        ConstructionHeuristicPhase::new(placer, ConstructionPickEarlyType::Never);

    let selector: ChangeMoveSelector<TaskAssignment, usize, _, _> = ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(employee_range),
        get_task_employee,
        set_task_employee,
        0,
        "employee",
    )
    .with_random(true);
    let local_search: LocalSearchPhase<TaskAssignment, TaskDirector, TaskMove, _, _, _> =
        LocalSearchPhase::new(
            selector,
            LateAcceptanceAcceptor::<HardSoftScore>::new(5),
            AcceptedForager::<HardSoftScore>::new(1),
        );

    Solver::new()
        .with_phase(Box::new(construction))
        .with_phase(Box::new(local_search))
        .with_termination(Box::new(TimeTermination::seconds(30)))
        .with_random_seed(1)
}

fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn wait_until_solving(handle: &SolverHandle<TaskAssignment>) {
    assert!(
        wait_until(Duration::from_secs(10), || handle.is_solving()),
        "solver never started"
    );
}

#[test]
fn terminate_early_stops_an_endless_solve() {
    let mut solver = endless_solver();
    let handle = solver.handle();
    let started = Instant::now();

    let solving = thread::spawn(move || {
        let solved = solver.solve(task_director(small_assignment()));
        (solver, solved)
    });

    wait_until_solving(&handle);
    thread::sleep(Duration::from_millis(50));
    assert!(handle.terminate_early());

    let (solver, solved) = solving.join().expect("solver thread panicked");
    let solved = solved.unwrap();
    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(!solver.is_solving());
    assert!(solved.tasks.iter().all(|t| t.employee.is_some()));
    assert_eq!(solved.score, Some(task_score(&solved)));
}

#[test]
fn problem_change_is_applied_between_steps() {
    let mut solver = endless_solver();
    let handle = solver.handle();

    let solving = thread::spawn(move || {
        let solved = solver.solve(task_director(small_assignment()));
        (solver, solved)
    });

    wait_until_solving(&handle);
    let change = ClosureProblemChange::new(
        "ann_learns_to_drive",
        |sd: &mut dyn ScoreDirector<TaskAssignment>| {
            sd.before_problem_property_changed();
            sd.working_solution_mut().employees[0]
                .skills
                .push("drive".to_string());
            sd.after_problem_property_changed();
            Ok(())
        },
    );
    assert_eq!(handle.add_problem_change(change), ProblemChangeResult::Queued);
    assert!(
        wait_until(Duration::from_secs(10), || handle.pending_problem_changes() == 0),
        "problem change was never applied"
    );
    handle.terminate_early();

    let (solver, solved) = solving.join().expect("solver thread panicked");
    let solved = solved.unwrap();
    assert!(solved.employees[0].has_skill("drive"));
    assert_eq!(solved.score, Some(task_score(&solved)));

    // Changes are refused while no solve is running.
    let late = ClosureProblemChange::new("too_late", |_: &mut dyn ScoreDirector<TaskAssignment>| {
        Ok(())
    });
    assert_eq!(
        solver.handle().add_problem_change(late),
        ProblemChangeResult::SolverNotRunning
    );
}

#[test]
fn best_solutions_are_streamed_to_a_channel() {
    let mut solver = endless_solver();
    let mut receiver = solver.best_solution_receiver();
    let handle = solver.handle();

    let solving = thread::spawn(move || solver.solve(task_director(small_assignment())));

    wait_until_solving(&handle);
    thread::sleep(Duration::from_millis(50));
    handle.terminate_early();
    let solved = solving.join().expect("solver thread panicked").unwrap();

    let mut last = None;
    while let Ok(event) = receiver.try_recv() {
        if let Some(previous) = last {
            assert!(event.score > previous);
        }
        last = Some(event.score);
    }
    assert_eq!(last, solved.score);
}
