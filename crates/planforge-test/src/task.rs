//! Task assignment test fixtures.
//!
//! Tasks are assigned to employees. Hard constraints penalize tasks whose
//! required skill the employee lacks and load above an employee's capacity;
//! the soft level spreads the load by penalizing the squared load per
//! employee. Tasks can be pinned to their current employee.
//!
//! The score is kept by [`TaskAssignmentCalculator`], an incremental
//! calculator; [`task_score`] computes the same score from scratch.
//!
//! # Example
//!
//! ```
//! use planforge_scoring::ScoreDirector;
//! use planforge_test::task::{small_assignment, task_director};
//!
//! let mut director = task_director(small_assignment());
//! assert_eq!(director.uninitialized_variable_count(), 6);
//! ```

use std::collections::HashMap;

use planforge_core::domain::{
    EntityDescriptor, ListValueRange, LookUpKey, PlanningEntity, PlanningId, SolutionDescriptor,
    VariableDescriptor,
};
use planforge_core::score::HardSoftScore;
use planforge_core::PlanningSolution;
use planforge_scoring::{
    IncrementalScoreCalculator, IncrementalScoreDirector, IncrementalScoreDirectorFactory,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
    pub capacity: i64,
}

impl Employee {
    pub fn new(id: i64, name: &str, skills: &[&str], capacity: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            capacity,
        }
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// A task entity; `employee` is the planning variable (an employee index).
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: i64,
    pub required_skill: String,
    pub duration: i64,
    pub employee: Option<usize>,
    pub pinned: bool,
}

impl Task {
    pub fn new(id: i64, required_skill: &str, duration: i64) -> Self {
        Self {
            id,
            required_skill: required_skill.to_string(),
            duration,
            employee: None,
            pinned: false,
        }
    }

    /// Assigns the task and pins it there.
    pub fn pinned_to(mut self, employee: usize) -> Self {
        self.employee = Some(employee);
        self.pinned = true;
        self
    }
}

impl PlanningEntity for Task {
    fn is_pinned(&self) -> bool {
        self.pinned
    }
}

impl PlanningId for Task {
    type Id = i64;

    fn planning_id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug)]
pub struct TaskAssignment {
    pub employees: Vec<Employee>,
    pub tasks: Vec<Task>,
    pub score: Option<HardSoftScore>,
}

impl TaskAssignment {
    pub fn new(employees: Vec<Employee>, tasks: Vec<Task>) -> Self {
        Self {
            employees,
            tasks,
            score: None,
        }
    }

    pub fn load_of(&self, employee: usize) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.employee == Some(employee))
            .map(|t| t.duration)
            .sum()
    }
}

impl PlanningSolution for TaskAssignment {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Three employees and six tasks, one of each skill per employee pair.
pub fn small_assignment() -> TaskAssignment {
    TaskAssignment::new(
        vec![
            Employee::new(1, "Ann", &["cook", "clean"], 6),
            Employee::new(2, "Beth", &["drive", "cook"], 6),
            Employee::new(3, "Carl", &["clean", "drive"], 6),
        ],
        vec![
            Task::new(10, "cook", 3),
            Task::new(11, "cook", 2),
            Task::new(12, "clean", 4),
            Task::new(13, "clean", 1),
            Task::new(14, "drive", 3),
            Task::new(15, "drive", 2),
        ],
    )
}

pub fn task_count(s: &TaskAssignment) -> usize {
    s.tasks.len()
}

pub fn get_task_employee(s: &TaskAssignment, idx: usize) -> Option<usize> {
    s.tasks.get(idx).and_then(|t| t.employee)
}

pub fn set_task_employee(s: &mut TaskAssignment, idx: usize, v: Option<usize>) {
    if let Some(task) = s.tasks.get_mut(idx) {
        task.employee = v;
    }
}

pub fn employee_range(s: &TaskAssignment) -> ListValueRange<usize> {
    (0..s.employees.len()).collect()
}

/// Longer tasks are harder to place.
pub fn task_difficulty(s: &TaskAssignment, idx: usize) -> i64 {
    s.tasks[idx].duration
}

/// Descriptor with one entity type `Task` (index 0) and its `employee`
/// variable; pinned tasks report through the entity's pin flag.
pub fn task_descriptor() -> SolutionDescriptor<TaskAssignment> {
    SolutionDescriptor::new("TaskAssignment").with_entity(
        EntityDescriptor::new("Task", task_count)
            .with_pinning(|s: &TaskAssignment, i| s.tasks[i].is_pinned())
            .with_planning_id(|s: &TaskAssignment, i| LookUpKey::from(s.tasks[i].id))
            .with_variable(
                VariableDescriptor::genuine("employee", |s: &TaskAssignment, i| {
                    s.tasks[i].employee.is_some()
                })
                .with_value_range_provider("employees"),
            ),
    )
}

fn overload(load: i64, capacity: i64) -> i64 {
    (load - capacity).max(0)
}

/// Full recalculation of the task assignment score.
pub fn task_score(solution: &TaskAssignment) -> HardSoftScore {
    let mut hard = 0;
    let mut soft = 0;
    for task in &solution.tasks {
        if let Some(e) = task.employee {
            if !solution.employees[e].has_skill(&task.required_skill) {
                hard -= 1;
            }
        }
    }
    for (e, employee) in solution.employees.iter().enumerate() {
        let load = solution.load_of(e);
        hard -= overload(load, employee.capacity);
        soft -= load * load;
    }
    HardSoftScore::of(hard, soft)
}

/// Incremental calculator for [`TaskAssignment`].
///
/// Keeps the load per employee; a variable change retracts the employee's
/// contribution, adjusts the load and inserts it again.
#[derive(Clone, Debug, Default)]
pub struct TaskAssignmentCalculator {
    capacities: Vec<i64>,
    loads: HashMap<usize, i64>,
    skill_mismatches: i64,
    overload: i64,
    squared_load: i64,
}

impl TaskAssignmentCalculator {
    fn retract(&mut self, solution: &TaskAssignment, task: &Task) {
        if let Some(e) = task.employee {
            if !solution.employees[e].has_skill(&task.required_skill) {
                self.skill_mismatches -= 1;
            }
            self.shift_load(e, -task.duration);
        }
    }

    fn insert(&mut self, solution: &TaskAssignment, task: &Task) {
        if let Some(e) = task.employee {
            if !solution.employees[e].has_skill(&task.required_skill) {
                self.skill_mismatches += 1;
            }
            self.shift_load(e, task.duration);
        }
    }

    fn shift_load(&mut self, employee: usize, delta: i64) {
        let capacity = self.capacities.get(employee).copied().unwrap_or(0);
        let load = self.loads.entry(employee).or_insert(0);
        self.overload -= overload(*load, capacity);
        self.squared_load -= *load * *load;
        *load += delta;
        self.overload += overload(*load, capacity);
        self.squared_load += *load * *load;
    }
}

impl IncrementalScoreCalculator<TaskAssignment> for TaskAssignmentCalculator {
    fn reset_working_solution(&mut self, solution: &TaskAssignment) {
        *self = TaskAssignmentCalculator {
            capacities: solution.employees.iter().map(|e| e.capacity).collect(),
            ..TaskAssignmentCalculator::default()
        };
        for task in &solution.tasks {
            self.insert(solution, task);
        }
    }

    fn before_variable_changed(
        &mut self,
        solution: &TaskAssignment,
        _descriptor_index: usize,
        entity_index: usize,
        _variable_name: &'static str,
    ) {
        let task = &solution.tasks[entity_index];
        self.retract(solution, task);
    }

    fn after_variable_changed(
        &mut self,
        solution: &TaskAssignment,
        _descriptor_index: usize,
        entity_index: usize,
        _variable_name: &'static str,
    ) {
        let task = &solution.tasks[entity_index];
        self.insert(solution, task);
    }

    fn calculate_score(&mut self) -> HardSoftScore {
        HardSoftScore::of(-(self.skill_mismatches + self.overload), -self.squared_load)
    }
}

pub fn task_director(
    solution: TaskAssignment,
) -> IncrementalScoreDirector<TaskAssignment, TaskAssignmentCalculator> {
    IncrementalScoreDirector::new(solution, task_descriptor(), TaskAssignmentCalculator::default())
}

pub fn task_factory() -> IncrementalScoreDirectorFactory<TaskAssignment, TaskAssignmentCalculator>
{
    IncrementalScoreDirectorFactory::new(task_descriptor(), TaskAssignmentCalculator::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::Score;
    use planforge_scoring::ScoreDirector;

    fn assign(director: &mut dyn ScoreDirector<TaskAssignment>, task: usize, employee: usize) {
        director.before_variable_changed(0, task, "employee");
        set_task_employee(director.working_solution_mut(), task, Some(employee));
        director.after_variable_changed(0, task, "employee");
    }

    #[test]
    fn test_full_score() {
        let mut solution = small_assignment();
        for (i, e) in [0, 1, 0, 2, 1, 2].into_iter().enumerate() {
            solution.tasks[i].employee = Some(e);
        }
        // Loads 7 / 5 / 3; Ann is over capacity by 1.
        assert_eq!(task_score(&solution), HardSoftScore::of(-1, -(49 + 25 + 9)));
    }

    #[test]
    fn test_incremental_matches_full_score() {
        let mut director = task_director(small_assignment());
        for (task, employee) in [(0, 0), (1, 0), (2, 0), (3, 2), (4, 1), (5, 0)] {
            assign(&mut director, task, employee);
            let incremental = director.calculate_score();
            let expected = task_score(director.working_solution());
            assert_eq!(incremental, expected.with_init_score(incremental.init_score()));
        }
        // Carl cannot cook
        assign(&mut director, 0, 2);
        let score = director.calculate_score();
        assert_eq!(score, task_score(director.working_solution()));
        assert!(score.hard() < 0);
    }

    #[test]
    fn test_pinning() {
        let mut solution = small_assignment();
        solution.tasks[2] = solution.tasks[2].clone().pinned_to(0);
        let descriptor = task_descriptor();
        let entity = descriptor.entity_descriptor(0).map(|d| d.is_pinned(&solution, 2));
        assert_eq!(entity, Some(true));
        assert_eq!(descriptor.count_uninitialized_variables(&solution), 5);
    }
}
