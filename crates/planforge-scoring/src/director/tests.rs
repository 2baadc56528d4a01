//! Tests for the director module.

use std::collections::HashMap;

use planforge_core::domain::{
    EntityDescriptor, LookUpKey, LookUpStrategyType, ShadowVariableContext,
    SingletonInverseDemand, SingletonInverseSupply, SolutionDescriptor, VariableDescriptor,
    VariableListener,
};
use planforge_core::score::HardSoftScore;
use planforge_core::{PlanForgeError, PlanningId, PlanningSolution, Score};

use super::*;

#[derive(Clone, Debug)]
struct Shift {
    id: i64,
    employee: Option<usize>,
    cost: i64,
}

#[derive(Clone, Debug)]
struct Roster {
    shifts: Vec<Shift>,
    score: Option<HardSoftScore>,
}

impl PlanningSolution for Roster {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

fn roster(employees: &[Option<usize>]) -> Roster {
    Roster {
        shifts: employees
            .iter()
            .enumerate()
            .map(|(i, &employee)| Shift {
                id: 10 + i as i64,
                employee,
                cost: 0,
            })
            .collect(),
        score: None,
    }
}

fn descriptor() -> SolutionDescriptor<Roster> {
    SolutionDescriptor::new("Roster").with_entity(
        EntityDescriptor::new("Shift", |s: &Roster| s.shifts.len())
            .with_planning_id(|s: &Roster, i| LookUpKey::from(s.shifts[i].id))
            .with_variable(VariableDescriptor::genuine("employee", |s: &Roster, i| {
                s.shifts[i].employee.is_some()
            }))
            .with_variable(VariableDescriptor::shadow("cost", &["employee"])),
    )
}

/// Keeps `cost = 10 * employee`.
#[derive(Clone)]
struct CostListener;

impl VariableListener<Roster> for CostListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ShadowVariableContext<'_, Roster>,
        entity_index: usize,
    ) {
        let cost = ctx.solution().shifts[entity_index]
            .employee
            .map_or(0, |e| e as i64 * 10);
        ctx.change_shadow(0, entity_index, "cost", |roster| {
            roster.shifts[entity_index].cost = cost;
        });
    }
}

fn full_score(roster: &Roster) -> HardSoftScore {
    let mut conflicts = 0;
    for (i, a) in roster.shifts.iter().enumerate() {
        for b in &roster.shifts[i + 1..] {
            if a.employee.is_some() && a.employee == b.employee {
                conflicts += 1;
            }
        }
    }
    let cost: i64 = roster.shifts.iter().map(|s| s.cost).sum();
    HardSoftScore::of(-conflicts, -cost)
}

#[derive(Clone, Default)]
struct RosterCalculator {
    per_employee: HashMap<usize, i64>,
    conflicts: i64,
    cost: i64,
}

impl IncrementalScoreCalculator<Roster> for RosterCalculator {
    fn reset_working_solution(&mut self, solution: &Roster) {
        *self = RosterCalculator::default();
        for shift in &solution.shifts {
            self.insert_employee(shift.employee);
            self.cost += shift.cost;
        }
    }

    fn before_variable_changed(&mut self, solution: &Roster, _: usize, entity_index: usize, name: &'static str) {
        let shift = &solution.shifts[entity_index];
        match name {
            "employee" => self.retract_employee(shift.employee),
            "cost" => self.cost -= shift.cost,
            _ => {}
        }
    }

    fn after_variable_changed(&mut self, solution: &Roster, _: usize, entity_index: usize, name: &'static str) {
        let shift = &solution.shifts[entity_index];
        match name {
            "employee" => self.insert_employee(shift.employee),
            "cost" => self.cost += shift.cost,
            _ => {}
        }
    }

    fn calculate_score(&mut self) -> HardSoftScore {
        HardSoftScore::of(-self.conflicts, -self.cost)
    }
}

impl RosterCalculator {
    fn insert_employee(&mut self, employee: Option<usize>) {
        if let Some(e) = employee {
            let count = self.per_employee.entry(e).or_insert(0);
            self.conflicts += *count;
            *count += 1;
        }
    }

    fn retract_employee(&mut self, employee: Option<usize>) {
        if let Some(e) = employee {
            let count = self.per_employee.entry(e).or_insert(0);
            *count -= 1;
            self.conflicts -= *count;
        }
    }
}

fn assign(director: &mut dyn ScoreDirector<Roster>, shift: usize, employee: Option<usize>) {
    director.before_variable_changed(0, shift, "employee");
    director.working_solution_mut().shifts[shift].employee = employee;
    director.after_variable_changed(0, shift, "employee");
}

fn incremental(employees: &[Option<usize>]) -> IncrementalScoreDirector<Roster, RosterCalculator> {
    IncrementalScoreDirector::new(roster(employees), descriptor(), RosterCalculator::default())
        .with_listener(0, &["employee"], CostListener)
}

mod simple_director {
    use super::*;

    fn simple(employees: &[Option<usize>]) -> SimpleScoreDirector<Roster, fn(&Roster) -> HardSoftScore> {
        SimpleScoreDirector::new(roster(employees), descriptor(), full_score as fn(&Roster) -> HardSoftScore)
            .with_listener(0, &["employee"], CostListener)
    }

    #[test]
    fn test_init_score_counts_unassigned_shifts() {
        let mut director = simple(&[Some(0), None, Some(0)]);
        assert_eq!(director.uninitialized_variable_count(), 1);
        assert_eq!(
            director.calculate_score(),
            HardSoftScore::of_uninitialized(-1, -1, 0)
        );

        assign(&mut director, 1, Some(2));
        assert_eq!(director.uninitialized_variable_count(), 0);
        assert_eq!(director.calculate_score(), HardSoftScore::of(-1, -20));
        assert_eq!(
            director.working_solution().score(),
            Some(HardSoftScore::of(-1, -20))
        );
    }

    #[test]
    fn test_score_cached_until_change() {
        let mut director = simple(&[Some(0), Some(1)]);
        director.calculate_score();
        director.calculate_score();
        assert_eq!(director.calculation_count(), 1);

        assign(&mut director, 0, Some(1));
        assert_eq!(director.calculate_score(), HardSoftScore::of(-1, -20));
        assert_eq!(director.calculation_count(), 2);
    }

    #[test]
    fn test_unassigning_restores_init_score() {
        let mut director = simple(&[Some(0), Some(1)]);
        assign(&mut director, 0, None);
        assert_eq!(director.calculate_score().init_score(), -1);
    }
}

mod incremental_director {
    use super::*;

    #[test]
    fn test_matches_from_scratch_after_each_change() {
        let mut director = incremental(&[None, None, None, None]);
        let steps = [(0, Some(1)), (1, Some(1)), (2, Some(3)), (1, Some(3)), (3, Some(1)), (0, None)];
        for (shift, employee) in steps {
            assign(&mut director, shift, employee);
            let score = director.calculate_score();
            director
                .assert_working_score_from_scratch(score, "after assign")
                .unwrap();
        }
        assert_eq!(director.calculate_score(), HardSoftScore::of_uninitialized(-1, -1, -70));
    }

    #[test]
    fn test_shadow_changes_reach_calculator() {
        let mut director = incremental(&[Some(1), Some(2)]);
        assert_eq!(director.calculate_score(), HardSoftScore::of(0, -30));
        assign(&mut director, 0, Some(4));
        assert_eq!(director.calculate_score(), HardSoftScore::of(0, -60));
        assert_eq!(director.working_solution().shifts[0].cost, 40);
    }

    #[test]
    fn test_unnotified_change_is_score_corruption() {
        let mut director = incremental(&[Some(0), Some(1), Some(0)]);
        director.calculate_score();
        director.working_solution_mut().shifts[0].employee = Some(5);
        let score = director.calculate_score();
        let result = director.assert_working_score_from_scratch(score, "raw mutation");
        assert!(matches!(
            result,
            Err(PlanForgeError::ScoreCorruption { ref context, .. }) if context == "raw mutation"
        ));
    }

    #[test]
    fn test_entity_added() {
        let mut director = incremental(&[Some(0)]);
        director.before_entity_added(0, 1);
        director.working_solution_mut().shifts.push(Shift {
            id: 99,
            employee: None,
            cost: 0,
        });
        director.after_entity_added(0, 1);

        assert_eq!(director.uninitialized_variable_count(), 1);
        assert_eq!(
            director.look_up_working_entity(0, &LookUpKey::Int(99)).unwrap(),
            1
        );
        assert_eq!(director.calculate_score(), HardSoftScore::of_uninitialized(-1, 0, 0));
    }
}

mod recording_director {
    use super::*;

    #[test]
    fn test_undo_restores_solution_and_score() {
        let mut director = incremental(&[Some(0), Some(1), Some(2)]);
        let original = director.calculate_score();

        let mut recording = RecordingScoreDirector::new(&mut director);
        for (shift, employee) in [(0, Some(1)), (2, None)] {
            let old = recording.working_solution().shifts[shift].employee;
            assign(&mut recording, shift, employee);
            recording.register_undo(Box::new(move |r: &mut Roster| r.shifts[shift].employee = old));
        }
        assert_eq!(recording.change_count(), 2);
        assert_ne!(recording.calculate_score(), original);

        recording.undo_changes();
        assert!(recording.is_empty());
        assert_eq!(recording.calculate_score(), original);

        let shifts = &director.working_solution().shifts;
        assert_eq!(shifts[0].employee, Some(0));
        assert_eq!(shifts[2].employee, Some(2));
        assert_eq!(shifts[2].cost, 20);
        director.assert_working_score_from_scratch(original, "undo").unwrap();
    }

    #[test]
    fn test_plain_director_ignores_undo() {
        let mut director = incremental(&[Some(0)]);
        director.register_undo(Box::new(|r: &mut Roster| r.shifts.clear()));
        assert_eq!(director.working_solution().shifts.len(), 1);
    }
}

mod lookup {
    use super::*;

    struct ShiftRef {
        id: i64,
    }

    impl PlanningId for ShiftRef {
        type Id = i64;

        fn planning_id(&self) -> i64 {
            self.id
        }
    }

    fn anonymous_descriptor() -> SolutionDescriptor<Roster> {
        SolutionDescriptor::new("Roster").with_entity(
            EntityDescriptor::new("Shift", |s: &Roster| s.shifts.len()).with_variable(
                VariableDescriptor::genuine("employee", |s: &Roster, i| {
                    s.shifts[i].employee.is_some()
                }),
            ),
        )
    }

    #[test]
    fn test_lookup_by_planning_id() {
        let director = incremental(&[Some(0), Some(1)]);
        assert_eq!(director.look_up_working_object(0, &ShiftRef { id: 11 }).unwrap(), 1);
        assert_eq!(
            director
                .look_up_working_object_or_none(0, &ShiftRef { id: 42 })
                .unwrap(),
            None
        );
        assert!(matches!(
            director.look_up_working_object(0, &ShiftRef { id: 42 }),
            Err(PlanForgeError::Lookup(_))
        ));
    }

    #[test]
    fn test_lookup_strategies_without_planning_id() {
        let key = LookUpKey::Int(10);
        let fail_fast =
            IncrementalScoreDirector::new(roster(&[Some(0)]), anonymous_descriptor(), RosterCalculator::default());
        assert!(fail_fast.look_up_working_entity_or_none(0, &key).is_err());

        let or_none = IncrementalScoreDirector::new(roster(&[Some(0)]), anonymous_descriptor(), RosterCalculator::default())
            .with_lookup_strategy(LookUpStrategyType::PlanningIdOrNone);
        assert_eq!(or_none.look_up_working_entity_or_none(0, &key).unwrap(), None);

        let disabled = incremental(&[Some(0)]).with_lookup_strategy(LookUpStrategyType::None);
        assert!(disabled.look_up_working_entity(0, &key).is_err());
    }
}

mod supplies {
    use super::*;

    fn employee_of(roster: &Roster, i: usize) -> Option<usize> {
        roster.shifts[i].employee
    }

    fn shift_count(roster: &Roster) -> usize {
        roster.shifts.len()
    }

    #[test]
    fn test_demanded_supply_follows_changes() {
        let mut director = incremental(&[Some(0), Some(1), None]);
        let demand = SingletonInverseDemand::new(0, "employee", shift_count, employee_of);
        let key = director.demand(&demand);

        let inverse = director
            .supply::<SingletonInverseSupply<Roster, usize>>(&key)
            .unwrap();
        assert_eq!(inverse.inverse_entity(&1), Some(1));

        assign(&mut director, 2, Some(3));
        let inverse = director
            .supply::<SingletonInverseSupply<Roster, usize>>(&key)
            .unwrap();
        assert_eq!(inverse.inverse_entity(&3), Some(2));
    }

    #[test]
    fn test_demands_are_reference_counted() {
        let mut director = incremental(&[Some(0)]);
        let demand = SingletonInverseDemand::new(0, "employee", shift_count, employee_of);
        let key = director.demand(&demand);
        director.demand(&demand);
        assert_eq!(director.supply_manager().active_count(&key), 2);

        assert!(!director.cancel_demand(&key).unwrap());
        assert!(director.cancel_demand(&key).unwrap());
        assert!(director.supply_manager().is_empty());
        assert!(director.cancel_demand(&key).is_err());
    }
}

mod factory {
    use super::*;

    #[test]
    fn test_factory_builds_wired_directors() {
        let factory = IncrementalScoreDirectorFactory::new(descriptor(), RosterCalculator::default())
            .with_listener(0, &["employee"], CostListener);

        let mut director = factory.build_score_director(roster(&[Some(1), Some(1)]));
        assert!(director.is_incremental());
        assert_eq!(director.calculate_score(), HardSoftScore::of(-1, -20));

        let mut copy = director.clone();
        assign(&mut copy, 0, Some(2));
        assert_eq!(copy.calculate_score(), HardSoftScore::of(0, -30));
        assert_eq!(director.calculate_score(), HardSoftScore::of(-1, -20));
    }

    #[test]
    fn test_simple_factory() {
        let factory = SimpleScoreDirectorFactory::new(descriptor(), full_score)
            .with_listener(0, &["employee"], CostListener);
        assert_eq!(factory.solution_descriptor().type_name(), "Roster");

        let mut director = factory.build_score_director(roster(&[Some(3), None]));
        assert_eq!(
            director.calculate_score(),
            HardSoftScore::of_uninitialized(-1, 0, -30)
        );
    }
}
