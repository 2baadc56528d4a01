use super::*;

#[derive(Clone, Debug)]
struct Job {
    duration: Option<i64>,
    doubled: i64,
    label: String,
}

#[derive(Clone, Debug)]
struct Plan {
    jobs: Vec<Job>,
}

fn plan(durations: &[Option<i64>]) -> Plan {
    Plan {
        jobs: durations
            .iter()
            .map(|&duration| Job {
                duration,
                doubled: 0,
                label: String::new(),
            })
            .collect(),
    }
}

/// Keeps `doubled = 2 * duration`.
#[derive(Clone)]
struct DoubledListener;

impl VariableListener<Plan> for DoubledListener {
    fn after_variable_changed(&mut self, ctx: &mut ShadowVariableContext<'_, Plan>, entity_index: usize) {
        let doubled = ctx.solution().jobs[entity_index].duration.unwrap_or(0) * 2;
        ctx.change_shadow(0, entity_index, "doubled", |plan| {
            plan.jobs[entity_index].doubled = doubled;
        });
    }
}

/// Keeps `label` in sync with the `doubled` shadow variable.
#[derive(Clone)]
struct LabelListener;

impl VariableListener<Plan> for LabelListener {
    fn after_variable_changed(&mut self, ctx: &mut ShadowVariableContext<'_, Plan>, entity_index: usize) {
        let label = format!("job-{}", ctx.solution().jobs[entity_index].doubled);
        ctx.change_shadow(0, entity_index, "label", |plan| {
            plan.jobs[entity_index].label = label;
        });
    }
}

#[derive(Default)]
struct RecordingObserver {
    events: Vec<(&'static str, usize, &'static str)>,
}

impl ShadowVariableObserver<Plan> for RecordingObserver {
    fn before_shadow_changed(&mut self, _: &Plan, _: usize, entity_index: usize, name: &'static str) {
        self.events.push(("before", entity_index, name));
    }

    fn after_shadow_changed(&mut self, _: &Plan, _: usize, entity_index: usize, name: &'static str) {
        self.events.push(("after", entity_index, name));
    }
}

fn support() -> VariableListenerSupport<Plan> {
    let mut support = VariableListenerSupport::new();
    support.register(0, &["duration"], DoubledListener);
    support.register(0, &["doubled"], LabelListener);
    support
}

fn change_duration(
    support: &mut VariableListenerSupport<Plan>,
    plan: &mut Plan,
    entity_index: usize,
    duration: i64,
) {
    support.before_variable_changed(plan, 0, entity_index, "duration");
    plan.jobs[entity_index].duration = Some(duration);
    support.after_variable_changed(0, entity_index, "duration");
}

#[test]
fn test_after_notifications_wait_for_trigger() {
    let mut support = support();
    let mut plan = plan(&[Some(1), Some(2)]);

    change_duration(&mut support, &mut plan, 1, 5);
    assert!(support.has_pending());
    assert_eq!(plan.jobs[1].doubled, 0);

    let mut observer = RecordingObserver::default();
    support.trigger(&mut plan, &mut observer);
    assert!(!support.has_pending());
    assert_eq!(plan.jobs[1].doubled, 10);
    assert_eq!(plan.jobs[1].label, "job-10");
}

#[test]
fn test_notifications_deduplicated_per_entity() {
    let mut support = support();
    let mut plan = plan(&[Some(1)]);

    change_duration(&mut support, &mut plan, 0, 3);
    change_duration(&mut support, &mut plan, 0, 4);

    let mut observer = NoShadowObserver;
    // One DoubledListener run, then one cascaded LabelListener run.
    assert_eq!(support.trigger(&mut plan, &mut observer), 2);
    assert_eq!(plan.jobs[0].doubled, 8);
}

#[test]
fn test_shadow_changes_reported_in_pairs() {
    let mut support = support();
    let mut plan = plan(&[Some(1), Some(2)]);
    change_duration(&mut support, &mut plan, 0, 7);

    let mut observer = RecordingObserver::default();
    support.trigger(&mut plan, &mut observer);
    assert_eq!(
        observer.events,
        vec![
            ("before", 0, "doubled"),
            ("after", 0, "doubled"),
            ("before", 0, "label"),
            ("after", 0, "label"),
        ]
    );
}

#[test]
fn test_force_all_recomputes_every_entity() {
    let mut support = support();
    let mut plan = plan(&[Some(1), None, Some(3)]);

    support.force_all(|_| plan.jobs.len());
    support.trigger(&mut plan, &mut NoShadowObserver);
    let doubled: Vec<i64> = plan.jobs.iter().map(|j| j.doubled).collect();
    assert_eq!(doubled, vec![2, 0, 6]);
    assert_eq!(plan.jobs[2].label, "job-6");
}

#[test]
fn test_source_matching() {
    let support = support();
    assert!(support.is_source(0, "duration"));
    assert!(support.is_source(0, "doubled"));
    assert!(!support.is_source(0, "label"));
    assert!(!support.is_source(1, "duration"));
    assert_eq!(support.len(), 2);
}

#[test]
fn test_clone_keeps_pending_notifications() {
    let mut support = support();
    let mut plan = plan(&[Some(1)]);
    change_duration(&mut support, &mut plan, 0, 2);

    let mut cloned = support.clone();
    cloned.trigger(&mut plan, &mut NoShadowObserver);
    assert_eq!(plan.jobs[0].doubled, 4);
    assert!(support.has_pending());
    support.clear_pending();
    assert!(!support.has_pending());
}
