//! Finalist podiums: which of a step's moves are candidates for the pick.

use std::fmt::Debug;

use planforge_config::FinalistPodiumType;
use planforge_core::Score;

/// A move that made it onto the podium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalist<Sc> {
    /// Index of the move among the step's evaluated moves.
    pub index: usize,
    pub score: Sc,
    pub accepted: bool,
}

/// Keeps the best moves of a step.
///
/// Unaccepted moves are only kept until the first accepted move arrives,
/// which clears them; from then on unaccepted moves are ignored.
pub trait FinalistPodium<Sc: Score>: Send + Debug {
    fn step_started(&mut self, last_step_score: Sc, best_score: Sc);

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool);

    /// The finalists in the order they were added.
    fn finalists(&self) -> &[Finalist<Sc>];
}

impl<Sc: Score> FinalistPodium<Sc> for Box<dyn FinalistPodium<Sc>> {
    fn step_started(&mut self, last_step_score: Sc, best_score: Sc) {
        (**self).step_started(last_step_score, best_score)
    }

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool) {
        (**self).add_move(index, score, accepted)
    }

    fn finalists(&self) -> &[Finalist<Sc>] {
        (**self).finalists()
    }
}

/// Creates the podium for a configured type.
pub fn podium_for<Sc: Score>(podium_type: FinalistPodiumType) -> Box<dyn FinalistPodium<Sc>> {
    match podium_type {
        FinalistPodiumType::HighestScore => Box::new(HighestScoreFinalistPodium::new()),
        FinalistPodiumType::StrategicOscillation
        | FinalistPodiumType::StrategicOscillationByLevel => {
            Box::new(StrategicOscillationFinalistPodium::new(false))
        }
        FinalistPodiumType::StrategicOscillationByLevelOnBestScore => {
            Box::new(StrategicOscillationFinalistPodium::new(true))
        }
    }
}

/// Shared bookkeeping: the finalist list and whether it holds accepted
/// moves.
#[derive(Debug, Clone)]
struct Finalists<Sc> {
    finalists: Vec<Finalist<Sc>>,
    finalist_is_accepted: bool,
}

impl<Sc: Score> Finalists<Sc> {
    fn new() -> Self {
        Self {
            finalists: Vec::new(),
            finalist_is_accepted: false,
        }
    }

    fn clear(&mut self) {
        self.finalists.clear();
        self.finalist_is_accepted = false;
    }

    /// Returns false if the move must be ignored. Clears the unaccepted
    /// finalists when the first accepted move arrives.
    fn admit(&mut self, accepted: bool) -> bool {
        if self.finalist_is_accepted && !accepted {
            return false;
        }
        if accepted && !self.finalist_is_accepted {
            self.finalist_is_accepted = true;
            self.finalists.clear();
        }
        true
    }

    fn best_score(&self) -> Option<Sc> {
        self.finalists.first().map(|f| f.score)
    }

    fn replace(&mut self, finalist: Finalist<Sc>) {
        self.finalists.clear();
        self.finalists.push(finalist);
    }
}

/// Keeps every move that ties the highest score.
#[derive(Debug, Clone)]
pub struct HighestScoreFinalistPodium<Sc> {
    inner: Finalists<Sc>,
}

impl<Sc: Score> HighestScoreFinalistPodium<Sc> {
    pub fn new() -> Self {
        Self {
            inner: Finalists::new(),
        }
    }
}

impl<Sc: Score> Default for HighestScoreFinalistPodium<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> FinalistPodium<Sc> for HighestScoreFinalistPodium<Sc> {
    fn step_started(&mut self, _last_step_score: Sc, _best_score: Sc) {
        self.inner.clear();
    }

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool) {
        if !self.inner.admit(accepted) {
            return;
        }
        let finalist = Finalist {
            index,
            score,
            accepted,
        };
        match self.inner.best_score() {
            None => self.inner.replace(finalist),
            Some(best) if score > best => self.inner.replace(finalist),
            Some(best) if score == best => self.inner.finalists.push(finalist),
            Some(_) => {}
        }
    }

    fn finalists(&self) -> &[Finalist<Sc>] {
        &self.inner.finalists
    }
}

/// Strategic oscillation: when nothing improves on the reference score,
/// prefers the move that is higher than the reference on the highest
/// level where the current finalist is not.
///
/// The reference is the last step score, or the best score with
/// `use_best_score`.
///
/// # Example
///
/// ```
/// use planforge_core::HardSoftScore;
/// use planforge_solver::phase::localsearch::{FinalistPodium, StrategicOscillationFinalistPodium};
///
/// let mut podium = StrategicOscillationFinalistPodium::new(false);
/// let reference = HardSoftScore::of(-100, -5000);
/// podium.step_started(reference, reference);
///
/// podium.add_move(0, HardSoftScore::of(-100, -6000), true);
/// podium.add_move(1, HardSoftScore::of(-200, -1000), true);
///
/// // Plainly worse, but it recovers the soft level the first one lost.
/// assert_eq!(podium.finalists()[0].index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct StrategicOscillationFinalistPodium<Sc> {
    use_best_score: bool,
    inner: Finalists<Sc>,
    reference_score: Option<Sc>,
    reference_levels: Vec<i64>,
    finalist_levels: Vec<i64>,
    finalist_improves_upon_reference: bool,
}

impl<Sc: Score> StrategicOscillationFinalistPodium<Sc> {
    pub fn new(use_best_score: bool) -> Self {
        Self {
            use_best_score,
            inner: Finalists::new(),
            reference_score: None,
            reference_levels: Vec::new(),
            finalist_levels: Vec::new(),
            finalist_improves_upon_reference: false,
        }
    }

    fn compare(&self, score: Sc, levels: &[i64]) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        let Some(finalist_score) = self.inner.best_score() else {
            return Ordering::Greater;
        };
        let worse_than_reference = self.reference_score.is_some_and(|reference| score < reference);
        if !self.finalist_improves_upon_reference && worse_than_reference {
            let levels = levels
                .iter()
                .zip(&self.finalist_levels)
                .zip(&self.reference_levels);
            for ((move_level, finalist_level), reference_level) in levels {
                let move_is_higher = move_level > reference_level;
                let finalist_is_higher = finalist_level > reference_level;
                match (move_is_higher, finalist_is_higher) {
                    (true, true) => break,
                    (true, false) => return Ordering::Greater,
                    (false, true) => return Ordering::Less,
                    (false, false) => {}
                }
            }
        }
        score.cmp(&finalist_score)
    }
}

impl<Sc: Score> FinalistPodium<Sc> for StrategicOscillationFinalistPodium<Sc> {
    fn step_started(&mut self, last_step_score: Sc, best_score: Sc) {
        let reference = if self.use_best_score {
            best_score
        } else {
            last_step_score
        };
        self.reference_score = Some(reference);
        self.reference_levels = reference.to_level_numbers();
        self.finalist_levels.clear();
        self.finalist_improves_upon_reference = false;
        self.inner.clear();
    }

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool) {
        if !self.inner.admit(accepted) {
            return;
        }
        let levels = score.to_level_numbers();
        let finalist = Finalist {
            index,
            score,
            accepted,
        };
        match self.compare(score, &levels) {
            std::cmp::Ordering::Greater => {
                self.finalist_improves_upon_reference =
                    self.reference_score.is_some_and(|reference| score > reference);
                self.finalist_levels = levels;
                self.inner.replace(finalist);
            }
            std::cmp::Ordering::Equal => self.inner.finalists.push(finalist),
            std::cmp::Ordering::Less => {}
        }
    }

    fn finalists(&self) -> &[Finalist<Sc>] {
        &self.inner.finalists
    }
}

#[cfg(test)]
mod tests {
    use planforge_core::{HardSoftScore, SimpleScore};

    use super::*;

    #[test]
    fn test_highest_score_keeps_ties() {
        let mut podium = HighestScoreFinalistPodium::new();
        podium.step_started(SimpleScore::of(0), SimpleScore::of(0));
        podium.add_move(0, SimpleScore::of(-3), true);
        podium.add_move(1, SimpleScore::of(-1), true);
        podium.add_move(2, SimpleScore::of(-2), true);
        podium.add_move(3, SimpleScore::of(-1), true);

        let indices: Vec<_> = podium.finalists().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_unaccepted_kept_until_first_accepted() {
        let mut podium = HighestScoreFinalistPodium::new();
        podium.step_started(SimpleScore::of(0), SimpleScore::of(0));
        podium.add_move(0, SimpleScore::of(5), false);
        assert_eq!(podium.finalists().len(), 1);
        assert!(!podium.finalists()[0].accepted);

        podium.add_move(1, SimpleScore::of(-10), true);
        podium.add_move(2, SimpleScore::of(50), false);
        assert_eq!(podium.finalists(), &[Finalist { index: 1, score: SimpleScore::of(-10), accepted: true }]);
    }

    #[test]
    fn test_step_started_clears() {
        let mut podium = HighestScoreFinalistPodium::new();
        podium.step_started(SimpleScore::of(0), SimpleScore::of(0));
        podium.add_move(0, SimpleScore::of(1), true);
        podium.step_started(SimpleScore::of(1), SimpleScore::of(1));
        assert!(podium.finalists().is_empty());
    }

    #[test]
    fn test_strategic_oscillation_by_level() {
        let mut podium = StrategicOscillationFinalistPodium::new(false);
        let reference = HardSoftScore::of(-200, -5000);
        podium.step_started(reference, reference);

        podium.add_move(0, HardSoftScore::of(-150, -2000), true);
        podium.add_move(1, HardSoftScore::of(-100, -7000), true);
        podium.add_move(2, HardSoftScore::of(-100, -7100), true);
        podium.add_move(3, HardSoftScore::of(-200, -1000), true);

        assert_eq!(podium.finalists().len(), 1);
        assert_eq!(podium.finalists()[0].score, HardSoftScore::of(-100, -7000));
    }

    #[test]
    fn test_strategic_oscillation_prefers_recovered_level() {
        let mut highest = HighestScoreFinalistPodium::new();
        let mut oscillating = StrategicOscillationFinalistPodium::new(false);
        let reference = HardSoftScore::of(-100, -5000);
        highest.step_started(reference, reference);
        oscillating.step_started(reference, reference);

        for (index, score) in [HardSoftScore::of(-100, -6000), HardSoftScore::of(-200, -1000)]
            .into_iter()
            .enumerate()
        {
            highest.add_move(index, score, true);
            oscillating.add_move(index, score, true);
        }

        assert_eq!(highest.finalists()[0].index, 0);
        assert_eq!(oscillating.finalists()[0].index, 1);
    }

    #[test]
    fn test_strategic_oscillation_on_best_score_uses_best() {
        let mut podium = StrategicOscillationFinalistPodium::new(true);
        // Against the last step both moves improve; against the best
        // score neither does.
        podium.step_started(HardSoftScore::of(-300, -9000), HardSoftScore::of(-100, -5000));
        podium.add_move(0, HardSoftScore::of(-100, -6000), true);
        podium.add_move(1, HardSoftScore::of(-200, -1000), true);
        assert_eq!(podium.finalists()[0].index, 1);

        let mut on_last_step = StrategicOscillationFinalistPodium::new(false);
        on_last_step.step_started(HardSoftScore::of(-300, -9000), HardSoftScore::of(-100, -5000));
        on_last_step.add_move(0, HardSoftScore::of(-100, -6000), true);
        on_last_step.add_move(1, HardSoftScore::of(-200, -1000), true);
        assert_eq!(on_last_step.finalists()[0].index, 0);
    }

    #[test]
    fn test_podium_for_types() {
        let podium: Box<dyn FinalistPodium<SimpleScore>> =
            podium_for(FinalistPodiumType::StrategicOscillationByLevelOnBestScore);
        assert!(format!("{:?}", podium).contains("use_best_score: true"));
    }
}
