//! N-Queens problem test fixtures.
//!
//! Places N queens on an N×N board so that no two queens share a row or a
//! diagonal. Each queen owns one column; its row is the planning variable.
//!
//! # Example
//!
//! ```
//! use planforge_scoring::ScoreDirector;
//! use planforge_test::nqueens::{nqueens_director, uninitialized_director};
//!
//! // Queens at rows [0, 2, 1, 3]
//! let mut director = nqueens_director(&[0, 2, 1, 3]);
//! assert!(director.calculate_score().score() < 0);
//!
//! let empty = uninitialized_director(4);
//! assert_eq!(empty.uninitialized_variable_count(), 4);
//! ```

use planforge_core::domain::{
    EntityDescriptor, ListValueRange, LookUpKey, PlanningEntity, PlanningId, SolutionDescriptor,
    VariableDescriptor,
};
use planforge_core::score::SimpleScore;
use planforge_core::PlanningSolution;
use planforge_scoring::{SimpleScoreDirector, SimpleScoreDirectorFactory};

/// Score function type used by the N-Queens directors.
pub type NQueensScoreFn = fn(&NQueensSolution) -> SimpleScore;

/// A queen entity.
///
/// - `id`: planning id (the column index)
/// - `column`: fixed column on the board
/// - `row`: planning variable, `None` while unassigned
#[derive(Clone, Debug, PartialEq)]
pub struct Queen {
    pub id: i64,
    pub column: i64,
    pub row: Option<i64>,
}

impl Queen {
    pub fn new(id: i64, column: i64, row: Option<i64>) -> Self {
        Self { id, column, row }
    }

    pub fn assigned(id: i64, column: i64, row: i64) -> Self {
        Self::new(id, column, Some(row))
    }

    pub fn unassigned(id: i64, column: i64) -> Self {
        Self::new(id, column, None)
    }
}

impl PlanningEntity for Queen {}

impl PlanningId for Queen {
    type Id = i64;

    fn planning_id(&self) -> i64 {
        self.id
    }
}

/// N-Queens solution: the board size, the queens and the score.
#[derive(Clone, Debug)]
pub struct NQueensSolution {
    pub n: usize,
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl NQueensSolution {
    /// Creates an N-Queens solution with n unassigned queens.
    pub fn uninitialized(n: usize) -> Self {
        let queens = (0..n)
            .map(|i| Queen::unassigned(i as i64, i as i64))
            .collect();
        Self {
            n,
            queens,
            score: None,
        }
    }

    /// Creates a solution with queens at the given rows, one per column.
    pub fn with_rows(rows: &[i64]) -> Self {
        let options: Vec<Option<i64>> = rows.iter().copied().map(Some).collect();
        Self::with_optional_rows(&options)
    }

    pub fn with_optional_rows(rows: &[Option<i64>]) -> Self {
        let queens = rows
            .iter()
            .enumerate()
            .map(|(i, &row)| Queen::new(i as i64, i as i64, row))
            .collect();
        Self {
            n: rows.len(),
            queens,
            score: None,
        }
    }

    pub fn rows(&self) -> Vec<Option<i64>> {
        self.queens.iter().map(|q| q.row).collect()
    }
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

pub fn queen_count(s: &NQueensSolution) -> usize {
    s.queens.len()
}

/// Typed getter for the `row` variable.
pub fn get_queen_row(s: &NQueensSolution, idx: usize) -> Option<i64> {
    s.queens.get(idx).and_then(|q| q.row)
}

/// Typed setter for the `row` variable.
pub fn set_queen_row(s: &mut NQueensSolution, idx: usize, v: Option<i64>) {
    if let Some(queen) = s.queens.get_mut(idx) {
        queen.row = v;
    }
}

/// The rows a queen can take: `0..n`.
pub fn row_range(s: &NQueensSolution) -> ListValueRange<i64> {
    (0..s.n as i64).collect()
}

/// Counts row and diagonal conflicts between all pairs of assigned queens.
///
/// The score is the negated conflict count, so 0 is optimal.
pub fn calculate_conflicts(solution: &NQueensSolution) -> SimpleScore {
    let mut conflicts = 0i64;
    let queens = &solution.queens;

    for i in 0..queens.len() {
        for j in (i + 1)..queens.len() {
            if let (Some(row_i), Some(row_j)) = (queens[i].row, queens[j].row) {
                if row_i == row_j {
                    conflicts += 1;
                }
                let col_diff = (queens[j].column - queens[i].column).abs();
                if (row_i - row_j).abs() == col_diff {
                    conflicts += 1;
                }
            }
        }
    }

    SimpleScore::of(-conflicts)
}

/// Descriptor with one entity type `Queen` (index 0) and its `row` variable.
pub fn nqueens_descriptor() -> SolutionDescriptor<NQueensSolution> {
    SolutionDescriptor::new("NQueensSolution").with_entity(
        EntityDescriptor::new("Queen", queen_count)
            .with_planning_id(|s: &NQueensSolution, i| LookUpKey::from(s.queens[i].id))
            .with_variable(
                VariableDescriptor::genuine("row", |s: &NQueensSolution, i| {
                    s.queens[i].row.is_some()
                })
                .with_value_range_provider("rows"),
            ),
    )
}

/// Creates a director for queens at the given rows.
pub fn nqueens_director(rows: &[i64]) -> SimpleScoreDirector<NQueensSolution, NQueensScoreFn> {
    director_for(NQueensSolution::with_rows(rows))
}

/// Creates a director for an n-queens board with no rows assigned.
pub fn uninitialized_director(n: usize) -> SimpleScoreDirector<NQueensSolution, NQueensScoreFn> {
    director_for(NQueensSolution::uninitialized(n))
}

pub fn director_for(
    solution: NQueensSolution,
) -> SimpleScoreDirector<NQueensSolution, NQueensScoreFn> {
    SimpleScoreDirector::new(solution, nqueens_descriptor(), calculate_conflicts as NQueensScoreFn)
}

pub fn nqueens_factory() -> SimpleScoreDirectorFactory<NQueensSolution, NQueensScoreFn> {
    SimpleScoreDirectorFactory::new(nqueens_descriptor(), calculate_conflicts as NQueensScoreFn)
}
