use giputils::statistic::{Average, Case, RunningTime, SuccessRate};

#[allow(unused)]
#[derive(Debug, Default)]
pub struct Statistic {
    case: Case,
    time: RunningTime,

    pub num_frame: usize,
    pub num_solve: usize,
    pub num_model: usize,
    pub num_clause: usize,
    pub solve_sat: SuccessRate,
    pub avg_uncovered: Average,
}

impl Statistic {
    pub fn new(mut case: &str) -> Self {
        if let Some((_, c)) = case.rsplit_once('/') {
            case = c;
        }
        Self {
            case: Case::new(case),
            ..Default::default()
        }
    }
}
